//! Multi-parallelogram prediction.
//!
//! Averages the parallelogram predictions from every triangle attached to
//! the predicted vertex. Kept for decoding streams produced by older
//! encoders; new streams prefer the constrained variant.

use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::Result;
use crate::mesh_data::MeshData;
use crate::parallelogram::parallelogram_prediction;
use crate::scheme::{check_mesh_entries, checked_entries};
use crate::transform::Transform;

fn multi_parallelogram_prediction(
    entry_id: usize,
    mesh: &MeshData<'_>,
    data: &[i32],
    num_components: usize,
    scratch: &mut [i32],
    predicted: &mut [i32],
) -> bool {
    let table = mesh.corner_table();
    let start = mesh.corner_for_entry(entry_id);
    let mut sums = vec![0i64; num_components];
    let mut num_parallelograms = 0i64;
    let mut corner = start;
    while corner.is_valid() {
        if parallelogram_prediction(entry_id, corner, mesh, data, num_components, scratch) {
            for c in 0..num_components {
                sums[c] += i64::from(scratch[c]);
            }
            num_parallelograms += 1;
        }
        corner = table.swing_right(corner);
        if corner == start {
            break;
        }
    }
    if num_parallelograms == 0 {
        return false;
    }
    for c in 0..num_components {
        predicted[c] = (sums[c] / num_parallelograms) as i32;
    }
    true
}

pub struct MultiParallelogramEncoder<'a> {
    mesh: MeshData<'a>,
    transform: Transform,
}

impl<'a> MultiParallelogramEncoder<'a> {
    pub fn new(mesh: MeshData<'a>, transform: Transform) -> Self {
        Self { mesh, transform }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn compute_corrections(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        let num_entries = checked_entries(data.len(), num_components)?;
        check_mesh_entries(num_entries, self.mesh.num_entries())?;
        self.transform.init_encoding(data);
        let mut scratch = vec![0i32; num_components];
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        for entry in (1..num_entries).rev() {
            let dst = entry * num_components;
            if !multi_parallelogram_prediction(
                entry,
                &self.mesh,
                data,
                num_components,
                &mut scratch,
                &mut predicted,
            ) {
                predicted.copy_from_slice(&data[dst - num_components..dst]);
            }
            self.transform.compute_correction(
                &data[dst..dst + num_components],
                &predicted,
                &mut correction,
            );
            data[dst..dst + num_components].copy_from_slice(&correction);
        }
        if num_entries > 0 {
            predicted.fill(0);
            self.transform
                .compute_correction(&data[..num_components], &predicted, &mut correction);
            data[..num_components].copy_from_slice(&correction);
        }
        Ok(())
    }

    pub fn encode_prediction_data(&self, buffer: &mut EncoderBuffer) -> Result<()> {
        self.transform.encode_data(buffer);
        Ok(())
    }
}

pub struct MultiParallelogramDecoder<'a> {
    mesh: MeshData<'a>,
    transform: Transform,
}

impl<'a> MultiParallelogramDecoder<'a> {
    pub fn new(mesh: MeshData<'a>, transform: Transform) -> Self {
        Self { mesh, transform }
    }

    pub fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        self.transform.decode_data(buffer)
    }

    pub fn recover_values(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        let num_entries = checked_entries(data.len(), num_components)?;
        check_mesh_entries(num_entries, self.mesh.num_entries())?;
        if num_entries == 0 {
            return Ok(());
        }
        let mut scratch = vec![0i32; num_components];
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        let mut recovered = vec![0i32; num_components];
        correction.copy_from_slice(&data[..num_components]);
        self.transform
            .recover_value(&predicted, &correction, &mut recovered);
        data[..num_components].copy_from_slice(&recovered);
        for entry in 1..num_entries {
            let dst = entry * num_components;
            if !multi_parallelogram_prediction(
                entry,
                &self.mesh,
                data,
                num_components,
                &mut scratch,
                &mut predicted,
            ) {
                predicted.copy_from_slice(&data[dst - num_components..dst]);
            }
            correction.copy_from_slice(&data[dst..dst + num_components]);
            self.transform
                .recover_value(&predicted, &correction, &mut recovered);
            data[dst..dst + num_components].copy_from_slice(&recovered);
        }
        Ok(())
    }
}
