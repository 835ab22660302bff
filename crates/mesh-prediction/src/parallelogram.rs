//! Parallelogram prediction.
//!
//! For a corner c of the triangle being completed, the triangle across the
//! opposite edge supplies three already-coded entries: the value at the
//! opposite corner and the values at its next/previous corners. The
//! prediction completes the parallelogram: next + previous - opposite.

use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::Result;
use crate::indices::CornerIndex;
use crate::mesh_data::MeshData;
use crate::scheme::{check_mesh_entries, checked_entries};
use crate::transform::Transform;

/// Writes the parallelogram prediction for |entry_id| seen from |corner|
/// into |predicted|. Fails (returning false) when the opposite triangle is
/// missing or any of its entries is not coded before |entry_id|.
pub(crate) fn parallelogram_prediction(
    entry_id: usize,
    corner: CornerIndex,
    mesh: &MeshData<'_>,
    data: &[i32],
    num_components: usize,
    predicted: &mut [i32],
) -> bool {
    let table = mesh.corner_table();
    let opposite = table.opposite(corner);
    if !opposite.is_valid() {
        return false;
    }
    let opp_entry = match mesh.entry_for_corner(opposite) {
        Some(e) if e < entry_id => e,
        _ => return false,
    };
    let next_entry = match mesh.entry_for_corner(table.next(opposite)) {
        Some(e) if e < entry_id => e,
        _ => return false,
    };
    let prev_entry = match mesh.entry_for_corner(table.previous(opposite)) {
        Some(e) if e < entry_id => e,
        _ => return false,
    };
    let opp = opp_entry * num_components;
    let next = next_entry * num_components;
    let prev = prev_entry * num_components;
    for c in 0..num_components {
        let value =
            i64::from(data[next + c]) + i64::from(data[prev + c]) - i64::from(data[opp + c]);
        predicted[c] = value as i32;
    }
    true
}

pub struct ParallelogramEncoder<'a> {
    mesh: MeshData<'a>,
    transform: Transform,
}

impl<'a> ParallelogramEncoder<'a> {
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
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        for entry in (1..num_entries).rev() {
            let dst = entry * num_components;
            let corner = self.mesh.corner_for_entry(entry);
            if !parallelogram_prediction(
                entry,
                corner,
                &self.mesh,
                data,
                num_components,
                &mut predicted,
            ) {
                // No valid parallelogram; fall back to the previous entry.
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

pub struct ParallelogramDecoder<'a> {
    mesh: MeshData<'a>,
    transform: Transform,
}

impl<'a> ParallelogramDecoder<'a> {
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
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        let mut recovered = vec![0i32; num_components];
        correction.copy_from_slice(&data[..num_components]);
        self.transform
            .recover_value(&predicted, &correction, &mut recovered);
        data[..num_components].copy_from_slice(&recovered);
        for entry in 1..num_entries {
            let dst = entry * num_components;
            let corner = self.mesh.corner_for_entry(entry);
            if !parallelogram_prediction(
                entry,
                corner,
                &self.mesh,
                data,
                num_components,
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
