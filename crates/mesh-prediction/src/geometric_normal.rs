//! Geometric normal prediction in octahedral space.
//!
//! The predicted normal of a vertex is the area-weighted sum of cross
//! products over its triangle fan, computed from the already-decoded
//! position attribute. Both sides derive the same prediction, so the only
//! per-entry side information is one flip bit telling the decoder whether
//! the stored normal pointed against the predicted one.
//!
//! Predictions never read neighboring attribute values, so encode and
//! decode both walk entries in ascending order.

use crate::bits::{BitDecoder, BitEncoder};
use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::{Error, Result};
use crate::mesh_data::{MeshData, PositionSource};
use crate::scheme::{check_mesh_entries, check_position_parent, checked_entries};
use crate::transform::Transform;

fn sub(a: [i64; 3], b: [i64; 3]) -> [i64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: [i64; 3], b: [i64; 3]) -> [i64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

/// Accumulated fan normal for |entry_id|, scaled down so the canonicalizing
/// multiplication by the octahedral center value stays inside an i64.
fn predicted_normal(
    entry_id: usize,
    mesh: &MeshData<'_>,
    positions: &dyn PositionSource,
) -> [i64; 3] {
    let table = mesh.corner_table();
    let start = mesh.corner_for_entry(entry_id);
    let center_pos = positions.position(entry_id);
    let mut normal = [0i64; 3];
    let mut corner = start;
    let mut first_pass = true;
    while corner.is_valid() {
        let next_entry = mesh.entry_for_corner(table.next(corner));
        let prev_entry = mesh.entry_for_corner(table.previous(corner));
        if let (Some(next_entry), Some(prev_entry)) = (next_entry, prev_entry) {
            let delta_next = sub(positions.position(next_entry), center_pos);
            let delta_prev = sub(positions.position(prev_entry), center_pos);
            let face_normal = cross(delta_next, delta_prev);
            normal[0] += face_normal[0];
            normal[1] += face_normal[1];
            normal[2] += face_normal[2];
        }
        // Swing left until the fan closes or hits a boundary; on a boundary
        // restart rightward from the other side of the start corner so every
        // incident triangle contributes.
        corner = if first_pass {
            table.swing_left(corner)
        } else {
            table.swing_right(corner)
        };
        if corner == start {
            break;
        }
        if !corner.is_valid() && first_pass {
            first_pass = false;
            corner = table.swing_right(start);
        }
    }
    // Keep |x| + |y| + |z| at or below 2^29 so the canonicalization product
    // with the center value (< 2^30) fits in an i64.
    const UPPER_BOUND: i64 = 1 << 29;
    let abs_sum = normal[0].abs() + normal[1].abs() + normal[2].abs();
    if abs_sum > UPPER_BOUND {
        let quotient = abs_sum / UPPER_BOUND + 1;
        normal[0] /= quotient;
        normal[1] /= quotient;
        normal[2] /= quotient;
    }
    normal
}

pub struct GeometricNormalEncoder<'a> {
    mesh: MeshData<'a>,
    positions: &'a dyn PositionSource,
    transform: Transform,
    flip_bits: Vec<bool>,
}

impl<'a> GeometricNormalEncoder<'a> {
    pub fn new(
        mesh: MeshData<'a>,
        positions: &'a dyn PositionSource,
        quantization_bits: u8,
    ) -> Result<Self> {
        check_position_parent(positions, mesh.num_entries())?;
        Ok(Self {
            mesh,
            positions,
            transform: Transform::octahedron(quantization_bits)?,
            flip_bits: Vec::new(),
        })
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn compute_corrections(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        if num_components != 2 {
            return Err(Error::InvalidComponentCount {
                want: 2,
                got: num_components,
            });
        }
        let num_entries = checked_entries(data.len(), num_components)?;
        check_mesh_entries(num_entries, self.mesh.num_entries())?;
        let toolbox = match self.transform.octahedron_toolbox() {
            Some(tb) => *tb,
            None => unreachable!("constructed with an octahedron transform"),
        };

        let mut correction = [0i32; 2];
        let mut flipped_correction = [0i32; 2];
        for entry in 0..num_entries {
            let dst = entry * 2;
            let mut normal = predicted_normal(entry, &self.mesh, self.positions);
            toolbox.canonicalize_integer_vector(&mut normal);
            let (s, t) = toolbox.integer_vector_to_quantized_octahedral_coords(&normal);
            let flipped = [-normal[0], -normal[1], -normal[2]];
            let (fs, ft) = toolbox.integer_vector_to_quantized_octahedral_coords(&flipped);

            let original = [data[dst], data[dst + 1]];
            self.transform
                .compute_correction(&original, &[s, t], &mut correction);
            self.transform
                .compute_correction(&original, &[fs, ft], &mut flipped_correction);
            let cost = |corr: &[i32; 2]| {
                i64::from(toolbox.fold_centered(corr[0]).abs())
                    + i64::from(toolbox.fold_centered(corr[1]).abs())
            };
            // Keep the orientation whose folded correction is smaller.
            let flip = cost(&flipped_correction) < cost(&correction);
            self.flip_bits.push(flip);
            let chosen = if flip { &flipped_correction } else { &correction };
            data[dst] = chosen[0];
            data[dst + 1] = chosen[1];
        }
        Ok(())
    }

    pub fn encode_prediction_data(&self, buffer: &mut EncoderBuffer) -> Result<()> {
        self.transform.encode_data(buffer);
        buffer.encode_varint(self.flip_bits.len() as u64);
        let mut bit_encoder = BitEncoder::new();
        bit_encoder.start_encoding();
        for &flip in &self.flip_bits {
            bit_encoder.encode_bit(flip);
        }
        bit_encoder.end_encoding(buffer);
        Ok(())
    }
}

pub struct GeometricNormalDecoder<'a> {
    mesh: MeshData<'a>,
    positions: &'a dyn PositionSource,
    transform: Transform,
    flip_bits: Vec<bool>,
    flip_pos: usize,
}

impl<'a> GeometricNormalDecoder<'a> {
    pub fn new(mesh: MeshData<'a>, positions: &'a dyn PositionSource) -> Result<Self> {
        check_position_parent(positions, mesh.num_entries())?;
        Ok(Self {
            mesh,
            positions,
            // Placeholder bits; the real count arrives in the stream.
            transform: Transform::octahedron(2)?,
            flip_bits: Vec::new(),
            flip_pos: 0,
        })
    }

    pub fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        self.transform.decode_data(buffer)?;
        let num_flips = buffer.decode_varint()?;
        let limit = self.mesh.corner_table().num_corners() as u64;
        if num_flips > limit {
            return Err(Error::InvalidFlagCount {
                context: 0,
                count: num_flips,
                limit,
            });
        }
        let mut bit_decoder = BitDecoder::new();
        bit_decoder.start_decoding(buffer)?;
        self.flip_bits.clear();
        for _ in 0..num_flips {
            self.flip_bits.push(bit_decoder.decode_next_bit()?);
        }
        self.flip_pos = 0;
        Ok(())
    }

    pub fn recover_values(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        if num_components != 2 {
            return Err(Error::InvalidComponentCount {
                want: 2,
                got: num_components,
            });
        }
        let num_entries = checked_entries(data.len(), num_components)?;
        check_mesh_entries(num_entries, self.mesh.num_entries())?;
        let toolbox = match self.transform.octahedron_toolbox() {
            Some(tb) => *tb,
            None => unreachable!("constructed with an octahedron transform"),
        };

        let mut correction = [0i32; 2];
        let mut recovered = [0i32; 2];
        for entry in 0..num_entries {
            let dst = entry * 2;
            let mut normal = predicted_normal(entry, &self.mesh, self.positions);
            toolbox.canonicalize_integer_vector(&mut normal);
            let flip = *self
                .flip_bits
                .get(self.flip_pos)
                .ok_or(Error::FlipStreamExhausted)?;
            self.flip_pos += 1;
            if flip {
                normal = [-normal[0], -normal[1], -normal[2]];
            }
            let (s, t) = toolbox.integer_vector_to_quantized_octahedral_coords(&normal);
            correction[0] = data[dst];
            correction[1] = data[dst + 1];
            self.transform
                .recover_value(&[s, t], &correction, &mut recovered);
            data[dst] = recovered[0];
            data[dst + 1] = recovered[1];
        }
        Ok(())
    }
}
