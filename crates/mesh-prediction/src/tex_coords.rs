//! Portable texture coordinate prediction.
//!
//! Predicts the UV of a triangle tip from the UVs of the other two corners
//! and the positions of all three, using only integer arithmetic. The
//! projection of the tip onto the next-prev edge fixes the component of the
//! prediction along the edge; the perpendicular component is recovered up
//! to sign, which travels as one orientation bit per predicted entry,
//! delta-coded against the previous orientation.
//!
//! Encode walks entries from high to low, decode from low to high; the
//! decoder pops orientations from the back of the decoded stream, which
//! restores the encode-time pairing.

use crate::bits::{BitDecoder, BitEncoder};
use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::{Error, Result};
use crate::math::int_sqrt;
use crate::mesh_data::{MeshData, PositionSource};
use crate::scheme::{check_mesh_entries, check_position_parent, checked_entries};
use crate::transform::Transform;

fn sub3(a: [i64; 3], b: [i64; 3]) -> [i64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn dot3(a: [i64; 3], b: [i64; 3]) -> i64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// The two UV candidates for one predicted entry, in orientation order:
/// `uvs[0]` corresponds to the orientation bit being set.
struct UvCandidates {
    uvs: [[i64; 2]; 2],
}

enum TexCoordPrediction {
    /// Both candidates are viable; an orientation bit picks one.
    Candidates(UvCandidates),
    /// Degenerate geometry or missing neighbors; no orientation bit.
    Fallback([i64; 2]),
}

fn predict_tex_coord(
    entry_id: usize,
    mesh: &MeshData<'_>,
    positions: &dyn PositionSource,
    data: &[i32],
) -> TexCoordPrediction {
    let table = mesh.corner_table();
    let corner = mesh.corner_for_entry(entry_id);
    let next_entry = mesh
        .entry_for_corner(table.next(corner))
        .filter(|&e| e < entry_id);
    let prev_entry = mesh
        .entry_for_corner(table.previous(corner))
        .filter(|&e| e < entry_id);

    if let (Some(next_entry), Some(prev_entry)) = (next_entry, prev_entry) {
        let n_uv = [i64::from(data[next_entry * 2]), i64::from(data[next_entry * 2 + 1])];
        let p_uv = [i64::from(data[prev_entry * 2]), i64::from(data[prev_entry * 2 + 1])];
        if n_uv == p_uv {
            // The edge is degenerate in UV space; its shared value is the
            // only sensible prediction.
            return TexCoordPrediction::Fallback(n_uv);
        }
        let tip_pos = positions.position(entry_id);
        let next_pos = positions.position(next_entry);
        let prev_pos = positions.position(prev_entry);
        let pn = sub3(prev_pos, next_pos);
        let pn_norm2 = dot3(pn, pn);
        if pn_norm2 != 0 {
            let cn = sub3(tip_pos, next_pos);
            let cn_dot_pn = dot3(pn, cn);
            let pn_uv = [p_uv[0] - n_uv[0], p_uv[1] - n_uv[1]];
            // UV of the tip's projection onto the edge, scaled by pn_norm2.
            let x_uv = [
                n_uv[0] * pn_norm2 + cn_dot_pn * pn_uv[0],
                n_uv[1] * pn_norm2 + cn_dot_pn * pn_uv[1],
            ];
            let x_pos = [
                next_pos[0] + cn_dot_pn * pn[0] / pn_norm2,
                next_pos[1] + cn_dot_pn * pn[1] / pn_norm2,
                next_pos[2] + cn_dot_pn * pn[2] / pn_norm2,
            ];
            let cx = sub3(tip_pos, x_pos);
            let cx_norm2 = dot3(cx, cx);
            // Perpendicular offset: rotated UV edge scaled to the distance
            // of the tip from the edge.
            let norm = int_sqrt(cx_norm2 * pn_norm2);
            let cx_uv = [pn_uv[1] * norm, -pn_uv[0] * norm];
            return TexCoordPrediction::Candidates(UvCandidates {
                uvs: [
                    [
                        (x_uv[0] + cx_uv[0]) / pn_norm2,
                        (x_uv[1] + cx_uv[1]) / pn_norm2,
                    ],
                    [
                        (x_uv[0] - cx_uv[0]) / pn_norm2,
                        (x_uv[1] - cx_uv[1]) / pn_norm2,
                    ],
                ],
            });
        }
    }

    // Fallback chain: previous corner's UV, next corner's UV, previous
    // entry, zero.
    let fallback = if let Some(prev_entry) = prev_entry {
        [i64::from(data[prev_entry * 2]), i64::from(data[prev_entry * 2 + 1])]
    } else if let Some(next_entry) = next_entry {
        [i64::from(data[next_entry * 2]), i64::from(data[next_entry * 2 + 1])]
    } else if entry_id > 0 {
        let prev = (entry_id - 1) * 2;
        [i64::from(data[prev]), i64::from(data[prev + 1])]
    } else {
        [0, 0]
    };
    TexCoordPrediction::Fallback(fallback)
}

pub struct TexCoordsPortableEncoder<'a> {
    mesh: MeshData<'a>,
    positions: &'a dyn PositionSource,
    transform: Transform,
    orientations: Vec<bool>,
}

impl<'a> TexCoordsPortableEncoder<'a> {
    pub fn new(
        mesh: MeshData<'a>,
        positions: &'a dyn PositionSource,
        transform: Transform,
    ) -> Result<Self> {
        check_position_parent(positions, mesh.num_entries())?;
        Ok(Self {
            mesh,
            positions,
            transform,
            orientations: Vec::new(),
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
        self.transform.init_encoding(data);

        let mut predicted = [0i32; 2];
        let mut correction = [0i32; 2];
        for entry in (0..num_entries).rev() {
            let dst = entry * 2;
            match predict_tex_coord(entry, &self.mesh, self.positions, data) {
                TexCoordPrediction::Candidates(candidates) => {
                    let actual = [i64::from(data[dst]), i64::from(data[dst + 1])];
                    let dist2 = |uv: [i64; 2]| {
                        let du = actual[0] - uv[0];
                        let dv = actual[1] - uv[1];
                        du * du + dv * dv
                    };
                    let orientation =
                        dist2(candidates.uvs[0]) < dist2(candidates.uvs[1]);
                    self.orientations.push(orientation);
                    let uv = candidates.uvs[usize::from(!orientation)];
                    predicted = [uv[0] as i32, uv[1] as i32];
                }
                TexCoordPrediction::Fallback(uv) => {
                    predicted = [uv[0] as i32, uv[1] as i32];
                }
            }
            self.transform
                .compute_correction(&data[dst..dst + 2], &predicted, &mut correction);
            data[dst] = correction[0];
            data[dst + 1] = correction[1];
        }
        Ok(())
    }

    pub fn encode_prediction_data(&self, buffer: &mut EncoderBuffer) -> Result<()> {
        buffer.encode_varint(self.orientations.len() as u64);
        let mut bit_encoder = BitEncoder::new();
        bit_encoder.start_encoding();
        let mut last_orientation = true;
        for &orientation in &self.orientations {
            bit_encoder.encode_bit(orientation == last_orientation);
            last_orientation = orientation;
        }
        bit_encoder.end_encoding(buffer);
        self.transform.encode_data(buffer);
        Ok(())
    }
}

pub struct TexCoordsPortableDecoder<'a> {
    mesh: MeshData<'a>,
    positions: &'a dyn PositionSource,
    transform: Transform,
    orientations: Vec<bool>,
}

impl<'a> TexCoordsPortableDecoder<'a> {
    pub fn new(
        mesh: MeshData<'a>,
        positions: &'a dyn PositionSource,
        transform: Transform,
    ) -> Result<Self> {
        check_position_parent(positions, mesh.num_entries())?;
        Ok(Self {
            mesh,
            positions,
            transform,
            orientations: Vec::new(),
        })
    }

    pub fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        let num_orientations = buffer.decode_varint()?;
        let limit = self.mesh.num_entries() as u64;
        if num_orientations > limit {
            return Err(Error::InvalidFlagCount {
                context: 0,
                count: num_orientations,
                limit,
            });
        }
        let mut bit_decoder = BitDecoder::new();
        bit_decoder.start_decoding(buffer)?;
        self.orientations.clear();
        let mut last_orientation = true;
        for _ in 0..num_orientations {
            if !bit_decoder.decode_next_bit()? {
                last_orientation = !last_orientation;
            }
            self.orientations.push(last_orientation);
        }
        self.transform.decode_data(buffer)
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

        let mut predicted = [0i32; 2];
        let mut correction = [0i32; 2];
        let mut recovered = [0i32; 2];
        for entry in 0..num_entries {
            let dst = entry * 2;
            match predict_tex_coord(entry, &self.mesh, self.positions, data) {
                TexCoordPrediction::Candidates(candidates) => {
                    let orientation = self
                        .orientations
                        .pop()
                        .ok_or(Error::OrientationStreamExhausted)?;
                    let uv = candidates.uvs[usize::from(!orientation)];
                    predicted = [uv[0] as i32, uv[1] as i32];
                }
                TexCoordPrediction::Fallback(uv) => {
                    predicted = [uv[0] as i32, uv[1] as i32];
                }
            }
            correction[0] = data[dst];
            correction[1] = data[dst + 1];
            self.transform
                .recover_value(&predicted, &correction, &mut recovered);
            data[dst] = recovered[0];
            data[dst + 1] = recovered[1];
        }
        Ok(())
    }
}
