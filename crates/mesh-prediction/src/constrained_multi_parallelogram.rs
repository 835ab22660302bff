//! Constrained multi-parallelogram prediction.
//!
//! Like the multi-parallelogram scheme, but the encoder picks the subset of
//! attached parallelograms that minimizes the estimated cost of the residual
//! stream, and tells the decoder which ones it used through per-context
//! crease flag streams (flag set = parallelogram excluded). Vertices with k
//! attached parallelograms share the context k - 1, so each context's flag
//! stream has a fixed stride of k flags per vertex.
//!
//! The encoder walks entries from high to low while the decoder recovers
//! them from low to high, so the encoder buffers each context's flags and
//! emits them rewound stride by stride: the flag groups come out in
//! ascending entry order with each group kept in candidate order.

use crate::bits::{BitDecoder, BitEncoder};
use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::entropy::{binary_entropy, symbol_for_signed, ShannonEntropyTracker};
use crate::error::{Error, Result};
use crate::mesh_data::MeshData;
use crate::parallelogram::parallelogram_prediction;
use crate::scheme::{check_mesh_entries, checked_entries};
use crate::transform::Transform;

/// Parallelograms considered per vertex; also the number of flag contexts.
pub const MAX_NUM_PARALLELOGRAMS: usize = 4;

/// Collects up to [`MAX_NUM_PARALLELOGRAMS`] valid parallelogram predictions
/// around the vertex of |entry_id|. The walk swings left from the entry's
/// corner first; when it falls off a boundary it restarts from the corner
/// swinging right, so the candidate order is the same no matter where the
/// stored corner sits inside the fan.
fn gather_predictions(
    entry_id: usize,
    mesh: &MeshData<'_>,
    data: &[i32],
    num_components: usize,
    pred_vals: &mut [Vec<i32>; MAX_NUM_PARALLELOGRAMS],
) -> usize {
    let table = mesh.corner_table();
    let start = mesh.corner_for_entry(entry_id);
    let mut corner = start;
    let mut first_pass = true;
    let mut num_parallelograms = 0;
    while corner.is_valid() {
        if parallelogram_prediction(
            entry_id,
            corner,
            mesh,
            data,
            num_components,
            &mut pred_vals[num_parallelograms],
        ) {
            num_parallelograms += 1;
            if num_parallelograms == MAX_NUM_PARALLELOGRAMS {
                break;
            }
        }
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
    num_parallelograms
}

/// Estimated cost of one subset choice. Bits dominate; the absolute
/// residual breaks ties so equal-rate choices stay deterministic.
#[derive(Debug, Clone, Copy)]
struct PredictionError {
    num_bits: i64,
    residual_error: i64,
}

impl PredictionError {
    fn is_better_than(&self, other: &PredictionError) -> bool {
        self.num_bits < other.num_bits
            || (self.num_bits == other.num_bits && self.residual_error < other.residual_error)
    }
}

/// Bits needed to signal |num_used| set flags out of |total| in a context.
fn overhead_bits(num_used: i64, total: i64) -> i64 {
    (total as f64 * binary_entropy(total as u64, num_used as u64)).ceil() as i64
}

/// Reorders flags pushed in descending entry order into ascending entry
/// order, keeping each stride-sized group in its original internal order.
fn rewind_strides(flags: &[bool], stride: usize) -> Vec<bool> {
    debug_assert_eq!(flags.len() % stride, 0);
    let mut out = Vec::with_capacity(flags.len());
    for group in flags.chunks_exact(stride).rev() {
        out.extend_from_slice(group);
    }
    out
}

pub struct ConstrainedMultiParallelogramEncoder<'a> {
    mesh: MeshData<'a>,
    transform: Transform,
    is_crease_edge: [Vec<bool>; MAX_NUM_PARALLELOGRAMS],
    entropy_tracker: ShannonEntropyTracker,
}

impl<'a> ConstrainedMultiParallelogramEncoder<'a> {
    pub fn new(mesh: MeshData<'a>, transform: Transform) -> Self {
        Self {
            mesh,
            transform,
            is_crease_edge: Default::default(),
            entropy_tracker: ShannonEntropyTracker::new(),
        }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn compute_corrections(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        let num_entries = checked_entries(data.len(), num_components)?;
        check_mesh_entries(num_entries, self.mesh.num_entries())?;
        self.transform.init_encoding(data);

        let mut pred_vals: [Vec<i32>; MAX_NUM_PARALLELOGRAMS] =
            std::array::from_fn(|_| vec![0i32; num_components]);
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        let mut residuals = vec![0i64; num_components];
        let mut symbols = vec![0u32; num_components];

        let mut total_used = [0i64; MAX_NUM_PARALLELOGRAMS];
        let mut total = [0i64; MAX_NUM_PARALLELOGRAMS];

        for entry in (1..num_entries).rev() {
            let dst = entry * num_components;
            let src = dst - num_components;
            let num_parallelograms =
                gather_predictions(entry, &self.mesh, data, num_components, &mut pred_vals);

            if num_parallelograms == 0 {
                // No candidates at all; plain delta, no flags, no entropy.
                predicted.copy_from_slice(&data[src..src + num_components]);
                self.transform.compute_correction(
                    &data[dst..dst + num_components],
                    &predicted,
                    &mut correction,
                );
                data[dst..dst + num_components].copy_from_slice(&correction);
                continue;
            }

            let context = num_parallelograms - 1;

            // Baseline: exclude every parallelogram and delta-code instead.
            for c in 0..num_components {
                residuals[c] = i64::from(data[dst + c]) - i64::from(data[src + c]);
                symbols[c] = symbol_for_signed(residuals[c]);
            }
            let peeked = self.entropy_tracker.peek(&symbols);
            let mut best_error = PredictionError {
                num_bits: ShannonEntropyTracker::estimated_bits(&peeked)
                    + overhead_bits(total_used[context], total[context] + num_parallelograms as i64),
                residual_error: residuals.iter().map(|r| r.abs()).sum(),
            };
            let mut best_mask = 0usize;

            for num_used in 1..=num_parallelograms {
                for mask in 1..(1usize << num_parallelograms) {
                    if mask.count_ones() as usize != num_used {
                        continue;
                    }
                    for c in 0..num_components {
                        let mut sum = 0i64;
                        for (i, vals) in pred_vals.iter().enumerate().take(num_parallelograms) {
                            if mask & (1 << i) != 0 {
                                sum += i64::from(vals[c]);
                            }
                        }
                        let prediction = sum / num_used as i64;
                        residuals[c] = i64::from(data[dst + c]) - prediction;
                        symbols[c] = symbol_for_signed(residuals[c]);
                    }
                    let peeked = self.entropy_tracker.peek(&symbols);
                    let error = PredictionError {
                        num_bits: ShannonEntropyTracker::estimated_bits(&peeked)
                            + overhead_bits(
                                total_used[context] + num_used as i64,
                                total[context] + num_parallelograms as i64,
                            ),
                        residual_error: residuals.iter().map(|r| r.abs()).sum(),
                    };
                    if error.is_better_than(&best_error) {
                        best_error = error;
                        best_mask = mask;
                    }
                }
            }

            total_used[context] += best_mask.count_ones() as i64;
            total[context] += num_parallelograms as i64;
            for i in 0..num_parallelograms {
                self.is_crease_edge[context].push(best_mask & (1 << i) == 0);
            }

            // Re-derive the chosen prediction and commit its residuals.
            if best_mask == 0 {
                predicted.copy_from_slice(&data[src..src + num_components]);
            } else {
                let num_used = best_mask.count_ones() as i64;
                for c in 0..num_components {
                    let mut sum = 0i64;
                    for (i, vals) in pred_vals.iter().enumerate().take(num_parallelograms) {
                        if best_mask & (1 << i) != 0 {
                            sum += i64::from(vals[c]);
                        }
                    }
                    predicted[c] = (sum / num_used) as i32;
                }
            }
            for c in 0..num_components {
                symbols[c] =
                    symbol_for_signed(i64::from(data[dst + c]) - i64::from(predicted[c]));
            }
            self.entropy_tracker.push(&symbols);

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
        let mut bit_encoder = BitEncoder::new();
        for (context, flags) in self.is_crease_edge.iter().enumerate() {
            buffer.encode_varint(flags.len() as u64);
            if flags.is_empty() {
                continue;
            }
            let rewound = rewind_strides(flags, context + 1);
            bit_encoder.start_encoding();
            for &flag in &rewound {
                bit_encoder.encode_bit(flag);
            }
            bit_encoder.end_encoding(buffer);
        }
        self.transform.encode_data(buffer);
        Ok(())
    }
}

pub struct ConstrainedMultiParallelogramDecoder<'a> {
    mesh: MeshData<'a>,
    transform: Transform,
    is_crease_edge: [Vec<bool>; MAX_NUM_PARALLELOGRAMS],
    is_crease_edge_pos: [usize; MAX_NUM_PARALLELOGRAMS],
}

impl<'a> ConstrainedMultiParallelogramDecoder<'a> {
    pub fn new(mesh: MeshData<'a>, transform: Transform) -> Self {
        Self {
            mesh,
            transform,
            is_crease_edge: Default::default(),
            is_crease_edge_pos: [0; MAX_NUM_PARALLELOGRAMS],
        }
    }

    pub fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        let limit = self.mesh.corner_table().num_corners() as u64 * 2;
        let mut bit_decoder = BitDecoder::new();
        for context in 0..MAX_NUM_PARALLELOGRAMS {
            let num_flags = buffer.decode_varint()?;
            if num_flags > limit {
                return Err(Error::InvalidFlagCount {
                    context,
                    count: num_flags,
                    limit,
                });
            }
            self.is_crease_edge[context].clear();
            self.is_crease_edge_pos[context] = 0;
            if num_flags == 0 {
                continue;
            }
            bit_decoder.start_decoding(buffer)?;
            for _ in 0..num_flags {
                self.is_crease_edge[context].push(bit_decoder.decode_next_bit()?);
            }
        }
        self.transform.decode_data(buffer)
    }

    pub fn recover_values(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        let num_entries = checked_entries(data.len(), num_components)?;
        check_mesh_entries(num_entries, self.mesh.num_entries())?;
        if num_entries == 0 {
            return Ok(());
        }

        let mut pred_vals: [Vec<i32>; MAX_NUM_PARALLELOGRAMS] =
            std::array::from_fn(|_| vec![0i32; num_components]);
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        let mut recovered = vec![0i32; num_components];

        correction.copy_from_slice(&data[..num_components]);
        self.transform
            .recover_value(&predicted, &correction, &mut recovered);
        data[..num_components].copy_from_slice(&recovered);

        for entry in 1..num_entries {
            let dst = entry * num_components;
            let src = dst - num_components;
            let num_parallelograms =
                gather_predictions(entry, &self.mesh, data, num_components, &mut pred_vals);

            if num_parallelograms == 0 {
                predicted.copy_from_slice(&data[src..src + num_components]);
            } else {
                let context = num_parallelograms - 1;
                let mut sums = vec![0i64; num_components];
                let mut num_used = 0i64;
                for vals in pred_vals.iter().take(num_parallelograms) {
                    let pos = self.is_crease_edge_pos[context];
                    let is_crease = *self.is_crease_edge[context]
                        .get(pos)
                        .ok_or(Error::FlagStreamExhausted { context })?;
                    self.is_crease_edge_pos[context] = pos + 1;
                    if !is_crease {
                        for c in 0..num_components {
                            sums[c] += i64::from(vals[c]);
                        }
                        num_used += 1;
                    }
                }
                if num_used > 0 {
                    for c in 0..num_components {
                        predicted[c] = (sums[c] / num_used) as i32;
                    }
                } else {
                    predicted.copy_from_slice(&data[src..src + num_components]);
                }
            }

            correction.copy_from_slice(&data[dst..dst + num_components]);
            self.transform
                .recover_value(&predicted, &correction, &mut recovered);
            data[dst..dst + num_components].copy_from_slice(&recovered);
        }
        Ok(())
    }
}
