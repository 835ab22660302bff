//! Difference (delta) prediction.
//!
//! Entry 0 is predicted as zero, every other entry as the previous entry.
//! The encoder overwrites values with corrections walking entry ids from
//! high to low so each prediction still reads original neighbor values; the
//! decoder recovers from low to high so each prediction reads recovered
//! values. Needs no connectivity, so it doubles as the universal fallback.

use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::Result;
use crate::scheme::checked_entries;
use crate::transform::Transform;

#[derive(Debug)]
pub struct DifferenceEncoder {
    transform: Transform,
}

impl DifferenceEncoder {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn compute_corrections(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        let num_entries = checked_entries(data.len(), num_components)?;
        self.transform.init_encoding(data);
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        for entry in (1..num_entries).rev() {
            let dst = entry * num_components;
            predicted.copy_from_slice(&data[dst - num_components..dst]);
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

#[derive(Debug)]
pub struct DifferenceDecoder {
    transform: Transform,
}

impl DifferenceDecoder {
    pub fn new(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        self.transform.decode_data(buffer)
    }

    pub fn recover_values(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        let num_entries = checked_entries(data.len(), num_components)?;
        if num_entries == 0 {
            return Ok(());
        }
        let mut predicted = vec![0i32; num_components];
        let mut correction = vec![0i32; num_components];
        correction.copy_from_slice(&data[..num_components]);
        let mut recovered = vec![0i32; num_components];
        self.transform
            .recover_value(&predicted, &correction, &mut recovered);
        data[..num_components].copy_from_slice(&recovered);
        for entry in 1..num_entries {
            let dst = entry * num_components;
            predicted.copy_from_slice(&data[dst - num_components..dst]);
            correction.copy_from_slice(&data[dst..dst + num_components]);
            self.transform
                .recover_value(&predicted, &correction, &mut recovered);
            data[dst..dst + num_components].copy_from_slice(&recovered);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difference_round_trip() {
        let original = vec![10, 20, 11, 22, 13, 19, -5, 40];
        let mut data = original.clone();

        let mut encoder = DifferenceEncoder::new(Transform::delta());
        encoder.compute_corrections(&mut data, 2).unwrap();
        assert_ne!(data, original);

        let mut decoder = DifferenceDecoder::new(Transform::delta());
        decoder.recover_values(&mut data, 2).unwrap();
        assert_eq!(data, original);
    }

    #[test]
    fn test_first_entry_is_delta_from_zero() {
        let mut data = vec![7, -9];
        let mut encoder = DifferenceEncoder::new(Transform::delta());
        encoder.compute_corrections(&mut data, 2).unwrap();
        assert_eq!(data, vec![7, -9]);
    }

    #[test]
    fn test_ragged_length_is_rejected() {
        let mut data = vec![1, 2, 3];
        let mut encoder = DifferenceEncoder::new(Transform::delta());
        assert!(encoder.compute_corrections(&mut data, 2).is_err());
    }
}
