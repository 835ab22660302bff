//! Correction transforms shared by the prediction schemes.
//!
//! A transform turns (original, predicted) pairs into stored corrections on
//! the encoder and inverts that on the decoder. The variant is picked when
//! the scheme is constructed; transform parameters travel in the prediction
//! data ahead of any per-scheme payload.

use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::error::{Error, Result};
use crate::octahedron::OctahedronToolBox;

/// Wire ids of the correction transforms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformType {
    Delta = 0,
    Wrap = 1,
    OctahedronCanonicalized = 3,
}

impl TransformType {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for TransformType {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0 => Ok(TransformType::Delta),
            1 => Ok(TransformType::Wrap),
            3 => Ok(TransformType::OctahedronCanonicalized),
            other => Err(Error::UnknownTransformType(other)),
        }
    }
}

/// Value bounds observed on the encode pass of the wrap transform.
#[derive(Debug, Clone, Copy, Default)]
pub struct WrapBounds {
    min_value: i32,
    max_value: i32,
    max_dif: i32,
    min_correction: i32,
    max_correction: i32,
}

impl WrapBounds {
    fn init_corrections(&mut self) {
        self.max_dif = 1 + self.max_value.wrapping_sub(self.min_value);
        self.max_correction = self.max_dif / 2;
        self.min_correction = -self.max_correction;
        if self.max_dif & 1 == 0 {
            self.max_correction -= 1;
        }
    }

    fn clamp(&self, value: i32) -> i32 {
        value.clamp(self.min_value, self.max_value)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Transform {
    /// Plain difference; corrections are unconstrained signed values.
    Delta,
    /// Differences wrapped into the value range seen while encoding.
    Wrap(WrapBounds),
    /// Modular differences of canonicalized octahedral coordinates.
    Octahedron(OctahedronToolBox),
}

impl Transform {
    pub fn delta() -> Self {
        Transform::Delta
    }

    pub fn wrap() -> Self {
        Transform::Wrap(WrapBounds::default())
    }

    pub fn octahedron(quantization_bits: u8) -> Result<Self> {
        Ok(Transform::Octahedron(OctahedronToolBox::new(
            quantization_bits,
        )?))
    }

    pub fn transform_type(&self) -> TransformType {
        match self {
            Transform::Delta => TransformType::Delta,
            Transform::Wrap(_) => TransformType::Wrap,
            Transform::Octahedron(_) => TransformType::OctahedronCanonicalized,
        }
    }

    /// True when stored corrections are non-negative and need no zigzag
    /// mapping downstream.
    pub fn corrections_positive(&self) -> bool {
        matches!(self, Transform::Octahedron(_))
    }

    pub fn octahedron_toolbox(&self) -> Option<&OctahedronToolBox> {
        match self {
            Transform::Octahedron(tb) => Some(tb),
            _ => None,
        }
    }

    /// Observes the original values before any of them is overwritten.
    /// Only the wrap transform records state here.
    pub fn init_encoding(&mut self, data: &[i32]) {
        if let Transform::Wrap(bounds) = self {
            let mut min_value = 0;
            let mut max_value = 0;
            if let Some((&first, rest)) = data.split_first() {
                min_value = first;
                max_value = first;
                for &v in rest {
                    min_value = min_value.min(v);
                    max_value = max_value.max(v);
                }
            }
            bounds.min_value = min_value;
            bounds.max_value = max_value;
            bounds.init_corrections();
        }
    }

    pub fn compute_correction(
        &self,
        original: &[i32],
        predicted: &[i32],
        correction: &mut [i32],
    ) {
        match self {
            Transform::Delta => {
                for c in 0..original.len() {
                    correction[c] = original[c].wrapping_sub(predicted[c]);
                }
            }
            Transform::Wrap(bounds) => {
                for c in 0..original.len() {
                    let mut corr = original[c].wrapping_sub(bounds.clamp(predicted[c]));
                    if corr > bounds.max_correction {
                        corr -= bounds.max_dif;
                    } else if corr < bounds.min_correction {
                        corr += bounds.max_dif;
                    }
                    correction[c] = corr;
                }
            }
            Transform::Octahedron(tb) => {
                for c in 0..original.len() {
                    correction[c] = tb.mod_positive(original[c].wrapping_sub(predicted[c]));
                }
            }
        }
    }

    pub fn recover_value(&self, predicted: &[i32], correction: &[i32], original: &mut [i32]) {
        match self {
            Transform::Delta => {
                for c in 0..predicted.len() {
                    original[c] = predicted[c].wrapping_add(correction[c]);
                }
            }
            Transform::Wrap(bounds) => {
                for c in 0..predicted.len() {
                    let mut value = bounds.clamp(predicted[c]).wrapping_add(correction[c]);
                    if value > bounds.max_value {
                        value -= bounds.max_dif;
                    } else if value < bounds.min_value {
                        value += bounds.max_dif;
                    }
                    original[c] = value;
                }
            }
            Transform::Octahedron(tb) => {
                for c in 0..predicted.len() {
                    original[c] = tb.mod_positive(predicted[c].wrapping_add(correction[c]));
                }
            }
        }
    }

    pub fn encode_data(&self, buffer: &mut EncoderBuffer) {
        match self {
            Transform::Delta => {}
            Transform::Wrap(bounds) => {
                buffer.encode_i32(bounds.min_value);
                buffer.encode_i32(bounds.max_value);
            }
            Transform::Octahedron(tb) => {
                buffer.encode_u8(tb.quantization_bits());
            }
        }
    }

    pub fn decode_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        match self {
            Transform::Delta => Ok(()),
            Transform::Wrap(bounds) => {
                bounds.min_value = buffer.decode_i32()?;
                bounds.max_value = buffer.decode_i32()?;
                bounds.init_corrections();
                Ok(())
            }
            Transform::Octahedron(tb) => {
                *tb = OctahedronToolBox::new(buffer.decode_u8()?)?;
                Ok(())
            }
        }
    }
}
