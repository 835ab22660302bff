//! Prediction method ids and the closed scheme dispatch.
//!
//! The scheme set is fixed, so dispatch is a tagged enum rather than trait
//! objects; callers construct the variant they need and drive it through
//! the shared four-call contract.

use tracing::debug;

use crate::buffer::{DecoderBuffer, EncoderBuffer};
use crate::constrained_multi_parallelogram::{
    ConstrainedMultiParallelogramDecoder, ConstrainedMultiParallelogramEncoder,
};
use crate::difference::{DifferenceDecoder, DifferenceEncoder};
use crate::error::{Error, Result};
use crate::geometric_normal::{GeometricNormalDecoder, GeometricNormalEncoder};
use crate::mesh_data::PositionSource;
use crate::multi_parallelogram::{MultiParallelogramDecoder, MultiParallelogramEncoder};
use crate::parallelogram::{ParallelogramDecoder, ParallelogramEncoder};
use crate::tex_coords::{TexCoordsPortableDecoder, TexCoordsPortableEncoder};
use crate::transform::{Transform, TransformType};

/// Wire ids of the prediction methods. Id 3 belonged to a retired texture
/// coordinate scheme and is rejected on parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionMethod {
    Difference = 0,
    Parallelogram = 1,
    MultiParallelogram = 2,
    ConstrainedMultiParallelogram = 4,
    TexCoordsPortable = 5,
    GeometricNormal = 6,
}

impl PredictionMethod {
    pub fn id(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for PredictionMethod {
    type Error = Error;

    fn try_from(id: u8) -> Result<Self> {
        match id {
            0 => Ok(PredictionMethod::Difference),
            1 => Ok(PredictionMethod::Parallelogram),
            2 => Ok(PredictionMethod::MultiParallelogram),
            3 => Err(Error::DeprecatedPredictionMethod(3)),
            4 => Ok(PredictionMethod::ConstrainedMultiParallelogram),
            5 => Ok(PredictionMethod::TexCoordsPortable),
            6 => Ok(PredictionMethod::GeometricNormal),
            other => Err(Error::UnknownPredictionMethod(other)),
        }
    }
}

pub(crate) fn checked_entries(len: usize, num_components: usize) -> Result<usize> {
    if num_components == 0 || len % num_components != 0 {
        return Err(Error::InvalidDataLength {
            len,
            num_components,
        });
    }
    Ok(len / num_components)
}

pub(crate) fn check_mesh_entries(got: usize, want: usize) -> Result<()> {
    if got != want {
        return Err(Error::EntryCountMismatch { want, got });
    }
    Ok(())
}

/// A position parent shorter than the dependent attribute is rejected at
/// scheme construction, before any entry is touched.
pub(crate) fn check_position_parent(positions: &dyn PositionSource, want: usize) -> Result<()> {
    let got = positions.num_positions();
    if got < want {
        return Err(Error::ParentEntryCountMismatch { want, got });
    }
    Ok(())
}

/// Encoder side of the scheme family.
pub enum SchemeEncoder<'a> {
    Difference(DifferenceEncoder),
    Parallelogram(ParallelogramEncoder<'a>),
    MultiParallelogram(MultiParallelogramEncoder<'a>),
    ConstrainedMultiParallelogram(ConstrainedMultiParallelogramEncoder<'a>),
    TexCoordsPortable(TexCoordsPortableEncoder<'a>),
    GeometricNormal(GeometricNormalEncoder<'a>),
}

impl<'a> SchemeEncoder<'a> {
    pub fn method(&self) -> PredictionMethod {
        match self {
            SchemeEncoder::Difference(_) => PredictionMethod::Difference,
            SchemeEncoder::Parallelogram(_) => PredictionMethod::Parallelogram,
            SchemeEncoder::MultiParallelogram(_) => PredictionMethod::MultiParallelogram,
            SchemeEncoder::ConstrainedMultiParallelogram(_) => {
                PredictionMethod::ConstrainedMultiParallelogram
            }
            SchemeEncoder::TexCoordsPortable(_) => PredictionMethod::TexCoordsPortable,
            SchemeEncoder::GeometricNormal(_) => PredictionMethod::GeometricNormal,
        }
    }

    pub fn transform(&self) -> &Transform {
        match self {
            SchemeEncoder::Difference(s) => s.transform(),
            SchemeEncoder::Parallelogram(s) => s.transform(),
            SchemeEncoder::MultiParallelogram(s) => s.transform(),
            SchemeEncoder::ConstrainedMultiParallelogram(s) => s.transform(),
            SchemeEncoder::TexCoordsPortable(s) => s.transform(),
            SchemeEncoder::GeometricNormal(s) => s.transform(),
        }
    }

    pub fn transform_type(&self) -> TransformType {
        self.transform().transform_type()
    }

    /// Replaces attribute values with prediction corrections in place.
    pub fn compute_corrections(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        debug!(
            method = ?self.method(),
            len = data.len(),
            num_components,
            "computing corrections"
        );
        match self {
            SchemeEncoder::Difference(s) => s.compute_corrections(data, num_components),
            SchemeEncoder::Parallelogram(s) => s.compute_corrections(data, num_components),
            SchemeEncoder::MultiParallelogram(s) => s.compute_corrections(data, num_components),
            SchemeEncoder::ConstrainedMultiParallelogram(s) => {
                s.compute_corrections(data, num_components)
            }
            SchemeEncoder::TexCoordsPortable(s) => s.compute_corrections(data, num_components),
            SchemeEncoder::GeometricNormal(s) => s.compute_corrections(data, num_components),
        }
    }

    /// Writes the side-channel data the decoder needs (flag streams and
    /// transform parameters).
    pub fn encode_prediction_data(&self, buffer: &mut EncoderBuffer) -> Result<()> {
        match self {
            SchemeEncoder::Difference(s) => s.encode_prediction_data(buffer),
            SchemeEncoder::Parallelogram(s) => s.encode_prediction_data(buffer),
            SchemeEncoder::MultiParallelogram(s) => s.encode_prediction_data(buffer),
            SchemeEncoder::ConstrainedMultiParallelogram(s) => s.encode_prediction_data(buffer),
            SchemeEncoder::TexCoordsPortable(s) => s.encode_prediction_data(buffer),
            SchemeEncoder::GeometricNormal(s) => s.encode_prediction_data(buffer),
        }
    }
}

/// Decoder side of the scheme family.
pub enum SchemeDecoder<'a> {
    Difference(DifferenceDecoder),
    Parallelogram(ParallelogramDecoder<'a>),
    MultiParallelogram(MultiParallelogramDecoder<'a>),
    ConstrainedMultiParallelogram(ConstrainedMultiParallelogramDecoder<'a>),
    TexCoordsPortable(TexCoordsPortableDecoder<'a>),
    GeometricNormal(GeometricNormalDecoder<'a>),
}

impl<'a> SchemeDecoder<'a> {
    pub fn method(&self) -> PredictionMethod {
        match self {
            SchemeDecoder::Difference(_) => PredictionMethod::Difference,
            SchemeDecoder::Parallelogram(_) => PredictionMethod::Parallelogram,
            SchemeDecoder::MultiParallelogram(_) => PredictionMethod::MultiParallelogram,
            SchemeDecoder::ConstrainedMultiParallelogram(_) => {
                PredictionMethod::ConstrainedMultiParallelogram
            }
            SchemeDecoder::TexCoordsPortable(_) => PredictionMethod::TexCoordsPortable,
            SchemeDecoder::GeometricNormal(_) => PredictionMethod::GeometricNormal,
        }
    }

    pub fn decode_prediction_data(&mut self, buffer: &mut DecoderBuffer<'_>) -> Result<()> {
        debug!(method = ?self.method(), "decoding prediction data");
        match self {
            SchemeDecoder::Difference(s) => s.decode_prediction_data(buffer),
            SchemeDecoder::Parallelogram(s) => s.decode_prediction_data(buffer),
            SchemeDecoder::MultiParallelogram(s) => s.decode_prediction_data(buffer),
            SchemeDecoder::ConstrainedMultiParallelogram(s) => s.decode_prediction_data(buffer),
            SchemeDecoder::TexCoordsPortable(s) => s.decode_prediction_data(buffer),
            SchemeDecoder::GeometricNormal(s) => s.decode_prediction_data(buffer),
        }
    }

    /// Replaces corrections with recovered attribute values in place.
    pub fn recover_values(&mut self, data: &mut [i32], num_components: usize) -> Result<()> {
        match self {
            SchemeDecoder::Difference(s) => s.recover_values(data, num_components),
            SchemeDecoder::Parallelogram(s) => s.recover_values(data, num_components),
            SchemeDecoder::MultiParallelogram(s) => s.recover_values(data, num_components),
            SchemeDecoder::ConstrainedMultiParallelogram(s) => {
                s.recover_values(data, num_components)
            }
            SchemeDecoder::TexCoordsPortable(s) => s.recover_values(data, num_components),
            SchemeDecoder::GeometricNormal(s) => s.recover_values(data, num_components),
        }
    }
}
