//! Encoder-side prediction method selection.

use crate::scheme::PredictionMethod;

/// Semantic class of the attribute being coded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
    Position,
    Normal,
    TexCoord,
    Generic,
}

/// Picks the prediction method for an attribute.
///
/// |speed| trades compression for encode time: 0 is the slowest and
/// densest setting, 10 disables prediction beyond plain deltas.
/// |has_position_parent| tells whether a decoded position attribute is
/// available for the position-dependent schemes.
pub fn select_prediction_method(
    speed: i32,
    kind: AttributeKind,
    num_components: usize,
    num_points: usize,
    has_position_parent: bool,
) -> PredictionMethod {
    if speed >= 10 {
        return PredictionMethod::Difference;
    }
    if speed < 4 && has_position_parent {
        if kind == AttributeKind::TexCoord && num_components == 2 {
            return PredictionMethod::TexCoordsPortable;
        }
        if kind == AttributeKind::Normal {
            return PredictionMethod::GeometricNormal;
        }
    }
    if speed >= 8 {
        return PredictionMethod::Difference;
    }
    if speed >= 2 || num_points < 40 {
        // Faster settings and tiny meshes do not amortize the subset
        // search of the constrained scheme.
        return PredictionMethod::Parallelogram;
    }
    PredictionMethod::ConstrainedMultiParallelogram
}
