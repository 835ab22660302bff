//! Mesh Attribute Prediction
//!
//! Predictive coding of per-vertex attributes of triangle meshes. The
//! encoder replaces quantized attribute values with prediction corrections
//! computed from already-coded neighbors over the mesh connectivity; the
//! decoder inverts the process bit-exactly from the corrections plus a
//! small per-scheme side channel.

#![allow(clippy::needless_range_loop)] // Component loops index several slices in lockstep

pub mod bits;
pub mod buffer;
pub mod constrained_multi_parallelogram;
pub mod corner_table;
pub mod difference;
pub mod entropy;
pub mod error;
pub mod geometric_normal;
pub mod indices;
pub mod math;
pub mod mesh_data;
pub mod multi_parallelogram;
pub mod octahedron;
pub mod parallelogram;
pub mod scheme;
pub mod select;
pub mod tex_coords;
pub mod transform;

pub use buffer::{DecoderBuffer, EncoderBuffer};
pub use corner_table::CornerTable;
pub use error::{Error, Result};
pub use indices::{
    CornerIndex, FaceIndex, VertexIndex, INVALID_CORNER_INDEX, INVALID_FACE_INDEX,
    INVALID_VERTEX_INDEX,
};
pub use mesh_data::{MeshData, PositionSource, QuantizedPositions};
pub use scheme::{PredictionMethod, SchemeDecoder, SchemeEncoder};
pub use select::{select_prediction_method, AttributeKind};
pub use transform::{Transform, TransformType};
