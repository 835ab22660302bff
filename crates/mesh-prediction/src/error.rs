//! Error type shared by the prediction layer.

/// Errors raised while encoding or decoding predicted attribute data.
///
/// Unavailable predictors (boundary edges, not-yet-coded neighbors) are not
/// errors; the schemes silently fall back to a cheaper predictor. Errors are
/// reserved for malformed side-channel data and violated preconditions.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("attribute data of length {len} is not a multiple of {num_components} components")]
    InvalidDataLength { len: usize, num_components: usize },

    #[error("scheme requires {want} components per entry, attribute has {got}")]
    InvalidComponentCount { want: usize, got: usize },

    #[error("attribute data holds {got} entries, connectivity maps describe {want}")]
    EntryCountMismatch { want: usize, got: usize },

    #[error("position parent holds {got} entries, dependent attribute needs {want}")]
    ParentEntryCountMismatch { want: usize, got: usize },

    #[error("quantization bits {0} outside the supported [2, 30] range")]
    InvalidQuantizationBits(u8),

    #[error("unknown prediction method id {0}")]
    UnknownPredictionMethod(u8),

    #[error("prediction method id {0} is no longer supported")]
    DeprecatedPredictionMethod(u8),

    #[error("unknown prediction transform id {0}")]
    UnknownTransformType(u8),

    #[error("crease flag count {count} for context {context} exceeds limit {limit}")]
    InvalidFlagCount {
        context: usize,
        count: u64,
        limit: u64,
    },

    #[error("crease flag stream for context {context} exhausted before all vertices were decoded")]
    FlagStreamExhausted { context: usize },

    #[error("orientation bit stream exhausted before all entries were decoded")]
    OrientationStreamExhausted,

    #[error("normal flip bit stream exhausted before all entries were decoded")]
    FlipStreamExhausted,

    #[error("buffer underflow at byte offset {0}")]
    BufferUnderflow(usize),

    #[error("bit stream read past the encoded payload")]
    BitStreamExhausted,

    #[error("varint value does not fit in 64 bits")]
    VarintOverflow,

    #[error("directed edge ({from}, {to}) appears in more than one face")]
    NonManifoldEdge { from: u32, to: u32 },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
