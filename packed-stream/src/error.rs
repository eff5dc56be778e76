//! Error type shared by every stage of the pack/unpack engine.

use thiserror::Error;

/// Errors raised while loading, packing, streaming or saving a tensor.
///
/// Every error aborts the current call; nothing is retried and no partial
/// output file is written.
#[derive(Error, Debug)]
pub enum StreamError {
    /// The file's scalar byte width differs from the requested numeric type.
    #[error("npy word size {found} does not match requested scalar size {expected}")]
    SizeMismatch { expected: usize, found: usize },

    #[error("last dimension {last_dim} is not divisible by multi_pixel_out {multi_pixel_out}")]
    ShapeDivisibility {
        last_dim: usize,
        multi_pixel_out: usize,
    },

    #[error("invalid shape: {0}")]
    Shape(String),

    /// A popped word cannot hold all slots of one outer position.
    #[error("packed word is {found} bits wide, expected at least {expected}")]
    WordWidth { expected: usize, found: usize },

    #[error("stream fault: {0}")]
    StreamFault(String),

    #[error("invalid element type: {0}")]
    ElemType(String),

    #[error("malformed input: {0}")]
    Format(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StreamError>;
