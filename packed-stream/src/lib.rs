//! Packed Stream - bit-packing of numpy tensors into accelerator word streams.
//!
//! Converts between a `.npy` tensor and a sequence of fixed-width packed
//! words, one word per outer position of the tensor. The last axis is the
//! packable inner axis; every inner element occupies an `ElemBits`-wide slot.
//!
//! # Entry points
//! - [`npy_to_word_stream`]: tensor file → packed words
//! - [`word_stream_to_npy`]: packed words → tensor file
//! - [`npy_to_vector_stream`]: tensor file → `[E; N]` vectors
//! - [`vector_stream_to_npy`]: `[E; N]` vectors → tensor file
//!
//! # Usage
//! ```ignore
//! use packed_stream::{npy_to_word_stream, ElemType, Fifo, StreamOptions};
//!
//! let mut fifo = Fifo::new();
//! let elem: ElemType = "INT4".parse()?;
//! npy_to_word_stream::<f32, _>("input.npy", &mut fifo, elem, &StreamOptions::default())?;
//! for word in fifo.iter() {
//!     println!("{:x}", word);
//! }
//! ```

pub mod codec;
#[macro_use]
mod diagnostics;
pub mod driver;
pub mod element;
pub mod error;
pub mod formats;
pub mod index;
pub mod scalar;
pub mod shape;
pub mod stream;
pub mod tensor;
pub mod word;


// Re-exports
pub use half;
pub use driver::{
    npy_to_vector_stream, npy_to_word_stream, pack_tensor, pack_tensor_vectors, unpack_tensor,
    unpack_tensor_vectors, vector_stream_to_npy, word_bits, word_stream_to_npy, StreamOptions,
};
pub use element::{ElemKind, ElemType};
pub use error::{Result, StreamError};
pub use formats::{npy_load, npy_read, npy_save, npy_write, NpyArray, NpyDescr, NpyDtype, NpyHeader};
pub use scalar::FileScalar;
pub use shape::{decompose, AxisSplit};
pub use stream::{channel, ChannelSink, ChannelSource, Fifo, StreamSink, StreamSource};
pub use tensor::Tensor;
pub use word::PackedWord;
