//! Stream driver: full tensor ↔ stream conversions.
//!
//! Every conversion walks the outer positions of the tensor in order and
//! handles one packed word (or one vector) per outer position. The file
//! entry points repeat the whole load → stream or stream → save cycle
//! `num_reps` times; replays share nothing but the stream.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::codec;
use crate::element::ElemType;
use crate::error::{Result, StreamError};
use crate::formats::{npy_load, npy_save};
use crate::index::{block_slot_index, slot_order};
use crate::scalar::{cast, FileScalar};
use crate::shape::decompose;
use crate::stream::{StreamSink, StreamSource};
use crate::tensor::Tensor;
use crate::word::PackedWord;

#[cfg(feature = "diagnostics")]
use crate::diagnostics::format_elem;

/// Traversal and replay options shared by every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamOptions {
    /// Place the first inner element in the highest slot (per block).
    pub reverse_inner: bool,
    /// Number of independent replays of the whole tensor.
    pub num_reps: usize,
    /// Number of sub-blocks the inner axis is split into, each reversed on its own.
    pub multi_pixel_out: usize,
}

impl Default for StreamOptions {
    fn default() -> Self {
        Self {
            reverse_inner: true,
            num_reps: 1,
            multi_pixel_out: 1,
        }
    }
}

impl StreamOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reverse_inner(mut self, reverse_inner: bool) -> Self {
        self.reverse_inner = reverse_inner;
        self
    }

    pub fn num_reps(mut self, num_reps: usize) -> Self {
        self.num_reps = num_reps;
        self
    }

    pub fn multi_pixel_out(mut self, multi_pixel_out: usize) -> Self {
        self.multi_pixel_out = multi_pixel_out;
        self
    }
}

/// Width in bits of the packed word for one outer position of `shape`.
pub fn word_bits(shape: &[usize], elem: ElemType) -> Result<usize> {
    Ok(decompose(shape, 1)?.word_bits(elem.bits()))
}

//=============================================================================
// In-memory conversions
//=============================================================================

/// Pack `tensor` into one word per outer position and push each word.
///
/// Uses `reverse_inner` and `multi_pixel_out` from `opts`; replays are left
/// to the caller.
pub fn pack_tensor<N, S>(
    tensor: &Tensor<N>,
    out: &mut S,
    elem: ElemType,
    opts: &StreamOptions,
) -> Result<()>
where
    N: FileScalar,
    S: StreamSink<PackedWord> + ?Sized,
{
    let split = decompose(tensor.shape(), opts.multi_pixel_out)?;
    let elem_bits = elem.bits();
    let word_bits = split.word_bits(elem_bits);
    let inner_full = split.inner_full();
    diag_debug!(
        target: "packed_stream::pack",
        n_outer = split.outer,
        n_inner = split.inner,
        multi_pixel_out = split.multi_pixel_out,
        word_bits,
        elem = %elem,
        "packing tensor"
    );

    let values = tensor.values();
    for outer in 0..split.outer {
        let row = &values[outer * inner_full..(outer + 1) * inner_full];
        let mut word = PackedWord::new(word_bits);
        for (&value, slot) in row.iter().zip(slot_order(&split, opts.reverse_inner)) {
            let raw = codec::encode(elem, value);
            diag_trace!(
                target: "packed_stream::pack",
                npy = %value,
                elem = %format_elem(elem, raw),
                slot,
                "element"
            );
            word.set_slot(slot, elem_bits, raw);
        }
        diag_trace!(target: "packed_stream::pack", outer, word = %word, "packed word");
        out.push(word)?;
    }
    Ok(())
}

/// Pop one word per outer position of `shape` and rebuild the tensor.
pub fn unpack_tensor<N, S>(
    input: &mut S,
    shape: &[usize],
    elem: ElemType,
    opts: &StreamOptions,
) -> Result<Tensor<N>>
where
    N: FileScalar,
    S: StreamSource<PackedWord> + ?Sized,
{
    let split = decompose(shape, opts.multi_pixel_out)?;
    let elem_bits = elem.bits();
    let expected_bits = split.word_bits(elem_bits);
    diag_debug!(
        target: "packed_stream::unpack",
        n_outer = split.outer,
        n_inner = split.inner,
        multi_pixel_out = split.multi_pixel_out,
        word_bits = expected_bits,
        elem = %elem,
        "unpacking tensor"
    );

    let mut values = Vec::with_capacity(split.num_elements());
    for _outer in 0..split.outer {
        let word = input.pop()?;
        if word.width() < expected_bits {
            return Err(StreamError::WordWidth {
                expected: expected_bits,
                found: word.width(),
            });
        }
        diag_trace!(target: "packed_stream::unpack", outer = _outer, word = %word, "packed word");
        for slot in slot_order(&split, opts.reverse_inner) {
            let raw = word.slot(slot, elem_bits);
            let value: N = codec::decode(elem, raw);
            diag_trace!(
                target: "packed_stream::unpack",
                elem = %format_elem(elem, raw),
                npy = %value,
                slot,
                "element"
            );
            values.push(value);
        }
    }
    Tensor::new(shape.to_vec(), values)
}

/// Push one `[E; W]` vector per outer position, element `ii` at index `ii`.
///
/// `reverse_inner` is accepted but not applied and `multi_pixel_out` is not
/// used: vectors are always filled in positional order. The last axis must
/// fit in `W`; unused trailing lanes hold `E::default()`.
pub fn pack_tensor_vectors<N, E, const W: usize, S>(
    tensor: &Tensor<N>,
    out: &mut S,
    opts: &StreamOptions,
) -> Result<()>
where
    N: FileScalar,
    E: FileScalar,
    S: StreamSink<[E; W]> + ?Sized,
{
    let split = decompose(tensor.shape(), 1)?;
    if split.inner > W {
        return Err(StreamError::Shape(format!(
            "inner dimension {} does not fit in a {}-element vector",
            split.inner, W
        )));
    }
    diag_debug!(
        target: "packed_stream::pack",
        n_outer = split.outer,
        n_inner = split.inner,
        lanes = W,
        "packing tensor into vectors"
    );
    if opts.reverse_inner {
        diag_debug!(
            target: "packed_stream::pack",
            "reverse_inner is not applied to vector streams"
        );
    }

    let values = tensor.values();
    for outer in 0..split.outer {
        let row = &values[outer * split.inner..(outer + 1) * split.inner];
        let mut vec = [E::default(); W];
        for (lane, &value) in vec.iter_mut().zip(row) {
            *lane = cast(value);
        }
        diag_trace!(target: "packed_stream::pack", outer, vec = ?vec, "vector");
        out.push(vec)?;
    }
    Ok(())
}

/// Pop one `[E; W]` vector per sub-block of each outer position and rebuild
/// the tensor, reversing within each sub-block when `reverse_inner` is set.
pub fn unpack_tensor_vectors<N, E, const W: usize, S>(
    input: &mut S,
    shape: &[usize],
    opts: &StreamOptions,
) -> Result<Tensor<N>>
where
    N: FileScalar,
    E: FileScalar,
    S: StreamSource<[E; W]> + ?Sized,
{
    let split = decompose(shape, opts.multi_pixel_out)?;
    if split.inner_full() > W {
        return Err(StreamError::Shape(format!(
            "last dimension {} does not fit in a {}-element vector",
            split.inner_full(),
            W
        )));
    }
    diag_debug!(
        target: "packed_stream::unpack",
        n_outer = split.outer,
        n_inner = split.inner,
        multi_pixel_out = split.multi_pixel_out,
        lanes = W,
        "unpacking vectors"
    );

    let mut values = Vec::with_capacity(split.num_elements());
    for _outer in 0..split.outer {
        for block in 0..split.multi_pixel_out {
            let results = input.pop()?;
            diag_trace!(target: "packed_stream::unpack", outer = _outer, block, vec = ?results, "vector");
            for ii in 0..split.inner {
                let i = block_slot_index(block, ii, split.inner, opts.reverse_inner);
                values.push(cast(results[i]));
            }
        }
    }
    Tensor::new(shape.to_vec(), values)
}

//=============================================================================
// File entry points
//=============================================================================

/// Load `path` as a tensor of `N`, failing before any streaming if the
/// file's scalar width differs from `N`.
fn load_tensor<N: FileScalar>(path: &Path) -> Result<Tensor<N>> {
    let arr = npy_load(path)?;
    diag_debug!(
        word_size = arr.word_size(),
        num_vals = arr.num_vals(),
        descr = %arr.header.descr,
        "loaded {}",
        path.display()
    );
    if arr.header.descr.kind != N::KIND {
        diag_debug!(
            descr = %arr.header.descr,
            requested = %N::descr(),
            "scalar kind differs from the file, bits are reinterpreted"
        );
    }
    let values = arr.values::<N>()?;
    Tensor::new(arr.header.shape, values)
}

/// Pack the tensor at `npy_path` into `out`, `opts.num_reps` times.
///
/// The file is reloaded for every replay.
pub fn npy_to_word_stream<N, S>(
    npy_path: impl AsRef<Path>,
    out: &mut S,
    elem: ElemType,
    opts: &StreamOptions,
) -> Result<()>
where
    N: FileScalar,
    S: StreamSink<PackedWord> + ?Sized,
{
    let path = npy_path.as_ref();
    for _rep in 0..opts.num_reps {
        diag_debug!(rep = _rep, num_reps = opts.num_reps, "npy to word stream");
        let tensor = load_tensor::<N>(path)?;
        pack_tensor(&tensor, out, elem, opts)?;
    }
    Ok(())
}

/// Unpack `shape` worth of words from `input` into `npy_path`, `opts.num_reps` times.
///
/// Each replay overwrites the file with a freshly rebuilt tensor.
pub fn word_stream_to_npy<N, S>(
    input: &mut S,
    shape: &[usize],
    npy_path: impl AsRef<Path>,
    elem: ElemType,
    opts: &StreamOptions,
) -> Result<()>
where
    N: FileScalar,
    S: StreamSource<PackedWord> + ?Sized,
{
    let path = npy_path.as_ref();
    for _rep in 0..opts.num_reps {
        diag_debug!(rep = _rep, num_reps = opts.num_reps, "word stream to npy");
        let tensor: Tensor<N> = unpack_tensor(input, shape, elem, opts)?;
        npy_save(path, tensor.values(), tensor.shape())?;
    }
    Ok(())
}

/// Vector variant of [`npy_to_word_stream`].
pub fn npy_to_vector_stream<N, E, const W: usize, S>(
    npy_path: impl AsRef<Path>,
    out: &mut S,
    opts: &StreamOptions,
) -> Result<()>
where
    N: FileScalar,
    E: FileScalar,
    S: StreamSink<[E; W]> + ?Sized,
{
    let path = npy_path.as_ref();
    for _rep in 0..opts.num_reps {
        diag_debug!(rep = _rep, num_reps = opts.num_reps, "npy to vector stream");
        let tensor = load_tensor::<N>(path)?;
        pack_tensor_vectors::<N, E, W, S>(&tensor, out, opts)?;
    }
    Ok(())
}

/// Vector variant of [`word_stream_to_npy`].
pub fn vector_stream_to_npy<N, E, const W: usize, S>(
    input: &mut S,
    shape: &[usize],
    npy_path: impl AsRef<Path>,
    opts: &StreamOptions,
) -> Result<()>
where
    N: FileScalar,
    E: FileScalar,
    S: StreamSource<[E; W]> + ?Sized,
{
    let path = npy_path.as_ref();
    for _rep in 0..opts.num_reps {
        diag_debug!(rep = _rep, num_reps = opts.num_reps, "vector stream to npy");
        let tensor: Tensor<N> = unpack_tensor_vectors::<N, E, W, S>(input, shape, opts)?;
        npy_save(path, tensor.values(), tensor.shape())?;
    }
    Ok(())
}
