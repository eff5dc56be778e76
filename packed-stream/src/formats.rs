//! `.npy` tensor files.
//!
//! Header parsing and data encoding are delegated to `npyz`. This module
//! adapts the result to the engine: a runtime [`NpyDtype`] tag, the scalar
//! width check and an atomic save.
//!
//! Loaded data is normalised to little-endian bytes of the file's own
//! scalar type, so [`NpyArray::values`] can reinterpret a same-width file
//! without another pass through the reader.

use npyz::{DType, NpyFile, Order, WriteOptions, WriterBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use crate::error::{Result, StreamError};
use crate::scalar::FileScalar;

/// Parsed `descr` field: byte order, kind and scalar width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NpyDescr {
    pub kind: char,
    pub word_size: usize,
    pub big_endian: bool,
}

impl NpyDescr {
    pub fn parse(text: &str) -> Result<Self> {
        let mut chars = text.chars();
        let (big_endian, kind) = match chars.next() {
            Some('<') | Some('|') | Some('=') => (false, chars.next()),
            Some('>') => (true, chars.next()),
            first => (false, first),
        };
        let kind = kind.ok_or_else(|| StreamError::Format(format!("empty descr '{}'", text)))?;
        let word_size: usize = chars
            .as_str()
            .parse()
            .map_err(|_| StreamError::Format(format!("unsupported descr '{}'", text)))?;
        Ok(Self {
            kind,
            word_size,
            big_endian,
        })
    }
}

impl fmt::Display for NpyDescr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = if self.word_size == 1 {
            '|'
        } else if self.big_endian {
            '>'
        } else {
            '<'
        };
        write!(f, "{}{}{}", order, self.kind, self.word_size)
    }
}

/// Scalar types the CLI can dispatch on at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NpyDtype {
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float16,
    Float32,
    Float64,
}

impl NpyDtype {
    pub const ALL: [NpyDtype; 11] = [
        Self::Int8,
        Self::Int16,
        Self::Int32,
        Self::Int64,
        Self::Uint8,
        Self::Uint16,
        Self::Uint32,
        Self::Uint64,
        Self::Float16,
        Self::Float32,
        Self::Float64,
    ];

    pub fn from_descr(descr: &NpyDescr) -> Result<Self> {
        let dtype = match (descr.kind, descr.word_size) {
            ('i', 1) => Self::Int8,
            ('i', 2) => Self::Int16,
            ('i', 4) => Self::Int32,
            ('i', 8) => Self::Int64,
            ('u', 1) => Self::Uint8,
            ('u', 2) => Self::Uint16,
            ('u', 4) => Self::Uint32,
            ('u', 8) => Self::Uint64,
            ('f', 2) => Self::Float16,
            ('f', 4) => Self::Float32,
            ('f', 8) => Self::Float64,
            _ => {
                return Err(StreamError::Format(format!(
                    "unsupported npy dtype '{}'",
                    descr
                )))
            }
        };
        Ok(dtype)
    }

    pub fn word_size(&self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 | Self::Float16 => 2,
            Self::Int32 | Self::Uint32 | Self::Float32 => 4,
            Self::Int64 | Self::Uint64 | Self::Float64 => 8,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Int8 => "int8",
            Self::Int16 => "int16",
            Self::Int32 => "int32",
            Self::Int64 => "int64",
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
        }
    }
}

impl fmt::Display for NpyDtype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for NpyDtype {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|d| d.name() == lower)
            .ok_or_else(|| StreamError::Format(format!("unknown npy dtype '{}'", s)))
    }
}

/// Run `$body` with `$T` bound to the Rust scalar type of an [`NpyDtype`].
///
/// ```ignore
/// let n = with_npy_dtype!(dtype, T => std::mem::size_of::<T>());
/// ```
#[macro_export]
macro_rules! with_npy_dtype {
    ($dtype:expr, $T:ident => $body:expr) => {
        match $dtype {
            $crate::NpyDtype::Int8 => { type $T = i8; $body }
            $crate::NpyDtype::Int16 => { type $T = i16; $body }
            $crate::NpyDtype::Int32 => { type $T = i32; $body }
            $crate::NpyDtype::Int64 => { type $T = i64; $body }
            $crate::NpyDtype::Uint8 => { type $T = u8; $body }
            $crate::NpyDtype::Uint16 => { type $T = u16; $body }
            $crate::NpyDtype::Uint32 => { type $T = u32; $body }
            $crate::NpyDtype::Uint64 => { type $T = u64; $body }
            $crate::NpyDtype::Float16 => { type $T = $crate::half::f16; $body }
            $crate::NpyDtype::Float32 => { type $T = f32; $body }
            $crate::NpyDtype::Float64 => { type $T = f64; $body }
        }
    };
}

/// Number of scalars described by `shape`, failing on overflow.
fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
        .ok_or_else(|| StreamError::Format(format!("shape {:?} overflows the element count", shape)))
}

/// Header fields of a `.npy` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpyHeader {
    pub descr: NpyDescr,
    pub fortran_order: bool,
    pub shape: Vec<usize>,
}

impl NpyHeader {
    fn from_file<R: Read>(npy: &NpyFile<R>) -> Result<Self> {
        let descr = match npy.dtype() {
            DType::Plain(type_str) => NpyDescr::parse(&type_str.to_string())?,
            other => {
                return Err(StreamError::Format(format!(
                    "structured dtype {:?} is not supported",
                    other
                )))
            }
        };
        let shape = npy
            .shape()
            .iter()
            .map(|&dim| {
                usize::try_from(dim)
                    .map_err(|_| StreamError::Format(format!("dimension {} is too large", dim)))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            descr,
            fortran_order: matches!(npy.order(), Order::Fortran),
            shape,
        })
    }

    /// Number of scalars described by the shape (1 for a 0-d array).
    pub fn num_vals(&self) -> Result<usize> {
        element_count(&self.shape)
    }

    /// Size of the data section in bytes.
    pub fn data_len(&self) -> Result<usize> {
        self.num_vals()?
            .checked_mul(self.descr.word_size)
            .ok_or_else(|| StreamError::Format(format!("shape {:?} overflows the data size", self.shape)))
    }
}

/// A loaded `.npy` file: header plus data as little-endian bytes.
#[derive(Debug, Clone)]
pub struct NpyArray {
    pub header: NpyHeader,
    data: Vec<u8>,
}

impl NpyArray {
    pub fn shape(&self) -> &[usize] {
        &self.header.shape
    }

    /// Declared size of one scalar in bytes.
    pub fn word_size(&self) -> usize {
        self.header.descr.word_size
    }

    pub fn num_vals(&self) -> usize {
        self.data.len() / self.word_size()
    }

    pub fn dtype(&self) -> Result<NpyDtype> {
        NpyDtype::from_descr(&self.header.descr)
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Decode the data as `N`.
    ///
    /// Only the scalar width is checked; a file of matching width but a
    /// different kind is reinterpreted bit for bit.
    pub fn values<N: FileScalar>(&self) -> Result<Vec<N>> {
        if self.word_size() != N::WIDTH {
            return Err(StreamError::SizeMismatch {
                expected: N::WIDTH,
                found: self.word_size(),
            });
        }
        Ok(self.data.chunks_exact(N::WIDTH).map(N::from_le_slice).collect())
    }
}

/// Stream every scalar of `npy` as `T` into `out`.
///
/// The buffer grows with the data actually read, never with the size the
/// header claims.
fn read_data<T: FileScalar, R: Read>(npy: NpyFile<R>, out: &mut Vec<u8>) -> Result<()> {
    let reader = npy
        .data::<T>()
        .map_err(|e| StreamError::Format(format!("cannot read data: {}", e)))?;
    for value in reader {
        let value = value.map_err(|e| match e.kind() {
            io::ErrorKind::UnexpectedEof => StreamError::Format("npy data is truncated".into()),
            _ => StreamError::Io(e),
        })?;
        value.write_le(out);
    }
    Ok(())
}

/// Read a `.npy` array from `reader`.
pub fn npy_read<R: Read>(reader: &mut R) -> Result<NpyArray> {
    let npy = NpyFile::new(reader)?;
    let header = NpyHeader::from_file(&npy)?;
    if header.fortran_order {
        return Err(StreamError::Format(
            "fortran-ordered arrays are not supported".into(),
        ));
    }
    let dtype = NpyDtype::from_descr(&header.descr)?;
    let expected = header.data_len()?;

    let mut data = Vec::new();
    with_npy_dtype!(dtype, T => read_data::<T, _>(npy, &mut data))?;
    if data.len() != expected {
        return Err(StreamError::Format(format!(
            "npy data has {} bytes, header declares {}",
            data.len(),
            expected
        )));
    }
    Ok(NpyArray { header, data })
}

/// Load a `.npy` file.
pub fn npy_load(path: impl AsRef<Path>) -> Result<NpyArray> {
    let file = fs::File::open(path.as_ref())?;
    npy_read(&mut BufReader::new(file))
}

/// Write `values` with `shape` as a `.npy` stream.
pub fn npy_write<W: Write, N: FileScalar>(w: &mut W, values: &[N], shape: &[usize]) -> Result<()> {
    let expected = element_count(shape)?;
    if expected != values.len() {
        return Err(StreamError::Shape(format!(
            "shape {:?} holds {} elements but {} values were given",
            shape,
            expected,
            values.len()
        )));
    }
    let dims: Vec<u64> = shape.iter().map(|&dim| dim as u64).collect();
    let mut writer = WriteOptions::<N>::new()
        .default_dtype()
        .shape(&dims)
        .writer(w)
        .begin_nd()?;
    for value in values {
        writer.push(value)?;
    }
    writer.finish()?;
    Ok(())
}

/// Save `values` with `shape` to `path`, replacing any existing file.
///
/// The array is written to a sibling temporary file and renamed into place,
/// so a failed save never leaves a half-written file at `path`.
pub fn npy_save<N: FileScalar>(path: impl AsRef<Path>, values: &[N], shape: &[usize]) -> Result<()> {
    let path = path.as_ref();
    let file_name = path
        .file_name()
        .ok_or_else(|| StreamError::Format(format!("not a file path: {}", path.display())))?;
    let tmp_path = path.with_file_name(format!(".{}.tmp", file_name.to_string_lossy()));

    let write = || -> Result<()> {
        let mut writer = BufWriter::new(fs::File::create(&tmp_path)?);
        npy_write(&mut writer, values, shape)?;
        writer.flush()?;
        Ok(())
    };
    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    fs::rename(&tmp_path, path)?;
    Ok(())
}
