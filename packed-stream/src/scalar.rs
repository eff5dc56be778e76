//! Numeric types a tensor file may carry.
//!
//! Conversions follow C cast rules: float to integer truncates toward zero
//! (saturating at the integer range), integer to integer wraps.

use half::f16;
use std::fmt;

/// A scalar type that can be stored in a `.npy` file.
pub trait FileScalar:
    Copy
    + Default
    + PartialEq
    + fmt::Debug
    + fmt::Display
    + Send
    + npyz::Deserialize
    + npyz::AutoSerialize
    + 'static
{
    /// numpy kind character: `i`, `u` or `f`.
    const KIND: char;
    /// Size of one scalar in bytes.
    const WIDTH: usize;

    fn from_le_slice(bytes: &[u8]) -> Self;
    fn from_be_slice(bytes: &[u8]) -> Self;
    fn write_le(self, out: &mut Vec<u8>);

    fn to_i64(self) -> i64;
    fn to_u64(self) -> u64;
    fn to_f64(self) -> f64;
    fn from_i64(v: i64) -> Self;
    fn from_u64(v: u64) -> Self;
    fn from_f64(v: f64) -> Self;

    fn is_float() -> bool {
        Self::KIND == 'f'
    }

    /// numpy `descr` string, e.g. `<f4` or `|u1`.
    fn descr() -> String {
        let order = if Self::WIDTH == 1 { '|' } else { '<' };
        format!("{}{}{}", order, Self::KIND, Self::WIDTH)
    }
}

macro_rules! impl_file_scalar {
    ($($t:ty => $kind:expr),* $(,)?) => {$(
        impl FileScalar for $t {
            const KIND: char = $kind;
            const WIDTH: usize = std::mem::size_of::<$t>();

            fn from_le_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }

            fn from_be_slice(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_be_bytes(buf)
            }

            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn to_i64(self) -> i64 { self as i64 }
            fn to_u64(self) -> u64 { self as u64 }
            fn to_f64(self) -> f64 { self as f64 }
            fn from_i64(v: i64) -> Self { v as $t }
            fn from_u64(v: u64) -> Self { v as $t }
            fn from_f64(v: f64) -> Self { v as $t }
        }
    )*};
}

impl_file_scalar! {
    i8 => 'i', i16 => 'i', i32 => 'i', i64 => 'i',
    u8 => 'u', u16 => 'u', u32 => 'u', u64 => 'u',
    f32 => 'f', f64 => 'f',
}

impl FileScalar for f16 {
    const KIND: char = 'f';
    const WIDTH: usize = 2;

    fn from_le_slice(bytes: &[u8]) -> Self {
        f16::from_le_bytes([bytes[0], bytes[1]])
    }

    fn from_be_slice(bytes: &[u8]) -> Self {
        f16::from_be_bytes([bytes[0], bytes[1]])
    }

    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }

    fn to_i64(self) -> i64 {
        self.to_f64() as i64
    }
    fn to_u64(self) -> u64 {
        self.to_f64() as u64
    }
    fn to_f64(self) -> f64 {
        f16::to_f64(self)
    }
    fn from_i64(v: i64) -> Self {
        f16::from_f64(v as f64)
    }
    fn from_u64(v: u64) -> Self {
        f16::from_f64(v as f64)
    }
    fn from_f64(v: f64) -> Self {
        f16::from_f64(v)
    }
}

/// Explicit numeric cast between two scalar types, `(B) a` in C terms.
pub fn cast<A: FileScalar, B: FileScalar>(a: A) -> B {
    match A::KIND {
        'f' => B::from_f64(a.to_f64()),
        'i' => B::from_i64(a.to_i64()),
        _ => B::from_u64(a.to_u64()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descr_strings() {
        assert_eq!(f32::descr(), "<f4");
        assert_eq!(f64::descr(), "<f8");
        assert_eq!(i8::descr(), "|i1");
        assert_eq!(u8::descr(), "|u1");
        assert_eq!(u16::descr(), "<u2");
        assert_eq!(f16::descr(), "<f2");
    }

    #[test]
    fn test_le_be_decoding() {
        let bytes = 0x0102_0304u32.to_le_bytes();
        assert_eq!(u32::from_le_slice(&bytes), 0x0102_0304);
        assert_eq!(u32::from_be_slice(&bytes), 0x0403_0201);

        let mut out = Vec::new();
        (-2i16).write_le(&mut out);
        assert_eq!(out, vec![0xFE, 0xFF]);
    }

    #[test]
    fn test_float_to_int_truncates_toward_zero() {
        assert_eq!(cast::<f32, i32>(2.9), 2);
        assert_eq!(cast::<f32, i32>(-2.9), -2);
        assert_eq!(cast::<f64, u8>(300.0), 255);
    }

    #[test]
    fn test_int_to_int_wraps() {
        assert_eq!(cast::<i32, u8>(257), 1);
        assert_eq!(cast::<i8, u16>(-1), 0xFFFF);
        assert_eq!(cast::<u64, i64>(u64::MAX), -1);
    }

    #[test]
    fn test_f16_conversions() {
        let h: f16 = cast::<f32, f16>(1.5);
        assert_eq!(h, f16::from_f32(1.5));
        assert_eq!(cast::<f16, i32>(h), 1);
        assert_eq!(h.to_f64(), 1.5);
    }
}
