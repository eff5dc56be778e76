//! Element codec: one scalar to and from the raw bits of one slot.
//!
//! Packing casts the file scalar into the element type and keeps the raw
//! bit pattern of the cast value. Unpacking reads the slot as an unsigned
//! pattern, reinterprets it as the element type and casts the element to
//! the file scalar type. The reinterpretation always goes through a named
//! element value (`to_bits` / `from_bits`), never through memory punning.

use half::f16;

use crate::element::ElemType;
use crate::scalar::FileScalar;

/// All-ones mask covering the low `bits` bits.
#[inline]
pub fn mask(bits: u32) -> u64 {
    if bits >= 64 {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

/// Interpret the low `bits` bits of `raw` as a two's complement number.
#[inline]
pub fn sign_extend(raw: u64, bits: u32) -> i64 {
    if bits == 0 {
        return 0;
    }
    if bits >= 64 {
        return raw as i64;
    }
    let shift = 64 - bits;
    ((raw << shift) as i64) >> shift
}

#[inline]
fn fixed_scale(elem: ElemType) -> f64 {
    2f64.powi(elem.frac_bits() as i32)
}

/// Cast `value` into `elem` and return its raw slot bits.
///
/// No range check is done: integer targets keep the low bits of the cast
/// value, fixed point floors and wraps.
pub fn encode<N: FileScalar>(elem: ElemType, value: N) -> u64 {
    let raw = match elem {
        ElemType::Int { .. } | ElemType::UInt { .. } => {
            // non-negative floats into unsigned slots go through u64 so the
            // top half of the range does not saturate at i64::MAX
            match N::KIND {
                'u' => value.to_u64(),
                'f' if !elem.is_signed() && value.to_f64() >= 0.0 => value.to_u64(),
                _ => value.to_i64() as u64,
            }
        }
        ElemType::Bipolar => u64::from(value.to_f64() >= 0.0),
        ElemType::Fixed { .. } => {
            let scaled = (value.to_f64() * fixed_scale(elem)).floor();
            scaled as i64 as u64
        }
        ElemType::Float32 => {
            let elem_value = value.to_f64() as f32;
            u64::from(elem_value.to_bits())
        }
        ElemType::Float16 => {
            let elem_value = f16::from_f64(value.to_f64());
            u64::from(elem_value.to_bits())
        }
    };
    raw & mask(elem.bits())
}

/// Reinterpret raw slot bits as `elem` and cast the element to `N`.
pub fn decode<N: FileScalar>(elem: ElemType, raw: u64) -> N {
    let bits = elem.bits();
    let raw = raw & mask(bits);
    match elem {
        ElemType::Int { .. } => N::from_i64(sign_extend(raw, bits)),
        ElemType::UInt { .. } => N::from_u64(raw),
        ElemType::Bipolar => N::from_i64(if raw & 1 == 1 { 1 } else { -1 }),
        ElemType::Fixed { .. } => {
            let elem_value = sign_extend(raw, bits) as f64 / fixed_scale(elem);
            N::from_f64(elem_value)
        }
        ElemType::Float32 => {
            let elem_value = f32::from_bits(raw as u32);
            N::from_f64(f64::from(elem_value))
        }
        ElemType::Float16 => {
            let elem_value = f16::from_bits(raw as u16);
            N::from_f64(elem_value.to_f64())
        }
    }
}
