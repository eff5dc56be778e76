//! Fixed-width packed words.
//!
//! A `PackedWord` is an arbitrary-width bit vector stored in little-endian
//! `u64` limbs: bit 0 is the least significant bit of `limbs[0]`. Element
//! slot `i` of width `elem_bits` covers bits `[(i+1)*elem_bits - 1, i*elem_bits]`.

use std::fmt;

use crate::codec::mask;
use crate::error::{Result, StreamError};

const LIMB_BITS: usize = 64;

/// Inclusive `(lo, hi)` bit range of slot `i`.
#[inline]
pub fn slot_range(i: usize, elem_bits: u32) -> (usize, usize) {
    let w = elem_bits as usize;
    (i * w, (i + 1) * w - 1)
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct PackedWord {
    width: usize,
    limbs: Vec<u64>,
}

impl PackedWord {
    /// All-zero word of `width` bits.
    pub fn new(width: usize) -> Self {
        Self {
            width,
            limbs: vec![0; width.div_ceil(LIMB_BITS)],
        }
    }

    /// Build a word from limbs, least significant first. Bits above `width`
    /// must be zero.
    pub fn from_limbs(width: usize, mut limbs: Vec<u64>) -> Result<Self> {
        let needed = width.div_ceil(LIMB_BITS);
        if limbs.len() > needed && limbs[needed..].iter().any(|&l| l != 0) {
            return Err(StreamError::Format(format!(
                "value does not fit in a {}-bit word",
                width
            )));
        }
        limbs.resize(needed, 0);
        let word = Self { width, limbs };
        let top_bits = width % LIMB_BITS;
        if top_bits != 0 && word.limbs[needed - 1] >> top_bits != 0 {
            return Err(StreamError::Format(format!(
                "value does not fit in a {}-bit word",
                width
            )));
        }
        Ok(word)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    pub fn is_zero(&self) -> bool {
        self.limbs.iter().all(|&l| l == 0)
    }

    /// Overwrite `len` bits starting at bit `lo` with the low bits of `value`.
    ///
    /// # Panics
    /// If `len > 64` or the range exceeds the word width.
    pub fn set_bits(&mut self, lo: usize, len: u32, value: u64) {
        self.check_range(lo, len);
        if len == 0 {
            return;
        }
        let value = value & mask(len);
        let limb = lo / LIMB_BITS;
        let off = (lo % LIMB_BITS) as u32;
        let m = mask(len);
        self.limbs[limb] = (self.limbs[limb] & !(m << off)) | (value << off);
        if off + len > LIMB_BITS as u32 {
            let spill = off + len - LIMB_BITS as u32;
            let hi = mask(spill);
            self.limbs[limb + 1] = (self.limbs[limb + 1] & !hi) | (value >> (64 - off));
        }
    }

    /// Read `len` bits starting at bit `lo`.
    ///
    /// # Panics
    /// If `len > 64` or the range exceeds the word width.
    pub fn bits(&self, lo: usize, len: u32) -> u64 {
        self.check_range(lo, len);
        if len == 0 {
            return 0;
        }
        let limb = lo / LIMB_BITS;
        let off = (lo % LIMB_BITS) as u32;
        let mut v = self.limbs[limb] >> off;
        if off + len > LIMB_BITS as u32 {
            v |= self.limbs[limb + 1] << (64 - off);
        }
        v & mask(len)
    }

    /// Write `raw` into element slot `i`.
    pub fn set_slot(&mut self, i: usize, elem_bits: u32, raw: u64) {
        let (lo, _) = slot_range(i, elem_bits);
        self.set_bits(lo, elem_bits, raw);
    }

    /// Raw bits of element slot `i`.
    pub fn slot(&self, i: usize, elem_bits: u32) -> u64 {
        let (lo, _) = slot_range(i, elem_bits);
        self.bits(lo, elem_bits)
    }

    fn check_range(&self, lo: usize, len: u32) {
        assert!(len <= 64, "bit slice of {} bits exceeds 64", len);
        assert!(
            lo + len as usize <= self.width,
            "bit range [{}, {}) outside {}-bit word",
            lo,
            lo + len as usize,
            self.width
        );
    }

    /// Hex rendering with a `0x` prefix and one digit per started nibble.
    pub fn to_hex(&self) -> String {
        format!("{:#x}", self)
    }

    /// Parse a hex string (optional `0x` prefix, `_` separators allowed).
    pub fn from_hex(text: &str, width: usize) -> Result<Self> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);
        let mut limbs = vec![0u64; width.div_ceil(LIMB_BITS).max(1)];
        let mut pos = 0usize;
        let mut seen = false;
        for ch in digits.chars().rev() {
            if ch == '_' {
                continue;
            }
            let nibble = ch.to_digit(16).ok_or_else(|| {
                StreamError::Format(format!("invalid hex digit '{}' in '{}'", ch, trimmed))
            })? as u64;
            seen = true;
            if nibble != 0 {
                let limb = pos / LIMB_BITS;
                if limb >= limbs.len() {
                    return Err(StreamError::Format(format!(
                        "'{}' does not fit in a {}-bit word",
                        trimmed, width
                    )));
                }
                limbs[limb] |= nibble << (pos % LIMB_BITS);
            }
            pos += 4;
        }
        if !seen {
            return Err(StreamError::Format(format!("empty hex word '{}'", trimmed)));
        }
        Self::from_limbs(width, limbs)
    }
}

impl fmt::LowerHex for PackedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            f.write_str("0x")?;
        }
        let nibbles = self.width.div_ceil(4).max(1);
        for n in (0..nibbles).rev() {
            let bit = n * 4;
            let nibble = if bit < self.width {
                let len = (self.width - bit).min(4) as u32;
                self.bits(bit, len)
            } else {
                0
            };
            write!(f, "{:x}", nibble)?;
        }
        Ok(())
    }
}

impl fmt::Display for PackedWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_word_is_zero() {
        let word = PackedWord::new(130);
        assert_eq!(word.width(), 130);
        assert_eq!(word.limbs().len(), 3);
        assert!(word.is_zero());
    }

    #[test]
    fn test_slot_range() {
        assert_eq!(slot_range(0, 8), (0, 7));
        assert_eq!(slot_range(3, 8), (24, 31));
        assert_eq!(slot_range(5, 1), (5, 5));
    }

    #[test]
    fn test_set_and_get_slots() {
        let mut word = PackedWord::new(32);
        for (i, v) in [4u64, 3, 2, 1].iter().enumerate() {
            word.set_slot(i, 8, *v);
        }
        assert_eq!(word.limbs()[0], 0x0102_0304);
        assert_eq!(word.slot(0, 8), 4);
        assert_eq!(word.slot(3, 8), 1);
    }

    #[test]
    fn test_slice_crossing_limb_boundary() {
        let mut word = PackedWord::new(128);
        word.set_bits(60, 8, 0xAB);
        assert_eq!(word.limbs()[0] >> 60, 0xB);
        assert_eq!(word.limbs()[1], 0xA);
        assert_eq!(word.bits(60, 8), 0xAB);

        word.set_bits(32, 64, u64::MAX);
        assert_eq!(word.bits(32, 64), u64::MAX);
        assert_eq!(word.bits(0, 32), 0);
        assert_eq!(word.bits(96, 32), 0);
    }

    #[test]
    fn test_set_bits_overwrites() {
        let mut word = PackedWord::new(16);
        word.set_bits(4, 4, 0xF);
        word.set_bits(4, 4, 0x5);
        assert_eq!(word.bits(0, 16), 0x50);
        // value wider than the slice is masked
        word.set_bits(0, 4, 0xFF);
        assert_eq!(word.bits(0, 16), 0x5F);
    }

    #[test]
    #[should_panic]
    fn test_out_of_range_panics() {
        let mut word = PackedWord::new(8);
        word.set_bits(4, 8, 1);
    }

    #[test]
    fn test_hex_rendering() {
        let mut word = PackedWord::new(12);
        word.set_bits(0, 12, 0xABC);
        assert_eq!(word.to_hex(), "0xabc");
        assert_eq!(format!("{:x}", word), "abc");

        let word = PackedWord::new(9);
        assert_eq!(word.to_hex(), "0x000");

        let mut wide = PackedWord::new(72);
        wide.set_bits(64, 8, 0x12);
        wide.set_bits(0, 8, 0x34);
        assert_eq!(wide.to_hex(), "0x120000000000000034");
    }

    #[test]
    fn test_hex_parse() {
        let word = PackedWord::from_hex("0x01020304", 32).unwrap();
        assert_eq!(word.slot(0, 8), 4);
        assert_eq!(word.slot(3, 8), 1);

        let wide = PackedWord::from_hex("0x12_0000_0000_0000_0034", 72).unwrap();
        assert_eq!(wide.bits(64, 8), 0x12);
        assert_eq!(wide.to_hex(), "0x120000000000000034");

        // leading zeros beyond the width are fine
        assert!(PackedWord::from_hex("0x000f", 4).is_ok());
    }

    #[test]
    fn test_hex_parse_rejects_bad_input() {
        assert!(PackedWord::from_hex("0x1g", 8).is_err());
        assert!(PackedWord::from_hex("0x", 8).is_err());
        assert!(PackedWord::from_hex("0x1ff", 8).is_err());
        assert!(PackedWord::from_hex("0x1_0000_0000_0000_0000", 64).is_err());
    }
}
