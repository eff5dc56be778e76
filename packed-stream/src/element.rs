//! Target element types for packed slots.
//!
//! Names follow the accelerator datatype convention: `INT4`, `UINT8`,
//! `BINARY`, `BIPOLAR`, `FIXED<8,3>`, `FLOAT32`, `FLOAT16`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::StreamError;

/// Widest slot a single element may occupy.
pub const MAX_ELEM_BITS: u32 = 64;

/// Element representation inside one slot of a packed word.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ElemType {
    /// Two's complement signed integer
    Int { bits: u32 },
    /// Unsigned integer; `UInt { bits: 1 }` is `BINARY`
    UInt { bits: u32 },
    /// One bit, 0 encodes -1 and 1 encodes +1
    Bipolar,
    /// Signed fixed point with `int_bits` integer bits (sign included)
    Fixed { bits: u32, int_bits: u32 },
    /// IEEE 754 single precision
    Float32,
    /// IEEE 754 half precision
    Float16,
}

/// Coarse element category, only used to pick a diagnostic formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElemKind {
    Integer,
    Bipolar,
    FixedPoint,
    Float,
}

impl ElemType {
    /// Slot width in bits.
    pub fn bits(&self) -> u32 {
        match self {
            Self::Int { bits } | Self::UInt { bits } | Self::Fixed { bits, .. } => *bits,
            Self::Bipolar => 1,
            Self::Float32 => 32,
            Self::Float16 => 16,
        }
    }

    pub fn is_signed(&self) -> bool {
        !matches!(self, Self::UInt { .. } | Self::Bipolar)
    }

    pub fn kind(&self) -> ElemKind {
        match self {
            Self::Int { .. } | Self::UInt { .. } => ElemKind::Integer,
            Self::Bipolar => ElemKind::Bipolar,
            Self::Fixed { .. } => ElemKind::FixedPoint,
            Self::Float32 | Self::Float16 => ElemKind::Float,
        }
    }

    /// Fractional bits of a fixed point type, 0 for everything else.
    pub fn frac_bits(&self) -> u32 {
        match self {
            Self::Fixed { bits, int_bits } => bits - int_bits,
            _ => 0,
        }
    }

    fn validate(self) -> Result<Self, StreamError> {
        let bits = self.bits();
        if bits == 0 || bits > MAX_ELEM_BITS {
            return Err(StreamError::ElemType(format!(
                "{} bits is outside 1..={}",
                bits, MAX_ELEM_BITS
            )));
        }
        if let Self::Fixed { bits, int_bits } = self {
            if int_bits > bits {
                return Err(StreamError::ElemType(format!(
                    "FIXED<{},{}> has more integer bits than total bits",
                    bits, int_bits
                )));
            }
        }
        Ok(self)
    }
}

fn parse_width(text: &str, full: &str) -> Result<u32, StreamError> {
    text.trim()
        .parse::<u32>()
        .map_err(|_| StreamError::ElemType(format!("bad bit width in '{}'", full)))
}

impl FromStr for ElemType {
    type Err = StreamError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let parsed = match upper.as_str() {
            "BINARY" => Self::UInt { bits: 1 },
            "BIPOLAR" => Self::Bipolar,
            "FLOAT32" => Self::Float32,
            "FLOAT16" => Self::Float16,
            _ => {
                if let Some(rest) = upper.strip_prefix("UINT") {
                    Self::UInt {
                        bits: parse_width(rest, s)?,
                    }
                } else if let Some(rest) = upper.strip_prefix("INT") {
                    Self::Int {
                        bits: parse_width(rest, s)?,
                    }
                } else if let Some(rest) = upper
                    .strip_prefix("FIXED<")
                    .and_then(|r| r.strip_suffix('>'))
                {
                    let (w, i) = rest.split_once(',').ok_or_else(|| {
                        StreamError::ElemType(format!("expected FIXED<w,i>, got '{}'", s))
                    })?;
                    Self::Fixed {
                        bits: parse_width(w, s)?,
                        int_bits: parse_width(i, s)?,
                    }
                } else {
                    return Err(StreamError::ElemType(format!("unknown element type '{}'", s)));
                }
            }
        };
        parsed.validate()
    }
}

impl fmt::Display for ElemType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int { bits } => write!(f, "INT{}", bits),
            Self::UInt { bits: 1 } => write!(f, "BINARY"),
            Self::UInt { bits } => write!(f, "UINT{}", bits),
            Self::Bipolar => write!(f, "BIPOLAR"),
            Self::Fixed { bits, int_bits } => write!(f, "FIXED<{},{}>", bits, int_bits),
            Self::Float32 => write!(f, "FLOAT32"),
            Self::Float16 => write!(f, "FLOAT16"),
        }
    }
}

impl TryFrom<String> for ElemType {
    type Error = StreamError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ElemType> for String {
    fn from(value: ElemType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_integer_types() {
        assert_eq!("INT4".parse::<ElemType>().unwrap(), ElemType::Int { bits: 4 });
        assert_eq!("uint8".parse::<ElemType>().unwrap(), ElemType::UInt { bits: 8 });
        assert_eq!("BINARY".parse::<ElemType>().unwrap(), ElemType::UInt { bits: 1 });
        assert_eq!("INT64".parse::<ElemType>().unwrap().bits(), 64);
    }

    #[test]
    fn test_parse_special_types() {
        assert_eq!("BIPOLAR".parse::<ElemType>().unwrap(), ElemType::Bipolar);
        assert_eq!("FLOAT32".parse::<ElemType>().unwrap().bits(), 32);
        assert_eq!(
            "FIXED<8,3>".parse::<ElemType>().unwrap(),
            ElemType::Fixed { bits: 8, int_bits: 3 }
        );
        assert_eq!(
            "FIXED<8,3>".parse::<ElemType>().unwrap().frac_bits(),
            5
        );
    }

    #[test]
    fn test_parse_rejects_invalid() {
        assert!("INT0".parse::<ElemType>().is_err());
        assert!("INT65".parse::<ElemType>().is_err());
        assert!("UINTX".parse::<ElemType>().is_err());
        assert!("FIXED<4,8>".parse::<ElemType>().is_err());
        assert!("FIXED<4>".parse::<ElemType>().is_err());
        assert!("DOUBLE".parse::<ElemType>().is_err());
    }

    #[test]
    fn test_display_roundtrip() {
        for name in ["INT7", "UINT3", "BINARY", "BIPOLAR", "FIXED<16,6>", "FLOAT32", "FLOAT16"] {
            let ty: ElemType = name.parse().unwrap();
            assert_eq!(ty.to_string(), name);
        }
    }

    #[test]
    fn test_kind_and_sign() {
        assert_eq!(ElemType::Bipolar.kind(), ElemKind::Bipolar);
        assert_eq!(ElemType::Float16.kind(), ElemKind::Float);
        assert!(ElemType::Int { bits: 3 }.is_signed());
        assert!(!ElemType::UInt { bits: 3 }.is_signed());
    }

    #[test]
    fn test_serde_uses_type_name() {
        let json = serde_json::to_string(&ElemType::Fixed { bits: 8, int_bits: 2 }).unwrap();
        assert_eq!(json, "\"FIXED<8,2>\"");
        let parsed: ElemType = serde_json::from_str("\"INT12\"").unwrap();
        assert_eq!(parsed, ElemType::Int { bits: 12 });
        assert!(serde_json::from_str::<ElemType>("\"INT99\"").is_err());
    }
}
