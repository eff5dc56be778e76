//! Stream configuration for packing and unpacking a tensor.

use packed_stream::{ElemType, NpyDtype, StreamOptions};
use serde::{Deserialize, Serialize};

/// Configuration shared by `pack` and `unpack`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Numeric type of the .npy file ("float32", "int8", ...)
    pub npy_dtype: NpyDtype,

    /// Target element type ("INT8", "BIPOLAR", "FIXED<8,4>", ...)
    pub elem_type: ElemType,

    /// Tensor shape, row-major
    pub shape: Vec<usize>,

    /// Traversal and replay options
    #[serde(flatten)]
    pub options: StreamOptions,
}

impl StreamConfig {
    /// Template derived from a .npy header, using the element type that
    /// matches the file's own scalar.
    pub fn for_npy(npy_dtype: NpyDtype, shape: Vec<usize>) -> Self {
        Self {
            npy_dtype,
            elem_type: default_elem_type(npy_dtype),
            shape,
            options: StreamOptions::default(),
        }
    }
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self::for_npy(NpyDtype::Float32, vec![1])
    }
}

/// Lossless element type for a file scalar.
pub fn default_elem_type(dtype: NpyDtype) -> ElemType {
    let bits = (dtype.word_size() * 8) as u32;
    match dtype {
        NpyDtype::Int8 | NpyDtype::Int16 | NpyDtype::Int32 | NpyDtype::Int64 => {
            ElemType::Int { bits }
        }
        NpyDtype::Uint8 | NpyDtype::Uint16 | NpyDtype::Uint32 | NpyDtype::Uint64 => {
            ElemType::UInt { bits }
        }
        NpyDtype::Float16 => ElemType::Float16,
        NpyDtype::Float32 | NpyDtype::Float64 => ElemType::Float32,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== StreamConfig tests ====================

    #[test]
    fn test_stream_config_default() {
        let config = StreamConfig::default();
        assert_eq!(config.npy_dtype, NpyDtype::Float32);
        assert_eq!(config.elem_type, ElemType::Float32);
        assert_eq!(config.shape, vec![1]);
        assert!(config.options.reverse_inner);
        assert_eq!(config.options.num_reps, 1);
        assert_eq!(config.options.multi_pixel_out, 1);
    }

    #[test]
    fn test_stream_config_serialization_is_flat() {
        let config = StreamConfig {
            npy_dtype: NpyDtype::Int16,
            elem_type: ElemType::Fixed { bits: 8, int_bits: 4 },
            shape: vec![2, 4],
            options: StreamOptions::default().multi_pixel_out(2),
        };

        let json = serde_json::to_string(&config).unwrap();
        assert!(json.contains("\"npy_dtype\":\"int16\""));
        assert!(json.contains("\"elem_type\":\"FIXED<8,4>\""));
        assert!(json.contains("\"multi_pixel_out\":2"));
        assert!(!json.contains("options"));

        let parsed: StreamConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_stream_config_options_default_when_missing() {
        let json = r#"{
            "npy_dtype": "uint8",
            "elem_type": "BINARY",
            "shape": [4, 8]
        }"#;

        let config: StreamConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.elem_type, ElemType::UInt { bits: 1 });
        assert_eq!(config.options, StreamOptions::default());
    }

    #[test]
    fn test_stream_config_rejects_bad_elem_type() {
        let json = r#"{"npy_dtype": "float32", "elem_type": "INT0", "shape": [4]}"#;
        assert!(serde_json::from_str::<StreamConfig>(json).is_err());
    }

    // ==================== default_elem_type tests ====================

    #[test]
    fn test_default_elem_type() {
        assert_eq!(default_elem_type(NpyDtype::Int8), ElemType::Int { bits: 8 });
        assert_eq!(default_elem_type(NpyDtype::Uint32), ElemType::UInt { bits: 32 });
        assert_eq!(default_elem_type(NpyDtype::Float16), ElemType::Float16);
        assert_eq!(default_elem_type(NpyDtype::Float64), ElemType::Float32);
    }
}
