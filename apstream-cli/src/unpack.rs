//! Unpack command - file of hex words to a .npy tensor.

use anyhow::{Context, Result};
use packed_stream::{with_npy_dtype, word_bits, word_stream_to_npy, Fifo};
use std::path::Path;

use crate::common::{load_config, read_words};
use crate::config::stream_config::StreamConfig;

/// Unpack the word file with the configured shape and save the tensor.
pub fn run(input_path: &str, config_path: Option<&str>, output_path: Option<&str>) -> Result<()> {
    let config: StreamConfig = load_config(config_path, "stream_config.json")?;
    let output = Path::new(output_path.unwrap_or("output.npy"));

    let width = word_bits(&config.shape, config.elem_type)?;
    let words = read_words(Path::new(input_path), width)?;
    tracing::info!(input = input_path, words = words.len(), width, "unpacking");

    let mut fifo: Fifo<_> = words.into_iter().collect();
    with_npy_dtype!(config.npy_dtype, T => {
        word_stream_to_npy::<T, _>(
            &mut fifo,
            &config.shape,
            output,
            config.elem_type,
            &config.options,
        )
    })
    .with_context(|| format!("Failed to unpack: {}", input_path))?;

    if !fifo.is_empty() {
        tracing::warn!(left = fifo.len(), "words left over after the last replay");
    }

    println!("Unpacked {} tensor with shape {:?}", config.npy_dtype, config.shape);
    println!("Output: {}", output.display());

    Ok(())
}
