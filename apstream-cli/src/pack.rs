//! Pack command - .npy tensor to a file of hex words.

use anyhow::{bail, Context, Result};
use packed_stream::{npy_load, npy_to_word_stream, with_npy_dtype, word_bits, Fifo, PackedWord};
use std::fs;
use std::path::Path;

use crate::common::{load_config, write_words};
use crate::config::stream_config::StreamConfig;

const CONFIG_NAME: &str = "stream_config.json";

/// Generate a stream config template from a .npy header.
pub fn generate_config_template(input_path: &str) -> Result<()> {
    let array = npy_load(input_path)
        .with_context(|| format!("Failed to load: {}", input_path))?;
    let dtype = array.dtype()?;

    println!("Found {} tensor with shape {:?}", dtype, array.shape());

    let config = StreamConfig::for_npy(dtype, array.shape().to_vec());

    let json = serde_json::to_string_pretty(&config)?;
    fs::write(CONFIG_NAME, json)?;

    println!("\n=== Generated {} ===", CONFIG_NAME);
    println!("Element type: {}", config.elem_type);
    println!("\nEdit the config, then run:");
    println!("  apstream pack --input {} --config {}", input_path, CONFIG_NAME);

    Ok(())
}

/// Pack the tensor and write one word per line.
pub fn run(input_path: &str, config_path: Option<&str>, output_path: Option<&str>) -> Result<()> {
    let config: StreamConfig = load_config(config_path, CONFIG_NAME)?;
    let output = Path::new(output_path.unwrap_or("words.txt"));

    let array = npy_load(input_path)
        .with_context(|| format!("Failed to load: {}", input_path))?;
    if array.shape() != config.shape.as_slice() {
        bail!(
            "Tensor shape {:?} in {} does not match config shape {:?}",
            array.shape(),
            input_path,
            config.shape
        );
    }
    let width = word_bits(&config.shape, config.elem_type)?;
    tracing::info!(
        input = input_path,
        elem = %config.elem_type,
        width,
        reps = config.options.num_reps,
        "packing"
    );

    let mut fifo: Fifo<PackedWord> = Fifo::new();
    with_npy_dtype!(config.npy_dtype, T => {
        npy_to_word_stream::<T, _>(input_path, &mut fifo, config.elem_type, &config.options)
    })
    .with_context(|| format!("Failed to pack: {}", input_path))?;

    let count = write_words(output, fifo.iter())?;

    println!("Packed {} word(s) of {} bits", count, width);
    println!("Output: {}", output.display());

    Ok(())
}
