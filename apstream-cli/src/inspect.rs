//! Inspect command - .npy header and packed word layout.

use anyhow::{Context, Result};
use packed_stream::{decompose, npy_load, ElemType};

use crate::config::stream_config::default_elem_type;

pub fn run(input_path: &str, elem_type: Option<&str>, multi_pixel_out: usize) -> Result<()> {
    let array = npy_load(input_path)
        .with_context(|| format!("Failed to load: {}", input_path))?;
    let dtype = array.dtype()?;

    let elem: ElemType = match elem_type {
        Some(text) => text.parse()?,
        None => default_elem_type(dtype),
    };
    let split = decompose(array.shape(), multi_pixel_out)?;

    println!("File: {}", input_path);
    println!("  dtype: {} ({})", dtype, array.header.descr);
    println!("  shape: {:?}", array.shape());
    println!("  values: {}", array.num_vals());
    println!("Layout for {}:", elem);
    println!("  outer positions: {}", split.outer);
    println!("  inner per block: {} x {} block(s)", split.inner, split.multi_pixel_out);
    println!("  word width: {} bits", split.word_bits(elem.bits()));

    Ok(())
}
