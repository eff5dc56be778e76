//! Common utilities shared between the pack, unpack and inspect commands.

use anyhow::{Context, Result};
use packed_stream::PackedWord;
use serde::de::DeserializeOwned;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// Load a JSON config file, requiring it to exist.
pub fn load_config<T: DeserializeOwned>(config_path: Option<&str>, config_name: &str) -> Result<T> {
    let path = config_path.ok_or_else(|| {
        anyhow::anyhow!("--config is required. Use --generate-config to create {}", config_name)
    })?;

    let json = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config: {}", path))?;

    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse config: {}", path))
}

/// Write one hex word per line.
pub fn write_words<'a>(path: &Path, words: impl IntoIterator<Item = &'a PackedWord>) -> Result<usize> {
    let mut text = String::new();
    let mut count = 0;
    for word in words {
        writeln!(text, "{}", word.to_hex())?;
        count += 1;
    }
    fs::write(path, text).with_context(|| format!("Failed to write: {}", path.display()))?;
    Ok(count)
}

/// Read a word file written by [`write_words`].
///
/// Blank lines and lines starting with `#` are skipped. Every word is parsed
/// at `width` bits.
pub fn read_words(path: &Path, width: usize) -> Result<Vec<PackedWord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read: {}", path.display()))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(idx, line)| {
            PackedWord::from_hex(line, width)
                .with_context(|| format!("{}:{}: bad word", path.display(), idx + 1))
        })
        .collect()
}
