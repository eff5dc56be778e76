//! Integration tests for apstream-cli.

use std::fs;
use std::path::Path;
use std::process::Command;

use packed_stream::{npy_load, npy_save};
use tempfile::TempDir;

fn apstream_cli() -> Command {
    Command::new(env!("CARGO_BIN_EXE_apstream"))
}

fn write_config(dir: &Path, json: &str) -> String {
    let path = dir.join("stream_config.json");
    fs::write(&path, json).unwrap();
    path.to_str().unwrap().to_string()
}

#[test]
fn test_pack_generate_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.npy");
    npy_save(&input, &[1i8, 2, 3, 4, 5, 6], &[2, 3]).unwrap();

    let output = apstream_cli()
        .current_dir(dir.path())
        .args(["pack", "--input", input.to_str().unwrap(), "--generate-config"])
        .output()
        .expect("Failed to run apstream");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "pack --generate-config failed: {}", stdout);
    assert!(stdout.contains("Found int8 tensor with shape [2, 3]"));
    assert!(stdout.contains("Generated stream_config.json"));

    let json = fs::read_to_string(dir.path().join("stream_config.json")).unwrap();
    assert!(json.contains("\"npy_dtype\": \"int8\""));
    assert!(json.contains("\"elem_type\": \"INT8\""));
    assert!(json.contains("\"reverse_inner\": true"));
}

#[test]
fn test_pack_writes_reversed_words() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.npy");
    let words = dir.path().join("words.txt");
    npy_save(&input, &[1.0f32, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], &[2, 4]).unwrap();
    let config = write_config(
        dir.path(),
        r#"{"npy_dtype": "float32", "elem_type": "INT8", "shape": [2, 4]}"#,
    );

    let output = apstream_cli()
        .args([
            "pack",
            "--input", input.to_str().unwrap(),
            "--config", &config,
            "--output", words.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run apstream pack");

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(output.status.success(), "pack failed: {}\n{}", stdout, stderr);
    assert!(stdout.contains("Packed 2 word(s) of 32 bits"));

    let text = fs::read_to_string(&words).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines, vec!["0x01020304", "0x05060708"]);
}

#[test]
fn test_pack_unpack_roundtrip() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.npy");
    let words = dir.path().join("words.txt");
    let restored = dir.path().join("restored.npy");
    let values: Vec<i16> = vec![-4, 3, 0, -1, 2, -3, 1, -2];
    npy_save(&input, &values, &[2, 4]).unwrap();
    let config = write_config(
        dir.path(),
        r#"{
            "npy_dtype": "int16",
            "elem_type": "INT3",
            "shape": [2, 4],
            "reverse_inner": true,
            "num_reps": 2,
            "multi_pixel_out": 2
        }"#,
    );

    let pack = apstream_cli()
        .args([
            "pack",
            "--input", input.to_str().unwrap(),
            "--config", &config,
            "--output", words.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run apstream pack");
    assert!(pack.status.success(), "pack failed: {}", String::from_utf8_lossy(&pack.stderr));
    assert_eq!(fs::read_to_string(&words).unwrap().lines().count(), 4);

    let unpack = apstream_cli()
        .args([
            "unpack",
            "--input", words.to_str().unwrap(),
            "--config", &config,
            "--output", restored.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run apstream unpack");
    assert!(unpack.status.success(), "unpack failed: {}", String::from_utf8_lossy(&unpack.stderr));

    let array = npy_load(&restored).unwrap();
    assert_eq!(array.shape(), &[2, 4]);
    assert_eq!(array.values::<i16>().unwrap(), values);
}

#[test]
fn test_pack_rejects_config_shape_mismatch() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.npy");
    let words = dir.path().join("words.txt");
    npy_save(&input, &[0u8; 8], &[2, 4]).unwrap();
    let config = write_config(
        dir.path(),
        r#"{"npy_dtype": "uint8", "elem_type": "UINT8", "shape": [4, 2]}"#,
    );

    let output = apstream_cli()
        .args([
            "pack",
            "--input", input.to_str().unwrap(),
            "--config", &config,
            "--output", words.to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run apstream pack");

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(!output.status.success());
    assert!(stderr.contains("does not match config shape"), "stderr: {}", stderr);
    assert!(!words.exists());
}

#[test]
fn test_pack_requires_config() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.npy");
    npy_save(&input, &[1u8, 2], &[2]).unwrap();

    let output = apstream_cli()
        .args(["pack", "--input", input.to_str().unwrap()])
        .output()
        .expect("Failed to run apstream pack");

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--config is required"));
}

#[test]
fn test_unpack_rejects_short_word_file() {
    let dir = TempDir::new().unwrap();
    let words = dir.path().join("words.txt");
    fs::write(&words, "0x01020304\n").unwrap();
    let config = write_config(
        dir.path(),
        r#"{"npy_dtype": "float32", "elem_type": "INT8", "shape": [2, 4]}"#,
    );

    let output = apstream_cli()
        .args([
            "unpack",
            "--input", words.to_str().unwrap(),
            "--config", &config,
            "--output", dir.path().join("out.npy").to_str().unwrap(),
        ])
        .output()
        .expect("Failed to run apstream unpack");

    assert!(!output.status.success(), "unpacking a short stream should fail");
}

#[test]
fn test_inspect_reports_layout() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("input.npy");
    npy_save(&input, &vec![0.5f32; 24], &[2, 3, 4]).unwrap();

    let output = apstream_cli()
        .args([
            "inspect",
            "--input", input.to_str().unwrap(),
            "--elem-type", "FIXED<8,4>",
            "--multi-pixel-out", "2",
        ])
        .output()
        .expect("Failed to run apstream inspect");

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "inspect failed: {}", stdout);
    assert!(stdout.contains("dtype: float32 (<f4)"));
    assert!(stdout.contains("shape: [2, 3, 4]"));
    assert!(stdout.contains("outer positions: 6"));
    assert!(stdout.contains("inner per block: 2 x 2 block(s)"));
    assert!(stdout.contains("word width: 32 bits"));
}
