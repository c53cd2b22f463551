use std::path::PathBuf;

use image::Rgba;
use paintcore::canvas::RasterBuffer;
use paintcore::io::{IoError, load_image, read_snapshot, save_image, write_snapshot};
use pretty_assertions::assert_eq;

fn sample() -> RasterBuffer {
    let mut buf = RasterBuffer::new_filled(3, 2, Rgba([10, 20, 30, 255])).unwrap();
    buf.put_pixel(1, 1, Rgba([200, 100, 0, 128]));
    buf
}

fn temp_path(ext: &str) -> PathBuf {
    std::env::temp_dir().join(format!("paintcore-test-{}.{}", uuid::Uuid::new_v4(), ext))
}

#[test]
fn snapshot_round_trip_in_memory() {
    let buf = sample();
    let mut bytes = Vec::new();
    write_snapshot(&buf, &mut bytes).unwrap();
    assert_eq!(read_snapshot(bytes.as_slice()).unwrap(), buf);
}

#[test]
fn snapshot_with_wrong_magic_is_rejected() {
    let mut bytes = Vec::new();
    write_snapshot(&sample(), &mut bytes).unwrap();
    // bincode: u64 string length, then the magic bytes.
    bytes[8] = b'X';
    assert!(matches!(read_snapshot(bytes.as_slice()), Err(IoError::InvalidFormat(_))));
}

#[test]
fn snapshot_with_mismatched_pixels_is_rejected() {
    let mut bytes = Vec::new();
    write_snapshot(&sample(), &mut bytes).unwrap();
    // Width follows the 8-byte length prefix and 4-byte magic.
    bytes[12] = 4;
    assert!(matches!(read_snapshot(bytes.as_slice()), Err(IoError::Pixels(_))));
}

#[test]
fn truncated_snapshot_is_rejected() {
    let mut bytes = Vec::new();
    write_snapshot(&sample(), &mut bytes).unwrap();
    bytes.truncate(bytes.len() - 5);
    assert!(matches!(read_snapshot(bytes.as_slice()), Err(IoError::Serialize(_))));
}

#[test]
fn png_and_pcs_files_keep_exact_pixels() {
    for ext in ["png", "pcs"] {
        let path = temp_path(ext);
        save_image(&sample(), &path).unwrap();
        let loaded = load_image(&path);
        let _ = std::fs::remove_file(&path);
        assert_eq!(loaded.unwrap(), sample(), "format {}", ext);
    }
}

#[test]
fn unknown_extension_and_missing_file_fail() {
    assert!(matches!(save_image(&sample(), &temp_path("nope")), Err(IoError::Image(_))));
    assert!(load_image(&temp_path("png")).is_err());
    assert!(matches!(load_image(&temp_path("pcs")), Err(IoError::Io(_))));
}
