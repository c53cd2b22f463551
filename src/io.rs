// ============================================================================
// PERSISTENCE BOUNDARY: raw pixel snapshots and raster image files
// ============================================================================
//
// The editing core never touches the disk.  These helpers translate between
// a `RasterBuffer` and two kinds of file:
//   * `.pcs`: raw snapshot (magic + dimensions + RGBA bytes) via bincode
//   * everything the `image` crate can encode/decode (PNG, JPEG, BMP, …)

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::canvas::{MAX_CANVAS_DIM, RasterBuffer};
use crate::error::EditError;

/// Magic string written at the start of every snapshot.
const SNAPSHOT_MAGIC: &str = "PCS1";
pub const SNAPSHOT_EXTENSION: &str = "pcs";

#[derive(Debug, Error)]
pub enum IoError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialize(#[from] bincode::Error),

    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error("invalid format: {0}")]
    InvalidFormat(String),

    #[error("invalid pixel data: {0}")]
    Pixels(#[from] EditError),
}

/// On-disk layout of a raw snapshot.
#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    magic: String,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

// ============================================================================
// RAW SNAPSHOTS
// ============================================================================

pub fn write_snapshot<W: Write>(buffer: &RasterBuffer, writer: W) -> Result<(), IoError> {
    let file = SnapshotFile {
        magic: SNAPSHOT_MAGIC.to_string(),
        width: buffer.width(),
        height: buffer.height(),
        pixels: buffer.as_raw().to_vec(),
    };
    bincode::serialize_into(writer, &file)?;
    Ok(())
}

pub fn read_snapshot<R: Read>(reader: R) -> Result<RasterBuffer, IoError> {
    let file: SnapshotFile = bincode::deserialize_from(reader)?;
    if file.magic != SNAPSHOT_MAGIC {
        return Err(IoError::InvalidFormat(format!("unknown magic '{}'", file.magic)));
    }
    if file.width == 0 || file.height == 0 || file.width > MAX_CANVAS_DIM || file.height > MAX_CANVAS_DIM {
        return Err(IoError::InvalidFormat(format!(
            "snapshot dimensions {}x{} out of range",
            file.width, file.height
        )));
    }
    Ok(RasterBuffer::from_raw(file.width, file.height, file.pixels)?)
}

/// Save a buffer as a `.pcs` raw snapshot.
pub fn save_snapshot(buffer: &RasterBuffer, path: &Path) -> Result<(), IoError> {
    let mut writer = BufWriter::new(File::create(path)?);
    write_snapshot(buffer, &mut writer)?;
    writer.flush()?;
    Ok(())
}

pub fn load_snapshot(path: &Path) -> Result<RasterBuffer, IoError> {
    read_snapshot(BufReader::new(File::open(path)?))
}

// ============================================================================
// RASTER IMAGE FILES
// ============================================================================

pub fn is_snapshot_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(SNAPSHOT_EXTENSION))
}

/// Formats [`save_image`] can encode with the enabled codecs.
const WRITABLE_FORMATS: &[image::ImageFormat] = &[
    image::ImageFormat::Png,
    image::ImageFormat::Jpeg,
    image::ImageFormat::Bmp,
    image::ImageFormat::Tga,
    image::ImageFormat::Ico,
    image::ImageFormat::Tiff,
];

/// Whether a file with this extension can be written.
pub fn is_writable_extension(ext: &str) -> bool {
    ext.eq_ignore_ascii_case(SNAPSHOT_EXTENSION)
        || image::ImageFormat::from_extension(ext).is_some_and(|f| WRITABLE_FORMATS.contains(&f))
}

/// Whether a file at `path` can be loaded.
pub fn is_readable_path(path: &Path) -> bool {
    is_snapshot_path(path) || image::ImageFormat::from_path(path).is_ok()
}

/// Load any supported file into a buffer.  `.pcs` goes through the snapshot
/// reader; everything else is decoded by the `image` crate and converted to
/// RGBA8.
pub fn load_image(path: &Path) -> Result<RasterBuffer, IoError> {
    if is_snapshot_path(path) {
        return load_snapshot(path);
    }
    let decoded = image::open(path)?.to_rgba8();
    log::info!("loaded {} ({}x{})", path.display(), decoded.width(), decoded.height());
    Ok(RasterBuffer::from_image(decoded)?)
}

/// Save a buffer, choosing the format from the file extension.
pub fn save_image(buffer: &RasterBuffer, path: &Path) -> Result<(), IoError> {
    if is_snapshot_path(path) {
        return save_snapshot(buffer, path);
    }
    let format = image::ImageFormat::from_path(path)?;
    match format {
        // No alpha channel in these encoders.
        image::ImageFormat::Jpeg | image::ImageFormat::Bmp => {
            image::DynamicImage::ImageRgba8(buffer.clone().into_image())
                .to_rgb8()
                .save_with_format(path, format)?;
        }
        _ => buffer.as_image().save_with_format(path, format)?,
    }
    log::info!("saved {} ({}x{})", path.display(), buffer.width(), buffer.height());
    Ok(())
}
