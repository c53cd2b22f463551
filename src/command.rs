use image::Rgba;

use crate::canvas::RasterBuffer;
use crate::ops::shapes::{DrawStyle, Point, Shape};

/// Every request the surrounding UI (or a script) can make of a session.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    // ---- painting ----
    Draw { shape: Shape, style: DrawStyle },
    Fill { x: i32, y: i32, color: Rgba<u8> },
    /// Stamp `text` with its top-left corner at `at`; `size` is in pixels.
    Text { at: Point, text: String, size: f32, style: DrawStyle },

    // ---- selection / placement pointer events ----
    PointerDown { x: i32, y: i32 },
    PointerMove { x: i32, y: i32 },
    PointerUp { x: i32, y: i32 },

    SelectAll,
    Commit,
    Cancel,
    CropToSelection,
    CropToImageSize,

    // ---- clipboard ----
    Copy,
    Paste,
    /// Float an image supplied from outside (system clipboard, file drop).
    PasteImage { image: RasterBuffer, x: i32, y: i32 },

    // ---- history ----
    Undo,
    Redo,

    // ---- whole canvas ----
    Clear,
    NewCanvas { width: u32, height: u32 },
    Resize { width: u32, height: u32 },
    /// Replace the document; history restarts from this buffer.
    Load(RasterBuffer),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Draw { shape, .. } => shape.label(),
            Command::Fill { .. } => "Fill",
            Command::Text { .. } => "Text",
            Command::PointerDown { .. } => "Pointer Down",
            Command::PointerMove { .. } => "Pointer Move",
            Command::PointerUp { .. } => "Pointer Up",
            Command::SelectAll => "Select All",
            Command::Commit => "Commit",
            Command::Cancel => "Cancel",
            Command::CropToSelection => "Crop to Selection",
            Command::CropToImageSize => "Crop to Image Size",
            Command::Copy => "Copy",
            Command::Paste => "Paste",
            Command::PasteImage { .. } => "Paste Image",
            Command::Undo => "Undo",
            Command::Redo => "Redo",
            Command::Clear => "Clear",
            Command::NewCanvas { .. } => "New Canvas",
            Command::Resize { .. } => "Resize Canvas",
            Command::Load(_) => "Open Image",
        }
    }
}
