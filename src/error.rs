use std::fmt;

use thiserror::Error;

/// A failed editing operation. Every variant leaves the buffer, history and
/// selection exactly as they were before the call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EditError {
    #[error("region ({x}, {y}) {width}x{height} exceeds the {buffer_width}x{buffer_height} buffer")]
    OutOfBounds {
        x: i64,
        y: i64,
        width: u32,
        height: u32,
        buffer_width: u32,
        buffer_height: u32,
    },

    #[error("invalid geometry: {0}")]
    InvalidGeometry(String),

    #[error("polygon needs at least one vertex")]
    EmptyPolygon,

    #[error("no usable font: {0}")]
    FontUnavailable(String),
}

impl EditError {
    pub(crate) fn point_out_of_bounds(x: i64, y: i64, buffer_width: u32, buffer_height: u32) -> Self {
        EditError::OutOfBounds { x, y, width: 1, height: 1, buffer_width, buffer_height }
    }
}

/// Benign conditions: the request was valid but there was nothing to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Notice {
    NothingToUndo,
    NothingToRedo,
    NothingToCrop,
    NothingToCommit,
    NothingToPaste,
    FillUnchanged,
    EmptySelection,
    NoSelection,
    NothingToDraw,
    SameSize,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Notice::NothingToUndo => "Nothing to undo",
            Notice::NothingToRedo => "Nothing to redo",
            Notice::NothingToCrop => "Nothing to crop",
            Notice::NothingToCommit => "No placement to commit",
            Notice::NothingToPaste => "Clipboard is empty",
            Notice::FillUnchanged => "Region already has that color",
            Notice::EmptySelection => "Selection is empty",
            Notice::NoSelection => "No active selection",
            Notice::NothingToDraw => "Nothing to draw",
            Notice::SameSize => "Canvas already has that size",
        };
        f.write_str(msg)
    }
}

/// Result signal handed back to the UI layer after every command.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The command took effect; the string is a human-readable status line.
    Applied(String),
    Unchanged(Notice),
}

impl Outcome {
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied(_))
    }

    pub fn notice(&self) -> Option<Notice> {
        match self {
            Outcome::Applied(_) => None,
            Outcome::Unchanged(n) => Some(*n),
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Applied(msg) => f.write_str(msg),
            Outcome::Unchanged(n) => fmt::Display::fmt(n, f),
        }
    }
}
