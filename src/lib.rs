//! paintcore: the editing core of a single-layer raster paint program.
//!
//! An [`EditorSession`] owns one [`RasterBuffer`] together with its undo
//! history, the select/move/commit workflow and an in-app clipboard.  Every
//! edit is a [`Command`] passed to [`EditorSession::apply`].

pub mod canvas;
pub mod cli;
pub mod command;
pub mod components;
pub mod error;
pub mod io;
pub mod logger;
pub mod ops;
pub mod session;
pub mod settings;

pub use canvas::{RasterBuffer, Region};
pub use command::Command;
pub use components::history::HistoryManager;
pub use components::selection::{SelectionController, SelectionState};
pub use error::{EditError, Notice, Outcome};
pub use ops::shapes::{CompositeMode, DrawStyle, Shape};
pub use session::EditorSession;
pub use settings::EditorSettings;
