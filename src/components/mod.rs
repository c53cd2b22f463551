// ============================================================================
// COMPONENTS: editor state owned by a session
// ============================================================================
//
//   colors.rs   : palette, color parsing, primary/secondary pair
//   history.rs  : bounded snapshot undo/redo
//   selection.rs: marquee → lift → move → commit/cancel state machine
//   tools.rs    : tool presets mapping to draw styles and shapes
// ============================================================================

pub mod colors;
pub mod history;
pub mod selection;
pub mod tools;
