// ============================================================================
// OPS: pixel operations and the script front end
// ============================================================================
//
//   shapes.rs   : SDF rasterizer for lines, boxes, ovals, arrows, polygons
//   fill.rs     : 4-connected exact-match flood fill
//   text.rs     : ab_glyph text layout and coverage
//   clipboard.rs: in-app image clipboard
//   script.rs   : line-based command scripts
// ============================================================================

pub mod clipboard;
pub mod fill;
pub mod script;
pub mod shapes;
pub mod text;
