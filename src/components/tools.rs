use image::Rgba;

use crate::ops::shapes::{CompositeMode, DrawStyle, Point, Shape};
use crate::settings::EditorSettings;

/// Editing tools and the paint behaviour each one implies.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ToolKind {
    #[default]
    Pencil,
    Highlighter,
    Eraser,
    Line,
    Arrow,
    Rectangle,
    RectangleFilled,
    RoundedRect,
    RoundedRectFilled,
    Oval,
    OvalFilled,
    Polygon,
    Text,
    Bucket,
    Select,
}

impl ToolKind {
    pub fn all() -> &'static [ToolKind] {
        &[
            ToolKind::Pencil,
            ToolKind::Highlighter,
            ToolKind::Eraser,
            ToolKind::Line,
            ToolKind::Arrow,
            ToolKind::Rectangle,
            ToolKind::RectangleFilled,
            ToolKind::RoundedRect,
            ToolKind::RoundedRectFilled,
            ToolKind::Oval,
            ToolKind::OvalFilled,
            ToolKind::Polygon,
            ToolKind::Text,
            ToolKind::Bucket,
            ToolKind::Select,
        ]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ToolKind::Pencil => "pencil",
            ToolKind::Highlighter => "highlighter",
            ToolKind::Eraser => "eraser",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Rectangle => "rect",
            ToolKind::RectangleFilled => "rect-filled",
            ToolKind::RoundedRect => "rrect",
            ToolKind::RoundedRectFilled => "rrect-filled",
            ToolKind::Oval => "oval",
            ToolKind::OvalFilled => "oval-filled",
            ToolKind::Polygon => "polygon",
            ToolKind::Text => "text",
            ToolKind::Bucket => "bucket",
            ToolKind::Select => "select",
        }
    }

    pub fn from_name(name: &str) -> Option<ToolKind> {
        ToolKind::all().iter().copied().find(|t| t.name().eq_ignore_ascii_case(name))
    }

    /// Paint parameters for a stroke made with this tool.
    pub fn style(&self, color: Rgba<u8>, width: f32, settings: &EditorSettings) -> DrawStyle {
        match self {
            ToolKind::Highlighter => DrawStyle::new(color, width).with_opacity(settings.highlighter_opacity),
            ToolKind::Eraser => DrawStyle::new(color, width).with_composite(CompositeMode::Erase),
            _ => DrawStyle::new(color, width),
        }
    }

    /// Shape produced by dragging this tool from `from` to `to`.  `None` for
    /// tools that are not two-point drags.
    pub fn drag_shape(&self, from: Point, to: Point, settings: &EditorSettings) -> Option<Shape> {
        let radius = settings.corner_radius;
        Some(match self {
            ToolKind::Line => Shape::Line { from, to },
            ToolKind::Arrow => Shape::Arrow { from, to },
            ToolKind::Rectangle => Shape::Rectangle { from, to, filled: false },
            ToolKind::RectangleFilled => Shape::Rectangle { from, to, filled: true },
            ToolKind::RoundedRect => Shape::RoundedRect { from, to, radius, filled: false },
            ToolKind::RoundedRectFilled => Shape::RoundedRect { from, to, radius, filled: true },
            ToolKind::Oval => Shape::Oval { from, to, filled: false },
            ToolKind::OvalFilled => Shape::Oval { from, to, filled: true },
            _ => return None,
        })
    }

    /// Freehand tools paint along the pointer path.
    pub fn is_freehand(&self) -> bool {
        matches!(self, ToolKind::Pencil | ToolKind::Highlighter | ToolKind::Eraser)
    }
}
