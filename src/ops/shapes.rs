use image::Rgba;
use rayon::prelude::*;

use crate::canvas::RasterBuffer;
use crate::error::EditError;

/// A point in buffer coordinates.  Integer values address pixel centres.
pub type Point = (f32, f32);

/// Head back-edges sit this far off the shaft direction.
const ARROW_HEAD_ANGLE: f32 = std::f32::consts::FRAC_PI_6;
const ARROW_HEAD_BASE: f32 = 10.0;

// ============================================================================
// STYLE
// ============================================================================

/// How stamped coverage combines with what is already in the buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CompositeMode {
    /// Replace at full opacity, source-over blend below it.
    #[default]
    Normal,
    /// Remove alpha (destination-out).
    Erase,
}

/// Per-call paint parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawStyle {
    pub color: Rgba<u8>,
    pub width: f32,
    /// 0.0–1.0.  Ignored by `Normal` at 1.0, where pixels are replaced.
    pub opacity: f32,
    pub composite: CompositeMode,
}

impl Default for DrawStyle {
    fn default() -> Self {
        Self {
            color: Rgba([0, 0, 0, 255]),
            width: 2.0,
            opacity: 1.0,
            composite: CompositeMode::Normal,
        }
    }
}

impl DrawStyle {
    pub fn new(color: Rgba<u8>, width: f32) -> Self {
        Self { color, width, ..Self::default() }
    }

    pub fn with_opacity(mut self, opacity: f32) -> Self {
        self.opacity = opacity;
        self
    }

    pub fn with_composite(mut self, composite: CompositeMode) -> Self {
        self.composite = composite;
        self
    }

    pub fn validate(&self) -> Result<(), EditError> {
        if !self.width.is_finite() || self.width <= 0.0 {
            return Err(EditError::InvalidGeometry(format!("stroke width {} must be positive", self.width)));
        }
        if !self.opacity.is_finite() || !(0.0..=1.0).contains(&self.opacity) {
            return Err(EditError::InvalidGeometry(format!("opacity {} outside 0..1", self.opacity)));
        }
        Ok(())
    }

    /// Half the stroke, never thinner than one pixel overall.
    #[inline]
    fn half_width(&self) -> f32 {
        (self.width * 0.5).max(0.5)
    }
}

// ============================================================================
// SHAPES
// ============================================================================

/// Vector primitive ready to be stamped.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Line { from: Point, to: Point },
    Rectangle { from: Point, to: Point, filled: bool },
    RoundedRect { from: Point, to: Point, radius: f32, filled: bool },
    Oval { from: Point, to: Point, filled: bool },
    Arrow { from: Point, to: Point },
    Polygon { vertices: Vec<Point>, closed: bool, filled: bool },
    /// Pencil / highlighter / eraser path.
    Freehand { points: Vec<Point> },
}

impl Shape {
    pub fn label(&self) -> &'static str {
        match self {
            Shape::Line { .. } => "Line",
            Shape::Rectangle { filled: false, .. } => "Rectangle",
            Shape::Rectangle { filled: true, .. } => "Filled Rectangle",
            Shape::RoundedRect { filled: false, .. } => "Rounded Rectangle",
            Shape::RoundedRect { filled: true, .. } => "Filled Rounded Rectangle",
            Shape::Oval { filled: false, .. } => "Oval",
            Shape::Oval { filled: true, .. } => "Filled Oval",
            Shape::Arrow { .. } => "Arrow",
            Shape::Polygon { .. } => "Polygon",
            Shape::Freehand { .. } => "Stroke",
        }
    }

    fn points(&self) -> Vec<Point> {
        match self {
            Shape::Line { from, to }
            | Shape::Rectangle { from, to, .. }
            | Shape::RoundedRect { from, to, .. }
            | Shape::Oval { from, to, .. }
            | Shape::Arrow { from, to } => vec![*from, *to],
            Shape::Polygon { vertices, .. } => vertices.clone(),
            Shape::Freehand { points } => points.clone(),
        }
    }
}

/// Reject input no primitive can draw: non-finite coordinates, a
/// non-positive width, opacity outside 0..1, or a polygon with no vertices.
pub fn validate(shape: &Shape, style: &DrawStyle) -> Result<(), EditError> {
    style.validate()?;
    if shape.points().iter().any(|(x, y)| !x.is_finite() || !y.is_finite()) {
        return Err(EditError::InvalidGeometry(format!("{} has a non-finite coordinate", shape.label())));
    }
    match shape {
        Shape::RoundedRect { radius, .. } if !radius.is_finite() => Err(EditError::InvalidGeometry(format!(
            "corner radius {} is not finite",
            radius
        ))),
        Shape::Polygon { vertices, .. } if vertices.is_empty() => Err(EditError::EmptyPolygon),
        _ => Ok(()),
    }
}

/// Whether a valid shape produces any coverage at all.  A lone polygon
/// vertex, an oval with a zero radius and an empty stroke do not.
pub fn is_drawable(shape: &Shape) -> bool {
    match shape {
        Shape::Oval { from, to, .. } => {
            let (lo, hi) = normalize_corners(*from, *to);
            hi.0 > lo.0 && hi.1 > lo.1
        }
        Shape::Polygon { vertices, .. } => vertices.len() >= 2,
        Shape::Freehand { points } => !points.is_empty(),
        _ => true,
    }
}

/// Stamp any shape onto `buffer`.  Invalid input is rejected before a single
/// pixel is touched.  Returns `false` for input that is valid but draws
/// nothing; see [`is_drawable`].
pub fn draw_shape(buffer: &mut RasterBuffer, shape: &Shape, style: &DrawStyle) -> Result<bool, EditError> {
    validate(shape, style)?;
    if !is_drawable(shape) {
        return Ok(false);
    }
    let drew = match shape {
        Shape::Line { from, to } => {
            draw_line(buffer, *from, *to, style);
            true
        }
        Shape::Rectangle { from, to, filled } => {
            draw_rect(buffer, *from, *to, *filled, style);
            true
        }
        Shape::RoundedRect { from, to, radius, filled } => {
            draw_rounded_rect(buffer, *from, *to, *radius, *filled, style);
            true
        }
        Shape::Oval { from, to, filled } => draw_oval(buffer, *from, *to, *filled, style),
        Shape::Arrow { from, to } => {
            draw_arrow(buffer, *from, *to, style);
            true
        }
        Shape::Polygon { vertices, closed, filled } => draw_polygon(buffer, vertices, *closed, *filled, style)?,
        Shape::Freehand { points } => {
            draw_freehand(buffer, points, style);
            !points.is_empty()
        }
    };
    Ok(drew)
}

// ---- individual primitives -------------------------------------------------

pub fn draw_line(buffer: &mut RasterBuffer, from: Point, to: Point, style: &DrawStyle) {
    let half = style.half_width();
    let bbox = Bounds::of(&[from, to]).padded(half);
    stamp(buffer, bbox, style, |px, py| {
        sdf_line_segment(px, py, from.0, from.1, to.0, to.1) <= half
    });
}

/// Normalize two corners into `(min, max)` regardless of drag direction.
pub fn normalize_corners(a: Point, b: Point) -> (Point, Point) {
    ((a.0.min(b.0), a.1.min(b.1)), (a.0.max(b.0), a.1.max(b.1)))
}

pub fn draw_rect(buffer: &mut RasterBuffer, from: Point, to: Point, filled: bool, style: &DrawStyle) {
    let (lo, hi) = normalize_corners(from, to);
    let (cx, cy, hx, hy) = centre_and_half_extents(lo, hi);
    let half = style.half_width();
    stamp(buffer, Bounds::of(&[lo, hi]).padded(half), style, |px, py| {
        let d = sdf_box(px - cx, py - cy, hx, hy);
        covers(d, half, filled)
    });
}

/// Largest radius that still fits the box: `min(width, height) / 2`.
pub fn clamp_corner_radius(width: f32, height: f32, radius: f32) -> f32 {
    radius.max(0.0).min(width.abs().min(height.abs()) * 0.5)
}

pub fn draw_rounded_rect(
    buffer: &mut RasterBuffer,
    from: Point,
    to: Point,
    radius: f32,
    filled: bool,
    style: &DrawStyle,
) {
    let (lo, hi) = normalize_corners(from, to);
    let (cx, cy, hx, hy) = centre_and_half_extents(lo, hi);
    let r = clamp_corner_radius(hi.0 - lo.0, hi.1 - lo.1, radius);
    let half = style.half_width();
    stamp(buffer, Bounds::of(&[lo, hi]).padded(half), style, |px, py| {
        let d = sdf_rounded_box(px - cx, py - cy, hx, hy, r);
        covers(d, half, filled)
    });
}

/// Ellipse inscribed in the corners' bounding box.  A zero radius on either
/// axis stamps nothing and returns `false`.
pub fn draw_oval(buffer: &mut RasterBuffer, from: Point, to: Point, filled: bool, style: &DrawStyle) -> bool {
    let (lo, hi) = normalize_corners(from, to);
    let (cx, cy, rx, ry) = centre_and_half_extents(lo, hi);
    if rx <= 0.0 || ry <= 0.0 {
        return false;
    }
    let half = style.half_width();
    stamp(buffer, Bounds::of(&[lo, hi]).padded(half), style, |px, py| {
        let d = sdf_ellipse(px - cx, py - cy, rx, ry);
        covers(d, half, filled)
    });
    true
}

/// Tip and the two back corners of an arrow head.  Head length grows with the
/// stroke width.
pub fn arrow_head(from: Point, to: Point, width: f32) -> [Point; 3] {
    let head_len = ARROW_HEAD_BASE + width;
    let angle = (to.1 - from.1).atan2(to.0 - from.0);
    let back = |a: f32| (to.0 - head_len * a.cos(), to.1 - head_len * a.sin());
    [
        to,
        back(angle - ARROW_HEAD_ANGLE),
        back(angle + ARROW_HEAD_ANGLE),
    ]
}

pub fn draw_arrow(buffer: &mut RasterBuffer, from: Point, to: Point, style: &DrawStyle) {
    let head = arrow_head(from, to, style.width);
    let half = style.half_width();
    let mut corners = head.to_vec();
    corners.push(from);
    stamp(buffer, Bounds::of(&corners).padded(half), style, |px, py| {
        sdf_line_segment(px, py, from.0, from.1, to.0, to.1) <= half
            || sdf_polygon(&head, px, py) <= 0.0
    });
}

/// Open or closed polyline.  No vertices is an error; a single vertex is a
/// no-op returning `false`.  The interior is filled only when the polygon is
/// both closed and filled.
pub fn draw_polygon(
    buffer: &mut RasterBuffer,
    vertices: &[Point],
    closed: bool,
    filled: bool,
    style: &DrawStyle,
) -> Result<bool, EditError> {
    if vertices.is_empty() {
        return Err(EditError::EmptyPolygon);
    }
    if vertices.len() < 2 {
        return Ok(false);
    }
    let half = style.half_width();
    let fill_interior = closed && filled && vertices.len() >= 3;
    stamp(buffer, Bounds::of(vertices).padded(half), style, |px, py| {
        if polyline_distance(vertices, closed, px, py) <= half {
            return true;
        }
        fill_interior && sdf_polygon(vertices, px, py) <= 0.0
    });
    Ok(true)
}

/// Round-joined polyline.  Each pixel is composited once even where the path
/// crosses itself, so translucent strokes do not darken at overlaps.
pub fn draw_freehand(buffer: &mut RasterBuffer, points: &[Point], style: &DrawStyle) {
    let half = style.half_width();
    match points {
        [] => {}
        [p] => {
            let p = *p;
            stamp(buffer, Bounds::of(&[p]).padded(half), style, |px, py| {
                ((px - p.0) * (px - p.0) + (py - p.1) * (py - p.1)).sqrt() <= half
            });
        }
        _ => {
            stamp(buffer, Bounds::of(points).padded(half), style, |px, py| {
                polyline_distance(points, false, px, py) <= half
            });
        }
    }
}

// ============================================================================
// RASTERIZATION
// ============================================================================

#[derive(Clone, Copy, Debug)]
struct Bounds {
    min_x: f32,
    min_y: f32,
    max_x: f32,
    max_y: f32,
}

impl Bounds {
    fn of(points: &[Point]) -> Self {
        let mut b = Bounds { min_x: f32::MAX, min_y: f32::MAX, max_x: f32::MIN, max_y: f32::MIN };
        for &(x, y) in points {
            b.min_x = b.min_x.min(x);
            b.min_y = b.min_y.min(y);
            b.max_x = b.max_x.max(x);
            b.max_y = b.max_y.max(y);
        }
        b
    }

    fn padded(self, pad: f32) -> Self {
        Bounds {
            min_x: self.min_x - pad,
            min_y: self.min_y - pad,
            max_x: self.max_x + pad,
            max_y: self.max_y + pad,
        }
    }
}

#[inline]
fn centre_and_half_extents(lo: Point, hi: Point) -> (f32, f32, f32, f32) {
    let hx = (hi.0 - lo.0) * 0.5;
    let hy = (hi.1 - lo.1) * 0.5;
    (lo.0 + hx, lo.1 + hy, hx, hy)
}

/// Closed shapes: the outline is a band of `half` either side of the edge;
/// filling adds the interior.
#[inline]
fn covers(d: f32, half: f32, filled: bool) -> bool {
    if filled { d <= half } else { d.abs() <= half }
}

/// Test every pixel of `bbox` (clamped to the buffer) and composite the
/// covered ones.  Rows are processed in parallel; the buffer is only
/// observable again once every row is done.
fn stamp<F>(buffer: &mut RasterBuffer, bbox: Bounds, style: &DrawStyle, covered: F)
where
    F: Fn(f32, f32) -> bool + Sync,
{
    let canvas_w = buffer.width() as i32;
    let canvas_h = buffer.height() as i32;
    let x0 = (bbox.min_x.floor() as i32).max(0);
    let y0 = (bbox.min_y.floor() as i32).max(0);
    let x1 = (bbox.max_x.ceil() as i32).saturating_add(1).min(canvas_w);
    let y1 = (bbox.max_y.ceil() as i32).saturating_add(1).min(canvas_h);
    if x1 <= x0 || y1 <= y0 {
        return;
    }

    let row_bytes = canvas_w as usize * 4;
    let color = style.color;
    let opacity = style.opacity;
    let mode = style.composite;
    let rows = &mut buffer.raw_mut()[y0 as usize * row_bytes..y1 as usize * row_bytes];

    rows.par_chunks_mut(row_bytes)
        .enumerate()
        .for_each(|(row, row_buf)| {
            let py = (y0 + row as i32) as f32;
            for x in x0..x1 {
                if !covered(x as f32, py) {
                    continue;
                }
                let off = x as usize * 4;
                composite_pixel(&mut row_buf[off..off + 4], color, opacity, mode);
            }
        });
}

/// Combine one source color into a destination RGBA pixel.
pub fn composite_pixel(dst: &mut [u8], src: Rgba<u8>, opacity: f32, mode: CompositeMode) {
    let opacity = opacity.clamp(0.0, 1.0);
    match mode {
        CompositeMode::Normal => {
            if opacity >= 1.0 {
                dst.copy_from_slice(&src.0);
                return;
            }
            let top_a = (src[3] as f32 / 255.0) * opacity;
            if top_a <= 0.0 {
                return;
            }
            let base_a = dst[3] as f32 / 255.0;
            let out_a = top_a + base_a * (1.0 - top_a);
            for c in 0..3 {
                let top = src[c] as f32 / 255.0;
                let base = dst[c] as f32 / 255.0;
                let v = (top * top_a + base * base_a * (1.0 - top_a)) / out_a;
                dst[c] = (v * 255.0).round().clamp(0.0, 255.0) as u8;
            }
            dst[3] = (out_a * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        CompositeMode::Erase => {
            let keep = 1.0 - opacity;
            let a = (dst[3] as f32 * keep).round() as u8;
            if a == 0 {
                dst.copy_from_slice(&[0, 0, 0, 0]);
            } else {
                dst[3] = a;
            }
        }
    }
}

// ============================================================================
// SDF functions: return signed distance (negative = inside)
// ============================================================================

/// SDF for a box centred at origin with half-extents (hx, hy).
#[inline]
fn sdf_box(px: f32, py: f32, hx: f32, hy: f32) -> f32 {
    let dx = px.abs() - hx;
    let dy = py.abs() - hy;
    let outside = (dx.max(0.0) * dx.max(0.0) + dy.max(0.0) * dy.max(0.0)).sqrt();
    let inside = dx.max(dy).min(0.0);
    outside + inside
}

#[inline]
fn sdf_rounded_box(px: f32, py: f32, hx: f32, hy: f32, r: f32) -> f32 {
    let r = r.min(hx).min(hy);
    sdf_box(px, py, hx - r, hy - r) - r
}

/// Approximate ellipse distance, exact on the axes.
#[inline]
fn sdf_ellipse(px: f32, py: f32, rx: f32, ry: f32) -> f32 {
    let nx = px / rx;
    let ny = py / ry;
    let len = (nx * nx + ny * ny).sqrt();
    if len < 1e-8 {
        return -rx.min(ry);
    }
    let scale = (rx * rx * ny * ny + ry * ry * nx * nx).sqrt() / (rx * ry * len);
    (len - 1.0) / scale
}

/// Unsigned distance to a segment; degenerate segments act as a point.
#[inline]
fn sdf_line_segment(px: f32, py: f32, ax: f32, ay: f32, bx: f32, by: f32) -> f32 {
    let dx = bx - ax;
    let dy = by - ay;
    let len2 = dx * dx + dy * dy;
    let t = if len2 <= f32::EPSILON {
        0.0
    } else {
        (((px - ax) * dx + (py - ay) * dy) / len2).clamp(0.0, 1.0)
    };
    let cx = ax + t * dx;
    let cy = ay + t * dy;
    ((px - cx) * (px - cx) + (py - cy) * (py - cy)).sqrt()
}

fn polyline_distance(points: &[Point], closed: bool, px: f32, py: f32) -> f32 {
    let mut d = f32::MAX;
    for pair in points.windows(2) {
        d = d.min(sdf_line_segment(px, py, pair[0].0, pair[0].1, pair[1].0, pair[1].1));
    }
    if closed && points.len() > 2 {
        let (a, b) = (points[points.len() - 1], points[0]);
        d = d.min(sdf_line_segment(px, py, a.0, a.1, b.0, b.1));
    }
    d
}

/// Signed distance to an arbitrary simple polygon; inside is decided by the
/// even-odd crossing rule so concave outlines fill correctly.
fn sdf_polygon(verts: &[Point], px: f32, py: f32) -> f32 {
    let n = verts.len();
    let mut d = (px - verts[0].0) * (px - verts[0].0) + (py - verts[0].1) * (py - verts[0].1);
    let mut s: f32 = 1.0;
    let mut j = n - 1;
    for i in 0..n {
        let ex = verts[j].0 - verts[i].0;
        let ey = verts[j].1 - verts[i].1;
        let wx = px - verts[i].0;
        let wy = py - verts[i].1;
        let len2 = ex * ex + ey * ey;
        let t = if len2 <= f32::EPSILON { 0.0 } else { ((wx * ex + wy * ey) / len2).clamp(0.0, 1.0) };
        let bx = wx - ex * t;
        let by = wy - ey * t;
        d = d.min(bx * bx + by * by);
        let c1 = py >= verts[i].1;
        let c2 = py < verts[j].1;
        let c3 = ex * wy > ey * wx;
        if (c1 && c2 && c3) || (!c1 && !c2 && !c3) {
            s = -s;
        }
        j = i;
    }
    s * d.sqrt()
}
