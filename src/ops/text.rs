use std::path::{Path, PathBuf};

use ab_glyph::{Font, FontArc, GlyphId, OutlinedGlyph, ScaleFont, point};
use rayon::prelude::*;

use crate::canvas::{RasterBuffer, Region};
use crate::error::EditError;
use crate::ops::shapes::{DrawStyle, Point, composite_pixel};

pub const MIN_FONT_SIZE: f32 = 6.0;
pub const MAX_FONT_SIZE: f32 = 200.0;

/// Tried in order when no font file is configured.
#[cfg(target_os = "windows")]
const FALLBACK_FONTS: &[&str] = &[
    "C:\\Windows\\Fonts\\arial.ttf",
    "C:\\Windows\\Fonts\\segoeui.ttf",
    "C:\\Windows\\Fonts\\times.ttf",
];
#[cfg(target_os = "macos")]
const FALLBACK_FONTS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Times New Roman.ttf",
];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const FALLBACK_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
];

/// Searched for any TrueType file once the fallbacks are exhausted.
#[cfg(target_os = "windows")]
const FONT_DIRS: &[&str] = &["C:\\Windows\\Fonts"];
#[cfg(target_os = "macos")]
const FONT_DIRS: &[&str] = &["/System/Library/Fonts", "/Library/Fonts"];
#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const FONT_DIRS: &[&str] = &["/usr/share/fonts", "/usr/local/share/fonts"];

const FONT_SCAN_DEPTH: usize = 3;

// ============================================================================
// FONTS
// ============================================================================

/// Read a TrueType/OpenType file.
pub fn load_font(path: &Path) -> Result<FontArc, EditError> {
    let bytes = std::fs::read(path)
        .map_err(|e| EditError::FontUnavailable(format!("{}: {}", path.display(), e)))?;
    FontArc::try_from_vec(bytes).map_err(|e| EditError::FontUnavailable(format!("{}: {}", path.display(), e)))
}

/// First usable system font: the well-known sans families, then any `.ttf`
/// under the platform font directories.
pub fn find_system_font() -> Option<PathBuf> {
    if let Some(found) = FALLBACK_FONTS.iter().map(PathBuf::from).find(|p| p.is_file()) {
        return Some(found);
    }
    FONT_DIRS
        .iter()
        .find_map(|dir| scan_for_font(Path::new(dir), FONT_SCAN_DEPTH))
}

fn scan_for_font(dir: &Path, depth: usize) -> Option<PathBuf> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir).ok()?.flatten().map(|e| e.path()).collect();
    entries.sort();

    if let Some(file) = entries.iter().find(|p| p.is_file() && is_ttf(p)) {
        return Some(file.clone());
    }
    if depth == 0 {
        return None;
    }
    entries
        .iter()
        .filter(|p| p.is_dir())
        .find_map(|sub| scan_for_font(sub, depth - 1))
}

fn is_ttf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("ttf"))
}

// ============================================================================
// LAYOUT
// ============================================================================

/// Reject a size or origin no font can render.
pub fn validate(at: Point, size: f32, style: &DrawStyle) -> Result<(), EditError> {
    style.validate()?;
    if !at.0.is_finite() || !at.1.is_finite() {
        return Err(EditError::InvalidGeometry("text origin has a non-finite coordinate".to_string()));
    }
    if !size.is_finite() || !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(&size) {
        return Err(EditError::InvalidGeometry(format!(
            "font size {} outside {}..{}",
            size, MIN_FONT_SIZE, MAX_FONT_SIZE
        )));
    }
    Ok(())
}

/// Kerned glyph positions along one line, left-aligned at x = 0.  Returns
/// the glyphs and the total advance.
pub fn layout_line(font: &FontArc, text: &str, size: f32) -> (Vec<(GlyphId, f32)>, f32) {
    let scaled = font.as_scaled(size);
    let mut glyphs = Vec::with_capacity(text.len());
    let mut cursor_x = 0.0f32;
    let mut last: Option<GlyphId> = None;

    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if let Some(prev) = last {
            cursor_x += scaled.kern(prev, id);
        }
        glyphs.push((id, cursor_x));
        cursor_x += scaled.h_advance(id);
        last = Some(id);
    }
    (glyphs, cursor_x)
}

// ============================================================================
// RASTERIZATION
// ============================================================================

/// Anti-aliased glyph coverage for a block of text, clipped to the canvas.
#[derive(Clone, Debug, Default)]
pub struct TextCoverage {
    region: Option<Region>,
    coverage: Vec<f32>,
}

impl TextCoverage {
    /// Canvas rectangle the coverage spans.
    pub fn region(&self) -> Option<Region> {
        self.region
    }

    /// True when no pixel would change.
    pub fn is_empty(&self) -> bool {
        self.region.is_none() || self.coverage.iter().all(|c| *c <= 0.0)
    }

    /// Coverage in 0..1 at a canvas pixel.
    pub fn at(&self, x: i32, y: i32) -> f32 {
        match self.region {
            Some(r) if r.contains(x, y) => {
                let idx = (y - r.y) as usize * r.width as usize + (x - r.x) as usize;
                self.coverage[idx]
            }
            _ => 0.0,
        }
    }
}

/// Lay out `text` with its top-left corner at `origin`.  Lines break on
/// `'\n'` and are spaced by the font's line height.  Nothing outside
/// `canvas` is kept.
pub fn rasterize_text(font: &FontArc, text: &str, size: f32, origin: Point, canvas: Region) -> TextCoverage {
    let scaled = font.as_scaled(size);
    let ascent = scaled.ascent();
    let line_height = scaled.height();

    let mut outlines: Vec<OutlinedGlyph> = Vec::new();
    for (line_idx, line) in text.split('\n').enumerate() {
        let baseline = origin.1 + ascent + line_idx as f32 * line_height;
        let (glyphs, _) = layout_line(font, line, size);
        for (id, gx) in glyphs {
            let glyph = id.with_scale_and_position(size, point(origin.0 + gx, baseline));
            if let Some(outlined) = font.outline_glyph(glyph) {
                outlines.push(outlined);
            }
        }
    }
    if outlines.is_empty() {
        return TextCoverage::default();
    }

    let (mut min_x, mut min_y, mut max_x, mut max_y) = (f32::MAX, f32::MAX, f32::MIN, f32::MIN);
    for outlined in &outlines {
        let b = outlined.px_bounds();
        min_x = min_x.min(b.min.x);
        min_y = min_y.min(b.min.y);
        max_x = max_x.max(b.max.x);
        max_y = max_y.max(b.max.y);
    }

    let x0 = (min_x.floor() as i64).max(canvas.x as i64);
    let y0 = (min_y.floor() as i64).max(canvas.y as i64);
    let x1 = (max_x.ceil() as i64).min(canvas.right());
    let y1 = (max_y.ceil() as i64).min(canvas.bottom());
    if x1 <= x0 || y1 <= y0 {
        return TextCoverage::default();
    }
    let region = Region::new(x0 as i32, y0 as i32, (x1 - x0) as u32, (y1 - y0) as u32);
    let mut coverage = vec![0.0f32; region.width as usize * region.height as usize];

    for outlined in &outlines {
        let b = outlined.px_bounds();
        let (gx, gy) = (b.min.x as i64, b.min.y as i64);
        outlined.draw(|px, py, cov| {
            let cx = gx + px as i64;
            let cy = gy + py as i64;
            if cx < x0 || cy < y0 || cx >= x1 || cy >= y1 {
                return;
            }
            let idx = (cy - y0) as usize * region.width as usize + (cx - x0) as usize;
            // Overlapping glyphs keep the stronger coverage.
            coverage[idx] = coverage[idx].max(cov.clamp(0.0, 1.0));
        });
    }

    TextCoverage { region: Some(region), coverage }
}

/// Composite rasterized text with `style`.  Coverage scales the opacity, so
/// glyph edges blend and solid interiors take the full color.  Returns
/// `false` when nothing was painted.
pub fn stamp_text(buffer: &mut RasterBuffer, text: &TextCoverage, style: &DrawStyle) -> bool {
    let Some(region) = text.region else {
        return false;
    };
    if region.intersect(&buffer.bounds()) != Some(region) {
        log::warn!("text: coverage {} does not fit the {}x{} buffer", region, buffer.width(), buffer.height());
        return false;
    }

    let stride = buffer.width() as usize * 4;
    let x0 = region.x as usize;
    let y0 = region.y as usize;
    let rows = &mut buffer.raw_mut()[y0 * stride..(y0 + region.height as usize) * stride];

    rows.par_chunks_mut(stride)
        .zip(text.coverage.par_chunks(region.width as usize))
        .for_each(|(row, cov_row)| {
            for (i, &cov) in cov_row.iter().enumerate() {
                if cov <= 0.0 {
                    continue;
                }
                let off = (x0 + i) * 4;
                composite_pixel(&mut row[off..off + 4], style.color, style.opacity * cov, style.composite);
            }
        });
    true
}
