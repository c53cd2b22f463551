use std::fmt;

use image::{Rgba, RgbaImage};

use crate::error::EditError;

/// Largest edge accepted for any buffer.
pub const MAX_CANVAS_DIM: u32 = 32_768;

pub const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
pub const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ============================================================================
// REGION
// ============================================================================

/// Axis-aligned rectangle in buffer coordinates.  The origin may be negative
/// (a placement dragged past the top-left edge); the extent never is.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Region {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle spanned by two drag corners, in either order.  The end
    /// corner is exclusive, so `from_corners(p, p)` is empty.
    pub fn from_corners(a: (i32, i32), b: (i32, i32)) -> Self {
        let x = a.0.min(b.0);
        let y = a.1.min(b.1);
        Self {
            x,
            y,
            width: a.0.abs_diff(b.0),
            height: a.1.abs_diff(b.1),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    #[inline]
    pub fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    #[inline]
    pub fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Half-open containment test.
    pub fn contains(&self, px: i32, py: i32) -> bool {
        let (px, py) = (px as i64, py as i64);
        px >= self.x as i64 && py >= self.y as i64 && px < self.right() && py < self.bottom()
    }

    pub fn intersect(&self, other: &Region) -> Option<Region> {
        let x0 = (self.x as i64).max(other.x as i64);
        let y0 = (self.y as i64).max(other.y as i64);
        let x1 = self.right().min(other.right());
        let y1 = self.bottom().min(other.bottom());
        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some(Region {
            x: x0 as i32,
            y: y0 as i32,
            width: (x1 - x0) as u32,
            height: (y1 - y0) as u32,
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{} at ({}, {})", self.width, self.height, self.x, self.y)
    }
}

// ============================================================================
// RASTER BUFFER
// ============================================================================

/// Dense row-major RGBA8 pixel grid.  Width and height are always positive
/// and the backing array is always `width * height * 4` bytes.
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    pixels: RgbaImage,
}

impl fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RasterBuffer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish_non_exhaustive()
    }
}

fn check_dimensions(width: u32, height: u32) -> Result<(), EditError> {
    if width == 0 || height == 0 {
        return Err(EditError::InvalidGeometry(format!(
            "buffer dimensions must be positive, got {}x{}",
            width, height
        )));
    }
    if width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
        return Err(EditError::InvalidGeometry(format!(
            "buffer dimensions {}x{} exceed the {} pixel limit",
            width, height, MAX_CANVAS_DIM
        )));
    }
    Ok(())
}

impl RasterBuffer {
    // ---- construction -------------------------------------------------------

    /// New buffer with every pixel set to `fill`.
    pub fn new_filled(width: u32, height: u32, fill: Rgba<u8>) -> Result<Self, EditError> {
        check_dimensions(width, height)?;
        Ok(Self { pixels: RgbaImage::from_pixel(width, height, fill) })
    }

    pub fn from_image(image: RgbaImage) -> Result<Self, EditError> {
        check_dimensions(image.width(), image.height())?;
        Ok(Self { pixels: image })
    }

    /// Wrap tightly packed RGBA bytes.  The length must match exactly.
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, EditError> {
        check_dimensions(width, height)?;
        let expected = width as usize * height as usize * 4;
        if data.len() != expected {
            return Err(EditError::InvalidGeometry(format!(
                "expected {} bytes for {}x{}, got {}",
                expected,
                width,
                height,
                data.len()
            )));
        }
        RgbaImage::from_raw(width, height, data)
            .map(|pixels| Self { pixels })
            .ok_or_else(|| EditError::InvalidGeometry("pixel buffer rejected".into()))
    }

    // ---- accessors ----------------------------------------------------------

    #[inline]
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Full extent as a region anchored at the origin.
    pub fn bounds(&self) -> Region {
        Region::new(0, 0, self.width(), self.height())
    }

    /// Read a pixel; `None` outside the buffer.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Rgba<u8>> {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return None;
        }
        Some(*self.pixels.get_pixel(x as u32, y as u32))
    }

    /// Write a pixel.  Coordinates outside the buffer are ignored.
    pub fn put_pixel(&mut self, x: i32, y: i32, color: Rgba<u8>) {
        if x < 0 || y < 0 || x as u32 >= self.width() || y as u32 >= self.height() {
            return;
        }
        self.pixels.put_pixel(x as u32, y as u32, color);
    }

    pub fn as_raw(&self) -> &[u8] {
        self.pixels.as_raw()
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn as_image(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn into_image(self) -> RgbaImage {
        self.pixels
    }

    pub fn memory_bytes(&self) -> usize {
        self.as_raw().len()
    }

    // ---- region operations --------------------------------------------------

    /// Copy a sub-rectangle out into a new buffer.  The rectangle must lie
    /// fully inside; the bounds check runs before any pixel is read.
    pub fn get_region(&self, x: i32, y: i32, width: u32, height: u32) -> Result<RasterBuffer, EditError> {
        let region = Region::new(x, y, width, height);
        if region.is_empty() {
            return Err(EditError::InvalidGeometry(format!("empty region {}", region)));
        }
        if x < 0
            || y < 0
            || region.right() > self.width() as i64
            || region.bottom() > self.height() as i64
        {
            return Err(EditError::OutOfBounds {
                x: x as i64,
                y: y as i64,
                width,
                height,
                buffer_width: self.width(),
                buffer_height: self.height(),
            });
        }

        let row_bytes = width as usize * 4;
        let stride = self.width() as usize * 4;
        let src = self.as_raw();
        let mut out = Vec::with_capacity(row_bytes * height as usize);
        for row in 0..height as usize {
            let start = (y as usize + row) * stride + x as usize * 4;
            out.extend_from_slice(&src[start..start + row_bytes]);
        }
        RasterBuffer::from_raw(width, height, out)
    }

    /// Overwrite pixels with `src` placed at `(x, y)`.  Anything falling
    /// outside this buffer is dropped.  Returns the rectangle actually written.
    pub fn put_region(&mut self, src: &RasterBuffer, x: i32, y: i32) -> Option<Region> {
        let target = Region::new(x, y, src.width(), src.height());
        let clipped = target.intersect(&self.bounds())?;

        let src_x = (clipped.x as i64 - x as i64) as usize;
        let src_y = (clipped.y as i64 - y as i64) as usize;
        let run = clipped.width as usize * 4;
        let src_stride = src.width() as usize * 4;
        let dst_stride = self.width() as usize * 4;
        let src_raw = src.as_raw();
        let dst_raw = self.raw_mut();

        for row in 0..clipped.height as usize {
            let s = (src_y + row) * src_stride + src_x * 4;
            let d = (clipped.y as usize + row) * dst_stride + clipped.x as usize * 4;
            dst_raw[d..d + run].copy_from_slice(&src_raw[s..s + run]);
        }
        Some(clipped)
    }

    /// Overwrite a rectangle with a solid color, clipped to the buffer.
    pub fn fill_rect(&mut self, x: i32, y: i32, width: u32, height: u32, color: Rgba<u8>) {
        let Some(clipped) = Region::new(x, y, width, height).intersect(&self.bounds()) else {
            return;
        };
        let stride = self.width() as usize * 4;
        let raw = self.raw_mut();
        for row in 0..clipped.height as usize {
            let start = (clipped.y as usize + row) * stride + clipped.x as usize * 4;
            for px in raw[start..start + clipped.width as usize * 4].chunks_exact_mut(4) {
                px.copy_from_slice(&color.0);
            }
        }
    }

    pub fn fill(&mut self, color: Rgba<u8>) {
        for px in self.pixels.pixels_mut() {
            *px = color;
        }
    }

    /// New buffer of the requested size with the overlapping top-left area
    /// copied over and the rest set to `background`.
    pub fn resized(&self, width: u32, height: u32, background: Rgba<u8>) -> Result<RasterBuffer, EditError> {
        let mut out = RasterBuffer::new_filled(width, height, background)?;
        out.put_region(self, 0, 0);
        Ok(out)
    }
}
