use image::Rgba;

use crate::canvas::{RasterBuffer, Region};
use crate::error::EditError;

/// What a flood fill did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FillReport {
    /// The seed already had the fill color; nothing was touched.
    Unchanged,
    Filled { pixels: usize, bounds: Region },
}

impl FillReport {
    pub fn pixels(&self) -> usize {
        match self {
            FillReport::Unchanged => 0,
            FillReport::Filled { pixels, .. } => *pixels,
        }
    }
}

/// Replace the 4-connected run of pixels that exactly match the seed's RGBA
/// with `color`.
///
/// Column scanline fill: each popped seed walks up to the top of its run,
/// then paints downward.  Left and right neighbours are pushed once per
/// contiguous matching stretch, tracked by the `reach_left`/`reach_right`
/// flags, so the work stack stays proportional to the region's outline
/// rather than its area.
pub fn flood_fill(buffer: &mut RasterBuffer, seed: (i32, i32), color: Rgba<u8>) -> Result<FillReport, EditError> {
    let (w, h) = (buffer.width(), buffer.height());
    let Some(target) = buffer.pixel(seed.0, seed.1) else {
        return Err(EditError::point_out_of_bounds(seed.0 as i64, seed.1 as i64, w, h));
    };
    let fill = color.0;
    let target = target.0;
    if target == fill {
        return Ok(FillReport::Unchanged);
    }

    let wu = w as usize;
    let hu = h as usize;
    let flat = buffer.raw_mut();

    #[inline(always)]
    fn matches(flat: &[u8], idx: usize, tc: [u8; 4]) -> bool {
        let o = idx * 4;
        flat[o..o + 4] == tc
    }

    let mut painted = 0usize;
    let (mut min_x, mut min_y) = (seed.0 as usize, seed.1 as usize);
    let (mut max_x, mut max_y) = (min_x, min_y);

    // Seeds awaiting a column pass.
    let mut stack: Vec<(usize, usize)> = Vec::with_capacity(256);
    stack.push((seed.0 as usize, seed.1 as usize));

    while let Some((x, mut y)) = stack.pop() {
        // Already painted by an earlier column pass.
        if !matches(flat, y * wu + x, target) {
            continue;
        }
        while y > 0 && matches(flat, (y - 1) * wu + x, target) {
            y -= 1;
        }

        let mut reach_left = false;
        let mut reach_right = false;
        while y < hu && matches(flat, y * wu + x, target) {
            let idx = y * wu + x;
            flat[idx * 4..idx * 4 + 4].copy_from_slice(&fill);
            painted += 1;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);

            if x > 0 {
                if matches(flat, idx - 1, target) {
                    if !reach_left {
                        stack.push((x - 1, y));
                        reach_left = true;
                    }
                } else {
                    reach_left = false;
                }
            }
            if x + 1 < wu {
                if matches(flat, idx + 1, target) {
                    if !reach_right {
                        stack.push((x + 1, y));
                        reach_right = true;
                    }
                } else {
                    reach_right = false;
                }
            }
            y += 1;
        }
    }

    log::debug!("flood fill from {:?} painted {} px", seed, painted);
    Ok(FillReport::Filled {
        pixels: painted,
        bounds: Region::new(
            min_x as i32,
            min_y as i32,
            (max_x - min_x + 1) as u32,
            (max_y - min_y + 1) as u32,
        ),
    })
}
