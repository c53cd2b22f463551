use image::Rgba;

use crate::canvas::{RasterBuffer, Region, WHITE};
use crate::components::history::HistoryManager;
use crate::error::EditError;

// ============================================================================
// PENDING PLACEMENT
// ============================================================================

/// Where a floating image came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlacementSource {
    /// Cut out of the canvas; `origin` is the area that was cleared.
    Canvas { origin: Region },
    /// Pasted or imported; the canvas was not touched when it appeared.
    External,
}

/// Detached pixels floating over the canvas until committed or cancelled.
#[derive(Clone, Debug)]
pub struct PendingPlacement {
    image: RasterBuffer,
    x: i32,
    y: i32,
    /// Pointer offset from the anchor while a move drag is active.
    drag_offset: Option<(i32, i32)>,
    source: PlacementSource,
}

impl PendingPlacement {
    fn new(image: RasterBuffer, x: i32, y: i32, source: PlacementSource) -> Self {
        Self { image, x, y, drag_offset: None, source }
    }

    pub fn image(&self) -> &RasterBuffer {
        &self.image
    }

    pub fn anchor(&self) -> (i32, i32) {
        (self.x, self.y)
    }

    pub fn bounds(&self) -> Region {
        Region::new(self.x, self.y, self.image.width(), self.image.height())
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_offset.is_some()
    }

    pub fn source(&self) -> PlacementSource {
        self.source
    }
}

// ============================================================================
// STATE MACHINE
// ============================================================================

#[derive(Clone, Debug)]
pub enum SelectionState {
    Idle,
    /// Marquee being dragged; nothing lifted yet.
    Selecting { start: (i32, i32), current: (i32, i32) },
    Placing(PendingPlacement),
}

/// What a pointer event did, for status reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SelectionEvent {
    Ignored,
    SelectionStarted,
    SelectionResized(Region),
    /// Marquee released with zero width or height.
    Degenerate,
    Lifted(Region),
    MoveStarted,
    Moved { x: i32, y: i32 },
    MoveEnded,
    Committed(Region),
}

/// Drives the select → lift → move → commit/cancel workflow.
///
/// Only one placement can exist at a time; every path into `Placing`
/// first commits whatever was floating.
#[derive(Debug)]
pub struct SelectionController {
    state: SelectionState,
    last_placed_rect: Option<Region>,
    background: Rgba<u8>,
}

impl Default for SelectionController {
    fn default() -> Self {
        Self::new(WHITE)
    }
}

impl SelectionController {
    pub fn new(background: Rgba<u8>) -> Self {
        Self {
            state: SelectionState::Idle,
            last_placed_rect: None,
            background,
        }
    }

    // ---- accessors ----------------------------------------------------------

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.state, SelectionState::Idle)
    }

    pub fn is_placing(&self) -> bool {
        matches!(self.state, SelectionState::Placing(_))
    }

    pub fn pending(&self) -> Option<&PendingPlacement> {
        match &self.state {
            SelectionState::Placing(p) => Some(p),
            _ => None,
        }
    }

    /// Marquee rectangle while selecting.
    pub fn marquee(&self) -> Option<Region> {
        match self.state {
            SelectionState::Selecting { start, current } => Some(Region::from_corners(start, current)),
            _ => None,
        }
    }

    pub fn last_placed_rect(&self) -> Option<Region> {
        self.last_placed_rect
    }

    pub fn background(&self) -> Rgba<u8> {
        self.background
    }

    /// Forget any marquee, placement and placed rectangle without touching
    /// the buffer.  Used when the buffer is replaced wholesale.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
        self.last_placed_rect = None;
    }

    // ---- pointer transitions ------------------------------------------------

    /// Pointer pressed.  Outside a floating image this commits it.
    pub fn begin_drag(
        &mut self,
        point: (i32, i32),
        buffer: &mut RasterBuffer,
        history: &mut HistoryManager,
    ) -> SelectionEvent {
        match &mut self.state {
            SelectionState::Idle => {
                self.state = SelectionState::Selecting { start: point, current: point };
                SelectionEvent::SelectionStarted
            }
            SelectionState::Selecting { start, current } => {
                // Missed release; restart the marquee here.
                *start = point;
                *current = point;
                SelectionEvent::SelectionStarted
            }
            SelectionState::Placing(pending) => {
                if pending.bounds().contains(point.0, point.1) {
                    let offset = (point.0.saturating_sub(pending.x), point.1.saturating_sub(pending.y));
                    pending.drag_offset = Some(offset);
                    SelectionEvent::MoveStarted
                } else {
                    match self.commit(buffer, history) {
                        Some(rect) => SelectionEvent::Committed(rect),
                        None => SelectionEvent::Ignored,
                    }
                }
            }
        }
    }

    /// Pointer moved with the button held.  Never mutates the buffer.
    pub fn drag_to(&mut self, point: (i32, i32)) -> SelectionEvent {
        match &mut self.state {
            SelectionState::Idle => SelectionEvent::Ignored,
            SelectionState::Selecting { start, current } => {
                *current = point;
                SelectionEvent::SelectionResized(Region::from_corners(*start, point))
            }
            SelectionState::Placing(pending) => match pending.drag_offset {
                // Saturates at the i32 range; the anchor may sit far off-canvas.
                Some((ox, oy)) => {
                    pending.x = point.0.saturating_sub(ox);
                    pending.y = point.1.saturating_sub(oy);
                    SelectionEvent::Moved { x: pending.x, y: pending.y }
                }
                None => SelectionEvent::Ignored,
            },
        }
    }

    /// Pointer released.  A non-empty marquee lifts its pixels: they are
    /// copied out and the source area is filled with the background color.
    pub fn end_drag(&mut self, point: (i32, i32), buffer: &mut RasterBuffer) -> Result<SelectionEvent, EditError> {
        match &mut self.state {
            SelectionState::Idle => Ok(SelectionEvent::Ignored),
            SelectionState::Selecting { start, .. } => {
                let marquee = Region::from_corners(*start, point);
                let Some(rect) = marquee.intersect(&buffer.bounds()) else {
                    self.state = SelectionState::Idle;
                    return Ok(SelectionEvent::Degenerate);
                };
                let image = buffer.get_region(rect.x, rect.y, rect.width, rect.height)?;
                buffer.fill_rect(rect.x, rect.y, rect.width, rect.height, self.background);
                self.state = SelectionState::Placing(PendingPlacement::new(
                    image,
                    rect.x,
                    rect.y,
                    PlacementSource::Canvas { origin: rect },
                ));
                log::debug!("selection: lifted {}", rect);
                Ok(SelectionEvent::Lifted(rect))
            }
            SelectionState::Placing(pending) => {
                if pending.drag_offset.take().is_some() {
                    Ok(SelectionEvent::MoveEnded)
                } else {
                    Ok(SelectionEvent::Ignored)
                }
            }
        }
    }

    // ---- lifting ------------------------------------------------------------

    /// Lift the entire buffer and clear it to the background color.
    pub fn select_all(&mut self, buffer: &mut RasterBuffer, history: &mut HistoryManager) {
        self.commit(buffer, history);
        let rect = buffer.bounds();
        let image = buffer.clone();
        buffer.fill(self.background);
        self.state = SelectionState::Placing(PendingPlacement::new(
            image,
            0,
            0,
            PlacementSource::Canvas { origin: rect },
        ));
    }

    /// Float an image that did not come from this canvas (paste, import).
    pub fn lift_external(
        &mut self,
        image: RasterBuffer,
        x: i32,
        y: i32,
        buffer: &mut RasterBuffer,
        history: &mut HistoryManager,
    ) {
        self.commit(buffer, history);
        self.state = SelectionState::Placing(PendingPlacement::new(image, x, y, PlacementSource::External));
    }

    // ---- leaving placement --------------------------------------------------

    /// Write the floating image at its anchor, clipped to the buffer, and
    /// snapshot.  Returns the placed rectangle, or `None` when idle.
    pub fn commit(&mut self, buffer: &mut RasterBuffer, history: &mut HistoryManager) -> Option<Region> {
        let rect = self.write_back(buffer)?;
        history.snapshot(buffer, "Place Selection");
        Some(rect)
    }

    /// Commit without a history entry, for callers that snapshot the
    /// combined result themselves.
    fn write_back(&mut self, buffer: &mut RasterBuffer) -> Option<Region> {
        if !self.is_placing() {
            return None;
        }
        let SelectionState::Placing(pending) = std::mem::replace(&mut self.state, SelectionState::Idle) else {
            return None;
        };
        let rect = pending.bounds();
        buffer.put_region(&pending.image, pending.x, pending.y);
        self.last_placed_rect = Some(rect);
        log::debug!("selection: committed {}", rect);
        Some(rect)
    }

    /// Drop the floating image.  Pixels cut from the canvas go back where
    /// they came from, which leaves the buffer equal to the last snapshot.
    pub fn cancel(&mut self, buffer: &mut RasterBuffer) -> bool {
        match std::mem::replace(&mut self.state, SelectionState::Idle) {
            SelectionState::Idle => false,
            SelectionState::Selecting { .. } => true,
            SelectionState::Placing(pending) => {
                if let PlacementSource::Canvas { origin } = pending.source {
                    buffer.put_region(&pending.image, origin.x, origin.y);
                }
                true
            }
        }
    }

    // ---- crops --------------------------------------------------------------

    /// Replace the buffer with exactly the floating image.  `None` when
    /// nothing is floating.
    pub fn crop_to_selection(
        &mut self,
        buffer: &mut RasterBuffer,
        history: &mut HistoryManager,
    ) -> Option<(u32, u32)> {
        if !self.is_placing() {
            return None;
        }
        let SelectionState::Placing(pending) = std::mem::replace(&mut self.state, SelectionState::Idle) else {
            return None;
        };
        let (w, h) = (pending.image.width(), pending.image.height());
        *buffer = pending.image;
        self.last_placed_rect = Some(Region::new(0, 0, w, h));
        history.snapshot(buffer, "Crop to Selection");
        Some((w, h))
    }

    /// Shrink the buffer to the most recently placed rectangle, clamped to
    /// the canvas.  A floating image is written back first.  `None` when no
    /// placement has been made or the rectangle lies entirely off-canvas.
    pub fn crop_to_image_size(
        &mut self,
        buffer: &mut RasterBuffer,
        history: &mut HistoryManager,
    ) -> Result<Option<(u32, u32)>, EditError> {
        let wrote_back = self.write_back(buffer).is_some();
        let Some(rect) = self.last_placed_rect.and_then(|r| r.intersect(&buffer.bounds())) else {
            if wrote_back {
                history.snapshot(buffer, "Place Selection");
            }
            return Ok(None);
        };
        let cropped = buffer.get_region(rect.x, rect.y, rect.width, rect.height)?;
        *buffer = cropped;
        self.last_placed_rect = Some(Region::new(0, 0, rect.width, rect.height));
        history.snapshot(buffer, "Crop to Image Size");
        Ok(Some((rect.width, rect.height)))
    }

    // ---- preview ------------------------------------------------------------

    /// One pixel as it would read after a commit.
    pub fn preview_pixel(&self, buffer: &RasterBuffer, x: i32, y: i32) -> Option<Rgba<u8>> {
        if let Some(pending) = self.pending()
            && pending.bounds().contains(x, y)
            && let Some(px) = pending.image.pixel(x - pending.x, y - pending.y)
            && buffer.pixel(x, y).is_some()
        {
            return Some(px);
        }
        buffer.pixel(x, y)
    }

    /// Buffer as it would look with the floating image committed.
    pub fn preview(&self, buffer: &RasterBuffer) -> RasterBuffer {
        let mut out = buffer.clone();
        if let Some(pending) = self.pending() {
            out.put_region(&pending.image, pending.x, pending.y);
        }
        out
    }
}
