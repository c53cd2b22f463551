use std::borrow::Cow;

use ab_glyph::FontArc;
use uuid::Uuid;

use crate::canvas::{MAX_CANVAS_DIM, RasterBuffer};
use crate::command::Command;
use crate::components::history::HistoryManager;
use crate::components::selection::{SelectionController, SelectionEvent};
use crate::error::{EditError, Notice, Outcome};
use crate::ops::clipboard::{AppClipboard, copy_selection};
use crate::ops::fill::{FillReport, flood_fill};
use crate::ops::shapes::{self, DrawStyle, Point, Shape};
use crate::ops::text;
use crate::settings::EditorSettings;

/// One open document: the raster, its undo history, the selection workflow
/// and the in-app clipboard.  All mutation goes through [`EditorSession::apply`].
pub struct EditorSession {
    id: Uuid,
    name: String,
    buffer: RasterBuffer,
    history: HistoryManager,
    selection: SelectionController,
    clipboard: AppClipboard,
    settings: EditorSettings,
    /// Loaded on the first text command.
    font: Option<FontArc>,
    status: String,
    is_dirty: bool,
}

impl EditorSession {
    /// Blank canvas sized and colored from `settings`.
    pub fn new(settings: EditorSettings) -> Result<Self, EditError> {
        let buffer = RasterBuffer::new_filled(settings.canvas_width, settings.canvas_height, settings.background)?;
        Ok(Self::from_buffer(buffer, settings))
    }

    /// Session over an existing image.  The image becomes the undo baseline.
    pub fn from_buffer(buffer: RasterBuffer, settings: EditorSettings) -> Self {
        let mut history = HistoryManager::new(settings.max_undo_steps);
        if let Some(bytes) = settings.max_history_bytes {
            history = history.with_memory_limit(bytes);
        }
        history.reset(&buffer, "New Canvas");
        let session = Self {
            id: Uuid::new_v4(),
            name: "Untitled".to_string(),
            selection: SelectionController::new(settings.background),
            buffer,
            history,
            clipboard: AppClipboard::default(),
            settings,
            font: None,
            status: String::new(),
            is_dirty: false,
        };
        log::info!(
            "session {}: {}x{} canvas",
            session.id,
            session.buffer.width(),
            session.buffer.height()
        );
        session
    }

    // ---- accessors ----------------------------------------------------------

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Name with a trailing `*` while there are unsaved edits.
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }

    /// Committed pixels.  A floating placement is not included; see
    /// [`EditorSession::preview`].
    pub fn buffer(&self) -> &RasterBuffer {
        &self.buffer
    }

    /// What the user sees: the buffer with any floating image composited.
    pub fn preview(&self) -> Cow<'_, RasterBuffer> {
        if self.selection.is_placing() {
            Cow::Owned(self.selection.preview(&self.buffer))
        } else {
            Cow::Borrowed(&self.buffer)
        }
    }

    pub fn history(&self) -> &HistoryManager {
        &self.history
    }

    pub fn selection(&self) -> &SelectionController {
        &self.selection
    }

    pub fn clipboard(&self) -> &AppClipboard {
        &self.clipboard
    }

    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    /// Use `font` for text instead of the configured or system font.
    pub fn set_font(&mut self, font: FontArc) {
        self.font = Some(font);
    }

    /// Last status line, success or failure.
    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn is_dirty(&self) -> bool {
        self.is_dirty
    }

    pub fn mark_saved(&mut self) {
        self.is_dirty = false;
    }

    // ---- command dispatch ---------------------------------------------------

    /// Run one command.  On `Err` the buffer, history and selection are
    /// exactly as they were before the call.
    pub fn apply(&mut self, command: Command) -> Result<Outcome, EditError> {
        let name = command.name();
        let modifies = !matches!(command, Command::PointerMove { .. } | Command::Copy);
        let is_load = matches!(command, Command::Load(_));

        match self.dispatch(command) {
            Ok(outcome) => {
                if outcome.is_applied() && modifies {
                    self.is_dirty = !is_load;
                }
                self.status = outcome.to_string();
                log::debug!("{}: {}", name, self.status);
                Ok(outcome)
            }
            Err(e) => {
                self.status = format!("{} failed: {}", name, e);
                log::warn!("{}", self.status);
                Err(e)
            }
        }
    }

    fn dispatch(&mut self, command: Command) -> Result<Outcome, EditError> {
        match command {
            Command::Draw { shape, style } => self.draw(&shape, &style),
            Command::Fill { x, y, color } => self.fill(x, y, color),
            Command::Text { at, text, size, style } => self.draw_text(at, &text, size, &style),

            Command::PointerDown { x, y } => {
                let event = self.selection.begin_drag((x, y), &mut self.buffer, &mut self.history);
                Ok(event_outcome(event))
            }
            Command::PointerMove { x, y } => Ok(event_outcome(self.selection.drag_to((x, y)))),
            Command::PointerUp { x, y } => {
                let event = self.selection.end_drag((x, y), &mut self.buffer)?;
                Ok(event_outcome(event))
            }

            Command::SelectAll => {
                self.selection.select_all(&mut self.buffer, &mut self.history);
                Ok(Outcome::Applied(format!(
                    "Selected {}x{}",
                    self.buffer.width(),
                    self.buffer.height()
                )))
            }
            Command::Commit => Ok(match self.selection.commit(&mut self.buffer, &mut self.history) {
                Some(rect) => Outcome::Applied(format!("Placed selection at {}", rect)),
                None => Outcome::Unchanged(Notice::NothingToCommit),
            }),
            Command::Cancel => Ok(if self.selection.cancel(&mut self.buffer) {
                Outcome::Applied("Selection cancelled".to_string())
            } else {
                Outcome::Unchanged(Notice::NoSelection)
            }),
            Command::CropToSelection => {
                Ok(match self.selection.crop_to_selection(&mut self.buffer, &mut self.history) {
                    Some((w, h)) => Outcome::Applied(format!("Cropped to {}x{}", w, h)),
                    None => Outcome::Unchanged(Notice::NothingToCrop),
                })
            }
            Command::CropToImageSize => {
                Ok(match self.selection.crop_to_image_size(&mut self.buffer, &mut self.history)? {
                    Some((w, h)) => Outcome::Applied(format!("Cropped to {}x{}", w, h)),
                    None => Outcome::Unchanged(Notice::NothingToCrop),
                })
            }

            Command::Copy => {
                let (w, h) = copy_selection(&mut self.clipboard, &self.selection, &self.buffer);
                Ok(Outcome::Applied(format!("Copied {}x{}", w, h)))
            }
            Command::Paste => {
                let Some(image) = self.clipboard.image().cloned() else {
                    return Ok(Outcome::Unchanged(Notice::NothingToPaste));
                };
                Ok(self.place_external(image, 0, 0))
            }
            Command::PasteImage { image, x, y } => Ok(self.place_external(image, x, y)),

            Command::Undo => Ok(self.undo()),
            Command::Redo => Ok(self.redo()),

            Command::Clear => {
                self.selection.reset();
                self.buffer.fill(self.settings.background);
                self.history.snapshot(&self.buffer, "Clear");
                Ok(Outcome::Applied("Canvas cleared".to_string()))
            }
            Command::NewCanvas { width, height } => {
                let fresh = RasterBuffer::new_filled(width, height, self.settings.background)?;
                self.selection.reset();
                self.buffer = fresh;
                self.history.snapshot(&self.buffer, "New Canvas");
                Ok(Outcome::Applied(format!("New {}x{} canvas", width, height)))
            }
            Command::Resize { width, height } => self.resize(width, height),
            Command::Load(buffer) => {
                self.selection.reset();
                self.buffer = buffer;
                self.history.reset(&self.buffer, "Open Image");
                Ok(Outcome::Applied(format!(
                    "Loaded {}x{} image",
                    self.buffer.width(),
                    self.buffer.height()
                )))
            }
        }
    }

    // ---- individual commands ------------------------------------------------

    // Draw, fill and text decide whether they will change anything before a
    // floating placement is committed, so a notice leaves the session as is.

    fn draw(&mut self, shape: &Shape, style: &DrawStyle) -> Result<Outcome, EditError> {
        shapes::validate(shape, style)?;
        if !shapes::is_drawable(shape) {
            return Ok(Outcome::Unchanged(Notice::NothingToDraw));
        }
        self.selection.commit(&mut self.buffer, &mut self.history);

        shapes::draw_shape(&mut self.buffer, shape, style)?;
        self.history.snapshot(&self.buffer, shape.label());
        Ok(Outcome::Applied(format!("Drew {}", shape.label().to_lowercase())))
    }

    fn fill(&mut self, x: i32, y: i32, color: image::Rgba<u8>) -> Result<Outcome, EditError> {
        if self.buffer.pixel(x, y).is_none() {
            return Err(EditError::point_out_of_bounds(
                x as i64,
                y as i64,
                self.buffer.width(),
                self.buffer.height(),
            ));
        }
        if self.selection.preview_pixel(&self.buffer, x, y) == Some(color) {
            return Ok(Outcome::Unchanged(Notice::FillUnchanged));
        }
        self.selection.commit(&mut self.buffer, &mut self.history);

        match flood_fill(&mut self.buffer, (x, y), color)? {
            FillReport::Unchanged => Ok(Outcome::Unchanged(Notice::FillUnchanged)),
            FillReport::Filled { pixels, .. } => {
                self.history.snapshot(&self.buffer, "Fill");
                Ok(Outcome::Applied(format!("Filled {} pixels", pixels)))
            }
        }
    }

    fn draw_text(&mut self, at: Point, content: &str, size: f32, style: &DrawStyle) -> Result<Outcome, EditError> {
        text::validate(at, size, style)?;
        if content.trim().is_empty() {
            return Ok(Outcome::Unchanged(Notice::NothingToDraw));
        }
        let font = self.font()?;
        let coverage = text::rasterize_text(&font, content, size, at, self.buffer.bounds());
        if coverage.is_empty() {
            return Ok(Outcome::Unchanged(Notice::NothingToDraw));
        }
        self.selection.commit(&mut self.buffer, &mut self.history);

        text::stamp_text(&mut self.buffer, &coverage, style);
        self.history.snapshot(&self.buffer, "Text");
        Ok(Outcome::Applied(format!("Drew text \"{}\"", content)))
    }

    fn font(&mut self) -> Result<FontArc, EditError> {
        if let Some(font) = &self.font {
            return Ok(font.clone());
        }
        let path = match &self.settings.font_path {
            Some(path) => path.clone(),
            None => text::find_system_font()
                .ok_or_else(|| EditError::FontUnavailable("no system font found; set font_path".to_string()))?,
        };
        let font = text::load_font(&path)?;
        log::info!("text: using font {}", path.display());
        self.font = Some(font.clone());
        Ok(font)
    }

    fn place_external(&mut self, image: RasterBuffer, x: i32, y: i32) -> Outcome {
        let (w, h) = (image.width(), image.height());
        self.selection
            .lift_external(image, x, y, &mut self.buffer, &mut self.history);
        Outcome::Applied(format!("Pasted {}x{} at ({}, {})", w, h, x, y))
    }

    fn undo(&mut self) -> Outcome {
        // A floating image is committed first so that undo removes it.
        self.selection.commit(&mut self.buffer, &mut self.history);

        let Some(description) = self.history.undo_description().map(str::to_string) else {
            return Outcome::Unchanged(Notice::NothingToUndo);
        };
        match self.history.undo() {
            Some(restored) => {
                self.buffer = restored;
                Outcome::Applied(format!("Undo {}", description))
            }
            None => Outcome::Unchanged(Notice::NothingToUndo),
        }
    }

    fn redo(&mut self) -> Outcome {
        if !self.history.can_redo() {
            return Outcome::Unchanged(Notice::NothingToRedo);
        }
        self.selection.cancel(&mut self.buffer);

        let description = self.history.redo_description().map(str::to_string).unwrap_or_default();
        match self.history.redo() {
            Some(restored) => {
                self.buffer = restored;
                Outcome::Applied(format!("Redo {}", description))
            }
            None => Outcome::Unchanged(Notice::NothingToRedo),
        }
    }

    fn resize(&mut self, width: u32, height: u32) -> Result<Outcome, EditError> {
        if width == 0 || height == 0 || width > MAX_CANVAS_DIM || height > MAX_CANVAS_DIM {
            return Err(EditError::InvalidGeometry(format!(
                "canvas size {}x{} must be between 1 and {}",
                width, height, MAX_CANVAS_DIM
            )));
        }
        if (width, height) == (self.buffer.width(), self.buffer.height()) {
            return Ok(Outcome::Unchanged(Notice::SameSize));
        }
        self.selection.commit(&mut self.buffer, &mut self.history);

        let resized = self.buffer.resized(width, height, self.settings.background)?;
        self.buffer = resized;
        self.selection.reset();
        self.history.snapshot(&self.buffer, "Resize Canvas");
        Ok(Outcome::Applied(format!("Resized to {}x{}", width, height)))
    }
}

fn event_outcome(event: SelectionEvent) -> Outcome {
    match event {
        SelectionEvent::Ignored => Outcome::Unchanged(Notice::NoSelection),
        SelectionEvent::Degenerate => Outcome::Unchanged(Notice::EmptySelection),
        SelectionEvent::SelectionStarted => Outcome::Applied("Selecting".to_string()),
        SelectionEvent::SelectionResized(rect) => Outcome::Applied(format!("Selecting {}", rect)),
        SelectionEvent::Lifted(rect) => Outcome::Applied(format!("Selected {}", rect)),
        SelectionEvent::MoveStarted => Outcome::Applied("Moving selection".to_string()),
        SelectionEvent::Moved { x, y } => Outcome::Applied(format!("Selection at ({}, {})", x, y)),
        SelectionEvent::MoveEnded => Outcome::Applied("Selection moved".to_string()),
        SelectionEvent::Committed(rect) => Outcome::Applied(format!("Placed selection at {}", rect)),
    }
}
