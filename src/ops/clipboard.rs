// ============================================================================
// CLIPBOARD OPERATIONS: in-process copy buffer feeding paste placements
// ============================================================================

use crate::canvas::RasterBuffer;
use crate::components::selection::SelectionController;

/// In-app clipboard storing an RGBA image with full transparency support.
/// Owned by the session; the OS clipboard is a collaborator outside the core.
#[derive(Clone, Debug, Default)]
pub struct AppClipboard {
    image: Option<RasterBuffer>,
}

impl AppClipboard {
    pub fn set_image(&mut self, image: RasterBuffer) {
        self.image = Some(image);
    }

    pub fn image(&self) -> Option<&RasterBuffer> {
        self.image.as_ref()
    }

    pub fn dimensions(&self) -> Option<(u32, u32)> {
        self.image.as_ref().map(|img| (img.width(), img.height()))
    }
}

/// Copy the floating image if there is one, otherwise the whole buffer.
/// Returns the copied size.
pub fn copy_selection(
    clipboard: &mut AppClipboard,
    selection: &SelectionController,
    buffer: &RasterBuffer,
) -> (u32, u32) {
    let copied = match selection.pending() {
        Some(pending) => pending.image().clone(),
        None => buffer.clone(),
    };
    let size = (copied.width(), copied.height());
    clipboard.set_image(copied);
    size
}
