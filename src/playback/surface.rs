use std::path::Path;

use crate::foundation::{error::SignflowResult, frame::Frame};

/// Output seam the scheduler renders into.
///
/// The surrounding UI (or an encoder sink) implements this; the core never
/// knows what is on the other side. `render` receives decoded and bridge
/// frames in display order; `render_still` shows the idle image between
/// words and when playback goes idle.
pub trait DisplaySurface {
    /// Display one frame.
    fn render(&mut self, frame: &Frame) -> SignflowResult<()>;

    /// Display a still image from disk (the idle image).
    fn render_still(&mut self, path: &Path) -> SignflowResult<()>;
}
