use driftboard_shared::{Rgba, StrokeSegment};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum SurfaceError {
    #[error("cannot allocate a {width}x{height} surface: {reason}")]
    Allocate {
        width: u32,
        height: u32,
        reason: String,
    },
}

/// A drawable backing store addressed in canvas-absolute pixels.
pub trait Surface: Sized {
    fn width(&self) -> u32;

    fn height(&self) -> u32;

    /// A new, blank surface of the same kind.
    fn allocate(&self, width: u32, height: u32) -> Result<Self, SurfaceError>;

    fn fill(&mut self, color: Rgba);

    fn draw_segment(&mut self, segment: &StrokeSegment);

    /// Copies `source` pixel-for-pixel with both origins at (0, 0).
    fn copy_from(&mut self, source: &Self);
}
