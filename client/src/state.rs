use driftboard_shared::{BrushStyle, Point};

use crate::color::ColorSpec;

pub const DEFAULT_COLOR: &str = "#000000";
pub const DEFAULT_SIZE: f32 = 2.0;

/// A pointer-down-to-pointer-up stroke in progress. `last_point` is
/// canvas-absolute.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DrawGesture {
    pub last_point: Point,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GestureMode {
    Idle,
    Drawing(DrawGesture),
    /// `last_screen` is in viewport space; panning never produces segments.
    Panning { last_screen: Point },
}

/// Whether this client's board mirrors the session. Pointer input is refused
/// until the history has been applied, and again once the socket is gone.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SyncState {
    #[default]
    Loading,
    Live,
    Offline,
}

#[derive(Clone, Debug, PartialEq)]
pub struct BrushSettings {
    pub color: ColorSpec,
    pub size: f32,
    pub opacity: f32,
    pub brush: BrushStyle,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: ColorSpec::Solid(DEFAULT_COLOR.to_string()),
            size: DEFAULT_SIZE,
            opacity: 1.0,
            brush: BrushStyle::Round,
        }
    }
}
