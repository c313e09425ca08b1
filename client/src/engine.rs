use std::rc::Rc;

use driftboard_shared::{BrushStyle, Point, Rgba, SegmentError, StrokeSegment};
use thiserror::Error;

use crate::color::{ColorSpec, Feature, HueCycle, Unlocks};
use crate::growth::GrowthPolicy;
use crate::state::{BrushSettings, DrawGesture, GestureMode, SyncState};
use crate::surface::{Surface, SurfaceError};

pub const BACKGROUND: Rgba = Rgba::WHITE;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CaptureError {
    #[error("{0} is locked")]
    Locked(Feature),
    #[error("brush size must be positive, got {0}")]
    InvalidSize(f32),
    #[error(transparent)]
    Segment(#[from] SegmentError),
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}

/// Where captured segments go once they are on screen.
pub trait Outbox {
    fn send(&self, segment: &StrokeSegment);
}

impl<T: Outbox + ?Sized> Outbox for Rc<T> {
    fn send(&self, segment: &StrokeSegment) {
        (**self).send(segment)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum GestureStep {
    /// No gesture in progress.
    Ignored,
    Panned { grew: bool },
    Drew(StrokeSegment),
}

/// Turns pointer samples into segments and paints received history.
///
/// The backing surface is addressed in canvas-absolute coordinates; the pan
/// offset only maps between those and the viewport (`screen = absolute +
/// offset`) and is never part of segment data. Offsets are clamped to `<= 0`
/// because the surface extends toward positive coordinates only.
pub struct CaptureEngine<S: Surface, O: Outbox> {
    surface: S,
    outbox: O,
    policy: GrowthPolicy,
    offset: Point,
    viewport: (f32, f32),
    gesture: GestureMode,
    sync: SyncState,
    brush: BrushSettings,
    unlocks: Unlocks,
    hues: HueCycle,
}

impl<S: Surface, O: Outbox> CaptureEngine<S, O> {
    pub fn new(surface: S, outbox: O) -> Self {
        Self {
            surface,
            outbox,
            policy: GrowthPolicy::default(),
            offset: Point::new(0.0, 0.0),
            viewport: (0.0, 0.0),
            gesture: GestureMode::Idle,
            sync: SyncState::Loading,
            brush: BrushSettings::default(),
            unlocks: Unlocks::default(),
            hues: HueCycle::default(),
        }
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn offset(&self) -> Point {
        self.offset
    }

    pub fn gesture(&self) -> GestureMode {
        self.gesture
    }

    pub fn sync(&self) -> SyncState {
        self.sync
    }

    pub fn brush(&self) -> &BrushSettings {
        &self.brush
    }

    pub fn unlocks(&self) -> &Unlocks {
        &self.unlocks
    }

    pub fn to_canvas(&self, screen: Point) -> Point {
        screen.offset(-self.offset.x, -self.offset.y)
    }

    pub fn to_screen(&self, absolute: Point) -> Point {
        absolute.offset(self.offset.x, self.offset.y)
    }

    /// Records the viewport size and grows the surface if it no longer fits.
    pub fn set_viewport(&mut self, width: f32, height: f32) -> Result<bool, SurfaceError> {
        self.viewport = (width.max(0.0), height.max(0.0));
        self.ensure_capacity()
    }

    /// Starts a gesture and reports whether one started. Ignored unless the
    /// board is live.
    pub fn begin_gesture(&mut self, screen: Point, pan_requested: bool) -> bool {
        if self.sync != SyncState::Live {
            return false;
        }
        self.gesture = if pan_requested {
            GestureMode::Panning {
                last_screen: screen,
            }
        } else {
            GestureMode::Drawing(DrawGesture {
                last_point: self.to_canvas(screen),
            })
        };
        true
    }

    pub fn continue_gesture(&mut self, screen: Point) -> Result<GestureStep, CaptureError> {
        match self.gesture {
            GestureMode::Idle => Ok(GestureStep::Ignored),
            GestureMode::Panning { last_screen } => {
                self.gesture = GestureMode::Panning {
                    last_screen: screen,
                };
                self.offset = Point::new(
                    (self.offset.x + screen.x - last_screen.x).min(0.0),
                    (self.offset.y + screen.y - last_screen.y).min(0.0),
                );
                let grew = self.ensure_capacity()?;
                Ok(GestureStep::Panned { grew })
            }
            GestureMode::Drawing(DrawGesture { last_point }) => {
                let point = self.to_canvas(screen);
                self.gesture = GestureMode::Drawing(DrawGesture { last_point: point });
                let color = self.brush.color.resolve(&self.unlocks, &mut self.hues)?;
                let segment = StrokeSegment::new(
                    last_point,
                    point,
                    color,
                    self.brush.size,
                    self.brush.opacity,
                    self.brush.brush,
                )
                .validated()?;
                self.surface.draw_segment(&segment);
                self.outbox.send(&segment);
                Ok(GestureStep::Drew(segment))
            }
        }
    }

    pub fn end_gesture(&mut self) {
        self.gesture = GestureMode::Idle;
    }

    /// The socket is gone: abandon any gesture and refuse further input.
    pub fn go_offline(&mut self) {
        self.end_gesture();
        self.sync = SyncState::Offline;
    }

    /// Paints `segments` in order. Invalid entries are skipped; returns how
    /// many were painted.
    pub fn replay_history(&mut self, segments: &[StrokeSegment]) -> usize {
        let mut painted = 0;
        for segment in segments {
            if self.render_remote(segment).is_ok() {
                painted += 1;
            }
        }
        painted
    }

    /// Clears to the background, replays the session history and opens the
    /// board for input.
    pub fn reload(&mut self, segments: &[StrokeSegment]) -> usize {
        self.surface.fill(BACKGROUND);
        let painted = self.replay_history(segments);
        self.sync = SyncState::Live;
        painted
    }

    /// Paints a received segment, first growing the surface so the whole
    /// stroke lands on it.
    pub fn render_remote(&mut self, segment: &StrokeSegment) -> Result<(), CaptureError> {
        segment.validate()?;
        let reach = segment.size / 2.0;
        let extent = Point::new(
            segment.x0.max(segment.x1) + reach,
            segment.y0.max(segment.y1) + reach,
        );
        let current = (self.surface.width(), self.surface.height());
        if let Some(size) = self.policy.covering_size(current, extent) {
            self.resize(size)?;
        }
        self.surface.draw_segment(segment);
        Ok(())
    }

    pub fn set_color(&mut self, color: ColorSpec) {
        self.brush.color = color;
    }

    pub fn set_size(&mut self, size: f32) -> Result<(), CaptureError> {
        if !size.is_finite() || size <= 0.0 {
            return Err(CaptureError::InvalidSize(size));
        }
        self.brush.size = size;
        Ok(())
    }

    /// Clamps into `[0, 1]` and returns the stored value.
    pub fn set_opacity(&mut self, opacity: f32) -> f32 {
        let opacity = if opacity.is_finite() {
            opacity.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.brush.opacity = opacity;
        opacity
    }

    pub fn set_brush(&mut self, brush: BrushStyle) {
        self.brush.brush = brush;
    }

    pub fn unlock(&mut self, code: &str) -> Option<Feature> {
        self.unlocks.redeem(code)
    }

    fn ensure_capacity(&mut self) -> Result<bool, SurfaceError> {
        let current = (self.surface.width(), self.surface.height());
        let Some(size) = self.policy.required_size(current, self.offset, self.viewport) else {
            return Ok(false);
        };
        self.resize(size)?;
        Ok(true)
    }

    fn resize(&mut self, (width, height): (u32, u32)) -> Result<(), SurfaceError> {
        let mut next = self.surface.allocate(width, height)?;
        next.fill(BACKGROUND);
        next.copy_from(&self.surface);
        self.surface = next;
        Ok(())
    }
}
