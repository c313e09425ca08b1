use driftboard_shared::Point;

pub const GROWTH_MARGIN: f32 = 200.0;
pub const GROWTH_INCREMENT: u32 = 1000;
pub const INITIAL_SURFACE: (u32, u32) = (2000, 2000);
/// Largest edge a surface grows to when covering received segments; browsers
/// refuse canvases much beyond this.
pub const MAX_SURFACE_EDGE: u32 = 32_768;

/// Decides when panning has brought the viewport too close to the edge of
/// the backing surface. Sizes only ever grow.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GrowthPolicy {
    pub margin: f32,
    pub increment: u32,
}

impl Default for GrowthPolicy {
    fn default() -> Self {
        Self {
            margin: GROWTH_MARGIN,
            increment: GROWTH_INCREMENT,
        }
    }
}

impl GrowthPolicy {
    /// Size one axis must have to keep `|offset| + viewport` inside the margin.
    pub fn grow_axis(&self, current: u32, offset: f32, viewport: f32) -> u32 {
        if self.increment == 0 || !offset.is_finite() || !viewport.is_finite() {
            return current;
        }
        let needed = offset.abs() + viewport;
        let mut size = current;
        while needed > size as f32 - self.margin {
            size = size.saturating_add(self.increment);
            if size == u32::MAX {
                break;
            }
        }
        size
    }

    /// Size one axis must have so that pixels up to `extent` exist. Whole
    /// increments, capped at `MAX_SURFACE_EDGE`, never below `current`.
    pub fn cover_axis(&self, current: u32, extent: f32) -> u32 {
        if self.increment == 0 || !extent.is_finite() {
            return current;
        }
        let target = extent.ceil().min(MAX_SURFACE_EDGE as f32);
        let mut size = current;
        while (size as f32) < target && size < MAX_SURFACE_EDGE {
            size = size.saturating_add(self.increment);
        }
        size.min(MAX_SURFACE_EDGE).max(current)
    }

    /// New surface size if content reaching `extent` (canvas-absolute, far
    /// corner) falls outside the surface, `None` otherwise.
    pub fn covering_size(&self, surface: (u32, u32), extent: Point) -> Option<(u32, u32)> {
        let width = self.cover_axis(surface.0, extent.x);
        let height = self.cover_axis(surface.1, extent.y);
        if (width, height) == surface {
            None
        } else {
            Some((width, height))
        }
    }

    /// New surface size if either axis must grow, `None` otherwise.
    pub fn required_size(
        &self,
        surface: (u32, u32),
        offset: Point,
        viewport: (f32, f32),
    ) -> Option<(u32, u32)> {
        let width = self.grow_axis(surface.0, offset.x, viewport.0);
        let height = self.grow_axis(surface.1, offset.y, viewport.1);
        if (width, height) == surface {
            None
        } else {
            Some((width, height))
        }
    }
}
