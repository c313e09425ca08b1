use driftboard_shared::{BrushStyle, Rgba, StrokeSegment};

use crate::surface::{Surface, SurfaceError};

/// In-memory RGBA surface for headless replay.
///
/// Coverage is binary per pixel center, blending is source-over at the
/// segment's opacity, so the same input sequence always yields the same bytes.
#[derive(Clone, Debug, PartialEq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, background: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![background; width as usize * height as usize],
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.pixels.get(self.index(x, y)).copied()
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

impl Surface for Bitmap {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn allocate(&self, width: u32, height: u32) -> Result<Self, SurfaceError> {
        let len = (width as usize).checked_mul(height as usize);
        if len.is_none() {
            return Err(SurfaceError::Allocate {
                width,
                height,
                reason: "pixel count overflows".into(),
            });
        }
        Ok(Self::new(width, height, Rgba::WHITE))
    }

    fn fill(&mut self, color: Rgba) {
        self.pixels.fill(color);
    }

    fn draw_segment(&mut self, segment: &StrokeSegment) {
        let color = Rgba::parse(&segment.color).unwrap_or(Rgba::BLACK);
        let half = segment.size / 2.0;
        let pad = half + 1.0;
        let Some((min_x, max_x)) = span(segment.x0, segment.x1, pad, self.width) else {
            return;
        };
        let Some((min_y, max_y)) = span(segment.y0, segment.y1, pad, self.height) else {
            return;
        };
        for y in min_y..=max_y {
            for x in min_x..=max_x {
                if covers(segment, half, x as f32 + 0.5, y as f32 + 0.5) {
                    let index = self.index(x, y);
                    self.pixels[index] = blend(self.pixels[index], color, segment.opacity);
                }
            }
        }
    }

    fn copy_from(&mut self, source: &Self) {
        let width = self.width.min(source.width);
        let height = self.height.min(source.height);
        for y in 0..height {
            let from = source.index(0, y);
            let to = self.index(0, y);
            self.pixels[to..to + width as usize]
                .copy_from_slice(&source.pixels[from..from + width as usize]);
        }
    }
}

/// Inclusive pixel range touched along one axis, or `None` if it misses the
/// surface entirely.
fn span(a: f32, b: f32, pad: f32, limit: u32) -> Option<(u32, u32)> {
    if limit == 0 {
        return None;
    }
    let low = (a.min(b) - pad).floor();
    let high = (a.max(b) + pad).ceil();
    if high < 0.0 || low >= limit as f32 {
        return None;
    }
    let low = low.max(0.0) as u32;
    let high = (high.min((limit - 1) as f32)) as u32;
    Some((low, high))
}

fn covers(segment: &StrokeSegment, half: f32, px: f32, py: f32) -> bool {
    let dx = segment.x1 - segment.x0;
    let dy = segment.y1 - segment.y0;
    let rx = px - segment.x0;
    let ry = py - segment.y0;
    let length = (dx * dx + dy * dy).sqrt();
    if length <= f32::EPSILON {
        return match segment.brush {
            BrushStyle::Round => rx * rx + ry * ry <= half * half,
            BrushStyle::Square => rx.abs() <= half && ry.abs() <= half,
            BrushStyle::Flat => false,
        };
    }
    let ux = dx / length;
    let uy = dy / length;
    let along = rx * ux + ry * uy;
    let across = (rx * uy - ry * ux).abs();
    match segment.brush {
        BrushStyle::Round => {
            let t = along.clamp(0.0, length);
            let cx = rx - ux * t;
            let cy = ry - uy * t;
            cx * cx + cy * cy <= half * half
        }
        BrushStyle::Square => across <= half && along >= -half && along <= length + half,
        BrushStyle::Flat => across <= half && along >= 0.0 && along <= length,
    }
}

fn blend(dst: Rgba, src: Rgba, opacity: f32) -> Rgba {
    let alpha = opacity.clamp(0.0, 1.0) * (src.a as f32 / 255.0);
    let mix = |s: u8, d: u8| (s as f32 * alpha + d as f32 * (1.0 - alpha)).round() as u8;
    let dst_alpha = dst.a as f32 / 255.0;
    Rgba {
        r: mix(src.r, dst.r),
        g: mix(src.g, dst.g),
        b: mix(src.b, dst.b),
        a: ((alpha + dst_alpha * (1.0 - alpha)) * 255.0).round() as u8,
    }
}
