use wasm_bindgen::JsCast;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement};

use driftboard_shared::{BrushStyle, Point, Rgba, StrokeSegment};

use crate::surface::{Surface, SurfaceError};

/// Offscreen canvas holding the whole drawing in canvas-absolute pixels.
pub struct CanvasSurface {
    document: Document,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl CanvasSurface {
    pub fn new(document: &Document, width: u32, height: u32) -> Result<Self, SurfaceError> {
        let fail = |reason: String| SurfaceError::Allocate {
            width,
            height,
            reason,
        };
        let canvas = document
            .create_element("canvas")
            .map_err(|error| fail(format!("{error:?}")))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|_| fail("element is not a canvas".into()))?;
        canvas.set_width(width);
        canvas.set_height(height);
        let ctx = canvas
            .get_context("2d")
            .map_err(|error| fail(format!("{error:?}")))?
            .ok_or_else(|| fail("missing 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| fail("unexpected context type".into()))?;
        ctx.set_line_join("round");
        Ok(Self {
            document: document.clone(),
            canvas,
            ctx,
        })
    }
}

fn line_cap(brush: BrushStyle) -> &'static str {
    match brush {
        BrushStyle::Round => "round",
        BrushStyle::Square => "square",
        BrushStyle::Flat => "butt",
    }
}

impl Surface for CanvasSurface {
    fn width(&self) -> u32 {
        self.canvas.width()
    }

    fn height(&self) -> u32 {
        self.canvas.height()
    }

    fn allocate(&self, width: u32, height: u32) -> Result<Self, SurfaceError> {
        Self::new(&self.document, width, height)
    }

    fn fill(&mut self, color: Rgba) {
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ctx
            .fill_rect(0.0, 0.0, self.width() as f64, self.height() as f64);
    }

    fn draw_segment(&mut self, segment: &StrokeSegment) {
        let ctx = &self.ctx;
        ctx.save();
        ctx.set_global_alpha(segment.opacity as f64);
        ctx.set_stroke_style_str(&segment.color);
        ctx.set_line_width(segment.size as f64);
        ctx.set_line_cap(line_cap(segment.brush));
        ctx.begin_path();
        ctx.move_to(segment.x0 as f64, segment.y0 as f64);
        ctx.line_to(segment.x1 as f64, segment.y1 as f64);
        ctx.stroke();
        ctx.restore();
    }

    fn copy_from(&mut self, source: &Self) {
        if let Err(error) = self
            .ctx
            .draw_image_with_html_canvas_element(&source.canvas, 0.0, 0.0)
        {
            web_sys::console::error_2(&"Surface copy failed".into(), &error);
        }
    }
}

/// Shows the backing surface in the visible canvas, shifted by the pan offset.
pub fn present(
    view_ctx: &CanvasRenderingContext2d,
    view_width: f64,
    view_height: f64,
    surface: &CanvasSurface,
    offset: Point,
) {
    view_ctx.clear_rect(0.0, 0.0, view_width, view_height);
    if let Err(error) = view_ctx.draw_image_with_html_canvas_element(
        &surface.canvas,
        offset.x as f64,
        offset.y as f64,
    ) {
        web_sys::console::error_2(&"Surface present failed".into(), &error);
    }
}
