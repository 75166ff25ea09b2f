//! Canvas2D backend for the render pipeline.
//!
//! Wraps an HTML `<canvas>` and its `CanvasRenderingContext2d`. pdf.js draws
//! page rasters into scratch canvases which are then copied onto the visible
//! one, so a failed page render never clears what is on screen.

use fp_core::Rgb;
use fp_render::canvas::{Canvas, CanvasFont};
use kurbo::{Point, Rect};
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

pub struct HtmlCanvas {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
}

impl HtmlCanvas {
    /// Wrap the canvas the context draws into.
    pub fn from_context(ctx: CanvasRenderingContext2d) -> Result<Self, JsValue> {
        let canvas = ctx
            .canvas()
            .ok_or_else(|| JsValue::from_str("rendering context is not attached to a canvas"))?;
        Ok(Self { canvas, ctx })
    }

    /// Detached canvas of the given size.
    pub fn scratch(width: f64, height: f64) -> Result<Self, JsValue> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or_else(|| JsValue::from_str("no document"))?;
        let canvas: HtmlCanvasElement = document.create_element("canvas")?.dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into()?;
        let mut scratch = Self { canvas, ctx };
        scratch.set_size(width, height);
        Ok(scratch)
    }

    pub fn context(&self) -> &CanvasRenderingContext2d {
        &self.ctx
    }

    /// Copy another canvas onto this one at the origin.
    pub fn blit(&self, source: &HtmlCanvas) -> Result<(), JsValue> {
        self.ctx
            .draw_image_with_html_canvas_element(&source.canvas, 0.0, 0.0)
    }

    pub fn to_png_data_url(&self) -> Result<String, JsValue> {
        self.canvas.to_data_url_with_type("image/png")
    }
}

impl Canvas for HtmlCanvas {
    fn size(&self) -> (f64, f64) {
        (f64::from(self.canvas.width()), f64::from(self.canvas.height()))
    }

    fn set_size(&mut self, width: f64, height: f64) {
        // Canvas backing stores are whole pixels; pdf.js viewports are not.
        self.canvas.set_width(width.floor().max(0.0) as u32);
        self.canvas.set_height(height.floor().max(0.0) as u32);
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ctx.set_fill_style_str(&color.to_hex());
        self.ctx
            .fill_rect(rect.x0, rect.y0, rect.width(), rect.height());
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &CanvasFont, color: Rgb) {
        self.ctx.set_font(&font.css());
        self.ctx.set_fill_style_str(&color.to_hex());
        if let Err(e) = self.ctx.fill_text(text, origin.x, origin.y) {
            log::warn!("fill_text failed: {e:?}");
        }
    }
}
