//! Drawing surface abstraction.
//!
//! The browser backend wraps a `CanvasRenderingContext2d`; [`RecordingCanvas`]
//! keeps a list of operations instead and serves as the headless backend.

use fp_core::Rgb;
use kurbo::{Point, Rect};
use serde::Serialize;

/// Font used for filled text, in canvas pixels.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasFont {
    pub size_px: f64,
    pub family: String,
}

impl CanvasFont {
    /// CSS shorthand, e.g. `"12px Arial"`.
    pub fn css(&self) -> String {
        format!("{}px {}", self.size_px, self.family)
    }
}

/// A 2D surface the render pipeline draws onto.
pub trait Canvas {
    /// Current pixel size.
    fn size(&self) -> (f64, f64);

    /// Resize the backing store. Clears the surface.
    fn set_size(&mut self, width: f64, height: f64);

    /// Opaque filled rectangle.
    fn fill_rect(&mut self, rect: Rect, color: Rgb);

    /// Filled text with its baseline origin at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font: &CanvasFont, color: Rgb);
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum DrawOp {
    Resize {
        width: f64,
        height: f64,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        color: String,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        font: String,
        color: String,
    },
}

/// Canvas that records what was drawn.
#[derive(Debug, Clone, Default)]
pub struct RecordingCanvas {
    width: f64,
    height: f64,
    ops: Vec<DrawOp>,
}

impl RecordingCanvas {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            ops: Vec::new(),
        }
    }

    pub fn ops(&self) -> &[DrawOp] {
        &self.ops
    }

    /// Drop recorded operations, keeping the size.
    pub fn clear(&mut self) {
        self.ops.clear();
    }

    pub fn fill_rects(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillRect { .. }))
    }

    pub fn texts(&self) -> impl Iterator<Item = &DrawOp> {
        self.ops
            .iter()
            .filter(|op| matches!(op, DrawOp::FillText { .. }))
    }
}

impl Canvas for RecordingCanvas {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn set_size(&mut self, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.ops.clear();
        self.ops.push(DrawOp::Resize { width, height });
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgb) {
        self.ops.push(DrawOp::FillRect {
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            color: color.to_hex(),
        });
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &CanvasFont, color: Rgb) {
        self.ops.push(DrawOp::FillText {
            text: text.to_string(),
            x: origin.x,
            y: origin.y,
            font: font.css(),
            color: color.to_hex(),
        });
    }
}
