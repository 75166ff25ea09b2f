//! Output document composition seam (jsPDF in the browser).
//!
//! Coordinates handed to a [`Composer`] are physical page units
//! (millimetres for the default A4 page).

use crate::source::RasterImage;
use fp_core::{ExportError, Rgb};
use kurbo::{Point, Rect};
use serde::Serialize;

/// Physical page size of the composed output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    pub const A4: PageSize = PageSize {
        width: 210.0,
        height: 297.0,
    };

    pub fn rect(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Fonts available in the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFont {
    Helvetica,
    Times,
    Courier,
}

impl OutputFont {
    /// Map a display family name, ignoring case and whitespace.
    /// Unknown families fall back to Helvetica.
    pub fn from_family(family: &str) -> Self {
        let key: String = family
            .chars()
            .filter(|c| !c.is_whitespace())
            .flat_map(char::to_lowercase)
            .collect();
        match key.as_str() {
            "arial" | "helvetica" => OutputFont::Helvetica,
            "timesnewroman" | "times" => OutputFont::Times,
            "couriernew" | "courier" => OutputFont::Courier,
            other => {
                log::debug!("no output font for {other:?}, using helvetica");
                OutputFont::Helvetica
            }
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            OutputFont::Helvetica => "helvetica",
            OutputFont::Times => "times",
            OutputFont::Courier => "courier",
        }
    }
}

/// Builds a new document page by page.
pub trait Composer {
    /// Start a new page; subsequent drawing targets it.
    fn add_page(&mut self, size: PageSize) -> Result<(), ExportError>;

    fn draw_image(&mut self, image: &RasterImage, rect: Rect) -> Result<(), ExportError>;

    fn set_font(&mut self, font: OutputFont);

    fn set_font_size(&mut self, size: f64);

    fn set_text_color(&mut self, color: Rgb);

    fn draw_text(&mut self, text: &str, at: Point) -> Result<(), ExportError>;

    fn set_fill_color(&mut self, color: Rgb);

    fn fill_rect(&mut self, rect: Rect) -> Result<(), ExportError>;

    /// Serialize the composed document.
    fn output(&mut self) -> Result<Vec<u8>, ExportError>;
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum ComposeOp {
    AddPage {
        width: f64,
        height: f64,
    },
    DrawImage {
        width: f64,
        height: f64,
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
    SetFont {
        font: OutputFont,
    },
    SetFontSize {
        size: f64,
    },
    SetTextColor {
        color: String,
    },
    DrawText {
        text: String,
        x: f64,
        y: f64,
    },
    SetFillColor {
        color: String,
    },
    FillRect {
        x: f64,
        y: f64,
        w: f64,
        h: f64,
    },
}

/// Composer that records its operations and outputs them as JSON.
#[derive(Debug, Clone, Default)]
pub struct RecordingComposer {
    ops: Vec<ComposeOp>,
}

impl RecordingComposer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ops(&self) -> &[ComposeOp] {
        &self.ops
    }

    pub fn page_count(&self) -> usize {
        self.ops
            .iter()
            .filter(|op| matches!(op, ComposeOp::AddPage { .. }))
            .count()
    }
}

impl Composer for RecordingComposer {
    fn add_page(&mut self, size: PageSize) -> Result<(), ExportError> {
        self.ops.push(ComposeOp::AddPage {
            width: size.width,
            height: size.height,
        });
        Ok(())
    }

    fn draw_image(&mut self, image: &RasterImage, rect: Rect) -> Result<(), ExportError> {
        self.ops.push(ComposeOp::DrawImage {
            width: image.width,
            height: image.height,
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
        });
        Ok(())
    }

    fn set_font(&mut self, font: OutputFont) {
        self.ops.push(ComposeOp::SetFont { font });
    }

    fn set_font_size(&mut self, size: f64) {
        self.ops.push(ComposeOp::SetFontSize { size });
    }

    fn set_text_color(&mut self, color: Rgb) {
        self.ops.push(ComposeOp::SetTextColor {
            color: color.to_hex(),
        });
    }

    fn draw_text(&mut self, text: &str, at: Point) -> Result<(), ExportError> {
        self.ops.push(ComposeOp::DrawText {
            text: text.to_string(),
            x: at.x,
            y: at.y,
        });
        Ok(())
    }

    fn set_fill_color(&mut self, color: Rgb) {
        self.ops.push(ComposeOp::SetFillColor {
            color: color.to_hex(),
        });
    }

    fn fill_rect(&mut self, rect: Rect) -> Result<(), ExportError> {
        self.ops.push(ComposeOp::FillRect {
            x: rect.x0,
            y: rect.y0,
            w: rect.width(),
            h: rect.height(),
        });
        Ok(())
    }

    fn output(&mut self) -> Result<Vec<u8>, ExportError> {
        serde_json::to_vec(&self.ops).map_err(|e| ExportError::Compose(e.to_string()))
    }
}
