//! jsPDF composer.
//!
//! Expects the UMD build, which exposes the class as `jspdf.jsPDF`.

use crate::js;
use fp_core::{ExportError, Rgb};
use fp_render::compose::{Composer, OutputFont, PageSize};
use fp_render::source::RasterImage;
use js_sys::{Array, ArrayBuffer, Uint8Array};
use kurbo::{Point, Rect};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = jspdf, js_name = jsPDF)]
    type JsPdf;

    #[wasm_bindgen(constructor, js_namespace = jspdf, js_class = "jsPDF", catch)]
    fn new(options: &JsValue) -> Result<JsPdf, JsValue>;

    #[wasm_bindgen(method, js_name = addPage, catch)]
    fn add_page(this: &JsPdf, format: &JsValue) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = addImage, catch)]
    fn add_image(
        this: &JsPdf,
        data: &str,
        format: &str,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = setFont)]
    fn set_font(this: &JsPdf, name: &str);

    #[wasm_bindgen(method, js_name = setFontSize)]
    fn set_font_size(this: &JsPdf, size: f64);

    #[wasm_bindgen(method, js_name = setTextColor)]
    fn set_text_color(this: &JsPdf, r: u8, g: u8, b: u8);

    #[wasm_bindgen(method, catch)]
    fn text(this: &JsPdf, text: &str, x: f64, y: f64) -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, js_name = setFillColor)]
    fn set_fill_color(this: &JsPdf, r: u8, g: u8, b: u8);

    #[wasm_bindgen(method, catch)]
    fn rect(this: &JsPdf, x: f64, y: f64, w: f64, h: f64, style: &str)
    -> Result<JsValue, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn output(this: &JsPdf, kind: &str) -> Result<JsValue, JsValue>;
}

fn compose_error(e: JsValue) -> ExportError {
    ExportError::Compose(js::message(&e))
}

fn format(size: PageSize) -> JsValue {
    Array::of2(&JsValue::from(size.width), &JsValue::from(size.height)).into()
}

/// Builds the exported document with jsPDF. The jsPDF instance is created
/// on the first page so its implicit first page has the right size.
#[derive(Default)]
pub struct JsPdfComposer {
    doc: Option<JsPdf>,
}

impl JsPdfComposer {
    pub fn new() -> Self {
        Self::default()
    }

    fn doc(&self) -> Result<&JsPdf, ExportError> {
        self.doc
            .as_ref()
            .ok_or_else(|| ExportError::Compose("no page has been added".to_string()))
    }
}

impl Composer for JsPdfComposer {
    fn add_page(&mut self, size: PageSize) -> Result<(), ExportError> {
        match &self.doc {
            Some(doc) => {
                doc.add_page(&format(size)).map_err(compose_error)?;
            }
            None => {
                let options = js::options(&[("unit", "mm".into()), ("format", format(size))])
                    .map_err(compose_error)?;
                self.doc = Some(JsPdf::new(&options).map_err(compose_error)?);
            }
        }
        Ok(())
    }

    fn draw_image(&mut self, image: &RasterImage, rect: Rect) -> Result<(), ExportError> {
        self.doc()?
            .add_image(
                &image.data_url,
                "PNG",
                rect.x0,
                rect.y0,
                rect.width(),
                rect.height(),
            )
            .map_err(compose_error)?;
        Ok(())
    }

    fn set_font(&mut self, font: OutputFont) {
        if let Some(doc) = &self.doc {
            doc.set_font(font.name());
        }
    }

    fn set_font_size(&mut self, size: f64) {
        if let Some(doc) = &self.doc {
            doc.set_font_size(size);
        }
    }

    fn set_text_color(&mut self, color: Rgb) {
        if let Some(doc) = &self.doc {
            doc.set_text_color(color.r, color.g, color.b);
        }
    }

    fn draw_text(&mut self, text: &str, at: Point) -> Result<(), ExportError> {
        self.doc()?.text(text, at.x, at.y).map_err(compose_error)?;
        Ok(())
    }

    fn set_fill_color(&mut self, color: Rgb) {
        if let Some(doc) = &self.doc {
            doc.set_fill_color(color.r, color.g, color.b);
        }
    }

    fn fill_rect(&mut self, rect: Rect) -> Result<(), ExportError> {
        self.doc()?
            .rect(rect.x0, rect.y0, rect.width(), rect.height(), "F")
            .map_err(compose_error)?;
        Ok(())
    }

    fn output(&mut self) -> Result<Vec<u8>, ExportError> {
        let buffer: ArrayBuffer = self
            .doc()?
            .output("arraybuffer")
            .map_err(compose_error)?
            .unchecked_into();
        Ok(Uint8Array::new(&buffer).to_vec())
    }
}
