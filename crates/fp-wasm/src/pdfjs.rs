//! pdf.js page source.
//!
//! Expects the pdf.js build to be loaded as the global `pdfjsLib`.

use crate::js;
use crate::render2d::HtmlCanvas;
use async_trait::async_trait;
use fp_core::{LoadError, RenderError, Rotation};
use fp_render::canvas::Canvas;
use fp_render::source::{PageSource, PixelSize, RasterImage, check_page};
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    type LoadingTask;

    #[wasm_bindgen(js_namespace = pdfjsLib, js_name = getDocument, catch)]
    fn get_document(params: &JsValue) -> Result<LoadingTask, JsValue>;

    #[wasm_bindgen(method, getter)]
    fn promise(this: &LoadingTask) -> Promise;

    type DocumentProxy;

    #[wasm_bindgen(method, getter, js_name = numPages)]
    fn num_pages(this: &DocumentProxy) -> u32;

    #[wasm_bindgen(method, js_name = getPage)]
    fn get_page(this: &DocumentProxy, number: u32) -> Promise;

    type PageProxy;

    #[wasm_bindgen(method, js_name = getViewport)]
    fn get_viewport(this: &PageProxy, params: &JsValue) -> PageViewport;

    #[wasm_bindgen(method, catch)]
    fn render(this: &PageProxy, params: &JsValue) -> Result<RenderTask, JsValue>;

    type PageViewport;

    #[wasm_bindgen(method, getter)]
    fn width(this: &PageViewport) -> f64;

    #[wasm_bindgen(method, getter)]
    fn height(this: &PageViewport) -> f64;

    type RenderTask;

    #[wasm_bindgen(method, getter, js_name = promise)]
    fn done(this: &RenderTask) -> Promise;
}

/// A document opened with pdf.js, used for display and rasterization.
pub struct PdfJsSource {
    doc: DocumentProxy,
}

impl PdfJsSource {
    /// Open `bytes`. The bytes are copied; pdf.js may detach its buffer.
    pub async fn open(bytes: &[u8]) -> Result<Self, LoadError> {
        let params = js::options(&[
            ("data", Uint8Array::from(bytes).into()),
            ("ignoreEncryption", JsValue::TRUE),
            ("isEvalSupported", JsValue::FALSE),
            ("stopAtErrors", JsValue::FALSE),
        ])
        .map_err(|e| LoadError::classify(js::message(&e)))?;
        let task = get_document(&params).map_err(|e| LoadError::classify(js::message(&e)))?;
        let doc: DocumentProxy = js::settle(task.promise())
            .await
            .map_err(|e| LoadError::classify(js::message(&e)))?;
        log::debug!("pdf.js opened {} pages", doc.num_pages());
        Ok(Self { doc })
    }

    async fn page(&self, number: u32) -> Result<PageProxy, RenderError> {
        check_page(number, self.page_count())?;
        js::settle(self.doc.get_page(number))
            .await
            .map_err(draw_error)
    }

    /// Draw `page` into a fresh scratch canvas.
    async fn draw(
        &self,
        number: u32,
        scale: f64,
        rotation: Rotation,
    ) -> Result<HtmlCanvas, RenderError> {
        let page = self.page(number).await?;
        let params = js::options(&[
            ("scale", scale.into()),
            ("rotation", rotation.degrees().into()),
        ])
        .map_err(draw_error)?;
        let viewport = page.get_viewport(&params);
        let scratch = HtmlCanvas::scratch(viewport.width(), viewport.height()).map_err(draw_error)?;

        let params = js::options(&[
            ("canvasContext", scratch.context().clone().into()),
            ("viewport", viewport.into()),
        ])
        .map_err(draw_error)?;
        let task = page.render(&params).map_err(draw_error)?;
        js::settle::<JsValue>(task.done())
            .await
            .map_err(draw_error)?;
        Ok(scratch)
    }
}

fn draw_error(e: JsValue) -> RenderError {
    RenderError::Draw(js::message(&e))
}

#[async_trait(?Send)]
impl PageSource for PdfJsSource {
    type Surface = HtmlCanvas;

    fn page_count(&self) -> u32 {
        self.doc.num_pages()
    }

    async fn render_page(
        &self,
        page: u32,
        surface: &mut HtmlCanvas,
        scale: f64,
        rotation: Rotation,
    ) -> Result<PixelSize, RenderError> {
        let scratch = self.draw(page, scale, rotation).await?;
        let (width, height) = scratch.size();
        surface.set_size(width, height);
        surface.blit(&scratch).map_err(draw_error)?;
        Ok(PixelSize { width, height })
    }

    async fn rasterize_page(&self, page: u32, scale: f64) -> Result<RasterImage, RenderError> {
        let scratch = self.draw(page, scale, Rotation::Deg0).await?;
        let (width, height) = scratch.size();
        let data_url = scratch.to_png_data_url().map_err(draw_error)?;
        Ok(RasterImage {
            data_url,
            width,
            height,
        })
    }
}
