//! pdf-lib editable document.
//!
//! Expects pdf-lib to be loaded as the global `PDFLib`.

use crate::js;
use async_trait::async_trait;
use fp_core::document::{DocumentLoader, EditableDocument, LoadOptions};
use fp_core::{DocumentError, LoadError};
use js_sys::{Promise, Uint8Array};
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = PDFLib, js_name = PDFDocument)]
    type LibDocument;

    #[wasm_bindgen(static_method_of = LibDocument, js_namespace = PDFLib, js_class = "PDFDocument", catch)]
    fn load(bytes: &Uint8Array, options: &JsValue) -> Result<Promise, JsValue>;

    #[wasm_bindgen(method, js_name = getPageCount, catch)]
    fn get_page_count(this: &LibDocument) -> Result<u32, JsValue>;

    #[wasm_bindgen(method, catch)]
    fn save(this: &LibDocument) -> Result<Promise, JsValue>;
}

/// pdf-lib's `ParseSpeeds.Slow`, in objects per tick.
const THOROUGH_PARSE_SPEED: f64 = 100.0;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfLibLoader;

#[async_trait(?Send)]
impl DocumentLoader for PdfLibLoader {
    type Document = PdfLibDocument;

    async fn load(&self, bytes: &[u8], options: LoadOptions) -> Result<PdfLibDocument, LoadError> {
        let speed = if options.thorough {
            THOROUGH_PARSE_SPEED
        } else {
            f64::INFINITY
        };
        let params = js::options(&[
            ("ignoreEncryption", options.ignore_encryption.into()),
            ("parseSpeed", speed.into()),
            ("throwOnInvalidObject", JsValue::FALSE),
        ])
        .map_err(load_error)?;
        let promise = LibDocument::load(&Uint8Array::from(bytes), &params).map_err(load_error)?;
        let inner: LibDocument = js::settle(promise).await.map_err(load_error)?;
        Ok(PdfLibDocument { inner })
    }
}

fn load_error(e: JsValue) -> LoadError {
    LoadError::classify(js::message(&e))
}

pub struct PdfLibDocument {
    inner: LibDocument,
}

#[async_trait(?Send)]
impl EditableDocument for PdfLibDocument {
    fn page_count(&self) -> Result<u32, DocumentError> {
        self.inner
            .get_page_count()
            .map_err(|e| DocumentError::PageCount(js::message(&e)))
    }

    async fn save(&self) -> Result<Vec<u8>, DocumentError> {
        let serialize = |e: JsValue| DocumentError::Serialize(js::message(&e));
        let promise = self.inner.save().map_err(serialize)?;
        let bytes: Uint8Array = js::settle(promise).await.map_err(serialize)?;
        Ok(bytes.to_vec())
    }
}
