//! Small helpers for talking to JavaScript libraries.

use js_sys::{Object, Promise, Reflect};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;

/// Build a plain options object, e.g. `{ scale: 1.5, rotation: 90 }`.
pub fn options(entries: &[(&str, JsValue)]) -> Result<JsValue, JsValue> {
    let object = Object::new();
    for (key, value) in entries {
        Reflect::set(&object, &JsValue::from_str(key), value)?;
    }
    Ok(object.into())
}

/// Best-effort human-readable text for a thrown JavaScript value.
pub fn message(value: &JsValue) -> String {
    if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    value.as_string().unwrap_or_else(|| format!("{value:?}"))
}

/// Await a promise and cast its result.
pub async fn settle<T: JsCast>(promise: Promise) -> Result<T, JsValue> {
    let value = JsFuture::from(promise).await?;
    Ok(value.unchecked_into())
}
