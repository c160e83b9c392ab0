//! JavaScript bindings for subsetting and WOFF embedding (`wasm` feature).

use wasm_bindgen::prelude::*;

use crate::options::FontOptions;

fn to_js(e: crate::FontError) -> JsValue {
    JsValue::from_str(&e.to_string())
}

#[wasm_bindgen(js_name = subsetFont)]
pub fn subset_font(font: &[u8], corpus: &str) -> Result<js_sys::Uint8Array, JsValue> {
    let data = crate::subset(font, corpus).map_err(to_js)?;
    Ok(js_sys::Uint8Array::from(data.as_slice()))
}

#[wasm_bindgen(js_name = fontToWoff)]
pub fn font_to_woff(font: &[u8]) -> Result<js_sys::Uint8Array, JsValue> {
    let data = crate::to_woff(font).map_err(to_js)?;
    Ok(js_sys::Uint8Array::from(data.as_slice()))
}

/// `options` may be `undefined` for defaults.
#[wasm_bindgen(js_name = embedFont)]
pub fn embed_font(font: &[u8], corpus: &str, options: JsValue) -> Result<String, JsValue> {
    let options: FontOptions = if options.is_undefined() || options.is_null() {
        FontOptions::default()
    } else {
        serde_wasm_bindgen::from_value(options)
            .map_err(|e| JsValue::from_str(&format!("Invalid font options: {}", e)))?
    };
    crate::embed_font(font, corpus, &options).map_err(to_js)
}
