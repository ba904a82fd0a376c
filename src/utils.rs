// src/utils.rs
use crate::error::ShowcaseError;
use gloo::utils::document;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::Element;

/// Tag name the component mounts onto.
pub const SHOWCASE_TAG: &str = "biotea-bioschemas-showcase";

/// Method the host page calls on the element to start a run.
pub const RUN_METHOD: &str = "parseData";

/// Best-effort human readable text for a thrown JS value.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(text) = err.as_string() {
        return text;
    }
    if let Some(error) = err.dyn_ref::<js_sys::Error>() {
        return String::from(error.message());
    }
    format!("{:?}", err)
}

/// Every showcase element currently in the document.
pub fn showcase_hosts() -> Vec<Element> {
    let collection = document().get_elements_by_tag_name(SHOWCASE_TAG);
    (0..collection.length())
        .filter_map(|i| collection.item(i))
        .collect()
}

/// Append a `<script type="application/ld+json">` with `json` to the body.
pub fn append_json_ld_script(json: &str) -> Result<(), ShowcaseError> {
    let document = document();
    let body = document
        .body()
        .ok_or_else(|| ShowcaseError::Dom("document has no body".to_string()))?;
    let script = document
        .create_element("script")
        .map_err(|e| ShowcaseError::Dom(js_error_message(&e)))?;
    script
        .set_attribute("type", "application/ld+json")
        .map_err(|e| ShowcaseError::Dom(js_error_message(&e)))?;
    script.set_text_content(Some(json));
    body.append_child(&script)
        .map_err(|e| ShowcaseError::Dom(js_error_message(&e)))?;
    Ok(())
}
