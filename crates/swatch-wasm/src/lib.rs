use serde_json::json;
use swatch_core::{global, SwatchError, Theme};
use wasm_bindgen::prelude::*;

/// Resolved style for `(theme, component, variant)` as JSON.
#[wasm_bindgen]
pub fn resolve_style(theme: &str, component: &str, variant: Option<String>) -> String {
    let result = theme
        .parse::<Theme>()
        .and_then(|theme| global::embedded()?.resolve(theme, component, variant.as_deref()));
    to_json(result)
}

#[wasm_bindgen]
pub fn primitive(category: &str, key: &str) -> String {
    to_json(global::embedded().and_then(|r| r.get_primitive(category, key).cloned()))
}

#[wasm_bindgen]
pub fn components() -> String {
    to_json(global::embedded().map(|r| r.list_components()))
}

fn to_json<T: serde::Serialize>(result: Result<T, SwatchError>) -> String {
    let value = match result {
        Ok(value) => serde_json::to_value(value),
        Err(e) => Ok(json!({ "error": e.to_string() })),
    };
    value
        .map(|v| v.to_string())
        .unwrap_or_else(|e| json!({ "error": e.to_string() }).to_string())
}
