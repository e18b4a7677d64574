//! WASM bindings for the spelltree-core library.
//!
//! All functions exposed to JavaScript via wasm-bindgen are defined here.

use wasm_bindgen::prelude::*;

use crate::compute_tree_layout_json;
use crate::output::ErrorOutput;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console, js_name = error)]
    pub fn console_error(s: &str);
}

/// Lay out a tree from its JSON inputs and return the layout as JSON.
///
/// On failure the result is `{"error": "..."}` and the error is also logged
/// to the browser console.
#[wasm_bindgen]
pub fn compute_tree_layout(tree_json: &str, base_json: &str, settings_json: &str) -> String {
    match compute_tree_layout_json(tree_json, base_json, settings_json) {
        Ok(json) => json,
        Err(e) => {
            console_error(&format!("Error computing tree layout: {}", e));
            let error_output = ErrorOutput { error: e.to_string() };
            serde_json::to_string(&error_output)
                .unwrap_or_else(|_| "{\"error\": \"Layout error\"}".to_string())
        }
    }
}
