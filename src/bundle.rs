//! Single-file `widget.js` assembly.
//!
//! DESIGN
//! ======
//! `wasm-pack build --target no-modules` emits JS glue that declares a
//! `wasm_bindgen` init function instead of globals. The bundle wraps that
//! glue in a loader which instantiates the `.wasm` file sitting next to the
//! script, then publishes `window.ChatbotWidget`, `window.chatbotInstances`
//! and the `window.ChatbotWidgetReady` promise (resolving to the class).
//! The whole file is one IIFE, so including it twice is harmless.

#[cfg(test)]
#[path = "bundle_test.rs"]
mod tests;

use crate::embed::js_string;
use crate::error::WidgetError;

/// Global promise that resolves to the `ChatbotWidget` class once loaded.
pub const READY_PROMISE: &str = "ChatbotWidgetReady";
/// Document event dispatched after the globals are published.
pub const READY_EVENT: &str = "chatbot-widget-ready";
/// File name the bundle is written under.
pub const BUNDLE_FILE: &str = "widget.js";

const LOADER: &str = include_str!("../assets/loader.js");
const GLUE_SLOT: &str = "/*__GLUE__*/";
const WASM_SLOT: &str = "\"__WASM_FILE__\"";
const GLUE_MARKER: &str = "wasm_bindgen";

/// File names wasm-pack produces for `--out-name {name}`.
#[must_use]
pub fn artifact_names(name: &str) -> (String, String) {
    (format!("{name}.js"), format!("{name}_bg.wasm"))
}

/// Wrap no-modules `glue` in the loader, fetching `wasm_file` relative to the script.
///
/// # Errors
///
/// Returns [`WidgetError::Bundle`] if `glue` is not no-modules output or
/// `wasm_file` is blank.
pub fn bundle_script(glue: &str, wasm_file: &str) -> Result<String, WidgetError> {
    if !glue.contains(GLUE_MARKER) {
        return Err(WidgetError::Bundle(
            "glue does not define `wasm_bindgen`; build with `--target no-modules`".to_owned(),
        ));
    }
    let wasm_file = wasm_file.trim();
    if wasm_file.is_empty() {
        return Err(WidgetError::Bundle("wasm file name is empty".to_owned()));
    }

    let loader = LOADER.replacen(WASM_SLOT, &js_string(wasm_file), 1);
    let Some((head, tail)) = loader.split_once(GLUE_SLOT) else {
        return Err(WidgetError::Bundle("loader template has no glue slot".to_owned()));
    };
    Ok(format!("{head}{}\n{tail}", glue.trim_end()))
}
