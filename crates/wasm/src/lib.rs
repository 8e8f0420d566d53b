use kyozai_render::RenderOptions;
use serde::Serialize;
use wasm_bindgen::JsValue;
use wasm_bindgen::prelude::*;

// ============================================================================
// Render Config
// ============================================================================

/// Reads the optional JS config object. `undefined`, `null`, and objects
/// that do not deserialize all yield the defaults.
fn parse_config(config: JsValue) -> RenderOptions {
    if config.is_undefined() || config.is_null() {
        return RenderOptions::default();
    }
    serde_wasm_bindgen::from_value(config).unwrap_or_default()
}

/// Converts a response into a plain JS object.
///
/// Responses are flat structs of strings and booleans, so serialization
/// does not fail in practice; if it does, the caller still gets a
/// `{success: false, error}` object instead of an exception.
fn to_js<T: Serialize>(response: &T) -> JsValue {
    serde_wasm_bindgen::to_value(response).unwrap_or_else(|err| failure(&err.to_string()))
}

fn failure(message: &str) -> JsValue {
    let object = js_sys::Object::new();
    let _ = js_sys::Reflect::set(&object, &"success".into(), &JsValue::FALSE);
    let _ = js_sys::Reflect::set(
        &object,
        &"error".into(),
        &format!("Serialization error: {message}").into(),
    );
    object.into()
}

// ============================================================================
// HTML API
// ============================================================================

/// Renders exam YAML to a print-ready HTML document.
///
/// Returns `{html, success, error}`; never throws.
#[wasm_bindgen]
pub fn generate_exam_html(yaml: &str, config: JsValue) -> JsValue {
    let options = parse_config(config);
    to_js(&kyozai_render::generate_exam_html_with_options(yaml, &options))
}

/// Renders worksheet YAML to a print-ready HTML document.
///
/// Returns `{html, success, error}`; never throws.
#[wasm_bindgen]
pub fn generate_worksheet_html(yaml: &str, config: JsValue) -> JsValue {
    let options = parse_config(config);
    to_js(&kyozai_render::generate_worksheet_html_with_options(yaml, &options))
}

/// Renders lesson-plan YAML to a print-ready HTML document.
///
/// Returns `{html, success, error}`; never throws.
#[wasm_bindgen]
pub fn generate_lesson_plan_html(yaml: &str, config: JsValue) -> JsValue {
    let options = parse_config(config);
    to_js(&kyozai_render::generate_lesson_plan_html_with_options(yaml, &options))
}

// ============================================================================
// DOCX API
// ============================================================================

/// Renders lesson-plan YAML to a Word document.
///
/// Resolves to `{docx_base64, success, error}`. The promise never rejects.
///
/// # Example (JavaScript)
///
/// ```javascript
/// const { docx_base64, success } = await generate_lesson_plan_docx(yaml);
/// if (success) {
///   const bytes = Uint8Array.from(atob(docx_base64), (c) => c.charCodeAt(0));
///   saveAs(new Blob([bytes]), '学習指導案.docx');
/// }
/// ```
#[wasm_bindgen]
pub fn generate_lesson_plan_docx(yaml: &str) -> js_sys::Promise {
    let response = kyozai_render::generate_lesson_plan_docx(yaml);
    js_sys::Promise::resolve(&to_js(&response))
}

// ============================================================================
// Utilities
// ============================================================================

/// Always `true`; callers render only after this succeeds.
#[wasm_bindgen]
pub fn check_api_health() -> bool {
    kyozai_render::check_api_health()
}

/// Escapes a string for a double-quoted YAML scalar.
#[wasm_bindgen]
pub fn escape_text_field(value: &str) -> String {
    kyozai_core::escape_text_field(value)
}

/// Crate version.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
