//! Result-shaped entry points.
//!
//! Every function here takes document text and returns a response value;
//! none of them returns an error or lets a panic escape. Failures become
//! `success: false` with the error message.

use crate::docx::write_docx;
use crate::html::{render_exam, render_lesson_plan, render_worksheet};
use crate::options::RenderOptions;
use crate::tree::lesson_plan_tree;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use kyozai_core::{ExamDocument, KyozaiError, LessonPlan, Result, WorksheetDocument};
use serde::Serialize;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

/// Outcome of an HTML render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerateResponse {
    /// Rendered document; empty on failure.
    pub html: String,
    /// Whether rendering succeeded.
    pub success: bool,
    /// Error message, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl GenerateResponse {
    fn from_result(result: Result<String>) -> Self {
        match result {
            Ok(html) => Self {
                html,
                success: true,
                error: None,
            },
            Err(err) => Self {
                html: String::new(),
                success: false,
                error: Some(err.to_string()),
            },
        }
    }
}

/// Outcome of a DOCX render.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocxResponse {
    /// The package, base64-encoded; empty on failure.
    pub docx_base64: String,
    /// Whether rendering succeeded.
    pub success: bool,
    /// Error message, present only on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The package bytes.
    #[serde(skip)]
    pub docx: Vec<u8>,
}

impl DocxResponse {
    fn from_result(result: Result<Vec<u8>>) -> Self {
        match result {
            Ok(docx) => Self {
                docx_base64: STANDARD.encode(&docx),
                success: true,
                error: None,
                docx,
            },
            Err(err) => Self {
                docx_base64: String::new(),
                success: false,
                error: Some(err.to_string()),
                docx: Vec::new(),
            },
        }
    }
}

/// Runs `f`, turning a panic into [`KyozaiError::Panic`].
fn contained<T>(what: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    let result = match catch_unwind(AssertUnwindSafe(f)) {
        Ok(result) => result,
        Err(payload) => Err(KyozaiError::Panic(panic_message(payload.as_ref()))),
    };
    if let Err(err) = &result {
        log::debug!("{what} failed ({:?}): {err}", err.kind());
    }
    result
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Renders exam YAML to HTML with default options.
pub fn generate_exam_html(yaml: &str) -> GenerateResponse {
    generate_exam_html_with_options(yaml, &RenderOptions::default())
}

/// Renders exam YAML to HTML.
pub fn generate_exam_html_with_options(yaml: &str, options: &RenderOptions) -> GenerateResponse {
    GenerateResponse::from_result(contained("exam", || {
        render_exam(&ExamDocument::parse(yaml)?, options)
    }))
}

/// Renders worksheet YAML to HTML with default options.
pub fn generate_worksheet_html(yaml: &str) -> GenerateResponse {
    generate_worksheet_html_with_options(yaml, &RenderOptions::default())
}

/// Renders worksheet YAML to HTML.
pub fn generate_worksheet_html_with_options(
    yaml: &str,
    options: &RenderOptions,
) -> GenerateResponse {
    GenerateResponse::from_result(contained("worksheet", || {
        render_worksheet(&WorksheetDocument::parse(yaml)?, options)
    }))
}

/// Renders lesson-plan YAML to HTML with default options.
pub fn generate_lesson_plan_html(yaml: &str) -> GenerateResponse {
    generate_lesson_plan_html_with_options(yaml, &RenderOptions::default())
}

/// Renders lesson-plan YAML to HTML.
pub fn generate_lesson_plan_html_with_options(
    yaml: &str,
    options: &RenderOptions,
) -> GenerateResponse {
    GenerateResponse::from_result(contained("lesson plan", || {
        render_lesson_plan(&LessonPlan::parse(yaml)?, options)
    }))
}

/// Renders lesson-plan YAML to `.docx` bytes.
pub fn lesson_plan_docx(yaml: &str) -> Result<Vec<u8>> {
    let plan = LessonPlan::parse(yaml)?;
    let tree = lesson_plan_tree(&plan);
    Ok(write_docx(&tree)?)
}

/// Renders lesson-plan YAML to a `.docx` package.
pub fn generate_lesson_plan_docx(yaml: &str) -> DocxResponse {
    DocxResponse::from_result(contained("lesson plan docx", || lesson_plan_docx(yaml)))
}

/// Reports whether rendering is available. Always `true`.
pub fn check_api_health() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_has_no_error() {
        let response = generate_exam_html("タイトル: t\n");
        assert!(response.success);
        assert!(response.error.is_none());
        assert!(!response.html.is_empty());
    }

    #[test]
    fn parse_error_is_contained() {
        let response = generate_worksheet_html("問題: [unterminated\n");
        assert!(!response.success);
        assert!(response.html.is_empty());
        let error = response.error.unwrap();
        assert!(!error.is_empty());
        assert!(!error.contains('\n'));
    }

    #[test]
    fn panics_are_contained() {
        let result: Result<()> = contained("test", || panic!("boom"));
        match result {
            Err(KyozaiError::Panic(message)) => assert_eq!(message, "boom"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn docx_response_carries_base64() {
        let response = generate_lesson_plan_docx("教科: 数学\n");
        assert!(response.success, "{:?}", response.error);
        assert_eq!(STANDARD.decode(&response.docx_base64).unwrap(), response.docx);
    }

    #[test]
    fn error_field_omitted_when_serialized_on_success() {
        let json = serde_json::to_value(generate_lesson_plan_html("")).unwrap();
        assert_eq!(json["success"], true);
        assert!(json.get("error").is_none());
        let json = serde_json::to_value(generate_lesson_plan_docx("- a\n")).unwrap();
        assert_eq!(json["success"], false);
        assert!(json.get("docx").is_none());
        insta::assert_snapshot!(
            json["error"].as_str().unwrap(),
            @"Document root must be a mapping, found sequence"
        );
    }

    #[test]
    fn health() {
        assert!(check_api_health());
    }
}
