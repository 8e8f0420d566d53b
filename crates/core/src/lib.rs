#![deny(missing_docs)]
//! kyozai core: document models, YAML normalization, and text utilities.
//!
//! Each track (exam, worksheet, lesson plan) decodes YAML text into a fully
//! defaulted model. Renderers in `kyozai-render` consume only these models.

/// YAML document loading.
pub mod document;
/// Core error and diagnostic types.
pub mod error;
/// Exam model and normalizer.
pub mod exam;
/// Total field accessors over YAML mappings.
pub mod fields;
/// Lesson-plan model and normalizer.
pub mod lesson_plan;
/// Markdown-lite to HTML conversion.
pub mod markdown;
/// YAML write-back for exams and worksheets.
pub mod source;
/// Escaping and newline helpers.
pub mod text;
/// Worksheet model and normalizer.
pub mod worksheet;

pub use document::load_document;
pub use error::{ErrorKind, KyozaiError, Result, SourceLocation};
pub use exam::{ExamDocument, MajorQuestion, SubQuestion};
pub use fields::Fields;
pub use lesson_plan::{Criterion, LessonPlan, LessonSection, Materials, Phase, PlannedSection};
pub use markdown::{MarkdownOptions, markdown_to_html, markdown_to_inline_html};
pub use text::{decode_literal_newlines, escape_html, escape_text_field, full_width_digits};
pub use worksheet::{Problem, SectionHeader, WorksheetDocument, WorksheetItem};
