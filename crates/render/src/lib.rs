#![deny(missing_docs)]
//! kyozai renderers: print-ready HTML for exams, worksheets, and lesson
//! plans, plus a document tree and `.docx` packaging for lesson plans.

/// Result-shaped entry points.
pub mod api;
/// `.docx` packaging.
pub mod docx;
/// HTML renderers.
pub mod html;
/// Content-driven layout presets.
pub mod layout;
/// Render options.
pub mod options;
/// Document tree.
pub mod tree;

pub use api::{
    DocxResponse, GenerateResponse, check_api_health, generate_exam_html,
    generate_exam_html_with_options, generate_lesson_plan_docx, generate_lesson_plan_html,
    generate_lesson_plan_html_with_options, generate_worksheet_html,
    generate_worksheet_html_with_options, lesson_plan_docx,
};
pub use docx::{DocxError, write_docx};
pub use html::{render_exam, render_lesson_plan, render_worksheet};
pub use layout::NoticePreset;
pub use options::RenderOptions;
pub use tree::{DocumentTree, lesson_plan_tree};
