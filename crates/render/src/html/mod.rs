//! Print-ready HTML renderers.
//!
//! Each renderer writes into an [`HtmlBuffer`] and wraps the body in a full
//! page via [`render_page`]. Math spans pass through untouched for MathJax.

mod exam;
mod lesson_plan;
mod worksheet;

pub use exam::render_exam;
pub use lesson_plan::render_lesson_plan;
pub use worksheet::render_worksheet;

use crate::options::RenderOptions;
use kyozai_core::{
    MarkdownOptions, Result, decode_literal_newlines, escape_html, markdown_to_html,
    markdown_to_inline_html,
};

/// Style attribute that forces a page break before its element.
pub(crate) const PAGE_BREAK_BEFORE: &str =
    r#" style="page-break-before: always; break-before: page;""#;

/// Explicit break between the major parts of a document.
pub(crate) const PAGE_BREAK_DIV: &str = r#"<div class="page-break"></div>"#;

const MATHJAX_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-chtml.js";
const MATHJAX_MML_SRC: &str = "https://cdn.jsdelivr.net/npm/mathjax@3/es5/tex-mml-chtml.js";

const PRINT_CSS: &str = r#"
        @media print {
            .page-break {
                display: block;
                height: 0;
                page-break-before: always;
                break-before: page;
                clear: both;
            }
            body {
                width: 100% !important;
                max-width: none !important;
                margin: 0 !important;
                padding: 0 !important;
            }
        }"#;

const PREVIEW_CSS: &str = r#"
        @media screen {
            .page-break, [style*="break-before: page"] {
                display: block;
                border-top: 4px dashed #ddd !important;
                margin-top: 40px !important;
                padding-top: 40px !important;
                position: relative;
            }
            .page-break::before, [style*="break-before: page"]::before {
                content: "--- 改ページ ---";
                display: block;
                position: absolute;
                top: -24px;
                left: 50%;
                transform: translateX(-50%);
                color: #aaa;
                font-size: 12px;
                font-weight: bold;
                background: #fff;
                padding: 0 10px;
            }
        }"#;

/// How a page loads MathJax.
#[derive(Clone, Copy)]
pub(crate) enum MathJax {
    /// TeX input with `$`/`$$` delimiters and the given macro table.
    Tex { macros: &'static str },
    /// The combined TeX/MathML bundle with its default configuration.
    Bundle,
}

/// Per-track page settings.
pub(crate) struct Page<'a> {
    pub title: &'a str,
    pub margin: &'static str,
    pub mathjax: MathJax,
    pub style: &'static str,
}

/// Wraps `body` in a complete HTML document.
pub(crate) fn render_page(page: &Page<'_>, body: &str, options: &RenderOptions) -> String {
    let mut out = String::with_capacity(body.len() + 4096);
    out.push_str("<!DOCTYPE html>\n<html lang=\"ja\">\n<head>\n");
    out.push_str("    <meta charset=\"UTF-8\">\n");
    out.push_str(
        "    <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n",
    );
    out.push_str("    <title>");
    out.push_str(&escape_html(page.title));
    out.push_str("</title>\n");

    if options.include_mathjax {
        push_mathjax(&mut out, page.mathjax);
    }

    out.push_str("    <style>");
    out.push_str(PRINT_CSS);
    out.push_str("\n        @page { size: A4; margin: ");
    out.push_str(page.margin);
    out.push_str("; }");
    if options.page_break_preview {
        out.push_str(PREVIEW_CSS);
    }
    out.push_str(page.style);
    out.push_str("\n    </style>\n</head>\n<body>\n");
    out.push_str(body);
    out.push_str("\n</body>\n</html>\n");
    out
}

fn push_mathjax(out: &mut String, mathjax: MathJax) {
    match mathjax {
        MathJax::Tex { macros } => {
            out.push_str(
                r#"    <script>
        MathJax = {
            tex: {
                inlineMath: [['$', '$']],
                displayMath: [['$$', '$$']],
                processEscapes: true,
                packages: {'[+]': ['ams']},
                macros: {"#,
            );
            out.push_str(macros);
            out.push_str(
                r#"
                }
            },
            loader: {load: ['[tex]/ams']},
            chtml: {
                scale: 1.0,
                matchFontHeight: true
            }
        };
    </script>
"#,
            );
            out.push_str("    <script id=\"MathJax-script\" async src=\"");
            out.push_str(MATHJAX_SRC);
            out.push_str("\"></script>\n");
        }
        MathJax::Bundle => {
            out.push_str("    <script id=\"MathJax-script\" async src=\"");
            out.push_str(MATHJAX_MML_SRC);
            out.push_str("\"></script>\n");
        }
    }
}

/// Output buffer for one page body.
pub(crate) struct HtmlBuffer {
    out: String,
    markdown: MarkdownOptions,
}

impl HtmlBuffer {
    pub fn new(options: &RenderOptions) -> Self {
        Self {
            out: String::with_capacity(8192),
            markdown: options.markdown(),
        }
    }

    pub fn push_raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    /// Escaped text node content.
    pub fn push_text(&mut self, s: &str) {
        self.out.push_str(&escape_html(s));
    }

    /// Page-break style attribute when `enabled`.
    pub fn push_page_break_style(&mut self, enabled: bool) {
        if enabled {
            self.out.push_str(PAGE_BREAK_BEFORE);
        }
    }

    /// Body-like text: literal `\n` decoded, then markdown-lite.
    pub fn push_markdown(&mut self, text: &str) -> Result<()> {
        let decoded = decode_literal_newlines(text);
        let html = markdown_to_html(&decoded, &self.markdown)?;
        self.out.push_str(&html);
        Ok(())
    }

    /// Like [`HtmlBuffer::push_markdown`] without the single-paragraph wrapper.
    pub fn push_inline_markdown(&mut self, text: &str) -> Result<()> {
        let decoded = decode_literal_newlines(text);
        let html = markdown_to_inline_html(&decoded, &self.markdown)?;
        self.out.push_str(&html);
        Ok(())
    }

    /// `<ul><li>…</li></ul>` of escaped items.
    pub fn push_text_list(&mut self, items: &[String]) {
        self.push_raw("<ul>");
        for item in items {
            self.push_raw("<li>");
            self.push_text(item);
            self.push_raw("</li>");
        }
        self.push_raw("</ul>");
    }

    pub fn finish(self) -> String {
        self.out
    }
}
