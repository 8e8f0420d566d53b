//! Worksheet → print HTML.

use super::{HtmlBuffer, MathJax, PAGE_BREAK_DIV, Page, render_page};
use crate::layout::answer_space_height;
use crate::options::RenderOptions;
use kyozai_core::{Problem, Result, WorksheetDocument, WorksheetItem};

const DEFAULT_TITLE: &str = "プリント";

const MACROS: &str = r#"
                    leqq: '\\leqslant',
                    geqq: '\\geqslant',
                    lneqq: '\\lneqq',
                    gneqq: '\\gneqq'"#;

const STYLE: &str = r#"
        body { font-family: 'Hiragino Mincho ProN', 'Yu Mincho', serif; line-height: 1.8; max-width: 210mm; margin: 0 auto; padding: 20px; color: #333; }
        .header { display: flex; justify-content: flex-end; margin-bottom: 20px; font-size: 12pt; }
        .header-field { margin-left: 20px; }
        .header-field .label { margin-right: 5px; }
        .header-field .underline { display: inline-block; border-bottom: 1px solid #333; min-width: 80px; }
        .header-field.name .underline { min-width: 200px; }
        .title { text-align: center; font-size: 20pt; font-weight: bold; margin: 30px 0 10px; }
        .subtitle { text-align: center; font-size: 14pt; color: #555; margin-bottom: 30px; }
        .section-header { font-size: 14pt; font-weight: bold; text-align: center; margin: 30px 0 20px; padding: 10px; background: #f5f5f5; border-radius: 5px; }
        .problem { margin: 25px 0; }
        .problem-header { display: flex; align-items: baseline; margin-bottom: 10px; }
        .problem-number { font-weight: bold; font-size: 14pt; margin-right: 15px; }
        .problem-text { font-size: 11pt; flex: 1; }
        .problem-score { font-size: 10pt; color: #666; margin-left: 10px; }
        .sub-problems { margin-left: 30px; margin-top: 10px; }
        .sub-problem { margin: 8px 0; }
        .answer-space { margin: 15px 0; }
        .answer-page h2 { text-align: center; margin-bottom: 30px; }
        .answer-item { margin: 15px 0; padding: 10px; background: #fafafa; border-radius: 5px; }
        .answer-correct { font-weight: bold; color: #d00; margin-left: 0.5em; }
        .answer-explanation { margin-top: 10px; font-size: 10pt; color: #555; padding: 10px; background: #fff; border-left: 3px solid #3b82f6; }"#;

const STUDENT_HEADER: &str = "<div class=\"header\">\
    <span class=\"header-field\"><span class=\"label\">年</span><span class=\"underline\"></span></span>\
    <span class=\"header-field\"><span class=\"label\">組</span><span class=\"underline\"></span></span>\
    <span class=\"header-field\"><span class=\"label\">番</span><span class=\"underline\"></span></span>\
    <span class=\"header-field name\"><span class=\"label\">名前</span><span class=\"underline\"></span></span>\
    </div>\n";

/// Renders a worksheet as a complete HTML document.
pub fn render_worksheet(sheet: &WorksheetDocument, options: &RenderOptions) -> Result<String> {
    let mut buf = HtmlBuffer::new(options);
    buf.push_raw(STUDENT_HEADER);

    buf.push_raw("<h1 class=\"title\">");
    buf.push_text(sheet.title.as_deref().unwrap_or_default());
    buf.push_raw("</h1>\n");
    if let Some(subtitle) = &sheet.subtitle {
        buf.push_raw("<div class=\"subtitle\">〜 ");
        buf.push_text(subtitle);
        buf.push_raw(" 〜</div>\n");
    }

    for item in &sheet.items {
        match item {
            WorksheetItem::Header(header) => {
                buf.push_raw("<div class=\"section-header\"");
                buf.push_page_break_style(header.page_break);
                buf.push_raw(">");
                buf.push_text(&header.text);
                buf.push_raw("</div>\n");
            }
            WorksheetItem::Problem(problem) => render_problem(&mut buf, problem)?,
        }
    }

    if sheet.answer_key {
        buf.push_raw(PAGE_BREAK_DIV);
        buf.push_raw("\n");
        render_answers(&mut buf, sheet)?;
    }

    let page = Page {
        title: sheet.title.as_deref().unwrap_or(DEFAULT_TITLE),
        margin: "20mm",
        mathjax: MathJax::Tex { macros: MACROS },
        style: STYLE,
    };
    Ok(render_page(&page, &buf.finish(), options))
}

fn render_problem(buf: &mut HtmlBuffer, problem: &Problem) -> Result<()> {
    buf.push_raw("<div class=\"problem\"");
    buf.push_page_break_style(problem.page_break);
    buf.push_raw(">\n<div class=\"problem-header\"><span class=\"problem-number\">");
    buf.push_text(&problem.number);
    buf.push_raw("</span><div class=\"problem-text\">");
    if !problem.body.is_empty() {
        buf.push_markdown(&problem.body)?;
    }
    buf.push_raw("</div>");
    if let Some(points) = problem.display_points() {
        buf.push_raw(&format!("<span class=\"problem-score\">[{points}点]</span>"));
    }
    buf.push_raw("</div>\n");

    if !problem.sub_items.is_empty() {
        buf.push_raw("<div class=\"sub-problems\">");
        for sub in &problem.sub_items {
            buf.push_raw("<div class=\"sub-problem\">");
            buf.push_inline_markdown(sub)?;
            buf.push_raw("</div>");
        }
        buf.push_raw("</div>\n");
    }

    buf.push_raw(&format!(
        "<div class=\"answer-space\" style=\"height: {}px;\"></div>\n</div>\n",
        answer_space_height(problem.space_lines())
    ));
    Ok(())
}

fn render_answers(buf: &mut HtmlBuffer, sheet: &WorksheetDocument) -> Result<()> {
    buf.push_raw("<div class=\"answer-page\">\n<h2>解答・解説</h2>\n");
    for problem in sheet.problems().filter(|p| p.has_answer_content()) {
        buf.push_raw("<div class=\"answer-item\"><strong>");
        buf.push_text(&problem.number);
        buf.push_raw("</strong>");
        for answer in &problem.answers {
            buf.push_raw(" <span class=\"answer-correct\">答: ");
            buf.push_inline_markdown(answer)?;
            buf.push_raw("</span>");
        }
        if let Some(explanation) = &problem.explanation {
            buf.push_raw("<div class=\"answer-explanation\">【解説】");
            buf.push_markdown(explanation)?;
            buf.push_raw("</div>");
        }
        buf.push_raw("</div>\n");
    }
    buf.push_raw("</div>");
    Ok(())
}
