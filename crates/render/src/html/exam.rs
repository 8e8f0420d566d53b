//! Exam → print HTML: cover, problems, answer key.

use super::{HtmlBuffer, MathJax, PAGE_BREAK_DIV, Page, render_page};
use crate::layout::NoticePreset;
use crate::options::RenderOptions;
use kyozai_core::{ExamDocument, MajorQuestion, Result};

const DEFAULT_TITLE: &str = "定期考査";
const MISSING_ANSWER: &str = "（解答なし）";

const MACROS: &str = r#"
                    leqq: '\\text{≦}',
                    geqq: '\\text{≧}',
                    frac: ['\\dfrac{#1}{#2}', 2],
                    int: '\\displaystyle\\intop',
                    lim: '\\displaystyle\\mathop{\\rm lim}'"#;

const STYLE: &str = r#"
        body { font-family: 'Hiragino Mincho ProN', 'Yu Mincho', serif; line-height: 1.6; max-width: 210mm; margin: 0 auto; padding: 20px; }
        .cover-wrapper { min-height: 270mm; display: flex; align-items: flex-start; justify-content: center; padding-top: 15mm; }
        .cover-page { width: 100%; display: flex; flex-direction: column; align-items: center; justify-content: center; text-align: center; border: 3px solid #000; padding: 40px; box-sizing: border-box; }
        .exam-title { font-size: 28pt; font-weight: bold; margin: 20px 0; }
        .exam-subtitle { font-size: 18pt; margin-bottom: 40px; }
        .exam-info { width: 100%; margin: 30px 0; text-align: center; }
        .exam-info p { margin: 10px 0; font-size: 14pt; }
        .exam-notes { border: 2px solid #000; padding: 20px; width: 80%; margin: 30px auto; text-align: left; background-color: #fafafa; }
        .exam-notes h3 { margin-top: 0; text-align: center; text-decoration: underline; }
        .exam-notes ul { margin: 0; padding-left: 20px; }
        .exam-notes .notes-warning { text-align: center; margin-top: 10px; font-weight: bold; }
        .student-box { width: 90%; margin: 60px auto 0; border: 2px solid #000; padding: 20px; }
        .input-row { display: flex; justify-content: space-between; align-items: baseline; font-size: 14pt; }
        .input-group { display: flex; gap: 20px; }
        .input-group.name { flex-grow: 1; justify-content: flex-end; }
        .input-label { font-weight: bold; }
        .input-line { border-bottom: 1px solid #000; min-width: 300px; display: inline-block; }
        .problem-page { padding: 10px; }
        .problem-header { border-bottom: 2px solid #000; margin-bottom: 25px; padding-bottom: 10px; display: flex; justify-content: space-between; align-items: baseline; }
        .problem-title { font-size: 16pt; font-weight: bold; }
        .problem-type { font-size: 12pt; border: 1px solid #000; padding: 2px 10px; border-radius: 4px; margin-left: 10px; }
        .problem-score { font-weight: bold; }
        .problem-content { font-size: 11pt; }
        .problem-item { margin-bottom: 30px; }
        .problem-item-num { float: left; font-weight: bold; margin-right: 10px; font-size: 12pt; }
        .problem-item-body { overflow: hidden; }
        .answer-page h2 { border-bottom: 3px double #000; padding-bottom: 10px; }
        .answer-item { margin-bottom: 20px; border-bottom: 1px dashed #ccc; padding-bottom: 10px; }
        .answer-correct { font-weight: bold; font-size: 12pt; color: #d00; }
        .answer-explanation { margin-top: 10px; font-size: 10pt; color: #555; background: #f9f9f9; padding: 10px; border-radius: 5px; }"#;

/// Renders an exam as a complete HTML document.
pub fn render_exam(exam: &ExamDocument, options: &RenderOptions) -> Result<String> {
    let mut buf = HtmlBuffer::new(options);
    render_cover(&mut buf, exam);
    buf.push_raw("\n");
    buf.push_raw(PAGE_BREAK_DIV);
    buf.push_raw("\n");
    render_problems(&mut buf, exam)?;
    buf.push_raw("\n");
    buf.push_raw(PAGE_BREAK_DIV);
    buf.push_raw("\n");
    render_answers(&mut buf, exam)?;

    let page = Page {
        title: exam.title.as_deref().unwrap_or(DEFAULT_TITLE),
        margin: "15mm",
        mathjax: MathJax::Tex { macros: MACROS },
        style: STYLE,
    };
    Ok(render_page(&page, &buf.finish(), options))
}

fn render_cover(buf: &mut HtmlBuffer, exam: &ExamDocument) {
    buf.push_raw("<div class=\"cover-wrapper\"><div class=\"cover-page\">\n");
    buf.push_raw("<h1 class=\"exam-title\">");
    buf.push_text(exam.title.as_deref().unwrap_or_default());
    buf.push_raw("</h1>\n");
    if let Some(subtitle) = &exam.subtitle {
        buf.push_raw("<div class=\"exam-subtitle\">");
        buf.push_text(subtitle);
        buf.push_raw("</div>\n");
    }

    buf.push_raw("<div class=\"exam-info\">\n");
    info_row(buf, "学校名", exam.institution.as_deref().unwrap_or_default());
    info_row(buf, "科目", exam.subject.as_deref().unwrap_or_default());
    if let Some(minutes) = exam.duration_minutes {
        info_row(buf, "試験時間", &format!("{minutes}分"));
    }
    if let Some(points) = exam.total_points {
        info_row(buf, "配点", &format!("{points}点"));
    }
    buf.push_raw("</div>\n");

    if !exam.notices.is_empty() {
        let preset = NoticePreset::for_count(exam.notices.len());
        buf.push_raw("<div class=\"exam-notes notices-");
        buf.push_raw(preset.name());
        buf.push_raw("\" style=\"");
        buf.push_raw(preset.box_style());
        buf.push_raw("\">\n<h3>注意事項</h3>\n<ul>");
        for notice in &exam.notices {
            buf.push_raw("<li style=\"");
            buf.push_raw(preset.item_style());
            buf.push_raw("\">");
            buf.push_text(notice);
            buf.push_raw("</li>");
        }
        buf.push_raw("</ul>\n<div class=\"notes-warning\">※ 試験終了までこの表紙を開かないこと</div>\n</div>\n");
    }

    buf.push_raw(
        "<div class=\"student-box\"><div class=\"input-row\">\
         <div class=\"input-group\"><span>　　年</span><span>　　組</span><span>　　番</span></div>\
         <div class=\"input-group name\"><span class=\"input-label\">氏名</span><span class=\"input-line\"></span></div>\
         </div></div>\n",
    );
    buf.push_raw("</div></div>");
}

fn info_row(buf: &mut HtmlBuffer, label: &str, value: &str) {
    buf.push_raw("<p><strong>");
    buf.push_text(label);
    buf.push_raw("：</strong> ");
    buf.push_text(value);
    buf.push_raw("</p>\n");
}

fn question_heading(buf: &mut HtmlBuffer, question: &MajorQuestion) {
    buf.push_text(&question.number);
    buf.push_raw(". ");
    buf.push_text(&question.title);
}

fn render_problems(buf: &mut HtmlBuffer, exam: &ExamDocument) -> Result<()> {
    for question in &exam.questions {
        buf.push_raw("<div class=\"problem-page\"");
        buf.push_page_break_style(question.page_break);
        buf.push_raw(">\n<div class=\"problem-header\"><div><span class=\"problem-title\">");
        question_heading(buf, question);
        buf.push_raw("</span>");
        if let Some(badge) = question.badge() {
            buf.push_raw("<span class=\"problem-type\">");
            buf.push_text(badge);
            buf.push_raw("</span>");
        }
        buf.push_raw("</div>");
        if let Some(points) = question.display_points() {
            buf.push_raw(&format!(
                "<span class=\"problem-score\">（配点 {points}点）</span>"
            ));
        }
        buf.push_raw("</div>\n<div class=\"problem-content\">\n");

        for sub in &question.sub_questions {
            buf.push_raw("<div class=\"problem-item\"");
            buf.push_page_break_style(sub.page_break);
            buf.push_raw("><div class=\"problem-item-num\">");
            buf.push_text(&sub.label);
            buf.push_raw("</div><div class=\"problem-item-body\">");
            buf.push_markdown(&sub.body)?;
            buf.push_raw("</div></div>\n");
        }
        buf.push_raw("</div>\n</div>\n");
    }
    Ok(())
}

fn render_answers(buf: &mut HtmlBuffer, exam: &ExamDocument) -> Result<()> {
    buf.push_raw("<div class=\"answer-page\">\n<h2>解答・解説</h2>\n");
    for question in &exam.questions {
        buf.push_raw("<h3>");
        question_heading(buf, question);
        buf.push_raw("</h3>\n");

        for sub in &question.sub_questions {
            buf.push_raw("<div class=\"answer-item\"><div><strong>");
            buf.push_text(&sub.label);
            buf.push_raw("</strong> <span class=\"answer-correct\">");
            match &sub.answer {
                Some(answer) => buf.push_inline_markdown(answer)?,
                None => buf.push_raw(MISSING_ANSWER),
            }
            buf.push_raw("</span></div>");
            if let Some(explanation) = &sub.explanation {
                buf.push_raw("<div class=\"answer-explanation\"><strong>【解説】</strong><br>");
                buf.push_markdown(explanation)?;
                buf.push_raw("</div>");
            }
            buf.push_raw("</div>\n");
        }
    }
    buf.push_raw("</div>");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> String {
        let exam = ExamDocument::parse(src).unwrap();
        render_exam(&exam, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn cover_then_problems_then_answers() {
        let html = render("タイトル: 期末\n大問:\n  - 小問: [問い]\n");
        let cover = html.find("class=\"cover-page\"").unwrap();
        let problems = html.find("class=\"problem-page\"").unwrap();
        let answers = html.find("class=\"answer-page\"").unwrap();
        assert!(cover < problems && problems < answers);
        assert_eq!(html.matches(PAGE_BREAK_DIV).count(), 2);
    }

    #[test]
    fn default_title_in_head_only() {
        let html = render("");
        assert!(html.contains("<title>定期考査</title>"));
        assert!(html.contains("<h1 class=\"exam-title\"></h1>"));
    }

    #[test]
    fn notices_box_omitted_without_notices() {
        assert!(!render("").contains("注意事項"));
        assert!(render("注意事項: [静粛に]\n").contains("<h3>注意事項</h3>"));
    }

    #[test]
    fn page_break_on_question_and_sub_question() {
        let html = render(
            "大問:\n  - 改ページ: true\n    小問:\n      - 本文: a\n      - 本文: b\n        改ページ: true\n",
        );
        assert_eq!(html.matches("break-before: page;\"").count(), 2);
    }

    #[test]
    fn missing_answer_placeholder() {
        let html = render("大問:\n  - 小問:\n      - 本文: q\n      - 本文: r\n        解答: '42'\n");
        assert_eq!(html.matches("（解答なし）").count(), 1);
        assert!(html.contains("<span class=\"answer-correct\">42</span>"));
        assert!(!html.contains("answer-explanation\">"));
    }
}
