//! Lesson plan → print HTML.

use super::{HtmlBuffer, MathJax, Page, render_page};
use crate::options::RenderOptions;
use kyozai_core::lesson_plan::FLOW_COLUMNS;
use kyozai_core::{LessonPlan, LessonSection, Phase, Result};

const STYLE: &str = r#"
        body { font-family: 'Hiragino Mincho ProN', 'Yu Mincho', serif; line-height: 1.6; max-width: 210mm; margin: 0 auto; padding: 20px; color: #333; }
        h1 { text-align: center; font-size: 22pt; margin-bottom: 30px; border-bottom: 3px double #000; padding-bottom: 10px; }
        h2 { font-size: 14pt; margin-top: 25px; border-left: 4px solid #3b82f6; background: #f0f8ff; padding: 8px 10px; }
        h3 { font-size: 12pt; margin-top: 15px; }
        .header-table { width: 100%; border-collapse: collapse; margin-bottom: 20px; }
        .header-table td, .header-table th { border: 1px solid #333; padding: 8px 12px; }
        .header-table th { background: #f5f5f5; width: 100px; text-align: left; }
        .section { margin: 20px 0; }
        .section ul { margin: 10px 0; padding-left: 25px; }
        .section li { margin: 5px 0; }
        .flow-table { width: 100%; border-collapse: collapse; margin: 15px 0; }
        .flow-table th, .flow-table td { border: 1px solid #333; padding: 10px; vertical-align: top; }
        .flow-table th { background: #e8e8e8; text-align: center; }
        .flow-table td:first-child { width: 80px; text-align: center; font-weight: bold; }
        .activity { margin: 5px 0; }
        .activity-content { color: #000; }
        .activity-action { color: #555; margin-left: 15px; }
        .goals { background: #fffde7; padding: 15px; border-radius: 5px; border-left: 4px solid #ffc107; }
        .evaluation { background: #e8f5e9; padding: 15px; border-radius: 5px; border-left: 4px solid #4caf50; }
        .board-plan { white-space: pre-wrap; font-family: inherit; border: 1px solid #333; padding: 15px; }"#;

/// Renders a lesson plan as a complete HTML document.
pub fn render_lesson_plan(plan: &LessonPlan, options: &RenderOptions) -> Result<String> {
    let title = plan.document_title();
    let mut buf = HtmlBuffer::new(options);

    buf.push_raw("<h1>");
    buf.push_text(&title);
    buf.push_raw("</h1>\n<table class=\"header-table\">\n");
    for (label, value) in plan.metadata_rows() {
        buf.push_raw("<tr><th>");
        buf.push_text(label);
        buf.push_raw("</th><td>");
        buf.push_text(value);
        buf.push_raw("</td></tr>\n");
    }
    buf.push_raw("</table>\n");

    for planned in plan.sections() {
        buf.push_raw("<h2>");
        buf.push_text(&planned.heading);
        buf.push_raw("</h2>\n");
        render_section(&mut buf, plan, planned.section);
        buf.push_raw("\n");
    }

    let page = Page {
        title: &title,
        margin: "20mm",
        mathjax: MathJax::Bundle,
        style: STYLE,
    };
    Ok(render_page(&page, &buf.finish(), options))
}

fn render_section(buf: &mut HtmlBuffer, plan: &LessonPlan, section: LessonSection) {
    match section {
        LessonSection::Unit => {
            buf.push_raw("<div class=\"section\"><strong>");
            buf.push_text(&plan.unit);
            buf.push_raw("</strong>");
            if let Some(textbook) = &plan.textbook {
                buf.push_raw("（");
                buf.push_text(textbook);
                buf.push_raw("）");
            }
            buf.push_raw("</div>");
        }
        LessonSection::StudentProfile => list_section(buf, "section", &plan.student_profile),
        LessonSection::Goals => list_section(buf, "section goals", &plan.goals),
        LessonSection::Materials => {
            buf.push_raw("<div class=\"section materials\">");
            for (label, items) in [
                ("【教師】", &plan.materials.teacher),
                ("【生徒】", &plan.materials.student),
            ] {
                if items.is_empty() {
                    continue;
                }
                buf.push_raw("<h3>");
                buf.push_text(label);
                buf.push_raw("</h3>");
                buf.push_text_list(items);
            }
            buf.push_raw("</div>");
        }
        LessonSection::Flow => render_flow(buf, &plan.flow),
        LessonSection::Evaluation => {
            buf.push_raw("<div class=\"section evaluation\"><ul>");
            for criterion in &plan.evaluation {
                buf.push_raw("<li>");
                if let Some(label) = &criterion.label {
                    buf.push_raw("<strong>");
                    buf.push_text(label);
                    buf.push_raw("：</strong>");
                }
                buf.push_text(&criterion.text);
                buf.push_raw("</li>");
            }
            buf.push_raw("</ul></div>");
        }
        LessonSection::BoardPlan => {
            buf.push_raw("<pre class=\"board-plan\">");
            buf.push_text(plan.board_plan.as_deref().unwrap_or_default());
            buf.push_raw("</pre>");
        }
        LessonSection::DigitalUsage => list_section(buf, "section", &plan.digital_usage),
        LessonSection::Considerations => list_section(buf, "section", &plan.considerations),
    }
}

fn list_section(buf: &mut HtmlBuffer, class: &str, items: &[String]) {
    buf.push_raw("<div class=\"");
    buf.push_raw(class);
    buf.push_raw("\">");
    buf.push_text_list(items);
    buf.push_raw("</div>");
}

fn render_flow(buf: &mut HtmlBuffer, flow: &[Phase]) {
    buf.push_raw("<table class=\"flow-table\">\n<tr>");
    for column in FLOW_COLUMNS {
        buf.push_raw("<th>");
        buf.push_text(column);
        buf.push_raw("</th>");
    }
    buf.push_raw("</tr>\n");

    for phase in flow {
        buf.push_raw("<tr><td>");
        buf.push_text(&phase.name);
        if let Some(duration) = phase.duration_label() {
            buf.push_raw("<br>");
            buf.push_text(&duration);
        }
        buf.push_raw("</td><td>");
        for content in &phase.contents {
            buf.push_raw("<div class=\"activity\"><span class=\"activity-content\">○ ");
            buf.push_text(content);
            buf.push_raw("</span></div>");
        }
        for activity in &phase.activities {
            buf.push_raw("<div class=\"activity\"><span class=\"activity-action\">・ ");
            buf.push_text(activity);
            buf.push_raw("</span></div>");
        }
        buf.push_raw("</td><td>");
        for (index, note) in phase.notes.iter().enumerate() {
            if index > 0 {
                buf.push_raw("<br>");
            }
            buf.push_raw("・");
            buf.push_text(note);
        }
        buf.push_raw("</td></tr>\n");
    }
    buf.push_raw("</table>");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(src: &str) -> String {
        let plan = LessonPlan::parse(src).unwrap();
        render_lesson_plan(&plan, &RenderOptions::default()).unwrap()
    }

    #[test]
    fn title_and_metadata_table() {
        let html = render("教科: 数学\n授業者: 山田\n");
        assert!(html.contains("<title>数学科 学習指導案</title>"));
        assert!(html.contains("<h1>数学科 学習指導案</h1>"));
        assert!(html.contains("<tr><th>授業者</th><td>山田</td></tr>"));
    }

    #[test]
    fn flow_rows_in_document_order() {
        let html = render("展開:\n  まとめ: {時間: 5}\n  導入: {時間: 10, 留意点: [a, b]}\n");
        let first = html.find("<tr><td>まとめ<br>(5分)</td>").unwrap();
        let second = html.find("<tr><td>導入<br>(10分)</td>").unwrap();
        assert!(first < second);
        assert!(html.contains("<td>・a<br>・b</td>"));
    }

    #[test]
    fn phase_without_time_has_no_annotation() {
        let html = render("展開:\n  導入:\n    学習内容: [復習]\n");
        assert!(html.contains("<tr><td>導入</td>"));
        assert!(html.contains("○ 復習"));
    }

    #[test]
    fn labeled_and_plain_evaluation() {
        let html = render("評価:\n  知識: 理解している\n");
        assert!(html.contains("<li><strong>知識：</strong>理解している</li>"));
        let html = render("評価:\n  - 理解している\n");
        assert!(html.contains("<li>理解している</li>"));
    }

    #[test]
    fn board_plan_is_preformatted() {
        let html = render("板書計画: \"左 <式>\\n右\"\n");
        assert!(html.contains("<pre class=\"board-plan\">左 &lt;式&gt;\n右</pre>"));
    }

    #[test]
    fn textbook_suffix_only_when_present() {
        assert!(render("単元名: 関数\n").contains("<strong>関数</strong></div>"));
        assert!(render("単元名: 関数\n使用教科書: 数I\n").contains("<strong>関数</strong>（数I）"));
    }
}
