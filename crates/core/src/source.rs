//! Writes normalized exams and worksheets back to YAML text.
//!
//! The output uses the canonical key names and order, double-quoted scalars
//! escaped with [`escape_text_field`], and omits keys whose value is unset.
//! Parsing the output yields the same model.

use crate::exam::{ExamDocument, MajorQuestion, SubQuestion};
use crate::text::escape_text_field;
use crate::worksheet::{Problem, SectionHeader, WorksheetDocument, WorksheetItem};

struct YamlWriter {
    out: String,
}

impl YamlWriter {
    fn new() -> Self {
        Self { out: String::new() }
    }

    fn line(&mut self, indent: usize, text: &str) {
        for _ in 0..indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn text(&mut self, indent: usize, key: &str, value: &str) {
        self.line(indent, &format!("{key}: \"{}\"", escape_text_field(value)));
    }

    fn opt_text(&mut self, indent: usize, key: &str, value: Option<&str>) {
        if let Some(value) = value {
            self.text(indent, key, value);
        }
    }

    fn opt_number(&mut self, indent: usize, key: &str, value: Option<u32>) {
        if let Some(value) = value {
            self.line(indent, &format!("{key}: {value}"));
        }
    }

    fn opt_bool(&mut self, indent: usize, key: &str, value: Option<bool>) {
        if let Some(value) = value {
            self.line(indent, &format!("{key}: {value}"));
        }
    }

    fn page_break(&mut self, indent: usize, page_break: bool) {
        if page_break {
            self.line(indent, "改ページ: true");
        }
    }

    fn list(&mut self, indent: usize, key: &str, items: &[String]) {
        if items.is_empty() {
            return;
        }
        self.line(indent, &format!("{key}:"));
        for item in items {
            self.line(indent + 1, &format!("- \"{}\"", escape_text_field(item)));
        }
    }

    fn finish(self) -> String {
        self.out
    }
}

impl ExamDocument {
    /// Serializes the exam as YAML.
    pub fn to_source(&self) -> String {
        let mut w = YamlWriter::new();
        w.opt_text(0, "タイトル", self.title.as_deref());
        w.opt_text(0, "科目", self.subject.as_deref());
        w.opt_text(0, "学校名", self.institution.as_deref());
        w.opt_number(0, "試験時間", self.duration_minutes);
        w.opt_number(0, "配点合計", self.total_points);
        w.opt_text(0, "サブタイトル", self.subtitle.as_deref());
        w.list(0, "注意事項", &self.notices);

        if !self.questions.is_empty() {
            w.line(0, "大問:");
            for question in &self.questions {
                write_major(&mut w, question);
            }
        }
        w.finish()
    }
}

fn write_major(w: &mut YamlWriter, question: &MajorQuestion) {
    w.text(1, "- 番号", &question.number);
    w.text(2, "タイトル", &question.title);
    w.opt_bool(2, "必須", question.required);
    w.opt_text(2, "区分", question.category.as_deref());
    w.opt_number(2, "配点", question.points);
    w.page_break(2, question.page_break);
    if !question.sub_questions.is_empty() {
        w.line(2, "小問:");
        for sub in &question.sub_questions {
            write_sub(w, sub);
        }
    }
}

fn write_sub(w: &mut YamlWriter, sub: &SubQuestion) {
    w.text(3, "- 番号", &sub.label);
    w.text(4, "本文", &sub.body);
    w.opt_number(4, "配点", sub.points);
    w.page_break(4, sub.page_break);
    w.opt_text(4, "解答", sub.answer.as_deref());
    w.opt_text(4, "解説", sub.explanation.as_deref());
}

impl WorksheetDocument {
    /// Serializes the worksheet as YAML.
    pub fn to_source(&self) -> String {
        let mut w = YamlWriter::new();
        w.opt_text(0, "タイトル", self.title.as_deref());
        w.opt_text(0, "サブタイトル", self.subtitle.as_deref());
        w.line(0, &format!("解答を作成: {}", self.answer_key));

        if !self.items.is_empty() {
            w.line(0, "問題:");
            for item in &self.items {
                match item {
                    WorksheetItem::Header(header) => write_header(&mut w, header),
                    WorksheetItem::Problem(problem) => write_problem(&mut w, problem),
                }
            }
        }
        w.finish()
    }
}

fn write_header(w: &mut YamlWriter, header: &SectionHeader) {
    w.line(1, "- type: header");
    w.text(2, "text", &header.text);
    w.page_break(2, header.page_break);
}

fn write_problem(w: &mut YamlWriter, problem: &Problem) {
    w.text(1, "- 番号", &problem.number);
    w.text(2, "本文", &problem.body);
    w.opt_number(2, "配点", problem.points);
    w.opt_number(2, "スペース", problem.space);
    w.list(2, "小問", &problem.sub_items);
    match problem.answers.as_slice() {
        [] => {}
        [single] => w.text(2, "解答", single),
        many => w.list(2, "解答", many),
    }
    w.opt_text(2, "解説", problem.explanation.as_deref());
    w.page_break(2, problem.page_break);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exam_round_trip() {
        let exam = ExamDocument::parse(
            r#"
タイトル: 期末 "A" 考査
科目: 数学
試験時間: 50
注意事項: [静かに, "バックスラッシュ \\ を含む"]
大問:
  - 番号: 1
    タイトル: 計算
    必須: false
    区分: 選択
    配点: 30
    改ページ: true
    小問:
      - 本文: "$\\frac{1}{2}$ を計算せよ\\n- 箇条"
        解答: "$\\frac12$"
      - 二つ目
"#,
        )
        .unwrap();
        let source = exam.to_source();
        let reparsed = ExamDocument::parse(&source).unwrap();
        assert_eq!(reparsed, exam, "source:\n{source}");
    }

    #[test]
    fn worksheet_round_trip() {
        let sheet = WorksheetDocument::parse(
            r#"
タイトル: 二次関数
解答を作成: false
問題:
  - type: header
    text: "基本 \"問題\""
    改ページ: true
  - 本文: 因数分解せよ
    配点: 5
    スペース: 3
    小問: [x^2-1, x^2-4]
    解答: [a, b]
    解説: 公式
  - 本文: 一つ
    解答: c
"#,
        )
        .unwrap();
        let source = sheet.to_source();
        assert_eq!(WorksheetDocument::parse(&source).unwrap(), sheet, "{source}");
    }

    #[test]
    fn control_characters_survive_round_trip() {
        let mut sheet = WorksheetDocument::default();
        sheet.title = Some("bell\u{7} del\u{7f} nel\u{85}end".to_string());
        let source = sheet.to_source();
        assert_eq!(WorksheetDocument::parse(&source).unwrap(), sheet, "{source}");
    }

    #[test]
    fn unset_keys_are_omitted() {
        let source = WorksheetDocument::default().to_source();
        assert_eq!(source, "解答を作成: true\n");
    }
}
