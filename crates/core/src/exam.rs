//! Exam documents: cover metadata, major questions, and sub-questions.

use crate::document::{load_document, value_kind};
use crate::error::Result;
use crate::fields::{Fields, scalar_text};
use serde_yaml::Value;

/// Keys consulted for the exam title, in priority order.
pub const TITLE_KEYS: &[&str] = &["タイトル", "試験名"];
/// Keys consulted for a major question's sub-questions, in priority order.
pub const SUB_QUESTION_KEYS: &[&str] = &["小問", "問題"];

/// Category string that suppresses the badge.
pub const NO_DESIGNATION: &str = "記載なし";
/// Badge text for required major questions.
pub const REQUIRED_BADGE: &str = "必答";

/// Default points for a major question.
pub const DEFAULT_MAJOR_POINTS: u32 = 25;
/// Default points for a sub-question.
pub const DEFAULT_SUB_POINTS: u32 = 10;

/// A normalized exam.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExamDocument {
    /// `タイトル` (alias `試験名`)
    pub title: Option<String>,
    /// `サブタイトル`
    pub subtitle: Option<String>,
    /// `科目`
    pub subject: Option<String>,
    /// `学校名`
    pub institution: Option<String>,
    /// `試験時間`, in minutes
    pub duration_minutes: Option<u32>,
    /// `配点合計`
    pub total_points: Option<u32>,
    /// `注意事項`
    pub notices: Vec<String>,
    /// `大問`
    pub questions: Vec<MajorQuestion>,
}

/// One major question (`大問`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MajorQuestion {
    /// Sequence number; defaults to the 1-based position.
    pub number: String,
    /// Heading text; defaults to the number.
    pub title: String,
    /// `必須` as written. Use [`MajorQuestion::is_required`] for the default.
    pub required: Option<bool>,
    /// `区分`, shown as the badge of non-required questions.
    pub category: Option<String>,
    /// `配点` as written. Use [`MajorQuestion::points_or_default`] for the default.
    pub points: Option<u32>,
    /// Insert a page break before this question.
    pub page_break: bool,
    /// Sub-questions in document order.
    pub sub_questions: Vec<SubQuestion>,
}

/// One sub-question.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubQuestion {
    /// Label such as `(1)`; synthesized from the position when absent.
    pub label: String,
    /// Question body, markdown-lite with math.
    pub body: String,
    /// `配点` as written.
    pub points: Option<u32>,
    /// `解答`
    pub answer: Option<String>,
    /// `解説`
    pub explanation: Option<String>,
    /// Insert a page break before this sub-question.
    pub page_break: bool,
}

impl ExamDocument {
    /// Parses exam YAML into a normalized document.
    pub fn parse(input: &str) -> Result<Self> {
        let root = load_document(input)?;
        Ok(Self::from_fields(Fields::new(&root)))
    }

    /// Normalizes an already-decoded mapping.
    pub fn from_fields(fields: Fields<'_>) -> Self {
        let questions = fields
            .items("大問")
            .into_iter()
            .enumerate()
            .filter_map(|(index, value)| MajorQuestion::from_value(value, index))
            .collect();

        Self {
            title: fields.opt_text_any(TITLE_KEYS),
            subtitle: fields.opt_text("サブタイトル"),
            subject: fields.opt_text("科目"),
            institution: fields.opt_text("学校名"),
            duration_minutes: fields.uint("試験時間"),
            total_points: fields.uint("配点合計"),
            notices: fields.text_list("注意事項"),
            questions,
        }
    }
}

impl MajorQuestion {
    fn from_value(value: &Value, index: usize) -> Option<Self> {
        let Some(fields) = Fields::of(value) else {
            log::warn!(
                "大問 #{}: expected a mapping, found {}; skipping",
                index + 1,
                value_kind(value)
            );
            return None;
        };

        let number = fields
            .opt_text("番号")
            .unwrap_or_else(|| (index + 1).to_string());
        let title = fields.opt_text("タイトル").unwrap_or_else(|| number.clone());
        let sub_questions = fields
            .items_any(SUB_QUESTION_KEYS)
            .into_iter()
            .enumerate()
            .filter_map(|(position, value)| SubQuestion::from_value(value, position))
            .collect();

        Some(Self {
            number,
            title,
            required: fields.flag("必須"),
            category: fields.opt_text("区分"),
            points: fields.uint("配点"),
            page_break: fields.flag("改ページ").unwrap_or(false),
            sub_questions,
        })
    }

    /// Whether the question is required; `true` unless `必須: false`.
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(true)
    }

    /// Declared points, or the default for a major question.
    pub fn points_or_default(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_MAJOR_POINTS)
    }

    /// Badge text: `必答` when explicitly required, otherwise the category
    /// unless it is the `記載なし` sentinel.
    pub fn badge(&self) -> Option<&str> {
        if self.required == Some(true) {
            return Some(REQUIRED_BADGE);
        }
        self.category
            .as_deref()
            .filter(|category| *category != NO_DESIGNATION)
    }

    /// Points to display; `None` when absent or zero.
    pub fn display_points(&self) -> Option<u32> {
        self.points.filter(|points| *points > 0)
    }
}

impl SubQuestion {
    fn from_value(value: &Value, position: usize) -> Option<Self> {
        let label = synthesized_label(position);
        if let Some(fields) = Fields::of(value) {
            return Some(Self {
                label: fields.opt_text("番号").unwrap_or(label),
                body: fields.text("本文"),
                points: fields.uint("配点"),
                answer: fields.opt_text("解答"),
                explanation: fields.opt_text("解説"),
                page_break: fields.flag("改ページ").unwrap_or(false),
            });
        }
        match value {
            Value::Null => {
                log::warn!("小問 #{}: empty entry; skipping", position + 1);
                None
            }
            other => {
                let body = scalar_text(other, "小問")?;
                Some(Self {
                    label,
                    body,
                    ..Self::default()
                })
            }
        }
    }

    /// Declared points, or the default for a sub-question.
    pub fn points_or_default(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_SUB_POINTS)
    }
}

/// Label given to a sub-question that omits `番号`.
pub fn synthesized_label(position: usize) -> String {
    format!("({})", position + 1)
}
