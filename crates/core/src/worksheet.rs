//! Worksheet documents: a flat list of section headers and problems.

use crate::document::{load_document, value_kind};
use crate::error::Result;
use crate::fields::{Fields, key_text, scalar_text};
use serde_yaml::Value;

/// Discriminator value marking a section header item.
pub const HEADER_TYPE: &str = "header";
/// Default points for a problem.
pub const DEFAULT_POINTS: u32 = 10;
/// Default answer-space height, in lines.
pub const DEFAULT_SPACE_LINES: u32 = 5;

/// A normalized worksheet.
#[derive(Debug, Clone, PartialEq)]
pub struct WorksheetDocument {
    /// `タイトル`
    pub title: Option<String>,
    /// `サブタイトル`
    pub subtitle: Option<String>,
    /// `解答を作成`; defaults to `true`.
    pub answer_key: bool,
    /// `問題` in document order.
    pub items: Vec<WorksheetItem>,
}

impl Default for WorksheetDocument {
    fn default() -> Self {
        Self {
            title: None,
            subtitle: None,
            answer_key: true,
            items: Vec::new(),
        }
    }
}

/// One entry of the `問題` list.
#[derive(Debug, Clone, PartialEq)]
pub enum WorksheetItem {
    /// `type: header`, a section divider.
    Header(SectionHeader),
    /// Anything else.
    Problem(Problem),
}

/// A section divider.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SectionHeader {
    /// `text`
    pub text: String,
    /// Insert a page break before this header.
    pub page_break: bool,
}

/// A numbered problem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Problem {
    /// `番号`, or the 1-based position among problems.
    pub number: String,
    /// `本文`
    pub body: String,
    /// `配点` as written.
    pub points: Option<u32>,
    /// `スペース` as written.
    pub space: Option<u32>,
    /// `小問`, flattened to text.
    pub sub_items: Vec<String>,
    /// `解答`; one entry per answer line. Empty strings count as absent.
    pub answers: Vec<String>,
    /// `解説`
    pub explanation: Option<String>,
    /// Insert a page break before this problem.
    pub page_break: bool,
}

impl WorksheetDocument {
    /// Parses worksheet YAML into a normalized document.
    pub fn parse(input: &str) -> Result<Self> {
        let root = load_document(input)?;
        Ok(Self::from_fields(Fields::new(&root)))
    }

    /// Normalizes an already-decoded mapping.
    pub fn from_fields(fields: Fields<'_>) -> Self {
        let mut problem_count = 0;
        let mut items = Vec::new();
        for (index, value) in fields.items("問題").into_iter().enumerate() {
            match WorksheetItem::from_value(value, index, problem_count + 1) {
                Some(item @ WorksheetItem::Problem(_)) => {
                    problem_count += 1;
                    items.push(item);
                }
                Some(header) => items.push(header),
                None => {}
            }
        }

        Self {
            title: fields.opt_text("タイトル"),
            subtitle: fields.opt_text("サブタイトル"),
            answer_key: fields.flag("解答を作成").unwrap_or(true),
            items,
        }
    }

    /// Problems only, skipping headers.
    pub fn problems(&self) -> impl Iterator<Item = &Problem> {
        self.items.iter().filter_map(|item| match item {
            WorksheetItem::Problem(problem) => Some(problem),
            WorksheetItem::Header(_) => None,
        })
    }
}

impl WorksheetItem {
    fn from_value(value: &Value, index: usize, ordinal: usize) -> Option<Self> {
        let Some(fields) = Fields::of(value) else {
            if value.is_null() {
                log::warn!("問題 #{}: empty entry; skipping", index + 1);
                return None;
            }
            log::warn!(
                "問題 #{}: expected a mapping, found {}; using it as the body",
                index + 1,
                value_kind(value)
            );
            return scalar_text(value, "問題").map(|body| {
                WorksheetItem::Problem(Problem {
                    number: ordinal.to_string(),
                    body,
                    ..Problem::default()
                })
            });
        };

        match fields.opt_text("type").as_deref() {
            Some(HEADER_TYPE) => {
                return Some(WorksheetItem::Header(SectionHeader {
                    text: fields.text("text"),
                    page_break: fields.flag("改ページ").unwrap_or(false),
                }));
            }
            Some(other) => log::debug!(
                "問題 #{}: unknown type {:?}; treating as a problem",
                index + 1,
                other
            ),
            None => {}
        }

        Some(WorksheetItem::Problem(Problem {
            number: fields
                .opt_text("番号")
                .unwrap_or_else(|| ordinal.to_string()),
            body: fields.text("本文"),
            points: fields.uint("配点"),
            space: fields.uint("スペース"),
            sub_items: fields
                .items("小問")
                .into_iter()
                .filter_map(sub_item_text)
                .collect(),
            answers: fields.text_list("解答"),
            explanation: fields.opt_text("解説"),
            page_break: fields.flag("改ページ").unwrap_or(false),
        }))
    }
}

impl Problem {
    /// Declared points, or the default.
    pub fn points_or_default(&self) -> u32 {
        self.points.unwrap_or(DEFAULT_POINTS)
    }

    /// Points to display; `None` when absent or zero.
    pub fn display_points(&self) -> Option<u32> {
        self.points.filter(|points| *points > 0)
    }

    /// Answer-space height in lines.
    pub fn space_lines(&self) -> u32 {
        self.space.unwrap_or(DEFAULT_SPACE_LINES)
    }

    /// Whether the answer key has anything to show for this problem.
    pub fn has_answer_content(&self) -> bool {
        !self.answers.is_empty() || self.explanation.is_some()
    }
}

/// A sub-item is a string, or a `{番号, 本文}` mapping joined with a space.
fn sub_item_text(value: &Value) -> Option<String> {
    match Fields::of(value) {
        Some(fields) => {
            let number = fields.text("番号");
            let body = fields.text("本文");
            if number.is_empty() && body.is_empty() {
                let keys: Vec<_> = fields.entries().map(|(key, _)| key_text(key)).collect();
                log::warn!("小問: mapping without 番号 or 本文 (keys: {:?})", keys);
                return None;
            }
            Some(format!("{number} {body}"))
        }
        None => scalar_text(value, "小問").filter(|text| !text.is_empty()),
    }
}
