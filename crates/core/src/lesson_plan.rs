//! Lesson plans (学習指導案).
//!
//! Several fields have historical names. Each alias list below is consulted
//! in order and the first present key wins; values are never merged.
//!
//! Both output targets (HTML and the document tree) lay out the plan through
//! [`LessonPlan::sections`], so they agree on which sections appear, in which
//! order, and under which number.

use crate::document::{load_document, value_kind};
use crate::error::Result;
use crate::fields::{Fields, key_text, scalar_text};
use crate::text::full_width_digits;
use serde_yaml::Value;

/// Keys consulted for the subject.
pub const SUBJECT_KEYS: &[&str] = &["教科", "科目"];
/// Keys consulted for the lesson goals.
pub const GOAL_KEYS: &[&str] = &["本時の目標", "目標"];
/// Keys consulted for the lesson flow.
pub const FLOW_KEYS: &[&str] = &["展開", "授業展開"];
/// Keys consulted for the evaluation criteria.
pub const EVALUATION_KEYS: &[&str] = &["評価", "本時の評価"];

/// A normalized lesson plan.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonPlan {
    /// `教科` (alias `科目`)
    pub subject: String,
    /// `日時`
    pub date: String,
    /// `学校名`
    pub institution: String,
    /// `対象`
    pub target: String,
    /// `会場`
    pub room: String,
    /// `授業者`
    pub presenter: String,
    /// `単元名`
    pub unit: String,
    /// `使用教科書`
    pub textbook: Option<String>,
    /// `生徒の実態`
    pub student_profile: Vec<String>,
    /// `本時の目標` (alias `目標`)
    pub goals: Vec<String>,
    /// `準備物`
    pub materials: Materials,
    /// `展開` (alias `授業展開`), in document order.
    pub flow: Vec<Phase>,
    /// `評価` (alias `本時の評価`)
    pub evaluation: Vec<Criterion>,
    /// `板書計画`, kept verbatim.
    pub board_plan: Option<String>,
    /// `デジタル教科書活用`
    pub digital_usage: Vec<String>,
    /// `配慮事項`
    pub considerations: Vec<String>,
}

/// Teacher and student materials.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Materials {
    /// `教師`
    pub teacher: Vec<String>,
    /// `生徒`
    pub student: Vec<String>,
}

impl Materials {
    /// Both lists are empty.
    pub fn is_empty(&self) -> bool {
        self.teacher.is_empty() && self.student.is_empty()
    }
}

/// One phase of the lesson flow.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Phase {
    /// The phase name (the flow mapping's key).
    pub name: String,
    /// `時間`
    pub minutes: Option<u32>,
    /// `学習内容`
    pub contents: Vec<String>,
    /// `学習活動`
    pub activities: Vec<String>,
    /// `留意点`
    pub notes: Vec<String>,
}

impl Phase {
    /// `(N分)`, or `None` when the phase has no duration.
    pub fn duration_label(&self) -> Option<String> {
        self.minutes.map(|minutes| format!("({minutes}分)"))
    }
}

/// One evaluation criterion.
#[derive(Debug, Clone, PartialEq)]
pub struct Criterion {
    /// Present when the criteria were written as a mapping.
    pub label: Option<String>,
    /// Criterion text.
    pub text: String,
}

/// Sections a lesson plan can contain, in layout order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonSection {
    /// 単元名
    Unit,
    /// 生徒の実態
    StudentProfile,
    /// 本時の目標
    Goals,
    /// 準備物
    Materials,
    /// 本時の展開
    Flow,
    /// 本時の評価
    Evaluation,
    /// 板書計画
    BoardPlan,
    /// デジタル教科書活用
    DigitalUsage,
    /// 配慮事項
    Considerations,
}

impl LessonSection {
    /// All sections in layout order.
    pub const ALL: [LessonSection; 9] = [
        LessonSection::Unit,
        LessonSection::StudentProfile,
        LessonSection::Goals,
        LessonSection::Materials,
        LessonSection::Flow,
        LessonSection::Evaluation,
        LessonSection::BoardPlan,
        LessonSection::DigitalUsage,
        LessonSection::Considerations,
    ];

    /// Heading text without its number.
    pub fn title(self) -> &'static str {
        match self {
            LessonSection::Unit => "単元名",
            LessonSection::StudentProfile => "生徒の実態",
            LessonSection::Goals => "本時の目標",
            LessonSection::Materials => "準備物",
            LessonSection::Flow => "本時の展開",
            LessonSection::Evaluation => "本時の評価",
            LessonSection::BoardPlan => "板書計画",
            LessonSection::DigitalUsage => "デジタル教科書活用",
            LessonSection::Considerations => "配慮事項",
        }
    }
}

/// A section scheduled for output, with its numbered heading.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedSection {
    /// Which section.
    pub section: LessonSection,
    /// Heading such as `１　単元名`.
    pub heading: String,
}

/// Column headings of the flow table.
pub const FLOW_COLUMNS: [&str; 3] = ["時間", "○学習内容　・学習活動", "指導上の留意点"];

impl LessonPlan {
    /// Parses lesson-plan YAML into a normalized plan.
    pub fn parse(input: &str) -> Result<Self> {
        let root = load_document(input)?;
        Ok(Self::from_fields(Fields::new(&root)))
    }

    /// Normalizes an already-decoded mapping.
    pub fn from_fields(fields: Fields<'_>) -> Self {
        let materials = fields
            .mapping("準備物")
            .map(|materials| Materials {
                teacher: materials.text_list("教師"),
                student: materials.text_list("生徒"),
            })
            .unwrap_or_default();

        Self {
            subject: fields.opt_text_any(SUBJECT_KEYS).unwrap_or_default(),
            date: fields.text("日時"),
            institution: fields.text("学校名"),
            target: fields.text("対象"),
            room: fields.text("会場"),
            presenter: fields.text("授業者"),
            unit: fields.text("単元名"),
            textbook: fields.opt_text("使用教科書"),
            student_profile: fields.text_list("生徒の実態"),
            goals: fields.text_list_any(GOAL_KEYS),
            materials,
            flow: read_flow(fields),
            evaluation: read_evaluation(fields),
            board_plan: fields.opt_text("板書計画"),
            digital_usage: fields.text_list("デジタル教科書活用"),
            considerations: fields.text_list("配慮事項"),
        }
    }

    /// `{教科}科 学習指導案`
    pub fn document_title(&self) -> String {
        format!("{}科 学習指導案", self.subject)
    }

    /// Label/value rows of the metadata table.
    pub fn metadata_rows(&self) -> [(&'static str, &str); 5] {
        [
            ("日　時", self.date.as_str()),
            ("学校名", self.institution.as_str()),
            ("対　象", self.target.as_str()),
            ("会　場", self.room.as_str()),
            ("授業者", self.presenter.as_str()),
        ]
    }

    /// Whether `section` has anything to show.
    pub fn has_section(&self, section: LessonSection) -> bool {
        match section {
            LessonSection::Unit => !self.unit.is_empty() || self.textbook.is_some(),
            LessonSection::StudentProfile => !self.student_profile.is_empty(),
            LessonSection::Goals => !self.goals.is_empty(),
            LessonSection::Materials => !self.materials.is_empty(),
            LessonSection::Flow => !self.flow.is_empty(),
            LessonSection::Evaluation => !self.evaluation.is_empty(),
            LessonSection::BoardPlan => self.board_plan.is_some(),
            LessonSection::DigitalUsage => !self.digital_usage.is_empty(),
            LessonSection::Considerations => !self.considerations.is_empty(),
        }
    }

    /// Sections with content, numbered `１`, `２`, … in layout order.
    pub fn sections(&self) -> Vec<PlannedSection> {
        LessonSection::ALL
            .into_iter()
            .filter(|section| self.has_section(*section))
            .enumerate()
            .map(|(index, section)| PlannedSection {
                section,
                heading: format!("{}　{}", full_width_digits(index + 1), section.title()),
            })
            .collect()
    }
}

fn read_flow(fields: Fields<'_>) -> Vec<Phase> {
    let Some((key, value)) = fields.first_present(FLOW_KEYS) else {
        return Vec::new();
    };
    let Some(flow) = Fields::of(value) else {
        log::warn!(
            "field `{}`: expected a mapping of phases, found {}",
            key,
            value_kind(value)
        );
        return Vec::new();
    };

    flow.entries()
        .filter_map(|(name, phase)| {
            let name = key_text(name);
            if phase.is_null() {
                return None;
            }
            let Some(phase) = Fields::of(phase) else {
                log::warn!(
                    "phase `{}`: expected a mapping, found {}; skipping",
                    name,
                    value_kind(phase)
                );
                return None;
            };
            Some(Phase {
                name,
                minutes: phase.uint("時間"),
                contents: phase.text_list("学習内容"),
                activities: phase.text_list("学習活動"),
                notes: phase.text_list("留意点"),
            })
        })
        .collect()
}

fn read_evaluation(fields: Fields<'_>) -> Vec<Criterion> {
    let Some((key, value)) = fields.first_present(EVALUATION_KEYS) else {
        return Vec::new();
    };

    if let Some(criteria) = Fields::of(value) {
        return criteria
            .entries()
            .filter_map(|(label, text)| {
                let text = flatten_text(text, key)?;
                Some(Criterion {
                    label: Some(key_text(label)),
                    text,
                })
            })
            .collect();
    }

    let items: Vec<&Value> = match value {
        Value::Sequence(seq) => seq.iter().collect(),
        other => vec![other],
    };
    items
        .into_iter()
        .filter_map(|item| {
            let text = match Fields::of(item) {
                Some(object) => match object.opt_text("規準") {
                    Some(text) => Some(text),
                    None => joined_entries(object),
                },
                None => flatten_text(item, key),
            }?;
            Some(Criterion { label: None, text })
        })
        .collect()
}

/// Scalar text, or a list of scalars joined with `、`.
fn flatten_text(value: &Value, key: &str) -> Option<String> {
    let text = match value {
        Value::Sequence(seq) => seq
            .iter()
            .filter_map(|item| scalar_text(item, key))
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("、"),
        other => scalar_text(other, key)?,
    };
    (!text.is_empty()).then_some(text)
}

/// `key：value` pairs joined with `、`, for criterion objects without `規準`.
fn joined_entries(object: Fields<'_>) -> Option<String> {
    let parts: Vec<String> = object
        .entries()
        .filter_map(|(key, value)| {
            let key = key_text(key);
            let value = flatten_text(value, &key)?;
            Some(format!("{key}：{value}"))
        })
        .collect();
    (!parts.is_empty()).then(|| parts.join("、"))
}
