//! Content-driven layout presets.

/// Typography of the exam cover's notices box, chosen from the notice count.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticePreset {
    /// Fewer than 6 notices.
    Largest,
    /// 6 or 7 notices.
    Medium,
    /// 8 or 9 notices.
    Small,
    /// 10 or more notices.
    Smallest,
}

impl NoticePreset {
    /// Picks the preset for `count` notices.
    pub fn for_count(count: usize) -> Self {
        match count {
            10.. => NoticePreset::Smallest,
            8..=9 => NoticePreset::Small,
            6..=7 => NoticePreset::Medium,
            _ => NoticePreset::Largest,
        }
    }

    /// Class name suffix, as in `notices-small`.
    pub fn name(self) -> &'static str {
        match self {
            NoticePreset::Largest => "largest",
            NoticePreset::Medium => "medium",
            NoticePreset::Small => "small",
            NoticePreset::Smallest => "smallest",
        }
    }

    /// Inline style of the notices box.
    pub fn box_style(self) -> &'static str {
        match self {
            NoticePreset::Largest => "font-size: 11pt; line-height: 1.6;",
            NoticePreset::Medium => "font-size: 10pt; line-height: 1.4;",
            NoticePreset::Small => "font-size: 9.5pt; line-height: 1.3;",
            NoticePreset::Smallest => "font-size: 9pt; line-height: 1.2;",
        }
    }

    /// Inline style of each notice.
    pub fn item_style(self) -> &'static str {
        match self {
            NoticePreset::Largest => "margin-bottom: 10px;",
            NoticePreset::Medium => "margin-bottom: 5px;",
            NoticePreset::Small => "margin-bottom: 3px;",
            NoticePreset::Smallest => "margin-bottom: 2px;",
        }
    }
}

/// Height of a worksheet answer space, in pixels.
pub fn answer_space_height(lines: u32) -> u32 {
    lines.saturating_mul(20)
}
