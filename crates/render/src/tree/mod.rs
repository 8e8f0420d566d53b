//! Format-neutral document tree for word-processor output.
//!
//! Headings are marked by [`ParagraphStyle`] rather than by tag. The tree
//! is built synchronously and serialized by [`crate::docx`].

mod lesson_plan;

pub use lesson_plan::lesson_plan_tree;

/// A whole document: a flat sequence of paragraphs and tables.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentTree {
    /// Top-level blocks in order.
    pub blocks: Vec<Block>,
}

/// A top-level block.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    /// A paragraph.
    Paragraph(Paragraph),
    /// A table.
    Table(Table),
}

/// Named paragraph styles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// Document title.
    Title,
    /// Section heading.
    Heading1,
    /// Body text.
    #[default]
    Normal,
}

impl ParagraphStyle {
    /// Style id in the generated style sheet.
    pub fn style_id(self) -> &'static str {
        match self {
            ParagraphStyle::Title => "Title",
            ParagraphStyle::Heading1 => "Heading1",
            ParagraphStyle::Normal => "Normal",
        }
    }
}

/// Horizontal alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    /// Start-aligned.
    #[default]
    Left,
    /// Centered.
    Center,
}

/// A run of uniformly formatted text. `\n` inside `text` is a line break.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    /// Text content.
    pub text: String,
    /// Bold weight.
    pub bold: bool,
}

impl Run {
    /// Regular-weight run.
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: false,
        }
    }

    /// Bold run.
    pub fn bold(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bold: true,
        }
    }
}

/// A paragraph.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Paragraph {
    /// Runs in order.
    pub runs: Vec<Run>,
    /// Paragraph style.
    pub style: ParagraphStyle,
    /// Alignment.
    pub alignment: Alignment,
    /// Space before the paragraph, in twentieths of a point.
    pub spacing_before: Option<u32>,
    /// Space after the paragraph, in twentieths of a point.
    pub spacing_after: Option<u32>,
}

impl Paragraph {
    /// A single-run paragraph with the normal style.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            runs: vec![Run::plain(text)],
            ..Self::default()
        }
    }

    /// A paragraph made of `runs`.
    pub fn runs(runs: Vec<Run>) -> Self {
        Self {
            runs,
            ..Self::default()
        }
    }

    /// Sets the style.
    pub fn with_style(mut self, style: ParagraphStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets spacing before and after.
    pub fn with_spacing(mut self, before: Option<u32>, after: Option<u32>) -> Self {
        self.spacing_before = before;
        self.spacing_after = after;
        self
    }

    /// Concatenated text of all runs.
    pub fn plain_text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }
}

/// A table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    /// Rows in order.
    pub rows: Vec<TableRow>,
    /// Draw single-line borders around and between cells.
    pub bordered: bool,
}

/// A table row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableRow {
    /// Cells in order.
    pub cells: Vec<TableCell>,
    /// Repeat as a header row on each page.
    pub header: bool,
}

/// A table cell. Holds at least one paragraph once serialized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableCell {
    /// Cell content.
    pub paragraphs: Vec<Paragraph>,
    /// Background fill as a hex RGB string such as `F5F5F5`.
    pub shading: Option<&'static str>,
    /// Width as a percentage of the table width.
    pub width_pct: Option<u8>,
}

impl TableCell {
    /// A cell holding `paragraphs`.
    pub fn new(paragraphs: Vec<Paragraph>) -> Self {
        Self {
            paragraphs,
            ..Self::default()
        }
    }

    /// Sets the background fill.
    pub fn with_shading(mut self, fill: &'static str) -> Self {
        self.shading = Some(fill);
        self
    }

    /// Sets the width.
    pub fn with_width(mut self, pct: u8) -> Self {
        self.width_pct = Some(pct);
        self
    }
}

impl DocumentTree {
    /// Appends a block.
    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Appends a paragraph.
    pub fn paragraph(&mut self, paragraph: Paragraph) {
        self.blocks.push(Block::Paragraph(paragraph));
    }

    /// Text of every top-level `Heading1` paragraph, in order.
    pub fn headings(&self) -> Vec<String> {
        self.blocks
            .iter()
            .filter_map(|block| match block {
                Block::Paragraph(p) if p.style == ParagraphStyle::Heading1 => Some(p.plain_text()),
                _ => None,
            })
            .collect()
    }

    /// All text in document order, one line per paragraph.
    pub fn text(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            match block {
                Block::Paragraph(p) => {
                    out.push_str(&p.plain_text());
                    out.push('\n');
                }
                Block::Table(table) => {
                    for row in &table.rows {
                        for cell in &row.cells {
                            for p in &cell.paragraphs {
                                out.push_str(&p.plain_text());
                                out.push('\n');
                            }
                        }
                    }
                }
            }
        }
        out
    }
}
