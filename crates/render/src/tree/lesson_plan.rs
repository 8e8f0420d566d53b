//! Lesson plan → document tree.

use super::{
    Alignment, Block, DocumentTree, Paragraph, ParagraphStyle, Run, Table, TableCell, TableRow,
};
use kyozai_core::lesson_plan::FLOW_COLUMNS;
use kyozai_core::{LessonPlan, LessonSection, Phase};

const LABEL_FILL: &str = "F5F5F5";
const FLOW_HEADER_FILL: &str = "E8E8E8";
const BULLET: &str = "• ";

/// Builds the document tree for a lesson plan.
///
/// Sections, their order, and their numbering match the HTML renderer.
pub fn lesson_plan_tree(plan: &LessonPlan) -> DocumentTree {
    let mut tree = DocumentTree::default();
    tree.paragraph(
        Paragraph::text(plan.document_title())
            .with_style(ParagraphStyle::Title)
            .with_alignment(Alignment::Center),
    );
    tree.push(Block::Table(metadata_table(plan)));

    for planned in plan.sections() {
        tree.paragraph(
            Paragraph::text(planned.heading)
                .with_style(ParagraphStyle::Heading1)
                .with_spacing(Some(200), Some(100)),
        );
        push_section(&mut tree, plan, planned.section);
    }
    tree
}

fn metadata_table(plan: &LessonPlan) -> Table {
    let rows = plan
        .metadata_rows()
        .into_iter()
        .map(|(label, value)| TableRow {
            cells: vec![
                TableCell::new(vec![Paragraph::text(label)])
                    .with_shading(LABEL_FILL)
                    .with_width(20),
                TableCell::new(vec![Paragraph::text(value)]).with_width(80),
            ],
            header: false,
        })
        .collect();
    Table {
        rows,
        bordered: true,
    }
}

fn bullet(text: &str) -> Paragraph {
    Paragraph::text(format!("{BULLET}{text}"))
}

fn bullets(tree: &mut DocumentTree, items: &[String]) {
    for item in items {
        tree.paragraph(bullet(item).with_spacing(Some(50), None));
    }
}

fn push_section(tree: &mut DocumentTree, plan: &LessonPlan, section: LessonSection) {
    match section {
        LessonSection::Unit => {
            let mut runs = vec![Run::bold(plan.unit.clone())];
            if let Some(textbook) = &plan.textbook {
                runs.push(Run::plain(format!("（{textbook}）")));
            }
            tree.paragraph(Paragraph::runs(runs));
        }
        LessonSection::StudentProfile => bullets(tree, &plan.student_profile),
        LessonSection::Goals => bullets(tree, &plan.goals),
        LessonSection::Materials => {
            for (label, items) in [
                ("【教師】", &plan.materials.teacher),
                ("【生徒】", &plan.materials.student),
            ] {
                if items.is_empty() {
                    continue;
                }
                tree.paragraph(Paragraph::text(label).with_spacing(Some(100), None));
                for item in items {
                    tree.paragraph(bullet(item));
                }
            }
        }
        LessonSection::Flow => tree.push(Block::Table(flow_table(&plan.flow))),
        LessonSection::Evaluation => {
            for criterion in &plan.evaluation {
                let paragraph = match &criterion.label {
                    Some(label) => Paragraph::runs(vec![
                        Run::bold(format!("{label}：")),
                        Run::plain(criterion.text.clone()),
                    ]),
                    None => bullet(&criterion.text),
                };
                tree.paragraph(paragraph.with_spacing(Some(50), None));
            }
        }
        LessonSection::BoardPlan => {
            let board = plan.board_plan.as_deref().unwrap_or_default();
            for line in board.lines() {
                tree.paragraph(Paragraph::text(line));
            }
        }
        LessonSection::DigitalUsage => bullets(tree, &plan.digital_usage),
        LessonSection::Considerations => bullets(tree, &plan.considerations),
    }
}

fn flow_table(flow: &[Phase]) -> Table {
    let header = TableRow {
        cells: FLOW_COLUMNS
            .iter()
            .map(|column| {
                TableCell::new(vec![
                    Paragraph::text(*column).with_alignment(Alignment::Center),
                ])
                .with_shading(FLOW_HEADER_FILL)
            })
            .collect(),
        header: true,
    };

    let mut rows = vec![header];
    for phase in flow {
        let time = match phase.duration_label() {
            Some(duration) => format!("{}\n{}", phase.name, duration),
            None => phase.name.clone(),
        };

        let activities = phase
            .contents
            .iter()
            .map(|content| Paragraph::text(format!("○ {content}")))
            .chain(
                phase
                    .activities
                    .iter()
                    .map(|activity| Paragraph::text(format!("・ {activity}"))),
            )
            .collect();
        let notes = phase
            .notes
            .iter()
            .map(|note| Paragraph::text(format!("・ {note}")))
            .collect();

        rows.push(TableRow {
            cells: vec![
                TableCell::new(vec![Paragraph::text(time).with_alignment(Alignment::Center)])
                    .with_width(15),
                TableCell::new(activities).with_width(50),
                TableCell::new(notes).with_width(35),
            ],
            header: false,
        });
    }

    Table {
        rows,
        bordered: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(src: &str) -> DocumentTree {
        lesson_plan_tree(&LessonPlan::parse(src).unwrap())
    }

    #[test]
    fn title_then_metadata() {
        let doc = tree("教科: 国語\n");
        let Block::Paragraph(title) = &doc.blocks[0] else {
            panic!("expected title paragraph");
        };
        assert_eq!(title.plain_text(), "国語科 学習指導案");
        assert_eq!(title.style, ParagraphStyle::Title);
        assert_eq!(title.alignment, Alignment::Center);
        let Block::Table(meta) = &doc.blocks[1] else {
            panic!("expected metadata table");
        };
        assert_eq!(meta.rows.len(), 5);
        assert_eq!(meta.rows[0].cells[0].shading, Some("F5F5F5"));
    }

    #[test]
    fn empty_plan_has_no_headings() {
        assert!(tree("").headings().is_empty());
    }

    #[test]
    fn unit_runs() {
        let doc = tree("単元名: 関数\n使用教科書: 数I\n");
        let Block::Paragraph(unit) = &doc.blocks[3] else {
            panic!("expected unit paragraph");
        };
        assert_eq!(unit.runs, vec![Run::bold("関数"), Run::plain("（数I）")]);

        let doc = tree("単元名: 関数\n");
        let Block::Paragraph(unit) = &doc.blocks[3] else {
            panic!("expected unit paragraph");
        };
        assert_eq!(unit.runs.len(), 1);
    }

    #[test]
    fn flow_table_shape() {
        let doc = tree("展開:\n  導入:\n    時間: 5\n    学習内容: [a]\n    学習活動: [b]\n  まとめ: {}\n");
        let table = doc
            .blocks
            .iter()
            .find_map(|block| match block {
                Block::Table(t) if t.rows[0].header => Some(t),
                _ => None,
            })
            .unwrap();
        assert_eq!(table.rows.len(), 3);
        assert!(table.bordered);
        assert_eq!(table.rows[0].cells[0].shading, Some("E8E8E8"));
        assert_eq!(table.rows[1].cells[0].paragraphs[0].plain_text(), "導入\n(5分)");
        assert_eq!(table.rows[1].cells[1].paragraphs.len(), 2);
        assert_eq!(table.rows[2].cells[0].paragraphs[0].plain_text(), "まとめ");
    }

    #[test]
    fn labeled_evaluation_is_bold() {
        let doc = tree("評価:\n  知識: 説明できる\n");
        let text = doc.text();
        assert!(text.contains("知識：説明できる"));
        let para = doc
            .blocks
            .iter()
            .rev()
            .find_map(|block| match block {
                Block::Paragraph(p) => Some(p),
                Block::Table(_) => None,
            })
            .unwrap();
        assert!(para.runs[0].bold);
    }

    #[test]
    fn board_plan_one_paragraph_per_line() {
        let doc = tree("板書計画: |\n  一行目\n  二行目\n");
        assert!(doc.text().ends_with("一行目\n二行目\n"));
    }

    #[test]
    fn materials_sub_labels() {
        let doc = tree("準備物:\n  生徒: [ノート]\n");
        let text = doc.text();
        assert!(!text.contains("【教師】"));
        assert!(text.contains("【生徒】\n• ノート\n"));
    }
}
