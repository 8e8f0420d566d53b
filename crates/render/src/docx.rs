//! Serializes a [`DocumentTree`] into a WordprocessingML (`.docx`) package.
//!
//! The package holds the minimum part set Word needs: content types, the
//! package relationships, the main document, its relationships, and a style
//! sheet defining `Title` and `Heading1`. Entries are written in sorted order
//! with a fixed timestamp so the same tree always yields the same bytes.

use crate::tree::{Alignment, Block, DocumentTree, Paragraph, Table, TableCell};
use kyozai_core::KyozaiError;
use quick_xml::escape::escape;
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::io::{Cursor, Write};
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::{SimpleFileOptions, ZipWriter};

/// A4 portrait, in twentieths of a point.
const PAGE_WIDTH: u32 = 11906;
const PAGE_HEIGHT: u32 = 16838;
/// 2.5 cm.
const PAGE_MARGIN: u32 = 1417;
const TEXT_WIDTH: u32 = PAGE_WIDTH - 2 * PAGE_MARGIN;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:docDefaults><w:rPrDefault><w:rPr><w:rFonts w:ascii="Century" w:eastAsia="ＭＳ 明朝" w:hAnsi="Century" w:cs="Times New Roman"/><w:sz w:val="21"/><w:szCs w:val="21"/><w:lang w:val="en-US" w:eastAsia="ja-JP"/></w:rPr></w:rPrDefault><w:pPrDefault/></w:docDefaults><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:qFormat/></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:spacing w:after="240"/><w:jc w:val="center"/></w:pPr><w:rPr><w:b/><w:sz w:val="36"/><w:szCs w:val="36"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:qFormat/><w:pPr><w:keepNext/><w:outlineLvl w:val="0"/></w:pPr><w:rPr><w:b/><w:sz w:val="26"/><w:szCs w:val="26"/></w:rPr></w:style></w:styles>"#;

const DOCUMENT_OPEN: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#;

/// Errors that can occur while packaging a document.
#[derive(Debug, Error)]
pub enum DocxError {
    /// Error writing the ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error writing an entry
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<DocxError> for KyozaiError {
    fn from(err: DocxError) -> Self {
        KyozaiError::Package(err.to_string())
    }
}

/// Serializes `tree` into `.docx` bytes.
pub fn write_docx(tree: &DocumentTree) -> Result<Vec<u8>, DocxError> {
    let mut files: BTreeMap<&'static str, Vec<u8>> = BTreeMap::new();
    files.insert("[Content_Types].xml", CONTENT_TYPES.as_bytes().to_vec());
    files.insert("_rels/.rels", PACKAGE_RELS.as_bytes().to_vec());
    files.insert("word/_rels/document.xml.rels", DOCUMENT_RELS.as_bytes().to_vec());
    files.insert("word/styles.xml", STYLES.as_bytes().to_vec());
    files.insert("word/document.xml", document_xml(tree).into_bytes());

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(zip::DateTime::default());

    for (path, contents) in &files {
        zip.start_file(*path, options)?;
        zip.write_all(contents)?;
    }

    let cursor = zip.finish()?;
    log::debug!("packaged document: {} bytes", cursor.get_ref().len());
    Ok(cursor.into_inner())
}

/// Builds `word/document.xml`.
pub fn document_xml(tree: &DocumentTree) -> String {
    let mut xml = String::with_capacity(16 * 1024);
    xml.push_str(DOCUMENT_OPEN);
    for block in &tree.blocks {
        match block {
            Block::Paragraph(paragraph) => write_paragraph(&mut xml, paragraph),
            Block::Table(table) => {
                write_table(&mut xml, table);
                // Word merges a table with a directly following table.
                xml.push_str("<w:p/>");
            }
        }
    }
    xml.push_str(&format!(
        "<w:sectPr><w:pgSz w:w=\"{PAGE_WIDTH}\" w:h=\"{PAGE_HEIGHT}\"/>\
         <w:pgMar w:top=\"{m}\" w:right=\"{m}\" w:bottom=\"{m}\" w:left=\"{m}\" \
         w:header=\"851\" w:footer=\"992\" w:gutter=\"0\"/></w:sectPr>",
        m = PAGE_MARGIN
    ));
    xml.push_str("</w:body></w:document>");
    xml
}

fn write_paragraph(xml: &mut String, paragraph: &Paragraph) {
    xml.push_str("<w:p><w:pPr>");
    xml.push_str(&format!(
        "<w:pStyle w:val=\"{}\"/>",
        paragraph.style.style_id()
    ));
    if paragraph.spacing_before.is_some() || paragraph.spacing_after.is_some() {
        xml.push_str("<w:spacing");
        if let Some(before) = paragraph.spacing_before {
            xml.push_str(&format!(" w:before=\"{before}\""));
        }
        if let Some(after) = paragraph.spacing_after {
            xml.push_str(&format!(" w:after=\"{after}\""));
        }
        xml.push_str("/>");
    }
    if paragraph.alignment == Alignment::Center {
        xml.push_str("<w:jc w:val=\"center\"/>");
    }
    xml.push_str("</w:pPr>");

    for run in &paragraph.runs {
        xml.push_str("<w:r>");
        if run.bold {
            xml.push_str("<w:rPr><w:b/><w:bCs/></w:rPr>");
        }
        for (index, line) in run.text.split('\n').enumerate() {
            if index > 0 {
                xml.push_str("<w:br/>");
            }
            if !line.is_empty() {
                xml.push_str("<w:t xml:space=\"preserve\">");
                xml.push_str(&escape(xml_chars(line)));
                xml.push_str("</w:t>");
            }
        }
        xml.push_str("</w:r>");
    }
    xml.push_str("</w:p>");
}

/// Drops characters XML 1.0 cannot carry (most C0 controls, U+FFFE,
/// U+FFFF). Word refuses a part that contains them.
fn xml_chars(text: &str) -> Cow<'_, str> {
    fn allowed(c: char) -> bool {
        matches!(
            c,
            '\t' | '\n' | '\r'
                | '\u{20}'..='\u{D7FF}'
                | '\u{E000}'..='\u{FFFD}'
                | '\u{10000}'..='\u{10FFFF}'
        )
    }
    if text.chars().all(allowed) {
        Cow::Borrowed(text)
    } else {
        log::debug!("dropping characters not allowed in XML from {text:?}");
        Cow::Owned(text.chars().filter(|c| allowed(*c)).collect())
    }
}

fn write_table(xml: &mut String, table: &Table) {
    let columns = table
        .rows
        .iter()
        .map(|row| row.cells.len())
        .max()
        .unwrap_or(0);
    if columns == 0 {
        return;
    }

    xml.push_str("<w:tbl><w:tblPr><w:tblW w:w=\"5000\" w:type=\"pct\"/>");
    if table.bordered {
        xml.push_str("<w:tblBorders>");
        for edge in ["top", "left", "bottom", "right", "insideH", "insideV"] {
            xml.push_str(&format!(
                "<w:{edge} w:val=\"single\" w:sz=\"4\" w:space=\"0\" w:color=\"000000\"/>"
            ));
        }
        xml.push_str("</w:tblBorders>");
    }
    xml.push_str("<w:tblLayout w:type=\"fixed\"/></w:tblPr><w:tblGrid>");
    for width in grid_widths(table, columns) {
        xml.push_str(&format!("<w:gridCol w:w=\"{width}\"/>"));
    }
    xml.push_str("</w:tblGrid>");

    for row in &table.rows {
        xml.push_str("<w:tr>");
        if row.header {
            xml.push_str("<w:trPr><w:tblHeader/></w:trPr>");
        }
        for cell in &row.cells {
            write_cell(xml, cell);
        }
        xml.push_str("</w:tr>");
    }
    xml.push_str("</w:tbl>");
}

/// Column widths in twips, from the widest row that declares widths.
fn grid_widths(table: &Table, columns: usize) -> Vec<u32> {
    let declared = table
        .rows
        .iter()
        .filter(|row| row.cells.len() == columns)
        .find(|row| row.cells.iter().all(|cell| cell.width_pct.is_some()));

    match declared {
        Some(row) => row
            .cells
            .iter()
            .map(|cell| TEXT_WIDTH * u32::from(cell.width_pct.unwrap_or_default()) / 100)
            .collect(),
        None => vec![TEXT_WIDTH / columns as u32; columns],
    }
}

fn write_cell(xml: &mut String, cell: &TableCell) {
    xml.push_str("<w:tc><w:tcPr>");
    match cell.width_pct {
        // pct widths are in fiftieths of a percent
        Some(pct) => xml.push_str(&format!(
            "<w:tcW w:w=\"{}\" w:type=\"pct\"/>",
            u32::from(pct) * 50
        )),
        None => xml.push_str("<w:tcW w:w=\"0\" w:type=\"auto\"/>"),
    }
    if let Some(fill) = cell.shading {
        xml.push_str(&format!(
            "<w:shd w:val=\"clear\" w:color=\"auto\" w:fill=\"{fill}\"/>"
        ));
    }
    xml.push_str("</w:tcPr>");
    if cell.paragraphs.is_empty() {
        xml.push_str("<w:p/>");
    }
    for paragraph in &cell.paragraphs {
        write_paragraph(xml, paragraph);
    }
    xml.push_str("</w:tc>");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{ParagraphStyle, Run, TableRow};
    use std::io::Read;

    fn sample() -> DocumentTree {
        let mut tree = DocumentTree::default();
        tree.paragraph(Paragraph::text("A & B <c>").with_style(ParagraphStyle::Title));
        tree.push(Block::Table(Table {
            rows: vec![TableRow {
                cells: vec![
                    TableCell::new(vec![Paragraph::text("x")])
                        .with_shading("F5F5F5")
                        .with_width(20),
                    TableCell::new(Vec::new()).with_width(80),
                ],
                header: false,
            }],
            bordered: true,
        }));
        tree.paragraph(Paragraph::runs(vec![
            Run::bold("太字："),
            Run::plain("一行目\n二行目"),
        ]));
        tree
    }

    #[test]
    fn document_xml_escapes_and_breaks() {
        let xml = document_xml(&sample());
        assert!(xml.contains("A &amp; B &lt;c&gt;"));
        assert!(xml.contains("<w:pStyle w:val=\"Title\"/>"));
        assert!(xml.contains("一行目</w:t><w:br/><w:t xml:space=\"preserve\">二行目"));
        assert!(xml.contains("<w:rPr><w:b/><w:bCs/></w:rPr><w:t xml:space=\"preserve\">太字："));
    }

    #[test]
    fn cells_always_hold_a_paragraph() {
        let xml = document_xml(&sample());
        assert!(xml.contains("</w:tcPr><w:p/></w:tc>"));
        assert!(xml.contains("w:fill=\"F5F5F5\""));
        assert!(xml.contains("<w:tcW w:w=\"1000\" w:type=\"pct\"/>"));
    }

    #[test]
    fn document_xml_is_well_formed() {
        let xml = document_xml(&sample());
        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut depth = 0usize;
        loop {
            match reader.read_event().expect("well-formed xml") {
                quick_xml::events::Event::Start(_) => depth += 1,
                quick_xml::events::Event::End(_) => depth -= 1,
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(depth, 0);
    }

    #[test]
    fn package_contains_required_parts() {
        let bytes = write_docx(&sample()).unwrap();
        assert_eq!(&bytes[..2], b"PK");
        let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
        let names: Vec<_> = archive.file_names().map(str::to_string).collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(names.iter().any(|name| name == part), "missing {part}");
        }
        let mut document = String::new();
        archive
            .by_name("word/document.xml")
            .unwrap()
            .read_to_string(&mut document)
            .unwrap();
        assert!(document.contains("二行目"));
    }

    #[test]
    fn characters_illegal_in_xml_are_dropped() {
        let mut tree = DocumentTree::default();
        tree.paragraph(Paragraph::text("数\u{1}学\u{fffe}"));
        tree.push(Block::Table(Table {
            rows: vec![TableRow {
                cells: vec![TableCell::new(vec![Paragraph::text("表\u{1b}\u{ffff}\t")])],
                header: false,
            }],
            bordered: false,
        }));
        let xml = document_xml(&tree);
        assert!(!xml.contains(['\u{1}', '\u{1b}', '\u{fffe}', '\u{ffff}']));

        let mut reader = quick_xml::Reader::from_str(&xml);
        let mut text = String::new();
        loop {
            match reader.read_event().expect("well-formed xml") {
                quick_xml::events::Event::Text(t) => text.push_str(&t.unescape().unwrap()),
                quick_xml::events::Event::Eof => break,
                _ => {}
            }
        }
        assert_eq!(text.trim(), "数学表");
    }

    #[test]
    fn packaging_is_deterministic() {
        assert_eq!(write_docx(&sample()).unwrap(), write_docx(&sample()).unwrap());
    }
}
