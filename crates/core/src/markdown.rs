//! Markdown-lite to HTML conversion.
//!
//! Body, answer, and explanation text use a small markdown subset
//! (paragraphs, emphasis, lists, code, links, tables). Math spans written as
//! `$...$` or `$$...$$` are parsed as math so that markdown never rewrites
//! their contents, then copied back into the output byte-for-byte from the
//! source text for MathJax to typeset in the browser.

use crate::error::{KyozaiError, Result, SourceLocation};
use markdown::mdast::Node;
use std::collections::HashMap;
use markdown::message::{Message, Place};

/// Options for markdown-lite conversion.
#[derive(Clone, Copy, Debug)]
pub struct MarkdownOptions {
    /// Pass raw HTML through instead of escaping it.
    pub allow_raw_html: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            allow_raw_html: true,
        }
    }
}

impl MarkdownOptions {
    /// Convert to markdown-rs `ParseOptions`. Raw HTML is always parsed;
    /// the writer decides whether to pass it through.
    fn to_markdown(self) -> markdown::ParseOptions {
        let constructs = markdown::Constructs {
            // Indented code would swallow deeply indented YAML block text.
            code_indented: false,
            html_flow: true,
            html_text: true,
            gfm_autolink_literal: true,
            gfm_strikethrough: true,
            gfm_table: true,
            math_flow: true,
            math_text: true,
            ..Default::default()
        };

        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: true,
            ..markdown::ParseOptions::default()
        }
    }
}

/// Converts markdown-lite text to block-level HTML.
pub fn markdown_to_html(input: &str, options: &MarkdownOptions) -> Result<String> {
    let root = parse(input, options)?;
    let mut writer = HtmlWriter::new(input, options, &root);
    writer.render(&root);
    Ok(writer.finish())
}

/// Converts markdown-lite text to HTML without a wrapping `<p>` when the
/// text is a single paragraph. Used for short answers and list entries.
pub fn markdown_to_inline_html(input: &str, options: &MarkdownOptions) -> Result<String> {
    let root = parse(input, options)?;
    let mut writer = HtmlWriter::new(input, options, &root);
    match single_paragraph(&root) {
        Some(children) => {
            for child in children {
                writer.render(child);
            }
        }
        None => writer.render(&root),
    }
    Ok(writer.finish())
}

fn parse(input: &str, options: &MarkdownOptions) -> Result<Node> {
    markdown::to_mdast(input, &options.to_markdown()).map_err(|err| KyozaiError::Markdown {
        message: err.to_string(),
        location: message_location(&err),
    })
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::new(1, 1),
    }
}

fn single_paragraph(root: &Node) -> Option<&[Node]> {
    match root {
        Node::Root(root) => match root.children.as_slice() {
            [Node::Paragraph(para)] => Some(&para.children),
            _ => None,
        },
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Scope {
    List { spread: bool },
    Blockquote,
    Table,
}

/// Link target of a `[label]: url "title"` definition.
#[derive(Debug, Clone)]
struct LinkTarget {
    url: String,
    title: Option<String>,
}

/// Collects definitions by their normalized identifier. The first
/// definition of an identifier wins.
fn collect_definitions(node: &Node, definitions: &mut HashMap<String, LinkTarget>) {
    if let Node::Definition(definition) = node {
        definitions
            .entry(definition.identifier.clone())
            .or_insert_with(|| LinkTarget {
                url: definition.url.clone(),
                title: definition.title.clone(),
            });
    }
    if let Some(children) = node.children() {
        for child in children {
            collect_definitions(child, definitions);
        }
    }
}

/// Walks an mdast tree and writes HTML.
struct HtmlWriter<'a> {
    out: String,
    source: &'a str,
    options: &'a MarkdownOptions,
    stack: Vec<Scope>,
    definitions: HashMap<String, LinkTarget>,
}

impl<'a> HtmlWriter<'a> {
    fn new(source: &'a str, options: &'a MarkdownOptions, root: &Node) -> Self {
        let mut definitions = HashMap::new();
        collect_definitions(root, &mut definitions);
        Self {
            out: String::with_capacity(source.len() * 2),
            source,
            options,
            stack: Vec::new(),
            definitions,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn push_raw(&mut self, s: &str) {
        self.out.push_str(s);
    }

    fn push_text(&mut self, s: &str) {
        self.out.push_str(&html_escape::encode_text(s));
    }

    fn push_attr_value(&mut self, s: &str) {
        self.out
            .push_str(&html_escape::encode_double_quoted_attribute(s));
    }

    fn is_in_tight_list(&self) -> bool {
        self.stack
            .iter()
            .rev()
            .find(|scope| matches!(scope, Scope::List { .. } | Scope::Blockquote))
            .is_some_and(|scope| matches!(scope, Scope::List { spread: false }))
    }

    /// Inside a list item or blockquote, whose markers prefix continuation
    /// lines in the source.
    fn is_in_container(&self) -> bool {
        self.stack
            .iter()
            .any(|scope| matches!(scope, Scope::List { .. } | Scope::Blockquote))
    }

    fn children(&mut self, children: &[Node]) {
        for child in children {
            self.render(child);
        }
    }

    /// Copies a math node back from the source text. A multi-line span
    /// inside a container would carry the container's markers, so it is
    /// rebuilt from its value instead.
    fn push_math(&mut self, node: &Node, value: &str, display: bool) {
        let verbatim = node
            .position()
            .and_then(|pos| self.source.get(pos.start.offset..pos.end.offset))
            .filter(|text| !(text.contains('\n') && self.is_in_container()));
        match verbatim {
            Some(text) => self.out.push_str(text),
            None if display => {
                self.out.push_str("$$\n");
                self.out.push_str(value);
                self.out.push_str("\n$$");
            }
            None => {
                self.out.push('$');
                self.out.push_str(value);
                self.out.push('$');
            }
        }
    }

    fn render(&mut self, node: &Node) {
        match node {
            Node::Root(root) => self.children(&root.children),
            Node::Text(text) => self.push_text(&text.value),
            Node::Paragraph(para) => {
                let tight = self.is_in_tight_list();
                if !tight {
                    self.push_raw("<p>");
                }
                self.children(&para.children);
                if !tight {
                    self.push_raw("</p>");
                }
            }
            Node::Strong(strong) => {
                self.push_raw("<strong>");
                self.children(&strong.children);
                self.push_raw("</strong>");
            }
            Node::Emphasis(emphasis) => {
                self.push_raw("<em>");
                self.children(&emphasis.children);
                self.push_raw("</em>");
            }
            Node::Delete(delete) => {
                self.push_raw("<del>");
                self.children(&delete.children);
                self.push_raw("</del>");
            }
            Node::InlineCode(code) => {
                self.push_raw("<code>");
                self.push_text(&code.value);
                self.push_raw("</code>");
            }
            Node::Code(code) => {
                match &code.lang {
                    Some(lang) => {
                        self.push_raw("<pre><code class=\"language-");
                        self.push_attr_value(lang);
                        self.push_raw("\">");
                    }
                    None => self.push_raw("<pre><code>"),
                }
                self.push_text(&code.value);
                self.push_raw("</code></pre>");
            }
            Node::Break(_) => self.push_raw("<br />"),
            Node::ThematicBreak(_) => self.push_raw("<hr />"),
            Node::Heading(heading) => {
                let tag = format!("h{}", heading.depth);
                self.push_raw(&format!("<{tag}>"));
                self.children(&heading.children);
                self.push_raw(&format!("</{tag}>"));
            }
            Node::List(list) => self.render_list(list),
            Node::ListItem(item) => {
                self.push_raw("<li>");
                self.children(&item.children);
                self.push_raw("</li>");
            }
            Node::Blockquote(quote) => {
                self.push_raw("<blockquote>");
                self.stack.push(Scope::Blockquote);
                self.children(&quote.children);
                self.stack.pop();
                self.push_raw("</blockquote>");
            }
            Node::Link(link) => {
                self.push_link(&link.url, link.title.as_deref(), &link.children);
            }
            Node::LinkReference(reference) => {
                match self.definitions.get(&reference.identifier).cloned() {
                    Some(target) => {
                        self.push_link(&target.url, target.title.as_deref(), &reference.children)
                    }
                    None => self.children(&reference.children),
                }
            }
            Node::Image(img) => self.push_image(&img.url, &img.alt),
            Node::ImageReference(reference) => {
                match self.definitions.get(&reference.identifier).cloned() {
                    Some(target) => self.push_image(&target.url, &reference.alt),
                    None => self.push_text(&reference.alt),
                }
            }
            Node::Definition(_) => {}
            Node::Html(html) => {
                if self.options.allow_raw_html {
                    self.push_raw(&html.value);
                } else {
                    log::debug!("escaping raw HTML in text field: {}", html.value);
                    self.push_text(&html.value);
                }
            }
            Node::Table(table) => self.render_table(table),
            Node::Math(math) => {
                self.push_raw("<div class=\"math-block\">");
                self.push_math(node, &math.value, true);
                self.push_raw("</div>");
            }
            Node::InlineMath(math) => self.push_math(node, &math.value, false),
            _ => {
                log::warn!("Unhandled markdown node type: {:?}", node);
            }
        }
    }

    fn push_link(&mut self, url: &str, title: Option<&str>, children: &[Node]) {
        self.push_raw("<a href=\"");
        self.push_attr_value(url);
        self.push_raw("\"");
        if let Some(title) = title {
            self.push_raw(" title=\"");
            self.push_attr_value(title);
            self.push_raw("\"");
        }
        self.push_raw(">");
        self.children(children);
        self.push_raw("</a>");
    }

    fn push_image(&mut self, url: &str, alt: &str) {
        self.push_raw("<img src=\"");
        self.push_attr_value(url);
        self.push_raw("\" alt=\"");
        self.push_attr_value(alt);
        self.push_raw("\" />");
    }

    fn render_list(&mut self, list: &markdown::mdast::List) {
        let tag = if list.ordered { "ol" } else { "ul" };
        match list.start {
            Some(start) if list.ordered && start != 1 => {
                self.push_raw(&format!("<ol start=\"{start}\">"));
            }
            _ => self.push_raw(&format!("<{tag}>")),
        }
        self.stack.push(Scope::List {
            spread: list.spread,
        });
        self.children(&list.children);
        self.stack.pop();
        self.push_raw(&format!("</{tag}>"));
    }

    fn render_table(&mut self, table: &markdown::mdast::Table) {
        self.stack.push(Scope::Table);
        self.push_raw("<table>");
        for (index, row) in table.children.iter().enumerate() {
            let Node::TableRow(row) = row else { continue };
            let tag = if index == 0 { "th" } else { "td" };
            self.push_raw("<tr>");
            for cell in &row.children {
                if let Node::TableCell(cell) = cell {
                    self.push_raw(&format!("<{tag}>"));
                    self.children(&cell.children);
                    self.push_raw(&format!("</{tag}>"));
                }
            }
            self.push_raw("</tr>");
        }
        self.push_raw("</table>");
        self.stack.pop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn html(input: &str) -> String {
        markdown_to_html(input, &MarkdownOptions::default()).expect("markdown should render")
    }

    fn inline(input: &str) -> String {
        markdown_to_inline_html(input, &MarkdownOptions::default())
            .expect("markdown should render")
    }

    #[test]
    fn paragraph_and_emphasis() {
        assert_eq!(
            html("This is **bold** and *em*."),
            "<p>This is <strong>bold</strong> and <em>em</em>.</p>"
        );
    }

    #[test]
    fn tight_list_has_no_paragraphs() {
        assert_eq!(html("- a\n- b"), "<ul><li>a</li><li>b</li></ul>");
    }

    #[test]
    fn ordered_list_keeps_start() {
        assert_eq!(html("3. c\n4. d"), "<ol start=\"3\"><li>c</li><li>d</li></ol>");
    }

    #[test]
    fn list_after_line_starts_new_block() {
        let out = html("次の問いに答えよ。\n- 項目A\n- 項目B");
        assert!(out.starts_with("<p>次の問いに答えよ。</p>"), "{out}");
        assert!(out.contains("<li>項目A</li>"), "{out}");
    }

    #[test]
    fn inline_math_is_verbatim() {
        let src = r"Solve $x^2 - 2x + 1 = 0$ and $a_1 * b_2 * c$.";
        let out = html(src);
        assert!(out.contains(r"$x^2 - 2x + 1 = 0$"), "{out}");
        assert!(out.contains(r"$a_1 * b_2 * c$"), "{out}");
        assert!(!out.contains("<em>"), "{out}");
    }

    #[test]
    fn display_math_is_verbatim() {
        let src = "Compute\n\n$$\n\\int_0^1 x\\,dx = \\frac{1}{2}\n$$\n\nDone.";
        let out = html(src);
        assert!(
            out.contains("$$\n\\int_0^1 x\\,dx = \\frac{1}{2}\n$$"),
            "{out}"
        );
    }

    #[test]
    fn reference_links_resolve_from_definitions() {
        assert_eq!(
            html("詳しくは[教科書][1]を参照。\n\n[1]: https://example.com \"本\""),
            "<p>詳しくは<a href=\"https://example.com\" title=\"本\">教科書</a>を参照。</p>"
        );
        assert_eq!(
            html("[資料]と[Guide][]\n\n[資料]: /a\n[guide]: /b"),
            "<p><a href=\"/a\">資料</a>と<a href=\"/b\">Guide</a></p>"
        );
    }

    #[test]
    fn image_reference_keeps_alt() {
        assert_eq!(
            html("![図1][fig]\n\n[fig]: fig.png"),
            "<p><img src=\"fig.png\" alt=\"図1\" /></p>"
        );
    }

    #[test]
    fn display_math_in_blockquote_drops_markers() {
        let out = html("> $$\n> x^2\n> $$");
        assert!(out.contains("$$\nx^2\n$$"), "{out}");
        assert!(!out.contains("&gt;") && !out.contains("> x"), "{out}");
    }

    #[test]
    fn display_math_in_list_item_drops_indent() {
        let out = html("- 式\n\n  $$\n  a+b\n  $$");
        assert!(out.contains("$$\na+b\n$$"), "{out}");
    }

    #[test]
    fn inline_math_in_list_stays_verbatim() {
        assert_eq!(inline("- $a_1 * b_2$"), "<ul><li>$a_1 * b_2$</li></ul>");
    }

    #[test]
    fn inline_double_dollar_is_verbatim() {
        let out = html(r"Value $$\sum_{k=1}^{n} k$$ here.");
        assert!(out.contains(r"$$\sum_{k=1}^{n} k$$"), "{out}");
    }

    #[test]
    fn text_is_escaped_but_dollars_survive() {
        assert_eq!(html("a < b costs 5$"), "<p>a &lt; b costs 5$</p>");
    }

    #[test]
    fn raw_html_toggle() {
        assert_eq!(html("line<br>next"), "<p>line<br>next</p>");
        let escaped = markdown_to_html(
            "line<br>next",
            &MarkdownOptions {
                allow_raw_html: false,
            },
        )
        .unwrap();
        assert_eq!(escaped, "<p>line&lt;br&gt;next</p>");
    }

    #[test]
    fn inline_strips_single_paragraph() {
        assert_eq!(inline("x = **3**"), "x = <strong>3</strong>");
        assert_eq!(inline("a\n\nb"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn gfm_table() {
        let out = html("| a | b |\n|---|---|\n| 1 | 2 |");
        assert_eq!(
            out,
            "<table><tr><th>a</th><th>b</th></tr><tr><td>1</td><td>2</td></tr></table>"
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(html(""), "");
    }
}
