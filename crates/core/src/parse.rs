//! Document tokenizer: Markdown text to a flat sequence of blocks.
//!
//! markdown-rs produces a nested mdast tree. The converter only cares about
//! block-level structure in document order, so the tree is lowered into
//! [`Block`] values: lists are flattened into one [`BlockKind::ListItem`] per
//! item (with its indentation), tables into header and row cells, and
//! image-only paragraphs into [`BlockKind::Image`] blocks.

use crate::{DeckError, SourceLocation};
use markdown::mdast::{self, Node};
use markdown::message::{Message, Place};

/// Parser options for building markdown-rs parse options.
#[derive(Clone, Copy, Debug)]
pub struct ParseOptions {
    /// Enable GitHub Flavored Markdown constructs (tables, strikethrough, ...).
    pub gfm: bool,
    /// Parse raw HTML (and so directive comments) as HTML nodes.
    pub raw_html: bool,
    /// Enable indented code blocks.
    pub code_indented: bool,
}

impl ParseOptions {
    /// Defaults for slide documents.
    pub const fn slides() -> Self {
        Self {
            gfm: true,
            raw_html: true,
            code_indented: false,
        }
    }

    /// Convert to markdown-rs `ParseOptions`.
    pub fn to_markdown(self) -> markdown::ParseOptions {
        let mut constructs = markdown::Constructs {
            // Frontmatter is split off before tokenizing.
            frontmatter: false,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            ..Default::default()
        };

        if self.gfm {
            constructs.gfm_autolink_literal = true;
            constructs.gfm_strikethrough = true;
            constructs.gfm_table = true;
            constructs.gfm_task_list_item = true;
        }

        markdown::ParseOptions {
            constructs,
            ..markdown::ParseOptions::default()
        }
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::slides()
    }
}

/// One block-level document node.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    /// What the block is, with its raw content.
    pub kind: BlockKind,
    /// Where the block starts.
    pub location: SourceLocation,
}

/// Block kinds the converter dispatches on.
#[derive(Debug, Clone, PartialEq)]
pub enum BlockKind {
    /// ATX or setext heading.
    Heading {
        /// Level 1-6.
        depth: u8,
        /// Plain heading text.
        text: String,
    },
    /// Paragraph text with soft line breaks kept as `\n` and inline HTML kept verbatim.
    Paragraph {
        /// Raw paragraph text.
        text: String,
    },
    /// One list item; nested lists follow as separate items.
    ListItem {
        /// Raw item text.
        text: String,
        /// Leading whitespace before the item marker.
        indent: usize,
        /// Ordered-list item.
        ordered: bool,
    },
    /// Table with a header row.
    Table {
        /// Header cells.
        headers: Vec<String>,
        /// Body rows as parsed; rows are not padded.
        rows: Vec<Vec<String>>,
    },
    /// Image.
    Image {
        /// Image target.
        url: String,
        /// Alt text.
        alt: String,
        /// Optional title.
        title: Option<String>,
    },
    /// Fenced or indented code.
    Code {
        /// Language tag.
        lang: Option<String>,
        /// Code body.
        value: String,
    },
    /// Blockquote, flattened to text.
    Blockquote {
        /// Quote text, one line per inner block.
        text: String,
    },
    /// Horizontal rule.
    ThematicBreak,
    /// Raw block-level HTML, including comments.
    Html {
        /// Raw HTML.
        value: String,
    },
}

/// Tokenizes Markdown into blocks.
pub fn tokenize(input: &str, options: &ParseOptions) -> Result<Vec<Block>, DeckError> {
    tokenize_at(input, options, 0)
}

/// Tokenizes Markdown that starts `line_offset` lines into a larger document.
pub fn tokenize_at(
    input: &str,
    options: &ParseOptions,
    line_offset: usize,
) -> Result<Vec<Block>, DeckError> {
    let tree = markdown::to_mdast(input, &options.to_markdown()).map_err(|err| {
        let location = message_location(&err);
        DeckError::parse_error(
            err.reason.clone(),
            location.line + line_offset,
            location.column,
        )
    })?;

    let mut lowering = Lowering {
        blocks: Vec::new(),
        line_offset,
    };
    lowering.node(&tree);
    Ok(lowering.blocks)
}

fn message_location(message: &Message) -> SourceLocation {
    match &message.place {
        Some(place) => match place.as_ref() {
            Place::Point(point) => SourceLocation::new(point.line, point.column),
            Place::Position(position) => {
                SourceLocation::new(position.start.line, position.start.column)
            }
        },
        None => SourceLocation::start(),
    }
}

struct Lowering {
    blocks: Vec<Block>,
    line_offset: usize,
}

impl Lowering {
    fn location(&self, node: &Node) -> SourceLocation {
        match node.position() {
            Some(position) => SourceLocation::new(
                position.start.line + self.line_offset,
                position.start.column,
            ),
            None => SourceLocation::start(),
        }
    }

    fn push(&mut self, node: &Node, kind: BlockKind) {
        let location = self.location(node);
        self.blocks.push(Block { kind, location });
    }

    fn node(&mut self, node: &Node) {
        match node {
            Node::Root(root) => {
                for child in &root.children {
                    self.node(child);
                }
            }
            Node::Heading(heading) => self.push(
                node,
                BlockKind::Heading {
                    depth: heading.depth,
                    text: inline_text(&heading.children).trim().to_string(),
                },
            ),
            Node::Paragraph(para) => self.paragraph(node, para),
            Node::List(list) => self.list(list, 0),
            Node::Table(table) => self.table(node, table),
            Node::Code(code) => self.push(
                node,
                BlockKind::Code {
                    lang: code.lang.clone(),
                    value: code.value.clone(),
                },
            ),
            Node::Blockquote(quote) => self.push(
                node,
                BlockKind::Blockquote {
                    text: block_text(&quote.children),
                },
            ),
            Node::ThematicBreak(_) => self.push(node, BlockKind::ThematicBreak),
            Node::Html(html) => self.push(
                node,
                BlockKind::Html {
                    value: html.value.clone(),
                },
            ),
            Node::Image(image) => self.image(node, image),
            Node::Definition(_) | Node::FootnoteDefinition(_) => {}
            _ => {
                log::debug!("Skipping markdown node without a slide role: {:?}", node);
            }
        }
    }

    /// Image-only paragraphs become image blocks; mixed paragraphs keep their
    /// text and emit the images after it.
    fn paragraph(&mut self, node: &Node, para: &mdast::Paragraph) {
        let text_children: Vec<Node> = para
            .children
            .iter()
            .filter(|child| !matches!(child, Node::Image(_)))
            .cloned()
            .collect();
        let text = inline_text(&text_children);
        if !text.trim().is_empty() {
            self.push(node, BlockKind::Paragraph { text });
        }

        for child in &para.children {
            if let Node::Image(image) = child {
                self.image(child, image);
            }
        }
    }

    fn image(&mut self, node: &Node, image: &mdast::Image) {
        self.push(
            node,
            BlockKind::Image {
                url: image.url.clone(),
                alt: image.alt.clone(),
                title: image.title.clone(),
            },
        );
    }

    fn list(&mut self, list: &mdast::List, depth: usize) {
        for child in &list.children {
            if let Node::ListItem(item) = child {
                self.list_item(child, item, list.ordered, depth);
            }
        }
    }

    fn list_item(&mut self, node: &Node, item: &mdast::ListItem, ordered: bool, depth: usize) {
        let text = item
            .children
            .iter()
            .filter_map(|child| match child {
                Node::Paragraph(para) => Some(inline_text(&para.children)),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ");

        let indent = match node.position() {
            Some(position) => position.start.column.saturating_sub(1),
            None => depth * 2,
        };

        self.push(
            node,
            BlockKind::ListItem {
                text,
                indent,
                ordered,
            },
        );

        for child in &item.children {
            match child {
                Node::Paragraph(_) => {}
                Node::List(nested) => self.list(nested, depth + 1),
                other => self.node(other),
            }
        }
    }

    fn table(&mut self, node: &Node, table: &mdast::Table) {
        let mut rows = table.children.iter().filter_map(|row| match row {
            Node::TableRow(row) => Some(
                row.children
                    .iter()
                    .map(|cell| match cell {
                        Node::TableCell(cell) => inline_text(&cell.children).trim().to_string(),
                        _ => String::new(),
                    })
                    .collect::<Vec<_>>(),
            ),
            _ => None,
        });

        let headers = rows.next().unwrap_or_default();
        let rows = rows.collect();
        self.push(node, BlockKind::Table { headers, rows });
    }
}

/// Concatenates the text of inline nodes, keeping inline HTML verbatim and
/// hard breaks as newlines.
pub fn inline_text(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        collect_inline(node, &mut text);
    }
    text
}

fn collect_inline(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Html(html) => buffer.push_str(&html.value),
        Node::Break(_) => buffer.push('\n'),
        Node::Image(image) => buffer.push_str(&image.alt),
        Node::Strong(strong) => {
            for child in &strong.children {
                collect_inline(child, buffer);
            }
        }
        Node::Emphasis(emphasis) => {
            for child in &emphasis.children {
                collect_inline(child, buffer);
            }
        }
        Node::Link(link) => {
            for child in &link.children {
                collect_inline(child, buffer);
            }
        }
        Node::LinkReference(link) => {
            for child in &link.children {
                collect_inline(child, buffer);
            }
        }
        Node::Delete(del) => {
            for child in &del.children {
                collect_inline(child, buffer);
            }
        }
        _ => {}
    }
}

/// Flattens block children (paragraphs, lists, code) to text, one line per block.
fn block_text(nodes: &[Node]) -> String {
    let mut lines = Vec::new();
    for node in nodes {
        match node {
            Node::Paragraph(para) => lines.push(inline_text(&para.children)),
            Node::Heading(heading) => lines.push(inline_text(&heading.children)),
            Node::Code(code) => lines.push(code.value.clone()),
            Node::Html(html) => lines.push(html.value.clone()),
            Node::List(list) => {
                for item in &list.children {
                    if let Node::ListItem(item) = item {
                        lines.push(block_text(&item.children));
                    }
                }
            }
            Node::Blockquote(quote) => lines.push(block_text(&quote.children)),
            _ => {}
        }
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<BlockKind> {
        tokenize(input, &ParseOptions::default())
            .expect("tokenize should succeed")
            .into_iter()
            .map(|block| block.kind)
            .collect()
    }

    #[test]
    fn headings_and_paragraphs() {
        let blocks = kinds("# Title\n\nSome *emphasis* here.\n\n### Sub");
        assert_eq!(
            blocks,
            vec![
                BlockKind::Heading {
                    depth: 1,
                    text: "Title".to_string()
                },
                BlockKind::Paragraph {
                    text: "Some emphasis here.".to_string()
                },
                BlockKind::Heading {
                    depth: 3,
                    text: "Sub".to_string()
                },
            ]
        );
    }

    #[test]
    fn soft_breaks_survive_in_paragraph_text() {
        let blocks = kinds("Month,Sales\nJan,100\nFeb,120");
        assert_eq!(
            blocks,
            vec![BlockKind::Paragraph {
                text: "Month,Sales\nJan,100\nFeb,120".to_string()
            }]
        );
    }

    #[test]
    fn nested_lists_flatten_with_indent() {
        let blocks = kinds("- one\n  - two\n    - three\n- four");
        let items: Vec<(String, usize)> = blocks
            .into_iter()
            .filter_map(|kind| match kind {
                BlockKind::ListItem { text, indent, .. } => Some((text, indent)),
                _ => None,
            })
            .collect();
        assert_eq!(
            items,
            vec![
                ("one".to_string(), 0),
                ("two".to_string(), 2),
                ("three".to_string(), 4),
                ("four".to_string(), 0),
            ]
        );
    }

    #[test]
    fn ordered_items_are_marked() {
        let blocks = kinds("1. first\n2. second");
        assert!(matches!(
            &blocks[0],
            BlockKind::ListItem { ordered: true, .. }
        ));
    }

    #[test]
    fn tables_split_header_and_rows() {
        let blocks = kinds("| Month | Sales |\n| --- | --- |\n| Jan | 100 |\n| Feb | 120 |");
        assert_eq!(
            blocks,
            vec![BlockKind::Table {
                headers: vec!["Month".to_string(), "Sales".to_string()],
                rows: vec![
                    vec!["Jan".to_string(), "100".to_string()],
                    vec!["Feb".to_string(), "120".to_string()],
                ],
            }]
        );
    }

    #[test]
    fn image_only_paragraph_becomes_image() {
        let blocks = kinds("![Chart](img/chart.png \"Q1\")");
        assert_eq!(
            blocks,
            vec![BlockKind::Image {
                url: "img/chart.png".to_string(),
                alt: "Chart".to_string(),
                title: Some("Q1".to_string()),
            }]
        );
    }

    #[test]
    fn code_quote_rule_and_html() {
        let blocks = kinds("```csv\na,b\n```\n\n> Quoted\n> text\n\n---\n\n<!-- notes: hi -->");
        assert_eq!(
            blocks,
            vec![
                BlockKind::Code {
                    lang: Some("csv".to_string()),
                    value: "a,b".to_string()
                },
                BlockKind::Blockquote {
                    text: "Quoted\ntext".to_string()
                },
                BlockKind::ThematicBreak,
                BlockKind::Html {
                    value: "<!-- notes: hi -->".to_string()
                },
            ]
        );
    }

    #[test]
    fn comment_after_list_closes_the_list() {
        let blocks = kinds("- a\n- b\n<!-- notes: remember X -->");
        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[2],
            BlockKind::Html {
                value: "<!-- notes: remember X -->".to_string()
            }
        );
    }

    #[test]
    fn locations_include_line_offset() {
        let blocks = tokenize_at("# A\n\ntext", &ParseOptions::default(), 4).unwrap();
        assert_eq!(blocks[0].location, SourceLocation::new(5, 1));
        assert_eq!(blocks[1].location, SourceLocation::new(7, 1));
    }
}
