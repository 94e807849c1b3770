//! Rich content renderer
//!
//! Maps the block tree of a post body onto presentation nodes, one per
//! block, depth-first in document order. The mapping is total: a block or
//! inline node with an unrecognized tag becomes an `Unsupported` placeholder
//! instead of an error.

mod html;

pub use html::{to_html, HtmlRenderer};

use crate::content::{ContentBlock, InlineNode, List, ListFormat, ListItem, TextRun};

/// Visual weight of a heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadingStyle {
    /// Level 1 and anything outside 2..=4
    Default,
    Section,
    Subsection,
    Minor,
}

impl HeadingStyle {
    pub fn from_level(level: u8) -> Self {
        match level {
            2 => HeadingStyle::Section,
            3 => HeadingStyle::Subsection,
            4 => HeadingStyle::Minor,
            _ => HeadingStyle::Default,
        }
    }

    /// HTML element used for this style
    pub fn tag(&self) -> &'static str {
        match self {
            HeadingStyle::Default => "h1",
            HeadingStyle::Section => "h2",
            HeadingStyle::Subsection => "h3",
            HeadingStyle::Minor => "h4",
        }
    }

    pub fn class(&self) -> &'static str {
        match self {
            HeadingStyle::Default => "heading",
            HeadingStyle::Section => "heading-section",
            HeadingStyle::Subsection => "heading-subsection",
            HeadingStyle::Minor => "heading-minor",
        }
    }
}

/// A rendered block
#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    Heading {
        style: HeadingStyle,
        children: Vec<Inline>,
    },
    Paragraph {
        children: Vec<Inline>,
    },
    List {
        ordered: bool,
        items: Vec<Entry>,
    },
    Quote {
        children: Vec<Inline>,
    },
    Code {
        language: Option<String>,
        text: String,
    },
    Figure {
        url: String,
        alt: String,
    },
    /// Placeholder for a block the renderer has no mapping for
    Unsupported {
        kind: String,
    },
}

/// A rendered list entry
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    Item(Vec<Inline>),
    Nested { ordered: bool, items: Vec<Entry> },
    Unsupported { kind: String },
}

/// Rendered inline content
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(TextRun),
    /// External link, opened in a new browsing context
    Anchor {
        url: String,
        children: Vec<Inline>,
    },
    Unsupported {
        kind: String,
    },
}

fn render_inlines(nodes: &[InlineNode]) -> Vec<Inline> {
    nodes.iter().map(render_inline).collect()
}

fn render_inline(node: &InlineNode) -> Inline {
    match node {
        InlineNode::Text(run) => Inline::Text(run.clone()),
        InlineNode::Link { url, children } => Inline::Anchor {
            url: url.clone(),
            children: render_inlines(children),
        },
        InlineNode::Unknown { kind } => Inline::Unsupported { kind: kind.clone() },
    }
}

fn render_entries(list: &List) -> Vec<Entry> {
    list.items
        .iter()
        .map(|item| match item {
            ListItem::Entry(children) => Entry::Item(render_inlines(children)),
            ListItem::Nested(nested) => Entry::Nested {
                ordered: nested.format == ListFormat::Ordered,
                items: render_entries(nested),
            },
            ListItem::Unknown { kind } => Entry::Unsupported { kind: kind.clone() },
        })
        .collect()
}

/// Map one block to its presentation node
pub fn render_block(block: &ContentBlock) -> Presentation {
    match block {
        ContentBlock::Heading { level, children } => Presentation::Heading {
            style: HeadingStyle::from_level(*level),
            children: render_inlines(children),
        },
        ContentBlock::Paragraph { children } => Presentation::Paragraph {
            children: render_inlines(children),
        },
        ContentBlock::List(list) => Presentation::List {
            ordered: list.format == ListFormat::Ordered,
            items: render_entries(list),
        },
        ContentBlock::Quote { children } => Presentation::Quote {
            children: render_inlines(children),
        },
        ContentBlock::Code { language, children } => Presentation::Code {
            language: language.clone(),
            text: crate::content::blocks::inline_text(children),
        },
        ContentBlock::Image { url, alt } => Presentation::Figure {
            url: url.clone(),
            alt: alt.clone().unwrap_or_default(),
        },
        ContentBlock::Unknown { kind } => {
            tracing::debug!("No renderer for block type {:?}", kind);
            Presentation::Unsupported { kind: kind.clone() }
        }
    }
}

/// Map a whole body, preserving block order
pub fn render_blocks(blocks: &[ContentBlock]) -> Vec<Presentation> {
    blocks.iter().map(render_block).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_levels() {
        let heading = |level| ContentBlock::Heading {
            level,
            children: vec![InlineNode::text("Title")],
        };

        let styles: Vec<HeadingStyle> = [1, 2, 3, 4, 5, 6, 99]
            .into_iter()
            .map(|level| match render_block(&heading(level)) {
                Presentation::Heading { style, .. } => style,
                other => panic!("unexpected {:?}", other),
            })
            .collect();

        assert_eq!(
            styles,
            vec![
                HeadingStyle::Default,
                HeadingStyle::Section,
                HeadingStyle::Subsection,
                HeadingStyle::Minor,
                HeadingStyle::Default,
                HeadingStyle::Default,
                HeadingStyle::Default,
            ]
        );
    }

    #[test]
    fn test_one_node_per_block() {
        let blocks = vec![
            ContentBlock::Paragraph {
                children: vec![InlineNode::text("a")],
            },
            ContentBlock::Unknown {
                kind: "embed".into(),
            },
            ContentBlock::Image {
                url: "/uploads/a.png".into(),
                alt: None,
            },
            ContentBlock::Code {
                language: Some("rust".into()),
                children: vec![InlineNode::text("fn main() {}")],
            },
        ];

        let rendered = render_blocks(&blocks);
        assert_eq!(rendered.len(), 4);
        assert_eq!(
            rendered[1],
            Presentation::Unsupported {
                kind: "embed".into()
            }
        );
        assert_eq!(
            rendered[2],
            Presentation::Figure {
                url: "/uploads/a.png".into(),
                alt: String::new()
            }
        );
        assert_eq!(
            rendered[3],
            Presentation::Code {
                language: Some("rust".into()),
                text: "fn main() {}".into()
            }
        );
    }

    #[test]
    fn test_nested_list_and_unknown_inline() {
        let list = ContentBlock::List(List {
            format: ListFormat::Unordered,
            items: vec![
                ListItem::Entry(vec![InlineNode::Unknown {
                    kind: "mention".into(),
                }]),
                ListItem::Nested(List {
                    format: ListFormat::Ordered,
                    items: vec![ListItem::Entry(vec![InlineNode::text("inner")])],
                }),
            ],
        });

        match render_block(&list) {
            Presentation::List { ordered, items } => {
                assert!(!ordered);
                assert_eq!(
                    items[0],
                    Entry::Item(vec![Inline::Unsupported {
                        kind: "mention".into()
                    }])
                );
                assert!(matches!(items[1], Entry::Nested { ordered: true, .. }));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_totality_on_decoded_json() {
        let value = serde_json::json!([
            { "type": "heading", "level": 99, "children": [{ "type": "text", "text": "x" }] },
            { "type": "table", "rows": [] },
            { "weird": true },
            { "type": "paragraph", "children": [{ "type": "emoji", "code": ":)" }] }
        ]);
        let blocks: Vec<ContentBlock> = serde_json::from_value(value).unwrap();
        let rendered = render_blocks(&blocks);
        assert_eq!(rendered.len(), 4);
        assert!(matches!(rendered[1], Presentation::Unsupported { .. }));
        assert!(matches!(rendered[2], Presentation::Unsupported { .. }));
    }

    #[test]
    fn test_every_block_type_in_one_document() {
        let value = serde_json::json!([
            { "type": "heading", "level": 2, "children": [{ "type": "text", "text": "Intro" }] },
            { "type": "paragraph", "children": [
                { "type": "text", "text": "Read " },
                { "type": "link", "url": "https://example.com", "children": [{ "type": "text", "text": "more" }] }
            ]},
            { "type": "list", "format": "ordered", "children": [
                { "type": "list-item", "children": [{ "type": "text", "text": "first" }] },
                { "type": "list", "format": "unordered", "children": [
                    { "type": "list-item", "children": [{ "type": "text", "text": "inner" }] }
                ]}
            ]},
            { "type": "quote", "children": [{ "type": "text", "text": "Fly safe" }] },
            { "type": "code", "children": [{ "type": "text", "text": "let x = 1;" }] },
            { "type": "image", "image": { "url": "/uploads/drone.png", "alternativeText": "Drone" } },
            { "type": "carousel", "slides": [] }
        ]);
        let blocks: Vec<ContentBlock> = serde_json::from_value(value).unwrap();
        let rendered = render_blocks(&blocks);
        assert_eq!(rendered.len(), blocks.len());
        assert!(matches!(rendered[0], Presentation::Heading { style: HeadingStyle::Section, .. }));
        assert!(matches!(rendered[1], Presentation::Paragraph { .. }));
        assert!(matches!(rendered[2], Presentation::List { ordered: true, .. }));
        assert!(matches!(rendered[3], Presentation::Quote { .. }));
        assert!(matches!(rendered[4], Presentation::Code { .. }));
        assert!(matches!(rendered[5], Presentation::Figure { .. }));
        assert!(matches!(rendered[6], Presentation::Unsupported { .. }));

        let html = to_html(&rendered);
        for fragment in [
            "<h2 class=\"heading-section\">Intro</h2>",
            "<a href=\"https://example.com\"",
            "<ol><li>first</li><li><ul><li>inner</li></ul>",
            "<blockquote>Fly safe</blockquote>",
            "<pre><code>let x = 1;</code></pre>",
            "<img src=\"/uploads/drone.png\" alt=\"Drone\"",
            "[Unsupported block: carousel]",
        ] {
            assert!(html.contains(fragment), "missing {:?} in {}", fragment, html);
        }
    }
}
