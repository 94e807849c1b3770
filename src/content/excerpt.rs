//! Plain-text excerpts of post bodies

use super::blocks::{inline_text, ContentBlock, List, ListItem};

/// Marker appended when an excerpt is cut short
pub const ELLIPSIS: &str = "...";

/// Default excerpt length in characters
pub const DEFAULT_EXCERPT_LENGTH: usize = 150;

fn push_list_lines(list: &List, lines: &mut Vec<String>) {
    for item in &list.items {
        match item {
            ListItem::Entry(children) => lines.push(inline_text(children)),
            ListItem::Nested(nested) => push_list_lines(nested, lines),
            ListItem::Unknown { .. } => {}
        }
    }
}

/// Text of every paragraph-like block, one line per block
pub fn plain_text(blocks: &[ContentBlock]) -> String {
    let mut lines = Vec::new();
    for block in blocks {
        match block {
            ContentBlock::Heading { children, .. }
            | ContentBlock::Paragraph { children }
            | ContentBlock::Quote { children } => lines.push(inline_text(children)),
            ContentBlock::List(list) => push_list_lines(list, &mut lines),
            ContentBlock::Code { .. } | ContentBlock::Image { .. } | ContentBlock::Unknown { .. } => {}
        }
    }
    lines.join("\n")
}

/// Flatten a body to text, cut to `max_length` characters plus an ellipsis
pub fn excerpt(blocks: &[ContentBlock], max_length: usize) -> String {
    let text = plain_text(blocks);
    if text.chars().count() <= max_length {
        text
    } else {
        let truncated: String = text.chars().take(max_length).collect();
        format!("{}{}", truncated, ELLIPSIS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::blocks::{InlineNode, ListFormat};

    fn paragraph(text: &str) -> ContentBlock {
        ContentBlock::Paragraph {
            children: vec![InlineNode::text(text)],
        }
    }

    #[test]
    fn test_empty() {
        assert_eq!(excerpt(&[], 150), "");
        assert_eq!(excerpt(&[], 0), "");
    }

    #[test]
    fn test_joins_blocks_with_newlines() {
        let blocks = vec![
            ContentBlock::Heading {
                level: 2,
                children: vec![InlineNode::text("Title")],
            },
            paragraph("Body "),
            ContentBlock::Code {
                language: None,
                children: vec![InlineNode::text("let x = 1;")],
            },
            ContentBlock::Image {
                url: "/a.png".into(),
                alt: None,
            },
            ContentBlock::Unknown {
                kind: "embed".into(),
            },
        ];
        assert_eq!(excerpt(&blocks, 150), "Title\nBody ");
    }

    #[test]
    fn test_link_and_list_text() {
        let blocks = vec![
            ContentBlock::Paragraph {
                children: vec![
                    InlineNode::text("Read "),
                    InlineNode::Link {
                        url: "https://example.com".into(),
                        children: vec![InlineNode::text("this")],
                    },
                ],
            },
            ContentBlock::List(List {
                format: ListFormat::Unordered,
                items: vec![
                    ListItem::Entry(vec![InlineNode::text("a")]),
                    ListItem::Nested(List {
                        format: ListFormat::Ordered,
                        items: vec![ListItem::Entry(vec![InlineNode::text("b")])],
                    }),
                ],
            }),
        ];
        assert_eq!(plain_text(&blocks), "Read this\na\nb");
    }

    #[test]
    fn test_truncation_law() {
        let long = "x".repeat(400);
        let blocks = vec![paragraph(&long), paragraph("tail")];
        for n in [0, 1, 10, 150, 399, 404, 405, 1000] {
            let out = excerpt(&blocks, n);
            assert!(out.chars().count() <= n + ELLIPSIS.len());
        }
        assert_eq!(excerpt(&blocks, 5), "xxxxx...");
        // exactly at the limit is not truncated
        assert_eq!(excerpt(&[paragraph("abc")], 3), "abc");
    }

    #[test]
    fn test_truncates_by_characters() {
        let blocks = vec![paragraph("無人機の飛行テスト")];
        assert_eq!(excerpt(&blocks, 3), "無人機...");
    }
}
