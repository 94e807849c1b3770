//! Rich-text block tree
//!
//! Post bodies arrive as a JSON array of typed nodes (`heading`, `paragraph`,
//! `list`, `quote`, `code`, `image`) whose children are inline nodes (`text`,
//! `link`). Decoding never fails on an unfamiliar node: anything that does not
//! match a known shape becomes an `Unknown` variant carrying its tag.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// A top-level block in a post body
#[derive(Debug, Clone, PartialEq)]
pub enum ContentBlock {
    Heading { level: u8, children: Vec<InlineNode> },
    Paragraph { children: Vec<InlineNode> },
    List(List),
    Quote { children: Vec<InlineNode> },
    Code { language: Option<String>, children: Vec<InlineNode> },
    Image { url: String, alt: Option<String> },
    /// A block whose tag (or shape) is not recognized
    Unknown { kind: String },
}

/// List format discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListFormat {
    Ordered,
    Unordered,
}

/// An ordered or unordered list
#[derive(Debug, Clone, PartialEq)]
pub struct List {
    pub format: ListFormat,
    pub items: Vec<ListItem>,
}

/// A child of a list: an entry with inline content, or a nested list
#[derive(Debug, Clone, PartialEq)]
pub enum ListItem {
    Entry(Vec<InlineNode>),
    Nested(List),
    Unknown { kind: String },
}

/// Inline content inside a block
#[derive(Debug, Clone, PartialEq)]
pub enum InlineNode {
    Text(TextRun),
    Link { url: String, children: Vec<InlineNode> },
    Unknown { kind: String },
}

/// A run of text with formatting marks
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct TextRun {
    pub text: String,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub code: bool,
}

impl TextRun {
    /// Plain text with no marks
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }
}

impl InlineNode {
    /// Shorthand for an unformatted text node
    pub fn text(text: impl Into<String>) -> Self {
        InlineNode::Text(TextRun::plain(text))
    }

    /// Concatenated text of this node and its descendants
    pub fn plain_text(&self) -> String {
        match self {
            InlineNode::Text(run) => run.text.clone(),
            InlineNode::Link { children, .. } => inline_text(children),
            InlineNode::Unknown { .. } => String::new(),
        }
    }
}

/// Concatenate the text of a run of inline nodes
pub fn inline_text(nodes: &[InlineNode]) -> String {
    nodes.iter().map(InlineNode::plain_text).collect()
}

fn kind_of(value: &Value) -> String {
    value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or("unknown")
        .to_string()
}

fn children_of(value: &Value) -> &[Value] {
    value
        .get("children")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn inlines_of(value: &Value) -> Vec<InlineNode> {
    children_of(value).iter().map(InlineNode::from_value).collect()
}

impl InlineNode {
    /// Decode a single inline node; unrecognized shapes become `Unknown`
    pub fn from_value(value: &Value) -> Self {
        let kind = kind_of(value);
        match kind.as_str() {
            "text" => match TextRun::deserialize(value) {
                Ok(run) => InlineNode::Text(run),
                Err(_) => InlineNode::Unknown { kind },
            },
            "link" => match value.get("url").and_then(Value::as_str) {
                Some(url) => InlineNode::Link {
                    url: url.to_string(),
                    children: inlines_of(value),
                },
                None => InlineNode::Unknown { kind },
            },
            _ => InlineNode::Unknown { kind },
        }
    }
}

impl List {
    fn from_value(value: &Value) -> Self {
        let format = match value.get("format").and_then(Value::as_str) {
            Some("ordered") => ListFormat::Ordered,
            _ => ListFormat::Unordered,
        };
        let items = children_of(value)
            .iter()
            .map(|child| {
                let kind = kind_of(child);
                match kind.as_str() {
                    "list-item" => ListItem::Entry(inlines_of(child)),
                    "list" => ListItem::Nested(List::from_value(child)),
                    _ => ListItem::Unknown { kind },
                }
            })
            .collect();
        Self { format, items }
    }
}

impl ContentBlock {
    /// Decode a single block; unrecognized shapes become `Unknown`
    pub fn from_value(value: &Value) -> Self {
        let kind = kind_of(value);
        match kind.as_str() {
            "heading" => {
                let level = value
                    .get("level")
                    .and_then(Value::as_u64)
                    .unwrap_or(1)
                    .min(u64::from(u8::MAX)) as u8;
                ContentBlock::Heading {
                    level,
                    children: inlines_of(value),
                }
            }
            "paragraph" => ContentBlock::Paragraph {
                children: inlines_of(value),
            },
            "list" => ContentBlock::List(List::from_value(value)),
            "quote" => ContentBlock::Quote {
                children: inlines_of(value),
            },
            "code" => ContentBlock::Code {
                language: value
                    .get("language")
                    .and_then(Value::as_str)
                    .filter(|l| !l.is_empty())
                    .map(str::to_string),
                children: inlines_of(value),
            },
            "image" => {
                let image = value.get("image");
                match image.and_then(|i| i.get("url")).and_then(Value::as_str) {
                    Some(url) => ContentBlock::Image {
                        url: url.to_string(),
                        alt: image
                            .and_then(|i| i.get("alternativeText"))
                            .and_then(Value::as_str)
                            .map(str::to_string),
                    },
                    None => ContentBlock::Unknown { kind },
                }
            }
            _ => ContentBlock::Unknown { kind },
        }
    }

    /// Tag name of this block as it appears on the wire
    pub fn kind(&self) -> &str {
        match self {
            ContentBlock::Heading { .. } => "heading",
            ContentBlock::Paragraph { .. } => "paragraph",
            ContentBlock::List(_) => "list",
            ContentBlock::Quote { .. } => "quote",
            ContentBlock::Code { .. } => "code",
            ContentBlock::Image { .. } => "image",
            ContentBlock::Unknown { kind } => kind,
        }
    }
}

impl<'de> Deserialize<'de> for ContentBlock {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(ContentBlock::from_value(&value))
    }
}

impl<'de> Deserialize<'de> for InlineNode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(InlineNode::from_value(&value))
    }
}
