//! Markdown bodies converted into the block tree
//!
//! Older post records store their body as a markdown string instead of a
//! block array. The markdown is parsed with pulldown-cmark and folded into
//! the same `ContentBlock` tree so the rest of the pipeline sees one shape.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};

use super::blocks::{ContentBlock, InlineNode, List, ListFormat, ListItem, TextRun};
use crate::helpers::is_safe_link;

/// Formatting marks active at a point in the event stream
#[derive(Debug, Clone, Copy, Default)]
struct Marks {
    bold: bool,
    italic: bool,
    strikethrough: bool,
}

#[derive(Debug)]
enum Frame {
    Heading { level: u8, inlines: Vec<InlineNode> },
    Paragraph { inlines: Vec<InlineNode> },
    List(List),
    Item { inlines: Vec<InlineNode>, nested: Vec<List> },
    Quote { inlines: Vec<InlineNode> },
    Code { language: Option<String>, text: String },
    Link { url: String, children: Vec<InlineNode> },
    Image { url: String, alt: String },
    Strong,
    Emphasis,
    Strikethrough,
    Other,
}

/// Parse a markdown document into blocks
pub fn parse_blocks(markdown: &str) -> Vec<ContentBlock> {
    let options = Options::ENABLE_STRIKETHROUGH;
    let mut builder = Builder::default();

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(tag) => builder.open(tag),
            Event::End(_) => builder.close(),
            Event::Text(text) => builder.text(&text, false),
            Event::Code(text) => builder.text(&text, true),
            Event::Html(html) | Event::InlineHtml(html) => {
                let text = strip_tags(&html);
                if !text.trim().is_empty() {
                    builder.text(&text, false);
                }
            }
            Event::SoftBreak => builder.text(" ", false),
            Event::HardBreak => builder.text("\n", false),
            _ => {}
        }
    }

    builder.blocks
}

#[derive(Default)]
struct Builder {
    stack: Vec<Frame>,
    blocks: Vec<ContentBlock>,
    /// Images found inside paragraphs, emitted after the enclosing block
    hoisted: Vec<ContentBlock>,
}

impl Builder {
    fn open(&mut self, tag: Tag<'_>) {
        let frame = match tag {
            Tag::Heading { level, .. } => Frame::Heading {
                level: heading_level(level),
                inlines: Vec::new(),
            },
            Tag::Paragraph | Tag::HtmlBlock => Frame::Paragraph {
                inlines: Vec::new(),
            },
            Tag::List(start) => Frame::List(List {
                format: if start.is_some() {
                    ListFormat::Ordered
                } else {
                    ListFormat::Unordered
                },
                items: Vec::new(),
            }),
            Tag::Item => Frame::Item {
                inlines: Vec::new(),
                nested: Vec::new(),
            },
            Tag::BlockQuote(_) => Frame::Quote {
                inlines: Vec::new(),
            },
            Tag::CodeBlock(kind) => Frame::Code {
                language: match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                },
                text: String::new(),
            },
            Tag::Link { dest_url, .. } => Frame::Link {
                url: dest_url.to_string(),
                children: Vec::new(),
            },
            Tag::Image { dest_url, .. } => Frame::Image {
                url: dest_url.to_string(),
                alt: String::new(),
            },
            Tag::Strong => Frame::Strong,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strikethrough => Frame::Strikethrough,
            _ => Frame::Other,
        };
        self.stack.push(frame);
    }

    fn marks(&self) -> Marks {
        let mut marks = Marks::default();
        for frame in &self.stack {
            match frame {
                Frame::Strong => marks.bold = true,
                Frame::Emphasis => marks.italic = true,
                Frame::Strikethrough => marks.strikethrough = true,
                _ => {}
            }
        }
        marks
    }

    fn text(&mut self, text: &str, code: bool) {
        let marks = self.marks();
        let node = InlineNode::Text(TextRun {
            text: text.to_string(),
            bold: marks.bold,
            italic: marks.italic,
            strikethrough: marks.strikethrough,
            code,
            ..Default::default()
        });

        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Code { text: buf, .. } => {
                    buf.push_str(text);
                    return;
                }
                Frame::Image { alt, .. } => {
                    alt.push_str(text);
                    return;
                }
                Frame::Link { children, .. } => {
                    children.push(node);
                    return;
                }
                Frame::Heading { inlines, .. }
                | Frame::Paragraph { inlines }
                | Frame::Item { inlines, .. }
                | Frame::Quote { inlines } => {
                    inlines.push(node);
                    return;
                }
                _ => {}
            }
        }

        // Text outside any block, e.g. a bare HTML block
        self.emit(ContentBlock::Paragraph {
            children: vec![node],
        });
    }

    /// Append inline nodes to the innermost frame that holds inline content
    fn push_inlines(&mut self, nodes: Vec<InlineNode>) -> bool {
        for frame in self.stack.iter_mut().rev() {
            match frame {
                Frame::Link { children, .. } => {
                    children.extend(nodes);
                    return true;
                }
                Frame::Heading { inlines, .. }
                | Frame::Paragraph { inlines }
                | Frame::Item { inlines, .. } => {
                    inlines.extend(nodes);
                    return true;
                }
                Frame::Quote { inlines } => {
                    if !inlines.is_empty() && !nodes.is_empty() {
                        inlines.push(InlineNode::text("\n"));
                    }
                    inlines.extend(nodes);
                    return true;
                }
                _ => {}
            }
        }
        false
    }

    fn close(&mut self) {
        let Some(frame) = self.stack.pop() else {
            return;
        };

        match frame {
            Frame::Heading { level, inlines } => {
                if !self.push_inlines(inlines.clone()) {
                    self.emit(ContentBlock::Heading {
                        level,
                        children: inlines,
                    });
                }
            }
            Frame::Paragraph { inlines } => {
                if self.push_inlines(inlines.clone()) {
                    return;
                }
                if inlines.is_empty() {
                    // Image-only paragraph: only the hoisted images remain
                    if self.stack.is_empty() {
                        self.blocks.append(&mut self.hoisted);
                    }
                } else {
                    self.emit(ContentBlock::Paragraph { children: inlines });
                }
            }
            Frame::Quote { inlines } => {
                if !self.push_inlines(inlines.clone()) {
                    self.emit(ContentBlock::Quote { children: inlines });
                }
            }
            Frame::Code { language, text } => {
                let text = text.trim_end_matches('\n').to_string();
                let run = InlineNode::Text(TextRun {
                    text: text.clone(),
                    code: true,
                    ..Default::default()
                });
                if !self.push_inlines(vec![run]) {
                    self.emit(ContentBlock::Code {
                        language,
                        children: vec![InlineNode::text(text)],
                    });
                }
            }
            Frame::Link { url, children } if !is_safe_link(&url) => {
                tracing::debug!("Dropping link with disallowed target {:?}", url);
                self.push_inlines(children);
            }
            Frame::Link { url, children } => {
                self.push_inlines(vec![InlineNode::Link { url, children }]);
            }
            Frame::Image { url, alt } => {
                let image = ContentBlock::Image {
                    url,
                    alt: if alt.is_empty() { None } else { Some(alt) },
                };
                if self.stack.is_empty() {
                    self.emit(image);
                } else {
                    self.hoisted.push(image);
                }
            }
            Frame::Item { inlines, nested } => {
                if let Some(Frame::List(list)) = self.stack.last_mut() {
                    list.items.push(ListItem::Entry(inlines));
                    list.items.extend(nested.into_iter().map(ListItem::Nested));
                }
            }
            Frame::List(list) => match self.stack.last_mut() {
                Some(Frame::Item { nested, .. }) => nested.push(list),
                Some(Frame::List(parent)) => parent.items.push(ListItem::Nested(list)),
                Some(_) => {
                    // Lists inside quotes keep their text, one line per entry
                    for item in list.items {
                        if let ListItem::Entry(inlines) = item {
                            self.push_inlines(inlines);
                        }
                    }
                }
                None => self.emit(ContentBlock::List(list)),
            },
            Frame::Strong | Frame::Emphasis | Frame::Strikethrough | Frame::Other => {}
        }
    }

    /// Emit a top-level block, followed by any images hoisted out of it
    fn emit(&mut self, block: ContentBlock) {
        if !self.stack.is_empty() {
            return;
        }
        self.blocks.push(block);
        self.blocks.append(&mut self.hoisted);
    }
}

/// Text content of an HTML fragment with every tag removed
fn strip_tags(html: &str) -> String {
    let mut text = String::with_capacity(html.len());
    let mut in_tag = false;
    for c in html.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            _ if !in_tag => text.push(c),
            _ => {}
        }
    }
    text
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}
