//! HTML output for presentation nodes

use std::fmt::Write;

use url::Url;

use super::{Entry, Inline, Presentation};
use crate::content::TextRun;
use crate::helpers::{asset_url, html_escape, is_safe_link};

/// Render presentation nodes with media URLs left as they are
pub fn to_html(nodes: &[Presentation]) -> String {
    HtmlRenderer::default().render(nodes)
}

/// Writes presentation nodes as HTML
///
/// Relative figure URLs are resolved against `media_origin` when one is set.
#[derive(Debug, Clone, Default)]
pub struct HtmlRenderer {
    media_origin: Option<Url>,
}

impl HtmlRenderer {
    pub fn new(media_origin: Option<Url>) -> Self {
        Self { media_origin }
    }

    pub fn render(&self, nodes: &[Presentation]) -> String {
        let mut html = String::new();
        for node in nodes {
            self.write_block(&mut html, node);
        }
        html
    }

    /// Render nodes inside the article body wrapper
    pub fn render_document(&self, nodes: &[Presentation]) -> String {
        format!("<div class=\"prose\">\n{}</div>", self.render(nodes))
    }

    fn write_block(&self, html: &mut String, node: &Presentation) {
        match node {
            Presentation::Heading { style, children } => {
                let tag = style.tag();
                let _ = write!(html, "<{} class=\"{}\">", tag, style.class());
                write_inlines(html, children);
                let _ = writeln!(html, "</{}>", tag);
            }
            Presentation::Paragraph { children } => {
                html.push_str("<p>");
                write_inlines(html, children);
                html.push_str("</p>\n");
            }
            Presentation::List { ordered, items } => write_list(html, *ordered, items),
            Presentation::Quote { children } => {
                html.push_str("<blockquote>");
                write_inlines(html, children);
                html.push_str("</blockquote>\n");
            }
            Presentation::Code { language, text } => {
                match language {
                    Some(lang) => {
                        let _ = write!(html, "<pre><code class=\"language-{}\">", html_escape(lang));
                    }
                    None => html.push_str("<pre><code>"),
                }
                html.push_str(&html_escape(text));
                html.push_str("</code></pre>\n");
            }
            Presentation::Figure { url, alt } => {
                let src = match &self.media_origin {
                    Some(origin) => asset_url(origin, url),
                    None => url.clone(),
                };
                let _ = writeln!(
                    html,
                    "<figure><img src=\"{}\" alt=\"{}\" loading=\"lazy\"></figure>",
                    html_escape(&src),
                    html_escape(alt)
                );
            }
            Presentation::Unsupported { kind } => {
                let _ = writeln!(
                    html,
                    "<div class=\"unsupported-block\">[Unsupported block: {}]</div>",
                    html_escape(kind)
                );
            }
        }
    }
}

fn write_list(html: &mut String, ordered: bool, items: &[Entry]) {
    let tag = if ordered { "ol" } else { "ul" };
    let _ = write!(html, "<{}>", tag);
    for item in items {
        match item {
            Entry::Item(children) => {
                html.push_str("<li>");
                write_inlines(html, children);
                html.push_str("</li>");
            }
            Entry::Nested { ordered, items } => {
                html.push_str("<li>");
                write_list(html, *ordered, items);
                html.push_str("</li>");
            }
            Entry::Unsupported { kind } => {
                let _ = write!(
                    html,
                    "<li class=\"unsupported-inline\">[{}]</li>",
                    html_escape(kind)
                );
            }
        }
    }
    let _ = writeln!(html, "</{}>", tag);
}

fn write_inlines(html: &mut String, nodes: &[Inline]) {
    for node in nodes {
        match node {
            Inline::Text(run) => write_text(html, run),
            Inline::Anchor { url, children } if !is_safe_link(url) => {
                tracing::debug!("Dropping link with disallowed target {:?}", url);
                write_inlines(html, children);
            }
            Inline::Anchor { url, children } => {
                let _ = write!(
                    html,
                    "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">",
                    html_escape(url)
                );
                write_inlines(html, children);
                html.push_str("</a>");
            }
            Inline::Unsupported { kind } => {
                let _ = write!(
                    html,
                    "<span class=\"unsupported-inline\">[{}]</span>",
                    html_escape(kind)
                );
            }
        }
    }
}

fn write_text(html: &mut String, run: &TextRun) {
    let marks = [
        (run.bold, "strong"),
        (run.italic, "em"),
        (run.underline, "u"),
        (run.strikethrough, "s"),
        (run.code, "code"),
    ];

    for (on, tag) in marks {
        if on {
            let _ = write!(html, "<{}>", tag);
        }
    }
    html.push_str(&html_escape(&run.text));
    for (on, tag) in marks.iter().rev() {
        if *on {
            let _ = write!(html, "</{}>", tag);
        }
    }
}
