//! Built-in site templates using Tera template engine
//!
//! The page templates and stylesheet are embedded directly in the binary so
//! the server and the static generator need no files at runtime.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use tera::{Context, Tera};

/// Stylesheet served at `/assets/site.css`
pub const SITE_CSS: &str = include_str!("site/site.css");

/// Template renderer with the embedded site templates
pub struct TemplateRenderer {
    tera: Tera,
}

impl TemplateRenderer {
    /// Create a new renderer with all templates loaded
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();

        tera.add_raw_templates(vec![
            ("layout.html", include_str!("site/layout.html")),
            ("index.html", include_str!("site/index.html")),
            ("post.html", include_str!("site/post.html")),
            ("not_found.html", include_str!("site/not_found.html")),
            ("error.html", include_str!("site/error.html")),
            // Partials
            ("partials/navbar.html", include_str!("site/partials/navbar.html")),
            ("partials/footer.html", include_str!("site/partials/footer.html")),
            ("partials/filters.html", include_str!("site/partials/filters.html")),
            ("partials/card.html", include_str!("site/partials/card.html")),
        ])?;

        tera.register_filter("truncate_chars", truncate_chars_filter);

        Ok(Self { tera })
    }

    /// Render a template with given context
    pub fn render(&self, template_name: &str, context: &Context) -> Result<String> {
        Ok(self.tera.render(template_name, context)?)
    }
}

/// Tera filter: truncate by character count
fn truncate_chars_filter(
    value: &tera::Value,
    args: &HashMap<String, tera::Value>,
) -> tera::Result<tera::Value> {
    let s = tera::try_get_value!("truncate_chars", "value", String, value);
    let length = match args.get("length") {
        Some(val) => tera::try_get_value!("truncate_chars", "length", usize, val),
        None => 160,
    };

    if s.chars().count() <= length {
        Ok(tera::Value::String(s))
    } else {
        let truncated: String = s.chars().take(length).collect();
        Ok(tera::Value::String(format!("{}...", truncated.trim_end())))
    }
}

/// Data structures for template context

#[derive(Debug, Clone, Serialize)]
pub struct ConfigData {
    pub title: String,
    pub description: String,
    pub language: String,
    pub root: String,
    pub heading: String,
    pub tagline: String,
    pub stylesheet: String,
    pub nav: Vec<LinkData>,
    pub footer_links: Vec<LinkData>,
    pub copyright: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkData {
    pub name: String,
    pub href: String,
    pub external: bool,
}

/// A post in the list view grid
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub title: String,
    pub path: String,
    pub thumbnail: Option<String>,
    pub author: String,
    pub date: String,
    pub date_xml: String,
    pub excerpt: String,
    pub categories: Vec<ChipData>,
}

/// A post in the detail view
#[derive(Debug, Clone, Serialize)]
pub struct PostDetail {
    pub title: String,
    pub path: String,
    pub cover: Option<String>,
    pub author: String,
    pub date: String,
    pub date_xml: String,
    pub excerpt: String,
    pub body: String,
    pub categories: Vec<ChipData>,
}

/// A category label linking to the filtered list view
#[derive(Debug, Clone, Serialize)]
pub struct ChipData {
    pub name: String,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct FilterData {
    pub categories: Vec<OptionData>,
    pub authors: Vec<OptionData>,
    pub category: String,
    pub author: String,
    pub active: bool,
    /// Render links to pre-rendered facet pages instead of the query form
    pub static_pages: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct OptionData {
    pub id: u64,
    pub name: String,
    pub selected: bool,
    pub path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorData {
    pub status: u16,
    pub title: String,
    pub message: String,
}
