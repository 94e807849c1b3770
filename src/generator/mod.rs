//! Generator module - builds pages from content snapshots using the built-in
//! Tera templates
//!
//! The same page builders back both the live server and the static output
//! written by `generate`.

use anyhow::Result;
use std::fs;
use std::path::Path;

use tera::Context;
use url::Url;

use crate::config::SiteConfig;
use crate::content::{excerpt, BlogSnapshot, Category, Facets, Post, Selection};
use crate::helpers::{
    asset_url, date_xml, facet_page_url, index_url, post_url, published_date, url_for,
};
use crate::render::{render_blocks, HtmlRenderer};
use crate::templates::{
    ChipData, ConfigData, ErrorData, FilterData, LinkData, OptionData, PostCard, PostDetail,
    TemplateRenderer, SITE_CSS,
};

/// Path the stylesheet is served from, relative to the site root
pub const STYLESHEET_PATH: &str = "assets/site.css";

/// How filter controls and category chips reach a filtered list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Links {
    /// `?category=..&author=..` on the list view, answered by the server
    Query,
    /// Pre-rendered `category/{id}/` and `author/{id}/` pages
    Static,
}

/// Page builder for the list, detail and status views
pub struct Generator {
    config: SiteConfig,
    renderer: TemplateRenderer,
    media_origin: Url,
}

impl Generator {
    /// Create a new generator; relative media URLs resolve against `media_origin`
    pub fn new(config: &SiteConfig, media_origin: Url) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            renderer: TemplateRenderer::new()?,
            media_origin,
        })
    }

    /// Build config data for templates
    fn build_config_data(&self) -> ConfigData {
        let link = |l: &crate::config::NavLink| LinkData {
            name: l.name.clone(),
            href: if l.href.starts_with('/') && !l.href.starts_with("//") {
                url_for(&self.config, &l.href)
            } else {
                l.href.clone()
            },
            external: l.is_external(),
        };

        ConfigData {
            title: self.config.title.clone(),
            description: self.config.description.clone(),
            language: self.config.language.clone(),
            root: url_for(&self.config, "/"),
            heading: self.config.heading.clone(),
            tagline: self.config.tagline.clone(),
            stylesheet: url_for(&self.config, STYLESHEET_PATH),
            nav: self.config.nav.iter().map(link).collect(),
            footer_links: self.config.footer_links.iter().map(link).collect(),
            copyright: self.config.copyright_holder().to_string(),
        }
    }

    /// Create a base context with common variables
    fn create_base_context(&self, page_title: Option<&str>) -> Context {
        let mut context = Context::new();
        context.insert("config", &self.build_config_data());
        context.insert("current_year", &chrono::Utc::now().format("%Y").to_string());
        if let Some(title) = page_title {
            context.insert("page_title", title);
        }
        context
    }

    /// Where the list filtered by `category` and `author` lives
    ///
    /// Static pages filter one facet at a time; a category wins over an author.
    fn list_url(&self, links: Links, category: Selection, author: Selection) -> String {
        match (links, category, author) {
            (Links::Query, ..) => index_url(&self.config, category, author),
            (Links::Static, Selection::Id(id), _) => facet_page_url(&self.config, "category", id),
            (Links::Static, Selection::All, Selection::Id(id)) => {
                facet_page_url(&self.config, "author", id)
            }
            (Links::Static, Selection::All, Selection::All) => url_for(&self.config, "/"),
        }
    }

    fn chips(&self, categories: &[Category], links: Links) -> Vec<ChipData> {
        categories
            .iter()
            .map(|c| ChipData {
                name: c.name.clone(),
                path: self.list_url(links, Selection::Id(c.id), Selection::All),
            })
            .collect()
    }

    fn post_card(&self, post: &Post, links: Links) -> PostCard {
        PostCard {
            title: post.title.clone(),
            path: post_url(&self.config, &post.slug),
            thumbnail: post
                .cover_image
                .as_ref()
                .map(|c| asset_url(&self.media_origin, c.thumbnail())),
            author: post.author_name().to_string(),
            date: published_date(post.published_at.as_ref(), &self.config.date_format),
            date_xml: post.published_at.as_ref().map(date_xml).unwrap_or_default(),
            excerpt: excerpt(&post.content, self.config.excerpt_length),
            categories: self.chips(&post.categories, links),
        }
    }

    fn post_detail(&self, post: &Post, links: Links) -> PostDetail {
        let html = HtmlRenderer::new(Some(self.media_origin.clone()));
        PostDetail {
            title: post.title.clone(),
            path: post_url(&self.config, &post.slug),
            cover: post
                .cover_image
                .as_ref()
                .map(|c| asset_url(&self.media_origin, &c.url)),
            author: post.author_name().to_string(),
            date: published_date(post.published_at.as_ref(), &self.config.date_format),
            date_xml: post.published_at.as_ref().map(date_xml).unwrap_or_default(),
            excerpt: excerpt(&post.content, self.config.excerpt_length),
            body: html.render_document(&render_blocks(&post.content)),
            categories: self.chips(&post.categories, links),
        }
    }

    fn filter_data(
        &self,
        facets: &Facets,
        category: Selection,
        author: Selection,
        links: Links,
    ) -> FilterData {
        let categories = facets
            .categories
            .iter()
            .map(|o| OptionData {
                id: o.id,
                name: o.name.clone(),
                selected: category.is(o.id),
                path: self.list_url(links, Selection::Id(o.id), author),
            })
            .collect();
        // Static author pages are not narrowed by category
        let author_scope = match links {
            Links::Query => category,
            Links::Static => Selection::All,
        };
        let authors = facets
            .authors
            .iter()
            .map(|o| OptionData {
                id: o.id,
                name: o.name.clone(),
                selected: author.is(o.id),
                path: self.list_url(links, author_scope, Selection::Id(o.id)),
            })
            .collect();

        FilterData {
            categories,
            authors,
            category: category.to_string(),
            author: author.to_string(),
            active: !category.is_all() || !author.is_all(),
            static_pages: links == Links::Static,
        }
    }

    /// Render the list view for the given filter selections
    pub fn index_page(&self, snapshot: &BlogSnapshot, category: Selection, author: Selection) -> Result<String> {
        self.list_page(snapshot, category, author, Links::Query)
    }

    fn list_page(
        &self,
        snapshot: &BlogSnapshot,
        category: Selection,
        author: Selection,
        links: Links,
    ) -> Result<String> {
        let facets = snapshot.facets();
        let posts: Vec<PostCard> = snapshot
            .visible(category, author)
            .into_iter()
            .map(|p| self.post_card(p, links))
            .collect();
        tracing::debug!(
            "List view: {} of {} posts (category={}, author={})",
            posts.len(),
            snapshot.posts.len(),
            category,
            author
        );

        let mut context = self.create_base_context(Some(self.config.heading.as_str()));
        context.insert("posts", &posts);
        context.insert("filters", &self.filter_data(&facets, category, author, links));
        self.renderer.render("index.html", &context)
    }

    /// Render the detail view for one post
    pub fn post_page(&self, post: &Post) -> Result<String> {
        self.detail_page(post, Links::Query)
    }

    fn detail_page(&self, post: &Post, links: Links) -> Result<String> {
        let detail = self.post_detail(post, links);
        let mut context = self.create_base_context(Some(post.title.as_str()));
        context.insert("page_description", &detail.excerpt);
        context.insert("post", &detail);
        self.renderer.render("post.html", &context)
    }

    /// Render the not-found page
    pub fn not_found_page(&self, slug: Option<&str>) -> Result<String> {
        let mut context = self.create_base_context(Some("Not Found"));
        if let Some(slug) = slug {
            context.insert("slug", slug);
        }
        self.renderer.render("not_found.html", &context)
    }

    /// Render an error page, shown when content could not be loaded
    pub fn error_page(&self, status: u16, message: &str) -> Result<String> {
        let error = ErrorData {
            status,
            title: "Content unavailable".to_string(),
            message: message.to_string(),
        };
        let mut context = self.create_base_context(Some(error.title.as_str()));
        context.insert("error", &error);
        self.renderer.render("error.html", &context)
    }

    /// Write the unfiltered list view, one list page per category and author,
    /// every post page, a 404 page and the stylesheet under `public_dir`;
    /// returns the number of post pages
    pub fn generate(&self, snapshot: &BlogSnapshot, public_dir: &Path) -> Result<usize> {
        fs::create_dir_all(public_dir)?;

        let html = self.list_page(snapshot, Selection::All, Selection::All, Links::Static)?;
        write_file(&public_dir.join("index.html"), &html)?;

        let facets = snapshot.facets();
        for option in &facets.categories {
            let html = self.list_page(snapshot, Selection::Id(option.id), Selection::All, Links::Static)?;
            let dir = public_dir.join("category").join(option.id.to_string());
            write_file(&dir.join("index.html"), &html)?;
        }
        for option in &facets.authors {
            let html = self.list_page(snapshot, Selection::All, Selection::Id(option.id), Links::Static)?;
            let dir = public_dir.join("author").join(option.id.to_string());
            write_file(&dir.join("index.html"), &html)?;
        }
        tracing::debug!(
            "Generated {} category and {} author pages",
            facets.categories.len(),
            facets.authors.len()
        );

        let mut written = 0;
        for post in &snapshot.posts {
            if !is_safe_slug(&post.slug) {
                tracing::warn!("Skipping post {} with unusable slug {:?}", post.id, post.slug);
                continue;
            }
            let html = self.detail_page(post, Links::Static)?;
            let output_path = public_dir.join("post").join(&post.slug).join("index.html");
            write_file(&output_path, &html)?;
            tracing::debug!("Generated post: {:?}", output_path);
            written += 1;
        }

        write_file(&public_dir.join("404.html"), &self.not_found_page(None)?)?;
        write_file(&public_dir.join(STYLESHEET_PATH), SITE_CSS)?;

        Ok(written)
    }
}

/// A slug usable as a single directory name
fn is_safe_slug(slug: &str) -> bool {
    !slug.is_empty() && slug != "." && slug != ".." && !slug.contains(['/', '\\'])
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(path, contents).map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", path, e))?;
    Ok(())
}
