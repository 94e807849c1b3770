//! List content from the API

use anyhow::Result;
use std::fmt::Write;

use crate::content::{filter_posts, Author, Category, Post, Selection};
use crate::helpers::published_date;
use crate::Blog;

/// List content by type
pub async fn run(blog: &Blog, content_type: &str, category: Selection, author: Selection) -> Result<()> {
    let output = match content_type {
        "post" | "posts" => {
            let posts = blog.client.posts().await?;
            format_posts(&posts, category, author, &blog.config.date_format)
        }
        "category" | "categories" => format_named("Categories", &blog.client.categories().await?),
        "author" | "authors" => format_named("Authors", &blog.client.authors().await?),
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, categories, authors",
                content_type
            );
        }
    };

    print!("{}", output);
    Ok(())
}

fn format_posts(posts: &[Post], category: Selection, author: Selection, date_format: &str) -> String {
    let visible = filter_posts(posts, category, author);
    let mut out = String::new();

    if visible.len() == posts.len() {
        let _ = writeln!(out, "Posts ({}):", posts.len());
    } else {
        let _ = writeln!(out, "Posts ({} of {}):", visible.len(), posts.len());
    }

    for post in visible {
        let date = published_date(post.published_at.as_ref(), date_format);
        let categories: Vec<&str> = post.categories.iter().map(|c| c.name.as_str()).collect();
        let _ = writeln!(
            out,
            "  {:>12} - {} by {} [{}] ({})",
            if date.is_empty() { "-" } else { date.as_str() },
            post.title,
            post.author_name(),
            categories.join(", "),
            post.slug
        );
    }
    out
}

/// Records listed by `list categories` and `list authors`
trait Named {
    fn id(&self) -> u64;
    fn name(&self) -> &str;
}

impl Named for Category {
    fn id(&self) -> u64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

impl Named for Author {
    fn id(&self) -> u64 {
        self.id
    }
    fn name(&self) -> &str {
        &self.name
    }
}

fn format_named<T: Named>(heading: &str, records: &[T]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} ({}):", heading, records.len());
    for record in records {
        let _ = writeln!(out, "  {:>4}  {}", record.id(), record.name());
    }
    out
}
