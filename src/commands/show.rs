//! Print a single post

use anyhow::Result;

use crate::content::excerpt::plain_text;
use crate::content::Post;
use crate::helpers::published_date;
use crate::render::{render_blocks, to_html};
use crate::Blog;

/// Print the post with the given slug as plain text or rendered HTML
pub async fn run(blog: &Blog, slug: &str, html: bool) -> Result<()> {
    let Some(post) = blog.client.post_by_slug(slug).await? else {
        anyhow::bail!("Post not found: {}", slug);
    };

    let output = if html {
        to_html(&render_blocks(&post.content))
    } else {
        format_plain(&post, &blog.config.date_format)
    };
    print!("{}", output);
    Ok(())
}

fn format_plain(post: &Post, date_format: &str) -> String {
    let mut byline = format!("By {}", post.author_name());
    let date = published_date(post.published_at.as_ref(), date_format);
    if !date.is_empty() {
        byline.push_str(" | ");
        byline.push_str(&date);
    }

    let mut out = format!("{}\n{}\n", post.title, byline);
    if !post.categories.is_empty() {
        let names: Vec<&str> = post.categories.iter().map(|c| c.name.as_str()).collect();
        out.push_str(&format!("Categories: {}\n", names.join(", ")));
    }

    let body = plain_text(&post.content);
    if !body.is_empty() {
        out.push('\n');
        out.push_str(&body);
        out.push('\n');
    }
    out
}
