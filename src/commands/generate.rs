//! Generate static files

use anyhow::Result;
use std::path::Path;

use crate::Blog;

/// Fetch a snapshot and write the static site; returns the number of post
/// pages written
pub async fn run(blog: &Blog, public_dir: &Path) -> Result<usize> {
    let start = std::time::Instant::now();

    let snapshot = blog.client.load_snapshot().await?;
    tracing::info!("Fetched {} posts", snapshot.posts.len());

    let generator = blog.generator()?;
    let written = generator.generate(&snapshot, public_dir)?;

    tracing::info!(
        "Generated {} post pages in {:?} ({:.2?})",
        written,
        public_dir,
        start.elapsed()
    );
    Ok(written)
}
