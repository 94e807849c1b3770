//! headless-blog: a server-rendered blog front-end for headless CMS content
//!
//! Posts, categories and authors are fetched from a Strapi-style REST API,
//! filtered by category and author, and rendered through built-in Tera
//! templates, either live by the HTTP server or as static files.

pub mod api;
pub mod commands;
pub mod config;
pub mod content;
pub mod generator;
pub mod helpers;
pub mod render;
pub mod server;
pub mod templates;

use anyhow::Result;
use std::path::Path;

/// The blog application: site configuration plus a content API client
#[derive(Clone, Debug)]
pub struct Blog {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Client for the content API at `config.api_url`
    pub client: api::ContentClient,
}

impl Blog {
    /// Create a blog from a loaded configuration
    pub fn new(config: config::SiteConfig) -> Result<Self> {
        let client = api::ContentClient::new(&config.api_url, config.timeout())?;
        tracing::debug!("Content API at {}", client.base_url());
        Ok(Self { config, client })
    }

    /// Load `_config.yml` (or an explicit file) from `base_dir`, apply an API
    /// URL override, and create the blog
    pub fn load<P: AsRef<Path>>(
        base_dir: P,
        config_path: Option<&Path>,
        api_url: Option<String>,
    ) -> Result<Self> {
        let config = config::SiteConfig::discover(config_path, base_dir)?.with_api_url(api_url);
        Self::new(config)
    }

    /// Page builder bound to this blog's configuration
    pub fn generator(&self) -> Result<generator::Generator> {
        generator::Generator::new(&self.config, self.client.base_url().clone())
    }

    /// Fetch content and write the static site
    pub async fn generate(&self, public_dir: &Path) -> Result<usize> {
        commands::generate::run(self, public_dir).await
    }
}
