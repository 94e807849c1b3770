//! Site configuration (_config.yml)

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::api::DEFAULT_API_URL;
use crate::content::DEFAULT_EXCERPT_LENGTH;

/// Errors reading the configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid config value for `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Site
    pub title: String,
    pub description: String,
    pub language: String,

    // List view header
    pub heading: String,
    pub tagline: String,

    // URL
    pub root: String,

    // Content API
    pub api_url: String,
    /// Per-request timeout in seconds
    pub request_timeout: u64,

    // Rendering
    pub excerpt_length: usize,
    pub date_format: String,

    // Layout chrome
    pub nav: Vec<NavLink>,
    pub footer_links: Vec<NavLink>,
    /// Name in the footer copyright line, defaults to the title
    pub copyright: Option<String>,

    // Static output
    pub public_dir: String,
}

/// A link in the navbar or footer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavLink {
    pub name: String,
    pub href: String,
}

impl NavLink {
    pub fn new(name: &str, href: &str) -> Self {
        Self {
            name: name.to_string(),
            href: href.to_string(),
        }
    }

    /// Whether the link leaves the site
    pub fn is_external(&self) -> bool {
        self.href.starts_with("http://") || self.href.starts_with("https://")
    }
}

impl Default for SiteConfig {
    fn default() -> Self {
        let about = "https://vyomgarud-landing-topaz.vercel.app/";
        Self {
            title: "VyomGarud".to_string(),
            description: "Future of Drones | Blog".to_string(),
            language: "en".to_string(),

            heading: "Blog".to_string(),
            tagline: "Deep dives into UAV innovation, future flight technologies, and the latest developments from our engineering bay.".to_string(),

            root: "/".to_string(),

            api_url: DEFAULT_API_URL.to_string(),
            request_timeout: 10,

            excerpt_length: DEFAULT_EXCERPT_LENGTH,
            date_format: "MMM DD, YYYY".to_string(),

            nav: vec![NavLink::new("Home", "/"), NavLink::new("About Us", about)],
            footer_links: vec![NavLink::new("About", about), NavLink::new("Mission", about)],
            copyright: None,

            public_dir: "public".to_string(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: SiteConfig =
            serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Load an explicit config file, or `_config.yml` in `base_dir` when it
    /// exists, or the defaults
    pub fn discover<P: AsRef<Path>>(explicit: Option<&Path>, base_dir: P) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let path = base_dir.as_ref().join("_config.yml");
        if path.exists() {
            tracing::debug!("Loading config from {:?}", path);
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Apply an API URL given on the command line or through the environment
    pub fn with_api_url(mut self, api_url: Option<String>) -> Self {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url;
        }
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout)
    }

    /// Name shown in the footer copyright line
    pub fn copyright_holder(&self) -> &str {
        self.copyright.as_deref().unwrap_or(&self.title)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.request_timeout == 0 {
            return Err(ConfigError::Invalid {
                field: "request_timeout",
                reason: "must be at least 1 second".to_string(),
            });
        }
        if !self.root.starts_with('/') {
            return Err(ConfigError::Invalid {
                field: "root",
                reason: format!("{:?} must start with '/'", self.root),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = SiteConfig::default();
        assert_eq!(config.title, "VyomGarud");
        assert_eq!(config.api_url, "http://localhost:1337");
        assert_eq!(config.excerpt_length, 150);
        assert_eq!(config.timeout(), Duration::from_secs(10));
        assert_eq!(config.copyright_holder(), "VyomGarud");
        assert!(config.nav[1].is_external());
        assert!(!config.nav[0].is_external());
    }

    #[test]
    fn test_parse_config() {
        let yaml = r#"
title: My Blog
api_url: https://cms.example.com
excerpt_length: 80
nav:
  - name: Home
    href: /
"#;
        let config: SiteConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.api_url, "https://cms.example.com");
        assert_eq!(config.excerpt_length, 80);
        assert_eq!(config.nav.len(), 1);
        // unspecified fields keep their defaults
        assert_eq!(config.request_timeout, 10);
        assert_eq!(config.footer_links.len(), 2);
    }

    #[test]
    fn test_api_url_override() {
        let config = SiteConfig::default().with_api_url(Some("http://cms:1337".into()));
        assert_eq!(config.api_url, "http://cms:1337");

        let config = SiteConfig::default().with_api_url(Some("  ".into()));
        assert_eq!(config.api_url, "http://localhost:1337");

        let config = SiteConfig::default().with_api_url(None);
        assert_eq!(config.api_url, "http://localhost:1337");
    }

    #[test]
    fn test_discover() {
        let dir = tempfile::tempdir().unwrap();
        let config = SiteConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.title, "VyomGarud");

        let mut file = fs::File::create(dir.path().join("_config.yml")).unwrap();
        writeln!(file, "title: Flight Log").unwrap();
        let config = SiteConfig::discover(None, dir.path()).unwrap();
        assert_eq!(config.title, "Flight Log");

        let missing = dir.path().join("nope.yml");
        let err = SiteConfig::discover(Some(&missing), dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }

    #[test]
    fn test_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("_config.yml");

        fs::write(&path, "request_timeout: 0\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "request_timeout", .. }));

        fs::write(&path, "title: [unclosed\n").unwrap();
        let err = SiteConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }
}
