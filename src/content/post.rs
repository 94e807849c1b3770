//! Post, Author and Category models

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::blocks::ContentBlock;
use super::facets::{derive_facets, facets_from_posts, Facets};
use super::filter::{filter_posts, Selection};
use super::wire;

/// Display name used when a post has no author
pub const UNKNOWN_AUTHOR: &str = "Unknown";

/// A blog post as served by the content API
#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    /// Opaque identifier
    pub id: u64,

    /// Post title
    pub title: String,

    /// URL-friendly unique name, the detail view key
    pub slug: String,

    /// Rich-text body
    pub content: Vec<ContentBlock>,

    /// Cover image, if one is attached
    pub cover_image: Option<CoverImage>,

    /// Publication timestamp
    pub published_at: Option<DateTime<Utc>>,

    /// Author, zero or one
    pub author: Option<Author>,

    /// Categories, unique by id
    pub categories: Vec<Category>,
}

/// A post author
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: u64,
    pub name: String,
}

/// A post category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub id: u64,
    pub name: String,
}

/// Cover image reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImage {
    /// Full-size image URL (may be relative to the API origin)
    pub url: String,
    /// Thumbnail rendition, when the backend generated one
    pub thumbnail_url: Option<String>,
}

impl CoverImage {
    /// Smallest available rendition
    pub fn thumbnail(&self) -> &str {
        self.thumbnail_url.as_deref().unwrap_or(&self.url)
    }
}

impl Post {
    /// Create a post with the minimal required fields
    pub fn new(id: u64, title: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            slug: slug.into(),
            content: Vec::new(),
            cover_image: None,
            published_at: None,
            author: None,
            categories: Vec::new(),
        }
    }

    /// Author display name, falling back to "Unknown"
    pub fn author_name(&self) -> &str {
        self.author
            .as_ref()
            .map(|a| a.name.as_str())
            .filter(|name| !name.is_empty())
            .unwrap_or(UNKNOWN_AUTHOR)
    }

    /// Whether one of the post's categories has the given id
    pub fn has_category(&self, id: u64) -> bool {
        self.categories.iter().any(|c| c.id == id)
    }

    /// Whether the post's author has the given id
    pub fn has_author(&self, id: u64) -> bool {
        self.author.as_ref().is_some_and(|a| a.id == id)
    }
}

impl Author {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl Category {
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

impl<'de> Deserialize<'de> for Post {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        wire::post_from_value(value).map_err(serde::de::Error::custom)
    }
}

impl<'de> Deserialize<'de> for Author {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let (id, name) = wire::named_from_value(value).map_err(serde::de::Error::custom)?;
        Ok(Author { id, name })
    }
}

impl<'de> Deserialize<'de> for Category {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let (id, name) = wire::named_from_value(value).map_err(serde::de::Error::custom)?;
        Ok(Category { id, name })
    }
}

/// Response envelope shared by every collection endpoint
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Collection<T> {
    #[serde(default = "Vec::new", deserialize_with = "wire::lenient_items")]
    pub data: Vec<T>,
}

impl<T> Collection<T> {
    pub fn into_inner(self) -> Vec<T> {
        self.data
    }
}

/// Everything fetched for one page load
///
/// `categories` and `authors` are `None` when their endpoint could not be
/// read; facets then come from the posts themselves.
#[derive(Debug, Clone, Default)]
pub struct BlogSnapshot {
    pub posts: Vec<Post>,
    pub categories: Option<Vec<Category>>,
    pub authors: Option<Vec<Author>>,
}

impl BlogSnapshot {
    /// Facet options for the filter controls
    pub fn facets(&self) -> Facets {
        let from_posts = || facets_from_posts(&self.posts);
        let categories = match &self.categories {
            Some(categories) => derive_facets(categories, &[]).categories,
            None => from_posts().categories,
        };
        let authors = match &self.authors {
            Some(authors) => derive_facets(&[], authors).authors,
            None => from_posts().authors,
        };
        Facets {
            categories,
            authors,
        }
    }

    /// Posts visible under the given selections
    pub fn visible(&self, category: Selection, author: Selection) -> Vec<&Post> {
        filter_posts(&self.posts, category, author)
    }
}
