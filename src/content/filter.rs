//! Post filtering by category and author

use std::fmt;
use std::str::FromStr;

use super::post::Post;

/// Selection state of a single filter control
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    All,
    Id(u64),
}

impl Selection {
    /// Parse a query-string value; anything that is not an id selects all
    pub fn from_param(value: Option<&str>) -> Self {
        match value.map(str::trim) {
            None | Some("") | Some("all") => Selection::All,
            Some(raw) => raw.parse().unwrap_or_else(|_| {
                tracing::debug!("Ignoring invalid filter value {:?}", raw);
                Selection::All
            }),
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, Selection::All)
    }

    /// Whether this selection is exactly the given id
    pub fn is(&self, id: u64) -> bool {
        *self == Selection::Id(id)
    }
}

impl FromStr for Selection {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "all" {
            Ok(Selection::All)
        } else {
            s.parse().map(Selection::Id)
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::Id(id) => write!(f, "{}", id),
        }
    }
}

impl From<Option<u64>> for Selection {
    fn from(id: Option<u64>) -> Self {
        id.map(Selection::Id).unwrap_or_default()
    }
}

/// Whether a post passes both selections
pub fn matches(post: &Post, category: Selection, author: Selection) -> bool {
    let category_ok = match category {
        Selection::All => true,
        Selection::Id(id) => post.has_category(id),
    };
    let author_ok = match author {
        Selection::All => true,
        Selection::Id(id) => post.has_author(id),
    };
    category_ok && author_ok
}

/// Visible subset of `posts`, in their original order
pub fn filter_posts(posts: &[Post], category: Selection, author: Selection) -> Vec<&Post> {
    posts
        .iter()
        .filter(|post| matches(post, category, author))
        .collect()
}
