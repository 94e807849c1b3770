//! Filter facet options

use serde::Serialize;

use super::post::{Author, Category, Post};

/// A selectable value for a filter control
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetOption {
    pub id: u64,
    pub name: String,
}

/// Options for both filter controls
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Facets {
    pub categories: Vec<FacetOption>,
    pub authors: Vec<FacetOption>,
}

impl From<&Category> for FacetOption {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}

impl From<&Author> for FacetOption {
    fn from(author: &Author) -> Self {
        Self {
            id: author.id,
            name: author.name.clone(),
        }
    }
}

/// Project fetched category and author collections into facet options,
/// keeping fetch order
pub fn derive_facets(categories: &[Category], authors: &[Author]) -> Facets {
    Facets {
        categories: categories.iter().map(FacetOption::from).collect(),
        authors: authors.iter().map(FacetOption::from).collect(),
    }
}

/// Collect the categories and authors referenced by a post collection,
/// in first-seen order
pub fn facets_from_posts(posts: &[Post]) -> Facets {
    let mut facets = Facets::default();

    for post in posts {
        for category in &post.categories {
            if !facets.categories.iter().any(|o| o.id == category.id) {
                facets.categories.push(category.into());
            }
        }
        if let Some(author) = &post.author {
            if !facets.authors.iter().any(|o| o.id == author.id) {
                facets.authors.push(author.into());
            }
        }
    }

    facets
}
