//! Content module - post model, block tree, facets, filtering and excerpts

pub mod blocks;
pub mod excerpt;
pub mod facets;
pub mod filter;
mod markdown;
mod post;
mod wire;

pub use blocks::{ContentBlock, InlineNode, List, ListFormat, ListItem, TextRun};
pub use excerpt::{excerpt, DEFAULT_EXCERPT_LENGTH};
pub use facets::{derive_facets, facets_from_posts, FacetOption, Facets};
pub use filter::{filter_posts, Selection};
pub use markdown::parse_blocks;
pub use post::{Author, BlogSnapshot, Category, Collection, CoverImage, Post, UNKNOWN_AUTHOR};
