//! Helper functions for templates and the renderer
//!
//! URL generation, date formatting and HTML escaping shared by the page
//! templates and the rich content renderer.

mod date;
mod html;
mod url;

pub use date::*;
pub use html::*;
pub use self::url::*;
