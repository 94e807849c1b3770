//! URL helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use url::Url;

use crate::config::SiteConfig;
use crate::content::Selection;

/// Characters escaped in a single path segment
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Generate a URL with the root path
///
/// # Examples
/// ```ignore
/// url_for(&config, "/assets/site.css") // -> "/blog/assets/site.css"
/// ```
pub fn url_for(config: &SiteConfig, path: &str) -> String {
    let root = config.root.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        format!("{}/", root)
    } else {
        format!("{}/{}", root, path)
    }
}

/// Encode a string for use as one URL path segment
pub fn encode_segment(segment: &str) -> String {
    utf8_percent_encode(segment, SEGMENT).to_string()
}

/// Detail view path for a post
pub fn post_url(config: &SiteConfig, slug: &str) -> String {
    url_for(config, &format!("post/{}", encode_segment(slug)))
}

/// List view path with the given filter selections
pub fn index_url(config: &SiteConfig, category: Selection, author: Selection) -> String {
    let mut params = Vec::new();
    if let Selection::Id(id) = category {
        params.push(format!("category={}", id));
    }
    if let Selection::Id(id) = author {
        params.push(format!("author={}", id));
    }

    let base = url_for(config, "/");
    if params.is_empty() {
        base
    } else {
        format!("{}?{}", base, params.join("&"))
    }
}

/// Path of a pre-rendered facet page, e.g. `/category/3/`
pub fn facet_page_url(config: &SiteConfig, facet: &str, id: u64) -> String {
    url_for(config, &format!("{}/{}/", facet, id))
}

/// Resolve a media URL from the content API against its origin
///
/// Absolute and protocol-relative URLs are returned unchanged.
pub fn asset_url(origin: &Url, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") || path.starts_with("//") {
        return path.to_string();
    }
    match origin.join(path) {
        Ok(url) => url.to_string(),
        Err(e) => {
            tracing::debug!("Cannot resolve media URL {:?}: {}", path, e);
            path.to_string()
        }
    }
}

/// Schemes a content link may use
const LINK_SCHEMES: &[&str] = &["http", "https", "mailto"];

/// Whether a link target from content is safe to put in an `href`
///
/// Relative references are allowed; absolute URLs must use one of
/// `LINK_SCHEMES`.
pub fn is_safe_link(target: &str) -> bool {
    match Url::parse(target) {
        Ok(url) => LINK_SCHEMES.contains(&url.scheme()),
        Err(url::ParseError::RelativeUrlWithoutBase) => true,
        Err(_) => false,
    }
}
