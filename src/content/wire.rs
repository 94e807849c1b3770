//! Normalization of API records into the canonical post shape
//!
//! The content API has served two record layouts. The flat layout puts fields
//! directly on the record and relations inline:
//!
//! ```json
//! { "id": 1, "title": "..", "coverImage": { "url": "..", "formats": { "thumbnail": { "url": ".." } } } }
//! ```
//!
//! The nested layout wraps fields in `attributes` and relations in `data`:
//!
//! ```json
//! { "id": 1, "attributes": { "title": "..", "coverImage": { "data": { "attributes": { "url": ".." } } } } }
//! ```
//!
//! Both are reduced to the flat layout before typed decoding. A body stored
//! as a markdown string is parsed into blocks.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

use super::blocks::ContentBlock;
use super::markdown;
use super::post::{Author, Category, CoverImage, Post};

/// Decode a record list item by item, skipping records that do not decode
///
/// An explicit `null` is an empty list. Only a value that is not a list at
/// all fails the whole envelope.
pub(crate) fn lenient_items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let items = Option::<Vec<Value>>::deserialize(deserializer)?.unwrap_or_default();
    Ok(items
        .into_iter()
        .filter_map(|item| match T::deserialize(item) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!("Skipping malformed record: {}", e);
                None
            }
        })
        .collect())
}

/// Unwrap a `{ "data": .. }` relation wrapper
fn unwrap_relation(value: Value) -> Value {
    match value {
        Value::Object(mut map)
            if map.contains_key("data") && map.keys().all(|k| k == "data" || k == "meta") =>
        {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// Hoist `attributes` fields onto the record itself
fn flatten_record(value: Value) -> Value {
    match unwrap_relation(value) {
        Value::Object(mut map) => {
            if let Some(Value::Object(attributes)) = map.remove("attributes") {
                for (key, field) in attributes {
                    map.entry(key).or_insert(field);
                }
            }
            Value::Object(map)
        }
        other => other,
    }
}

fn take(map: &mut Map<String, Value>, key: &str) -> Value {
    map.remove(key).unwrap_or(Value::Null)
}

#[derive(Deserialize)]
struct RawNamed {
    id: u64,
    #[serde(default)]
    name: Option<String>,
}

/// Decode an `{ id, name }` record in either layout
pub(crate) fn named_from_value(value: Value) -> Result<(u64, String), serde_json::Error> {
    let raw = RawNamed::deserialize(flatten_record(value))?;
    Ok((raw.id, raw.name.unwrap_or_default()))
}

/// A to-one relation; a record that does not decode counts as absent
fn relation_one<T: DeserializeOwned>(value: Value) -> Option<T> {
    match unwrap_relation(value) {
        Value::Null => None,
        other => match T::deserialize(other) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::debug!("Dropping malformed relation: {}", e);
                None
            }
        },
    }
}

/// A to-many relation; records that do not decode are left out
fn relation_many<T: DeserializeOwned>(value: Value) -> Vec<T> {
    match unwrap_relation(value) {
        Value::Null => Vec::new(),
        Value::Array(items) => items
            .into_iter()
            .filter_map(relation_one)
            .collect(),
        other => {
            tracing::debug!("Unexpected relation list shape: {}", other);
            Vec::new()
        }
    }
}

fn cover_from_value(value: Value) -> Option<CoverImage> {
    let record = flatten_record(value);
    let url_at = |pointer: &str| {
        record
            .pointer(pointer)
            .and_then(Value::as_str)
            .filter(|url| !url.is_empty())
            .map(str::to_string)
    };

    let url = url_at("/url");
    let thumbnail_url = url_at("/formats/thumbnail/url");
    match (url, thumbnail_url) {
        (Some(url), thumbnail_url) => Some(CoverImage { url, thumbnail_url }),
        (None, Some(thumbnail)) => Some(CoverImage {
            url: thumbnail.clone(),
            thumbnail_url: Some(thumbnail),
        }),
        (None, None) => None,
    }
}

fn content_from_value(value: Value) -> Vec<ContentBlock> {
    match value {
        Value::Null => Vec::new(),
        Value::String(source) => markdown::parse_blocks(&source),
        Value::Array(items) => items.iter().map(ContentBlock::from_value).collect(),
        other => {
            tracing::debug!("Unexpected post body shape: {}", other);
            vec![ContentBlock::Unknown {
                kind: "content".to_string(),
            }]
        }
    }
}

fn timestamp_from_value(value: &Value) -> Option<DateTime<Utc>> {
    let raw = value.as_str()?;
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::debug!("Ignoring unparseable timestamp {:?}: {}", raw, e);
            None
        }
    }
}

fn string_field(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => {
            tracing::debug!("Expected a string field, found {}", other);
            String::new()
        }
    }
}

fn dedup_categories(categories: Vec<Category>) -> Vec<Category> {
    let mut unique: Vec<Category> = Vec::with_capacity(categories.len());
    for category in categories {
        if !unique.iter().any(|c| c.id == category.id) {
            unique.push(category);
        }
    }
    unique
}

/// Decode a post record in either layout
pub(crate) fn post_from_value(value: Value) -> Result<Post, serde_json::Error> {
    let mut map = match flatten_record(value) {
        Value::Object(map) => map,
        other => {
            return Err(serde::de::Error::custom(format!(
                "expected post object, found {}",
                other
            )))
        }
    };

    let id = u64::deserialize(take(&mut map, "id"))?;
    let title = string_field(take(&mut map, "title"));
    let slug = string_field(take(&mut map, "slug"));
    let content = content_from_value(take(&mut map, "content"));
    let cover_image = cover_from_value(take(&mut map, "coverImage"));
    let published_at = timestamp_from_value(&take(&mut map, "publishedAt"));
    let author = relation_one::<Author>(take(&mut map, "author"));
    let categories = dedup_categories(relation_many::<Category>(take(&mut map, "categories")));

    Ok(Post {
        id,
        title,
        slug,
        content,
        cover_image,
        published_at,
        author,
        categories,
    })
}
