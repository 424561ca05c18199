use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use super::author::WireAuthor;
use super::{null_as_default, Author, Block};
use crate::app::{GazetteError, Result};
use crate::asset::AssetReference;

/// A news document as returned by the store, references already expanded.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub title: Option<String>,
    pub content: Vec<Block>,
    pub publish_time: Option<DateTime<Utc>>,
    pub category: Vec<String>,
    pub poster: Option<AssetReference>,
    pub author: Option<Author>,
}

#[derive(Debug, Deserialize)]
struct WireDocument {
    #[serde(rename = "_id")]
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    content: Vec<Block>,
    #[serde(rename = "publishTime", default)]
    publish_time: Option<DateTime<Utc>>,
    // Older datasets spell the field in lowercase.
    #[serde(rename = "publishtime", default)]
    publish_time_lowercase: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    category: Vec<String>,
    #[serde(default)]
    poster: Option<WirePoster>,
    #[serde(default)]
    author: Option<WireAuthor>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum WirePoster {
    Bare(String),
    Image {
        #[serde(default)]
        asset: Option<WireRef>,
        #[serde(rename = "_ref", default)]
        reference: Option<String>,
    },
    /// Any other shape; kept verbatim so asset resolution rejects it.
    Unrecognized(Value),
}

#[derive(Debug, Deserialize)]
struct WireRef {
    #[serde(rename = "_ref", default)]
    reference: Option<String>,
}

impl WirePoster {
    fn into_reference(self) -> Option<AssetReference> {
        let raw = match self {
            WirePoster::Bare(s) => Some(s),
            WirePoster::Image { asset, reference } => {
                asset.and_then(|a| a.reference).or(reference)
            }
            WirePoster::Unrecognized(other) => Some(other.to_string()),
        };
        raw.map(AssetReference::new)
    }
}

impl Document {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: None,
            content: Vec::new(),
            publish_time: None,
            category: Vec::new(),
            poster: None,
            author: None,
        }
    }

    /// Decode one result row. Shape mismatches are query errors, except for
    /// the poster, which degrades on its own when rendered.
    pub fn from_value(value: Value) -> Result<Self> {
        let hint = value
            .get("_id")
            .and_then(Value::as_str)
            .unwrap_or("<unknown>")
            .to_string();

        let wire: WireDocument = serde_json::from_value(value)
            .map_err(|e| GazetteError::Query(format!("document {}: {}", hint, e)))?;

        let author = match wire.author {
            Some(a) => Some(a.into_author(&wire.id)?),
            None => None,
        };

        Ok(Self {
            poster: wire.poster.and_then(WirePoster::into_reference),
            id: wire.id,
            title: wire.title,
            content: wire.content,
            publish_time: wire.publish_time.or(wire.publish_time_lowercase),
            category: wire.category,
            author,
        })
    }

    pub fn has_category(&self, tag: &str) -> bool {
        self.category.iter().any(|c| c == tag)
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or("(Untitled)")
    }

    /// Text of the first span of the first block, if the body has one.
    pub fn first_body_text(&self) -> &str {
        self.content
            .first()
            .and_then(Block::first_span_text)
            .unwrap_or("")
    }

    pub fn author_name(&self) -> Option<&str> {
        self.author.as_ref().and_then(Author::display_name)
    }
}
