//! Render-ready records derived from documents.
//!
//! Field-level problems never fail a record: a malformed poster falls back to
//! the placeholder, a dangling author renders as `None`, an empty body yields an
//! empty excerpt.

use chrono::format::{Item, StrftimeItems};
use serde::Serialize;
use tracing::warn;

use crate::app::{GazetteError, Result};
use crate::asset::AssetUrlResolver;
use crate::config::Config;
use crate::domain::Document;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderRecord {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub poster_url: String,
    pub publish_date: String,
    pub author_name: Option<String>,
    pub categories: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailRecord {
    #[serde(flatten)]
    pub summary: RenderRecord,
    pub author_email: Option<String>,
    /// Plain text of each text block, in order
    pub body: Vec<String>,
}

pub struct RecordBuilder {
    resolver: AssetUrlResolver,
    placeholder_url: String,
    date_format: String,
}

impl RecordBuilder {
    pub fn new(resolver: AssetUrlResolver, placeholder_url: &str, date_format: &str) -> Result<Self> {
        if StrftimeItems::new(date_format).any(|i| matches!(i, Item::Error)) {
            return Err(GazetteError::Config(format!(
                "invalid date format: {:?}",
                date_format
            )));
        }

        Ok(Self {
            resolver,
            placeholder_url: placeholder_url.to_string(),
            date_format: date_format.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let resolver = AssetUrlResolver::new(
            &config.assets.cdn_base,
            &config.store.project_id,
            &config.store.dataset,
        )?
        .with_options(config.assets.image_options());

        Self::new(
            resolver,
            &config.assets.placeholder_url,
            &config.display.date_format,
        )
    }

    pub fn poster_url(&self, doc: &Document) -> String {
        let Some(ref poster) = doc.poster else {
            return self.placeholder_url.clone();
        };

        match self.resolver.resolve(poster) {
            Ok(url) => url,
            Err(e) => {
                warn!("Document {}: {}, using placeholder", doc.id, e);
                self.placeholder_url.clone()
            }
        }
    }

    pub fn publish_date(&self, doc: &Document) -> String {
        doc.publish_time
            .map(|t| t.format(&self.date_format).to_string())
            .unwrap_or_default()
    }

    pub fn render(&self, doc: &Document) -> RenderRecord {
        if doc.author.is_none() {
            tracing::debug!("Document {} has no resolvable author", doc.id);
        }

        RenderRecord {
            id: doc.id.clone(),
            title: doc.display_title().to_string(),
            excerpt: doc.first_body_text().to_string(),
            poster_url: self.poster_url(doc),
            publish_date: self.publish_date(doc),
            author_name: doc.author_name().map(String::from),
            categories: doc.category.clone(),
        }
    }

    pub fn render_all(&self, docs: &[Document]) -> Vec<RenderRecord> {
        docs.iter().map(|d| self.render(d)).collect()
    }

    pub fn detail(&self, doc: &Document) -> DetailRecord {
        DetailRecord {
            summary: self.render(doc),
            author_email: doc.author.as_ref().and_then(|a| a.email.clone()),
            body: doc
                .content
                .iter()
                .filter(|b| b.kind == "block")
                .map(|b| b.plain_text())
                .collect(),
        }
    }
}
