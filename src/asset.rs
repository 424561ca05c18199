//! Display URLs for store-managed assets.
//!
//! Asset references are opaque tokens minted by the store:
//!
//! ```text
//! image-<assetId>-<width>x<height>-<format>   → {cdn}/images/{project}/{dataset}/<assetId>-<w>x<h>.<format>
//! file-<assetId>-<extension>                  → {cdn}/files/{project}/{dataset}/<assetId>.<extension>
//! ```
//!
//! Resolution is pure string work: nothing is fetched and reachability is never
//! checked.

use url::Url;

use crate::app::{GazetteError, Result};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssetReference(String);

impl AssetReference {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Transformation parameters appended to image URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageOptions {
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub quality: Option<u8>,
}

impl ImageOptions {
    fn is_empty(&self) -> bool {
        self.width.is_none()
            && self.height.is_none()
            && self.format.is_none()
            && self.quality.is_none()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParsedAsset<'a> {
    Image {
        id: &'a str,
        width: u32,
        height: u32,
        format: &'a str,
    },
    File {
        id: &'a str,
        extension: &'a str,
    },
}

fn is_token(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_alphanumeric())
}

fn parse_reference(raw: &str) -> Option<ParsedAsset<'_>> {
    if let Some(rest) = raw.strip_prefix("image-") {
        let mut parts = rest.rsplitn(3, '-');
        let format = parts.next()?;
        let dims = parts.next()?;
        let id = parts.next()?;
        let (w, h) = dims.split_once('x')?;
        let width: u32 = w.parse().ok().filter(|v| *v > 0)?;
        let height: u32 = h.parse().ok().filter(|v| *v > 0)?;
        if !is_token(id) || !is_token(format) {
            return None;
        }
        return Some(ParsedAsset::Image {
            id,
            width,
            height,
            format,
        });
    }

    if let Some(rest) = raw.strip_prefix("file-") {
        let (id, extension) = rest.rsplit_once('-')?;
        if !is_token(id) || !is_token(extension) {
            return None;
        }
        return Some(ParsedAsset::File { id, extension });
    }

    None
}

#[derive(Debug, Clone)]
pub struct AssetUrlResolver {
    cdn_base: Url,
    project_id: String,
    dataset: String,
    options: ImageOptions,
}

impl AssetUrlResolver {
    pub fn new(cdn_base: &str, project_id: &str, dataset: &str) -> Result<Self> {
        Ok(Self {
            cdn_base: Url::parse(cdn_base)?,
            project_id: project_id.to_string(),
            dataset: dataset.to_string(),
            options: ImageOptions::default(),
        })
    }

    /// Default transformation applied by [`resolve`](Self::resolve).
    pub fn with_options(mut self, options: ImageOptions) -> Self {
        self.options = options;
        self
    }

    pub fn resolve(&self, reference: &AssetReference) -> Result<String> {
        self.resolve_with(reference, &self.options)
    }

    pub fn resolve_with(&self, reference: &AssetReference, options: &ImageOptions) -> Result<String> {
        let parsed = parse_reference(reference.as_str())
            .ok_or_else(|| GazetteError::InvalidAssetReference(reference.as_str().to_string()))?;

        let path = match parsed {
            ParsedAsset::Image {
                id,
                width,
                height,
                format,
            } => format!(
                "images/{}/{}/{}-{}x{}.{}",
                self.project_id, self.dataset, id, width, height, format
            ),
            ParsedAsset::File { id, extension } => {
                format!("files/{}/{}/{}.{}", self.project_id, self.dataset, id, extension)
            }
        };

        let base = self.cdn_base.as_str().trim_end_matches('/');
        let mut url = Url::parse(&format!("{}/{}", base, path))?;

        if matches!(parsed, ParsedAsset::Image { .. }) && !options.is_empty() {
            let mut query = url.query_pairs_mut();
            if let Some(w) = options.width {
                query.append_pair("w", &w.to_string());
            }
            if let Some(h) = options.height {
                query.append_pair("h", &h.to_string());
            }
            if let Some(ref fm) = options.format {
                query.append_pair("fm", fm);
            }
            if let Some(q) = options.quality {
                query.append_pair("q", &q.min(100).to_string());
            }
        }

        Ok(url.into())
    }
}
