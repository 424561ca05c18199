//! Configuration management for Gazette.
//!
//! Configuration is read from `~/.config/gazette/config.toml` at startup.
//! If the file doesn't exist, a default configuration with comments is created.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::format::{Item, StrftimeItems};
use serde::Deserialize;

use crate::asset::ImageOptions;

/// Main configuration struct.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,
    pub assets: AssetConfig,
    pub display: DisplayConfig,
    pub views: Vec<ViewConfig>,
}

/// Connection settings for the document store.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    pub project_id: String,
    pub dataset: String,
    /// `YYYY-MM-DD`, `1` or `X`
    pub api_version: String,
    /// Serve cacheable reads from the CDN host
    pub use_cdn: bool,
    /// Replaces `https://<project>.api.sanity.io`, e.g. a local proxy
    pub api_host: Option<String>,
    pub token: Option<String>,
    pub timeout_secs: u64,
    /// Client-side result cache lifetime, 0 disables it
    pub cache_ttl_secs: u64,
    pub document_type: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            project_id: "your-project-id".to_string(),
            dataset: "production".to_string(),
            api_version: "2024-01-01".to_string(),
            use_cdn: true,
            api_host: None,
            token: None,
            timeout_secs: 10,
            cache_ttl_secs: 60,
            document_type: crate::query::DEFAULT_DOCUMENT_TYPE.to_string(),
        }
    }
}

impl StoreConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    pub cdn_base: String,
    /// Shown when a poster is missing or its reference is malformed
    pub placeholder_url: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub format: Option<String>,
    pub quality: Option<u8>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            cdn_base: "https://cdn.sanity.io".to_string(),
            placeholder_url: "https://via.placeholder.com/400x225?text=No+image".to_string(),
            width: None,
            height: None,
            format: None,
            quality: None,
        }
    }
}

impl AssetConfig {
    pub fn image_options(&self) -> ImageOptions {
        ImageOptions {
            width: self.width,
            height: self.height,
            format: self.format.clone(),
            quality: self.quality,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// chrono strftime format for publish dates
    pub date_format: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: "%a %b %d %Y".to_string(),
        }
    }
}

/// A named view bound to one category tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ViewConfig {
    pub name: String,
    pub category: String,
}

impl ViewConfig {
    pub fn new(name: &str, category: &str) -> Self {
        Self {
            name: name.to_string(),
            category: category.to_string(),
        }
    }
}

fn default_views() -> Vec<ViewConfig> {
    vec![
        ViewConfig::new("Headlines", "headline"),
        ViewConfig::new("Business", "business"),
        ViewConfig::new("Sports", "sports"),
        ViewConfig::new("Entertainment", "entertainment"),
    ]
}

fn is_slug(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

fn is_api_version(s: &str) -> bool {
    if s == "1" || s == "X" {
        return true;
    }
    chrono::NaiveDate::parse_from_str(s, "%Y-%m-%d").is_ok()
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, creates a default one with comments.
    /// If the config file exists but is invalid, returns an error.
    /// Missing fields in the config file will use default values.
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = Self::default_config_path()?;

        if !config_path.exists() {
            Self::create_default_config(&config_path)?;
        }

        Self::load_from(&config_path)
    }

    /// Load and validate configuration from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path: `~/.config/gazette/config.toml`
    pub fn default_config_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gazette").join("config.toml"))
    }

    /// Configured views, or the stock ones when none are listed.
    pub fn views(&self) -> Vec<ViewConfig> {
        if self.views.is_empty() {
            default_views()
        } else {
            self.views.clone()
        }
    }

    pub fn view_for(&self, category: &str) -> Option<ViewConfig> {
        self.views().into_iter().find(|v| v.category == category)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let store = &self.store;
        if !is_slug(&store.project_id) {
            return Err(ConfigError::Invalid(format!(
                "store.project_id must be lowercase alphanumeric, got {:?}",
                store.project_id
            )));
        }
        if !is_slug(&store.dataset) {
            return Err(ConfigError::Invalid(format!(
                "store.dataset must be lowercase alphanumeric, got {:?}",
                store.dataset
            )));
        }
        if !is_api_version(&store.api_version) {
            return Err(ConfigError::Invalid(format!(
                "store.api_version must be YYYY-MM-DD, 1 or X, got {:?}",
                store.api_version
            )));
        }
        if store.document_type.trim().is_empty() {
            return Err(ConfigError::Invalid("store.document_type is empty".into()));
        }

        if StrftimeItems::new(&self.display.date_format).any(|i| matches!(i, Item::Error)) {
            return Err(ConfigError::Invalid(format!(
                "display.date_format is not a valid strftime format: {:?}",
                self.display.date_format
            )));
        }

        let views = self.views();
        for (i, view) in views.iter().enumerate() {
            if view.category.trim().is_empty() {
                return Err(ConfigError::Invalid(format!(
                    "view {:?} has an empty category",
                    view.name
                )));
            }
            if views[..i].iter().any(|v| v.category == view.category) {
                return Err(ConfigError::Invalid(format!(
                    "category {:?} is used by more than one view",
                    view.category
                )));
            }
        }

        Ok(())
    }

    /// Create a default config file with comments.
    fn create_default_config(path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        let mut file = fs::File::create(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        file.write_all(Self::default_config_content().as_bytes())
            .map_err(|e| ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })?;

        Ok(())
    }

    /// Generate the default config file content with comments.
    fn default_config_content() -> String {
        r##"# Gazette Configuration

[store]
# Project and dataset of the content store
project_id = "your-project-id"
dataset = "production"
api_version = "2024-01-01"

# Serve cacheable reads (article pages) from the CDN.
# Feeds always bypass it so editorial changes show up immediately.
use_cdn = true

# Point at a proxy or self-hosted store instead of the hosted API
# api_host = "http://localhost:3333"

# Read token for private datasets
# token = "sk..."

timeout_secs = 10

# Client-side result cache lifetime, 0 disables it
cache_ttl_secs = 60

document_type = "news"

[assets]
cdn_base = "https://cdn.sanity.io"
placeholder_url = "https://via.placeholder.com/400x225?text=No+image"

# Optional image transformation
# width = 400
# height = 225
# format = "webp"
# quality = 80

[display]
# chrono strftime format, e.g. "Mon Jan 01 2024"
date_format = "%a %b %d %Y"

[[views]]
name = "Headlines"
category = "headline"

[[views]]
name = "Business"
category = "business"

[[views]]
name = "Sports"
category = "sports"

[[views]]
name = "Entertainment"
category = "entertainment"
"##
        .to_string()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,

    #[error("Failed to read/write config file at {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_deserializes() {
        let content = Config::default_config_content();
        let config: Config = toml::from_str(&content).expect("Default config should be valid TOML");

        assert_eq!(config.store.dataset, "production");
        assert!(config.store.use_cdn);
        assert_eq!(config.views.len(), 4);
        assert_eq!(config.views[2], ViewConfig::new("Sports", "sports"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_config() {
        let content = r##"
[store]
project_id = "abc123"
use_cdn = false
"##;
        let config: Config = toml::from_str(content).expect("Partial config should work");

        assert_eq!(config.store.project_id, "abc123");
        assert!(!config.store.use_cdn);
        // Defaults
        assert_eq!(config.store.dataset, "production");
        assert_eq!(config.display.date_format, "%a %b %d %Y");
        assert_eq!(config.views().len(), 4);
    }

    #[test]
    fn test_empty_config() {
        let config: Config = toml::from_str("").expect("Empty config should work");
        assert_eq!(config.store.timeout(), Duration::from_secs(10));
        assert_eq!(config.store.cache_ttl(), Duration::from_secs(60));
        assert_eq!(config.view_for("headline").unwrap().name, "Headlines");
    }

    #[test]
    fn test_image_options() {
        let content = r##"
[assets]
width = 400
format = "webp"
"##;
        let config: Config = toml::from_str(content).unwrap();
        let options = config.assets.image_options();
        assert_eq!(options.width, Some(400));
        assert_eq!(options.format.as_deref(), Some("webp"));
        assert_eq!(options.height, None);
    }

    #[test]
    fn test_rejects_bad_project_id() {
        let mut config = Config::default();
        config.store.project_id = "My Project".into();
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_bad_api_version() {
        let mut config = Config::default();
        config.store.api_version = "2024-13-01".into();
        assert!(config.validate().is_err());

        config.store.api_version = "X".into();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_date_format() {
        let mut config = Config::default();
        config.display.date_format = "%Q".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_duplicate_categories() {
        let mut config = Config::default();
        config.views = vec![
            ViewConfig::new("Top", "headline"),
            ViewConfig::new("Front page", "headline"),
        ];
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r##"
[store]
project_id = "newsroom"

[[views]]
name = "Sports"
category = "sports"
"##,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.store.project_id, "newsroom");
        assert_eq!(config.views(), vec![ViewConfig::new("Sports", "sports")]);
    }

    #[test]
    fn test_load_from_invalid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[store\nproject_id = 1").unwrap();
        assert!(matches!(
            Config::load_from(&path),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Config::load_from(&dir.path().join("nope.toml")),
            Err(ConfigError::Io { .. })
        ));
    }
}
