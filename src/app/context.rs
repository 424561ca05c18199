use std::path::PathBuf;
use std::sync::Arc;

use crate::app::error::{GazetteError, Result};
use crate::client::{DocumentStore, HttpStore, QueryClient};
use crate::config::{Config, ViewConfig};
use crate::view::{CategorizedFeed, DetailView, RecordBuilder};

pub struct AppContext {
    pub config: Config,
    pub client: Arc<QueryClient>,
    pub records: RecordBuilder,
}

impl AppContext {
    pub fn new(config_path: Option<PathBuf>) -> Result<Self> {
        let config = match config_path {
            Some(p) => Config::load_from(&p),
            None => Config::load(),
        }
        .map_err(|e| GazetteError::Config(e.to_string()))?;

        Self::from_config(config)
    }

    pub fn from_config(config: Config) -> Result<Self> {
        let store: Arc<dyn DocumentStore + Send + Sync> = Arc::new(HttpStore::new(&config.store)?);
        Self::with_store(config, store)
    }

    /// Wire the views against any store, e.g. a fake in tests.
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore + Send + Sync>) -> Result<Self> {
        let client = Arc::new(QueryClient::with_cache_ttl(store, config.store.cache_ttl()));
        let records = RecordBuilder::from_config(&config)?;

        Ok(Self {
            config,
            client,
            records,
        })
    }

    pub fn feed(&self, view: ViewConfig) -> Arc<CategorizedFeed> {
        CategorizedFeed::new(self.client.clone(), &self.config.store.document_type, view)
    }

    /// Feed for a category, named after its configured view if there is one.
    pub fn feed_for(&self, category: &str) -> Arc<CategorizedFeed> {
        let view = self
            .config
            .view_for(category)
            .unwrap_or_else(|| ViewConfig::new(category, category));
        self.feed(view)
    }

    pub fn detail(&self) -> Arc<DetailView> {
        DetailView::new(self.client.clone(), &self.config.store.document_type)
    }
}
