pub mod cache;
#[cfg(test)]
pub mod fake;
pub mod http;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::app::Result;
use crate::domain::Document;
use crate::query::{params, DocumentQuery, QueryOptions, QueryParams};

pub use cache::QueryCache;
pub use http::HttpStore;

/// Read-only transport to the document store.
///
/// Rows come back in store order, undecoded.
#[async_trait]
pub trait DocumentStore {
    async fn query(
        &self,
        expression: &str,
        params: &QueryParams,
        options: QueryOptions,
    ) -> Result<Vec<Value>>;
}

/// Validates, caches and decodes queries against an injected store.
pub struct QueryClient {
    store: Arc<dyn DocumentStore + Send + Sync>,
    cache: QueryCache,
}

impl QueryClient {
    pub fn new(store: Arc<dyn DocumentStore + Send + Sync>) -> Self {
        Self::with_cache_ttl(store, cache::DEFAULT_TTL)
    }

    pub fn with_cache_ttl(store: Arc<dyn DocumentStore + Send + Sync>, ttl: Duration) -> Self {
        Self {
            store,
            cache: QueryCache::new(ttl),
        }
    }

    pub async fn fetch(
        &self,
        expression: &str,
        params: &QueryParams,
        options: QueryOptions,
    ) -> Result<Vec<Document>> {
        params::validate(expression, params)?;

        let key = QueryCache::key(expression, params);
        if !options.bypass_cache {
            if let Some(documents) = self.cache.get(&key) {
                tracing::debug!("Cache hit for {} ({} documents)", &key[..8], documents.len());
                return Ok(documents);
            }
        }

        let issued = self.cache.issue();
        let rows = self.store.query(expression, params, options).await?;
        let documents = rows
            .into_iter()
            .map(Document::from_value)
            .collect::<Result<Vec<_>>>()?;

        self.cache.put(key, issued, documents.clone());
        Ok(documents)
    }

    pub async fn fetch_query(
        &self,
        query: &DocumentQuery,
        options: QueryOptions,
    ) -> Result<Vec<Document>> {
        self.fetch(&query.expression(), &query.params(), options)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::fake::FakeStore;
    use super::*;
    use crate::app::GazetteError;
    use serde_json::json;
    use tokio_test::{assert_pending, assert_ready, task};

    fn client(store: &Arc<FakeStore>) -> QueryClient {
        QueryClient::new(store.clone())
    }

    #[tokio::test]
    async fn test_fetch_decodes_in_store_order() {
        let store = Arc::new(FakeStore::with_documents(vec![
            json!({ "_id": "c", "category": ["sports"] }),
            json!({ "_id": "a", "category": ["sports"] }),
            json!({ "_id": "b", "category": ["sports"] }),
        ]));
        let query = DocumentQuery::by_category("news", "sports");

        let docs = client(&store)
            .fetch_query(&query, QueryOptions::default())
            .await
            .unwrap();
        let ids: Vec<_> = docs.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[tokio::test]
    async fn test_cached_read_skips_store() {
        let store = Arc::new(FakeStore::with_documents(vec![json!({ "_id": "a" })]));
        let client = client(&store);
        let query = DocumentQuery::by_id("news", "a");

        client.fetch_query(&query, QueryOptions::default()).await.unwrap();
        client.fetch_query(&query, QueryOptions::default()).await.unwrap();
        assert_eq!(store.call_count(), 1);
    }

    #[tokio::test]
    async fn test_bypass_cache_never_returns_stale_result() {
        let store = Arc::new(FakeStore::with_documents(vec![
            json!({ "_id": "a", "title": "Draft", "category": ["headline"] }),
        ]));
        let client = client(&store);
        let query = DocumentQuery::by_category("news", "headline");

        let first = client.fetch_query(&query, QueryOptions::default()).await.unwrap();
        assert_eq!(first[0].display_title(), "Draft");

        store.set_documents(vec![
            json!({ "_id": "a", "title": "Published", "category": ["headline"] }),
        ]);

        let fresh = client.fetch_query(&query, QueryOptions::fresh()).await.unwrap();
        assert_eq!(fresh[0].display_title(), "Published");
        assert_eq!(store.call_count(), 2);
        assert!(store.calls()[1].2.bypass_cache);

        // The fresh result replaced the cached one.
        let cached = client.fetch_query(&query, QueryOptions::default()).await.unwrap();
        assert_eq!(cached[0].display_title(), "Published");
        assert_eq!(store.call_count(), 2);
    }

    #[tokio::test]
    async fn test_invalid_params_never_reach_store() {
        let store = Arc::new(FakeStore::with_documents(vec![]));
        let err = client(&store)
            .fetch("*[_id == $id]", &QueryParams::new(), QueryOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, GazetteError::Query(_)));
        assert_eq!(store.call_count(), 0);
    }

    #[tokio::test]
    async fn test_shape_mismatch_fails_whole_fetch() {
        let store = Arc::new(FakeStore::with_documents(vec![
            json!({ "_id": "ok", "category": ["sports"] }),
            json!({ "_id": "bad", "category": ["sports"], "content": "not blocks" }),
        ]));
        let err = client(&store)
            .fetch_query(&DocumentQuery::by_category("news", "sports"), QueryOptions::fresh())
            .await
            .unwrap_err();
        assert!(matches!(err, GazetteError::Query(_)));
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        let store = Arc::new(FakeStore::unavailable());
        let err = client(&store)
            .fetch_query(&DocumentQuery::by_category("news", "sports"), QueryOptions::fresh())
            .await
            .unwrap_err();
        assert!(matches!(err, GazetteError::StoreUnavailable(_)));
    }

    #[tokio::test]
    async fn test_superseded_fetch_does_not_overwrite_fresher_cache_entry() {
        let store = Arc::new(FakeStore::with_documents(vec![json!({ "_id": "a", "title": "Old" })]));
        let client = client(&store);
        let query = DocumentQuery::by_id("news", "a");

        let release_first = store.hold_next();
        let mut first = task::spawn(client.fetch_query(&query, QueryOptions::fresh()));
        assert_pending!(first.poll());

        store.set_documents(vec![json!({ "_id": "a", "title": "New" })]);
        let second = client.fetch_query(&query, QueryOptions::fresh()).await.unwrap();
        assert_eq!(second[0].display_title(), "New");

        // The first request answers last, with what it would have seen.
        store.set_documents(vec![json!({ "_id": "a", "title": "Old" })]);
        release_first.send(()).unwrap();
        let first = assert_ready!(first.poll()).unwrap();
        assert_eq!(first[0].display_title(), "Old");

        let cached = client.fetch_query(&query, QueryOptions::default()).await.unwrap();
        assert_eq!(cached[0].display_title(), "New");
        assert_eq!(store.call_count(), 2);
    }
}
