use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::app::{GazetteError, Result};
use crate::client::QueryClient;
use crate::domain::Document;
use crate::query::{DocumentQuery, QueryOptions};
use crate::view::record::{DetailRecord, RecordBuilder};
use crate::view::state::{StatusTag, Ticket, ViewMachine, ViewState};

pub type DetailState = ViewState<Document>;

struct DetailInner {
    id: Option<String>,
    machine: ViewMachine<Document>,
}

/// A single document by id, with the same ticket discipline as the feeds.
pub struct DetailView {
    client: Arc<QueryClient>,
    document_type: String,
    inner: Mutex<DetailInner>,
}

impl DetailView {
    pub fn new(client: Arc<QueryClient>, document_type: &str) -> Arc<Self> {
        Arc::new(Self {
            client,
            document_type: document_type.to_string(),
            inner: Mutex::new(DetailInner {
                id: None,
                machine: ViewMachine::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, DetailInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn id(&self) -> Option<String> {
        self.lock().id.clone()
    }

    pub fn state(&self) -> DetailState {
        self.lock().machine.state().clone()
    }

    pub fn status(&self) -> StatusTag {
        self.lock().machine.state().tag()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StatusTag> {
        self.lock().machine.subscribe()
    }

    pub fn record(&self, builder: &RecordBuilder) -> Option<DetailRecord> {
        self.lock().machine.state().loaded().map(|doc| builder.detail(doc))
    }

    /// Loads `id`; a later `load` supersedes any earlier one still in flight.
    pub fn load(self: &Arc<Self>, id: &str) -> impl Future<Output = StatusTag> + Send + 'static {
        self.issue(id.to_string(), QueryOptions::default())
    }

    /// Reloads the current id straight from the store.
    pub fn reload(self: &Arc<Self>) -> Option<impl Future<Output = StatusTag> + Send + 'static> {
        let id = self.id()?;
        Some(self.issue(id, QueryOptions::fresh()))
    }

    fn issue(
        self: &Arc<Self>,
        id: String,
        options: QueryOptions,
    ) -> impl Future<Output = StatusTag> + Send + 'static {
        let ticket = {
            let mut inner = self.lock();
            inner.id = Some(id.clone());
            inner.machine.begin()
        };
        let query = DocumentQuery::by_id(&self.document_type, &id);

        let view = Arc::clone(self);
        async move {
            let result = view
                .client
                .fetch_query(&query, options)
                .await
                .and_then(|docs| {
                    docs.into_iter()
                        .next()
                        .ok_or_else(|| GazetteError::DocumentNotFound(id.clone()))
                });
            view.finish(ticket, &id, result)
        }
    }

    fn finish(&self, ticket: Ticket, id: &str, result: Result<Document>) -> StatusTag {
        let mut inner = self.lock();

        if !inner.machine.is_current(ticket) {
            debug!(
                "Detail {} discarding stale result #{} (current #{})",
                id,
                ticket.generation(),
                inner.machine.generation()
            );
            return inner.machine.state().tag();
        }

        match result {
            Ok(ref doc) => info!("Loaded document {}", doc.id),
            Err(ref e) => warn!("Failed to load document {}: {}", id, e),
        }

        inner.machine.complete(ticket, result);
        inner.machine.state().tag()
    }
}
