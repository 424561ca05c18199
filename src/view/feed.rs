use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::app::{ErrorKind, Result};
use crate::client::QueryClient;
use crate::config::ViewConfig;
use crate::domain::Document;
use crate::query::{DocumentQuery, QueryOptions};
use crate::view::record::{RecordBuilder, RenderRecord};
use crate::view::state::{StatusTag, Ticket, ViewMachine, ViewState};

pub type FeedState = ViewState<Vec<Document>>;

struct FeedInner {
    view: ViewConfig,
    machine: ViewMachine<Vec<Document>>,
}

/// One categorized view: a single query per activation, latest activation wins.
pub struct CategorizedFeed {
    client: Arc<QueryClient>,
    document_type: String,
    inner: Mutex<FeedInner>,
}

impl CategorizedFeed {
    pub fn new(client: Arc<QueryClient>, document_type: &str, view: ViewConfig) -> Arc<Self> {
        Arc::new(Self {
            client,
            document_type: document_type.to_string(),
            inner: Mutex::new(FeedInner {
                view,
                machine: ViewMachine::new(),
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, FeedInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn name(&self) -> String {
        self.lock().view.name.clone()
    }

    pub fn category(&self) -> String {
        self.lock().view.category.clone()
    }

    pub fn state(&self) -> FeedState {
        self.lock().machine.state().clone()
    }

    pub fn status(&self) -> StatusTag {
        self.lock().machine.state().tag()
    }

    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<StatusTag> {
        self.lock().machine.subscribe()
    }

    /// Render records, only once loaded.
    pub fn records(&self, builder: &RecordBuilder) -> Option<Vec<RenderRecord>> {
        let inner = self.lock();
        inner.machine.state().loaded().map(|docs| builder.render_all(docs))
    }

    /// Resets to `Loading` and issues the fetch.
    ///
    /// The ticket is taken when this is called, not when the future is first
    /// polled, so issuance order is call order.
    pub fn activate(self: &Arc<Self>) -> impl Future<Output = StatusTag> + Send + 'static {
        let (ticket, query) = {
            let mut inner = self.lock();
            let ticket = inner.machine.begin();
            let query = DocumentQuery::by_category(&self.document_type, &inner.view.category);
            (ticket, query)
        };
        debug!(
            "Feed {} issued fetch #{}",
            self.name(),
            ticket.generation()
        );

        let feed = Arc::clone(self);
        async move {
            let result = feed.client.fetch_query(&query, QueryOptions::fresh()).await;
            feed.finish(ticket, result)
        }
    }

    /// Switches the category and re-activates.
    pub fn set_category(
        self: &Arc<Self>,
        category: &str,
    ) -> impl Future<Output = StatusTag> + Send + 'static {
        self.lock().view.category = category.to_string();
        self.activate()
    }

    fn finish(&self, ticket: Ticket, result: Result<Vec<Document>>) -> StatusTag {
        let mut inner = self.lock();
        let name = inner.view.name.clone();

        if !inner.machine.is_current(ticket) {
            debug!(
                "Feed {} discarding stale result #{} (current #{})",
                name,
                ticket.generation(),
                inner.machine.generation()
            );
            return inner.machine.state().tag();
        }

        match result {
            Ok(ref docs) => info!("Feed {} loaded {} documents", name, docs.len()),
            Err(ref e) if e.kind() == ErrorKind::StoreUnavailable => {
                warn!("Feed {} failed: {}", name, e)
            }
            Err(ref e) => error!("Feed {} failed: {}", name, e),
        }

        inner.machine.complete(ticket, result);
        inner.machine.state().tag()
    }
}
