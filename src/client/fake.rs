//! In-memory store for tests.
//!
//! Answers by parameter rather than by parsing the expression: `$category`
//! selects rows whose `category` array contains the tag, `$id` selects the
//! row with that `_id`. Calls can be held open to reproduce races.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::app::{GazetteError, Result};
use crate::client::DocumentStore;
use crate::query::{QueryOptions, QueryParams};

#[derive(Debug, Clone, Copy)]
enum Failure {
    Unavailable,
    Query,
}

pub struct FakeStore {
    documents: Mutex<Vec<Value>>,
    failure: Mutex<Option<Failure>>,
    gates: Mutex<VecDeque<oneshot::Receiver<()>>>,
    calls: Mutex<Vec<(String, QueryParams, QueryOptions)>>,
}

impl FakeStore {
    pub fn with_documents(documents: Vec<Value>) -> Self {
        Self {
            documents: Mutex::new(documents),
            failure: Mutex::new(None),
            gates: Mutex::new(VecDeque::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn unavailable() -> Self {
        let store = Self::with_documents(Vec::new());
        *store.failure.lock().unwrap() = Some(Failure::Unavailable);
        store
    }

    pub fn rejecting_queries() -> Self {
        let store = Self::with_documents(Vec::new());
        *store.failure.lock().unwrap() = Some(Failure::Query);
        store
    }

    pub fn set_documents(&self, documents: Vec<Value>) {
        *self.documents.lock().unwrap() = documents;
    }

    pub fn set_unavailable(&self, unavailable: bool) {
        *self.failure.lock().unwrap() = unavailable.then_some(Failure::Unavailable);
    }

    /// The next call waits until the returned sender fires (or is dropped).
    pub fn hold_next(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.gates.lock().unwrap().push_back(rx);
        tx
    }

    pub fn calls(&self) -> Vec<(String, QueryParams, QueryOptions)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    fn matching_rows(&self, params: &QueryParams) -> Vec<Value> {
        let documents = self.documents.lock().unwrap();

        if let Some(tag) = params.get("category") {
            return documents
                .iter()
                .filter(|row| {
                    row.get("category")
                        .and_then(Value::as_array)
                        .is_some_and(|tags| tags.contains(tag))
                })
                .cloned()
                .collect();
        }

        if let Some(id) = params.get("id") {
            return documents
                .iter()
                .filter(|row| row.get("_id") == Some(id))
                .take(1)
                .cloned()
                .collect();
        }

        documents.clone()
    }
}

#[async_trait]
impl DocumentStore for FakeStore {
    async fn query(
        &self,
        expression: &str,
        params: &QueryParams,
        options: QueryOptions,
    ) -> Result<Vec<Value>> {
        self.calls
            .lock()
            .unwrap()
            .push((expression.to_string(), params.clone(), options));

        let gate = self.gates.lock().unwrap().pop_front();
        if let Some(gate) = gate {
            let _ = gate.await;
        }

        let failure = *self.failure.lock().unwrap();
        match failure {
            Some(Failure::Unavailable) => Err(GazetteError::StoreUnavailable(
                "connection refused".into(),
            )),
            Some(Failure::Query) => Err(GazetteError::Query("queryParseError".into())),
            None => Ok(self.matching_rows(params)),
        }
    }
}
