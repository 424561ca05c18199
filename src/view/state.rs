use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;

use crate::app::{GazetteError, Result};

/// Lifecycle of one view's data.
#[derive(Debug, Clone)]
pub enum ViewState<T> {
    Loading,
    Loaded(T),
    Failed(Arc<GazetteError>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusTag {
    Loading,
    Loaded,
    Failed,
}

impl<T> ViewState<T> {
    pub fn tag(&self) -> StatusTag {
        match self {
            ViewState::Loading => StatusTag::Loading,
            ViewState::Loaded(_) => StatusTag::Loaded,
            ViewState::Failed(_) => StatusTag::Failed,
        }
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            ViewState::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&GazetteError> {
        match self {
            ViewState::Failed(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub enum ViewEvent<T> {
    Started,
    Completed(Result<T>),
}

/// The single transition function.
///
/// A completion only moves a `Loading` state; anything else is left as is.
pub fn transition<T>(state: ViewState<T>, event: ViewEvent<T>) -> ViewState<T> {
    match (state, event) {
        (_, ViewEvent::Started) => ViewState::Loading,
        (ViewState::Loading, ViewEvent::Completed(Ok(value))) => ViewState::Loaded(value),
        (ViewState::Loading, ViewEvent::Completed(Err(e))) => ViewState::Failed(Arc::new(e)),
        (state, ViewEvent::Completed(_)) => state,
    }
}

/// Issued when a fetch starts; only the latest ticket may complete.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(&self) -> u64 {
        self.0
    }
}

/// State plus the request generation counter for one view instance.
pub struct ViewMachine<T> {
    generation: u64,
    state: ViewState<T>,
    subscribers: Vec<mpsc::UnboundedSender<StatusTag>>,
}

impl<T> Default for ViewMachine<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ViewMachine<T> {
    pub fn new() -> Self {
        Self {
            generation: 0,
            state: ViewState::Loading,
            subscribers: Vec::new(),
        }
    }

    pub fn state(&self) -> &ViewState<T> {
        &self.state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        ticket.0 == self.generation
    }

    /// Notified with the new tag whenever the tag changes.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<StatusTag> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    pub fn begin(&mut self) -> Ticket {
        self.generation += 1;
        self.apply(ViewEvent::Started);
        Ticket(self.generation)
    }

    /// Applies the result if `ticket` is still current. Returns whether it was.
    pub fn complete(&mut self, ticket: Ticket, result: Result<T>) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.apply(ViewEvent::Completed(result));
        true
    }

    fn apply(&mut self, event: ViewEvent<T>) {
        let before = self.state.tag();
        let state = std::mem::replace(&mut self.state, ViewState::Loading);
        self.state = transition(state, event);

        let after = self.state.tag();
        if after != before {
            self.subscribers.retain(|tx| tx.send(after).is_ok());
        }
    }
}
