//! Post-commit notifications.

use std::sync::Mutex;

use notedb_refs::RefUpdate;
use notedb_types::PersonIdent;
use serde::{Deserialize, Serialize};

/// Refs moved by one successful metadata write.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefUpdatedEvent {
    pub project: String,
    pub updates: Vec<RefUpdate>,
    pub actor: Option<PersonIdent>,
}

impl RefUpdatedEvent {
    pub fn ref_names(&self) -> Vec<&str> {
        self.updates.iter().map(|u| u.name.as_str()).collect()
    }
}

/// Receives an event after every successful metadata write.
///
/// Called synchronously on the writing thread, after the batch landed.
/// Implementations must not fail the write; they log and move on.
pub trait RefUpdateListener: Send + Sync {
    fn on_refs_updated(&self, event: &RefUpdatedEvent);
}

/// Listener that ignores every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopRefUpdateListener;

impl RefUpdateListener for NoopRefUpdateListener {
    fn on_refs_updated(&self, _event: &RefUpdatedEvent) {}
}

/// Listener that keeps every event it sees.
#[derive(Debug, Default)]
pub struct RecordingRefUpdateListener {
    events: Mutex<Vec<RefUpdatedEvent>>,
}

impl RecordingRefUpdateListener {
    pub fn new() -> Self {
        Self::default()
    }

    /// A copy of the recorded events, oldest first.
    pub fn events(&self) -> Vec<RefUpdatedEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl RefUpdateListener for RecordingRefUpdateListener {
    fn on_refs_updated(&self, event: &RefUpdatedEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}
