//! Background dataset fetch.
//!
//! [`FetchOrchestrator`] spawns a tokio task that loads the dataset once and
//! reports the outcome as a single [`FetchEvent`] over an `mpsc` channel, so
//! the TUI loop can pick it up without shared mutable state.

use std::sync::Arc;

use census_core::models::Record;
use census_data::source::DataSource;
use tokio::sync::mpsc;

// ── Public types ──────────────────────────────────────────────────────────────

/// Outcome of the startup fetch.
#[derive(Debug, Clone)]
pub enum FetchEvent {
    /// The full record list. Replaces any previous list wholesale.
    Loaded(Arc<[Record]>),
    /// Human-readable failure; the record list stays as it was.
    Failed(String),
}

// ── FetchOrchestrator ─────────────────────────────────────────────────────────

/// Fire-and-forget loader for the character dataset.
pub struct FetchOrchestrator {
    source: DataSource,
}

impl FetchOrchestrator {
    pub fn new(source: DataSource) -> Self {
        Self { source }
    }

    /// Spawn the fetch task.
    ///
    /// Returns the receiving end of the event channel (exactly one event is
    /// ever sent) and a [`FetchHandle`] to abort the task early.
    pub fn start(self) -> (mpsc::Receiver<FetchEvent>, FetchHandle) {
        let (tx, rx) = mpsc::channel(1);

        let handle = tokio::spawn(async move {
            let event = fetch_records(&self.source).await;
            if let Err(e) = tx.send(event).await {
                tracing::warn!(error = %e, "fetch result dropped; receiver closed");
            }
        });

        (rx, FetchHandle { handle })
    }
}

/// Load `source` once and wrap the outcome as a [`FetchEvent`].
pub async fn fetch_records(source: &DataSource) -> FetchEvent {
    tracing::info!(source = %source.describe(), "loading dataset");
    match source.load().await {
        Ok(records) => FetchEvent::Loaded(records.into()),
        Err(e) => {
            tracing::error!(error = %e, "dataset load failed");
            FetchEvent::Failed(e.to_string())
        }
    }
}

// ── FetchHandle ───────────────────────────────────────────────────────────────

/// A handle to the background fetch task.
pub struct FetchHandle {
    handle: tokio::task::JoinHandle<()>,
}

impl FetchHandle {
    /// Abort the fetch if it is still running.
    pub fn abort(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
