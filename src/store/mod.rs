//! Snapshot store.
//!
//! Keeps the selected player identifier, fetches that player's snapshot
//! once, derives metrics and exposes the result through a watch channel.
//! Results are cached per identifier; a response for an identifier that is
//! no longer selected is cached but never published.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::calculate::derive_metrics;
use crate::models::{Metrics, PlayerId};
use crate::source::{SnapshotSource, SourceError};
use crate::storage::{IdentityFile, StorageError};

/// Errors surfaced by store operations (fetch failures are states, not errors).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Identifier storage failed: {0}")]
    Storage(#[from] StorageError),
}

/// What consumers see.
#[derive(Debug, Clone, PartialEq)]
pub enum StatsState {
    /// No identifier selected
    Absent,
    /// Snapshot requested, not yet answered
    Loading { id: PlayerId },
    /// Metrics derived from the fetched snapshot
    Ready {
        id: PlayerId,
        metrics: Arc<Metrics>,
        fetched_at: DateTime<Utc>,
    },
    /// The fetch failed; re-selecting the identifier retries
    Failed { id: PlayerId, error: String },
}

impl StatsState {
    pub fn id(&self) -> Option<&PlayerId> {
        match self {
            StatsState::Absent => None,
            StatsState::Loading { id }
            | StatsState::Ready { id, .. }
            | StatsState::Failed { id, .. } => Some(id),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, StatsState::Loading { .. })
    }

    pub fn metrics(&self) -> Option<&Metrics> {
        match self {
            StatsState::Ready { metrics, .. } => Some(metrics),
            _ => None,
        }
    }

    /// Short status name.
    pub fn status(&self) -> &'static str {
        match self {
            StatsState::Absent => "absent",
            StatsState::Loading { .. } => "loading",
            StatsState::Ready { .. } => "ready",
            StatsState::Failed { .. } => "failed",
        }
    }
}

enum Entry {
    Pending { ticket: u64, handle: JoinHandle<()> },
    Ready {
        metrics: Arc<Metrics>,
        fetched_at: DateTime<Utc>,
    },
    Failed { error: String },
}

impl Entry {
    fn state(&self, id: &PlayerId) -> StatsState {
        match self {
            Entry::Pending { .. } => StatsState::Loading { id: id.clone() },
            Entry::Ready {
                metrics,
                fetched_at,
            } => StatsState::Ready {
                id: id.clone(),
                metrics: Arc::clone(metrics),
                fetched_at: *fetched_at,
            },
            Entry::Failed { error } => StatsState::Failed {
                id: id.clone(),
                error: error.clone(),
            },
        }
    }
}

#[derive(Default)]
struct Inner {
    current: Option<PlayerId>,
    entries: HashMap<PlayerId, Entry>,
    next_ticket: u64,
}

/// Identifier-keyed cache of derived metrics with a single observable slot.
#[derive(Clone)]
pub struct SnapshotStore {
    source: Arc<dyn SnapshotSource>,
    identity: IdentityFile,
    inner: Arc<Mutex<Inner>>,
    slot: Arc<watch::Sender<StatsState>>,
}

impl SnapshotStore {
    /// Create the store and, if an identifier was persisted, start loading it.
    pub async fn open(
        source: Arc<dyn SnapshotSource>,
        identity: IdentityFile,
    ) -> Result<Self, StoreError> {
        let (slot, _) = watch::channel(StatsState::Absent);
        let store = Self {
            source,
            identity,
            inner: Arc::new(Mutex::new(Inner::default())),
            slot: Arc::new(slot),
        };

        match store.identity.load()? {
            Some(id) => {
                info!("Restoring identifier {}", id);
                store.activate(id).await;
            }
            None => info!("No identifier saved; nothing to load"),
        }

        Ok(store)
    }

    /// Current value of the slot.
    pub fn current(&self) -> StatsState {
        self.slot.borrow().clone()
    }

    /// Watch the slot for changes.
    pub fn subscribe(&self) -> watch::Receiver<StatsState> {
        self.slot.subscribe()
    }

    /// The selected identifier, if any.
    pub async fn identifier(&self) -> Option<PlayerId> {
        self.inner.lock().await.current.clone()
    }

    /// Cached state for `id`, regardless of which identifier is selected.
    pub async fn cached(&self, id: &PlayerId) -> Option<StatsState> {
        self.inner.lock().await.entries.get(id).map(|e| e.state(id))
    }

    /// Source's guess at the local player.
    pub async fn guess_identifier(&self) -> Result<Option<PlayerId>, SourceError> {
        self.source.guess_identifier().await
    }

    /// Persist and select `id`.
    ///
    /// Fetches only if nothing is cached or in flight for `id`, or the last
    /// attempt failed.
    pub async fn select(&self, id: PlayerId) -> Result<StatsState, StoreError> {
        self.identity.save(&id)?;
        Ok(self.activate(id).await)
    }

    /// Forget the selected identifier.
    pub async fn clear(&self) -> Result<(), StoreError> {
        self.identity.clear()?;
        let mut inner = self.inner.lock().await;
        inner.current = None;
        self.slot.send_replace(StatsState::Absent);
        info!("Identifier cleared");
        Ok(())
    }

    /// Drop the cached result for the selected identifier and fetch again.
    ///
    /// Does nothing while a fetch for it is already in flight.
    pub async fn reload(&self) -> StatsState {
        let Some(id) = self.identifier().await else {
            return StatsState::Absent;
        };
        {
            let mut inner = self.inner.lock().await;
            if !matches!(inner.entries.get(&id), Some(Entry::Pending { .. })) {
                inner.entries.remove(&id);
            }
        }
        self.activate(id).await
    }

    /// Wait until the slot is no longer loading.
    pub async fn settled(&self) -> StatsState {
        let mut rx = self.slot.subscribe();
        let result = rx.wait_for(|s| !s.is_loading()).await.map(|s| s.clone());
        result.unwrap_or_else(|_| self.current())
    }

    /// Abort in-flight fetches. For teardown only.
    pub async fn shutdown(&self) {
        let mut inner = self.inner.lock().await;
        let pending: Vec<PlayerId> = inner
            .entries
            .iter()
            .filter(|(_, e)| matches!(e, Entry::Pending { .. }))
            .map(|(id, _)| id.clone())
            .collect();

        for id in pending {
            if let Some(Entry::Pending { handle, .. }) = inner.entries.remove(&id) {
                handle.abort();
                debug!("Aborted fetch for {}", id);
            }
        }
    }

    async fn activate(&self, id: PlayerId) -> StatsState {
        let mut inner = self.inner.lock().await;
        inner.current = Some(id.clone());

        let needs_fetch = match inner.entries.get(&id) {
            None | Some(Entry::Failed { .. }) => true,
            Some(Entry::Pending { .. }) | Some(Entry::Ready { .. }) => false,
        };

        if needs_fetch {
            let ticket = inner.next_ticket;
            inner.next_ticket += 1;
            let handle = self.spawn_fetch(id.clone(), ticket);
            inner
                .entries
                .insert(id.clone(), Entry::Pending { ticket, handle });
        } else {
            debug!("Serving {} from cache", id);
        }

        let state = match inner.entries.get(&id) {
            Some(entry) => entry.state(&id),
            None => StatsState::Loading { id: id.clone() },
        };
        self.slot.send_replace(state.clone());
        state
    }

    fn spawn_fetch(&self, id: PlayerId, ticket: u64) -> JoinHandle<()> {
        let source = Arc::clone(&self.source);
        let inner = Arc::clone(&self.inner);
        let slot = Arc::clone(&self.slot);

        info!("Requesting snapshot for {} from {} source", id, source.name());
        tokio::spawn(async move {
            let outcome = source.fetch(&id).await.and_then(|snapshot| {
                snapshot.validate()?;
                Ok(snapshot)
            });

            let entry = match outcome {
                Ok(snapshot) => {
                    info!("Snapshot for {} ready ({} matches)", id, snapshot.matches);
                    Entry::Ready {
                        metrics: Arc::new(derive_metrics(&snapshot)),
                        fetched_at: Utc::now(),
                    }
                }
                Err(e) => {
                    warn!("Snapshot for {} failed: {}", id, e);
                    Entry::Failed {
                        error: e.to_string(),
                    }
                }
            };

            let mut inner = inner.lock().await;
            match inner.entries.get(&id) {
                Some(Entry::Pending { ticket: t, .. }) if *t == ticket => {}
                _ => {
                    debug!("Dropping superseded response for {}", id);
                    return;
                }
            }

            let state = entry.state(&id);
            inner.entries.insert(id.clone(), entry);

            if inner.current.as_ref() == Some(&id) {
                slot.send_replace(state);
            } else {
                debug!("{} is no longer selected; result cached only", id);
            }
        })
    }
}
