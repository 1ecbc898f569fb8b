//! In-memory mirror of the persisted seating document.

use async_trait::async_trait;
use snapshot_store::{SnapshotStore, StoreError, Version};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

use crate::aggregate::Versioned;
use crate::cas::CasTarget;

use super::{EventAggregate, Reservation, SeatingDocument};

/// What a [`SeatStore::reload`] did to the in-memory state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// The persisted document differed from memory and replaced it.
    Replaced,
    /// Memory already matched the persisted document.
    Unchanged,
    /// The persisted document could not be read; memory was left as is.
    Failed,
}

/// Owns the persisted seating document and its in-memory copy.
///
/// Every change to memory happens under `write_lock`, and a commit reaches
/// the backend before it reaches memory. Between operations memory and the
/// backend therefore hold the same document.
pub struct SeatStore<S> {
    backend: S,
    state: RwLock<SeatingDocument>,
    write_lock: Mutex<()>,
}

impl<S> SeatStore<S>
where
    S: SnapshotStore<SeatingDocument>,
{
    /// Loads the persisted document, seeding and persisting a fresh one if
    /// there is none or it cannot be used.
    ///
    /// Only I/O failures are returned; a corrupt document is replaced.
    #[tracing::instrument(skip(backend))]
    pub async fn load(backend: S) -> Result<Self, StoreError> {
        let loaded = match backend.read().await {
            Ok(Some(document)) => match document.validate() {
                Ok(()) => Some(document),
                Err(violation) => {
                    warn!(%violation, "persisted snapshot breaks seat invariants, re-seeding");
                    None
                }
            },
            Ok(None) => {
                info!("no persisted snapshot found, seeding");
                None
            }
            Err(e) if e.is_corrupt() => {
                warn!(error = %e, "failed to parse persisted snapshot, re-seeding");
                None
            }
            Err(e) => return Err(e),
        };

        let seeded = loaded.is_none();
        let store = Self {
            backend,
            state: RwLock::new(loaded.unwrap_or_else(SeatingDocument::seed)),
            write_lock: Mutex::new(()),
        };

        if seeded {
            store.save().await?;
        }

        let document = store.document().await;
        info!(
            event_id = %document.event.event_id(),
            available = document.event.available_seats(),
            version = %document.version(),
            reservations = document.reservations.len(),
            "seat store loaded"
        );

        Ok(store)
    }

    /// Makes memory match the persisted document. Best effort: failures are
    /// logged and leave memory untouched.
    ///
    /// The persisted document wins whatever its version, so restoring an
    /// older backup file rolls the live state back to it.
    pub async fn reload(&self) -> ReloadOutcome {
        let _guard = self.write_lock.lock().await;

        let fresh = match self.backend.read().await {
            Ok(Some(document)) => document,
            Ok(None) => {
                warn!("persisted snapshot missing during reload");
                return ReloadOutcome::Failed;
            }
            Err(e) => {
                warn!(error = %e, "failed to reload snapshot");
                return ReloadOutcome::Failed;
            }
        };

        if let Err(violation) = fresh.validate() {
            warn!(%violation, "ignoring persisted snapshot that breaks seat invariants");
            return ReloadOutcome::Failed;
        }

        let mut state = self.state.write().await;
        if *state == fresh {
            return ReloadOutcome::Unchanged;
        }

        debug!(
            ours = %state.event.version(),
            theirs = %fresh.event.version(),
            "adopting persisted snapshot"
        );
        *state = fresh;
        ReloadOutcome::Replaced
    }

    /// Writes the whole current document to the backend.
    pub async fn save(&self) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let document = self.state.read().await.clone();
        self.backend.write(&document).await
    }

    /// Returns a copy of the live event aggregate.
    pub async fn event(&self) -> EventAggregate {
        self.state.read().await.event.clone()
    }

    /// Returns a copy of the whole live document.
    pub async fn document(&self) -> SeatingDocument {
        self.state.read().await.clone()
    }

    pub async fn reservations(&self) -> Vec<Reservation> {
        self.state
            .read()
            .await
            .reservations
            .iter()
            .cloned()
            .collect()
    }
}

#[async_trait]
impl<S> CasTarget<SeatingDocument> for SeatStore<S>
where
    S: SnapshotStore<SeatingDocument>,
{
    async fn snapshot(&self) -> SeatingDocument {
        self.document().await
    }

    /// Persists `proposed` and only then publishes it to memory. A failed
    /// write leaves both the backend and memory on the previous document.
    async fn compare_and_swap(
        &self,
        expected: Version,
        proposed: SeatingDocument,
    ) -> Result<bool, StoreError> {
        let _guard = self.write_lock.lock().await;

        if self.state.read().await.event.version() != expected {
            return Ok(false);
        }

        self.backend.write(&proposed).await?;
        *self.state.write().await = proposed;
        Ok(true)
    }
}
