//! Bounded-retry optimistic update primitive.
//!
//! The engine knows nothing about seats: it repeatedly snapshots a versioned
//! aggregate, hands the snapshot to a business updater, and commits the
//! proposal only if nobody else committed in between. Business rejections
//! end the loop immediately; only lost races are retried.

use async_trait::async_trait;
use snapshot_store::{StoreError, Version};
use thiserror::Error;
use tracing::{debug, warn};

use crate::aggregate::Versioned;

/// Default number of snapshot/compare rounds before giving up.
pub const MAX_CAS_ATTEMPTS: u32 = 5;

/// Something holding a live aggregate that the CAS engine can mutate.
#[async_trait]
pub trait CasTarget<A: Versioned>: Send + Sync {
    /// Returns a by-value copy of the live aggregate.
    async fn snapshot(&self) -> A;

    /// Persists `proposed` and makes it the live aggregate, provided the
    /// live version still equals `expected`. A failed write must leave the
    /// live aggregate as it was.
    ///
    /// Returns `Ok(false)` and leaves everything untouched when the version
    /// has moved since the snapshot was taken.
    async fn compare_and_swap(&self, expected: Version, proposed: A) -> Result<bool, StoreError>;
}

/// Errors produced by [`CasEngine::try_update`].
#[derive(Debug, Error)]
pub enum CasError<E> {
    /// The updater refused the snapshot. Never retried.
    #[error("{0}")]
    Rejected(E),

    /// Every attempt lost the race against a concurrent commit.
    #[error("Update lost to concurrent commits {attempts} times in a row")]
    Conflict { attempts: u32 },

    /// The committed state could not be persisted.
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

/// Optimistic compare-and-swap executor.
#[derive(Debug, Clone, Copy)]
pub struct CasEngine {
    max_attempts: u32,
}

impl Default for CasEngine {
    fn default() -> Self {
        Self {
            max_attempts: MAX_CAS_ATTEMPTS,
        }
    }
}

impl CasEngine {
    /// Creates an engine with the default attempt bound.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom attempt bound (at least one attempt).
    pub fn with_max_attempts(max_attempts: u32) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
        }
    }

    /// Returns the attempt bound.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Applies `updater` to the target's aggregate under optimistic concurrency.
    ///
    /// The updater must be pure: it may run several times, each time
    /// against a fresh snapshot, and only the proposal of the final,
    /// successful round is kept. It is expected to return the aggregate
    /// with its version already advanced by one.
    ///
    /// Returns the committed aggregate.
    pub async fn try_update<A, T, E, F>(&self, target: &T, mut updater: F) -> Result<A, CasError<E>>
    where
        A: Versioned,
        T: CasTarget<A> + ?Sized,
        F: FnMut(&A) -> Result<A, E>,
    {
        for attempt in 1..=self.max_attempts {
            let snapshot = target.snapshot().await;
            let expected = snapshot.version();

            let proposed = updater(&snapshot).map_err(CasError::Rejected)?;

            if target.compare_and_swap(expected, proposed.clone()).await? {
                metrics::histogram!("cas_attempts").record(f64::from(attempt));
                debug!(attempt, version = %proposed.version(), "cas update committed");
                return Ok(proposed);
            }

            metrics::counter!("cas_retries_total").increment(1);
            debug!(attempt, %expected, "version moved during update, retrying");
        }

        metrics::counter!("cas_conflicts_total").increment(1);
        warn!(attempts = self.max_attempts, "cas update exhausted its attempts");
        Err(CasError::Conflict {
            attempts: self.max_attempts,
        })
    }
}
