//! Versioned aggregate trait.

use snapshot_store::Version;

/// Trait for aggregates protected by optimistic concurrency control.
///
/// An aggregate is the unit of consistency: every committed mutation
/// produces a new value whose version is exactly one greater than the
/// version it was computed from. Two proposals derived from the same
/// version can therefore never both commit.
pub trait Versioned: Clone + Send + Sync {
    /// Returns the current version of the aggregate.
    fn version(&self) -> Version;
}
