use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::Result;

/// Core trait for snapshot persistence backends.
///
/// A snapshot store holds exactly one document and always replaces it as a
/// whole. All implementations must be thread-safe (Send + Sync).
#[async_trait]
pub trait SnapshotStore<D>: Send + Sync
where
    D: Serialize + DeserializeOwned + Send + Sync,
{
    /// Reads the persisted document.
    ///
    /// Returns `Ok(None)` if nothing has been persisted yet. A document that
    /// exists but does not parse is reported as `StoreError::Serialization`.
    async fn read(&self) -> Result<Option<D>>;

    /// Replaces the persisted document.
    ///
    /// A concurrent reader observes either the previous document or this
    /// one, never a partially written mix.
    async fn write(&self, document: &D) -> Result<()>;
}
