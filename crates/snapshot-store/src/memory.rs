use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::sync::RwLock;

use crate::{Result, SnapshotStore};

/// In-memory snapshot store implementation for testing.
///
/// The document is kept in its serialized form so reads and writes go
/// through the same serde path as the file store. Clones share the same
/// document, which makes it possible to stand up several services against
/// one "persisted" store.
#[derive(Debug, Clone, Default)]
pub struct InMemorySnapshotStore {
    contents: Arc<RwLock<Option<String>>>,
    writes: Arc<AtomicUsize>,
}

impl InMemorySnapshotStore {
    /// Creates a new empty in-memory snapshot store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store whose persisted document is the given raw text.
    pub fn with_raw(raw: impl Into<String>) -> Self {
        Self {
            contents: Arc::new(RwLock::new(Some(raw.into()))),
            writes: Arc::default(),
        }
    }

    /// Returns the raw persisted text, if any.
    pub async fn raw(&self) -> Option<String> {
        self.contents.read().await.clone()
    }

    /// Overwrites the persisted text without going through serialization.
    pub async fn set_raw(&self, raw: impl Into<String>) {
        *self.contents.write().await = Some(raw.into());
    }

    /// Returns the number of successful writes.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<D> SnapshotStore<D> for InMemorySnapshotStore
where
    D: Serialize + DeserializeOwned + Send + Sync,
{
    async fn read(&self) -> Result<Option<D>> {
        let contents = self.contents.read().await;
        match contents.as_deref() {
            Some(raw) => Ok(Some(serde_json::from_str(raw)?)),
            None => Ok(None),
        }
    }

    async fn write(&self, document: &D) -> Result<()> {
        let raw = serde_json::to_string(document)?;
        *self.contents.write().await = Some(raw);
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::StoreError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestDocument {
        value: i32,
    }

    #[tokio::test]
    async fn empty_store_reads_none() {
        let store = InMemorySnapshotStore::new();
        let read = SnapshotStore::<TestDocument>::read(&store).await.unwrap();
        assert!(read.is_none());
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn write_and_read_back() {
        let store = InMemorySnapshotStore::new();
        store.write(&TestDocument { value: 42 }).await.unwrap();

        let read = SnapshotStore::<TestDocument>::read(&store).await.unwrap();
        assert_eq!(read, Some(TestDocument { value: 42 }));
        assert_eq!(store.write_count(), 1);
    }

    #[tokio::test]
    async fn clones_share_the_document() {
        let store = InMemorySnapshotStore::new();
        let other = store.clone();

        store.write(&TestDocument { value: 1 }).await.unwrap();

        let read = SnapshotStore::<TestDocument>::read(&other).await.unwrap();
        assert_eq!(read, Some(TestDocument { value: 1 }));
        assert_eq!(other.write_count(), 1);
    }

    #[tokio::test]
    async fn corrupt_raw_text_is_a_serialization_error() {
        let store = InMemorySnapshotStore::with_raw("{{{");
        let result = SnapshotStore::<TestDocument>::read(&store).await;
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }
}
