use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use uuid::Uuid;

use crate::{Result, SnapshotStore};

/// JSON file backed snapshot store.
///
/// Writes go to a uniquely named temporary file next to the target, are
/// synced to disk, and then renamed over the target. Rename within one
/// directory is atomic, so readers never observe a half-written snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    /// Creates a store persisting to the given path.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the path of the persisted document.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let file_name = self
            .path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "snapshot".to_string());
        self.path
            .with_file_name(format!(".{file_name}.{}.tmp", Uuid::new_v4()))
    }
}

#[async_trait]
impl<D> SnapshotStore<D> for FileSnapshotStore
where
    D: Serialize + DeserializeOwned + Send + Sync,
{
    async fn read(&self) -> Result<Option<D>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let document = serde_json::from_str(&contents)?;
        Ok(Some(document))
    }

    async fn write(&self, document: &D) -> Result<()> {
        let json = serde_json::to_vec_pretty(document)?;

        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let temp_path = self.temp_path();
        if let Err(e) = write_then_rename(&temp_path, &self.path, &json).await {
            // Best effort; the target is untouched either way.
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        metrics::counter!("snapshot_writes_total").increment(1);
        debug!(path = %self.path.display(), bytes = json.len(), "wrote snapshot");

        Ok(())
    }
}

async fn write_then_rename(temp_path: &Path, target: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = tokio::fs::File::create(temp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(temp_path, target).await
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;
    use crate::StoreError;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct TestDocument {
        counter: u32,
        label: String,
    }

    fn doc(counter: u32) -> TestDocument {
        TestDocument {
            counter,
            label: format!("doc-{counter}"),
        }
    }

    #[tokio::test]
    async fn read_missing_file_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("db.json"));

        let result = SnapshotStore::<TestDocument>::read(&store).await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("db.json"));

        store.write(&doc(3)).await.unwrap();

        let read = SnapshotStore::<TestDocument>::read(&store).await.unwrap();
        assert_eq!(read, Some(doc(3)));
    }

    #[tokio::test]
    async fn write_replaces_previous_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("db.json"));

        store.write(&doc(1)).await.unwrap();
        store.write(&doc(2)).await.unwrap();

        let read = SnapshotStore::<TestDocument>::read(&store).await.unwrap();
        assert_eq!(read, Some(doc(2)));
    }

    #[tokio::test]
    async fn write_leaves_no_temp_files_behind() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSnapshotStore::new(dir.path().join("db.json"));

        store.write(&doc(1)).await.unwrap();
        store.write(&doc(2)).await.unwrap();

        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["db.json".to_string()]);
    }

    #[tokio::test]
    async fn write_creates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("db.json");
        let store = FileSnapshotStore::new(&path);

        store.write(&doc(9)).await.unwrap();

        assert!(path.exists());
    }

    #[tokio::test]
    async fn corrupt_file_is_a_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(&path, "{ not json").unwrap();
        let store = FileSnapshotStore::new(&path);

        let result = SnapshotStore::<TestDocument>::read(&store).await;
        let err = result.unwrap_err();
        assert!(matches!(err, StoreError::Serialization(_)));
        assert!(err.is_corrupt());
    }

    #[tokio::test]
    async fn written_document_is_pretty_printed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = FileSnapshotStore::new(&path);

        store.write(&doc(5)).await.unwrap();

        let raw = std::fs::read_to_string(&path).unwrap();
        assert!(raw.contains('\n'));
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["counter"], 5);
    }
}
