use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::sync::Mutex;

use crate::error::HistoryError;
use crate::models::UploadResult;

/// Record of completed uploads. Saved only after a backend success, never
/// before.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn save(&self, result: &UploadResult) -> Result<(), HistoryError>;
    async fn list(&self) -> Result<Vec<UploadResult>, HistoryError>;
    /// Removing a URL that is not recorded is a no-op success.
    async fn delete_by_url(&self, url: &str) -> Result<(), HistoryError>;
}

/// Upload history persisted as a JSON array in a single data file. A missing
/// file reads as an empty history.
pub struct JsonHistoryStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonHistoryStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> Result<Vec<UploadResult>, HistoryError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(err) => Err(err.into()),
        }
    }

    async fn persist(&self, entries: &[UploadResult]) -> Result<(), HistoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        let json = serde_json::to_vec_pretty(entries)?;
        tokio::fs::write(&self.path, json).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryStore for JsonHistoryStore {
    async fn save(&self, result: &UploadResult) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.push(result.clone());
        self.persist(&entries).await
    }

    async fn list(&self) -> Result<Vec<UploadResult>, HistoryError> {
        let _guard = self.lock.lock().await;
        self.load().await
    }

    async fn delete_by_url(&self, url: &str) -> Result<(), HistoryError> {
        let _guard = self.lock.lock().await;
        let mut entries = self.load().await?;
        entries.retain(|entry| entry.url != url);
        self.persist(&entries).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FileDescriptor;
    use chrono::Utc;

    fn result(name: &str, url: &str) -> UploadResult {
        UploadResult {
            file: FileDescriptor {
                name: name.to_string(),
                path: PathBuf::from(format!("/tmp/{name}")),
                size: 42,
                mime_type: "image/png".to_string(),
                last_modified: Utc::now(),
            },
            url: url.to_string(),
            thumbnail_url: None,
            uploaded_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_missing_file_reads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_save_appends_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        store.save(&result("a.png", "https://x/a.png")).await.unwrap();
        store.save(&result("b.png", "https://x/b.png")).await.unwrap();

        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].file.name, "a.png");
        assert_eq!(entries[1].file.name, "b.png");
    }

    #[tokio::test]
    async fn test_delete_by_url() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonHistoryStore::new(dir.path().join("history.json"));

        store.save(&result("a.png", "https://x/a.png")).await.unwrap();
        store.save(&result("b.png", "https://x/b.png")).await.unwrap();

        store.delete_by_url("https://x/a.png").await.unwrap();
        let entries = store.list().await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://x/b.png");

        // Unknown URLs are a no-op.
        store.delete_by_url("https://x/missing.png").await.unwrap();
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let store = JsonHistoryStore::new(path);
        assert!(matches!(
            store.list().await.unwrap_err(),
            HistoryError::Encode(_)
        ));
    }
}
