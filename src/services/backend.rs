use async_trait::async_trait;
use chrono::{Local, Utc};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::error::UploadError;
use crate::models::{FileDescriptor, UploadResult};
use crate::services::object_store::ObjectStore;
use crate::services::path::{self, split_extension};
use crate::services::progress::{ProgressSink, UploadProgress};
use crate::services::thumbnail::{self, THUMBNAIL_WIDTH};

/// URL base returned by simulated uploads
const SIMULATED_BASE_URL: &str = "https://example.com/mock";

/// Delay between synthetic progress events
const SIMULATED_STEP_DELAY: Duration = Duration::from_millis(200);

const SIMULATED_STEPS: u64 = 10;

/// A storage backend that can carry one file to its public URL. The real and
/// simulated variants satisfy the same contract; the orchestrator picks one
/// per call and sees no other difference.
#[async_trait]
pub trait UploadBackend: Send + Sync {
    async fn upload(
        &self,
        file: &FileDescriptor,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<UploadResult, UploadError>;
}

/// Real backend: streams bytes into a blob container.
pub struct BlobBackend {
    store: Arc<dyn ObjectStore>,
    /// Public base URL used instead of the store's native object URL
    base_url: Option<String>,
}

impl BlobBackend {
    pub fn new(store: Arc<dyn ObjectStore>, base_url: Option<String>) -> Self {
        Self { store, base_url }
    }

    fn public_url(&self, key: &str) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), key),
            None => self.store.object_url(key),
        }
    }

    /// Derive the thumbnail, upload it next to the primary object and clean
    /// up the local artifact. Errors here never fail the upload; the caller
    /// logs and moves on.
    async fn upload_thumbnail(
        &self,
        file: &FileDescriptor,
        primary_key: &str,
    ) -> anyhow::Result<String> {
        let artifact = thumbnail::derive_thumbnail(&file.path, THUMBNAIL_WIDTH).await?;
        let thumbnail_name = artifact
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| anyhow::anyhow!("thumbnail artifact has no usable name"))?;

        let key = match primary_key.rsplit_once('/') {
            Some((directory, _)) => format!("{directory}/{thumbnail_name}"),
            None => thumbnail_name,
        };

        let bytes = tokio::fs::read(&artifact).await;
        let put = match bytes {
            Ok(bytes) => self.store.put(&key, &file.mime_type, bytes).await,
            Err(err) => Err(UploadError::Transfer(err.to_string())),
        };
        if let Err(err) = tokio::fs::remove_file(&artifact).await {
            warn!("Could not remove thumbnail artifact '{}': {}", artifact.display(), err);
        }
        put?;

        Ok(self.public_url(&key))
    }
}

#[async_trait]
impl UploadBackend for BlobBackend {
    async fn upload(
        &self,
        file: &FileDescriptor,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<UploadResult, UploadError> {
        self.store.ensure_container().await?;

        let desired = path::desired_path(&file.name, Local::now());
        let key = path::resolve_unique(&*self.store, &desired).await?;
        info!("⬆️  Uploading '{}' as '{}'", file.name, key);

        let reader = tokio::fs::File::open(&file.path).await.map_err(|err| {
            UploadError::Transfer(format!("could not read '{}': {}", file.path.display(), err))
        })?;

        let total = file.size;
        let on_bytes = |bytes: u64| {
            if let Some(sink) = progress {
                sink.report(UploadProgress::new(bytes.min(total), total, &file.name));
            }
        };
        self.store
            .put_streaming(&key, &file.mime_type, Box::new(reader), Some(&on_bytes))
            .await?;
        // Terminal event; reported bytes always end at the declared total.
        if let Some(sink) = progress {
            sink.report(UploadProgress::new(total, total, &file.name));
        }

        let mut result = UploadResult {
            file: file.clone(),
            url: self.public_url(&key),
            thumbnail_url: None,
            uploaded_at: Utc::now(),
        };

        if thumbnail::is_image_file(&file.name) {
            match self.upload_thumbnail(file, &key).await {
                Ok(url) => result.thumbnail_url = Some(url),
                Err(err) => warn!("Thumbnail for '{}' skipped: {:#}", file.name, err),
            }
        }

        Ok(result)
    }
}

/// Simulated backend: no network I/O for the primary transfer. Selected
/// whenever no connection credential is configured, so the rest of the
/// application behaves identically with and without a real container.
pub struct SimulatedBackend {
    step_delay: Duration,
}

impl Default for SimulatedBackend {
    fn default() -> Self {
        Self {
            step_delay: SIMULATED_STEP_DELAY,
        }
    }
}

impl SimulatedBackend {
    /// Override the inter-event delay. Tests use a zero delay.
    pub fn with_step_delay(step_delay: Duration) -> Self {
        Self { step_delay }
    }

    /// Prefer a genuinely derived thumbnail so previews look the same as with
    /// the real backend; fall back to the naming convention when the source
    /// is unreadable.
    async fn thumbnail_url(&self, file: &FileDescriptor) -> String {
        if tokio::fs::try_exists(&file.path).await.unwrap_or(false) {
            match thumbnail::derive_thumbnail(&file.path, THUMBNAIL_WIDTH).await {
                Ok(artifact) => {
                    let name = artifact
                        .file_name()
                        .and_then(|n| n.to_str())
                        .unwrap_or(&file.name)
                        .to_string();
                    if let Err(err) = tokio::fs::remove_file(&artifact).await {
                        warn!("Could not remove thumbnail artifact '{}': {}", artifact.display(), err);
                    }
                    return format!("{SIMULATED_BASE_URL}/{name}");
                }
                Err(err) => warn!("Simulated thumbnail for '{}' skipped: {}", file.name, err),
            }
        }
        let (base, extension) = split_extension(&file.name);
        format!("{SIMULATED_BASE_URL}/{base}_{THUMBNAIL_WIDTH}{extension}")
    }
}

#[async_trait]
impl UploadBackend for SimulatedBackend {
    async fn upload(
        &self,
        file: &FileDescriptor,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<UploadResult, UploadError> {
        let total = file.size;

        for step in 1..=SIMULATED_STEPS {
            if let Some(sink) = progress {
                let bytes = (total as u128 * step as u128 / SIMULATED_STEPS as u128) as u64;
                sink.report(UploadProgress {
                    bytes_transferred: bytes,
                    total_bytes: total,
                    file_name: file.name.clone(),
                    percentage: (step * 100 / SIMULATED_STEPS) as u8,
                });
            }
            tokio::time::sleep(self.step_delay).await;
        }

        let mut result = UploadResult {
            file: file.clone(),
            url: format!("{SIMULATED_BASE_URL}/{}", file.name),
            thumbnail_url: None,
            uploaded_at: Utc::now(),
        };

        if thumbnail::is_image_file(&file.name) {
            result.thumbnail_url = Some(self.thumbnail_url(file).await);
        }

        Ok(result)
    }
}
