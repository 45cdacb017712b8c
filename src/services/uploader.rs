use std::sync::Arc;
use tracing::{error, info};

use crate::error::{HistoryError, UploadError};
use crate::models::{FileDescriptor, UploadOutcome, UploadResult};
use crate::services::backend::UploadBackend;
use crate::services::history::HistoryStore;
use crate::services::progress::ProgressSink;
use crate::services::validation::{self, UploadPolicy};

/// Orchestrates one upload: validate, pick a backend, transfer, record.
pub struct UploadService {
    policy: UploadPolicy,
    connection_string: String,
    real: Option<Arc<dyn UploadBackend>>,
    simulated: Arc<dyn UploadBackend>,
    history: Arc<dyn HistoryStore>,
}

impl UploadService {
    pub fn new(
        policy: UploadPolicy,
        connection_string: impl Into<String>,
        real: Option<Arc<dyn UploadBackend>>,
        simulated: Arc<dyn UploadBackend>,
        history: Arc<dyn HistoryStore>,
    ) -> Self {
        Self {
            policy,
            connection_string: connection_string.into(),
            real,
            simulated,
            history,
        }
    }

    /// Upload `file` under the configured policy and record the result.
    ///
    /// Validation runs before the backend is touched. The backend is chosen
    /// once per call: simulated whenever the connection credential is empty.
    /// A history failure after a successful transfer is carried in the
    /// outcome next to the result rather than replacing it.
    pub async fn upload(
        &self,
        file: &FileDescriptor,
        progress: Option<&dyn ProgressSink>,
    ) -> Result<UploadOutcome, UploadError> {
        validation::validate(file, &self.policy)?;

        let used_simulated = self.connection_string.trim().is_empty();
        let backend: &dyn UploadBackend = if used_simulated {
            info!("🧪 No connection credential configured, simulating upload of '{}'", file.name);
            self.simulated.as_ref()
        } else {
            self.real.as_deref().ok_or(UploadError::BackendUnavailable)?
        };

        let result = backend.upload(file, progress).await?;

        let history_error = self.history.save(&result).await.err();
        if let Some(err) = &history_error {
            error!(
                "'{}' is live at {} but recording it to history failed: {}",
                file.name, result.url, err
            );
        }

        Ok(UploadOutcome {
            result,
            used_simulated,
            history_error,
        })
    }

    /// Recorded uploads, oldest first.
    pub async fn history(&self) -> Result<Vec<UploadResult>, HistoryError> {
        self.history.list().await
    }

    /// Remove one recorded upload by its URL.
    pub async fn delete_history(&self, url: &str) -> Result<(), HistoryError> {
        self.history.delete_by_url(url).await
    }
}
