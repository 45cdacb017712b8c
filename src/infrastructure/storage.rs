use anyhow::anyhow;
use aws_sdk_s3::config::{Credentials, Region};
use std::sync::Arc;
use tracing::info;

use crate::config::{AppConfig, ConnectionSettings};
use crate::services::backend::{BlobBackend, SimulatedBackend, UploadBackend};
use crate::services::history::JsonHistoryStore;
use crate::services::object_store::S3ObjectStore;
use crate::services::uploader::UploadService;
use crate::services::validation::UploadPolicy;

/// Build the real storage backend from the configured connection string.
/// Returns `None` when no credential is configured; the orchestrator then
/// simulates uploads.
pub async fn setup_backend(config: &AppConfig) -> anyhow::Result<Option<Arc<dyn UploadBackend>>> {
    if config.connection_string.trim().is_empty() {
        info!("🧪 No connection string configured, uploads will be simulated");
        return Ok(None);
    }

    let settings = ConnectionSettings::parse(&config.connection_string).ok_or_else(|| {
        anyhow!("invalid connection string (expected endpoint=...;access_key=...;secret_key=...)")
    })?;

    info!(
        "☁️  Blob storage: {} (container: {})",
        settings.endpoint, config.container_name
    );

    let aws_config = aws_config::from_env()
        .endpoint_url(&settings.endpoint)
        .region(Region::new(settings.region.clone()))
        .credentials_provider(Credentials::new(
            settings.access_key.clone(),
            settings.secret_key.clone(),
            None,
            None,
            "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();
    let client = aws_sdk_s3::Client::from_conf(s3_config);

    let store = Arc::new(S3ObjectStore::new(
        client,
        config.container_name.clone(),
        settings.endpoint.clone(),
    ));

    Ok(Some(Arc::new(BlobBackend::new(store, config.base_url.clone()))))
}

/// Wire the full upload service from configuration.
pub async fn setup_uploader(config: &AppConfig) -> anyhow::Result<UploadService> {
    let real = setup_backend(config).await?;
    let history = Arc::new(JsonHistoryStore::new(config.history_file.clone()));

    Ok(UploadService::new(
        UploadPolicy::from_config(config),
        config.connection_string.clone(),
        real,
        Arc::new(SimulatedBackend::default()),
        history,
    ))
}
