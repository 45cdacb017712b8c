use anyhow::Result;
use blob_uploader::config::AppConfig;
use blob_uploader::infrastructure::storage;
use blob_uploader::models::FileDescriptor;
use blob_uploader::services::progress::{ProgressSink, UploadProgress};
use clap::{Parser, Subcommand};
use dotenvy::dotenv;
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about = "Upload files to a blob storage container", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload a local file
    Upload {
        /// Path of the file to upload
        file: PathBuf,
    },
    /// List recorded uploads
    History,
    /// Remove a recorded upload by URL
    Delete {
        /// Public URL of the recorded upload
        url: String,
    },
}

struct ConsoleProgress;

impl ProgressSink for ConsoleProgress {
    fn report(&self, progress: UploadProgress) {
        info!(
            "📤 {}: {}% ({}/{} bytes)",
            progress.file_name, progress.percentage, progress.bytes_transferred, progress.total_bytes
        );
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "blob_uploader=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env();
    info!(
        "🚀 Starting blob-uploader (container: {}, max size: {}MB)",
        config.container_name,
        config.max_file_size_bytes / 1024 / 1024
    );

    let service = storage::setup_uploader(&config).await?;

    match args.command {
        Command::Upload { file } => {
            let descriptor = FileDescriptor::from_path(&file).await?;
            let outcome = service.upload(&descriptor, Some(&ConsoleProgress)).await?;

            info!("✅ Uploaded to {}", outcome.result.url);
            if let Some(thumbnail) = &outcome.result.thumbnail_url {
                info!("🖼️  Thumbnail: {}", thumbnail);
            }
            if outcome.used_simulated {
                info!("🧪 Simulated upload, nothing was sent to a real container");
            }
            if let Some(err) = &outcome.history_error {
                warn!("⚠️  Uploaded, but the history entry was not recorded: {}", err);
            }
        }
        Command::History => {
            let entries = service.history().await?;
            if entries.is_empty() {
                info!("No uploads recorded yet");
            }
            for entry in entries {
                println!(
                    "{}  {}  {}",
                    entry.uploaded_at.format("%Y-%m-%d %H:%M:%S"),
                    entry.file.name,
                    entry.url
                );
            }
        }
        Command::Delete { url } => {
            service.delete_history(&url).await?;
            info!("🗑️  Removed {} from history", url);
        }
    }

    Ok(())
}
