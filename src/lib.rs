pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod services;

pub use error::{HistoryError, PolicyViolation, ThumbnailError, UploadError};
pub use models::{FileDescriptor, UploadOutcome, UploadResult};
pub use services::uploader::UploadService;
