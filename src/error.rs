use thiserror::Error;

/// Pre-flight policy rejection. Raised before any network or filesystem I/O.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PolicyViolation {
    #[error("File size exceeds the {limit_mb} MB limit")]
    SizeExceeded { size: u64, limit_mb: u64 },

    #[error("Unsupported file format: '{extension}'")]
    UnsupportedFormat { extension: String },
}

/// Failure of one upload orchestration.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error(transparent)]
    Policy(#[from] PolicyViolation),

    #[error("Could not find a free name for '{desired}'")]
    NameResolutionExhausted { desired: String },

    #[error("Container access failed: {0}")]
    ContainerAccess(String),

    #[error("Transfer failed: {0}")]
    Transfer(String),

    #[error("Storage backend is not configured")]
    BackendUnavailable,
}

/// History persistence failure. On save-after-upload this is surfaced next to
/// the successful result, never in place of it.
#[derive(Error, Debug)]
pub enum HistoryError {
    #[error("History I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("History entries are corrupt: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Thumbnail derivation failure. Recovered wherever it occurs; an upload never
/// fails because its thumbnail did.
#[derive(Error, Debug)]
pub enum ThumbnailError {
    #[error("'{name}' is not a supported image type")]
    UnsupportedImage { name: String },

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("Thumbnail task failed: {0}")]
    Task(String),
}
