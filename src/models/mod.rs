use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

use crate::error::HistoryError;

/// Metadata for a local file handed to the upload core. Built by a shell
/// collaborator (file picker, clipboard capture, CLI) and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileDescriptor {
    /// File name without any path component
    pub name: String,

    /// Absolute location of the source bytes
    pub path: PathBuf,

    /// Size in bytes
    pub size: u64,

    /// Declared content type
    pub mime_type: String,

    /// Last modification time of the source file
    pub last_modified: DateTime<Utc>,
}

impl FileDescriptor {
    /// Build a descriptor from a local path: stat the file, take the base
    /// name and sniff the content type.
    pub async fn from_path(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path).await?;
        if !metadata.is_file() {
            return Err(Error::new(
                ErrorKind::InvalidInput,
                format!("'{}' is not a regular file", path.display()),
            ));
        }

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .map(str::to_owned)
            .ok_or_else(|| Error::new(ErrorKind::InvalidInput, "file name is not valid UTF-8"))?;

        let mime_type = detect_mime_type(path, &name).await;
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());

        Ok(Self {
            name,
            path: path.to_path_buf(),
            size: metadata.len(),
            mime_type,
            last_modified,
        })
    }

    /// Extension after the last `.` in the name, lower-cased. Empty when the
    /// name has no dot.
    pub fn extension(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((_, ext)) => ext.to_ascii_lowercase(),
            None => String::new(),
        }
    }
}

/// Content sniffing first, extension table as fallback.
async fn detect_mime_type(path: &Path, name: &str) -> String {
    let mut header = [0u8; 512];
    if let Ok(mut file) = tokio::fs::File::open(path).await {
        if let Ok(n) = file.read(&mut header).await {
            if let Some(kind) = infer::get(&header[..n]) {
                return kind.mime_type().to_string();
            }
        }
    }
    mime_type_from_name(name).to_string()
}

fn mime_type_from_name(name: &str) -> &'static str {
    let extension = match name.rsplit_once('.') {
        Some((_, ext)) => ext.to_ascii_lowercase(),
        None => String::new(),
    };
    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "html" => "text/html",
        "css" => "text/css",
        "js" => "application/javascript",
        "json" => "application/json",
        "xml" => "application/xml",
        "zip" => "application/zip",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        _ => "application/octet-stream",
    }
}

/// Completed upload. The unit persisted to history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadResult {
    /// The originating file
    pub file: FileDescriptor,

    /// Public URL of the uploaded object
    pub url: String,

    /// Companion thumbnail URL, images only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,

    /// Completion time
    pub uploaded_at: DateTime<Utc>,
}

/// What one orchestration call produced.
///
/// A history write failure after a successful transfer does not discard the
/// result: the caller gets both the live URL and the `history_error`, so
/// "uploaded but not recorded" stays distinguishable from "not uploaded".
#[derive(Debug)]
pub struct UploadOutcome {
    pub result: UploadResult,

    /// True when the simulated backend handled the transfer
    pub used_simulated: bool,

    /// Set when the upload succeeded but recording it to history failed
    pub history_error: Option<HistoryError>,
}
