use std::env;
use std::path::PathBuf;

/// Application configuration for the upload core
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Opaque storage connection string; empty selects the simulated backend
    pub connection_string: String,

    /// Blob container uploads land in (default: "uploads")
    pub container_name: String,

    /// Optional public base URL used instead of the backend's native object URL
    pub base_url: Option<String>,

    /// Maximum accepted file size in bytes (default: 10 MB)
    pub max_file_size_bytes: u64,

    /// Accepted image extensions, lower-case without the dot
    pub image_formats: Vec<String>,

    /// Accepted document extensions, lower-case without the dot
    pub document_formats: Vec<String>,

    /// JSON file the upload history is recorded in
    pub history_file: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            connection_string: String::new(),
            container_name: "uploads".to_string(),
            base_url: None,
            max_file_size_bytes: 10 * 1024 * 1024, // 10 MB
            image_formats: vec!["jpg".to_string(), "jpeg".to_string(), "png".to_string()],
            document_formats: vec!["pdf".to_string()],
            history_file: PathBuf::from("upload_history.json"),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            connection_string: env::var("BLOB_CONNECTION_STRING").unwrap_or_default(),

            container_name: env::var("BLOB_CONTAINER_NAME").unwrap_or(default.container_name),

            base_url: env::var("BLOB_BASE_URL")
                .ok()
                .map(|v| v.trim_end_matches('/').to_string())
                .filter(|v| !v.is_empty()),

            max_file_size_bytes: env::var("MAX_FILE_SIZE_BYTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_file_size_bytes),

            image_formats: env::var("SUPPORTED_IMAGE_FORMATS")
                .ok()
                .map(|v| split_formats(&v))
                .unwrap_or(default.image_formats),

            document_formats: env::var("SUPPORTED_DOCUMENT_FORMATS")
                .ok()
                .map(|v| split_formats(&v))
                .unwrap_or(default.document_formats),

            history_file: env::var("HISTORY_FILE")
                .map(PathBuf::from)
                .unwrap_or(default.history_file),
        }
    }
}

fn split_formats(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Connection settings carried by the opaque connection string, formatted as
/// `endpoint=...;access_key=...;secret_key=...[;region=...]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionSettings {
    pub endpoint: String,
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
}

impl ConnectionSettings {
    /// Parse the connection string. Returns `None` when a required key is
    /// missing; unknown keys are ignored.
    pub fn parse(connection_string: &str) -> Option<Self> {
        let mut endpoint = None;
        let mut access_key = None;
        let mut secret_key = None;
        let mut region = None;

        for pair in connection_string.split(';') {
            let Some((key, value)) = pair.split_once('=') else {
                continue;
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "endpoint" => endpoint = Some(value.to_string()),
                "access_key" => access_key = Some(value.to_string()),
                "secret_key" => secret_key = Some(value.to_string()),
                "region" => region = Some(value.to_string()),
                _ => {}
            }
        }

        Some(Self {
            endpoint: endpoint?,
            access_key: access_key?,
            secret_key: secret_key?,
            region: region.unwrap_or_else(|| "us-east-1".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert!(config.connection_string.is_empty());
        assert_eq!(config.container_name, "uploads");
        assert_eq!(config.max_file_size_bytes, 10 * 1024 * 1024);
        assert_eq!(config.image_formats, vec!["jpg", "jpeg", "png"]);
        assert_eq!(config.document_formats, vec!["pdf"]);
        assert!(config.base_url.is_none());
    }

    #[test]
    fn test_from_env_overrides() {
        unsafe {
            env::set_var("SUPPORTED_IMAGE_FORMATS", "PNG, webp ,");
            env::set_var("BLOB_BASE_URL", "https://cdn.example.net/");
        }
        let config = AppConfig::from_env();
        unsafe {
            env::remove_var("SUPPORTED_IMAGE_FORMATS");
            env::remove_var("BLOB_BASE_URL");
        }
        assert_eq!(config.image_formats, vec!["png", "webp"]);
        assert_eq!(config.base_url.as_deref(), Some("https://cdn.example.net"));
    }

    #[test]
    fn test_connection_string_parse() {
        let settings = ConnectionSettings::parse(
            "endpoint=http://127.0.0.1:9000;access_key=minioadmin;secret_key=minioadmin",
        )
        .unwrap();
        assert_eq!(settings.endpoint, "http://127.0.0.1:9000");
        assert_eq!(settings.access_key, "minioadmin");
        assert_eq!(settings.secret_key, "minioadmin");
        assert_eq!(settings.region, "us-east-1");
    }

    #[test]
    fn test_connection_string_missing_key() {
        assert!(ConnectionSettings::parse("endpoint=http://127.0.0.1:9000").is_none());
        assert!(ConnectionSettings::parse("").is_none());
    }
}
