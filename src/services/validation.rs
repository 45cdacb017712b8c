use crate::config::AppConfig;
use crate::error::PolicyViolation;
use crate::models::FileDescriptor;

/// Acceptance policy for one orchestration call: a size ceiling plus the
/// accepted extension sets.
#[derive(Debug, Clone)]
pub struct UploadPolicy {
    pub max_size_bytes: u64,
    pub image_formats: Vec<String>,
    pub document_formats: Vec<String>,
}

impl UploadPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_size_bytes: config.max_file_size_bytes,
            image_formats: config.image_formats.clone(),
            document_formats: config.document_formats.clone(),
        }
    }
}

/// Validate a candidate file against policy. Pure; runs before any network
/// or filesystem I/O in the orchestrator.
pub fn validate(file: &FileDescriptor, policy: &UploadPolicy) -> Result<(), PolicyViolation> {
    if file.size > policy.max_size_bytes {
        return Err(PolicyViolation::SizeExceeded {
            size: file.size,
            limit_mb: policy.max_size_bytes / 1024 / 1024,
        });
    }

    let extension = file.extension();
    let accepted = policy
        .image_formats
        .iter()
        .chain(policy.document_formats.iter())
        .any(|format| format == &extension);

    if !accepted {
        return Err(PolicyViolation::UnsupportedFormat { extension });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::path::PathBuf;

    fn policy() -> UploadPolicy {
        UploadPolicy {
            max_size_bytes: 10 * 1024 * 1024,
            image_formats: vec!["jpg".into(), "jpeg".into(), "png".into()],
            document_formats: vec!["pdf".into()],
        }
    }

    fn file(name: &str, size: u64) -> FileDescriptor {
        FileDescriptor {
            name: name.to_string(),
            path: PathBuf::from(format!("/tmp/{name}")),
            size,
            mime_type: "application/octet-stream".to_string(),
            last_modified: Utc::now(),
        }
    }

    #[test]
    fn test_accepts_image_and_document() {
        assert!(validate(&file("photo.png", 2 * 1024 * 1024), &policy()).is_ok());
        assert!(validate(&file("report.pdf", 1024), &policy()).is_ok());
    }

    #[test]
    fn test_extension_is_case_insensitive() {
        assert_eq!(
            validate(&file("FILE.JPG", 100), &policy()),
            validate(&file("file.jpg", 100), &policy())
        );
        assert!(validate(&file("FILE.JPG", 100), &policy()).is_ok());
    }

    #[test]
    fn test_size_exceeded_reports_limit_in_mb() {
        let err = validate(&file("photo.png", 11 * 1024 * 1024), &policy()).unwrap_err();
        assert_eq!(
            err,
            PolicyViolation::SizeExceeded {
                size: 11 * 1024 * 1024,
                limit_mb: 10
            }
        );
        assert!(err.to_string().contains("10 MB"));
    }

    #[test]
    fn test_rejects_unknown_format() {
        let err = validate(&file("movie.mp4", 100), &policy()).unwrap_err();
        assert_eq!(
            err,
            PolicyViolation::UnsupportedFormat {
                extension: "mp4".to_string()
            }
        );
    }

    #[test]
    fn test_rejects_missing_extension() {
        let err = validate(&file("README", 100), &policy()).unwrap_err();
        assert_eq!(
            err,
            PolicyViolation::UnsupportedFormat {
                extension: String::new()
            }
        );
    }

    #[test]
    fn test_is_pure() {
        let input = file("photo.png", 100);
        let first = validate(&input, &policy());
        let second = validate(&input, &policy());
        assert_eq!(first, second);
    }
}
