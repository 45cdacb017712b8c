use async_trait::async_trait;
use chrono::{DateTime, Local};

use crate::error::UploadError;

/// Existence probe over the remote namespace, backed by the storage backend.
#[async_trait]
pub trait ExistsProbe: Send + Sync {
    async fn exists(&self, path: &str) -> Result<bool, UploadError>;
}

/// Dated directory prefix uploads are grouped under: `YYYY/MM`.
pub fn dated_prefix(now: DateTime<Local>) -> String {
    now.format("%Y/%m").to_string()
}

/// Desired remote path for a file name at the current date.
pub fn desired_path(file_name: &str, now: DateTime<Local>) -> String {
    format!("{}/{}", dated_prefix(now), file_name)
}

/// Compact stamp used in derived artifact names: `YYYYMMDDHHmmss`.
pub fn timestamp_stamp(now: DateTime<Local>) -> String {
    now.format("%Y%m%d%H%M%S").to_string()
}

/// Split a file name into base and extension at the last `.`. The extension
/// keeps its dot and is empty when the name has none.
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(index) => (&name[..index], &name[index..]),
        None => (name, ""),
    }
}

/// Resolve a remote path no object currently occupies.
///
/// Returns `desired` unchanged when it is free. On collision, suffixes the
/// final path segment's base name with `_02` through `_99`, probing each
/// candidate, and returns the first free one. Directory components are left
/// untouched.
pub async fn resolve_unique<P>(probe: &P, desired: &str) -> Result<String, UploadError>
where
    P: ExistsProbe + ?Sized,
{
    if !probe.exists(desired).await? {
        return Ok(desired.to_string());
    }

    let (directory, file_name) = match desired.rfind('/') {
        Some(index) => (&desired[..=index], &desired[index + 1..]),
        None => ("", desired),
    };
    let (base, extension) = split_extension(file_name);

    // _100 is never probed; a namespace this crowded needs a rename instead.
    for counter in 2..100u32 {
        let candidate = format!("{directory}{base}_{counter:02}{extension}");
        if !probe.exists(&candidate).await? {
            return Ok(candidate);
        }
    }

    Err(UploadError::NameResolutionExhausted {
        desired: desired.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashSet;
    use std::sync::Mutex;

    struct FakeProbe {
        taken: HashSet<String>,
        everything_taken: bool,
        probed: Mutex<Vec<String>>,
    }

    impl FakeProbe {
        fn new<const N: usize>(taken: [&str; N]) -> Self {
            Self {
                taken: taken.iter().map(|s| s.to_string()).collect(),
                everything_taken: false,
                probed: Mutex::new(Vec::new()),
            }
        }

        fn everything_taken() -> Self {
            Self {
                taken: HashSet::new(),
                everything_taken: true,
                probed: Mutex::new(Vec::new()),
            }
        }

        fn probed(&self) -> Vec<String> {
            self.probed.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ExistsProbe for FakeProbe {
        async fn exists(&self, path: &str) -> Result<bool, UploadError> {
            self.probed.lock().unwrap().push(path.to_string());
            Ok(self.everything_taken || self.taken.contains(path))
        }
    }

    #[test]
    fn test_dated_prefix_zero_pads_month() {
        let now = Local.with_ymd_and_hms(2024, 5, 11, 10, 1, 42).unwrap();
        assert_eq!(dated_prefix(now), "2024/05");
        assert_eq!(desired_path("a.png", now), "2024/05/a.png");
        assert_eq!(timestamp_stamp(now), "20240511100142");
    }

    #[tokio::test]
    async fn test_free_path_returned_unchanged() {
        let probe = FakeProbe::new(["2024/05/other.png"]);
        let resolved = resolve_unique(&probe, "2024/05/a.png").await.unwrap();
        assert_eq!(resolved, "2024/05/a.png");
        assert_eq!(probe.probed(), vec!["2024/05/a.png"]);
    }

    #[tokio::test]
    async fn test_first_free_suffix_wins() {
        let probe = FakeProbe::new(["2024/05/a.png", "2024/05/a_02.png", "2024/05/a_03.png"]);
        let resolved = resolve_unique(&probe, "2024/05/a.png").await.unwrap();
        assert_eq!(resolved, "2024/05/a_04.png");
    }

    #[tokio::test]
    async fn test_suffix_applies_to_extensionless_names() {
        let probe = FakeProbe::new(["2024/05/README"]);
        let resolved = resolve_unique(&probe, "2024/05/README").await.unwrap();
        assert_eq!(resolved, "2024/05/README_02");
    }

    #[tokio::test]
    async fn test_exhaustion_stops_before_100() {
        let probe = FakeProbe::everything_taken();
        let err = resolve_unique(&probe, "2024/05/a.png").await.unwrap_err();
        assert!(matches!(err, UploadError::NameResolutionExhausted { .. }));

        let probed = probe.probed();
        // Desired path plus _02 through _99, nothing further.
        assert_eq!(probed.len(), 99);
        assert_eq!(probed.last().unwrap(), "2024/05/a_99.png");
        assert!(!probed.iter().any(|p| p.contains("_100")));
    }

    #[tokio::test]
    async fn test_only_final_segment_is_suffixed() {
        let probe = FakeProbe::new(["a.b/c.png"]);
        let resolved = resolve_unique(&probe, "a.b/c.png").await.unwrap();
        assert_eq!(resolved, "a.b/c_02.png");
    }
}
