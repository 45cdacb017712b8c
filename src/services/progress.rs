/// A point-in-time progress snapshot for one in-flight transfer. Not
/// persisted; discarded once the transfer completes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadProgress {
    pub bytes_transferred: u64,
    pub total_bytes: u64,
    pub file_name: String,
    /// Integer percentage, floored
    pub percentage: u8,
}

impl UploadProgress {
    /// Build an event, deriving the percentage as `floor(bytes * 100 / total)`.
    /// A zero-byte transfer reports 100 so the terminal event stays terminal.
    pub fn new(bytes_transferred: u64, total_bytes: u64, file_name: impl Into<String>) -> Self {
        let percentage = if total_bytes == 0 {
            100
        } else {
            ((bytes_transferred as u128 * 100 / total_bytes as u128).min(100)) as u8
        };
        Self {
            bytes_transferred,
            total_bytes,
            file_name: file_name.into(),
            percentage,
        }
    }
}

/// One-way sink for progress events. Optional at every call site; events for
/// a single transfer arrive in non-decreasing byte order and the final event
/// matches the transfer's total.
pub trait ProgressSink: Send + Sync {
    fn report(&self, progress: UploadProgress);
}

impl<F> ProgressSink for F
where
    F: Fn(UploadProgress) + Send + Sync,
{
    fn report(&self, progress: UploadProgress) {
        self(progress)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_percentage_is_floored() {
        assert_eq!(UploadProgress::new(1, 3, "a").percentage, 33);
        assert_eq!(UploadProgress::new(2, 3, "a").percentage, 66);
        assert_eq!(UploadProgress::new(3, 3, "a").percentage, 100);
        assert_eq!(UploadProgress::new(999, 1000, "a").percentage, 99);
    }

    #[test]
    fn test_zero_total_is_terminal() {
        assert_eq!(UploadProgress::new(0, 0, "a").percentage, 100);
    }

    #[test]
    fn test_closures_are_sinks() {
        let sink = |progress: UploadProgress| {
            assert_eq!(progress.percentage, 50);
        };
        sink.report(UploadProgress::new(1, 2, "a"));
    }
}
