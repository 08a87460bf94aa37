use serde_json::Value;

/// How a scan dispatch relates to the request that triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum TriggerMode {
    /// Caller waits for the scan outcome, bounded by the call timeout.
    Sync,
    /// Scan runs detached; the caller returns immediately.
    Background,
}

impl TriggerMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerMode::Sync => "sync",
            TriggerMode::Background => "background",
        }
    }
}

/// What the engine should scan.
#[derive(Debug, Clone, PartialEq)]
pub enum ScanTarget {
    /// Scan all pending tasks, optionally capped.
    All { limit: Option<u32> },
    /// Scan one task, with its current document attached.
    Task { task_id: String, task: Value },
}

/// Transient description of a single dispatch to the alert engine.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRequest {
    pub target: ScanTarget,
    pub dry_run: bool,
}

impl ScanRequest {
    pub fn scan_all(limit: Option<u32>, dry_run: bool) -> Self {
        Self {
            target: ScanTarget::All { limit },
            dry_run,
        }
    }

    pub fn single_task(task_id: String, task: Value, dry_run: bool) -> Self {
        Self {
            target: ScanTarget::Task { task_id, task },
            dry_run,
        }
    }
}

/// Counts reported by a completed engine scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanCounts {
    pub created_count: u64,
    pub skipped_count: u64,
    pub processed_count: u64,
}

/// Failure classification for a scan dispatch.
///
/// These tags are part of the frontend contract; they surface in the
/// `scan_result.error` field of a sync-mode listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
pub enum ScanFailureKind {
    Timeout,
    HttpError,
    UnexpectedError,
    AuthUnavailable,
}

impl ScanFailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ScanFailureKind::Timeout => "timeout",
            ScanFailureKind::HttpError => "http_error",
            ScanFailureKind::UnexpectedError => "unexpected_error",
            ScanFailureKind::AuthUnavailable => "auth_unavailable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScanFailure {
    #[cfg_attr(feature = "serde", serde(rename = "error"))]
    pub kind: ScanFailureKind,
    pub message: String,
}

/// Result of a dispatched scan, only materialized in sync mode.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(untagged)
)]
pub enum ScanOutcome {
    Completed(ScanCounts),
    Failed(ScanFailure),
}

impl ScanOutcome {
    pub fn failed(kind: ScanFailureKind, message: impl Into<String>) -> Self {
        ScanOutcome::Failed(ScanFailure {
            kind,
            message: message.into(),
        })
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, ScanOutcome::Failed(_))
    }
}
