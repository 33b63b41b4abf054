//! Core types for taskboard

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use utoipa::ToSchema;

/// Lifecycle state of a background task
///
/// States fall into two disjoint groups, see [`TaskState::UNFINISHED`] and
/// [`TaskState::FINISHED`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Waiting for a worker
    Pending,
    /// Being executed
    Running,
    /// Finished successfully
    Succeeded,
    /// Cancellation requested, waiting for the worker to stop
    Canceling,
    /// Stopped by a cancellation request
    Canceled,
    /// Last attempt returned an error, retry decision pending
    Errored,
    /// Last attempt failed and the task is being torn down
    Failing,
    /// Failed with no retries left
    Failed,
    /// Scheduled for another attempt
    WaitingRetry,
    /// About to start another attempt
    BeforeRetry,
}

impl TaskState {
    /// States of tasks that are still in progress
    pub const UNFINISHED: [TaskState; 7] = [
        TaskState::Pending,
        TaskState::Running,
        TaskState::Canceling,
        TaskState::Errored,
        TaskState::Failing,
        TaskState::WaitingRetry,
        TaskState::BeforeRetry,
    ];

    /// Terminal states
    pub const FINISHED: [TaskState; 3] =
        [TaskState::Canceled, TaskState::Failed, TaskState::Succeeded];

    /// Every state, in code order
    pub const ALL: [TaskState; 10] = [
        TaskState::Pending,
        TaskState::Running,
        TaskState::Succeeded,
        TaskState::Canceling,
        TaskState::Canceled,
        TaskState::Errored,
        TaskState::Failing,
        TaskState::Failed,
        TaskState::WaitingRetry,
        TaskState::BeforeRetry,
    ];

    /// Whether the state is terminal
    pub fn is_finished(&self) -> bool {
        matches!(
            self,
            TaskState::Canceled | TaskState::Failed | TaskState::Succeeded
        )
    }

    /// Numeric state code
    pub fn code(&self) -> i32 {
        match self {
            TaskState::Pending => 0,
            TaskState::Running => 1,
            TaskState::Succeeded => 2,
            TaskState::Canceling => 3,
            TaskState::Canceled => 4,
            TaskState::Errored => 5,
            TaskState::Failing => 6,
            TaskState::Failed => 7,
            TaskState::WaitingRetry => 8,
            TaskState::BeforeRetry => 9,
        }
    }

    /// Convert a numeric state code back to a state
    pub fn from_code(code: i32) -> Option<Self> {
        TaskState::ALL.into_iter().find(|s| s.code() == code)
    }
}

/// Snapshot of one task as returned to API callers
///
/// Built fresh on every query and never persisted.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct TaskRecord {
    /// Task ID, unique within its manager
    pub id: String,
    /// Display name
    pub name: String,
    /// Current lifecycle state
    pub state: TaskState,
    /// Human-readable status line
    pub status: String,
    /// Progress in percent (0-100)
    pub progress: f64,
    /// Last error message, empty if none
    pub error: String,
}

/// Independently managed category of background work
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TaskDomain {
    /// File uploads
    Upload,
    /// Copies between storages
    Copy,
    /// Offline (server-side) downloads
    OfflineDownload,
    /// Transfers of finished offline downloads into storage
    OfflineDownloadTransfer,
}

impl TaskDomain {
    /// Every task domain
    pub const ALL: [TaskDomain; 4] = [
        TaskDomain::Upload,
        TaskDomain::Copy,
        TaskDomain::OfflineDownload,
        TaskDomain::OfflineDownloadTransfer,
    ];

    /// Path segment used for this domain in the API
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskDomain::Upload => "upload",
            TaskDomain::Copy => "copy",
            TaskDomain::OfflineDownload => "offline_download",
            TaskDomain::OfflineDownloadTransfer => "offline_download_transfer",
        }
    }
}

impl fmt::Display for TaskDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskDomain {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskDomain::ALL
            .into_iter()
            .find(|d| d.as_str() == s)
            .ok_or_else(|| crate::Error::NotFound(format!("task domain '{}'", s)))
    }
}

/// Auxiliary per-file record kept in the metadata store
///
/// Keyed by (`file_path`, `file_name`). Any other fields are carried as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataEntry {
    /// File name
    pub file_name: String,
    /// Directory path of the file
    pub file_path: String,
    /// Auxiliary fields
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl MetadataEntry {
    /// Create an entry without auxiliary fields
    pub fn new(file_path: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            file_path: file_path.into(),
            extra: serde_json::Map::new(),
        }
    }

    /// Whether this entry has the given composite key
    pub fn matches(&self, file_path: &str, file_name: &str) -> bool {
        self.file_path == file_path && self.file_name == file_name
    }
}
