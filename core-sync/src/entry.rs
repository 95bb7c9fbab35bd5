//! Local record of a synced path

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::path::{base_name, parent_path, PathInfo};

/// What a tracked path is on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    File,
    Directory,
}

/// Progress of the remote workflow for a path
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Stub written before any remote call; not proof of anything
    Pending,
    /// The remote workflow completed
    Complete,
}

/// Durable record of a synced path, stored under `files:<relative_path>`
///
/// A `Complete` entry is proof that the remote workflow for its path
/// finished. `remote_id` is the collection id for directories and the file
/// id for files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedEntry {
    pub relative_path: String,
    pub name: String,
    pub directory_path: String,
    pub kind: EntryKind,
    pub status: EntryStatus,

    #[serde(default)]
    pub remote_id: String,
    #[serde(default)]
    pub asset_id: String,
    #[serde(default)]
    pub storage_id: String,
    #[serde(default)]
    pub format_id: String,
    #[serde(default)]
    pub file_set_id: String,

    pub size_bytes: u64,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl TrackedEntry {
    /// Local stub for a file whose remote workflow is starting
    pub fn pending(relative_path: &str, info: &PathInfo) -> Self {
        Self {
            relative_path: relative_path.to_string(),
            name: base_name(relative_path).to_string(),
            directory_path: parent_path(relative_path).to_string(),
            kind: EntryKind::File,
            status: EntryStatus::Pending,
            remote_id: String::new(),
            asset_id: String::new(),
            storage_id: String::new(),
            format_id: String::new(),
            file_set_id: String::new(),
            size_bytes: info.size_bytes,
            created_at: info.created_at,
            modified_at: info.modified_at,
        }
    }

    /// Completed record for a directory mirrored as collection `collection_id`
    pub fn directory(relative_path: &str, info: &PathInfo, collection_id: &str) -> Self {
        Self {
            kind: EntryKind::Directory,
            status: EntryStatus::Complete,
            remote_id: collection_id.to_string(),
            size_bytes: 0,
            ..Self::pending(relative_path, info)
        }
    }

    pub fn is_complete(&self) -> bool {
        self.status == EntryStatus::Complete
    }
}
