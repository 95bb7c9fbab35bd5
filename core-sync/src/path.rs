//! Relative path handling and filesystem metadata
//!
//! Paths are tracked relative to the scan root, with `/` separators, no
//! leading slash and no trailing slash. The scan root itself is never tracked.

use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::{Component, Path};

use crate::error::{Result, SyncError};

/// Filesystem metadata captured when a path is discovered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathInfo {
    pub name: String,
    pub size_bytes: u64,
    pub is_dir: bool,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

impl PathInfo {
    /// Capture metadata for an entry called `name`
    ///
    /// Platforms without birth time report the modification time as the
    /// creation time.
    pub fn from_metadata(name: impl Into<String>, metadata: &Metadata) -> Self {
        let modified_at = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_else(|_| Utc::now());
        let created_at = metadata
            .created()
            .map(DateTime::<Utc>::from)
            .unwrap_or(modified_at);

        Self {
            name: name.into(),
            size_bytes: if metadata.is_dir() { 0 } else { metadata.len() },
            is_dir: metadata.is_dir(),
            created_at,
            modified_at,
        }
    }

    /// Metadata for a regular file, used by tests and synthetic feeds
    pub fn file(name: impl Into<String>, size_bytes: u64) -> Self {
        let now = Utc::now();
        Self {
            name: name.into(),
            size_bytes,
            is_dir: false,
            created_at: now,
            modified_at: now,
        }
    }

    /// Metadata for a directory
    pub fn directory(name: impl Into<String>) -> Self {
        Self {
            is_dir: true,
            ..Self::file(name, 0)
        }
    }
}

/// Parent of a relative path; empty for entries at the root
pub fn parent_path(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit_once('/')
        .map(|(parent, _)| parent.trim_end_matches('/'))
        .unwrap_or("")
}

/// Last segment of a relative path
pub fn base_name(path: &str) -> &str {
    let path = path.trim_end_matches('/');
    path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path)
}

/// Express `full` relative to `root` with `/` separators
pub fn relative_path(root: &Path, full: &Path) -> Result<String> {
    let invalid = |reason: &str| SyncError::InvalidPath {
        path: full.display().to_string(),
        reason: reason.to_string(),
    };

    let relative = full
        .strip_prefix(root)
        .map_err(|_| invalid("not under the scan root"))?;

    let mut segments = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(segment) => {
                segments.push(segment.to_str().ok_or_else(|| invalid("not valid UTF-8"))?)
            }
            Component::CurDir => {}
            _ => return Err(invalid("unexpected path component")),
        }
    }

    if segments.is_empty() {
        return Err(invalid("is the scan root"));
    }

    Ok(segments.join("/"))
}

/// Internet media type for a file name, by extension
pub fn guess_media_type(name: &str) -> &'static str {
    let extension = match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => return "application/octet-stream",
    };

    match extension.as_str() {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        "heic" => "image/heic",
        "svg" => "image/svg+xml",
        "mp4" | "m4v" => "video/mp4",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "webm" => "video/webm",
        "mxf" => "application/mxf",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        "m4a" => "audio/mp4",
        "ogg" => "audio/ogg",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        _ => "application/octet-stream",
    }
}
