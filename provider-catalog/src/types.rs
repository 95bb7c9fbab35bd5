//! Catalog API payload types
//!
//! Request and response bodies for the `/API/assets/v1` and `/API/files/v1`
//! routes. Responses are parsed leniently: any field the catalog leaves out
//! falls back to its default.

use bridge_traits::storage::UploadTarget;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Status set on every asset and format this service creates
pub const STATUS_ACTIVE: &str = "ACTIVE";

/// Asset type for plain media assets
pub const ASSET_TYPE: &str = "ASSET";

/// File type for regular files
pub const FILE_TYPE: &str = "FILE";

/// Name of the format holding the uploaded original
pub const ORIGINAL_FORMAT: &str = "ORIGINAL";

/// Catalog collection (mirrors a local directory)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Collection {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub title: String,

    /// Parent collection id; empty for a root collection
    #[serde(skip_serializing_if = "String::is_empty")]
    pub parent_id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub storage_id: String,
}

/// Catalog asset (mirrors a local file)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Asset {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub external_id: String,
    pub is_blocked: bool,
    pub is_online: bool,
    pub status: String,
    pub title: String,

    #[serde(rename = "type")]
    pub asset_type: String,

    /// Collection the asset is assigned to on creation
    #[serde(skip_serializing_if = "String::is_empty")]
    pub collection_id: String,
}

/// Representation of an asset held in a storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Format {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub is_online: bool,

    /// Free-form metadata, e.g. `[{"internet_media_type": "image/jpeg"}]`
    pub metadata: Vec<HashMap<String, String>>,

    pub name: String,
    pub status: String,
    pub storage_methods: Vec<String>,
}

/// Group of files making up one format in one storage
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSet {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub format_id: String,
    pub storage_id: String,
    pub base_dir: String,
    pub name: String,
    pub component_ids: Vec<String>,
}

/// Single file record; the creation response carries the upload URL
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub name: String,
    pub original_name: String,
    pub directory_path: String,
    pub size: u64,

    #[serde(rename = "type")]
    pub file_type: String,

    pub storage_id: String,
    pub file_set_id: String,
    pub format_id: String,

    #[serde(skip_serializing_if = "String::is_empty")]
    pub upload_url: String,

    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub upload_credentials: HashMap<String, String>,

    /// RFC 3339 creation time of the local file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_date_created: Option<String>,

    /// RFC 3339 modification time of the local file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_date_modified: Option<String>,
}

impl std::fmt::Debug for CatalogFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogFile")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("directory_path", &self.directory_path)
            .field("size", &self.size)
            .field("storage_id", &self.storage_id)
            .field("file_set_id", &self.file_set_id)
            .field("format_id", &self.format_id)
            .field("upload_url", &self.upload_url)
            .field(
                "upload_credentials",
                &self.upload_credentials.keys().collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl From<&CatalogFile> for UploadTarget {
    fn from(file: &CatalogFile) -> Self {
        UploadTarget {
            id: file.id.clone(),
            name: file.name.clone(),
            original_name: file.original_name.clone(),
            directory_path: file.directory_path.clone(),
            size: file.size,
            upload_url: file.upload_url.clone(),
            upload_credentials: file.upload_credentials.clone(),
        }
    }
}

/// Storage configured in the catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageDescriptor {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub name: String,

    /// Transfer protocol, e.g. `GCS`, `S3` or `B2`
    pub method: String,

    pub purpose: String,
    pub status: String,
    pub settings: HashMap<String, serde_json::Value>,
}

/// Body of the PATCH that closes a file after its bytes are uploaded
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CloseFileRequest {
    pub status: String,
    pub progress_processed: u8,
}

impl Default for CloseFileRequest {
    fn default() -> Self {
        Self {
            status: "CLOSED".to_string(),
            progress_processed: 100,
        }
    }
}

/// Body of the request that starts keyframe/proxy generation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyframesRequest {
    pub use_storage_transcode_ignore_pattern: bool,
    pub priority: u8,
}

impl Default for KeyframesRequest {
    fn default() -> Self {
        Self {
            use_storage_transcode_ignore_pattern: true,
            priority: 5,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct KeyframesResponse {
    pub job_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_omits_empty_ids() {
        let collection = Collection {
            title: "photos".to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&collection).unwrap();
        assert_eq!(json, serde_json::json!({ "title": "photos" }));
    }

    #[test]
    fn test_asset_type_field_name() {
        let asset = Asset {
            title: "a.jpg".to_string(),
            status: STATUS_ACTIVE.to_string(),
            asset_type: ASSET_TYPE.to_string(),
            ..Default::default()
        };

        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["type"], "ASSET");
        assert!(json.get("collection_id").is_none());
    }

    #[test]
    fn test_file_response_with_upload_details() {
        let json = r#"{
            "id": "file-1",
            "name": "a.jpg",
            "directory_path": "photos",
            "size": 12,
            "upload_url": "https://upload.example.com/b2",
            "upload_credentials": {"authorizationToken": "b2-secret"},
            "extra_field": true
        }"#;

        let file: CatalogFile = serde_json::from_str(json).unwrap();
        let target = UploadTarget::from(&file);

        assert_eq!(target.id, "file-1");
        assert_eq!(target.size, 12);
        assert_eq!(
            target.upload_credentials.get("authorizationToken"),
            Some(&"b2-secret".to_string())
        );
        assert!(!format!("{:?}", file).contains("b2-secret"));
    }

    #[test]
    fn test_fixed_request_bodies() {
        let close = serde_json::to_value(CloseFileRequest::default()).unwrap();
        assert_eq!(
            close,
            serde_json::json!({ "status": "CLOSED", "progress_processed": 100 })
        );

        let keyframes = serde_json::to_value(KeyframesRequest::default()).unwrap();
        assert_eq!(
            keyframes,
            serde_json::json!({ "use_storage_transcode_ignore_pattern": true, "priority": 5 })
        );
    }

    #[test]
    fn test_storage_descriptor_settings() {
        let json = r#"{
            "id": "storage-1",
            "name": "archive",
            "method": "B2",
            "purpose": "FILES",
            "status": "ACTIVE",
            "settings": {"bucket": "media", "scan_include": ["*"]}
        }"#;

        let storage: StorageDescriptor = serde_json::from_str(json).unwrap();
        assert_eq!(storage.method, "B2");
        assert_eq!(storage.settings["bucket"], "media");
    }
}
