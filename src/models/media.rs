use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded media file. `media_path` is server-relative; use
/// `ApiClient::media_url` to turn it into a fetchable URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Media {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub alt: String,
    pub media_path: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
    #[serde(default)]
    pub file_size: i64,
    #[serde(default)]
    pub mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i32>,
    #[serde(default)]
    pub original_filename: String,
}

/// A file plus the metadata fields the upload endpoint requires.
/// Sent as multipart/form-data.
#[derive(Debug, Clone)]
pub struct MediaUpload {
    pub name: String,
    pub description: String,
    pub alt: String,
    pub filename: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub post_id: Option<i64>,
}

/// Editable metadata for an existing media item.
#[derive(Debug, Clone, Default, Serialize)]
pub struct MediaUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt: Option<String>,
}
