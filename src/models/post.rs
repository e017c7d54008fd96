use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A published content entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    pub id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    pub user_id: i64,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub url: String,
    pub created_at: DateTime<Utc>,
    pub changed_at: DateTime<Utc>,
}

/// Request body for creating a post. At least one author is required.
#[derive(Debug, Clone, Serialize)]
pub struct NewPost {
    pub title: String,
    pub content: String,
    pub description: String,
    pub url: String,
    pub author_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub image_ids: Vec<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub taxonomy_ids: Vec<i64>,
}

/// Partial update for a post. Unset fields are left unchanged server-side.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PostUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_ids: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taxonomy_ids: Option<Vec<i64>>,
}
