use serde::{Deserialize, Serialize};

/// A category or tag attachable to posts.
/// `post_count` is only populated by the popular/listing endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Taxonomy {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub post_count: Option<i64>,
}
