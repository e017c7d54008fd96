//! Data models for Live CMS entities.
//!
//! This module contains the data structures returned by the CMS REST API:
//!
//! - `Post`: published content entries with author attribution
//! - `Media`: uploaded files with size and mime info
//! - `Taxonomy`: categories/tags attached to posts
//! - `User`: account records (also cached in the auth session)
//!
//! List endpoints wrap their collections in a `meta`/collection envelope;
//! callers receive them as `Page<T>`.

pub mod media;
pub mod post;
pub mod taxonomy;
pub mod user;

pub use media::{Media, MediaUpdate, MediaUpload};
pub use post::{NewPost, Post, PostUpdate};
pub use taxonomy::Taxonomy;
pub use user::User;

use serde::{Deserialize, Serialize};

/// Pagination metadata attached to list responses.
/// Endpoints are inconsistent about which fields they include,
/// so everything defaults to zero.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Meta {
    #[serde(default)]
    pub count: i64,
    #[serde(default)]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
    #[serde(default)]
    pub total: i64,
}

/// One page of a listed resource.
#[derive(Debug, Clone, Default)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub meta: Meta,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_defaults_missing_fields() {
        // The posts list endpoint omits "total"
        let meta: Meta = serde_json::from_str(r#"{"count": 3, "limit": 10, "offset": 0}"#)
            .expect("meta should parse");
        assert_eq!(meta.count, 3);
        assert_eq!(meta.total, 0);
    }
}
