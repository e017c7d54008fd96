use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A CMS account. The login response embeds one of these, and the auth
/// session caches it as a display snapshot - it is not authoritative.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Preferred display name: full name when set, username otherwise.
    pub fn display_name(&self) -> &str {
        if self.full_name.is_empty() {
            &self.username
        } else {
            &self.full_name
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == "admin"
    }
}
