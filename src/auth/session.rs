use serde::{Deserialize, Serialize};

use crate::models::User;

/// The authenticated identity bound to this client context.
///
/// Authentication status is always derived from the presence of the
/// access token; it is never stored as its own flag, so the two can
/// never drift apart.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    pub user: Option<User>,
}

impl Session {
    pub fn is_authenticated(&self) -> bool {
        self.access_token.is_some()
    }

    /// Reset to the anonymous state.
    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authenticated_iff_access_token_present() {
        let mut session = Session::default();
        assert!(!session.is_authenticated());

        session.access_token = Some("A1".to_string());
        assert!(session.is_authenticated());

        // A lone refresh token does not make the session authenticated
        session.clear();
        session.refresh_token = Some("R1".to_string());
        assert!(!session.is_authenticated());
    }
}
