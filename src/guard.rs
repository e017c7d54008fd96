//! Session gate for protected views.
//!
//! `SessionGuard` reproduces the admin panel's route-guard flow: before a
//! protected view renders, the current session is checked and - when a
//! refresh token exists - proactively refreshed, so an access token that
//! expired while the view was inactive is caught up front. The guard
//! returns a decision; navigation is the caller's job.

use tracing::debug;
use url::form_urlencoded;

use crate::auth::{AuthManager, Session};

/// Default login view path used for redirects
const DEFAULT_LOGIN_PATH: &str = "/login";

/// Outcome of a guard check.
#[derive(Debug, Clone, PartialEq)]
pub enum GuardOutcome {
    /// Render the protected content with this session.
    Allow(Session),
    /// Navigate to this URL (login view with the originating path
    /// encoded as the return destination).
    Redirect(String),
}

pub struct SessionGuard {
    auth: AuthManager,
    login_path: String,
}

impl SessionGuard {
    pub fn new(auth: AuthManager) -> Self {
        Self {
            auth,
            login_path: DEFAULT_LOGIN_PATH.to_string(),
        }
    }

    pub fn with_login_path(auth: AuthManager, login_path: impl Into<String>) -> Self {
        Self {
            auth,
            login_path: login_path.into(),
        }
    }

    /// Decide whether the view at `current_path` may render.
    pub async fn check(&self, current_path: &str) -> GuardOutcome {
        let session = self.auth.state();

        if !session.is_authenticated() {
            debug!(path = current_path, "Unauthenticated, redirecting to login");
            return self.redirect(current_path);
        }

        if session.refresh_token.is_some() && !self.auth.refresh_access_token().await {
            debug!(path = current_path, "Session refresh failed, redirecting to login");
            return self.redirect(current_path);
        }

        GuardOutcome::Allow(self.auth.state())
    }

    fn redirect(&self, current_path: &str) -> GuardOutcome {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("redirect", current_path)
            .finish();
        GuardOutcome::Redirect(format!("{}?{}", self.login_path, query))
    }
}
