//! Process-wide session authority.
//!
//! `AuthManager` owns the `Session`, performs the login/refresh/logout
//! calls against the CMS auth endpoints, and persists every state change
//! through the `TokenStore`. HTTP call sites and route guards consult it
//! instead of touching tokens themselves.

use std::sync::{Arc, Mutex};

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::{AuthError, Session, TokenStore};
use crate::models::User;

/// Path prefix for the versioned API
const API_PREFIX: &str = "/api/v1";

type PendingRefresh = Shared<BoxFuture<'static, bool>>;

/// Single source of truth for authentication state.
///
/// Clone is cheap - all clones share one session, one store, and one
/// refresh slot, so there is exactly one authority per construction.
#[derive(Clone)]
pub struct AuthManager {
    inner: Arc<Inner>,
}

struct Inner {
    http: Client,
    base_url: String,
    store: TokenStore,
    session: Mutex<Session>,
    /// At most one refresh request in flight; concurrent callers clone
    /// and await the same shared future instead of racing the server.
    pending_refresh: Mutex<Option<PendingRefresh>>,
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
    refresh_token: String,
    user: User,
}

#[derive(Serialize)]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

#[derive(Deserialize)]
struct RefreshResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl AuthManager {
    /// Create the session authority, hydrating state from the store.
    pub fn new(http: Client, base_url: impl Into<String>, store: TokenStore) -> Self {
        let session = store.load();
        if session.is_authenticated() {
            debug!("Hydrated persisted session");
        }
        Self {
            inner: Arc::new(Inner {
                http,
                base_url: base_url.into(),
                store,
                session: Mutex::new(session),
                pending_refresh: Mutex::new(None),
            }),
        }
    }

    /// Read-only snapshot of the current session.
    pub fn state(&self) -> Session {
        self.inner.lock_session().clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.inner.lock_session().access_token.clone()
    }

    /// Authenticate against the CMS. On success the whole session is
    /// replaced and persisted; on failure the existing session is left
    /// untouched and the server's error message is returned.
    pub async fn login(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let url = format!("{}{}/auth/login", self.inner.base_url, API_PREFIX);
        let response = self
            .inner
            .http
            .post(&url)
            .json(&LoginRequest { username, password })
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let message = match response.json::<ErrorBody>().await {
                Ok(body) => body.error,
                Err(_) => format!("Login failed with status {}", status),
            };
            debug!(status = %status, "Login rejected");
            return Err(AuthError::Rejected(message));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|err| AuthError::InvalidResponse(err.to_string()))?;

        info!(username = %body.user.username, "Login succeeded");
        self.inner.replace_session(Session {
            access_token: Some(body.access_token),
            refresh_token: Some(body.refresh_token),
            user: Some(body.user),
        });
        Ok(())
    }

    /// Revoke the server session (best effort) and clear local state.
    /// The local clear happens regardless of how the network call goes.
    pub async fn logout(&self) {
        let (access_token, refresh_token) = {
            let session = self.inner.lock_session();
            (session.access_token.clone(), session.refresh_token.clone())
        };

        if let Some(ref refresh_token) = refresh_token {
            let url = format!("{}{}/auth/logout", self.inner.base_url, API_PREFIX);
            let mut request = self.inner.http.post(&url).json(&RefreshRequest { refresh_token });
            if let Some(ref token) = access_token {
                request = request.bearer_auth(token);
            }
            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Server session revoked");
                }
                Ok(response) => {
                    warn!(status = %response.status(), "Server logout failed, clearing locally");
                }
                Err(err) => {
                    warn!(error = %err, "Logout request failed, clearing locally");
                }
            }
        }

        self.inner.clear_session();
        info!("Logged out");
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// Returns `false` immediately (no network call) when no refresh
    /// token is present. Any failure clears the entire session - a stale
    /// or revoked refresh token cannot self-heal, so the session is
    /// invalidated rather than retried.
    ///
    /// Concurrent calls coalesce: the first caller starts the request
    /// and every overlapping caller awaits the same shared future, so a
    /// burst of 401s produces exactly one refresh and one outcome.
    pub async fn refresh_access_token(&self) -> bool {
        if self.inner.lock_session().refresh_token.is_none() {
            return false;
        }

        let pending = {
            let mut slot = self
                .inner
                .pending_refresh
                .lock()
                .expect("refresh slot lock poisoned");
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let inner = Arc::clone(&self.inner);
                    let fut = async move {
                        let refreshed = inner.do_refresh().await;
                        // Clear the slot so the next 401 starts fresh
                        inner
                            .pending_refresh
                            .lock()
                            .expect("refresh slot lock poisoned")
                            .take();
                        refreshed
                    }
                    .boxed()
                    .shared();
                    *slot = Some(fut.clone());
                    fut
                }
            }
        };

        pending.await
    }
}

impl Inner {
    fn lock_session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.session.lock().expect("session lock poisoned")
    }

    /// Replace the session wholesale and persist it.
    fn replace_session(&self, session: Session) {
        let mut guard = self.lock_session();
        *guard = session;
        if let Err(err) = self.store.save(&guard) {
            warn!(error = %err, "Failed to persist session");
        }
    }

    /// Drop to the anonymous state, in memory and on disk.
    fn clear_session(&self) {
        let mut guard = self.lock_session();
        guard.clear();
        if let Err(err) = self.store.clear() {
            warn!(error = %err, "Failed to clear persisted session");
        }
    }

    async fn do_refresh(&self) -> bool {
        // Re-check under the lock: a logout may have cleared the token
        // between the caller's check and this future starting.
        let Some(refresh_token) = self.lock_session().refresh_token.clone() else {
            return false;
        };

        let url = format!("{}{}/auth/refresh", self.base_url, API_PREFIX);
        let result = self
            .http
            .post(&url)
            .json(&RefreshRequest {
                refresh_token: &refresh_token,
            })
            .send()
            .await;

        let response = match result {
            Ok(response) => response,
            Err(err) => {
                warn!(error = %err, "Token refresh request failed");
                self.clear_session();
                return false;
            }
        };

        if !response.status().is_success() {
            debug!(status = %response.status(), "Token refresh rejected");
            self.clear_session();
            return false;
        }

        match response.json::<RefreshResponse>().await {
            Ok(body) => {
                let mut guard = self.lock_session();
                guard.access_token = Some(body.access_token);
                if let Err(err) = self.store.save(&guard) {
                    warn!(error = %err, "Failed to persist refreshed session");
                }
                debug!("Access token rotated");
                true
            }
            Err(err) => {
                warn!(error = %err, "Invalid refresh response");
                self.clear_session();
                false
            }
        }
    }
}
