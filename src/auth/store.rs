use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::{debug, warn};

use super::Session;

/// Session file name in the storage directory
const SESSION_FILE: &str = "session.json";

/// Durable persistence for the session tokens and cached user record.
///
/// The three logical values (access token, refresh token, user) are
/// written and cleared together as one JSON document. Token contents are
/// never inspected - this is an opaque blob mover.
///
/// A store is constructed either with a storage directory or explicitly
/// `disabled()` for contexts without durable storage (e.g. ephemeral
/// server-side rendering); a disabled store no-ops every operation and
/// loads an empty session.
pub struct TokenStore {
    storage_dir: Option<PathBuf>,
}

impl TokenStore {
    pub fn new(storage_dir: PathBuf) -> Self {
        Self {
            storage_dir: Some(storage_dir),
        }
    }

    /// A store for contexts without durable storage.
    pub fn disabled() -> Self {
        Self { storage_dir: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.storage_dir.is_some()
    }

    /// Load the persisted session, or an empty one if the store is
    /// disabled, the file is missing, or it cannot be parsed.
    pub fn load(&self) -> Session {
        let Some(path) = self.session_path() else {
            return Session::default();
        };
        if !path.exists() {
            return Session::default();
        }
        match std::fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(session) => session,
                Err(err) => {
                    warn!(error = %err, "Discarding unreadable session file");
                    Session::default()
                }
            },
            Err(err) => {
                warn!(error = %err, "Failed to read session file");
                Session::default()
            }
        }
    }

    /// Persist the session. No-op when disabled.
    pub fn save(&self, session: &Session) -> Result<()> {
        let Some(path) = self.session_path() else {
            return Ok(());
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create storage directory")?;
        }
        let contents = serde_json::to_string_pretty(session)?;
        std::fs::write(&path, contents).context("Failed to write session file")?;
        debug!(path = %path.display(), "Session persisted");
        Ok(())
    }

    /// Remove the persisted session. No-op when disabled.
    pub fn clear(&self) -> Result<()> {
        let Some(path) = self.session_path() else {
            return Ok(());
        };
        if path.exists() {
            std::fs::remove_file(&path).context("Failed to remove session file")?;
        }
        Ok(())
    }

    fn session_path(&self) -> Option<PathBuf> {
        self.storage_dir.as_ref().map(|dir| dir.join(SESSION_FILE))
    }
}
