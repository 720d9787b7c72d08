//! Client Session
//! Mission: Persist the logged-in token and user snapshot between runs

use crate::auth::models::UserResponse;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// A logged-in session: the bearer token plus the user snapshot the
/// server returned at login.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
}

/// File-backed session storage with explicit load/save/clear.
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Default location: `$EVENTBOARD_SESSION`, else
    /// `$HOME/.eventboard/session.json`.
    pub fn default_path() -> PathBuf {
        if let Ok(p) = std::env::var("EVENTBOARD_SESSION") {
            if !p.trim().is_empty() {
                return PathBuf::from(p);
            }
        }
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(".eventboard").join("session.json")
    }

    /// Load the saved session. A missing file means logged out; a corrupt
    /// file is cleared and also treated as logged out.
    pub fn load(&self) -> Option<Session> {
        let raw = fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                debug!("Discarding corrupt session file: {}", e);
                let _ = fs::remove_file(&self.path);
                None
            }
        }
    }

    pub fn save(&self, session: &Session) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let raw = serde_json::to_string_pretty(session)?;
        fs::write(&self.path, raw)
            .with_context(|| format!("Failed to write {}", self.path.display()))?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        if self.path.exists() {
            fs::remove_file(&self.path)
                .with_context(|| format!("Failed to remove {}", self.path.display()))?;
        }
        Ok(())
    }
}
