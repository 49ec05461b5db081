use std::fs;
use std::io;
use std::path::PathBuf;
use tracing::{debug, warn};

use crate::domain::User;

/// Persists the single authenticated-user record across restarts.
///
/// Written on successful login/register, read once at startup, removed at
/// logout. The client-side analog of the browser's local storage slot.
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            path: dir.into().join("user.json"),
        }
    }

    /// Loads the stored user, if any. A corrupt record is treated as absent
    /// (and logged), not as a fatal error.
    pub fn load(&self) -> Option<User> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return None,
            Err(e) => {
                warn!(error = %e, path = %self.path.display(), "Failed to read stored user");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(user) => Some(user),
            Err(e) => {
                warn!(error = %e, "Stored user record is corrupt, ignoring");
                None
            }
        }
    }

    pub fn save(&self, user: &User) -> Result<(), String> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| e.to_string())?;
        }
        let raw = serde_json::to_string_pretty(user).map_err(|e| e.to_string())?;
        fs::write(&self.path, raw).map_err(|e| e.to_string())?;
        debug!(path = %self.path.display(), "Stored user record");
        Ok(())
    }

    pub fn remove(&self) -> Result<(), String> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.to_string()),
        }
    }
}
