//! Cookie-jar style persistence for session entries.
//!
//! Each entry carries its own expiry; expired entries are dropped when the
//! jar is loaded. The file store logs IO failures instead of surfacing
//! them, so a read-only disk degrades to an in-memory session rather than
//! breaking sign-in.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Jar keys used by the session manager.
pub mod keys {
    pub const AUTH_TOKEN: &str = "auth_token";
    pub const REFRESH_TOKEN: &str = "refresh_token";
    pub const USER_ID: &str = "user_id";
    pub const USER_ROLE: &str = "user_role";
    pub const USER_DATA: &str = "user_data";
}

/// Session entries live for a week, matching the backend token lifetime.
pub const SESSION_TTL_DAYS: i64 = 7;

/// Cross-site send policy recorded on each entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSite {
    #[default]
    Lax,
    Strict,
}

/// One persisted session entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub value: String,
    pub expires_at: DateTime<Utc>,
    #[serde(default)]
    pub same_site: SameSite,
}

impl Entry {
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            expires_at: Utc::now() + Duration::days(SESSION_TTL_DAYS),
            same_site: SameSite::Lax,
        }
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Key-value persistence for session entries.
///
/// Implementations must be safe to share across tasks; IO failures are
/// the implementation's problem to log, not the caller's to handle.
pub trait SessionStore: Send + Sync {
    fn set(&self, key: &str, entry: Entry);
    fn get(&self, key: &str) -> Option<Entry>;
    fn remove(&self, key: &str);
    fn clear(&self);
}

// =============================================================================
// FileStore
// =============================================================================

/// A session jar persisted as a JSON file.
pub struct FileStore {
    path: PathBuf,
    entries: RwLock<HashMap<String, Entry>>,
}

impl FileStore {
    /// Open the jar at `path`, loading any persisted entries and dropping
    /// expired ones.
    #[must_use]
    pub fn open(path: PathBuf) -> Self {
        let entries = load_entries(&path);
        Self {
            path,
            entries: RwLock::new(entries),
        }
    }

    fn flush(&self, entries: &HashMap<String, Entry>) {
        if let Some(parent) = self.path.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(error = %e, path = %self.path.display(), "failed to create session directory");
            return;
        }
        match serde_json::to_vec_pretty(entries) {
            Ok(bytes) => {
                if let Err(e) = std::fs::write(&self.path, bytes) {
                    warn!(error = %e, path = %self.path.display(), "failed to persist session jar");
                }
            }
            Err(e) => warn!(error = %e, "failed to serialize session jar"),
        }
    }
}

fn load_entries(path: &std::path::Path) -> HashMap<String, Entry> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return HashMap::new(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "failed to read session jar");
            return HashMap::new();
        }
    };

    match serde_json::from_slice::<HashMap<String, Entry>>(&bytes) {
        Ok(entries) => entries
            .into_iter()
            .filter(|(_, entry)| !entry.is_expired())
            .collect(),
        Err(e) => {
            warn!(error = %e, path = %path.display(), "session jar is corrupt, starting fresh");
            HashMap::new()
        }
    }
}

impl SessionStore for FileStore {
    fn set(&self, key: &str, entry: Entry) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), entry);
            self.flush(&entries);
        }
    }

    fn get(&self, key: &str) -> Option<Entry> {
        let entries = self.entries.read().ok()?;
        entries.get(key).filter(|e| !e.is_expired()).cloned()
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write()
            && entries.remove(key).is_some()
        {
            self.flush(&entries);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
            self.flush(&entries);
        }
    }
}

// =============================================================================
// MemoryStore
// =============================================================================

/// A jar that forgets everything on drop. Used in tests and as the
/// fallback when no session file is configured.
#[derive(Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemoryStore {
    fn set(&self, key: &str, entry: Entry) {
        if let Ok(mut entries) = self.entries.write() {
            entries.insert(key.to_string(), entry);
        }
    }

    fn get(&self, key: &str) -> Option<Entry> {
        let entries = self.entries.read().ok()?;
        entries.get(key).filter(|e| !e.is_expired()).cloned()
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.write() {
            entries.remove(key);
        }
    }

    fn clear(&self) {
        if let Ok(mut entries) = self.entries.write() {
            entries.clear();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entry_defaults_to_lax_week_expiry() {
        let entry = Entry::new("tok");
        assert_eq!(entry.same_site, SameSite::Lax);
        assert!(!entry.is_expired());
        assert!(entry.expires_at > Utc::now() + Duration::days(6));
    }

    #[test]
    fn test_memory_store_drops_expired_on_get() {
        let store = MemoryStore::new();
        store.set(
            keys::AUTH_TOKEN,
            Entry {
                value: "stale".to_string(),
                expires_at: Utc::now() - Duration::minutes(1),
                same_site: SameSite::Lax,
            },
        );
        assert!(store.get(keys::AUTH_TOKEN).is_none());
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("bh-session-{}", std::process::id()));
        let path = dir.join("session.json");
        let _ = std::fs::remove_file(&path);

        let store = FileStore::open(path.clone());
        store.set(keys::AUTH_TOKEN, Entry::new("tok-123"));
        drop(store);

        let reopened = FileStore::open(path.clone());
        assert_eq!(
            reopened.get(keys::AUTH_TOKEN).map(|e| e.value),
            Some("tok-123".to_string())
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_corrupt_file_starts_fresh() {
        let dir = std::env::temp_dir().join(format!("bh-corrupt-{}", std::process::id()));
        std::fs::create_dir_all(&dir).expect("mkdir");
        let path = dir.join("session.json");
        std::fs::write(&path, b"not json").expect("write");

        let store = FileStore::open(path);
        assert!(store.get(keys::AUTH_TOKEN).is_none());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
