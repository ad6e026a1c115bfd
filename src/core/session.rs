//! # Session Persistence
//!
//! Mirrors the conversation to a local key-value store so a relaunch picks
//! up where the user left off. The store is an injected capability
//! (`KvStore`): production uses one JSON file per key under
//! `~/.cookbot/sessions/`, tests use an in-memory fake.
//!
//! Persistence is strictly best-effort: the chat stays usable without it.
//! Writes swallow and log failures; a corrupt or absent stored value loads
//! as an empty history. All file writes use atomic rename (write `.tmp`,
//! then `rename()`) for crash safety.

use std::fs;
use std::io;
use std::path::PathBuf;

use log::{debug, warn};

use crate::core::message::Message;

/// Key under which the active session id is stored.
const ACTIVE_SESSION_KEY: &str = "active-session";

/// Minimal key-value capability. Implementations must not panic or surface
/// storage errors; failures are logged and swallowed.
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str);
}

/// One file per key under a directory, written atomically.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn open(dir: PathBuf) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    /// Opens the default store at `~/.cookbot/sessions/`.
    pub fn open_default() -> io::Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no home directory"))?;
        Self::open(home.join(".cookbot").join("sessions"))
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KvStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.path_for(key)).ok()
    }

    fn set(&self, key: &str, value: &str) {
        let path = self.path_for(key);
        let tmp_path = path.with_extension("tmp");
        let result = fs::write(&tmp_path, value).and_then(|_| fs::rename(&tmp_path, &path));
        if let Err(e) = result {
            warn!("Failed to persist {}: {}", path.display(), e);
        }
    }
}

/// Generate a new UUID v4 session id.
pub fn new_session_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

fn history_key(session_id: &str) -> String {
    format!("history-{session_id}")
}

/// Write the session's message list. Serialization failure is logged, never
/// surfaced.
pub fn save_messages(store: &dyn KvStore, session_id: &str, messages: &[Message]) {
    match serde_json::to_string(messages) {
        Ok(json) => {
            store.set(&history_key(session_id), &json);
            debug!("Saved {} messages for session {}", messages.len(), session_id);
        }
        Err(e) => warn!("Failed to serialize history for session {}: {}", session_id, e),
    }
}

/// Load the session's message list. Absent or corrupt history is an empty
/// list, never an error.
pub fn load_messages(store: &dyn KvStore, session_id: &str) -> Vec<Message> {
    let Some(json) = store.get(&history_key(session_id)) else {
        return Vec::new();
    };
    match serde_json::from_str(&json) {
        Ok(messages) => messages,
        Err(e) => {
            warn!("Corrupt history for session {} ({}), starting empty", session_id, e);
            Vec::new()
        }
    }
}

/// Returns the persisted active session id, creating and storing a fresh
/// one on first run.
pub fn load_or_create_session_id(store: &dyn KvStore) -> String {
    if let Some(id) = store.get(ACTIVE_SESSION_KEY) {
        let id = id.trim();
        if !id.is_empty() {
            return id.to_string();
        }
    }
    let id = new_session_id();
    store.set(ACTIVE_SESSION_KEY, &id);
    id
}

pub fn store_session_id(store: &dyn KvStore, session_id: &str) {
    store.set(ACTIVE_SESSION_KEY, session_id);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryStore;

    #[test]
    fn test_round_trip_preserves_messages() {
        let store = MemoryStore::new();
        let messages = vec![
            Message::user("How do I make pasta?"),
            Message::assistant("Boil water, add pasta...", false, None),
        ];

        save_messages(&store, "s1", &messages);
        assert_eq!(load_messages(&store, "s1"), messages);
    }

    #[test]
    fn test_unknown_session_loads_empty() {
        let store = MemoryStore::new();
        assert!(load_messages(&store, "nope").is_empty());
    }

    #[test]
    fn test_corrupt_history_loads_empty() {
        let store = MemoryStore::new();
        store.set(&history_key("s1"), "{definitely not json");
        assert!(load_messages(&store, "s1").is_empty());
    }

    #[test]
    fn test_sessions_are_keyed_independently() {
        let store = MemoryStore::new();
        save_messages(&store, "a", &[Message::user("first")]);
        save_messages(&store, "b", &[Message::user("second")]);

        assert_eq!(load_messages(&store, "a")[0].content, "first");
        assert_eq!(load_messages(&store, "b")[0].content, "second");
    }

    #[test]
    fn test_session_id_created_once_then_stable() {
        let store = MemoryStore::new();
        let first = load_or_create_session_id(&store);
        let second = load_or_create_session_id(&store);
        assert_eq!(first, second);
        assert!(!first.is_empty());
    }

    #[test]
    fn test_store_session_id_replaces_active() {
        let store = MemoryStore::new();
        let original = load_or_create_session_id(&store);
        let fresh = new_session_id();
        store_session_id(&store, &fresh);

        assert_ne!(original, fresh);
        assert_eq!(load_or_create_session_id(&store), fresh);
    }

    #[test]
    fn test_file_store_round_trip() {
        let dir = std::env::temp_dir().join(format!("cookbot-test-{}", new_session_id()));
        let store = FileStore::open(dir.clone()).unwrap();

        assert!(store.get("missing").is_none());
        store.set("k", "v");
        assert_eq!(store.get("k").as_deref(), Some("v"));

        let _ = std::fs::remove_dir_all(dir);
    }
}
