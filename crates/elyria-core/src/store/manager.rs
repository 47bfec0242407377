//! Conversation persistence.
//!
//! File format: a single pretty-printed JSON document, rewritten in full on
//! every append:
//!
//! ```json
//! {
//!   "messages": [
//!     { "role": "user", "content": "hello", "timestamp": "2026-10-14T09:30:12.123456" }
//!   ]
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::debug;

use super::error::StorageError;
use crate::types::{ConversationLog, Message, Role};

/// Number of most recent messages sent with each completion request.
pub const CONTEXT_WINDOW: usize = 20;

// ─────────────────────────────────────────────
// ConversationStore
// ─────────────────────────────────────────────

/// Ordered, append-only message log backed by one JSON file.
///
/// Not safe against concurrent writers of the same file from other processes.
#[derive(Debug)]
pub struct ConversationStore {
    /// Location of the history document.
    path: PathBuf,
    /// In-memory copy of the log, in append order.
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Open the store at `path`.
    ///
    /// A missing file yields an empty log (nothing is written until the
    /// first append). A file that exists but is not a valid history
    /// document is an error; it is never repaired or overwritten here.
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let messages = read_log(&path)?;
        debug!(
            path = %path.display(),
            messages = messages.len(),
            "Loaded conversation"
        );
        Ok(ConversationStore { path, messages })
    }

    /// Replace the in-memory log with what is on disk.
    pub fn reload(&mut self) -> Result<(), StorageError> {
        self.messages = read_log(&self.path)?;
        Ok(())
    }

    /// Append a message stamped now, then persist the whole log.
    pub fn append(&mut self, role: Role, content: impl Into<String>) -> Result<&Message, StorageError> {
        self.push(Message::new(role, content))
    }

    /// Append an assistant message flagged as a delivery failure.
    pub fn append_error(&mut self, content: impl Into<String>) -> Result<&Message, StorageError> {
        self.push(Message::assistant_error(content))
    }

    fn push(&mut self, message: Message) -> Result<&Message, StorageError> {
        self.messages.push(message);
        self.save()?;
        Ok(&self.messages[self.messages.len() - 1])
    }

    /// The most recent [`CONTEXT_WINDOW`] messages, oldest first.
    pub fn window(&self) -> &[Message] {
        let start = self.messages.len().saturating_sub(CONTEXT_WINDOW);
        &self.messages[start..]
    }

    /// Message count, last timestamp, and file location.
    pub fn summary(&self) -> ConversationSummary {
        ConversationSummary {
            total_messages: self.messages.len(),
            last_timestamp: self.messages.last().map(|m| m.timestamp.clone()),
            chat_history_file: self.path.clone(),
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the full log to disk (overwrite).
    fn save(&self) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StorageError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let doc = LogRef {
            messages: &self.messages,
        };
        let json = serde_json::to_string_pretty(&doc).map_err(StorageError::Serialize)?;
        std::fs::write(&self.path, json).map_err(|source| StorageError::Io {
            path: self.path.clone(),
            source,
        })?;

        debug!(
            path = %self.path.display(),
            messages = self.messages.len(),
            "Saved conversation"
        );
        Ok(())
    }
}

/// Borrowed view of [`ConversationLog`] so saving doesn't clone the log.
#[derive(Serialize)]
struct LogRef<'a> {
    messages: &'a [Message],
}

fn read_log(path: &Path) -> Result<Vec<Message>, StorageError> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let log: ConversationLog =
        serde_json::from_str(&content).map_err(|source| StorageError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(log.messages)
}

/// Snapshot of the conversation for display.
#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct ConversationSummary {
    pub total_messages: usize,
    pub last_timestamp: Option<String>,
    pub chat_history_file: PathBuf,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn make_store() -> (ConversationStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let store = ConversationStore::load(dir.path().join("chat_history.json")).unwrap();
        (store, dir)
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let (store, dir) = make_store();
        assert!(store.is_empty());
        // Nothing written until the first append
        assert!(!dir.path().join("chat_history.json").exists());
    }

    #[test]
    fn test_append_persists_immediately() {
        let (mut store, _dir) = make_store();
        store.append(Role::User, "hello").unwrap();

        let reloaded = ConversationStore::load(store.path()).unwrap();
        assert_eq!(reloaded.len(), 1);
        assert_eq!(reloaded.messages()[0].content, "hello");
        assert_eq!(reloaded.messages()[0].role, Role::User);
    }

    #[test]
    fn test_round_trip_field_for_field() {
        let (mut store, _dir) = make_store();
        store.append(Role::User, "one").unwrap();
        store.append(Role::Assistant, "two").unwrap();
        store.append_error("API Error: 503 - busy").unwrap();

        let reloaded = ConversationStore::load(store.path()).unwrap();
        assert_eq!(reloaded.messages(), store.messages());
    }

    #[test]
    fn test_load_is_idempotent() {
        let (mut store, _dir) = make_store();
        store.append(Role::User, "a").unwrap();
        store.append(Role::Assistant, "b").unwrap();

        let first = ConversationStore::load(store.path()).unwrap();
        let second = ConversationStore::load(store.path()).unwrap();
        assert_eq!(first.messages(), second.messages());
    }

    #[test]
    fn test_reload_replaces_in_memory_log() {
        let (mut store, _dir) = make_store();
        store.append(Role::User, "mine").unwrap();

        let mut other = ConversationStore::load(store.path()).unwrap();
        other.append(Role::Assistant, "theirs").unwrap();

        store.reload().unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.last().unwrap().content, "theirs");
    }

    #[test]
    fn test_malformed_file_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(&path, "not json {{{").unwrap();

        let err = ConversationStore::load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
        // Left untouched
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "not json {{{");
    }

    #[test]
    fn test_unreadable_path_is_io_error() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("not_a_dir");
        std::fs::write(&blocker, "plain file").unwrap();

        // A parent that is a regular file fails with something other than NotFound
        let err = ConversationStore::load(blocker.join("chat_history.json")).unwrap_err();
        assert!(matches!(err, StorageError::Io { .. }));
    }

    #[test]
    fn test_wrong_shape_is_storage_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(&path, r#"{"messages": [{"role": "user"}]}"#).unwrap();

        let err = ConversationStore::load(&path).unwrap_err();
        assert!(matches!(err, StorageError::Malformed { .. }));
    }

    #[test]
    fn test_document_without_messages_loads_empty() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(&path, "{}").unwrap();

        let store = ConversationStore::load(&path).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_window_shorter_than_cap() {
        let (mut store, _dir) = make_store();
        for i in 0..5 {
            store.append(Role::User, format!("msg {}", i)).unwrap();
        }
        let window = store.window();
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].content, "msg 0");
    }

    #[test]
    fn test_window_keeps_most_recent_in_order() {
        let (mut store, _dir) = make_store();
        for i in 0..27 {
            store.append(Role::User, format!("msg {}", i)).unwrap();
        }
        let window = store.window();
        assert_eq!(window.len(), CONTEXT_WINDOW);
        assert_eq!(window[0].content, "msg 7");
        assert_eq!(window[19].content, "msg 26");
        // Log itself is untouched
        assert_eq!(store.len(), 27);
    }

    #[test]
    fn test_summary() {
        let (mut store, _dir) = make_store();
        let empty = store.summary();
        assert_eq!(empty.total_messages, 0);
        assert!(empty.last_timestamp.is_none());
        assert_eq!(empty.chat_history_file, store.path());

        store.append(Role::User, "hello").unwrap();
        let ts = store.last().unwrap().timestamp.clone();
        let summary = store.summary();
        assert_eq!(summary.total_messages, 1);
        assert_eq!(summary.last_timestamp, Some(ts));
    }

    #[test]
    fn test_file_format() {
        let (mut store, _dir) = make_store();
        store.append(Role::User, "test message").unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        // Pretty-printed, two-space indent
        assert!(content.contains("\n  \"messages\""));

        let raw: serde_json::Value = serde_json::from_str(&content).unwrap();
        let messages = raw["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0]["role"], "user");
        assert_eq!(messages[0]["content"], "test message");
    }

    #[test]
    fn test_save_creates_parent_dir() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("chat_history.json");
        let mut store = ConversationStore::load(&path).unwrap();
        store.append(Role::User, "hi").unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_loads_history_without_error_flags() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chat_history.json");
        std::fs::write(
            &path,
            r#"{
  "messages": [
    {"role": "user", "content": "Hi Nya Elyria!", "timestamp": "2025-01-05T14:03:20.001122"},
    {"role": "assistant", "content": "Hello!", "timestamp": "2025-01-05T14:03:22.518224"}
  ]
}"#,
        )
        .unwrap();

        let mut store = ConversationStore::load(&path).unwrap();
        assert_eq!(store.len(), 2);
        store.append(Role::User, "again").unwrap();

        let reloaded = ConversationStore::load(&path).unwrap();
        assert_eq!(reloaded.messages()[1].timestamp, "2025-01-05T14:03:22.518224");
        assert_eq!(reloaded.len(), 3);
    }
}
