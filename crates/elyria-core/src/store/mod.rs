//! Conversation store: the persisted message log.

pub mod error;
pub mod manager;

pub use error::StorageError;
pub use manager::{ConversationStore, ConversationSummary, CONTEXT_WINDOW};
