//! Conversation exchange: one user turn, one completion call, one assistant turn.
//!
//! Rejected requests are not raised: the diagnostic is stored as an
//! assistant turn (flagged `error`) and handed back as the reply, so the
//! person in the conversation sees the failure in the transcript.

use std::sync::Arc;

use tracing::{info, warn};

use elyria_core::store::{ConversationStore, ConversationSummary, StorageError};
use elyria_core::types::{ChatMessage, Role};
use elyria_providers::{CompletionClient, CompletionOutcome, CompletionParams, ProviderError};

/// How the assistant turn of an exchange came about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The endpoint answered with a completion.
    Delivered,
    /// The endpoint answered with a non-success status.
    Rejected { status: u16 },
}

/// Text returned by [`Conversation::exchange`], already appended to the log.
#[derive(Clone, Debug, PartialEq)]
pub struct Reply {
    pub text: String,
    pub outcome: DeliveryOutcome,
}

impl Reply {
    pub fn is_error(&self) -> bool {
        matches!(self.outcome, DeliveryOutcome::Rejected { .. })
    }
}

/// Failures that abort an exchange.
#[derive(Debug, thiserror::Error)]
pub enum ExchangeError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

/// A conversation store bound to a completion client.
pub struct Conversation {
    store: ConversationStore,
    client: Arc<dyn CompletionClient>,
    params: CompletionParams,
}

impl Conversation {
    pub fn new(
        store: ConversationStore,
        client: Arc<dyn CompletionClient>,
        params: CompletionParams,
    ) -> Self {
        Conversation {
            store,
            client,
            params,
        }
    }

    /// Send `user_text` and record the answer.
    ///
    /// The user turn is persisted before the request goes out, so it
    /// survives a transport failure.
    pub async fn exchange(&mut self, user_text: &str) -> Result<Reply, ExchangeError> {
        self.store.append(Role::User, user_text)?;

        let window: Vec<ChatMessage> = self.store.window().iter().map(|m| m.to_chat()).collect();
        info!(
            provider = self.client.display_name(),
            window = window.len(),
            total = self.store.len(),
            "Sending exchange"
        );

        let reply = match self.client.complete(&window, &self.params).await? {
            CompletionOutcome::Reply(text) => {
                self.store.append(Role::Assistant, text.as_str())?;
                Reply {
                    text,
                    outcome: DeliveryOutcome::Delivered,
                }
            }
            CompletionOutcome::Rejected { status, body } => {
                let text = format!("API Error: {} - {}", status, body);
                warn!(status, "Completion rejected; recording diagnostic");
                self.store.append_error(text.as_str())?;
                Reply {
                    text,
                    outcome: DeliveryOutcome::Rejected { status },
                }
            }
        };

        Ok(reply)
    }

    pub fn summary(&self) -> ConversationSummary {
        self.store.summary()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
