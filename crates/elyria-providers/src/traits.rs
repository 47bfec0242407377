//! Completion client trait.

use async_trait::async_trait;
use elyria_core::config::ProviderConfig;
use elyria_core::types::ChatMessage;

use crate::error::ProviderError;

/// Model and sampling settings sent with every request.
#[derive(Clone, Debug, PartialEq)]
pub struct CompletionParams {
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate.
    pub max_tokens: u32,
}

impl Default for CompletionParams {
    fn default() -> Self {
        Self {
            model: "glm-4.6v-flash".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
        }
    }
}

impl From<&ProviderConfig> for CompletionParams {
    fn from(config: &ProviderConfig) -> Self {
        Self {
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        }
    }
}

/// Result of a request that reached the endpoint and got an answer back.
#[derive(Clone, Debug, PartialEq)]
pub enum CompletionOutcome {
    /// 2xx with `choices[0].message.content`.
    Reply(String),
    /// Any non-2xx status, with the raw response body.
    Rejected { status: u16, body: String },
}

/// A chat completion backend.
///
/// Transport failures are returned as `Err`; a non-success status is a
/// normal [`CompletionOutcome::Rejected`]. Implementations never retry.
#[async_trait]
pub trait CompletionClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<CompletionOutcome, ProviderError>;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}
