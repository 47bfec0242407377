//! HTTP client for OpenAI-compatible `/chat/completions` endpoints.
//!
//! Defaults target Z.ai (`https://api.z.ai/api/paas/v4`), but any
//! compatible base URL works.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use elyria_core::config::ProviderConfig;
use elyria_core::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

use crate::error::ProviderError;
use crate::traits::{CompletionClient, CompletionOutcome, CompletionParams};

// ─────────────────────────────────────────────
// HttpCompletionClient
// ─────────────────────────────────────────────

/// Completion client that POSTs to `{api_base}/chat/completions`.
pub struct HttpCompletionClient {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.z.ai/api/paas/v4"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
}

impl std::fmt::Debug for HttpCompletionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCompletionClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl HttpCompletionClient {
    /// Build a client from explicit provider settings.
    ///
    /// The key is taken from `config` as given; the environment is never consulted.
    pub fn new(config: &ProviderConfig) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(ProviderError::ClientBuild)?;

        Ok(HttpCompletionClient {
            client,
            api_base: config.api_base.clone(),
            api_key: config.api_key.clone(),
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl CompletionClient for HttpCompletionClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        params: &CompletionParams,
    ) -> Result<CompletionOutcome, ProviderError> {
        debug!(
            model = %params.model,
            messages = messages.len(),
            "Calling completion endpoint"
        );

        let request_body = ChatCompletionRequest {
            model: params.model.clone(),
            messages: messages.to_vec(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            error!(status = %status, body = %body, "API error");
            return Ok(CompletionOutcome::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedResponse(e.to_string()))?;

        match parsed.into_content() {
            Some(content) => {
                debug!(chars = content.len(), "Completion received");
                Ok(CompletionOutcome::Reply(content))
            }
            None => Err(ProviderError::MalformedResponse(
                "missing choices[0].message.content".to_string(),
            )),
        }
    }

    fn display_name(&self) -> &str {
        "http"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use elyria_core::types::Role;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: &str) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            api_base: api_base.to_string(),
            ..ProviderConfig::default()
        }
    }

    fn user(text: &str) -> ChatMessage {
        ChatMessage {
            role: Role::User,
            content: text.to_string(),
        }
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let client = HttpCompletionClient::new(&make_config("key", "https://api.z.ai/api/paas/v4/")).unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.z.ai/api/paas/v4/chat/completions"
        );
    }

    #[test]
    fn test_completions_url_default_base() {
        let client = HttpCompletionClient::new(&ProviderConfig::default()).unwrap();
        assert_eq!(
            client.completions_url(),
            "https://api.z.ai/api/paas/v4/chat/completions"
        );
    }

    #[test]
    fn test_debug_hides_key() {
        let client = HttpCompletionClient::new(&make_config("sk-secret", "http://x")).unwrap();
        assert!(!format!("{:?}", client).contains("sk-secret"));
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_complete_success() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "index": 0,
                    "message": { "role": "assistant", "content": "Hello! I'm Nya Elyria." },
                    "finish_reason": "stop"
                }]
            })))
            .mount(&mock_server)
            .await;

        let client = HttpCompletionClient::new(&make_config("test-key-123", &mock_server.uri())).unwrap();
        let outcome = client
            .complete(&[user("Hello")], &CompletionParams::default())
            .await
            .unwrap();

        assert_eq!(outcome, CompletionOutcome::Reply("Hello! I'm Nya Elyria.".into()));
    }

    #[tokio::test]
    async fn test_complete_sends_correct_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "glm-4.6v-flash",
                "temperature": 0.7,
                "max_tokens": 1000,
                "messages": [{ "role": "user", "content": "test" }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{ "message": { "content": "ok" } }]
            })))
            .mount(&mock_server)
            .await;

        let client = HttpCompletionClient::new(&make_config("key", &mock_server.uri())).unwrap();
        let outcome = client
            .complete(&[user("test")], &CompletionParams::default())
            .await
            .unwrap();

        // If the body matcher fails, wiremock returns 404 → Rejected
        assert_eq!(outcome, CompletionOutcome::Reply("ok".into()));
    }

    #[tokio::test]
    async fn test_complete_rejected_keeps_status_and_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(500).set_body_string("server overloaded"))
            .mount(&mock_server)
            .await;

        let client = HttpCompletionClient::new(&make_config("key", &mock_server.uri())).unwrap();
        let outcome = client
            .complete(&[user("Hello")], &CompletionParams::default())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            CompletionOutcome::Rejected {
                status: 500,
                body: "server overloaded".into()
            }
        );
    }

    #[tokio::test]
    async fn test_complete_missing_content_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": []
            })))
            .mount(&mock_server)
            .await;

        let client = HttpCompletionClient::new(&make_config("key", &mock_server.uri())).unwrap();
        let err = client
            .complete(&[user("Hello")], &CompletionParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_non_json_success_is_malformed() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>proxy</html>"))
            .mount(&mock_server)
            .await;

        let client = HttpCompletionClient::new(&make_config("key", &mock_server.uri())).unwrap();
        let err = client
            .complete(&[user("Hello")], &CompletionParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_complete_network_error_propagates() {
        // Point to a port that's not listening
        let client = HttpCompletionClient::new(&make_config("key", "http://127.0.0.1:1")).unwrap();
        let err = client
            .complete(&[user("Hello")], &CompletionParams::default())
            .await
            .unwrap_err();

        assert!(matches!(err, ProviderError::Transport(_)));
    }
}
