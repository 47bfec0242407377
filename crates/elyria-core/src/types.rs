//! Core types for Elyria: conversation messages and the chat completions wire format.
//!
//! A [`Message`] is what we persist: role, text, and the time it was appended.
//! A [`ChatMessage`] is what we send: the same turn reduced to `role` + `content`.

use serde::{Deserialize, Serialize};

use crate::utils;

// ─────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────

/// Who authored a turn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────
// Message (persisted)
// ─────────────────────────────────────────────

/// A single turn in the persisted conversation.
///
/// Serialized as `{"role": ..., "content": ..., "timestamp": ...}`. The
/// `error` flag is only written when set, so genuine turns keep the
/// three-field shape.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// Local wall-clock time at append, ISO-8601 (`2026-10-14T09:30:12.123456`).
    pub timestamp: String,
    /// Set on assistant turns that carry a diagnostic from a rejected request.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub error: bool,
}

impl Message {
    /// Create a message stamped with the current local time.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
            timestamp: utils::local_timestamp(),
            error: false,
        }
    }

    /// Create an assistant message flagged as a delivery failure.
    pub fn assistant_error(content: impl Into<String>) -> Self {
        Message {
            error: true,
            ..Self::new(Role::Assistant, content)
        }
    }

    /// Project onto the wire format.
    pub fn to_chat(&self) -> ChatMessage {
        ChatMessage {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Persisted document: `{"messages": [...]}`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
pub struct ConversationLog {
    #[serde(default)]
    pub messages: Vec<Message>,
}

// ─────────────────────────────────────────────
// Chat completions wire types
// ─────────────────────────────────────────────

/// A chat message as sent to an OpenAI-compatible endpoint.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

/// Request body for `/chat/completions`.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

/// Raw chat completion response. Only the fields we read are modeled.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
}

impl ChatCompletionResponse {
    /// `choices[0].message.content`, if present.
    pub fn into_content(self) -> Option<String> {
        self.choices.into_iter().next().and_then(|c| c.message.content)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_message_serializes_three_fields() {
        let msg = Message::new(Role::User, "hello");
        let value = serde_json::to_value(&msg).unwrap();
        let obj = value.as_object().unwrap();

        assert_eq!(obj.len(), 3);
        assert_eq!(value["role"], "user");
        assert_eq!(value["content"], "hello");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_error_flag_serialized_only_when_set() {
        let msg = Message::assistant_error("API Error: 500 - boom");
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["role"], "assistant");
        assert_eq!(value["error"], true);

        let ok = serde_json::to_value(Message::new(Role::Assistant, "fine")).unwrap();
        assert!(ok.get("error").is_none());
    }

    #[test]
    fn test_message_without_error_field() {
        let raw = json!({
            "role": "assistant",
            "content": "Hello!",
            "timestamp": "2025-01-05T14:03:22.518224"
        });
        let msg: Message = serde_json::from_value(raw).unwrap();
        assert_eq!(msg.role, Role::Assistant);
        assert_eq!(msg.timestamp, "2025-01-05T14:03:22.518224");
        assert!(!msg.error);
    }

    #[test]
    fn test_unknown_role_rejected() {
        let raw = json!({"role": "system", "content": "x", "timestamp": "t"});
        assert!(serde_json::from_value::<Message>(raw).is_err());
    }

    #[test]
    fn test_log_missing_messages_is_empty() {
        let log: ConversationLog = serde_json::from_str("{}").unwrap();
        assert!(log.messages.is_empty());
    }

    #[test]
    fn test_to_chat_drops_local_fields() {
        let chat = Message::assistant_error("oops").to_chat();
        let value = serde_json::to_value(&chat).unwrap();
        assert_eq!(value, json!({"role": "assistant", "content": "oops"}));
    }

    #[test]
    fn test_request_body_shape() {
        let req = ChatCompletionRequest {
            model: "glm-4.6v-flash".into(),
            messages: vec![Message::new(Role::User, "hi").to_chat()],
            temperature: 0.7,
            max_tokens: 1000,
        };
        let value = serde_json::to_value(&req).unwrap();
        assert_eq!(value["model"], "glm-4.6v-flash");
        assert_eq!(value["temperature"], 0.7);
        assert_eq!(value["max_tokens"], 1000);
        assert_eq!(value["messages"][0]["role"], "user");
    }

    #[test]
    fn test_response_content_extraction() {
        let resp: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "choices": [{"index": 0, "message": {"role": "assistant", "content": "Hi!"}}]
        }))
        .unwrap();
        assert_eq!(resp.into_content().as_deref(), Some("Hi!"));

        let empty: ChatCompletionResponse =
            serde_json::from_value(json!({"choices": []})).unwrap();
        assert!(empty.into_content().is_none());
    }
}
