//! Configuration schema.
//!
//! Hierarchy: `Config` → `ConversationConfig`, `ProviderConfig`, `RendererConfig`.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.elyria/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub conversation: ConversationConfig,
    pub provider: ProviderConfig,
    pub renderer: RendererConfig,
}

// ─────────────────────────────────────────────
// Conversation
// ─────────────────────────────────────────────

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConversationConfig {
    /// Path of the history document (`~` is expanded).
    pub history_file: String,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            history_file: "~/.elyria/chat_history.json".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Provider
// ─────────────────────────────────────────────

/// Completion endpoint settings. Fixed for the lifetime of the process.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProviderConfig {
    /// API key for Bearer authentication.
    pub api_key: String,
    /// Base URL; `/chat/completions` is appended.
    pub api_base: String,
    pub model: String,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
    /// Maximum tokens to generate per response.
    pub max_tokens: u32,
    /// HTTP client timeout.
    pub timeout_secs: u64,
}

impl ProviderConfig {
    /// Whether an API key is set.
    pub fn is_configured(&self) -> bool {
        !self.api_key.is_empty()
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: "https://api.z.ai/api/paas/v4".to_string(),
            model: "glm-4.6v-flash".to_string(),
            temperature: 0.7,
            max_tokens: 1000,
            timeout_secs: 120,
        }
    }
}

// ─────────────────────────────────────────────
// Renderer
// ─────────────────────────────────────────────

/// External fractal renderer invocation.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RendererConfig {
    /// Program followed by its leading arguments; render flags are appended.
    pub command: Vec<String>,
    /// Directory the renderer runs in. Relative paths resolve against the
    /// current directory.
    pub working_dir: String,
    /// Directory images are written to (`~` is expanded). Relative paths
    /// resolve against `working_dir`.
    pub output_dir: String,
    /// Kill the renderer after this many seconds.
    pub timeout_secs: u64,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            command: ["cargo", "run", "--release", "--bin", "ftk-mandel", "--"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            working_dir: ".".to_string(),
            output_dir: "~/.elyria/fractals".to_string(),
            timeout_secs: 60,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
