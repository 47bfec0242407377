//! Config loader: reads `~/.elyria/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.elyria/config.json`
//! 3. Environment variables `ELYRIA_<SECTION>__<FIELD>` (override JSON)
//!
//! `Z_AI_API_KEY` is honored as a fallback credential.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Fallback credential variable.
pub const LEGACY_API_KEY_VAR: &str = "Z_AI_API_KEY";

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// Load configuration from the default path + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Read and parse a config file without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse config {}: {}", path.display(), e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = path.map(PathBuf::from).unwrap_or_else(get_config_path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `ELYRIA_PROVIDER__API_KEY` → `provider.api_key`
/// - `ELYRIA_PROVIDER__API_BASE` → `provider.api_base`
/// - `ELYRIA_PROVIDER__MODEL` → `provider.model`
/// - `ELYRIA_PROVIDER__TEMPERATURE` → `provider.temperature`
/// - `ELYRIA_PROVIDER__MAX_TOKENS` → `provider.max_tokens`
/// - `ELYRIA_CONVERSATION__HISTORY_FILE` → `conversation.history_file`
/// - `ELYRIA_RENDERER__WORKING_DIR` → `renderer.working_dir`
/// - `ELYRIA_RENDERER__TIMEOUT_SECS` → `renderer.timeout_secs`
/// - `Z_AI_API_KEY` → `provider.api_key`, only when still empty
fn apply_env_overrides(config: Config) -> Config {
    apply_overrides(config, |name| std::env::var(name).ok())
}

fn apply_overrides(mut config: Config, var: impl Fn(&str) -> Option<String>) -> Config {
    // Provider
    if let Some(val) = var("ELYRIA_PROVIDER__API_KEY") {
        config.provider.api_key = val;
    }
    if let Some(val) = var("ELYRIA_PROVIDER__API_BASE") {
        config.provider.api_base = val;
    }
    if let Some(val) = var("ELYRIA_PROVIDER__MODEL") {
        config.provider.model = val;
    }
    if let Some(val) = var("ELYRIA_PROVIDER__TEMPERATURE") {
        match val.parse::<f64>() {
            Ok(t) => config.provider.temperature = t,
            Err(_) => warn!("Ignoring invalid ELYRIA_PROVIDER__TEMPERATURE={}", val),
        }
    }
    if let Some(val) = var("ELYRIA_PROVIDER__MAX_TOKENS") {
        match val.parse::<u32>() {
            Ok(n) => config.provider.max_tokens = n,
            Err(_) => warn!("Ignoring invalid ELYRIA_PROVIDER__MAX_TOKENS={}", val),
        }
    }
    if !config.provider.is_configured() {
        if let Some(val) = var(LEGACY_API_KEY_VAR) {
            config.provider.api_key = val;
        }
    }

    // Conversation
    if let Some(val) = var("ELYRIA_CONVERSATION__HISTORY_FILE") {
        config.conversation.history_file = val;
    }

    // Renderer
    if let Some(val) = var("ELYRIA_RENDERER__WORKING_DIR") {
        config.renderer.working_dir = val;
    }
    if let Some(val) = var("ELYRIA_RENDERER__TIMEOUT_SECS") {
        if let Ok(n) = val.parse::<u64>() {
            config.renderer.timeout_secs = n;
        }
    }

    config
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
