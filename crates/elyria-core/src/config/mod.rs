//! Configuration system.
//!
//! # Usage
//! ```no_run
//! use elyria_core::config::load_config;
//!
//! let config = load_config(None);
//! println!("Model: {}", config.provider.model);
//! ```

pub mod loader;
pub mod schema;

pub use loader::{get_config_path, load_config, save_config};
pub use schema::{Config, ConversationConfig, ProviderConfig, RendererConfig};
