//! Elyria core: message types, the conversation store, configuration, and helpers.

pub mod config;
pub mod store;
pub mod types;
pub mod utils;
