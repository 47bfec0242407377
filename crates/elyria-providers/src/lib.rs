//! Completion provider layer for Elyria.
//!
//! - [`traits::CompletionClient`]: the seam the exchange talks to
//! - [`http_provider::HttpCompletionClient`]: OpenAI-compatible HTTP client

pub mod error;
pub mod http_provider;
pub mod traits;

pub use error::ProviderError;
pub use http_provider::HttpCompletionClient;
pub use traits::{CompletionClient, CompletionOutcome, CompletionParams};
