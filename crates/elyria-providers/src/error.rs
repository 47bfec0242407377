/// Failures that abort a completion call instead of becoming conversation content.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("malformed completion response: {0}")]
    MalformedResponse(String),
}
