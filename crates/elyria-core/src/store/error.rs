use std::path::PathBuf;

/// Failure reading or writing the history document.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed conversation history in {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to serialize conversation: {0}")]
    Serialize(#[source] serde_json::Error),
}
