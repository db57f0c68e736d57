use crate::model::SourceIndex;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{source_index} returned status {status}")]
    Status { source_index: SourceIndex, status: u16 },
    #[error("Failed to decode {source_index} response: {message}")]
    Decode {
        source_index: SourceIndex,
        message: String,
    },
    #[error("{source_index} did not answer within {timeout_secs}s")]
    Timeout {
        source_index: SourceIndex,
        timeout_secs: u64,
    },
}

/// One package index the resolver can query.
///
/// Implementations differ in trust priority ([`IndexClient::source`]) and in
/// whether they publish dependency metadata.
#[async_trait]
pub trait IndexClient: Send + Sync {
    /// Which index this client talks to; also its priority.
    fn source(&self) -> SourceIndex;

    /// Whether [`IndexClient::fetch_dependencies`] returns real data.
    fn supports_dependency_metadata(&self) -> bool {
        false
    }

    /// Wheel filenames published for `name` (already normalized).
    ///
    /// `Ok(None)` means the index has nothing for this package.
    async fn fetch_listing(&self, name: &str) -> Result<Option<Vec<String>>, IndexError>;

    /// Raw requirement strings declared by the latest release of `name`.
    async fn fetch_dependencies(&self, _name: &str) -> Result<Vec<String>, IndexError> {
        Ok(Vec::new())
    }
}
