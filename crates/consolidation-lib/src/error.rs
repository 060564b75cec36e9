//! Error types for consolidation data collection

/// Library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while collecting consolidation data
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A required list call against the API server failed
    #[error("failed to list {resource}: {source}")]
    Fetch {
        resource: &'static str,
        #[source]
        source: kube::Error,
    },

    /// The caller supplied arguments that cannot produce a result
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// A per-node worker panicked or was cancelled
    #[error("node worker failed: {0}")]
    Worker(#[from] tokio::task::JoinError),

    /// A collector was built without a resource source
    #[error("a resource source is required")]
    MissingSource,
}

impl Error {
    pub fn fetch(resource: &'static str, source: kube::Error) -> Self {
        Error::Fetch { resource, source }
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Error::InvalidInput {
            message: message.into(),
        }
    }

    /// Returns true for errors raised before any API call was made
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::InvalidInput { .. } | Error::MissingSource)
    }
}
