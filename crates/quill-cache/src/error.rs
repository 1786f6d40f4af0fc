//! Error types for resource fetches.

/// Why a resource could not be loaded.
///
/// Cloneable: a failed entry keeps its error and hands a copy to every
/// current and future waiter until the key is invalidated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    /// Server answered with an error payload.
    #[error("{message}")]
    Server {
        /// HTTP status, when one was observed.
        status: Option<u16>,
        /// Message from the `error` field.
        message: String,
    },

    /// Request never got a usable answer (connect, timeout, ...).
    #[error("transport error: {0}")]
    Transport(String),

    /// Server answered with something that is not a resource or an error.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// No async runtime was available to run the fetch.
    #[error("no runtime to run fetch: {0}")]
    Runtime(String),

    /// The fetcher panicked or its task was dropped before completing.
    #[error("fetch aborted: {0}")]
    Aborted(String),
}

impl FetchError {
    /// Shorthand for a server-reported error without a status.
    pub fn server(message: impl Into<String>) -> Self {
        FetchError::Server {
            status: None,
            message: message.into(),
        }
    }

    /// Whether the server reported that the resource does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, FetchError::Server { status: Some(404), .. })
    }

    /// Whether retrying could plausibly succeed.
    ///
    /// Purely advisory; the cache never retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Transport(_) | FetchError::Aborted(_) | FetchError::Runtime(_) => true,
            FetchError::Server { status, .. } => status.is_some_and(|s| s >= 500),
            FetchError::Malformed(_) => false,
        }
    }
}

/// Result type for fetches.
pub type Result<T> = std::result::Result<T, FetchError>;
