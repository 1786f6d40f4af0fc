//! Error types for session management.

/// A persisted or freshly issued token could not be decoded.
///
/// Never surfaces from [`SessionManager::session`](crate::SessionManager::session);
/// an undecodable stored token simply means "no session".
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Token does not have the `header.payload.signature` shape.
    #[error("token has {0} segments, expected 3")]
    Segments(usize),

    /// Payload segment is not valid base64url.
    #[error("token payload is not base64url: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Payload or storage slot is not the expected JSON.
    #[error("token payload is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Token storage failed.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Filesystem access failed.
    #[error("token storage I/O error at '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    /// Value could not be encoded for storage.
    #[error("token serialization error: {0}")]
    Serialization(String),
}

/// Login failed. Storage is left exactly as it was.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Server rejected the credentials (or reported another error).
    #[error("login rejected: {0}")]
    Rejected(String),

    /// Request never got a usable HTTP answer.
    #[error("network error during login: {0}")]
    Network(String),

    /// Server answered, but not with a token envelope.
    #[error("malformed login response: {0}")]
    MalformedResponse(String),

    /// Server returned a token whose claims cannot be decoded.
    #[error("server issued an undecodable token: {0}")]
    InvalidToken(#[from] DecodeError),

    /// Token could not be persisted.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl From<quill_client::Error> for AuthError {
    fn from(e: quill_client::Error) -> Self {
        use quill_client::Error;
        match e {
            Error::Api { message, .. } => AuthError::Rejected(message),
            Error::Json(e) => AuthError::MalformedResponse(e.to_string()),
            Error::Malformed(msg) => AuthError::MalformedResponse(msg),
            other => AuthError::Network(other.to_string()),
        }
    }
}

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_error_mapping() {
        let rejected: AuthError = quill_client::Error::Api {
            status: 401,
            message: "Invalid credentials".into(),
        }
        .into();
        assert!(matches!(rejected, AuthError::Rejected(ref m) if m == "Invalid credentials"));

        let malformed: AuthError = quill_client::Error::Malformed("empty".into()).into();
        assert!(matches!(malformed, AuthError::MalformedResponse(_)));

        let config: AuthError = quill_client::Error::Config("no url".into()).into();
        assert!(matches!(config, AuthError::Network(_)));
    }
}
