use thiserror::Error;

/// Failure reported by a gateway transport
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The processor rejected the credentials (401/403)
    #[error("Authentication error: {0}")]
    Unauthorized(String),

    /// The requested record does not exist (404)
    #[error("Not found")]
    NotFound,

    /// The processor answered with an error response
    #[error("Gateway error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// The request did not complete within the configured timeout
    #[error("Timeout")]
    Timeout,

    /// Connection or protocol failure
    #[error("HTTP error: {0}")]
    Http(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// A call was made before `initialize`
    #[error("Transport not initialized")]
    NotInitialized,

    /// The endpoint URL could not be built
    #[error("Invalid endpoint: {0}")]
    InvalidEndpoint(String),
}

impl TransportError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TransportError::NotFound)
    }
}
