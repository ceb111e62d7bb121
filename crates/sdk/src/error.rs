use paybridge_types::{ConfigError, TransportError};
use thiserror::Error;

use crate::client::ClientState;

/// Errors that can occur in the gateway client
#[derive(Error, Debug)]
pub enum GatewayError {
    /// Required credential fields are missing
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The transport rejected the credentials or environment setup failed
    #[error("Initialization error: {0}")]
    Initialization(#[source] TransportError),

    /// The client never reached the ready state
    #[error("Gateway client is not ready (state: {0})")]
    NotReady(ClientState),

    /// Malformed or empty call-site input
    #[error("Validation error: {0}")]
    Validation(String),

    /// A sale was rejected by the processor or could not be delivered
    #[error("Transaction error: {0}")]
    Transaction(#[source] TransportError),

    /// Any other processor call failed
    #[error("Transport error: {0}")]
    Transport(#[source] TransportError),
}

impl GatewayError {
    /// Underlying processor failure, when there is one
    pub fn transport_error(&self) -> Option<&TransportError> {
        match self {
            GatewayError::Initialization(err)
            | GatewayError::Transaction(err)
            | GatewayError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

/// Result type alias for gateway operations
pub type Result<T> = std::result::Result<T, GatewayError>;
