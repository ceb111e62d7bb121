use std::future::Future;

use paybridge_types::{
    ClientToken, ClientTokenOptions, CustomerRecord, GatewayCredentials, TransactionRequest,
    TransactionResult, TransportError,
};

/// Network capability used by [`GatewayClient`](crate::GatewayClient).
///
/// Implementations own everything about the wire: endpoints, authentication,
/// encoding and timeouts. Each call is a single outbound request.
pub trait GatewayTransport {
    /// Prepare the transport for the given merchant and environment.
    /// Called once, before any other method.
    fn initialize(
        &mut self,
        credentials: &GatewayCredentials,
    ) -> impl Future<Output = Result<(), TransportError>> + Send;

    fn create_transaction(
        &self,
        request: &TransactionRequest,
    ) -> impl Future<Output = Result<TransactionResult, TransportError>> + Send;

    fn create_client_token(
        &self,
        options: &ClientTokenOptions,
    ) -> impl Future<Output = Result<ClientToken, TransportError>> + Send;

    /// Fails with [`TransportError::NotFound`] when no such customer exists
    fn find_customer(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<CustomerRecord, TransportError>> + Send;
}
