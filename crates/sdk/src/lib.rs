//! Paybridge SDK
//!
//! A small payment gateway client: validated configuration, a one-time
//! transport initialization, and a typed surface for the three operations a
//! storefront needs.
//!
//! # Overview
//!
//! - [`config`] - merges settings layers and validates them into credentials
//! - [`source`] - where settings layers come from (environment, manifests)
//! - [`request`] - normalizes sale payloads before dispatch
//! - [`GatewayTransport`] - the network capability, implemented by drivers
//! - [`GatewayClient`] - owns the credentials and exposes the operations
//!
//! # Quick Start
//!
//! ```ignore
//! use paybridge_sdk::{EnvSource, GatewayClient, PartialSettings, SaleFields};
//! use paybridge_driver_http::HttpTransport;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // BRAINTREE_MERCHANT_ID, BRAINTREE_PUBLIC_KEY, BRAINTREE_PRIVATE_KEY, ...
//!     let mut client = GatewayClient::connect_with_source(
//!         &EnvSource::new(),
//!         "braintree",
//!         &PartialSettings::new().with_production(false),
//!         HttpTransport::default(),
//!     )
//!     .await?;
//!
//!     let token = client.generate_client_token(None).await?;
//!     println!("client token: {}", token);
//!
//!     let sale = client
//!         .sale(
//!             SaleFields::new("10.00")
//!                 .with_payment_method_nonce("fake-valid-nonce")
//!                 .submit_for_settlement()
//!                 .into(),
//!         )
//!         .await?;
//!     println!("sale {} is {:?}", sale.id, sale.status);
//!
//!     if let Some(customer) = client.customer().find("cus_42").await.into_option() {
//!         println!("found {}", customer.id);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! # Errors
//!
//! Every operation returns a [`GatewayError`] except lookups, which report any
//! failure as [`Lookup::NotFound`] and log the underlying cause.

pub mod client;
pub mod config;
pub mod error;
pub mod request;
pub mod source;
pub mod transport;

// Re-export main types at crate root
pub use client::{ClientState, GatewayClient, LookupContext};
pub use error::{GatewayError, Result};
pub use request::{RequestDefaults, SaleFields, TransactionRequestBuilder};
pub use source::{ConfigSource, DEFAULT_SECTION, EnvSource, Layered};
pub use transport::GatewayTransport;

pub use paybridge_types::{
    ClientToken, ClientTokenOptions, ConfigError, CustomerRecord, Environment,
    GatewayCredentials, Lookup, PartialSettings, RequestFields, RequiredField,
    TransactionRequest, TransactionResult, TransactionStatus, TransportError,
};
