//! Shared data model for the paybridge gateway client.
//!
//! Everything here is plain data: settings layers and the credentials resolved
//! from them, the request/response shapes exchanged with the processor, and the
//! error reported by transports.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

pub mod customer;
pub mod error;
pub mod settings;
pub mod token;
pub mod transaction;

pub use customer::CustomerRecord;
pub use error::TransportError;
pub use settings::{ConfigError, Environment, GatewayCredentials, PartialSettings, RequiredField};
pub use token::{ClientToken, ClientTokenOptions};
pub use transaction::{TransactionRequest, TransactionResult, TransactionStatus};

/// Caller-supplied request fields, keyed by processor field name (`amount`,
/// `paymentMethodNonce`, ...). Insertion order is kept on the wire.
pub type RequestFields = IndexMap<String, JsonValue>;

/// Well-known request field names
pub mod fields {
    pub const AMOUNT: &str = "amount";
    pub const PAYMENT_METHOD_NONCE: &str = "paymentMethodNonce";
    pub const CUSTOMER_ID: &str = "customerId";
    pub const ORDER_ID: &str = "orderId";
    pub const MERCHANT_ACCOUNT_ID: &str = "merchantAccountId";
    pub const OPTIONS: &str = "options";
    pub const SUBMIT_FOR_SETTLEMENT: &str = "submitForSettlement";
}

/// Outcome of a lookup against the processor.
///
/// Lookups never fail from the caller's point of view: a missing record and a
/// broken transport both come back as [`Lookup::NotFound`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Lookup::Found(_))
    }

    pub fn found(&self) -> Option<&T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            Lookup::NotFound => None,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Lookup::Found(value),
            None => Lookup::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_accessors() {
        let found = Lookup::Found(7);
        assert!(found.is_found());
        assert_eq!(found.found(), Some(&7));
        assert_eq!(found.into_option(), Some(7));

        let missing: Lookup<i32> = Lookup::NotFound;
        assert!(!missing.is_found());
        assert_eq!(missing.found(), None);
    }

    #[test]
    fn test_lookup_from_option() {
        assert_eq!(Lookup::from(Some("a")), Lookup::Found("a"));
        assert_eq!(Lookup::<&str>::from(None), Lookup::NotFound);
    }
}
