//! Request normalization.
//!
//! [`TransactionRequestBuilder`] turns caller-supplied fields into the payload a
//! transport dispatches, filling in the configured merchant account. It does no
//! I/O and cannot fail.

use paybridge_types::{
    ClientTokenOptions, GatewayCredentials, RequestFields, TransactionRequest, fields,
};
use serde_json::{Map, Value as JsonValue};

/// Defaults injected into outgoing requests
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestDefaults {
    pub merchant_account_id: Option<String>,
}

impl RequestDefaults {
    pub fn from_credentials(credentials: &GatewayCredentials) -> Self {
        Self {
            merchant_account_id: credentials.merchant_account_id().map(str::to_string),
        }
    }

    /// Options for a client token request. An empty customer id counts as absent.
    pub fn client_token_options(&self, customer_id: Option<&str>) -> ClientTokenOptions {
        ClientTokenOptions {
            customer_id: customer_id
                .filter(|id| !id.is_empty())
                .map(str::to_string),
            merchant_account_id: self.merchant_account_id.clone(),
        }
    }
}

pub struct TransactionRequestBuilder;

impl TransactionRequestBuilder {
    /// Copy `fields` and add `merchantAccountId` from `defaults` when the caller
    /// did not supply one. A `null` value counts as not supplied.
    pub fn build(mut input: RequestFields, defaults: &RequestDefaults) -> TransactionRequest {
        let supplied = input
            .get(fields::MERCHANT_ACCOUNT_ID)
            .is_some_and(|value| !value.is_null());

        if !supplied {
            if let Some(merchant_account_id) = &defaults.merchant_account_id {
                input.insert(
                    fields::MERCHANT_ACCOUNT_ID.to_string(),
                    JsonValue::String(merchant_account_id.clone()),
                );
            }
        }

        TransactionRequest::new(input)
    }
}

/// Fluent builder for the usual sale fields
///
/// # Example
///
/// ```ignore
/// let fields = SaleFields::new("10.00")
///     .with_payment_method_nonce("fake-valid-nonce")
///     .with_customer_id("cus_42")
///     .submit_for_settlement();
///
/// let result = client.sale(fields.into()).await?;
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SaleFields {
    fields: RequestFields,
}

impl SaleFields {
    pub fn new(amount: impl Into<String>) -> Self {
        Self::default().with_field(fields::AMOUNT, amount.into())
    }

    pub fn with_payment_method_nonce(self, nonce: impl Into<String>) -> Self {
        self.with_field(fields::PAYMENT_METHOD_NONCE, nonce.into())
    }

    /// Associate the sale with a vaulted customer
    pub fn with_customer_id(self, customer_id: impl Into<String>) -> Self {
        self.with_field(fields::CUSTOMER_ID, customer_id.into())
    }

    pub fn with_order_id(self, order_id: impl Into<String>) -> Self {
        self.with_field(fields::ORDER_ID, order_id.into())
    }

    pub fn with_merchant_account_id(self, merchant_account_id: impl Into<String>) -> Self {
        self.with_field(fields::MERCHANT_ACCOUNT_ID, merchant_account_id.into())
    }

    /// Ask the processor to settle immediately instead of only authorizing
    pub fn submit_for_settlement(mut self) -> Self {
        let options = self
            .fields
            .entry(fields::OPTIONS.to_string())
            .or_insert_with(|| JsonValue::Object(Map::new()));
        if !options.is_object() {
            *options = JsonValue::Object(Map::new());
        }
        if let JsonValue::Object(options) = options {
            options.insert(
                fields::SUBMIT_FOR_SETTLEMENT.to_string(),
                JsonValue::Bool(true),
            );
        }
        self
    }

    /// Set an arbitrary field, replacing any previous value
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn into_fields(self) -> RequestFields {
        self.fields
    }
}

impl From<SaleFields> for RequestFields {
    fn from(sale: SaleFields) -> Self {
        sale.fields
    }
}
