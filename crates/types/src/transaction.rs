use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::{RequestFields, fields};

/// Normalized sale payload, ready for dispatch to a transport.
///
/// Created once per call and discarded after dispatch.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionRequest {
    fields: RequestFields,
}

impl TransactionRequest {
    pub fn new(fields: RequestFields) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&JsonValue> {
        self.fields.get(key)
    }

    /// Merchant account the sale will be booked against, if any
    pub fn merchant_account_id(&self) -> Option<&str> {
        self.fields
            .get(fields::MERCHANT_ACCOUNT_ID)
            .and_then(|value| value.as_str())
    }

    pub fn fields(&self) -> &RequestFields {
        &self.fields
    }

    pub fn into_fields(self) -> RequestFields {
        self.fields
    }
}

/// Processor-side transaction status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Authorizing,
    Authorized,
    SubmittedForSettlement,
    Settling,
    Settled,
    Voided,
    AuthorizationExpired,
    ProcessorDeclined,
    GatewayRejected,
    Failed,
    #[serde(other)]
    Unknown,
}

impl TransactionStatus {
    /// False for declined, rejected and failed transactions
    pub fn is_success(&self) -> bool {
        !matches!(
            self,
            TransactionStatus::ProcessorDeclined
                | TransactionStatus::GatewayRejected
                | TransactionStatus::Failed
                | TransactionStatus::Unknown
        )
    }
}

/// Transaction as reported back by the processor after a sale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionResult {
    pub id: String,
    pub status: TransactionStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_iso_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_account_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_response_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub processor_response_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl TransactionResult {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}
