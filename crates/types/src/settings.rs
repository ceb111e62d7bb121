//! Gateway settings layers and the credentials resolved from them.
//!
//! A [`PartialSettings`] is one layer of configuration (a manifest section, the
//! process environment, call-site overrides). Layers are merged field by field
//! and the result is validated into [`GatewayCredentials`].
//!
//! # Example
//!
//! ```yaml
//! gateways:
//!   braintree:
//!     merchantId: your_merchant_id
//!     publicKey: your_public_key
//!     privateKey: your_private_key
//!     merchantAccountId: your_merchant_account
//!     production: false
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Processor environment the credentials belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Live processing. This is the default when no layer sets `production`.
    #[default]
    Production,
    /// Test processing against the processor's sandbox.
    Sandbox,
}

impl Environment {
    pub fn from_production_flag(production: bool) -> Self {
        if production {
            Environment::Production
        } else {
            Environment::Sandbox
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Production => write!(f, "production"),
            Environment::Sandbox => write!(f, "sandbox"),
        }
    }
}

/// One layer of gateway settings. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartialSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,

    /// Merchant account applied to sales and client tokens unless the caller
    /// names one explicitly
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_account_id: Option<String>,

    /// `true` selects production, `false` the sandbox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production: Option<bool>,
}

impl PartialSettings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_merchant_id(mut self, merchant_id: impl Into<String>) -> Self {
        self.merchant_id = Some(merchant_id.into());
        self
    }

    pub fn with_public_key(mut self, public_key: impl Into<String>) -> Self {
        self.public_key = Some(public_key.into());
        self
    }

    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }

    pub fn with_merchant_account_id(mut self, merchant_account_id: impl Into<String>) -> Self {
        self.merchant_account_id = Some(merchant_account_id.into());
        self
    }

    pub fn with_production(mut self, production: bool) -> Self {
        self.production = Some(production);
        self
    }

    /// True when no field is set at all
    pub fn is_empty(&self) -> bool {
        self.merchant_id.is_none()
            && self.public_key.is_none()
            && self.private_key.is_none()
            && self.merchant_account_id.is_none()
            && self.production.is_none()
    }

    /// Apply `other` on top of `self`.
    ///
    /// String fields are taken from `other` only when present and non-empty, so an
    /// empty value never erases one set by an earlier layer. `production` is taken
    /// whenever it is present, `false` included.
    pub fn merge_from(&mut self, other: &PartialSettings) {
        overwrite_if_set(&mut self.merchant_id, &other.merchant_id);
        overwrite_if_set(&mut self.public_key, &other.public_key);
        overwrite_if_set(&mut self.private_key, &other.private_key);
        overwrite_if_set(&mut self.merchant_account_id, &other.merchant_account_id);
        if let Some(production) = other.production {
            self.production = Some(production);
        }
    }

    /// Consuming variant of [`merge_from`](Self::merge_from)
    pub fn merged(mut self, other: &PartialSettings) -> Self {
        self.merge_from(other);
        self
    }
}

fn overwrite_if_set(target: &mut Option<String>, source: &Option<String>) {
    if let Some(value) = source.as_deref().filter(|value| !value.is_empty()) {
        *target = Some(value.to_string());
    }
}

/// Credential fields that must be present before a client is usable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequiredField {
    MerchantId,
    PublicKey,
    PrivateKey,
}

impl RequiredField {
    pub const ALL: [RequiredField; 3] = [
        RequiredField::MerchantId,
        RequiredField::PublicKey,
        RequiredField::PrivateKey,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredField::MerchantId => "merchantId",
            RequiredField::PublicKey => "publicKey",
            RequiredField::PrivateKey => "privateKey",
        }
    }
}

impl fmt::Display for RequiredField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolved settings are missing one or more required credential fields.
///
/// Every missing field is reported, always in the order merchantId, publicKey,
/// privateKey.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required gateway settings: {}", join_fields(.missing))]
pub struct ConfigError {
    pub missing: Vec<RequiredField>,
}

impl ConfigError {
    pub fn is_missing(&self, field: RequiredField) -> bool {
        self.missing.contains(&field)
    }
}

fn join_fields(fields: &[RequiredField]) -> String {
    fields
        .iter()
        .map(RequiredField::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Validated gateway credentials. Immutable once built.
#[derive(Clone, PartialEq, Eq)]
pub struct GatewayCredentials {
    merchant_id: String,
    public_key: String,
    private_key: String,
    merchant_account_id: Option<String>,
    environment: Environment,
}

impl GatewayCredentials {
    /// Validate a fully merged settings layer.
    pub fn from_settings(settings: &PartialSettings) -> Result<Self, ConfigError> {
        let required = |field: RequiredField| {
            let value = match field {
                RequiredField::MerchantId => &settings.merchant_id,
                RequiredField::PublicKey => &settings.public_key,
                RequiredField::PrivateKey => &settings.private_key,
            };
            value.as_deref().filter(|value| !value.is_empty())
        };

        let missing: Vec<RequiredField> = RequiredField::ALL
            .into_iter()
            .filter(|field| required(*field).is_none())
            .collect();

        match (
            required(RequiredField::MerchantId),
            required(RequiredField::PublicKey),
            required(RequiredField::PrivateKey),
        ) {
            (Some(merchant_id), Some(public_key), Some(private_key)) => Ok(Self {
                merchant_id: merchant_id.to_string(),
                public_key: public_key.to_string(),
                private_key: private_key.to_string(),
                merchant_account_id: settings
                    .merchant_account_id
                    .clone()
                    .filter(|id| !id.is_empty()),
                environment: settings
                    .production
                    .map(Environment::from_production_flag)
                    .unwrap_or_default(),
            }),
            _ => Err(ConfigError { missing }),
        }
    }

    pub fn merchant_id(&self) -> &str {
        &self.merchant_id
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn private_key(&self) -> &str {
        &self.private_key
    }

    pub fn merchant_account_id(&self) -> Option<&str> {
        self.merchant_account_id.as_deref()
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }
}

impl fmt::Debug for GatewayCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayCredentials")
            .field("merchant_id", &self.merchant_id)
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .field("merchant_account_id", &self.merchant_account_id)
            .field("environment", &self.environment)
            .finish()
    }
}
