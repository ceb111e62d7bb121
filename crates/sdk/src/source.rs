//! Configuration sources.
//!
//! A source hands out one [`PartialSettings`] layer per named section. The client
//! reads its base layer once, at construction time.

use std::collections::HashMap;

use indexmap::IndexMap;
use paybridge_types::PartialSettings;
use tracing::warn;

/// Section read when the caller does not name one
pub const DEFAULT_SECTION: &str = "braintree";

/// Process-wide key/value settings provider
pub trait ConfigSource {
    /// Settings stored under `section`. Unknown sections yield an empty layer.
    fn read(&self, section: &str) -> PartialSettings;
}

/// Manifest-style section map (`gateways: { braintree: {...} }`)
impl ConfigSource for IndexMap<String, PartialSettings> {
    fn read(&self, section: &str) -> PartialSettings {
        self.get(section).cloned().unwrap_or_default()
    }
}

impl ConfigSource for PartialSettings {
    fn read(&self, _section: &str) -> PartialSettings {
        self.clone()
    }
}

/// Reads `<SECTION>_MERCHANT_ID`, `<SECTION>_PUBLIC_KEY`, `<SECTION>_PRIVATE_KEY`,
/// `<SECTION>_MERCHANT_ACCOUNT_ID` and `<SECTION>_PRODUCTION`.
///
/// ```ignore
/// use paybridge_sdk::source::{ConfigSource, EnvSource};
///
/// // BRAINTREE_MERCHANT_ID=... BRAINTREE_PRODUCTION=false
/// let settings = EnvSource::new().read("braintree");
/// ```
#[derive(Debug, Clone, Default)]
pub struct EnvSource {
    /// Fixed variable set; the process environment is used when `None`
    vars: Option<HashMap<String, String>>,
}

impl EnvSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from a fixed set of variables instead of the process environment
    pub fn from_vars<I, K, V>(vars: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: Some(
                vars.into_iter()
                    .map(|(k, v)| (k.into(), v.into()))
                    .collect(),
            ),
        }
    }

    fn var(&self, key: &str) -> Option<String> {
        let value = match &self.vars {
            Some(vars) => vars.get(key).cloned(),
            None => std::env::var(key).ok(),
        };
        value.filter(|v| !v.is_empty())
    }
}

impl ConfigSource for EnvSource {
    fn read(&self, section: &str) -> PartialSettings {
        let prefix = section.to_uppercase().replace('-', "_");
        let key = |name: &str| format!("{}_{}", prefix, name);

        let production = self.var(&key("PRODUCTION")).and_then(|raw| {
            let parsed = parse_bool(&raw);
            if parsed.is_none() {
                warn!(
                    "Ignoring {}: expected true/false, got '{}'",
                    key("PRODUCTION"),
                    raw
                );
            }
            parsed
        });

        PartialSettings {
            merchant_id: self.var(&key("MERCHANT_ID")),
            public_key: self.var(&key("PUBLIC_KEY")),
            private_key: self.var(&key("PRIVATE_KEY")),
            merchant_account_id: self.var(&key("MERCHANT_ACCOUNT_ID")),
            production,
        }
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Several sources merged in order, later sources winning
#[derive(Default)]
pub struct Layered {
    sources: Vec<Box<dyn ConfigSource + Send + Sync>>,
}

impl Layered {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(mut self, source: impl ConfigSource + Send + Sync + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }
}

impl ConfigSource for Layered {
    fn read(&self, section: &str) -> PartialSettings {
        self.sources
            .iter()
            .fold(PartialSettings::default(), |merged, source| {
                merged.merged(&source.read(section))
            })
    }
}
