//! Paybridge manifest file.
//!
//! # Example
//!
//! ```yaml
//! gateways:
//!   braintree:
//!     merchantId: your_merchant_id
//!     publicKey: your_public_key
//!     privateKey: your_private_key
//!     merchantAccountId: usd_account
//!     production: false
//!
//! transport:
//!   timeout_ms: 30000
//! ```
//!
//! Secrets are better kept out of the manifest: anything left unset here can
//! come from `BRAINTREE_*` environment variables or a `.env` file next to it.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use paybridge_sdk::PartialSettings;
use serde::{Deserialize, Serialize};
use url::Url;

pub const MANIFEST_FILE_NAME: &str = "paybridge.yaml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    /// Gateway settings sections, keyed by section name (e.g. "braintree")
    #[serde(default)]
    pub gateways: IndexMap<String, PartialSettings>,

    #[serde(default)]
    pub transport: TransportSettings,
}

/// HTTP transport settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TransportSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<Url>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

/// Why a manifest could not be used
#[derive(Debug, thiserror::Error)]
pub enum LoadManifestError {
    #[error("no {} at {}", MANIFEST_FILE_NAME, .0.display())]
    Missing(PathBuf),
    #[error("cannot read {}: {}", .path.display(), .source)]
    Unreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid manifest {}: {}", .path.display(), .source)]
    Invalid {
        path: PathBuf,
        #[source]
        source: serde_yml::Error,
    },
}

impl LoadManifestError {
    /// Only a missing manifest may be replaced by defaults
    pub fn is_missing(&self) -> bool {
        matches!(self, LoadManifestError::Missing(_))
    }
}

impl Manifest {
    pub fn load(path: &Path) -> Result<Self, LoadManifestError> {
        let content = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                LoadManifestError::Missing(path.to_path_buf())
            } else {
                LoadManifestError::Unreadable {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;

        Self::parse(&content).map_err(|source| LoadManifestError::Invalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Like [`load`](Self::load), falling back to an empty manifest when the
    /// file does not exist. A manifest that exists but cannot be read or parsed
    /// is still an error.
    pub fn load_or_default(path: &Path) -> Result<Option<Self>, LoadManifestError> {
        match Self::load(path) {
            Ok(manifest) => Ok(Some(manifest)),
            Err(e) if e.is_missing() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub fn parse(content: &str) -> Result<Self, serde_yml::Error> {
        serde_yml::from_str(content)
    }

    /// Get a gateway section by name
    pub fn get_gateway(&self, section: &str) -> Option<&PartialSettings> {
        self.gateways.get(section)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_parse_manifest() {
        let yaml = r#"
gateways:
  braintree:
    merchantId: abc123
    publicKey: pub
    production: false
  braintree_eu:
    merchantId: eu123
transport:
  api_url: http://localhost:8080
  timeout_ms: 5000
"#;

        let manifest = Manifest::parse(yaml).unwrap();
        assert_eq!(manifest.gateways.len(), 2);

        let braintree = manifest.get_gateway("braintree").unwrap();
        assert_eq!(braintree.merchant_id.as_deref(), Some("abc123"));
        assert_eq!(braintree.private_key, None);
        assert_eq!(braintree.production, Some(false));

        assert_eq!(
            manifest.transport.api_url.as_ref().map(Url::as_str),
            Some("http://localhost:8080/")
        );
        assert_eq!(manifest.transport.timeout_ms, Some(5000));
    }

    #[test]
    fn test_empty_manifest_uses_defaults() {
        let manifest = Manifest::parse("{}").unwrap();
        assert!(manifest.gateways.is_empty());
        assert!(manifest.transport.api_url.is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "gateways:\n  braintree:\n    merchantId: from_file").unwrap();

        let manifest = Manifest::load(file.path()).unwrap();
        assert_eq!(
            manifest
                .get_gateway("braintree")
                .and_then(|s| s.merchant_id.as_deref()),
            Some("from_file")
        );
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(MANIFEST_FILE_NAME);

        let err = Manifest::load(&path).unwrap_err();
        assert!(matches!(err, LoadManifestError::Missing(_)));
        assert!(Manifest::load_or_default(&path).unwrap().is_none());
    }

    #[test]
    fn test_malformed_manifest_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "gateways:\n  braintree:\n    merchantId: m1\n    production: no"
        )
        .unwrap();

        let err = Manifest::load_or_default(file.path()).unwrap_err();
        assert!(matches!(err, LoadManifestError::Invalid { .. }));
        assert!(!err.is_missing());
        assert!(err.to_string().contains("production"));
    }

    #[test]
    fn test_directory_is_unreadable() {
        let dir = tempfile::tempdir().unwrap();
        let err = Manifest::load_or_default(dir.path()).unwrap_err();
        assert!(matches!(err, LoadManifestError::Unreadable { .. }));
    }
}
