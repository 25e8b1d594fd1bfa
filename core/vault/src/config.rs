//! Vault configuration file.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use chainvault_common::{Error, RetryConfig, Result};
use chainvault_crypto::KdfParams;

/// Config format version for migration support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigVersion {
    pub major: u32,
    pub minor: u32,
}

impl ConfigVersion {
    /// Current config format version.
    pub const CURRENT: Self = Self { major: 1, minor: 0 };

    /// Check if this version is compatible with the current version.
    pub fn is_compatible(&self) -> bool {
        self.major == Self::CURRENT.major
    }
}

impl Default for ConfigVersion {
    fn default() -> Self {
        Self::CURRENT
    }
}

/// A provider name plus its provider-specific JSON configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Registered provider name (e.g., "local", "pinata").
    pub provider: String,
    /// Provider-specific configuration.
    #[serde(default)]
    pub config: serde_json::Value,
}

impl ProviderConfig {
    pub fn new(provider: impl Into<String>, config: serde_json::Value) -> Self {
        Self {
            provider: provider.into(),
            config,
        }
    }
}

/// How the per-identity key is derived.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum KeyMode {
    /// Key from the identity alone.
    #[default]
    Identity,
    /// Key from the identity mixed with a passphrase via Argon2id.
    Passphrase {
        #[serde(default)]
        kdf: KdfParams,
    },
}

/// Everything needed to assemble a [`crate::VaultService`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Config format version.
    #[serde(default)]
    pub version: ConfigVersion,
    /// Content store provider.
    pub content_store: ProviderConfig,
    /// Ledger provider.
    pub ledger: ProviderConfig,
    /// Retry policy for idempotent collaborator calls.
    #[serde(default)]
    pub retry: RetryConfig,
    /// Key derivation mode.
    #[serde(default)]
    pub key_mode: KeyMode,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Directory under the data dir holding local store objects.
pub const OBJECTS_DIRNAME: &str = "objects";

/// Ledger document name under the data dir.
pub const LEDGER_FILENAME: &str = "ledger.json";

impl VaultConfig {
    /// Create a configuration for the given providers.
    pub fn new(content_store: ProviderConfig, ledger: ProviderConfig) -> Self {
        Self {
            version: ConfigVersion::CURRENT,
            content_store,
            ledger,
            retry: RetryConfig::default(),
            key_mode: KeyMode::Identity,
            created_at: Utc::now(),
        }
    }

    /// Configuration keeping both store and ledger under `dir`.
    pub fn local(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self::new(
            ProviderConfig::new(
                "local",
                serde_json::json!({ "root": dir.join(OBJECTS_DIRNAME) }),
            ),
            ProviderConfig::new(
                "local",
                serde_json::json!({ "path": dir.join(LEDGER_FILENAME) }),
            ),
        )
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_key_mode(mut self, key_mode: KeyMode) -> Self {
        self.key_mode = key_mode;
        self
    }

    /// Serialize configuration to JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize configuration from JSON.
    ///
    /// # Errors
    /// - Malformed JSON
    /// - Incompatible config version
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| Error::Serialization(e.to_string()))?;
        if !config.version.is_compatible() {
            return Err(Error::InvalidInput(format!(
                "Incompatible config version: {}.{}",
                config.version.major, config.version.minor
            )));
        }
        Ok(config)
    }

    /// Read configuration from a file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !tokio::fs::try_exists(path).await? {
            return Err(Error::NotFound(format!(
                "Config not found: {}",
                path.display()
            )));
        }
        let json = tokio::fs::read_to_string(path).await?;
        Self::from_json(&json)
    }

    /// Write configuration to a file.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        tokio::fs::write(path, self.to_json()?).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_version_compatibility() {
        assert!(ConfigVersion::CURRENT.is_compatible());
        assert!(!ConfigVersion { major: 2, minor: 0 }.is_compatible());
    }

    #[test]
    fn test_local_layout() {
        let config = VaultConfig::local("/data/vault");
        assert_eq!(config.content_store.provider, "local");
        assert_eq!(config.content_store.config["root"], "/data/vault/objects");
        assert_eq!(config.ledger.config["path"], "/data/vault/ledger.json");
        assert_eq!(config.key_mode, KeyMode::Identity);
    }

    #[test]
    fn test_json_roundtrip() {
        let config = VaultConfig::local("/tmp/v").with_key_mode(KeyMode::Passphrase {
            kdf: KdfParams::moderate(),
        });

        let parsed = VaultConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed.key_mode, config.key_mode);
        assert_eq!(parsed.content_store, config.content_store);
        assert_eq!(parsed.ledger, config.ledger);
        assert_eq!(parsed.retry.max_retries, config.retry.max_retries);
    }

    #[test]
    fn test_minimal_json_uses_defaults() {
        let json = r#"{
            "content_store": { "provider": "memory" },
            "ledger": { "provider": "memory" },
            "created_at": "2024-03-05T12:00:00Z"
        }"#;

        let config = VaultConfig::from_json(json).unwrap();
        assert_eq!(config.version, ConfigVersion::CURRENT);
        assert_eq!(config.key_mode, KeyMode::Identity);
        assert!(config.content_store.config.is_null());
    }

    #[test]
    fn test_rejects_future_version() {
        let mut config = VaultConfig::local("/tmp/v");
        config.version = ConfigVersion { major: 2, minor: 0 };

        let result = VaultConfig::from_json(&config.to_json().unwrap());
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("chainvault.json");

        let config = VaultConfig::local(dir.path());
        config.save(&path).await.unwrap();

        let loaded = VaultConfig::load(&path).await.unwrap();
        assert_eq!(loaded.ledger, config.ledger);
    }

    #[tokio::test]
    async fn test_load_missing() {
        let dir = TempDir::new().unwrap();
        assert!(matches!(
            VaultConfig::load(dir.path().join("absent.json")).await,
            Err(Error::NotFound(_))
        ));
    }
}
