//! IPFS pinning gateway client.
//!
//! Uploads go through the pinning service API, downloads through a public
//! or dedicated IPFS gateway at `{gateway}/{address}`.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

use crate::provider::ContentStore;
use chainvault_common::{ContentAddress, Error, Result};

/// Default pinning API base URL.
pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
/// Default gateway base URL.
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs";

/// Pinning gateway configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct PinataConfig {
    /// Pinning API base URL.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Gateway base URL objects are fetched from.
    #[serde(default = "default_gateway")]
    pub gateway: String,
    /// API key sent with uploads.
    pub api_key: String,
    /// Secret API key sent with uploads.
    pub secret_api_key: String,
    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_gateway() -> String {
    DEFAULT_GATEWAY.to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

impl std::fmt::Debug for PinataConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PinataConfig")
            .field("api_url", &self.api_url)
            .field("gateway", &self.gateway)
            .field("api_key", &"[REDACTED]")
            .field("secret_api_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Response from a pin request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PinResponse {
    ipfs_hash: String,
    #[serde(default)]
    pin_size: Option<u64>,
}

/// Content store backed by an IPFS pinning service.
pub struct PinataGateway {
    http: Client,
    config: PinataConfig,
}

impl PinataGateway {
    /// Create a new gateway client.
    ///
    /// # Errors
    /// - Credentials missing
    /// - URLs invalid
    /// - HTTP client construction failure
    pub fn new(config: PinataConfig) -> Result<Self> {
        if config.api_key.is_empty() || config.secret_api_key.is_empty() {
            return Err(Error::InvalidInput(
                "Pinning gateway requires api_key and secret_api_key".to_string(),
            ));
        }
        Url::parse(&config.api_url)
            .map_err(|e| Error::InvalidInput(format!("Invalid api_url: {}", e)))?;
        Url::parse(&config.gateway)
            .map_err(|e| Error::InvalidInput(format!("Invalid gateway: {}", e)))?;

        let http = Client::builder()
            .user_agent("ChainVault/0.1")
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::InvalidInput(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { http, config })
    }

    /// Resolve the gateway URL for an address.
    pub fn gateway_url(&self, address: &ContentAddress) -> Result<Url> {
        object_url(&self.config.gateway, address)
    }

    fn pin_url(&self) -> Result<Url> {
        let url = format!(
            "{}/pinning/pinFileToIPFS",
            self.config.api_url.trim_end_matches('/')
        );
        Url::parse(&url).map_err(|e| Error::InvalidInput(format!("Invalid pin URL: {}", e)))
    }
}

/// Build `{gateway}/{address}`.
fn object_url(gateway: &str, address: &ContentAddress) -> Result<Url> {
    let url = format!("{}/{}", gateway.trim_end_matches('/'), address);
    Url::parse(&url).map_err(|e| Error::InvalidInput(format!("Invalid gateway URL: {}", e)))
}

/// Classify a non-success HTTP status.
fn status_error(status: StatusCode, body: &str) -> Error {
    match status {
        StatusCode::NOT_FOUND => Error::NotFound(format!("Gateway returned 404: {}", body)),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            Error::Rejected(format!("Credentials refused ({}): {}", status, body))
        }
        StatusCode::PAYMENT_REQUIRED | StatusCode::TOO_MANY_REQUESTS => {
            Error::Rejected(format!("Quota exceeded ({}): {}", status, body))
        }
        StatusCode::PAYLOAD_TOO_LARGE => {
            Error::Rejected(format!("Payload too large: {}", body))
        }
        _ => Error::Network(format!("Gateway error: {} - {}", status, body)),
    }
}

fn transport_error(action: &str, err: reqwest::Error) -> Error {
    Error::Network(format!("Failed to {}: {}", action, err))
}

#[async_trait]
impl ContentStore for PinataGateway {
    fn name(&self) -> &str {
        "pinata"
    }

    async fn put(&self, data: Vec<u8>) -> Result<ContentAddress> {
        let size = data.len();
        let part = Part::bytes(data)
            .file_name("blob.bin")
            .mime_str("application/octet-stream")
            .map_err(|e| transport_error("build upload", e))?;
        let form = Form::new().part("file", part);

        debug!(size, "Pinning object");

        let response = self
            .http
            .post(self.pin_url()?)
            .header("pinata_api_key", &self.config.api_key)
            .header("pinata_secret_api_key", &self.config.secret_api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| transport_error("pin object", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let pinned: PinResponse = response
            .json()
            .await
            .map_err(|e| Error::Network(format!("Failed to parse pin response: {}", e)))?;

        let address = ContentAddress::new(pinned.ipfs_hash)?;
        info!(address = %address, size, pin_size = ?pinned.pin_size, "Object pinned");
        Ok(address)
    }

    async fn get(&self, address: &ContentAddress) -> Result<Vec<u8>> {
        let url = self.gateway_url(address)?;
        debug!(url = %url, "Fetching object from gateway");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| transport_error("fetch object", e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(status_error(status, &body));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| transport_error("read object", e))?;
        Ok(bytes.to_vec())
    }
}
