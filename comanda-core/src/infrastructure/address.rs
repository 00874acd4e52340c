//! Postal-code lookup against the remote address service.

use crate::config::{AddressServiceConfig, resolve_secret};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info, warn};

#[derive(Debug, Error)]
pub enum AddressError {
    #[error("address service is not configured")]
    NotConfigured,
    #[error("network error calling address service: {0}")]
    Network(#[from] reqwest::Error),
    #[error("address service answered with status {0}")]
    Status(StatusCode),
    #[error("address service response has no '{0}' field")]
    MissingField(String),
}

#[async_trait]
pub trait AddressLookup: Send + Sync {
    /// Resolve a postal code into a human-readable address line.
    async fn lookup(&self, postal_code: &str) -> Result<String, AddressError>;
}

/// Stand-in used when no `[address]` section is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnconfiguredAddressLookup;

#[async_trait]
impl AddressLookup for UnconfiguredAddressLookup {
    async fn lookup(&self, _postal_code: &str) -> Result<String, AddressError> {
        Err(AddressError::NotConfigured)
    }
}

#[derive(Debug, Clone)]
pub struct HttpAddressLookup {
    http: Client,
    config: AddressServiceConfig,
    username: Option<String>,
    password: Option<String>,
}

impl HttpAddressLookup {
    pub fn from_config(config: AddressServiceConfig) -> Self {
        let username = resolve_secret("address", config.username.as_deref());
        let password = resolve_secret("address", config.password.as_deref());
        Self::with_credentials(config, username, password)
    }

    pub fn with_credentials(
        config: AddressServiceConfig,
        username: Option<String>,
        password: Option<String>,
    ) -> Self {
        Self {
            http: Client::new(),
            config,
            username,
            password,
        }
    }
}

#[async_trait]
impl AddressLookup for HttpAddressLookup {
    async fn lookup(&self, postal_code: &str) -> Result<String, AddressError> {
        info!(url = %self.config.url, "Looking up delivery address");
        let mut request = self
            .http
            .get(&self.config.url)
            .query(&[(self.config.query_param.as_str(), postal_code)]);
        if let Some(username) = &self.username {
            request = request.basic_auth(username, self.password.as_deref());
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "Address service rejected lookup");
            return Err(AddressError::Status(status));
        }

        let body: Value = response.json().await?;
        debug!("Received address service response");
        body.get(self.config.address_field.as_str())
            .and_then(Value::as_str)
            .map(|address| address.trim().to_string())
            .ok_or_else(|| AddressError::MissingField(self.config.address_field.clone()))
    }
}

/// Join the looked-up address with the caller's number and complement.
///
/// Both labels are always present, even when their values are empty.
pub fn format_delivery_address(address: &str, number: &str, complement: &str) -> String {
    format!("{address}, Número: {number}, Complemento: {complement}")
}
