//! Azure Blob Storage backend using [`object_store::azure::MicrosoftAzureBuilder`].

use std::fmt;
use std::time::Duration;

#[cfg(feature = "config")]
use clap::Args;
use object_store::azure::MicrosoftAzureBuilder;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{BackendOptions, UploadSettings};
use crate::client::StoreClient;
use crate::{Error, Result};

// Default values
const DEFAULT_CONTAINER: &str = "uploads";
const DEFAULT_CACHE_CONTROL: &str = "public, max-age=31536000";
const DEFAULT_DOWNLOAD_URL_DURATION_SECS: u64 = 3600;

/// Options of the Azure Blob Storage backend.
///
/// Account name, account key and container name are required; everything
/// else has a default.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct AzureBlobOptions {
    /// Storage account name
    #[cfg_attr(
        feature = "config",
        arg(long = "azure-account-name", env = "AZURE_STORAGE_ACCOUNT_NAME")
    )]
    #[serde(default)]
    pub account_name: Option<String>,

    /// Storage account access key (base64)
    #[cfg_attr(
        feature = "config",
        arg(
            long = "azure-account-key",
            env = "AZURE_STORAGE_ACCOUNT_KEY",
            hide_env_values = true
        )
    )]
    #[serde(default)]
    pub account_key: Option<String>,

    /// Container holding the uploaded files
    #[cfg_attr(
        feature = "config",
        arg(
            long = "azure-container",
            env = "AZURE_STORAGE_CONTAINER",
            default_value = DEFAULT_CONTAINER
        )
    )]
    #[serde(default = "default_container")]
    pub container_name: String,

    /// Key prefix placed before every uploaded filename
    #[cfg_attr(
        feature = "config",
        arg(
            id = "azure_prefix",
            long = "azure-prefix",
            env = "AZURE_STORAGE_PREFIX",
            default_value = "medusa"
        )
    )]
    #[serde(default)]
    pub prefix: Option<String>,

    /// Cache-Control header stored on uploaded blobs
    #[cfg_attr(
        feature = "config",
        arg(
            long = "azure-cache-control",
            env = "AZURE_STORAGE_CACHE_CONTROL",
            default_value = DEFAULT_CACHE_CONTROL
        )
    )]
    #[serde(default = "default_cache_control")]
    pub cache_control: String,

    /// Lifetime of presigned download URLs in seconds
    #[cfg_attr(
        feature = "config",
        arg(
            long = "azure-download-url-duration",
            env = "AZURE_STORAGE_DOWNLOAD_URL_DURATION",
            default_value_t = DEFAULT_DOWNLOAD_URL_DURATION_SECS
        )
    )]
    #[serde(default = "default_download_url_duration")]
    pub download_url_duration: u64,

    /// Custom blob endpoint, including the account (Azurite, sovereign clouds)
    #[cfg_attr(
        feature = "config",
        arg(long = "azure-endpoint", env = "AZURE_STORAGE_ENDPOINT")
    )]
    #[serde(default)]
    pub endpoint: Option<String>,
}

impl AzureBlobOptions {
    /// Creates options for `container_name` in the given account.
    pub fn new(
        account_name: impl Into<String>,
        account_key: impl Into<String>,
        container_name: impl Into<String>,
    ) -> Self {
        Self {
            account_name: Some(account_name.into()),
            account_key: Some(account_key.into()),
            container_name: container_name.into(),
            prefix: None,
            cache_control: DEFAULT_CACHE_CONTROL.to_string(),
            download_url_duration: DEFAULT_DOWNLOAD_URL_DURATION_SECS,
            endpoint: None,
        }
    }

    /// Sets the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Sets the cache-control value.
    #[must_use]
    pub fn with_cache_control(mut self, cache_control: impl Into<String>) -> Self {
        self.cache_control = cache_control.into();
        self
    }

    /// Sets the presigned URL lifetime in seconds.
    #[must_use]
    pub fn with_download_url_duration(mut self, secs: u64) -> Self {
        self.download_url_duration = secs;
        self
    }

    /// Sets a custom endpoint.
    #[must_use]
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Returns the lifetime of presigned download URLs.
    #[inline]
    pub fn download_url_duration(&self) -> Duration {
        Duration::from_secs(self.download_url_duration)
    }

    /// Returns the URL of the container; object URLs are built under it.
    pub fn container_url(&self) -> Result<Url> {
        let account = required(self.account_name.as_deref(), "account_name")?;
        let service = match &self.endpoint {
            Some(endpoint) => endpoint.trim_end_matches('/').to_string(),
            None => format!("https://{account}.blob.core.windows.net"),
        };

        let mut url = Url::parse(&service)
            .map_err(|e| Error::config(format!("invalid Azure Blob Storage endpoint: {e}")))?;
        url.path_segments_mut()
            .map_err(|()| Error::config("Azure Blob Storage endpoint cannot be a base URL"))?
            .pop_if_empty()
            .push(&self.container_name);
        Ok(url)
    }
}

impl BackendOptions for AzureBlobOptions {
    const ID: &'static str = "azure-blob";

    fn validate(&self) -> Result<()> {
        required(self.account_name.as_deref(), "account_name")?;
        required(self.account_key.as_deref(), "account_key")?;
        required(Some(self.container_name.as_str()), "container_name")?;

        if self.download_url_duration == 0 {
            return Err(Error::config(
                "Azure Blob Storage download_url_duration must be greater than zero",
            ));
        }

        self.container_url()?;
        Ok(())
    }

    fn build_client(&self) -> Result<StoreClient> {
        let account = required(self.account_name.as_deref(), "account_name")?;
        let key = required(self.account_key.as_deref(), "account_key")?;

        let mut builder = MicrosoftAzureBuilder::new()
            .with_account(account)
            .with_access_key(key)
            .with_container_name(&self.container_name);

        if let Some(endpoint) = &self.endpoint {
            builder = builder.with_endpoint(endpoint.clone());
            if endpoint.starts_with("http://") {
                builder = builder.with_allow_http(true);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("invalid Azure Blob Storage options: {e}")))?;

        Ok(StoreClient::with_signer(store, self.container_url()?))
    }

    fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            prefix: self.prefix.clone(),
            cache_control: Some(self.cache_control.clone()),
            download_url_duration: self.download_url_duration(),
            object_attributes: true,
        }
    }
}

impl fmt::Debug for AzureBlobOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureBlobOptions")
            .field("account_name", &self.account_name)
            .field("account_key", &self.account_key.as_ref().map(|_| "[REDACTED]"))
            .field("container_name", &self.container_name)
            .field("prefix", &self.prefix)
            .field("cache_control", &self.cache_control)
            .field("download_url_duration", &self.download_url_duration)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

fn required<'a>(value: Option<&'a str>, field: &str) -> Result<&'a str> {
    match value {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::config(format!(
            "Azure Blob Storage {field} is required"
        ))),
    }
}

fn default_container() -> String {
    DEFAULT_CONTAINER.to_string()
}

fn default_cache_control() -> String {
    DEFAULT_CACHE_CONTROL.to_string()
}

const fn default_download_url_duration() -> u64 {
    DEFAULT_DOWNLOAD_URL_DURATION_SECS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{FileProvider, ObjectFileProvider};

    // base64("devstoreaccount1-key")
    const ACCOUNT_KEY: &str = "ZGV2c3RvcmVhY2NvdW50MS1rZXk=";

    fn options() -> AzureBlobOptions {
        AzureBlobOptions::new("szamba", ACCOUNT_KEY, "uploads").with_prefix("medusa")
    }

    #[test]
    fn missing_required_options_fail_validation() {
        let mut opts = options();
        opts.account_name = None;
        let err = ObjectFileProvider::connect(&opts).unwrap_err();
        assert!(err.is_config_error());
        assert_eq!(
            err.to_string(),
            "configuration error: Azure Blob Storage account_name is required"
        );

        let mut opts = options();
        opts.account_key = Some("  ".to_string());
        assert!(opts.validate().unwrap_err().is_config_error());

        let mut opts = options();
        opts.container_name = String::new();
        let err = opts.validate().unwrap_err();
        assert!(err.to_string().contains("container_name"));
    }

    #[test]
    fn zero_duration_is_rejected() {
        let opts = options().with_download_url_duration(0);
        assert!(opts.validate().unwrap_err().is_config_error());
    }

    #[test]
    fn container_url_defaults_to_public_endpoint() {
        let url = options().container_url().unwrap();
        assert_eq!(url.as_str(), "https://szamba.blob.core.windows.net/uploads");
    }

    #[test]
    fn container_url_with_custom_endpoint() {
        let opts = options().with_endpoint("http://127.0.0.1:10000/devstoreaccount1/");
        let url = opts.container_url().unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:10000/devstoreaccount1/uploads");
    }

    #[test]
    fn debug_redacts_account_key() {
        let rendered = format!("{:?}", options());
        assert!(!rendered.contains(ACCOUNT_KEY));
        assert!(rendered.contains("[REDACTED]"));
    }

    #[test]
    fn deserializes_with_defaults() {
        let opts: AzureBlobOptions = serde_json::from_value(serde_json::json!({
            "account_name": "szamba",
            "account_key": ACCOUNT_KEY,
        }))
        .unwrap();

        assert_eq!(opts.container_name, "uploads");
        assert_eq!(opts.cache_control, "public, max-age=31536000");
        assert_eq!(opts.download_url_duration(), Duration::from_secs(3600));
        assert!(opts.prefix.is_none());
    }

    #[test]
    fn connect_builds_provider_without_network() {
        let provider = ObjectFileProvider::connect(&options()).unwrap();
        assert_eq!(provider.identifier(), "azure-blob");
        assert!(provider.client().can_sign());
        assert_eq!(provider.settings().prefix.as_deref(), Some("medusa"));
    }

    #[tokio::test]
    async fn signed_url_grants_read_only_access() {
        let opts = options().with_download_url_duration(60);
        let provider = ObjectFileProvider::connect(&opts).unwrap();
        let key = crate::types::FileKey::parse("medusa/a-1.txt").unwrap();
        let signed_at = jiff::Timestamp::now();

        // Signing with an account key happens locally, no request is sent.
        let url = provider
            .client()
            .signed_url(&key, opts.download_url_duration())
            .await
            .unwrap();

        assert_eq!(url.host_str(), Some("szamba.blob.core.windows.net"));
        assert_eq!(url.path(), "/uploads/medusa/a-1.txt");

        let query: Vec<(String, String)> = url.query_pairs().into_owned().collect();
        assert!(query.contains(&("sp".to_string(), "r".to_string())));
        assert!(query.iter().any(|(k, _)| k == "sig"));

        let (_, expiry) = query.iter().find(|(k, _)| k == "se").unwrap();
        let expiry: jiff::Timestamp = expiry.parse().unwrap();
        let lifetime = expiry.as_second() - signed_at.as_second();
        assert!((55..=65).contains(&lifetime), "lifetime was {lifetime}s");
    }
}
