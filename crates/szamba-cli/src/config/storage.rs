//! Storage backend configuration.

use clap::{Args, ValueEnum};
use szamba_file::providers::{AzureBlobOptions, LocalOptions, ProviderConfig};

use crate::TRACING_TARGET_CONFIG;

/// Which file provider backend to build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackend {
    /// Azure Blob Storage.
    AzureBlob,
    /// Local filesystem.
    Local,
}

/// Storage configuration: the selected backend plus the options of every backend.
///
/// Only the options of the selected backend are validated and used.
#[derive(Debug, Clone, Args)]
pub struct StorageConfig {
    /// File provider backend
    #[arg(
        long = "storage-backend",
        env = "STORAGE_BACKEND",
        value_enum,
        default_value_t = StorageBackend::AzureBlob
    )]
    pub backend: StorageBackend,

    /// Azure Blob Storage options.
    #[clap(flatten)]
    pub azure: AzureBlobOptions,

    /// Local filesystem options.
    #[clap(flatten)]
    pub local: LocalOptions,
}

impl StorageConfig {
    /// Returns the configuration of the selected backend.
    pub fn provider_config(&self) -> ProviderConfig {
        match self.backend {
            StorageBackend::AzureBlob => ProviderConfig::AzureBlob(self.azure.clone()),
            StorageBackend::Local => ProviderConfig::Local(self.local.clone()),
        }
    }

    /// Logs the storage configuration (no secrets).
    pub fn log(&self) {
        match self.backend {
            StorageBackend::AzureBlob => tracing::info!(
                target: TRACING_TARGET_CONFIG,
                account_name = ?self.azure.account_name,
                account_key_set = self.azure.account_key.is_some(),
                container = %self.azure.container_name,
                prefix = ?self.azure.prefix,
                download_url_duration_secs = self.azure.download_url_duration,
                endpoint = ?self.azure.endpoint,
                "Azure Blob Storage configuration"
            ),
            StorageBackend::Local => tracing::info!(
                target: TRACING_TARGET_CONFIG,
                upload_dir = %self.local.upload_dir.display(),
                backend_url = %self.local.backend_url,
                prefix = ?self.local.prefix,
                "Local storage configuration"
            ),
        }
    }
}
