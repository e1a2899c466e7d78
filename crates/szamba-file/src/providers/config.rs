//! Backend selection at startup.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::{
    AzureBlobOptions, BackendOptions, FileProvider, LocalOptions, ObjectFileProvider,
};
use crate::Result;

/// File provider configuration, tagged by backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
#[non_exhaustive]
pub enum ProviderConfig {
    /// Azure Blob Storage.
    AzureBlob(AzureBlobOptions),
    /// Local filesystem.
    Local(LocalOptions),
}

impl ProviderConfig {
    /// Returns the backend registration id.
    pub fn backend_name(&self) -> &'static str {
        match self {
            Self::AzureBlob(_) => AzureBlobOptions::ID,
            Self::Local(_) => LocalOptions::ID,
        }
    }

    /// Validates the options without building anything.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::AzureBlob(options) => options.validate(),
            Self::Local(options) => options.validate(),
        }
    }

    /// Validates the options and builds the selected provider.
    pub fn connect(&self) -> Result<Arc<dyn FileProvider>> {
        let provider = match self {
            Self::AzureBlob(options) => ObjectFileProvider::connect(options)?,
            Self::Local(options) => ObjectFileProvider::connect(options)?,
        };
        Ok(Arc::new(provider))
    }
}

impl From<AzureBlobOptions> for ProviderConfig {
    fn from(options: AzureBlobOptions) -> Self {
        Self::AzureBlob(options)
    }
}

impl From<LocalOptions> for ProviderConfig {
    fn from(options: LocalOptions) -> Self {
        Self::Local(options)
    }
}
