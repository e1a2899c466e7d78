//! The file-provider contract and the options every backend supplies.

use std::time::Duration;

use bytes::Bytes;
use url::Url;

use crate::Result;
use crate::client::StoreClient;
use crate::types::{DeleteRequest, DownloadStream, StoredFile, UploadRequest};

/// Capability set of a file storage backend.
///
/// Implementations are stateless between calls: the caller persists the
/// returned [`StoredFile`] and hands its key back for later operations.
/// Every failure is logged once by the provider and then returned unchanged.
#[async_trait::async_trait]
pub trait FileProvider: Send + Sync + 'static {
    /// Registration id of the backend (e.g. `"azure-blob"`).
    fn identifier(&self) -> &str;

    /// Stores `request.content` under a freshly derived key.
    async fn upload(&self, request: UploadRequest) -> Result<StoredFile>;

    /// Deletes every key in `request` concurrently. Absent keys are not an error.
    async fn delete(&self, request: DeleteRequest) -> Result<()>;

    /// Returns a time-limited, read-only URL for the object at `key`.
    async fn presigned_download_url(&self, key: &str) -> Result<Url>;

    /// Opens a streaming read of the object at `key`.
    async fn get_as_stream(&self, key: &str) -> Result<DownloadStream>;

    /// Reads the whole object at `key` into memory.
    async fn get_as_buffer(&self, key: &str) -> Result<Bytes>;
}

/// Validated backend options that know how to build a [`StoreClient`].
pub trait BackendOptions {
    /// Registration id of the backend.
    const ID: &'static str;

    /// Checks required options without touching the network.
    fn validate(&self) -> Result<()>;

    /// Builds the store client. Called only after [`validate`](Self::validate) succeeded.
    fn build_client(&self) -> Result<StoreClient>;

    /// Settings applied to uploads and presigned URLs.
    fn upload_settings(&self) -> UploadSettings;
}

/// Per-backend settings used by [`ObjectFileProvider`](super::ObjectFileProvider).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSettings {
    /// Key prefix placed before every normalised filename.
    pub prefix: Option<String>,
    /// `Cache-Control` value stored on uploaded objects.
    pub cache_control: Option<String>,
    /// Lifetime of presigned download URLs.
    pub download_url_duration: Duration,
    /// Whether the backend stores content-type and cache-control attributes.
    pub object_attributes: bool,
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            prefix: None,
            cache_control: None,
            download_url_duration: Duration::from_secs(3600),
            object_attributes: true,
        }
    }
}
