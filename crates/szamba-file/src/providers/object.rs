//! [`FileProvider`] implemented on top of any [`StoreClient`].

use bytes::Bytes;
use futures::future::join_all;
use object_store::Attributes;
use url::Url;

use super::{BackendOptions, FileProvider, UploadSettings};
use crate::client::{StoreClient, object_attributes};
use crate::types::{
    DeleteRequest, DownloadStream, FileContent, FileKey, KeyGenerator, StoredFile, UploadRequest,
};
use crate::{Error, Result, TRACING_TARGET_PROVIDER};

/// File provider backed by an object store.
///
/// One instance serves every request for its backend; the only mutable state
/// is the key generator's last timestamp.
#[derive(Debug)]
pub struct ObjectFileProvider {
    id: &'static str,
    client: StoreClient,
    keys: KeyGenerator,
    settings: UploadSettings,
}

impl ObjectFileProvider {
    /// Validates `options` and builds the provider for that backend.
    ///
    /// Fails with [`Error::Config`] before any client exists if a required
    /// option is missing.
    pub fn connect<O: BackendOptions>(options: &O) -> Result<Self> {
        options.validate()?;
        let client = options.build_client()?;
        let provider = Self::new(O::ID, client, options.upload_settings());

        tracing::info!(
            target: TRACING_TARGET_PROVIDER,
            backend = provider.id,
            base_url = %provider.client.base_url(),
            prefix = ?provider.keys.prefix(),
            signed_urls = provider.client.can_sign(),
            "file provider initialized"
        );

        Ok(provider)
    }

    /// Creates a provider from an already built client.
    pub fn new(id: &'static str, client: StoreClient, settings: UploadSettings) -> Self {
        Self {
            id,
            keys: KeyGenerator::new(settings.prefix.as_deref()),
            client,
            settings,
        }
    }

    /// Returns the underlying store client.
    pub fn client(&self) -> &StoreClient {
        &self.client
    }

    /// Returns the upload settings.
    pub fn settings(&self) -> &UploadSettings {
        &self.settings
    }

    fn attributes(&self, mime_type: &str) -> Attributes {
        if !self.settings.object_attributes {
            return Attributes::new();
        }
        object_attributes(Some(mime_type), self.settings.cache_control.as_deref())
    }

    fn log_failure(&self, operation: &'static str, key: &str, error: &Error) {
        tracing::error!(
            target: TRACING_TARGET_PROVIDER,
            backend = self.id,
            operation,
            key,
            error = %error,
            "file operation failed"
        );
    }

    async fn store(&self, key: &FileKey, content: FileContent, attributes: Attributes) -> Result<()> {
        match content {
            FileContent::Buffer(data) => self.client.put(key, data, attributes).await,
            FileContent::Text(text) => self.client.put(key, Bytes::from(text), attributes).await,
            FileContent::Stream(stream) => {
                self.client.put_stream(key, stream, attributes).await?;
                Ok(())
            }
        }
    }
}

#[async_trait::async_trait]
impl FileProvider for ObjectFileProvider {
    fn identifier(&self) -> &str {
        self.id
    }

    async fn upload(&self, request: UploadRequest) -> Result<StoredFile> {
        let UploadRequest {
            filename,
            content,
            mime_type,
        } = request;

        let key = self
            .keys
            .generate(&filename)
            .inspect_err(|err| self.log_failure("upload", &filename, err))?;

        let kind = content.kind();
        let attributes = self.attributes(&mime_type);
        self.store(&key, content, attributes)
            .await
            .inspect_err(|err| self.log_failure("upload", key.as_str(), err))?;

        tracing::debug!(
            target: TRACING_TARGET_PROVIDER,
            backend = self.id,
            key = %key,
            content = kind,
            mime_type = %mime_type,
            "file uploaded"
        );

        Ok(StoredFile {
            url: self.client.url(&key),
            key,
        })
    }

    async fn delete(&self, request: DeleteRequest) -> Result<()> {
        let outcomes = join_all(request.keys().iter().map(|key| async move {
            let key = FileKey::parse(key.as_str())?;
            self.client.delete_if_exists(&key).await
        }))
        .await;

        let mut failures = outcomes.into_iter().filter_map(|outcome| outcome.err());
        let Some(first) = failures.next() else {
            tracing::debug!(
                target: TRACING_TARGET_PROVIDER,
                backend = self.id,
                count = request.len(),
                "files deleted"
            );
            return Ok(());
        };

        tracing::error!(
            target: TRACING_TARGET_PROVIDER,
            backend = self.id,
            operation = "delete",
            keys = ?request.keys(),
            failed = 1 + failures.count(),
            error = %first,
            "failed to delete files"
        );

        Err(first)
    }

    async fn presigned_download_url(&self, key: &str) -> Result<Url> {
        let signed = async {
            let key = FileKey::parse(key)?;
            self.client.head(&key).await?;
            self.client
                .signed_url(&key, self.settings.download_url_duration)
                .await
        };

        signed
            .await
            .inspect_err(|err| self.log_failure("presign", key, err))
    }

    async fn get_as_stream(&self, key: &str) -> Result<DownloadStream> {
        let opened = async {
            let key = FileKey::parse(key)?;
            self.client.get_stream(&key).await
        };

        opened
            .await
            .inspect_err(|err| self.log_failure("get_as_stream", key, err))
    }

    async fn get_as_buffer(&self, key: &str) -> Result<Bytes> {
        let read = async {
            let key = FileKey::parse(key)?;
            self.client.get_bytes(&key).await
        };

        read.await
            .inspect_err(|err| self.log_failure("get_as_buffer", key, err))
    }
}
