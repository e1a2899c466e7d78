//! Cloneable object-store handle shared by every backend.
//!
//! [`StoreClient`] wraps `Arc<dyn ObjectStore>` together with the public base
//! URL of the container and, for backends that can sign requests, a
//! [`Signer`]. Every public method is instrumented with [`tracing`].

use std::fmt;
use std::ops::Range;
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use futures::{StreamExt, TryStreamExt};
use http::Method;
use object_store::buffered::BufWriter;
use object_store::signer::Signer;
use object_store::{Attribute, Attributes, ObjectMeta, ObjectStore, PutOptions, PutPayload};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::types::{ByteStream, DownloadStream, FileKey};
use crate::{Error, Result, TRACING_TARGET_CLIENT};

/// Cloneable handle to an [`ObjectStore`] backend and its public URL.
#[derive(Clone)]
pub struct StoreClient {
    store: Arc<dyn ObjectStore>,
    signer: Option<Arc<dyn Signer>>,
    base_url: Url,
}

impl StoreClient {
    /// Wraps a concrete [`ObjectStore`] whose objects are served under `base_url`.
    pub fn new(store: impl ObjectStore, base_url: Url) -> Self {
        Self {
            store: Arc::new(store),
            signer: None,
            base_url,
        }
    }

    /// Wraps a store that can also sign URLs for its own objects.
    pub fn with_signer<S>(store: S, base_url: Url) -> Self
    where
        S: ObjectStore + Signer,
    {
        let store = Arc::new(store);
        Self {
            store: store.clone(),
            signer: Some(store),
            base_url,
        }
    }

    /// Replaces the URL signer.
    pub fn set_signer(mut self, signer: impl Signer) -> Self {
        self.signer = Some(Arc::new(signer));
        self
    }

    /// Returns the base URL objects are served under.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the public URL of `key`, percent-encoding each path segment.
    pub fn url(&self, key: &FileKey) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(key.as_str().split('/'));
        }
        url
    }

    /// Uploads `data` to `key` in a single request.
    #[tracing::instrument(
        name = "store.put",
        skip(self, data, attributes),
        fields(key = %key, size = data.len())
    )]
    pub async fn put(&self, key: &FileKey, data: Bytes, attributes: Attributes) -> Result<()> {
        let opts = PutOptions {
            attributes,
            ..Default::default()
        };

        self.store
            .put_opts(&key.to_path(), PutPayload::from(data), opts)
            .await?;
        Ok(())
    }

    /// Uploads the chunks of `stream` to `key` as a multipart upload.
    ///
    /// The upload is aborted if the stream or the store fails part-way.
    #[tracing::instrument(
        name = "store.put_stream",
        skip(self, stream, attributes),
        fields(key = %key, size)
    )]
    pub async fn put_stream(
        &self,
        key: &FileKey,
        mut stream: ByteStream,
        attributes: Attributes,
    ) -> Result<u64> {
        let mut writer =
            BufWriter::new(self.store.clone(), key.to_path()).with_attributes(attributes);
        let mut size = 0u64;

        let copied = async {
            while let Some(chunk) = stream.next().await {
                let chunk = chunk?;
                size += chunk.len() as u64;
                writer.write_all(&chunk).await?;
            }
            writer.shutdown().await?;
            Ok::<_, Error>(())
        }
        .await;

        if let Err(err) = copied {
            if let Err(abort_err) = writer.abort().await {
                tracing::warn!(
                    target: TRACING_TARGET_CLIENT,
                    key = %key,
                    error = %abort_err,
                    "failed to abort multipart upload"
                );
            }
            return Err(err);
        }

        tracing::Span::current().record("size", size);
        Ok(size)
    }

    /// Deletes `key`, treating an already absent object as success.
    ///
    /// Returns whether an object was actually present.
    #[tracing::instrument(
        name = "store.delete",
        skip(self),
        fields(key = %key)
    )]
    pub async fn delete_if_exists(&self, key: &FileKey) -> Result<bool> {
        match self.store.delete(&key.to_path()).await {
            Ok(()) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    /// Fetches object metadata without downloading the body.
    #[tracing::instrument(
        name = "store.head",
        skip(self),
        fields(key = %key)
    )]
    pub async fn head(&self, key: &FileKey) -> Result<ObjectMeta> {
        Ok(self.store.head(&key.to_path()).await?)
    }

    /// Opens a streaming read of `key`.
    #[tracing::instrument(
        name = "store.get_stream",
        skip(self),
        fields(key = %key)
    )]
    pub async fn get_stream(&self, key: &FileKey) -> Result<DownloadStream> {
        let result = self.store.get(&key.to_path()).await?;
        ensure_body(key, &result.range, result.meta.size)?;

        Ok(result.into_stream().map_err(Error::from).boxed())
    }

    /// Reads the whole object at `key` into memory.
    #[tracing::instrument(
        name = "store.get_bytes",
        skip(self),
        fields(key = %key)
    )]
    pub async fn get_bytes(&self, key: &FileKey) -> Result<Bytes> {
        let result = self.store.get(&key.to_path()).await?;
        Ok(result.bytes().await?)
    }

    /// Returns a read-only URL for `key` that expires after `expires_in`.
    ///
    /// Falls back to the public URL when the backend has no signer.
    #[tracing::instrument(
        name = "store.signed_url",
        skip(self),
        fields(key = %key)
    )]
    pub async fn signed_url(&self, key: &FileKey, expires_in: Duration) -> Result<Url> {
        match &self.signer {
            Some(signer) => Ok(signer
                .signed_url(Method::GET, &key.to_path(), expires_in)
                .await?),
            None => Ok(self.url(key)),
        }
    }

    /// Returns `true` if the client can produce signed URLs.
    pub fn can_sign(&self) -> bool {
        self.signer.is_some()
    }
}

impl fmt::Debug for StoreClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StoreClient")
            .field("store", &self.store.to_string())
            .field("base_url", &self.base_url.as_str())
            .field("signer", &self.signer.is_some())
            .finish()
    }
}

/// Builds object attributes from the optional content type and cache control.
pub fn object_attributes(content_type: Option<&str>, cache_control: Option<&str>) -> Attributes {
    let mut attributes = Attributes::new();
    if let Some(ct) = content_type {
        attributes.insert(Attribute::ContentType, ct.to_owned().into());
    }
    if let Some(cc) = cache_control {
        attributes.insert(Attribute::CacheControl, cc.to_owned().into());
    }
    attributes
}

/// Fails when the backend reported a non-empty object but handed back an empty body.
///
/// `GetResult` always carries a payload, so this only trips for backends that
/// report a size but return an empty range.
fn ensure_body(key: &FileKey, range: &Range<u64>, size: u64) -> Result<()> {
    if size > 0 && range.is_empty() {
        return Err(Error::missing_body(key.as_str()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use object_store::memory::InMemory;

    use super::*;

    fn key(s: &str) -> FileKey {
        FileKey::parse(s).unwrap()
    }

    fn test_client() -> StoreClient {
        let base = Url::parse("https://acct.blob.core.windows.net/uploads").unwrap();
        StoreClient::new(InMemory::new(), base)
    }

    #[test]
    fn url_appends_encoded_segments() {
        let client = test_client();
        let url = client.url(&key("medusa/my photo-1.png"));
        assert_eq!(
            url.as_str(),
            "https://acct.blob.core.windows.net/uploads/medusa/my%20photo-1.png"
        );
    }

    #[test]
    fn url_with_trailing_slash_base() {
        let base = Url::parse("http://localhost:9000/static/").unwrap();
        let client = StoreClient::new(InMemory::new(), base);
        let url = client.url(&key("a-1.txt"));
        assert_eq!(url.as_str(), "http://localhost:9000/static/a-1.txt");
    }

    #[test]
    fn empty_body_for_non_empty_object() {
        let k = key("medusa/a-1.txt");
        assert!(matches!(
            ensure_body(&k, &(0..0), 5),
            Err(Error::MissingBody(_))
        ));
        assert!(ensure_body(&k, &(0..0), 0).is_ok());
        assert!(ensure_body(&k, &(0..5), 5).is_ok());
    }

    #[tokio::test]
    async fn put_stores_attributes() {
        let client = test_client();
        let k = key("a-1.txt");
        let attrs = object_attributes(Some("text/plain"), Some("public, max-age=60"));
        client.put(&k, Bytes::from("hello"), attrs).await.unwrap();

        let result = client.store.get(&k.to_path()).await.unwrap();
        assert_eq!(
            result
                .attributes
                .get(&Attribute::ContentType)
                .map(|v| v.to_string()),
            Some("text/plain".to_string())
        );
        assert_eq!(
            result
                .attributes
                .get(&Attribute::CacheControl)
                .map(|v| v.to_string()),
            Some("public, max-age=60".to_string())
        );
    }

    #[tokio::test]
    async fn put_stream_concatenates_chunks() {
        let client = test_client();
        let k = key("stream-1.bin");
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from("hel")),
            Ok(Bytes::from("lo")),
        ]);

        let size = client
            .put_stream(&k, chunks.boxed(), Attributes::new())
            .await
            .unwrap();
        assert_eq!(size, 5);
        assert_eq!(client.get_bytes(&k).await.unwrap(), Bytes::from("hello"));
    }

    #[tokio::test]
    async fn put_stream_propagates_source_error() {
        let client = test_client();
        let k = key("broken-1.bin");
        let chunks = futures::stream::iter(vec![
            Ok(Bytes::from("partial")),
            Err(std::io::Error::other("disk gone")),
        ]);

        let err = client
            .put_stream(&k, chunks.boxed(), Attributes::new())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(client.get_bytes(&k).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn delete_missing_is_ok() {
        let client = test_client();
        let k = key("nothing-here.txt");
        assert!(!client.delete_if_exists(&k).await.unwrap());

        client.put(&k, Bytes::from("x"), Attributes::new()).await.unwrap();
        assert!(client.delete_if_exists(&k).await.unwrap());
    }

    #[tokio::test]
    async fn get_stream_yields_content() {
        let client = test_client();
        let k = key("read-1.txt");
        client
            .put(&k, Bytes::from("streamed"), Attributes::new())
            .await
            .unwrap();

        let chunks: Vec<Bytes> = client
            .get_stream(&k)
            .await
            .unwrap()
            .try_collect()
            .await
            .unwrap();
        assert_eq!(chunks.concat(), b"streamed");
    }

    #[test]
    fn url_encodes_reserved_characters_of_the_key() {
        let client = test_client();
        let cases = [
            ("medusa/50%-1.png", "medusa/50%25-1.png"),
            ("medusa/a#1-1.png", "medusa/a%231-1.png"),
            ("medusa/what?-1.png", "medusa/what%3F-1.png"),
        ];
        for (raw, encoded) in cases {
            let url = client.url(&key(raw));
            assert_eq!(
                url.as_str(),
                format!("https://acct.blob.core.windows.net/uploads/{encoded}")
            );
        }
    }

    #[tokio::test]
    async fn objects_are_stored_under_the_literal_key() {
        let client = test_client();
        let k = key("medusa/50%-1.png");
        client.put(&k, Bytes::from("x"), Attributes::new()).await.unwrap();

        let meta = client.head(&k).await.unwrap();
        assert_eq!(meta.location.as_ref(), "medusa/50%-1.png");
    }

    #[tokio::test]
    async fn unsigned_client_returns_public_url() {
        let client = test_client();
        let k = key("a-1.txt");
        assert!(!client.can_sign());
        let url = client.signed_url(&k, Duration::from_secs(60)).await.unwrap();
        assert_eq!(url, client.url(&k));
    }
}
