//! Local filesystem backend using [`object_store::local::LocalFileSystem`].
//!
//! Meant for development: files land in a directory that a static file
//! server exposes under `backend_url`.

use std::path::PathBuf;

#[cfg(feature = "config")]
use clap::Args;
use object_store::local::LocalFileSystem;
use serde::{Deserialize, Serialize};
use url::Url;

use super::{BackendOptions, UploadSettings};
use crate::client::StoreClient;
use crate::{Error, Result};

const DEFAULT_UPLOAD_DIR: &str = "static";
const DEFAULT_BACKEND_URL: &str = "http://localhost:9000/static";

/// Options of the local filesystem backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "config", derive(Args))]
pub struct LocalOptions {
    /// Directory uploaded files are written to
    #[cfg_attr(
        feature = "config",
        arg(
            long = "local-upload-dir",
            env = "LOCAL_UPLOAD_DIR",
            default_value = DEFAULT_UPLOAD_DIR
        )
    )]
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Public URL the upload directory is served under
    #[cfg_attr(
        feature = "config",
        arg(
            long = "local-backend-url",
            env = "LOCAL_BACKEND_URL",
            default_value = DEFAULT_BACKEND_URL
        )
    )]
    #[serde(default = "default_backend_url")]
    pub backend_url: String,

    /// Key prefix placed before every uploaded filename
    #[cfg_attr(
        feature = "config",
        arg(id = "local_prefix", long = "local-prefix", env = "LOCAL_PREFIX")
    )]
    #[serde(default)]
    pub prefix: Option<String>,
}

impl LocalOptions {
    /// Creates options writing to `upload_dir` and served under `backend_url`.
    pub fn new(upload_dir: impl Into<PathBuf>, backend_url: impl Into<String>) -> Self {
        Self {
            upload_dir: upload_dir.into(),
            backend_url: backend_url.into(),
            prefix: None,
        }
    }

    /// Sets the key prefix.
    #[must_use]
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    fn base_url(&self) -> Result<Url> {
        Url::parse(&self.backend_url)
            .map_err(|e| Error::config(format!("invalid local backend_url: {e}")))
    }
}

impl Default for LocalOptions {
    fn default() -> Self {
        Self::new(DEFAULT_UPLOAD_DIR, DEFAULT_BACKEND_URL)
    }
}

impl BackendOptions for LocalOptions {
    const ID: &'static str = "local";

    fn validate(&self) -> Result<()> {
        if self.upload_dir.as_os_str().is_empty() {
            return Err(Error::config("local upload_dir is required"));
        }

        let url = self.base_url()?;
        if url.cannot_be_a_base() {
            return Err(Error::config("local backend_url cannot be a base URL"));
        }
        Ok(())
    }

    fn build_client(&self) -> Result<StoreClient> {
        std::fs::create_dir_all(&self.upload_dir)?;
        let store = LocalFileSystem::new_with_prefix(&self.upload_dir)?.with_automatic_cleanup(true);

        Ok(StoreClient::new(store, self.base_url()?))
    }

    fn upload_settings(&self) -> UploadSettings {
        UploadSettings {
            prefix: self.prefix.clone(),
            // Attributes are not supported by the local filesystem store.
            object_attributes: false,
            ..UploadSettings::default()
        }
    }
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}

fn default_backend_url() -> String {
    DEFAULT_BACKEND_URL.to_string()
}
