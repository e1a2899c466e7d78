//! Convenience re-exports.

pub use crate::client::StoreClient;
pub use crate::providers::{
    AzureBlobOptions, BackendOptions, FileProvider, LocalOptions, ObjectFileProvider,
    ProviderConfig,
};
pub use crate::types::{DeleteRequest, FileContent, FileKey, StoredFile, UploadRequest};
pub use crate::{Error, Result};
