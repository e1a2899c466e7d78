//! Upload request and the handle returned for a stored file.

use serde::{Deserialize, Serialize};
use url::Url;

use super::{FileContent, FileKey};

/// A single upload, as handed over by the caller.
#[derive(Debug)]
pub struct UploadRequest {
    /// Original filename, normalised into the storage key.
    pub filename: String,
    /// The bytes to store.
    pub content: FileContent,
    /// MIME type recorded on the stored object.
    pub mime_type: String,
}

impl UploadRequest {
    /// Creates a new upload request.
    pub fn new(
        filename: impl Into<String>,
        content: impl Into<FileContent>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Result of a successful upload. The caller persists it; providers keep no state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredFile {
    /// Publicly resolvable URL of the object.
    pub url: Url,
    /// Storage key to pass to later delete/read/presign calls.
    pub key: FileKey,
}
