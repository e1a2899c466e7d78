//! File storage error types.

/// Specialized [`Result`] type for file storage operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while configuring or using a file provider.
#[derive(Debug, thiserror::Error)]
#[must_use = "errors should be handled appropriately"]
pub enum Error {
    /// Required option missing or malformed.
    ///
    /// Raised while validating backend options, before any client is built.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage key rejected by the object path rules.
    #[error("invalid file key '{key}': {reason}")]
    InvalidKey {
        /// The offending key.
        key: String,
        /// Why the key was rejected.
        reason: String,
    },

    /// Object does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Backend answered a read without a readable body.
    #[error("failed to get stream for file {0}")]
    MissingBody(String),

    /// Reading the caller-supplied upload stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Any other failure reported by the object store.
    #[error("object store error: {0}")]
    Store(object_store::Error),
}

impl Error {
    /// Creates a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Creates a new invalid key error.
    pub fn invalid_key(key: impl Into<String>, reason: impl ToString) -> Self {
        Self::InvalidKey {
            key: key.into(),
            reason: reason.to_string(),
        }
    }

    /// Creates a new missing body error for `key`.
    pub fn missing_body(key: impl Into<String>) -> Self {
        Self::MissingBody(key.into())
    }

    /// Returns whether this error indicates a configuration issue.
    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns whether this error indicates a missing object.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

impl From<object_store::Error> for Error {
    fn from(err: object_store::Error) -> Self {
        match err {
            object_store::Error::NotFound { path, .. } => Self::NotFound(path),
            other => Self::Store(other),
        }
    }
}
