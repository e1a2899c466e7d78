//! Keys to delete, given one at a time or as a batch.

use super::FileKey;

/// One or more storage keys to delete.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteRequest(Vec<String>);

impl DeleteRequest {
    /// Returns the keys in request order.
    pub fn keys(&self) -> &[String] {
        &self.0
    }

    /// Returns the number of keys.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there is nothing to delete.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for DeleteRequest {
    fn from(key: &str) -> Self {
        Self(vec![key.to_owned()])
    }
}

impl From<String> for DeleteRequest {
    fn from(key: String) -> Self {
        Self(vec![key])
    }
}

impl From<FileKey> for DeleteRequest {
    fn from(key: FileKey) -> Self {
        Self(vec![key.into()])
    }
}

impl From<Vec<String>> for DeleteRequest {
    fn from(keys: Vec<String>) -> Self {
        Self(keys)
    }
}

impl From<&[&str]> for DeleteRequest {
    fn from(keys: &[&str]) -> Self {
        keys.iter().copied().collect()
    }
}

impl<S: Into<String>> FromIterator<S> for DeleteRequest {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}
