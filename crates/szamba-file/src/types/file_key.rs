//! Storage keys and the timestamped key generator.

use std::sync::atomic::{AtomicI64, Ordering};

use derive_more::Display;
use object_store::path::Path;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Validated key of an object inside the configured container.
///
/// The key text is the object's literal name: it is stored as-is and only
/// percent-encoded when rendered into a URL.
#[derive(Clone, Debug, Display, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FileKey(Path);

impl FileKey {
    /// Parses `key`, rejecting empty keys and keys that are not valid object paths
    /// (empty segments, `.` or `..` segments). Leading and trailing `/` are dropped.
    pub fn parse(key: impl Into<String>) -> Result<Self> {
        let key = key.into();
        match Path::parse(&key) {
            Ok(path) if path.as_ref().is_empty() => {
                Err(Error::invalid_key(key, "key must not be empty"))
            }
            Ok(path) => Ok(Self(path)),
            Err(err) => Err(Error::invalid_key(key, err)),
        }
    }

    /// Returns the key as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        self.0.as_ref()
    }

    /// Returns the object-store path for this key.
    pub fn to_path(&self) -> Path {
        self.0.clone()
    }
}

impl AsRef<str> for FileKey {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl From<FileKey> for String {
    fn from(key: FileKey) -> Self {
        key.0.into()
    }
}

impl TryFrom<String> for FileKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl TryFrom<&str> for FileKey {
    type Error = Error;

    fn try_from(value: &str) -> Result<Self> {
        Self::parse(value)
    }
}

/// Inserts `-<millis>` between the base name and the extension.
///
/// `photo.png` becomes `photo-<millis>.png`. Only the last dot separates the
/// extension, so `archive.tar.gz` becomes `archive.tar-<millis>.gz`. Names
/// without an extension (or dotfiles such as `.env`) get the suffix appended.
pub fn normalize_filename(filename: &str, millis: i64) -> String {
    match filename.rsplit_once('.') {
        Some((name, extension)) if !name.is_empty() => format!("{name}-{millis}.{extension}"),
        _ => format!("{filename}-{millis}"),
    }
}

/// Derives unique storage keys for uploads.
///
/// Millisecond timestamps handed out by one generator never decrease, even if
/// the wall clock steps backwards between calls.
#[derive(Debug, Default)]
pub struct KeyGenerator {
    prefix: Option<String>,
    last_millis: AtomicI64,
}

impl KeyGenerator {
    /// Creates a generator that places keys under `prefix`.
    ///
    /// Surrounding slashes are ignored and an empty prefix means none.
    pub fn new(prefix: Option<&str>) -> Self {
        let prefix = prefix
            .map(|p| p.trim_matches('/'))
            .filter(|p| !p.is_empty())
            .map(str::to_owned);

        Self {
            prefix,
            last_millis: AtomicI64::new(0),
        }
    }

    /// Returns the configured prefix, if any.
    pub fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    /// Derives the key for `filename` using the current time.
    pub fn generate(&self, filename: &str) -> Result<FileKey> {
        let now = jiff::Timestamp::now().as_millisecond();
        self.generate_at(filename, now)
    }

    /// Derives the key for `filename` as if the clock read `millis`.
    pub fn generate_at(&self, filename: &str, millis: i64) -> Result<FileKey> {
        let millis = self.advance(millis);
        let filename = normalize_filename(filename, millis);

        match &self.prefix {
            Some(prefix) => FileKey::parse(format!("{prefix}/{filename}")),
            None => FileKey::parse(filename),
        }
    }

    fn advance(&self, millis: i64) -> i64 {
        let previous = self.last_millis.fetch_max(millis, Ordering::AcqRel);
        previous.max(millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_inserts_timestamp_before_extension() {
        assert_eq!(normalize_filename("photo.png", 42), "photo-42.png");
        assert_eq!(normalize_filename("archive.tar.gz", 7), "archive.tar-7.gz");
    }

    #[test]
    fn normalize_without_extension() {
        assert_eq!(normalize_filename("README", 5), "README-5");
        assert_eq!(normalize_filename(".env", 5), ".env-5");
    }

    #[test]
    fn prefix_is_joined_with_slash() {
        let keys = KeyGenerator::new(Some("medusa"));
        let key = keys.generate_at("a.txt", 1_700_000_000_000).unwrap();
        assert_eq!(key.as_str(), "medusa/a-1700000000000.txt");
    }

    #[test]
    fn empty_or_slashed_prefix() {
        let keys = KeyGenerator::new(Some("/"));
        assert_eq!(keys.prefix(), None);
        assert_eq!(keys.generate_at("a.txt", 1).unwrap().as_str(), "a-1.txt");

        let keys = KeyGenerator::new(Some("/uploads/"));
        assert_eq!(keys.generate_at("a.txt", 1).unwrap().as_str(), "uploads/a-1.txt");
    }

    #[test]
    fn timestamps_never_decrease() {
        let keys = KeyGenerator::new(None);
        let first = keys.generate_at("a.txt", 2_000).unwrap();
        let second = keys.generate_at("a.txt", 1_000).unwrap();
        assert_eq!(first.as_str(), "a-2000.txt");
        assert_eq!(second.as_str(), "a-2000.txt");

        let third = keys.generate_at("a.txt", 3_000).unwrap();
        assert_eq!(third.as_str(), "a-3000.txt");
    }

    #[test]
    fn sequential_keys_are_distinct() {
        let keys = KeyGenerator::new(Some("medusa"));
        let first = keys.generate("photo.png").unwrap();
        std::thread::sleep(std::time::Duration::from_millis(2));
        let second = keys.generate("photo.png").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn parse_rejects_bad_keys() {
        assert!(FileKey::parse("").is_err());
        assert!(FileKey::parse("medusa//a.txt").is_err());
        assert!(FileKey::parse("medusa/../a.txt").is_err());
        assert!(FileKey::parse("/").is_err());
        assert!(FileKey::parse("medusa/a-1.txt").is_ok());
    }

    #[test]
    fn special_characters_are_kept_literally() {
        for raw in ["medusa/50%-1.png", "medusa/a#1-1.png", "medusa/x[1]-1.png"] {
            let key = FileKey::parse(raw).unwrap();
            assert_eq!(key.as_str(), raw);
            assert_eq!(key.to_path().as_ref(), raw);
            assert_eq!(String::from(key), raw);
        }
    }

    #[test]
    fn key_deserializes_with_validation() {
        let key: FileKey = serde_json::from_str("\"medusa/a-1.txt\"").unwrap();
        assert_eq!(key.as_str(), "medusa/a-1.txt");

        assert!(serde_json::from_str::<FileKey>("\"a/../b\"").is_err());
    }
}
