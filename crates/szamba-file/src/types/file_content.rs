//! Upload payloads and download streams.

use std::fmt;
use std::io;

use bytes::Bytes;
use futures::stream::BoxStream;

/// Stream of chunks supplied by the caller for streaming uploads.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

/// Stream of chunks returned by [`get_as_stream`](crate::providers::FileProvider::get_as_stream).
pub type DownloadStream = BoxStream<'static, crate::Result<Bytes>>;

/// Content of an upload, tagged by how the caller holds it.
///
/// Buffers and text are sent in a single request, streams are uploaded in
/// parts as they are read.
pub enum FileContent {
    /// In-memory byte buffer.
    Buffer(Bytes),
    /// String payload, stored as its UTF-8 bytes.
    Text(String),
    /// Readable byte stream.
    Stream(ByteStream),
}

impl FileContent {
    /// Wraps a readable byte stream.
    pub fn stream<S>(stream: S) -> Self
    where
        S: futures::Stream<Item = io::Result<Bytes>> + Send + 'static,
    {
        Self::Stream(Box::pin(stream))
    }

    /// Returns the variant name, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Buffer(_) => "buffer",
            Self::Text(_) => "text",
            Self::Stream(_) => "stream",
        }
    }

    /// Returns the payload size if it is known up front.
    pub fn len_hint(&self) -> Option<usize> {
        match self {
            Self::Buffer(data) => Some(data.len()),
            Self::Text(text) => Some(text.len()),
            Self::Stream(_) => None,
        }
    }
}

impl From<Bytes> for FileContent {
    fn from(data: Bytes) -> Self {
        Self::Buffer(data)
    }
}

impl From<Vec<u8>> for FileContent {
    fn from(data: Vec<u8>) -> Self {
        Self::Buffer(data.into())
    }
}

impl From<&'static [u8]> for FileContent {
    fn from(data: &'static [u8]) -> Self {
        Self::Buffer(Bytes::from_static(data))
    }
}

impl From<String> for FileContent {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for FileContent {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl fmt::Debug for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileContent")
            .field("kind", &self.kind())
            .field("len", &self.len_hint())
            .finish()
    }
}
