//! Request and response types of the file-provider contract.

mod delete;
mod file_content;
mod file_key;
mod upload;

pub use delete::DeleteRequest;
pub use file_content::{ByteStream, DownloadStream, FileContent};
pub use file_key::{FileKey, KeyGenerator, normalize_filename};
pub use upload::{StoredFile, UploadRequest};
