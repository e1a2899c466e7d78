//! File provider trait and storage backends.

mod azure;
mod config;
mod local;
mod object;
mod provider;

pub use azure::AzureBlobOptions;
pub use config::ProviderConfig;
pub use local::LocalOptions;
pub use object::ObjectFileProvider;
pub use provider::{BackendOptions, FileProvider, UploadSettings};
