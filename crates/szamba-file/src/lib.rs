#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging
pub const TRACING_TARGET_CLIENT: &str = "szamba_file::client";
pub const TRACING_TARGET_PROVIDER: &str = "szamba_file::provider";

/// Cloneable object-store handle used by every backend.
pub mod client;
mod error;
/// Provider trait and storage backends.
pub mod providers;
/// Request and response types of the file-provider contract.
pub mod types;

#[doc(hidden)]
pub mod prelude;

pub use crate::error::{Error, Result};
