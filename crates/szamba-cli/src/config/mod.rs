//! CLI configuration management.
//!
//! This module defines the complete CLI configuration hierarchy:
//!
//! ```text
//! Cli
//! ├── storage: StorageConfig   # Backend selection, Azure and local options
//! └── command: Command         # upload | delete | presign | download
//! ```
//!
//! All configuration can be provided via CLI arguments or environment variables.
//! Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! # Upload with explicit credentials
//! szamba-file --azure-account-name shop --azure-account-key "..." upload photo.png
//!
//! # Or via environment variables
//! AZURE_STORAGE_ACCOUNT_NAME=shop AZURE_STORAGE_ACCOUNT_KEY="..." szamba-file upload photo.png
//! ```

mod storage;

use std::process;

use clap::Parser;
pub use storage::{StorageBackend, StorageConfig};

use crate::command::Command;
use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "szamba-file")]
#[command(about = "Manage files in the Szamba storefront storage")]
#[command(version)]
pub struct Cli {
    /// Storage backend configuration.
    #[clap(flatten)]
    pub storage: StorageConfig,

    /// Operation to run.
    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments, so its variables
    /// act as defaults for every `env`-backed option.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Logs build information and configuration (no sensitive information).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            arch = std::env::consts::ARCH,
            os = std::env::consts::OS,
            features = ?Self::enabled_features(),
            "Build information"
        );

        self.storage.log();

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            command = self.command.name(),
            "Command selected"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clap::CommandFactory;
    use szamba_file::providers::ProviderConfig;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn azure_defaults() {
        let cli = Cli::try_parse_from([
            "szamba-file",
            "--azure-account-name",
            "shop",
            "--azure-account-key",
            "ZGV2c3RvcmVhY2NvdW50MS1rZXk=",
            "presign",
            "medusa/a-1.txt",
        ])
        .unwrap();

        assert_eq!(cli.storage.backend, StorageBackend::AzureBlob);
        let ProviderConfig::AzureBlob(options) = cli.storage.provider_config() else {
            panic!("expected azure_blob config");
        };
        assert_eq!(options.account_name.as_deref(), Some("shop"));
        assert_eq!(options.container_name, "uploads");
        assert_eq!(options.prefix.as_deref(), Some("medusa"));
        assert_eq!(options.cache_control, "public, max-age=31536000");
        assert_eq!(options.download_url_duration, 3600);
        assert!(matches!(cli.command, Command::Presign { ref key } if key == "medusa/a-1.txt"));
    }

    #[test]
    fn local_backend_selection() {
        let cli = Cli::try_parse_from([
            "szamba-file",
            "--storage-backend",
            "local",
            "--local-upload-dir",
            "/tmp/uploads",
            "--local-prefix",
            "dev",
            "delete",
            "a",
            "b",
        ])
        .unwrap();

        let ProviderConfig::Local(options) = cli.storage.provider_config() else {
            panic!("expected local config");
        };
        assert_eq!(options.upload_dir, PathBuf::from("/tmp/uploads"));
        assert_eq!(options.prefix.as_deref(), Some("dev"));
        assert!(matches!(cli.command, Command::Delete { ref keys } if keys.len() == 2));
    }

    #[test]
    fn delete_requires_a_key() {
        assert!(Cli::try_parse_from(["szamba-file", "delete"]).is_err());
    }
}
