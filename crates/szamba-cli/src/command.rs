//! Subcommands mapping one-to-one onto the file provider operations.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Subcommand;
use futures::TryStreamExt;
use szamba_file::providers::FileProvider;
use szamba_file::types::{DeleteRequest, FileContent, StoredFile, UploadRequest};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::io::ReaderStream;
use url::Url;

use crate::TRACING_TARGET_COMMAND;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Operation to run against the configured provider.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Upload a file and print its key and URL as JSON
    Upload {
        /// File to upload
        path: PathBuf,
        /// MIME type stored with the file
        #[arg(long, default_value = DEFAULT_CONTENT_TYPE)]
        content_type: String,
        /// Filename to derive the key from (defaults to the file's name)
        #[arg(long)]
        name: Option<String>,
        /// Read the whole file into memory instead of streaming it
        #[arg(long)]
        buffered: bool,
    },
    /// Delete one or more files; absent keys are ignored
    Delete {
        /// Storage keys to delete
        #[arg(required = true)]
        keys: Vec<String>,
    },
    /// Print a time-limited, read-only download URL
    Presign {
        /// Storage key
        key: String,
    },
    /// Download a file to a path or stdout
    Download {
        /// Storage key
        key: String,
        /// Destination file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Read the whole object into memory instead of streaming it
        #[arg(long)]
        buffered: bool,
    },
}

/// What a command produced.
#[derive(Debug)]
pub enum Outcome {
    /// A file was stored.
    Uploaded(StoredFile),
    /// Keys were deleted.
    Deleted(usize),
    /// A presigned URL was generated.
    Presigned(Url),
    /// An object was written to the output.
    Downloaded(u64),
}

impl Command {
    /// Returns the subcommand name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Upload { .. } => "upload",
            Self::Delete { .. } => "delete",
            Self::Presign { .. } => "presign",
            Self::Download { .. } => "download",
        }
    }

    /// Runs the command against `provider`.
    pub async fn execute(self, provider: &dyn FileProvider) -> anyhow::Result<Outcome> {
        match self {
            Self::Upload {
                path,
                content_type,
                name,
                buffered,
            } => {
                let filename = match name {
                    Some(name) => name,
                    None => file_name(&path)?,
                };
                let content = read_content(&path, buffered).await?;

                let stored = provider
                    .upload(UploadRequest::new(filename, content, content_type))
                    .await
                    .with_context(|| format!("failed to upload {}", path.display()))?;
                Ok(Outcome::Uploaded(stored))
            }
            Self::Delete { keys } => {
                let count = keys.len();
                provider
                    .delete(DeleteRequest::from(keys))
                    .await
                    .context("failed to delete files")?;
                Ok(Outcome::Deleted(count))
            }
            Self::Presign { key } => {
                let url = provider
                    .presigned_download_url(&key)
                    .await
                    .with_context(|| format!("failed to presign {key}"))?;
                Ok(Outcome::Presigned(url))
            }
            Self::Download {
                key,
                output,
                buffered,
            } => {
                let mut writer = open_output(output.as_deref()).await?;
                let written = download(provider, &key, &mut writer, buffered)
                    .await
                    .with_context(|| format!("failed to download {key}"))?;
                writer.flush().await?;
                Ok(Outcome::Downloaded(written))
            }
        }
    }
}

impl Outcome {
    /// Prints the result for the user. Downloads already wrote their payload.
    pub fn report(&self) -> anyhow::Result<()> {
        match self {
            Self::Uploaded(stored) => println!("{}", serde_json::to_string_pretty(stored)?),
            Self::Presigned(url) => println!("{url}"),
            Self::Deleted(count) => tracing::info!(
                target: TRACING_TARGET_COMMAND,
                count,
                "files deleted"
            ),
            Self::Downloaded(bytes) => tracing::info!(
                target: TRACING_TARGET_COMMAND,
                bytes,
                "file downloaded"
            ),
        }
        Ok(())
    }
}

fn file_name(path: &Path) -> anyhow::Result<String> {
    match path.file_name().and_then(|n| n.to_str()) {
        Some(name) => Ok(name.to_owned()),
        None => bail!("cannot derive a filename from {}", path.display()),
    }
}

async fn read_content(path: &Path, buffered: bool) -> anyhow::Result<FileContent> {
    if buffered {
        let data = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        return Ok(FileContent::from(data));
    }

    let file = tokio::fs::File::open(path)
        .await
        .with_context(|| format!("failed to open {}", path.display()))?;
    Ok(FileContent::stream(ReaderStream::new(file)))
}

async fn open_output(
    output: Option<&Path>,
) -> anyhow::Result<Box<dyn AsyncWrite + Send + Unpin>> {
    match output {
        Some(path) => {
            let file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Box::new(file))
        }
        None => Ok(Box::new(tokio::io::stdout())),
    }
}

async fn download<W>(
    provider: &dyn FileProvider,
    key: &str,
    writer: &mut W,
    buffered: bool,
) -> anyhow::Result<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    if buffered {
        let data = provider.get_as_buffer(key).await?;
        writer.write_all(&data).await?;
        return Ok(data.len() as u64);
    }

    let mut stream = provider.get_as_stream(key).await?;
    let mut written = 0u64;
    while let Some(chunk) = stream.try_next().await? {
        writer.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    Ok(written)
}
