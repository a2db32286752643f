//! Artifact download.
//!
//! Fetched-at-runtime artifacts carry no checksum and no version pin; every
//! run takes whatever the remote currently serves, exactly as the original
//! did. The only validation is the HTTP status, checked before the
//! destination file is opened so a failed fetch cannot truncate a previous
//! run's copy.

use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

use vmboot_types::ArtifactSpec;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to build HTTP client: {0}")]
    Client(reqwest::Error),
    #[error("request to {url} failed: {source}")]
    Request { url: String, source: reqwest::Error },
    #[error("{url} answered {status}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },
    #[error("failed writing {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    pub fn new(timeout: Option<Duration>) -> Result<Self, FetchError> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("vmboot/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(FetchError::Client)?;
        Ok(Self { client })
    }

    /// Download one artifact into `dest_dir`, overwriting any previous copy.
    pub async fn fetch(
        &self,
        artifact: &ArtifactSpec,
        dest_dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let response = self
            .client
            .get(&artifact.url)
            .send()
            .await
            .map_err(|source| FetchError::Request {
                url: artifact.url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: artifact.url.clone(),
                status,
            });
        }

        let path = dest_dir.join(&artifact.filename);
        let mut file = tokio::fs::File::create(&path)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|source| FetchError::Request {
                url: artifact.url.clone(),
                source,
            })?;
            file.write_all(&chunk)
                .await
                .map_err(|source| FetchError::Io {
                    path: path.clone(),
                    source,
                })?;
        }
        file.flush().await.map_err(|source| FetchError::Io {
            path: path.clone(),
            source,
        })?;

        tracing::info!(url = %artifact.url, path = %path.display(), "artifact downloaded");
        Ok(path)
    }
}
