use std::path::Path;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use tokio::io::AsyncWriteExt;
use tracing::debug;

use super::Fetcher;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{AcquireEvent, EventSink, FileProgress};

/// Single-attempt streaming HTTP fetcher.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    /// Stream `url` into `dest`, creating parent directories as needed.
    ///
    /// Emits one progress event once the response headers arrive and one per
    /// received chunk. Nothing is verified against the declared hash.
    async fn fetch(&self, url: &str, dest: &Path, events: &EventSink) -> LauncherResult<()> {
        if let Some(parent) = dest.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| LauncherError::io(parent, e))?;
        }

        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LauncherError::DownloadFailed {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let total = response.content_length();
        let progress = |received: u64, just_received: u64| {
            events.emit(AcquireEvent::FileProgress(FileProgress {
                url: url.to_string(),
                path: dest.to_path_buf(),
                total,
                received,
                just_received,
            }));
        };
        progress(0, 0);

        // Write inside a block so the handle is dropped before returning.
        {
            let mut file = tokio::fs::File::create(dest)
                .await
                .map_err(|e| LauncherError::io(dest, e))?;

            let mut received = 0u64;
            let mut body = response.bytes_stream();
            while let Some(chunk) = body.next().await {
                let chunk = chunk?;
                file.write_all(&chunk)
                    .await
                    .map_err(|e| LauncherError::io(dest, e))?;
                received += chunk.len() as u64;
                progress(received, chunk.len() as u64);
            }

            file.flush().await.map_err(|e| LauncherError::io(dest, e))?;
        }

        debug!("Downloaded: {} -> {:?}", url, dest);
        Ok(())
    }
}
