use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::Fetcher;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::EventSink;

pub const DEFAULT_MAX_TRIES: u32 = 10;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(2500);

/// Wraps a single-attempt [`Fetcher`] with a fixed retry budget.
///
/// Cheap to clone; every pool task carries its own copy.
#[derive(Clone)]
pub struct RetryingTransport {
    inner: Arc<dyn Fetcher>,
    events: EventSink,
    max_tries: u32,
    delay: Duration,
}

impl RetryingTransport {
    pub fn new(inner: Arc<dyn Fetcher>, events: EventSink) -> Self {
        Self {
            inner,
            events,
            max_tries: DEFAULT_MAX_TRIES,
            delay: DEFAULT_RETRY_DELAY,
        }
    }

    /// `max_tries` below one is raised to one.
    pub fn with_retry_policy(mut self, max_tries: u32, delay: Duration) -> Self {
        self.max_tries = max_tries.max(1);
        self.delay = delay;
        self
    }

    pub fn max_tries(&self) -> u32 {
        self.max_tries
    }

    pub fn events(&self) -> &EventSink {
        &self.events
    }

    /// Copy `url` to `dest`, retrying failed attempts after a fixed delay.
    ///
    /// Each attempt rewrites `dest` from scratch. After `max_tries` failures
    /// the last error is returned wrapped in `RetriesExhausted`.
    pub async fn download(&self, url: &str, dest: &Path) -> LauncherResult<()> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.inner.fetch(url, dest, &self.events).await {
                Ok(()) => {
                    if attempt > 1 {
                        debug!("{} succeeded on attempt {}", url, attempt);
                    }
                    return Ok(());
                }
                Err(error) if attempt >= self.max_tries => {
                    return Err(LauncherError::RetriesExhausted {
                        url: url.to_string(),
                        attempts: attempt,
                        source: Box::new(error),
                    });
                }
                Err(error) => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}",
                        attempt, self.max_tries, url, error
                    );
                    tokio::time::sleep(self.delay).await;
                }
            }
        }
    }

    /// Download a document to `cache_path` and parse it from disk.
    pub async fn fetch_json<T: DeserializeOwned>(
        &self,
        url: &str,
        cache_path: &Path,
    ) -> LauncherResult<T> {
        self.download(url, cache_path).await?;
        read_json(cache_path).await
    }
}

/// Parse a JSON document already present on disk.
pub(crate) async fn read_json<T: DeserializeOwned>(path: &Path) -> LauncherResult<T> {
    let raw = tokio::fs::read(path)
        .await
        .map_err(|e| LauncherError::io(path, e))?;
    Ok(serde_json::from_slice(&raw)?)
}
