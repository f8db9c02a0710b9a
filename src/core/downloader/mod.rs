mod archive;
mod client;
mod retry;

use std::path::Path;

use async_trait::async_trait;

use crate::core::error::LauncherResult;
use crate::core::events::EventSink;

pub use archive::{extract_archive, ExtractFilter, METADATA_PREFIX};
pub use client::HttpFetcher;
pub use retry::{RetryingTransport, DEFAULT_MAX_TRIES, DEFAULT_RETRY_DELAY};
pub(crate) use retry::read_json;

/// One attempt at copying `url` to `dest`.
///
/// Implementations must (re)create `dest` from offset zero so a retried
/// attempt overwrites whatever a failed one left behind.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &str, dest: &Path, events: &EventSink) -> LauncherResult<()>;
}
