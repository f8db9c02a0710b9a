// ─── Remote Config & Mod Sync ───
// A server-published document naming the loader and the mod set every
// client should run. Sync downloads what is missing and prunes what the
// list no longer names.

use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::core::acquire::{StageContext, StageReport};
use crate::core::config::{probe_file, GameLayout, LoaderConfig, LoaderKind, FABRIC_META_URL};
use crate::core::downloader::RetryingTransport;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::Stage;
use crate::core::pool::{TaskFailure, WorkerPool};

const DISABLED_SUFFIX: &str = ".disabled";
const CUSTOM_MARKER: &str = ".custom.";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RemoteConfig {
    #[serde(default)]
    pub loader: Option<String>,
    #[serde(default, rename = "loaderID")]
    pub loader_id: Option<String>,
    /// `None` leaves the mods directory alone; an empty list clears it.
    #[serde(default)]
    pub mods: Option<Vec<RemoteMod>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteMod {
    pub name: String,
    pub filename: String,
    pub url: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl RemoteConfig {
    /// The loader this document asks for, if it names a supported one.
    ///
    /// Keeps the locally configured meta endpoint when there is one.
    pub fn loader_override(&self, local: Option<&LoaderConfig>) -> Option<LoaderConfig> {
        let loader = self.loader.as_deref()?;
        let version = self.loader_id.as_deref().filter(|v| !v.is_empty())?;
        if !loader.eq_ignore_ascii_case("fabric") {
            warn!("Remote config names unsupported loader {:?}", loader);
            return None;
        }
        let meta_url = local
            .filter(|l| l.kind == LoaderKind::Fabric)
            .map(|l| l.meta_url.clone())
            .unwrap_or_else(|| FABRIC_META_URL.to_string());
        Some(LoaderConfig {
            kind: LoaderKind::Fabric,
            version: version.to_string(),
            meta_url,
        })
    }
}

/// Fetch the remote config through the retry budget, caching it under the
/// game directory.
pub async fn fetch_remote_config(
    transport: &RetryingTransport,
    layout: &GameLayout,
    url: &str,
) -> LauncherResult<RemoteConfig> {
    info!("Fetching remote config from {}", url);
    let config: RemoteConfig = transport
        .fetch_json(url, &layout.remote_config_cache())
        .await?;
    debug!(
        "Remote config: loader={:?} loader_id={:?} mods={:?}",
        config.loader,
        config.loader_id,
        config.mods.as_ref().map(Vec::len)
    );
    Ok(config)
}

/// A filename that stays inside the mods directory.
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
}

/// Download every listed mod not already present as `<file>` or
/// `<file>.disabled`, then optionally prune unlisted files.
pub(crate) async fn sync_mods(
    ctx: &StageContext,
    mods: &[RemoteMod],
    prune: bool,
) -> LauncherResult<StageReport> {
    let total = mods.len();
    let mut report = StageReport::new(Stage::Mods, total);
    let mods_dir = ctx.layout.mods_dir();
    ctx.events.progress(Stage::Mods, total, 0);

    let mut pool = WorkerPool::new(ctx.capacity);
    let completed = Arc::new(AtomicUsize::new(0));
    let mut submitted = 0;
    let mut rejected = Vec::new();

    for entry in mods {
        if !is_plain_file_name(&entry.filename) {
            rejected.push(TaskFailure {
                label: entry.name.clone(),
                error: LauncherError::InvalidConfig(format!(
                    "mod filename {:?} is not a plain file name",
                    entry.filename
                )),
            });
            continue;
        }

        let dest = mods_dir.join(&entry.filename);
        let disabled = mods_dir.join(format!("{}{DISABLED_SUFFIX}", entry.filename));
        if probe_file(&dest).await? || probe_file(&disabled).await? {
            report.skipped += 1;
            continue;
        }

        let url = entry.url.clone();
        let transport = ctx.transport.clone();
        let events = ctx.events.clone();
        let completed = Arc::clone(&completed);
        pool.submit(entry.name.as_str(), async move {
            transport.download(&url, &dest).await?;
            let current = completed.fetch_add(1, Ordering::SeqCst) + 1;
            events.progress(Stage::Mods, total, current);
            Ok(())
        })
        .await?;
        submitted += 1;
    }

    pool.join().await;
    report.settle(submitted, pool.drain_failures());
    report.failures.extend(rejected);

    if prune {
        let keep: HashSet<&str> = mods.iter().map(|m| m.filename.as_str()).collect();
        let removed = prune_mods(&mods_dir, &keep).await?;
        if removed > 0 {
            info!("Removed {} mods no longer listed", removed);
        }
    }

    Ok(report)
}

/// Delete regular files in `mods_dir` that `keep` does not name.
/// `*.disabled` files and names containing `.custom.` are always kept.
pub async fn prune_mods(mods_dir: &Path, keep: &HashSet<&str>) -> LauncherResult<usize> {
    let mut entries = match tokio::fs::read_dir(mods_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => return Err(LauncherError::io(mods_dir, e)),
    };

    let mut removed = 0;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| LauncherError::io(mods_dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| LauncherError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }

        let name = entry.file_name().to_string_lossy().into_owned();
        if keep.contains(name.as_str())
            || name.ends_with(DISABLED_SUFFIX)
            || name.contains(CUSTOM_MARKER)
        {
            continue;
        }

        let path = entry.path();
        debug!("Pruning mod {:?}", path);
        tokio::fs::remove_file(&path)
            .await
            .map_err(|e| LauncherError::io(&path, e))?;
        removed += 1;
    }

    Ok(removed)
}
