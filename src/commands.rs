use std::process::Child;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::core::acquire::{Acquisition, Orchestrator};
use crate::core::config::LauncherConfig;
use crate::core::downloader::HttpFetcher;
use crate::core::error::LauncherResult;
use crate::core::events::EventSink;
use crate::core::http::build_http_client;
use crate::core::launch::{plan_launch, spawn_game};
use crate::core::version::VersionType;

#[derive(Debug, Serialize)]
pub struct MinecraftVersionInfo {
    pub id: String,
    pub release_time: String,
    pub version_type: VersionType,
}

fn http_orchestrator(config: &LauncherConfig, events: EventSink) -> LauncherResult<Orchestrator> {
    let client = build_http_client(&config.user_agent)?;
    Ok(Orchestrator::new(
        config.clone(),
        Arc::new(HttpFetcher::new(client)),
        events,
    ))
}

/// Every version in the index, newest first, demos excluded.
pub async fn list_versions(config: &LauncherConfig) -> LauncherResult<Vec<MinecraftVersionInfo>> {
    let orchestrator = http_orchestrator(config, EventSink::disabled())?;
    let index = orchestrator.fetch_version_index().await?;

    let versions = index
        .versions
        .into_iter()
        .filter(|entry| !entry.id.to_ascii_lowercase().contains("demo"))
        .map(|entry| MinecraftVersionInfo {
            id: entry.id,
            release_time: entry.release_time,
            version_type: entry.version_type,
        })
        .collect();

    Ok(versions)
}

/// Acquire every file the configured version needs.
pub async fn download(config: &LauncherConfig, events: EventSink) -> LauncherResult<Acquisition> {
    http_orchestrator(config, events)?.acquire().await
}

/// Acquire, then start the game. Refuses to start while any file failed.
///
/// `Ok(None)` means the process could not be spawned; the reason was
/// emitted on `events`.
pub async fn launch(config: &LauncherConfig, events: EventSink) -> LauncherResult<Option<Child>> {
    let orchestrator = http_orchestrator(config, events.clone())?;
    let acquisition = orchestrator.acquire().await?;

    if let Err(e) = acquisition.report.ensure_complete() {
        warn!("Not launching {}: {}", acquisition.manifest.id, e);
        return Err(e);
    }

    let plan = plan_launch(config, &acquisition, orchestrator.platform());
    info!(
        "Launching {} (main class {})",
        acquisition.manifest.id, acquisition.manifest.main_class
    );
    Ok(spawn_game(&plan, &events))
}
