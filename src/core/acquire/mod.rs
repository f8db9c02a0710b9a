// ─── Acquisition Orchestrator ───
// Turns a configured version into a populated game directory.
//
// Stages run strictly in sequence:
//   manifest → critical file → assets → libraries → logging config → mods
// Concurrency only exists inside the asset, library and mod stages, where
// each missing file becomes one pool task. Anything already on disk is
// skipped, so an interrupted run is resumed by simply running again.

mod assets;
mod libraries;
mod report;

use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::core::assets::AssetIndex;
use crate::core::config::{probe_file, GameLayout, LauncherConfig, LoaderConfig};
use crate::core::downloader::{Fetcher, RetryingTransport};
use crate::core::error::LauncherResult;
use crate::core::events::{AcquireEvent, EventSink, Stage};
use crate::core::loaders::{fetch_fabric_overlay, transform_manifest};
use crate::core::mods::{fetch_remote_config, sync_mods, RemoteConfig};
use crate::core::version::{Platform, VersionJson, VersionManifest};

pub use report::{AcquisitionReport, StageReport};

/// Shared, cheaply cloned state every stage works from.
pub(crate) struct StageContext {
    pub(crate) transport: RetryingTransport,
    pub(crate) layout: GameLayout,
    pub(crate) platform: Platform,
    pub(crate) events: EventSink,
    pub(crate) capacity: usize,
}

/// The result of a full run: the manifest to launch with and what happened.
#[derive(Debug)]
pub struct Acquisition {
    pub manifest: VersionJson,
    pub critical_jar: PathBuf,
    pub report: AcquisitionReport,
}

pub struct Orchestrator {
    config: LauncherConfig,
    ctx: StageContext,
}

impl Orchestrator {
    pub fn new(config: LauncherConfig, fetcher: Arc<dyn Fetcher>, events: EventSink) -> Self {
        let transport = RetryingTransport::new(fetcher, events.clone())
            .with_retry_policy(config.max_tries, config.retry_delay());
        let ctx = StageContext {
            transport,
            layout: config.layout(),
            platform: Platform::current(),
            events,
            capacity: config.parallel_downloads,
        };
        Self { config, ctx }
    }

    /// Evaluate rules and classifiers for another platform.
    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.ctx.platform = platform;
        self
    }

    pub fn config(&self) -> &LauncherConfig {
        &self.config
    }

    pub fn layout(&self) -> &GameLayout {
        &self.ctx.layout
    }

    pub fn platform(&self) -> &Platform {
        &self.ctx.platform
    }

    pub fn transport(&self) -> &RetryingTransport {
        &self.ctx.transport
    }

    /// Fetch the global version index into its cache file.
    pub async fn fetch_version_index(&self) -> LauncherResult<VersionManifest> {
        info!("Fetching version index from {}", self.config.version_manifest_url);
        let index: VersionManifest = self
            .ctx
            .transport
            .fetch_json(
                &self.config.version_manifest_url,
                &self.ctx.layout.version_manifest_cache(),
            )
            .await?;
        info!("Loaded {} versions from index", index.versions.len());
        Ok(index)
    }

    /// Resolve the manifest the rest of the run uses.
    ///
    /// The detail document comes from the index entry (or the custom URL),
    /// libraries without an artifact get one synthesized, and a loader
    /// overlay, if any, is merged in and synthesized again.
    pub async fn resolve_manifest(&self, loader: Option<&LoaderConfig>) -> LauncherResult<VersionJson> {
        let version = &self.config.version;
        let detail_url = match &self.config.custom_version_url {
            Some(url) => {
                debug!("Using custom version URL {}", url);
                url.clone()
            }
            None => {
                let index = self.fetch_version_index().await?;
                index.require_version(version)?.url.clone()
            }
        };

        let detail: VersionJson = self
            .ctx
            .transport
            .fetch_json(&detail_url, &self.ctx.layout.version_json(version))
            .await?;
        let base_url = &self.config.libraries_base_url;
        let manifest = detail.with_synthesized_artifacts(base_url)?;

        let Some(loader) = loader else {
            return Ok(manifest);
        };

        let overlay =
            fetch_fabric_overlay(&self.ctx.transport, &self.ctx.layout, loader, version).await?;
        let merged = transform_manifest(&manifest, &overlay).with_synthesized_artifacts(base_url)?;
        info!(
            "Applied {:?} {} overlay: main class {}, {} libraries",
            loader.kind,
            loader.version,
            merged.main_class,
            merged.libraries.len()
        );
        Ok(merged)
    }

    /// Download the client jar to `versions/<version>.jar` unless present.
    /// Failure here aborts the run.
    async fn download_critical(&self, manifest: &VersionJson) -> LauncherResult<(PathBuf, StageReport)> {
        let client = manifest.client_download()?;
        let dest = self.ctx.layout.version_jar(&self.config.version);
        let mut report = StageReport::new(Stage::CriticalFile, 1);

        if probe_file(&dest).await? {
            debug!("Client jar already present at {:?}", dest);
            report.skipped = 1;
        } else {
            self.ctx.transport.download(&client.url, &dest).await?;
            report.fetched = 1;
        }
        Ok((dest, report))
    }

    async fn fetch_asset_index(&self, manifest: &VersionJson) -> LauncherResult<AssetIndex> {
        let info = manifest.asset_index_info()?;
        let index: AssetIndex = self
            .ctx
            .transport
            .fetch_json(&info.url, &self.ctx.layout.asset_index(&info.id))
            .await?;
        debug!("Asset index {} lists {} objects", info.id, index.objects.len());
        Ok(index)
    }

    /// Fetch the client logging config into the game root unless present.
    async fn download_logging(&self, manifest: &VersionJson) -> LauncherResult<StageReport> {
        let Some(logging) = manifest.client_logging() else {
            return Ok(StageReport::new(Stage::Logging, 0));
        };

        let mut report = StageReport::new(Stage::Logging, 1);
        let dest = self.ctx.layout.logging_file(&logging.file.id);
        if probe_file(&dest).await? {
            report.skipped = 1;
        } else {
            self.ctx.transport.download(&logging.file.url, &dest).await?;
            report.fetched = 1;
        }
        Ok(report)
    }

    fn begin_stage(&self, stage: Stage) {
        info!("Stage {} started", stage);
        self.ctx.events.emit(AcquireEvent::StageStarted { stage });
    }

    fn end_stage(&self, run: &mut AcquisitionReport, report: StageReport) {
        let failures = report.failures.len();
        if failures == 0 {
            info!(
                "Stage {} finished: {} fetched, {} already present",
                report.stage, report.fetched, report.skipped
            );
        } else {
            warn!(
                "Stage {} finished with {} failures ({} fetched, {} already present)",
                report.stage, failures, report.fetched, report.skipped
            );
        }
        self.ctx.events.emit(AcquireEvent::StageFinished {
            stage: report.stage,
            failures,
        });
        run.push(report);
    }

    async fn load_remote_config(&self) -> LauncherResult<Option<RemoteConfig>> {
        match &self.config.remote_config_url {
            Some(url) => Ok(Some(
                fetch_remote_config(&self.ctx.transport, &self.ctx.layout, url).await?,
            )),
            None => Ok(None),
        }
    }

    /// Run every stage in order.
    ///
    /// Manifest-shape and resource-state errors abort the run. Individual
    /// file failures inside a pooled stage do not; they are collected in the
    /// returned report.
    pub async fn acquire(&self) -> LauncherResult<Acquisition> {
        let mut run = AcquisitionReport::begin(&self.config.version);
        info!(
            "Acquiring {} into {:?} ({} download slots, {} tries per file)",
            self.config.version,
            self.ctx.layout.root(),
            self.ctx.capacity,
            self.ctx.transport.max_tries()
        );
        self.ctx.layout.prepare().await?;

        let remote = self.load_remote_config().await?;
        let loader = remote
            .as_ref()
            .and_then(|r| r.loader_override(self.config.loader.as_ref()))
            .or_else(|| self.config.loader.clone());

        self.begin_stage(Stage::Manifest);
        let manifest = self.resolve_manifest(loader.as_ref()).await?;
        let mut manifest_report = StageReport::new(Stage::Manifest, 1);
        manifest_report.fetched = 1;
        self.end_stage(&mut run, manifest_report);

        self.begin_stage(Stage::CriticalFile);
        let (critical_jar, critical_report) = self.download_critical(&manifest).await?;
        self.end_stage(&mut run, critical_report);

        self.begin_stage(Stage::Assets);
        let index = self.fetch_asset_index(&manifest).await?;
        let assets_report =
            assets::download_assets(&self.ctx, &index, &self.config.assets_base_url).await?;
        self.end_stage(&mut run, assets_report);

        self.begin_stage(Stage::Libraries);
        let libraries_report = libraries::download_libraries(&self.ctx, &manifest).await?;
        self.end_stage(&mut run, libraries_report);

        self.begin_stage(Stage::Logging);
        let logging_report = self.download_logging(&manifest).await?;
        self.end_stage(&mut run, logging_report);

        if let Some(mods) = remote.as_ref().and_then(|r| r.mods.as_deref()) {
            self.begin_stage(Stage::Mods);
            let mods_report = sync_mods(&self.ctx, mods, self.config.prune_removed_mods).await?;
            self.end_stage(&mut run, mods_report);
        }

        run.finish();
        if run.is_complete() {
            info!("Acquisition of {} complete in {}", manifest.id, run.elapsed());
        } else {
            warn!(
                "Acquisition of {} finished with {} failed files; run again to resume",
                manifest.id,
                run.failure_count()
            );
        }

        Ok(Acquisition {
            manifest,
            critical_jar,
            report: run,
        })
    }
}
