use tracing::{debug, info};

use super::overlay::OverlayManifest;
use crate::core::config::{probe_file, GameLayout, LoaderConfig};
use crate::core::downloader::{read_json, RetryingTransport};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::FABRIC_MAVEN;
use crate::core::version::version_file::{Library, LibraryDownloads};

pub fn fabric_profile_url(meta_url: &str, game_version: &str, loader_version: &str) -> String {
    format!(
        "{}/versions/loader/{}/{}/profile/json",
        meta_url.trim_end_matches('/'),
        game_version,
        loader_version
    )
}

/// Load the Fabric launch profile for `game_version`, reusing the cached copy
/// under `versions/<mc>-<loader>/` when one exists.
pub async fn fetch_fabric_overlay(
    transport: &RetryingTransport,
    layout: &GameLayout,
    loader: &LoaderConfig,
    game_version: &str,
) -> LauncherResult<OverlayManifest> {
    let cache = layout.loader_json(game_version, &loader.version);

    let mut profile: OverlayManifest = if probe_file(&cache).await? {
        debug!("Using cached Fabric profile {:?}", cache);
        read_json(&cache).await?
    } else {
        let url = fabric_profile_url(&loader.meta_url, game_version, &loader.version);
        info!(
            "Fetching Fabric {} profile for Minecraft {}",
            loader.version, game_version
        );
        transport
            .fetch_json(&url, &cache)
            .await
            .map_err(|e| LauncherError::LoaderApi(format!("{url}: {e}")))?
    };

    if profile.main_class.as_deref().map_or(true, str::is_empty) {
        return Err(LauncherError::LoaderApi(
            "Fabric profile missing mainClass".into(),
        ));
    }

    ensure_loader_artifact(&mut profile, &loader.version);
    Ok(profile)
}

/// Some profiles omit the loader jar itself; add it so it reaches the
/// classpath.
fn ensure_loader_artifact(profile: &mut OverlayManifest, loader_version: &str) {
    let loader_coord = format!("net.fabricmc:fabric-loader:{}", loader_version);
    let libraries = profile.libraries.get_or_insert_with(Vec::new);
    if libraries.iter().any(|lib| lib.name == loader_coord) {
        return;
    }
    libraries.push(Library {
        name: loader_coord,
        url: Some(FABRIC_MAVEN.to_string()),
        downloads: LibraryDownloads::default(),
        rules: Vec::new(),
        natives: None,
        extract: None,
    });
}
