// ─── Launcher Configuration ───
// Read-only JSON configuration. Every field has a default so a partial (or
// missing) file is valid.

mod paths;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::core::assets::RESOURCES_URL;
use crate::core::downloader::{DEFAULT_MAX_TRIES, DEFAULT_RETRY_DELAY};
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::http::DEFAULT_USER_AGENT;
use crate::core::maven::MOJANG_LIBRARIES;
use crate::core::version::VERSION_MANIFEST_URL;

pub use paths::{default_game_directory, GameLayout};
pub(crate) use paths::{ensure_dir, probe_file};

pub const FABRIC_META_URL: &str = "https://meta.fabricmc.net/v2";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoaderKind {
    Fabric,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoaderConfig {
    pub kind: LoaderKind,
    /// Loader version, e.g. `0.15.0`.
    pub version: String,
    #[serde(default = "default_fabric_meta")]
    pub meta_url: String,
}

fn default_fabric_meta() -> String {
    FABRIC_META_URL.to_string()
}

impl LoaderConfig {
    pub fn fabric(version: impl Into<String>) -> Self {
        Self {
            kind: LoaderKind::Fabric,
            version: version.into(),
            meta_url: default_fabric_meta(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LauncherConfig {
    pub version: String,
    /// Detail document URL that bypasses the version index.
    pub custom_version_url: Option<String>,
    pub game_directory: PathBuf,
    pub java_path: Option<PathBuf>,
    /// Accepted for compatibility; downloads are never hash-checked.
    pub hash_checks: bool,

    pub parallel_downloads: usize,
    pub max_tries: u32,
    pub retry_delay_ms: u64,
    pub user_agent: String,

    pub initial_memory_mb: u64,
    pub max_memory_mb: u64,
    pub custom_jvm_args: Vec<String>,
    pub custom_game_args: Vec<String>,
    pub lang: String,

    pub username: String,
    pub uuid: Option<String>,
    pub access_token: Option<String>,
    pub user_type: String,

    pub version_manifest_url: String,
    pub libraries_base_url: String,
    pub assets_base_url: String,

    pub loader: Option<LoaderConfig>,
    pub remote_config_url: Option<String>,
    pub prune_removed_mods: bool,
    /// `host[:port]` to join on startup.
    pub server: Option<String>,
}

impl Default for LauncherConfig {
    fn default() -> Self {
        Self {
            version: "1.8.9".into(),
            custom_version_url: None,
            game_directory: default_game_directory(),
            java_path: None,
            hash_checks: true,
            parallel_downloads: 8,
            max_tries: DEFAULT_MAX_TRIES,
            retry_delay_ms: DEFAULT_RETRY_DELAY.as_millis() as u64,
            user_agent: DEFAULT_USER_AGENT.into(),
            initial_memory_mb: 256,
            max_memory_mb: 4000,
            custom_jvm_args: Vec::new(),
            custom_game_args: Vec::new(),
            lang: "en-US".into(),
            username: "steve".into(),
            uuid: None,
            access_token: None,
            user_type: "mojang".into(),
            version_manifest_url: VERSION_MANIFEST_URL.into(),
            libraries_base_url: MOJANG_LIBRARIES.into(),
            assets_base_url: RESOURCES_URL.into(),
            loader: None,
            remote_config_url: None,
            prune_removed_mods: true,
            server: None,
        }
    }
}

impl LauncherConfig {
    /// Load and validate the config at `path`. A missing file yields the
    /// defaults.
    pub fn load(path: &Path) -> LauncherResult<Self> {
        let config = match std::fs::read_to_string(path) {
            Ok(raw) => {
                info!("Loading config from {:?}", path);
                serde_json::from_str::<Self>(&raw)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No config at {:?}, using defaults", path);
                Self::default()
            }
            Err(e) => return Err(LauncherError::io(path, e)),
        };

        config.validate()?;
        if config.hash_checks {
            debug!("hash_checks is set; downloads are not hash-verified");
        }
        Ok(config)
    }

    pub fn validate(&self) -> LauncherResult<()> {
        if self.parallel_downloads == 0 {
            return Err(LauncherError::InvalidConfig(
                "parallel_downloads must be at least 1".into(),
            ));
        }
        if self.max_tries == 0 {
            return Err(LauncherError::InvalidConfig(
                "max_tries must be at least 1".into(),
            ));
        }
        if self.initial_memory_mb > self.max_memory_mb {
            return Err(LauncherError::InvalidConfig(format!(
                "initial_memory_mb ({}) exceeds max_memory_mb ({})",
                self.initial_memory_mb, self.max_memory_mb
            )));
        }
        let name_len = self.username.chars().count();
        if !(3..=16).contains(&name_len) {
            return Err(LauncherError::InvalidConfig(format!(
                "username must be 3 to 16 characters, got {name_len}"
            )));
        }
        if self.version.trim().is_empty() {
            return Err(LauncherError::InvalidConfig("version is empty".into()));
        }
        Ok(())
    }

    pub fn layout(&self) -> GameLayout {
        GameLayout::new(&self.game_directory)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// The `--server`/`--port` pair for auto-connect, if configured.
    pub fn server_address(&self) -> Option<(String, Option<u16>)> {
        let raw = self.server.as_deref()?.trim();
        if raw.is_empty() {
            return None;
        }
        match raw.rsplit_once(':') {
            Some((host, port)) => match port.parse::<u16>() {
                Ok(port) => Some((host.to_string(), Some(port))),
                Err(_) => Some((raw.to_string(), None)),
            },
            None => Some((raw.to_string(), None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = LauncherConfig::default();
        config.validate().unwrap();
        assert_eq!(config.parallel_downloads, 8);
        assert_eq!(config.max_tries, 10);
        assert_eq!(config.retry_delay(), Duration::from_millis(2500));
        assert!(config.game_directory.ends_with(".minecraft_alt"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = LauncherConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.version, "1.8.9");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(
            &path,
            r#"{"version": "1.20.4", "username": "Alex", "loader": {"kind": "fabric", "version": "0.15.0"}}"#,
        )
        .unwrap();

        let config = LauncherConfig::load(&path).unwrap();
        assert_eq!(config.version, "1.20.4");
        assert_eq!(config.username, "Alex");
        assert_eq!(config.lang, "en-US");
        assert_eq!(config.loader, Some(LoaderConfig::fabric("0.15.0")));
    }

    #[test]
    fn validation_rejects_bad_values() {
        let mut config = LauncherConfig::default();
        config.parallel_downloads = 0;
        assert!(config.validate().is_err());

        let mut config = LauncherConfig::default();
        config.initial_memory_mb = 8000;
        assert!(config.validate().is_err());

        let mut config = LauncherConfig::default();
        config.username = "ab".into();
        assert!(matches!(
            config.validate(),
            Err(LauncherError::InvalidConfig(_))
        ));
    }

    #[test]
    fn server_address_parsing() {
        let mut config = LauncherConfig::default();
        assert_eq!(config.server_address(), None);

        config.server = Some("play.example.net:25570".into());
        assert_eq!(
            config.server_address(),
            Some(("play.example.net".into(), Some(25570)))
        );

        config.server = Some("play.example.net".into());
        assert_eq!(config.server_address(), Some(("play.example.net".into(), None)));
    }
}
