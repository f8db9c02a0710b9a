// ─── Version File ───
// Per-version detail document: libraries, arguments, downloads, logging.

use std::collections::HashMap;

use serde::Deserialize;
use tracing::debug;

use super::platform::{rules_allow, Platform, Rule};
use crate::core::downloader::ExtractFilter;
use crate::core::error::{LauncherError, LauncherResult};
use crate::core::maven::MavenArtifact;

/// A fully parsed version detail document.
///
/// Fetched once per run and then only ever replaced wholesale (by artifact
/// synthesis or an overlay merge), never edited in place.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionJson {
    pub id: String,
    #[serde(default, rename = "type")]
    pub version_type: Option<VersionType>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub release_time: Option<String>,
    pub main_class: String,
    /// Legacy space-separated argument string.
    #[serde(default)]
    pub minecraft_arguments: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub libraries: Vec<Library>,
    #[serde(default)]
    pub downloads: Option<VersionDownloads>,
    #[serde(default)]
    pub asset_index: Option<AssetIndexInfo>,
    #[serde(default)]
    pub assets: Option<String>,
    #[serde(default)]
    pub logging: Option<LoggingInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionType {
    Release,
    Snapshot,
    OldAlpha,
    OldBeta,
    #[serde(other)]
    Other,
}

impl VersionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VersionType::Release => "release",
            VersionType::Snapshot => "snapshot",
            VersionType::OldAlpha => "old_alpha",
            VersionType::OldBeta => "old_beta",
            VersionType::Other => "other",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VersionDownloads {
    #[serde(default)]
    pub client: Option<DownloadArtifact>,
    #[serde(default)]
    pub server: Option<DownloadArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DownloadArtifact {
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetIndexInfo {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub total_size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingInfo {
    #[serde(default)]
    pub client: Option<LoggingConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// JVM argument with a `${path}` placeholder for the config file.
    pub argument: String,
    pub file: LoggingFile,
    #[serde(default, rename = "type")]
    pub config_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingFile {
    pub id: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

// ─── Arguments ───

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct Arguments {
    #[serde(default)]
    pub game: Vec<ArgumentValue>,
    #[serde(default)]
    pub jvm: Vec<ArgumentValue>,
}

/// One entry of a structured argument list. Conditional entries are kept
/// as parsed; only plain strings reach the command line.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum ArgumentValue {
    Plain(String),
    Conditional {
        rules: Vec<Rule>,
        value: serde_json::Value,
    },
}

impl ArgumentValue {
    pub fn as_plain(&self) -> Option<&str> {
        match self {
            ArgumentValue::Plain(s) => Some(s),
            ArgumentValue::Conditional { .. } => None,
        }
    }
}

// ─── Libraries ───

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Library {
    /// `group:artifact:version` coordinate.
    pub name: String,
    /// Repository base for libraries that only carry a coordinate.
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub downloads: LibraryDownloads,
    #[serde(default)]
    pub rules: Vec<Rule>,
    /// OS name → classifier key, possibly containing `${arch}`.
    #[serde(default)]
    pub natives: Option<HashMap<String, String>>,
    #[serde(default)]
    pub extract: Option<ExtractRules>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct LibraryDownloads {
    #[serde(default)]
    pub artifact: Option<LibraryArtifact>,
    #[serde(default)]
    pub classifiers: HashMap<String, LibraryArtifact>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LibraryArtifact {
    /// Install path relative to the libraries directory.
    pub path: String,
    pub url: String,
    #[serde(default)]
    pub sha1: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ExtractRules {
    #[serde(default)]
    pub exclude: Vec<String>,
    #[serde(default)]
    pub include: Vec<String>,
}

impl Library {
    pub fn applies_to(&self, platform: &Platform) -> bool {
        rules_allow(&self.rules, platform)
    }

    /// The native classifier artifact for `platform`, probing candidate keys
    /// in priority order.
    pub fn native_artifact(&self, platform: &Platform) -> Option<(String, &LibraryArtifact)> {
        if self.downloads.classifiers.is_empty() {
            return None;
        }
        platform
            .native_classifier_candidates(self.natives.as_ref())
            .into_iter()
            .find_map(|key| {
                let artifact = self.downloads.classifiers.get(&key)?;
                Some((key, artifact))
            })
    }

    pub fn extract_filter(&self) -> Option<ExtractFilter> {
        self.extract.as_ref().map(|rules| ExtractFilter {
            include: rules.include.clone(),
            exclude: rules.exclude.clone(),
        })
    }

    /// Fill in a missing plain artifact from the coordinate.
    ///
    /// Native-only libraries (a `natives` map and no artifact) are left
    /// untouched; they have no plain jar to fetch.
    fn synthesize_artifact(&mut self, default_base: &str) -> LauncherResult<()> {
        if self.downloads.artifact.is_some() || self.natives.is_some() {
            return Ok(());
        }

        let coordinate = MavenArtifact::parse(&self.name)?;
        let base = self.url.as_deref().unwrap_or(default_base);
        let path = coordinate.relative_path();
        let url = coordinate.url(base);
        debug!("Synthesized artifact for {}: {}", self.name, url);

        self.downloads.artifact = Some(LibraryArtifact {
            path,
            url,
            sha1: None,
            size: None,
        });
        Ok(())
    }
}

impl VersionJson {
    /// A copy in which every library without a concrete artifact gets one
    /// derived from its coordinate under `default_base` (or the library's
    /// own `url`).
    pub fn with_synthesized_artifacts(&self, default_base: &str) -> LauncherResult<Self> {
        let mut resolved = self.clone();
        for library in &mut resolved.libraries {
            library.synthesize_artifact(default_base)?;
        }
        Ok(resolved)
    }

    /// Libraries that apply to `platform`, in manifest order.
    pub fn applicable_libraries<'a>(
        &'a self,
        platform: &'a Platform,
    ) -> impl Iterator<Item = &'a Library> + 'a {
        self.libraries.iter().filter(move |lib| lib.applies_to(platform))
    }

    /// Game argument tokens before templating: the plain-string entries of
    /// `arguments.game` when the structured form exists, else the legacy
    /// string split on whitespace.
    pub fn game_argument_tokens(&self) -> Vec<String> {
        match &self.arguments {
            Some(args) => args
                .game
                .iter()
                .filter_map(ArgumentValue::as_plain)
                .map(str::to_string)
                .collect(),
            None => self
                .minecraft_arguments
                .as_deref()
                .map(|s| s.split_whitespace().map(str::to_string).collect())
                .unwrap_or_default(),
        }
    }

    /// The client download, required for the critical-file stage.
    pub fn client_download(&self) -> LauncherResult<&DownloadArtifact> {
        self.downloads
            .as_ref()
            .and_then(|d| d.client.as_ref())
            .ok_or_else(|| LauncherError::MissingField {
                document: format!("version {}", self.id),
                field: "downloads.client",
            })
    }

    pub fn asset_index_info(&self) -> LauncherResult<&AssetIndexInfo> {
        self.asset_index
            .as_ref()
            .ok_or_else(|| LauncherError::MissingField {
                document: format!("version {}", self.id),
                field: "assetIndex",
            })
    }

    pub fn client_logging(&self) -> Option<&LoggingConfig> {
        self.logging.as_ref().and_then(|l| l.client.as_ref())
    }
}
