// ─── Overlay Transformer ───
// Merges a loader-produced partial manifest into a base version manifest.

use serde::Deserialize;

use crate::core::version::version_file::{Arguments, Library, VersionJson, VersionType};

/// A loader profile: the same shape as a version manifest, every field
/// optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OverlayManifest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub version_type: Option<VersionType>,
    #[serde(default)]
    pub time: Option<String>,
    #[serde(default)]
    pub release_time: Option<String>,
    #[serde(default)]
    pub main_class: Option<String>,
    #[serde(default)]
    pub arguments: Option<Arguments>,
    #[serde(default)]
    pub libraries: Option<Vec<Library>>,
}

fn present(value: &Option<String>) -> Option<&String> {
    value.as_ref().filter(|s| !s.is_empty())
}

/// Produce the manifest used for download and launch.
///
/// - `arguments.game`/`arguments.jvm` are concatenated (base first), but only
///   when both sides carry the structured form.
/// - `mainClass`, `type`, `id`, `time` and `releaseTime` take the overlay's
///   value when present (non-empty), else the base's.
/// - `libraries` is the base list followed by the overlay's, with no
///   de-duplication.
///
/// The result shares nothing with either input.
pub fn transform_manifest(base: &VersionJson, overlay: &OverlayManifest) -> VersionJson {
    let mut merged = base.clone();

    if let (Some(base_args), Some(overlay_args)) = (&base.arguments, &overlay.arguments) {
        merged.arguments = Some(Arguments {
            game: base_args
                .game
                .iter()
                .chain(&overlay_args.game)
                .cloned()
                .collect(),
            jvm: base_args
                .jvm
                .iter()
                .chain(&overlay_args.jvm)
                .cloned()
                .collect(),
        });
    }

    if let Some(main_class) = present(&overlay.main_class) {
        merged.main_class = main_class.clone();
    }
    if let Some(id) = present(&overlay.id) {
        merged.id = id.clone();
    }
    if overlay.version_type.is_some() {
        merged.version_type = overlay.version_type;
    }
    if let Some(time) = present(&overlay.time) {
        merged.time = Some(time.clone());
    }
    if let Some(release_time) = present(&overlay.release_time) {
        merged.release_time = Some(release_time.clone());
    }
    if let Some(libraries) = &overlay.libraries {
        merged.libraries.extend(libraries.iter().cloned());
    }

    merged
}
