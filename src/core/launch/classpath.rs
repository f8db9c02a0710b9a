use std::path::Path;

use crate::core::config::GameLayout;
use crate::core::version::{Platform, VersionJson};

/// Platform-specific Java classpath separator.
pub fn get_classpath_separator() -> &'static str {
    if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    }
}

/// Every applicable library's plain artifact (manifest order) followed by
/// the critical jar, joined with the platform separator.
pub fn build_classpath(
    manifest: &VersionJson,
    layout: &GameLayout,
    platform: &Platform,
    critical_jar: &Path,
) -> String {
    let mut entries: Vec<String> = manifest
        .applicable_libraries(platform)
        .filter_map(|lib| lib.downloads.artifact.as_ref())
        .map(|artifact| safe_path_str(&layout.library(&artifact.path)))
        .collect();
    entries.push(safe_path_str(critical_jar));

    dedup_preserving_order(&mut entries);
    entries.join(get_classpath_separator())
}

fn dedup_preserving_order(entries: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    entries.retain(|entry| {
        let key = if cfg!(target_os = "windows") {
            entry.to_lowercase()
        } else {
            entry.clone()
        };
        seen.insert(key)
    });
}

/// Convert path to string, using `\\?\` prefix on Windows for long path support.
pub fn safe_path_str(path: &Path) -> String {
    let resolved = std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let text = resolved.to_string_lossy().to_string();

    #[cfg(target_os = "windows")]
    {
        // Java classpath handling can fail for Windows extended-length paths
        // (e.g. `\\?\C:\...`). Strip the prefix before building arguments.
        if let Some(stripped) = text.strip_prefix(r"\\?\") {
            return stripped.to_string();
        }
    }

    text
}
