use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::core::error::{LauncherError, LauncherResult};
use crate::core::events::{AcquireEvent, EventSink};

/// Archive metadata directory; never extracted regardless of the library's
/// own exclusion list.
pub const METADATA_PREFIX: &str = "META-INF/";

/// Path-prefix filter taken from a library's `extract` directive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractFilter {
    pub include: Vec<String>,
    pub exclude: Vec<String>,
}

impl ExtractFilter {
    pub fn excluding(exclude: Vec<String>) -> Self {
        Self {
            include: Vec::new(),
            exclude,
        }
    }

    /// An entry is kept when it is not under the metadata directory, matches
    /// no exclusion prefix, and (if an include list exists) matches one of
    /// the include prefixes.
    pub fn accepts(&self, name: &str) -> bool {
        if name.starts_with(METADATA_PREFIX) {
            return false;
        }
        if self.exclude.iter().any(|prefix| name.starts_with(prefix.as_str())) {
            return false;
        }
        self.include.is_empty() || self.include.iter().any(|prefix| name.starts_with(prefix.as_str()))
    }
}

/// Unpack `archive` into `target_dir`, honoring `filter`.
///
/// Entries with an empty name are directory placeholders and are skipped.
/// An `Extracting` event is emitted before each entry is written. Returns the
/// number of files written; an empty archive returns `0` without events.
pub async fn extract_archive(
    archive: &Path,
    target_dir: &Path,
    filter: &ExtractFilter,
    events: &EventSink,
) -> LauncherResult<usize> {
    let archive = archive.to_path_buf();
    let target_dir = target_dir.to_path_buf();
    let filter = filter.clone();
    let events = events.clone();

    tokio::task::spawn_blocking(move || extract_blocking(&archive, &target_dir, &filter, &events))
        .await?
}

fn extract_blocking(
    archive_path: &Path,
    target_dir: &Path,
    filter: &ExtractFilter,
    events: &EventSink,
) -> LauncherResult<usize> {
    let file = std::fs::File::open(archive_path).map_err(|e| LauncherError::io(archive_path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    if archive.is_empty() {
        return Ok(0);
    }
    debug!("Extracting {} entries from {:?}", archive.len(), archive_path);

    let mut written = 0;
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        let name = entry.name().to_string();

        if name.is_empty() || !filter.accepts(&name) {
            continue;
        }

        let Some(relative) = entry.enclosed_name() else {
            warn!("Skipping archive entry with unsafe path: {}", name);
            continue;
        };
        let dest: PathBuf = target_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest).map_err(|e| LauncherError::io(&dest, e))?;
            continue;
        }

        events.emit(AcquireEvent::Extracting {
            archive: archive_path.to_path_buf(),
            entry: name,
        });

        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent).map_err(|e| LauncherError::io(parent, e))?;
        }
        let mut out = std::fs::File::create(&dest).map_err(|e| LauncherError::io(&dest, e))?;
        std::io::copy(&mut entry, &mut out).map_err(|e| LauncherError::io(&dest, e))?;
        written += 1;
    }

    Ok(written)
}
