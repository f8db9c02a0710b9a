use std::path::{Path, PathBuf};

use crate::core::error::{LauncherError, LauncherResult};

const GAME_DIR_NAME: &str = ".minecraft_alt";

/// `<home>/.minecraft_alt`, or a relative directory when no home exists.
pub fn default_game_directory() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(GAME_DIR_NAME)
}

/// Every path the acquisition pipeline reads or writes, rooted at the game
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameLayout {
    root: PathBuf,
}

impl GameLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn assets_dir(&self) -> PathBuf {
        self.root.join("assets")
    }

    pub fn asset_indexes_dir(&self) -> PathBuf {
        self.assets_dir().join("indexes")
    }

    pub fn asset_index(&self, id: &str) -> PathBuf {
        self.asset_indexes_dir().join(format!("{id}.json"))
    }

    pub fn objects_dir(&self) -> PathBuf {
        self.assets_dir().join("objects")
    }

    pub fn object_shard_dir(&self, shard: &str) -> PathBuf {
        self.objects_dir().join(shard)
    }

    pub fn object(&self, shard: &str, hash: &str) -> PathBuf {
        self.object_shard_dir(shard).join(hash)
    }

    pub fn libraries_dir(&self) -> PathBuf {
        self.root.join("libraries")
    }

    /// `relative` is a `/`-separated artifact path from a manifest.
    pub fn library(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.libraries_dir(), |path, segment| path.join(segment))
    }

    pub fn versions_dir(&self) -> PathBuf {
        self.root.join("versions")
    }

    /// Cached copy of the global version index.
    pub fn version_manifest_cache(&self) -> PathBuf {
        self.versions_dir().join("version_manifest.json")
    }

    pub fn version_json(&self, id: &str) -> PathBuf {
        self.versions_dir().join(format!("{id}.json"))
    }

    pub fn version_jar(&self, id: &str) -> PathBuf {
        self.versions_dir().join(format!("{id}.jar"))
    }

    /// `versions/<mc>-<loader>/`
    pub fn loader_dir(&self, game_version: &str, loader_version: &str) -> PathBuf {
        self.versions_dir()
            .join(format!("{game_version}-{loader_version}"))
    }

    /// `versions/<mc>-<loader>/<mc>-<loader>.json`
    pub fn loader_json(&self, game_version: &str, loader_version: &str) -> PathBuf {
        self.loader_dir(game_version, loader_version)
            .join(format!("{game_version}-{loader_version}.json"))
    }

    /// Extracted native binaries.
    pub fn natives_dir(&self) -> PathBuf {
        self.root.join("bin")
    }

    pub fn mods_dir(&self) -> PathBuf {
        self.root.join("mods")
    }

    /// Logging configs live directly under the root, keyed by file id.
    pub fn logging_file(&self, id: &str) -> PathBuf {
        self.root.join(id)
    }

    pub fn remote_config_cache(&self) -> PathBuf {
        self.root.join("remote_config.json")
    }

    /// Create the fixed directory skeleton. An existing non-directory at any
    /// of these paths is an error.
    pub async fn prepare(&self) -> LauncherResult<()> {
        for dir in [
            self.root.clone(),
            self.assets_dir(),
            self.asset_indexes_dir(),
            self.objects_dir(),
            self.libraries_dir(),
            self.versions_dir(),
            self.natives_dir(),
            self.mods_dir(),
        ] {
            ensure_dir(&dir).await?;
        }
        Ok(())
    }
}

/// Create `path` (and parents) unless it is already a directory.
pub(crate) async fn ensure_dir(path: &Path) -> LauncherResult<()> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_dir() => Ok(()),
        Ok(_) => Err(LauncherError::WrongEntryType {
            path: path.to_path_buf(),
            expected: "directory",
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => tokio::fs::create_dir_all(path)
            .await
            .map_err(|e| LauncherError::io(path, e)),
        Err(e) => Err(LauncherError::io(path, e)),
    }
}

/// Whether a regular file exists at `path`.
///
/// Absence is `false`; a directory in its place is a resource-state error.
pub(crate) async fn probe_file(path: &Path) -> LauncherResult<bool> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(true),
        Ok(_) => Err(LauncherError::WrongEntryType {
            path: path.to_path_buf(),
            expected: "file",
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(LauncherError::io(path, e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_paths() {
        let layout = GameLayout::new("/games/mc");
        assert_eq!(
            layout.object("ab", "ab12"),
            PathBuf::from("/games/mc/assets/objects/ab/ab12")
        );
        assert_eq!(
            layout.library("org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar"),
            PathBuf::from("/games/mc/libraries/org/lwjgl/lwjgl/3.3.3/lwjgl-3.3.3.jar")
        );
        assert_eq!(
            layout.loader_json("1.20.4", "0.15.0"),
            PathBuf::from("/games/mc/versions/1.20.4-0.15.0/1.20.4-0.15.0.json")
        );
        assert_eq!(layout.version_jar("1.8.9"), PathBuf::from("/games/mc/versions/1.8.9.jar"));
        assert_eq!(
            layout.logging_file("client-1.7.xml"),
            PathBuf::from("/games/mc/client-1.7.xml")
        );
    }

    #[tokio::test]
    async fn prepare_creates_skeleton_and_is_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let layout = GameLayout::new(dir.path().join("game"));

        layout.prepare().await.unwrap();
        layout.prepare().await.unwrap();

        for sub in ["assets/indexes", "assets/objects", "libraries", "versions", "bin", "mods"] {
            assert!(layout.root().join(sub).is_dir(), "{sub} missing");
        }
    }

    #[tokio::test]
    async fn prepare_rejects_file_in_place_of_directory() {
        let dir = tempfile::tempdir().unwrap();
        let layout = GameLayout::new(dir.path());
        std::fs::write(dir.path().join("bin"), b"oops").unwrap();

        let err = layout.prepare().await.unwrap_err();
        assert!(matches!(
            err,
            LauncherError::WrongEntryType { expected: "directory", .. }
        ));
    }

    #[tokio::test]
    async fn probe_file_distinguishes_entry_kinds() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("f");
        std::fs::write(&file, b"x").unwrap();

        assert!(probe_file(&file).await.unwrap());
        assert!(!probe_file(&dir.path().join("missing")).await.unwrap());
        assert!(probe_file(dir.path()).await.is_err());
    }
}
