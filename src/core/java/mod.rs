// ─── Java Discovery ───
// Picks the java binary used to launch the game. No runtime is downloaded.

use std::path::{Path, PathBuf};

use tracing::debug;

fn java_exe() -> &'static str {
    if cfg!(windows) {
        "java.exe"
    } else {
        "java"
    }
}

/// Well-known install locations for the current OS, most preferred first.
fn platform_candidates() -> Vec<PathBuf> {
    let candidates: &[&str] = if cfg!(target_os = "windows") {
        &[
            "C:\\Program Files\\Java\\jre1.8.0_351\\bin\\java.exe",
            "C:\\Program Files\\Eclipse Adoptium\\jre-8\\bin\\java.exe",
            "C:\\Program Files (x86)\\Minecraft Launcher\\runtime\\jre-legacy\\windows-x64\\jre-legacy\\bin\\java.exe",
            "C:\\Program Files\\Java\\jdk-17\\bin\\java.exe",
        ]
    } else if cfg!(target_os = "macos") {
        &[
            "/Library/Internet Plug-Ins/JavaAppletPlugin.plugin/Contents/Home/bin/java",
            "/Library/Java/JavaVirtualMachines/temurin-8.jre/Contents/Home/bin/java",
            "/opt/homebrew/opt/openjdk/bin/java",
            "/usr/bin/java",
        ]
    } else {
        &[
            "/usr/lib/jvm/java-8-openjdk/jre/bin/java",
            "/usr/lib/jvm/java-8-openjdk-amd64/jre/bin/java",
            "/usr/lib/jvm/default-java/bin/java",
            "/usr/bin/java",
        ]
    };
    candidates.iter().map(PathBuf::from).collect()
}

/// Resolve the java binary: the configured path, then `$JAVA_HOME/bin/java`,
/// then the first existing platform candidate, then bare `java` for a PATH
/// lookup.
pub fn guess_java_path(configured: Option<&Path>) -> PathBuf {
    let java_home = std::env::var_os("JAVA_HOME").map(PathBuf::from);
    pick_java_path(configured, java_home.as_deref(), &platform_candidates())
}

fn pick_java_path(
    configured: Option<&Path>,
    java_home: Option<&Path>,
    candidates: &[PathBuf],
) -> PathBuf {
    if let Some(path) = configured {
        debug!("Using configured java {:?}", path);
        return path.to_path_buf();
    }

    if let Some(home) = java_home {
        let java = home.join("bin").join(java_exe());
        if java.is_file() {
            debug!("Using JAVA_HOME java {:?}", java);
            return java;
        }
    }

    if let Some(found) = candidates.iter().find(|c| c.is_file()) {
        debug!("Using java found at {:?}", found);
        return found.clone();
    }

    PathBuf::from(java_exe())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn configured_path_wins() {
        let picked = pick_java_path(Some(Path::new("/opt/java/bin/java")), None, &[]);
        assert_eq!(picked, PathBuf::from("/opt/java/bin/java"));
    }

    #[test]
    fn java_home_before_candidates() {
        let dir = tempfile::tempdir().unwrap();
        let bin = dir.path().join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        std::fs::write(bin.join(java_exe()), b"").unwrap();
        let other = dir.path().join("other-java");
        std::fs::write(&other, b"").unwrap();

        let picked = pick_java_path(None, Some(dir.path()), &[other.clone()]);
        assert_eq!(picked, bin.join(java_exe()));

        let picked = pick_java_path(None, Some(&dir.path().join("missing")), &[other.clone()]);
        assert_eq!(picked, other);
    }

    #[test]
    fn falls_back_to_path_lookup() {
        let picked = pick_java_path(None, None, &[PathBuf::from("/definitely/not/java")]);
        assert_eq!(picked, PathBuf::from(java_exe()));
    }
}
