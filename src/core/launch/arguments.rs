// ─── Launch Arguments ───
// Fills the manifest's templated game arguments and assembles the final
// JVM + game argument vector.

use std::collections::HashMap;
use std::path::Path;

use tracing::{debug, warn};

use super::classpath::safe_path_str;
use crate::core::auth::AccountProfile;
use crate::core::config::{GameLayout, LauncherConfig};
use crate::core::version::VersionJson;

/// Used when the manifest carries no logging configuration.
pub const DEFAULT_LOGGING_ARGUMENT: &str = "-Dlog4j2.formatMsgNoLookups=true";

const ACCESS_TOKEN_FLAG: &str = "--accessToken";
const MISSING_TOKEN: &str = "null";

/// Template key → value for the `${key}` placeholders in game arguments.
pub type FillInTable = HashMap<&'static str, String>;

pub fn fill_in_table(
    config: &LauncherConfig,
    manifest: &VersionJson,
    layout: &GameLayout,
    account: &AccountProfile,
) -> FillInTable {
    let assets_index = manifest
        .asset_index
        .as_ref()
        .map(|info| info.id.clone())
        .or_else(|| manifest.assets.clone())
        .unwrap_or_default();
    let version_type = manifest
        .version_type
        .map(|t| t.as_str())
        .unwrap_or("release");
    let user_properties = serde_json::json!({ "preferredLanguage": [config.lang] }).to_string();

    HashMap::from([
        ("auth_player_name", account.username.clone()),
        ("version_name", config.version.clone()),
        ("assets_root", safe_path_str(&layout.assets_dir())),
        ("game_directory", safe_path_str(layout.root())),
        ("assets_index_name", assets_index),
        ("auth_uuid", account.uuid.clone()),
        ("user_type", account.user_type.clone()),
        ("user_properties", user_properties),
        (
            "auth_access_token",
            account
                .access_token
                .clone()
                .unwrap_or_else(|| MISSING_TOKEN.to_string()),
        ),
        ("version_type", version_type.to_string()),
    ])
}

/// `${key}` → `key`.
fn placeholder_key(token: &str) -> Option<&str> {
    token.strip_prefix("${")?.strip_suffix('}')
}

/// Expand placeholders in `tokens`.
///
/// Only a token directly after a `--flag` is considered, and it is replaced
/// only when it is a `${key}` placeholder whose key is in `table`; anything
/// else is left as is. Without an access token the value after
/// `--accessToken` becomes the literal `null`.
pub fn expand_game_arguments(
    tokens: &[String],
    table: &FillInTable,
    has_access_token: bool,
) -> Vec<String> {
    let mut expanded = Vec::with_capacity(tokens.len());
    let mut previous: Option<&str> = None;

    for token in tokens {
        let after_flag = previous.is_some_and(|p| p.starts_with("--"));
        let value = if !has_access_token && previous == Some(ACCESS_TOKEN_FLAG) {
            MISSING_TOKEN.to_string()
        } else if after_flag {
            placeholder_key(token)
                .and_then(|key| table.get(key))
                .cloned()
                .unwrap_or_else(|| token.clone())
        } else {
            token.clone()
        };

        if value == *token && placeholder_key(token).is_some() {
            debug!("Leaving unresolved placeholder {}", token);
        }
        expanded.push(value);
        previous = Some(token);
    }

    expanded
}

/// Total physical memory in MiB, if the OS reports it.
pub fn physical_memory_mb() -> Option<u64> {
    let mut system = sysinfo::System::new();
    system.refresh_memory();
    match system.total_memory() {
        0 => None,
        bytes => Some(bytes / 1024 / 1024),
    }
}

/// `-Xmx<max>M -Xms<initial>M`, with the maximum clamped to physical memory
/// when it is known.
pub fn memory_flags(initial_mb: u64, max_mb: u64, physical_mb: Option<u64>) -> Vec<String> {
    let max_mb = match physical_mb {
        Some(physical) if max_mb > physical => {
            warn!(
                "max_memory_mb {} exceeds physical memory {}; clamping",
                max_mb, physical
            );
            physical
        }
        _ => max_mb,
    };
    let initial_mb = initial_mb.min(max_mb);
    vec![format!("-Xmx{max_mb}M"), format!("-Xms{initial_mb}M")]
}

/// The manifest's logging argument with `${path}` pointing at the downloaded
/// config, or the default when the manifest has none.
pub fn logging_argument(manifest: &VersionJson, layout: &GameLayout) -> String {
    match manifest.client_logging() {
        Some(logging) => logging.argument.replace(
            "${path}",
            &safe_path_str(&layout.logging_file(&logging.file.id)),
        ),
        None => DEFAULT_LOGGING_ARGUMENT.to_string(),
    }
}

/// `--server <host> [--port <port>]` for auto-connect.
pub fn server_arguments(config: &LauncherConfig) -> Vec<String> {
    let Some((host, port)) = config.server_address() else {
        return Vec::new();
    };
    let mut args = vec!["--server".to_string(), host];
    if let Some(port) = port {
        args.push("--port".to_string());
        args.push(port.to_string());
    }
    args
}

/// Everything that goes into one process argument vector.
pub struct LaunchArguments<'a> {
    pub memory: Vec<String>,
    pub logging: String,
    pub natives_dir: &'a Path,
    pub extra_jvm: &'a [String],
    pub classpath: String,
    pub main_class: &'a str,
    pub game: Vec<String>,
    pub extra_game: Vec<String>,
}

impl LaunchArguments<'_> {
    /// Fixed order: memory, logging, native path, extra JVM args, classpath,
    /// main class, game args, extra game args.
    pub fn into_vec(self) -> Vec<String> {
        let mut args = self.memory;
        args.push(self.logging);
        args.push(format!(
            "-Djava.library.path={}",
            safe_path_str(self.natives_dir)
        ));
        args.extend(self.extra_jvm.iter().cloned());
        args.push("-cp".to_string());
        args.push(self.classpath);
        args.push(self.main_class.to_string());
        args.extend(self.game);
        args.extend(self.extra_game);
        args
    }
}
