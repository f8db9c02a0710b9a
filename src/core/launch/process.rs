// ─── Process Host ───
// Spawns the game from a finished launch plan. Start failures are reported
// as events; the child is otherwise left to run on its own.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};

use serde::Serialize;
use tracing::{debug, error, info};

use super::classpath::safe_path_str;
use crate::core::events::{AcquireEvent, EventSink};

/// Marks the process as started by a third-party launcher.
pub const LAUNCHER_ENV_MARKER: (&str, &str) = ("CUSTOM_LAUNCHER", "1");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LaunchPlan {
    pub java: PathBuf,
    pub args: Vec<String>,
    pub working_dir: PathBuf,
    /// Variables added to (or overriding) the inherited environment.
    pub env: Vec<(String, String)>,
}

impl LaunchPlan {
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(&self.java);
        cmd.args(&self.args)
            .current_dir(&self.working_dir)
            .envs(self.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        cmd
    }
}

/// Library search variable for the current OS.
fn native_library_var() -> &'static str {
    if cfg!(target_os = "windows") {
        "PATH"
    } else if cfg!(target_os = "macos") {
        "DYLD_LIBRARY_PATH"
    } else {
        "LD_LIBRARY_PATH"
    }
}

/// Environment overlay: the launcher marker plus the natives directory
/// prepended to the library search path.
pub fn launch_env(natives_dir: &Path) -> Vec<(String, String)> {
    let var = native_library_var();
    vec![
        (
            LAUNCHER_ENV_MARKER.0.to_string(),
            LAUNCHER_ENV_MARKER.1.to_string(),
        ),
        (
            var.to_string(),
            append_env_path(var, &safe_path_str(natives_dir)),
        ),
    ]
}

fn append_env_path(var_name: &str, value: &str) -> String {
    let separator = if cfg!(target_os = "windows") {
        ";"
    } else {
        ":"
    };
    match std::env::var(var_name) {
        Ok(existing) if !existing.trim().is_empty() => {
            format!("{}{}{}", value, separator, existing)
        }
        _ => value.to_string(),
    }
}

/// Start the game. A spawn failure is logged and emitted as
/// `ProcessStartFailed`; it never surfaces as an error.
pub fn spawn_game(plan: &LaunchPlan, events: &EventSink) -> Option<Child> {
    let mut cmd = plan.command();
    info!("Launching with Java: {:?}", plan.java);
    debug!("Command (copy/paste): {}", format_command_for_logs(&cmd));

    match cmd.spawn() {
        Ok(child) => {
            info!("Game process started (pid {})", child.id());
            Some(child)
        }
        Err(e) => {
            let message = format!("failed to start {:?}: {}", plan.java, e);
            error!("{}", message);
            events.emit(AcquireEvent::ProcessStartFailed { message });
            None
        }
    }
}

fn format_command_for_logs(cmd: &Command) -> String {
    let program = shell_escape(&cmd.get_program().to_string_lossy());
    let args = cmd
        .get_args()
        .map(|arg| shell_escape(&arg.to_string_lossy()))
        .collect::<Vec<_>>()
        .join(" ");

    if args.is_empty() {
        program
    } else {
        format!("{} {}", program, args)
    }
}

fn shell_escape(raw: &str) -> String {
    if raw.is_empty() {
        return "\"\"".to_string();
    }

    if raw.chars().all(|ch| {
        ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.' | '/' | ':' | '\\' | '=')
    }) {
        return raw.to_string();
    }

    format!("\"{}\"", raw.replace('"', "\\\""))
}
