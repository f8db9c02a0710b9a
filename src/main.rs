use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{debug, error, info};

use ultralaunch::commands;
use ultralaunch::core::config::{default_game_directory, LauncherConfig};
use ultralaunch::core::error::{LauncherError, LauncherResult};
use ultralaunch::core::events::{AcquireEvent, EventSink};

const CONFIG_FILE_NAME: &str = "ultralaunch.json";

#[derive(Parser)]
#[command(name = "ultralaunch", version, about = "Minecraft game file acquisition and launch")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Config file; defaults to `ultralaunch.json` in the game directory.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// List the versions in the version index.
    Versions,
    /// Download every file the configured version needs.
    Download,
    /// Download, then start the game.
    Launch,
}

impl Cli {
    fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| default_game_directory().join(CONFIG_FILE_NAME))
    }
}

/// Mirror acquisition events into the log until every sink is dropped.
fn spawn_event_logger() -> (EventSink, tokio::task::JoinHandle<()>) {
    let (sink, mut rx) = EventSink::channel();
    let handle = tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            match event {
                AcquireEvent::StageProgress {
                    stage,
                    total,
                    current,
                } => debug!("[{}] {}/{}", stage, current, total),
                AcquireEvent::FileProgress(_) => {}
                AcquireEvent::ProcessStartFailed { message } => {
                    error!("Game process failed to start: {}", message)
                }
                other => debug!("{:?}", other),
            }
        }
    });
    (sink, handle)
}

fn print_json<T: serde::Serialize>(value: &T) -> LauncherResult<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> LauncherResult<()> {
    let config = LauncherConfig::load(&cli.config_path())?;

    match cli.command {
        Command::Versions => {
            let versions = commands::list_versions(&config).await?;
            print_json(&versions)
        }
        Command::Download => {
            let (events, logger) = spawn_event_logger();
            let acquisition = commands::download(&config, events).await;
            let _ = logger.await;
            let acquisition = acquisition?;
            print_json(&acquisition.report)?;
            acquisition.report.ensure_complete()
        }
        Command::Launch => {
            let (events, logger) = spawn_event_logger();
            let child = commands::launch(&config, events).await;
            let _ = logger.await;
            let Some(mut child) = child? else {
                return Err(LauncherError::Other("game process did not start".into()));
            };
            let status = tokio::task::spawn_blocking(move || child.wait()).await??;
            info!("Game exited with {}", status);
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    ultralaunch::init_tracing();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
