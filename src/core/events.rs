// ─── Acquisition Events ───
// Progress and lifecycle notifications delivered over an explicit channel.

use std::path::PathBuf;

use serde::Serialize;
use tokio::sync::mpsc;

/// The sequential stages of one acquisition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Manifest,
    CriticalFile,
    Assets,
    Libraries,
    Logging,
    Mods,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Manifest => "manifest",
            Stage::CriticalFile => "critical-file",
            Stage::Assets => "assets",
            Stage::Libraries => "libraries",
            Stage::Logging => "logging",
            Stage::Mods => "mods",
        };
        f.write_str(name)
    }
}

/// Byte-level progress for one file transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileProgress {
    pub url: String,
    pub path: PathBuf,
    /// Taken from `Content-Length` when the server sends it.
    pub total: Option<u64>,
    pub received: u64,
    pub just_received: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AcquireEvent {
    StageStarted {
        stage: Stage,
    },
    StageProgress {
        stage: Stage,
        total: usize,
        current: usize,
    },
    StageFinished {
        stage: Stage,
        failures: usize,
    },
    FileProgress(FileProgress),
    Extracting {
        archive: PathBuf,
        entry: String,
    },
    ProcessStartFailed {
        message: String,
    },
}

/// Cloneable sending half handed to every component that reports progress.
///
/// A sink without a receiver (or whose receiver was dropped) silently
/// discards events.
#[derive(Debug, Clone, Default)]
pub struct EventSink {
    tx: Option<mpsc::UnboundedSender<AcquireEvent>>,
}

impl EventSink {
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AcquireEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    pub fn disabled() -> Self {
        Self { tx: None }
    }

    pub fn emit(&self, event: AcquireEvent) {
        if let Some(tx) = &self.tx {
            let _ = tx.send(event);
        }
    }

    pub fn progress(&self, stage: Stage, total: usize, current: usize) {
        self.emit(AcquireEvent::StageProgress {
            stage,
            total,
            current,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_sink_drops_events() {
        EventSink::disabled().progress(Stage::Assets, 3, 1);
    }

    #[test]
    fn channel_delivers_in_order() {
        let (sink, mut rx) = EventSink::channel();
        sink.emit(AcquireEvent::StageStarted {
            stage: Stage::Libraries,
        });
        sink.progress(Stage::Libraries, 2, 1);

        assert_eq!(
            rx.try_recv().unwrap(),
            AcquireEvent::StageStarted {
                stage: Stage::Libraries
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            AcquireEvent::StageProgress {
                stage: Stage::Libraries,
                total: 2,
                current: 1
            }
        );
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_value(AcquireEvent::StageProgress {
            stage: Stage::Assets,
            total: 3,
            current: 1,
        })
        .unwrap();
        assert_eq!(json["event"], "stage_progress");
        assert_eq!(json["stage"], "assets");
    }
}
