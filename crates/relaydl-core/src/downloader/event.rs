//! Events emitted while preparing and running a download, and the state
//! machine they trace: `Idle → Probing → Downloading(n) → Complete | Failed`.

use std::fmt;
use std::path::PathBuf;

use super::progress::ProgressSnapshot;

/// Receives download events. Unbounded so progress is never dropped.
pub type EventSender = tokio::sync::mpsc::UnboundedSender<DownloadEvent>;

/// `Idle` until the first event arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DownloadState {
    Idle,
    Probing,
    Downloading { attempt: u32 },
    Complete,
    Failed,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadEvent {
    /// HEAD probe for the file size started.
    Probing { url: String },
    /// A transfer attempt started; progress restarts from 0.
    AttemptStarted { attempt: u32, max_attempts: u32 },
    Progress(ProgressSnapshot),
    /// Attempt `attempt` failed and another one follows.
    Retrying {
        attempt: u32,
        max_attempts: u32,
        error: String,
    },
    Complete {
        path: PathBuf,
        bytes: u64,
        sha256: String,
    },
    Failed { attempts: u32, error: String },
}

impl DownloadEvent {
    /// State the download enters with this event; None if it stays put.
    pub fn state(&self) -> Option<DownloadState> {
        match self {
            DownloadEvent::Probing { .. } => Some(DownloadState::Probing),
            DownloadEvent::AttemptStarted { attempt, .. } => {
                Some(DownloadState::Downloading { attempt: *attempt })
            }
            DownloadEvent::Progress(_) | DownloadEvent::Retrying { .. } => None,
            DownloadEvent::Complete { .. } => Some(DownloadState::Complete),
            DownloadEvent::Failed { .. } => Some(DownloadState::Failed),
        }
    }
}

/// The status line shown to the user for this event.
impl fmt::Display for DownloadEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadEvent::Probing { .. } => write!(f, "Checking file size..."),
            DownloadEvent::AttemptStarted { .. } => write!(f, "Starting download..."),
            DownloadEvent::Progress(p) => write!(f, "{p}"),
            DownloadEvent::Retrying {
                attempt,
                max_attempts,
                ..
            } => write!(f, "Retrying ({attempt}/{max_attempts})..."),
            DownloadEvent::Complete { .. } => write!(f, "Download complete."),
            DownloadEvent::Failed { .. } => write!(f, "Download failed."),
        }
    }
}
