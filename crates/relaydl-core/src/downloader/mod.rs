//! Streaming downloader with progress and bounded whole-transfer retry.
//!
//! One call to [`Downloader::download`] drives a single target through
//! `Downloading(1) → … → Complete | Failed`. Each attempt opens a fresh GET,
//! accumulates chunks in a [`TransferState`], and reports a
//! [`ProgressSnapshot`] after every chunk. On error the partial data is
//! dropped and, if the policy allows, the transfer restarts from byte 0.
//! Only a fully received payload is saved.

mod event;
mod progress;

pub use event::{DownloadEvent, DownloadState, EventSender};
pub use progress::{ProgressSnapshot, TransferState};

use std::path::{Path, PathBuf};

use crate::checksum;
use crate::error::TransferError;
use crate::retry::{RetryDecision, RetryPolicy};
use crate::storage;
use crate::transport::Transport;
use crate::url_model;

/// What to download and under which name. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTarget {
    url: String,
    filename: String,
    known_size: Option<u64>,
}

impl DownloadTarget {
    /// `filename` is sanitized; missing or unusable names fall back to `fallback_filename`.
    pub fn new(url: impl Into<String>, filename: Option<&str>, fallback_filename: &str) -> Self {
        Self {
            url: url.into(),
            filename: url_model::safe_filename(filename, fallback_filename),
            known_size: None,
        }
    }

    /// Same target with the size learned from the probe.
    pub fn with_known_size(self, known_size: Option<u64>) -> Self {
        Self { known_size, ..self }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn known_size(&self) -> Option<u64> {
        self.known_size
    }
}

/// A payload that made it to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
    pub sha256: String,
    pub attempts: u32,
}

/// Terminal result of one `download` call.
#[derive(Debug)]
pub enum DownloadOutcome {
    Complete(SavedFile),
    Failed { attempts: u32, error: TransferError },
}

impl DownloadOutcome {
    pub fn state(&self) -> DownloadState {
        match self {
            DownloadOutcome::Complete(_) => DownloadState::Complete,
            DownloadOutcome::Failed { .. } => DownloadState::Failed,
        }
    }
}

pub struct Downloader<T> {
    transport: T,
    policy: RetryPolicy,
    output_dir: PathBuf,
}

fn emit(events: Option<&EventSender>, event: DownloadEvent) {
    if let Some(tx) = events {
        let _ = tx.send(event);
    }
}

impl<T: Transport> Downloader<T> {
    pub fn new(transport: T, policy: RetryPolicy, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            transport,
            policy,
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Download `target`, retrying the whole transfer per the policy.
    /// Never returns early with an error: every failure ends as `DownloadOutcome::Failed`.
    pub async fn download(
        &self,
        target: &DownloadTarget,
        events: Option<&EventSender>,
    ) -> DownloadOutcome {
        let max_attempts = self.policy.max_attempts;
        let mut state = TransferState::new();

        loop {
            let attempt = state.begin_attempt();
            tracing::debug!(url = target.url(), attempt, max_attempts, "download attempt");
            emit(
                events,
                DownloadEvent::AttemptStarted {
                    attempt,
                    max_attempts,
                },
            );

            let result = match self.transfer(target, &mut state, events).await {
                Ok(()) => self.save(target, &mut state).await,
                Err(e) => Err(e),
            };
            let error = match result {
                Ok(saved) => {
                    tracing::info!(
                        path = %saved.path.display(),
                        bytes = saved.bytes,
                        attempt,
                        "download complete"
                    );
                    emit(
                        events,
                        DownloadEvent::Complete {
                            path: saved.path.clone(),
                            bytes: saved.bytes,
                            sha256: saved.sha256.clone(),
                        },
                    );
                    return DownloadOutcome::Complete(saved);
                }
                Err(e) => e,
            };

            match self.policy.decide(attempt, &error) {
                RetryDecision::NoRetry => {
                    tracing::warn!(url = target.url(), attempt, "download failed: {}", error);
                    emit(
                        events,
                        DownloadEvent::Failed {
                            attempts: attempt,
                            error: error.to_string(),
                        },
                    );
                    return DownloadOutcome::Failed {
                        attempts: attempt,
                        error,
                    };
                }
                RetryDecision::RetryAfter(delay) => {
                    tracing::warn!(
                        url = target.url(),
                        attempt,
                        "attempt failed, retrying: {}",
                        error
                    );
                    emit(
                        events,
                        DownloadEvent::Retrying {
                            attempt,
                            max_attempts,
                            error: error.to_string(),
                        },
                    );
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                }
            }
        }
    }

    /// One attempt: open the stream and drain it into `state`.
    async fn transfer(
        &self,
        target: &DownloadTarget,
        state: &mut TransferState,
        events: Option<&EventSender>,
    ) -> Result<(), TransferError> {
        let mut stream = self.transport.open(target.url()).await?;
        let total = target.known_size().or(stream.declared_len());

        while let Some(chunk) = stream.next_chunk().await {
            state.push(chunk?);
            emit(events, DownloadEvent::Progress(state.snapshot(total)));
        }
        Ok(())
    }

    async fn save(
        &self,
        target: &DownloadTarget,
        state: &mut TransferState,
    ) -> Result<SavedFile, TransferError> {
        let payload = state.take_payload();
        let attempts = state.attempt();
        let dir = self.output_dir.clone();
        let filename = target.filename().to_string();

        tokio::task::spawn_blocking(move || -> anyhow::Result<SavedFile> {
            let sha256 = checksum::sha256_bytes(&payload);
            let path = storage::save_payload(&dir, &filename, &payload)?;
            Ok(SavedFile {
                path,
                bytes: payload.len() as u64,
                sha256,
                attempts,
            })
        })
        .await
        .map_err(|e| TransferError::Save(e.to_string()))?
        .map_err(|e| TransferError::Save(format!("{e:#}")))
    }
}
