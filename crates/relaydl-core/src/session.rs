//! The client flow up to the download button: resource id → relay lookup →
//! size probe → one [`DownloadOption`].
//!
//! Every failure maps to the short status line the user sees; nothing here
//! is retried.

use thiserror::Error;

use crate::downloader::{DownloadEvent, DownloadTarget, EventSender};
use crate::error::ProbeError;
use crate::format::format_bytes;
use crate::lookup::{LookupClient, LookupError};
use crate::transport::Transport;

/// Shown while the lookup is in flight.
pub const PLEASE_WAIT: &str = "Please wait...";

/// Why no download option could be offered. `Display` is the user-facing text.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("Please enter a resource ID.")]
    EmptyResourceId,
    #[error("Error fetching data.")]
    Lookup(#[source] LookupError),
    #[error("No download options available.")]
    NoOptions,
    #[error("Error fetching file size.")]
    Probe(#[source] ProbeError),
}

impl From<LookupError> for ClientError {
    fn from(e: LookupError) -> Self {
        match e {
            LookupError::Malformed => ClientError::NoOptions,
            other => ClientError::Lookup(other),
        }
    }
}

/// A ready-to-start download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadOption {
    pub target: DownloadTarget,
}

impl DownloadOption {
    /// `Download {filename} ({size})`.
    pub fn label(&self) -> String {
        let size = self
            .target
            .known_size()
            .map(format_bytes)
            .unwrap_or_else(|| "unknown size".to_string());
        format!("Download {} ({})", self.target.filename(), size)
    }
}

/// Look up `resource_id` via the relay and probe the file size.
///
/// A missing `Content-Length` still yields an option (unknown size); a failed
/// probe does not.
pub async fn prepare<T: Transport>(
    transport: &T,
    lookup: &LookupClient,
    resource_id: &str,
    events: Option<&EventSender>,
) -> Result<DownloadOption, ClientError> {
    let resource_id = resource_id.trim();
    if resource_id.is_empty() {
        return Err(ClientError::EmptyResourceId);
    }

    let target = lookup.lookup(transport, resource_id).await.map_err(|e| {
        tracing::warn!(resource_id, "lookup failed: {}", e);
        ClientError::from(e)
    })?;

    let target = probe_target(transport, target, events).await?;
    Ok(DownloadOption { target })
}

/// Probe `target.url` and attach the size.
pub async fn probe_target<T: Transport>(
    transport: &T,
    target: DownloadTarget,
    events: Option<&EventSender>,
) -> Result<DownloadTarget, ClientError> {
    if let Some(tx) = events {
        let _ = tx.send(DownloadEvent::Probing {
            url: target.url().to_string(),
        });
    }
    let size = transport.probe(target.url()).await.map_err(|e| {
        tracing::warn!(url = target.url(), "size probe failed: {}", e);
        ClientError::Probe(e)
    })?;
    if size.is_none() {
        tracing::debug!(url = target.url(), "no Content-Length; total size unknown");
    }
    Ok(target.with_known_size(size))
}
