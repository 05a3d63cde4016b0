//! Error types shared by the transport, prober and downloader.

use thiserror::Error;

/// Size probe failure. A missing `Content-Length` is not an error.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// HEAD response had a non-2xx status.
    #[error("HEAD returned HTTP {0}")]
    Status(u32),
    /// Request never produced a response (DNS, connect, TLS...).
    #[error("HEAD request failed: {0}")]
    Transport(String),
}

/// Failure of one transfer attempt. All variants except `Save` are retried alike.
#[derive(Debug, Error)]
pub enum TransferError {
    /// GET response had a non-2xx status.
    #[error("HTTP {0}")]
    Http(u32),
    /// Request failed before any response was received.
    #[error("network: {0}")]
    Network(String),
    /// Body stream broke off after the response started.
    #[error("stream: {0}")]
    Stream(String),
    /// Payload could not be written to disk. Not retried.
    #[error("save: {0}")]
    Save(String),
}

impl TransferError {
    /// Whether the retry loop may restart the transfer after this error.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, TransferError::Save(_))
    }
}
