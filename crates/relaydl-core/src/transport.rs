//! The network seam used by the lookup client, size prober and downloader.
//!
//! `CurlTransport` is the production implementation; tests substitute
//! scripted transports to drive the retry loop deterministically.

use std::future::Future;

use tokio::sync::{mpsc, oneshot};

use crate::error::{ProbeError, TransferError};
use crate::http::{self, CurlOptions, HttpResponse};

/// Chunks buffered between the curl thread and the download task.
const CHUNK_QUEUE_DEPTH: usize = 32;

/// A lazy, finite, non-restartable sequence of body chunks.
pub struct ChunkStream {
    declared_len: Option<u64>,
    rx: mpsc::Receiver<Result<Vec<u8>, TransferError>>,
}

impl ChunkStream {
    pub fn new(
        declared_len: Option<u64>,
        rx: mpsc::Receiver<Result<Vec<u8>, TransferError>>,
    ) -> Self {
        Self { declared_len, rx }
    }

    /// A stream that yields `items` in order and then ends.
    pub fn from_chunks(
        declared_len: Option<u64>,
        items: Vec<Result<Vec<u8>, TransferError>>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(items.len().max(1));
        for item in items {
            // Capacity equals the item count, so this cannot fail.
            let _ = tx.try_send(item);
        }
        Self::new(declared_len, rx)
    }

    /// `Content-Length` of the GET response, if the server declared one.
    pub fn declared_len(&self) -> Option<u64> {
        self.declared_len
    }

    /// Next chunk, or None once the body is exhausted.
    pub async fn next_chunk(&mut self) -> Option<Result<Vec<u8>, TransferError>> {
        self.rx.recv().await
    }
}

/// HTTP operations the client side needs.
pub trait Transport: Send + Sync {
    /// GET with the body fully buffered.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<HttpResponse, TransferError>> + Send;

    /// HEAD request; `Ok(None)` when the server declares no length.
    fn probe(&self, url: &str) -> impl Future<Output = Result<Option<u64>, ProbeError>> + Send;

    /// Streaming GET. Fails with `TransferError::Http` for non-2xx responses.
    fn open(&self, url: &str) -> impl Future<Output = Result<ChunkStream, TransferError>> + Send;
}

/// libcurl-backed transport. Each call runs on tokio's blocking pool.
#[derive(Debug, Clone, Default)]
pub struct CurlTransport {
    options: CurlOptions,
}

impl CurlTransport {
    pub fn new(options: CurlOptions) -> Self {
        Self { options }
    }
}

fn join_failed(e: tokio::task::JoinError) -> String {
    format!("transfer task failed: {e}")
}

impl Transport for CurlTransport {
    fn fetch(
        &self,
        url: &str,
    ) -> impl Future<Output = Result<HttpResponse, TransferError>> + Send {
        let url = url.to_string();
        let opts = self.options.clone();
        async move {
            tokio::task::spawn_blocking(move || http::get_body(&url, &[], &opts))
                .await
                .map_err(|e| TransferError::Network(join_failed(e)))?
                .map_err(|e| TransferError::Network(e.to_string()))
        }
    }

    fn probe(&self, url: &str) -> impl Future<Output = Result<Option<u64>, ProbeError>> + Send {
        let url = url.to_string();
        let opts = self.options.clone();
        async move {
            let head = tokio::task::spawn_blocking(move || http::head(&url, &opts))
                .await
                .map_err(|e| ProbeError::Transport(join_failed(e)))?
                .map_err(|e| ProbeError::Transport(e.to_string()))?;
            if !head.is_success() {
                return Err(ProbeError::Status(head.status.unwrap_or(0)));
            }
            Ok(head.content_length)
        }
    }

    fn open(&self, url: &str) -> impl Future<Output = Result<ChunkStream, TransferError>> + Send {
        let url = url.to_string();
        let opts = self.options.clone();
        async move {
            let (head_tx, head_rx) = oneshot::channel();
            let (chunk_tx, chunk_rx) = mpsc::channel(CHUNK_QUEUE_DEPTH);
            tokio::task::spawn_blocking(move || http::stream_get(&url, &opts, head_tx, chunk_tx));

            let head = head_rx
                .await
                .map_err(|_| TransferError::Network("transfer ended without a response".into()))??;
            if !head.is_success() {
                return Err(TransferError::Http(head.status.unwrap_or(0)));
            }
            Ok(ChunkStream::new(head.content_length, chunk_rx))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_chunks_yields_in_order_then_ends() {
        let mut s = ChunkStream::from_chunks(
            Some(5),
            vec![Ok(b"ab".to_vec()), Ok(b"cde".to_vec())],
        );
        assert_eq!(s.declared_len(), Some(5));
        assert_eq!(s.next_chunk().await.unwrap().unwrap(), b"ab");
        assert_eq!(s.next_chunk().await.unwrap().unwrap(), b"cde");
        assert!(s.next_chunk().await.is_none());
    }

    #[tokio::test]
    async fn from_chunks_carries_errors() {
        let mut s = ChunkStream::from_chunks(
            None,
            vec![Ok(b"x".to_vec()), Err(TransferError::Stream("reset".into()))],
        );
        assert!(s.next_chunk().await.unwrap().is_ok());
        assert!(matches!(
            s.next_chunk().await,
            Some(Err(TransferError::Stream(_)))
        ));
    }

    #[tokio::test]
    async fn empty_stream_ends_immediately() {
        let mut s = ChunkStream::from_chunks(Some(0), Vec::new());
        assert!(s.next_chunk().await.is_none());
    }
}
