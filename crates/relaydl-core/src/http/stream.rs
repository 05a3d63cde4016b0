//! Streaming GET: libcurl's write callback feeds a bounded channel that the
//! async downloader drains one chunk at a time.

use std::cell::RefCell;
use std::str;

use tokio::sync::{mpsc, oneshot};

use super::{new_easy, parse, CurlOptions, ResponseHead};
use crate::error::TransferError;

/// Receives body chunks in order; closed after the last one.
pub type ChunkSender = mpsc::Sender<Result<Vec<u8>, TransferError>>;
/// Receives the response head once, before any chunk.
pub type HeadSender = oneshot::Sender<Result<ResponseHead, TransferError>>;

/// Performs a GET on the current (blocking) thread.
///
/// `head_tx` gets the final status and length as soon as the body starts (or
/// the transfer ends). Body chunks go to `chunk_tx` only for 2xx responses.
/// A failure after the head was sent is delivered as a trailing `Err` chunk.
/// Dropping the receiver aborts the transfer.
pub fn stream_get(url: &str, opts: &CurlOptions, head_tx: HeadSender, chunk_tx: ChunkSender) {
    let mut head_tx = Some(head_tx);
    let lines = RefCell::new(Vec::new());

    let mut easy = match new_easy(url, &[], opts) {
        Ok(easy) => easy,
        Err(e) => {
            if let Some(tx) = head_tx.take() {
                let _ = tx.send(Err(TransferError::Network(e.to_string())));
            }
            return;
        }
    };

    let result = perform(&mut easy, &lines, &mut head_tx, &chunk_tx);

    match (result, head_tx.take()) {
        // Body was empty, so the write callback never ran.
        (Ok(()), Some(tx)) => {
            let mut head = parse::parse_head(&lines.borrow());
            if let Ok(code) = easy.response_code() {
                head.status = Some(code);
            }
            let _ = tx.send(Ok(head));
        }
        (Err(e), Some(tx)) => {
            let _ = tx.send(Err(TransferError::Network(e.to_string())));
        }
        (Err(e), None) => {
            tracing::debug!(url, "stream aborted: {}", e);
            let _ = chunk_tx.blocking_send(Err(TransferError::Stream(e.to_string())));
        }
        (Ok(()), None) => {}
    }
}

fn perform(
    easy: &mut curl::easy::Easy,
    lines: &RefCell<Vec<String>>,
    head_tx: &mut Option<HeadSender>,
    chunk_tx: &ChunkSender,
) -> Result<(), curl::Error> {
    let mut transfer = easy.transfer();
    transfer.header_function(|data| {
        if let Ok(s) = str::from_utf8(data) {
            lines.borrow_mut().push(s.trim_end().to_string());
        }
        true
    })?;
    transfer.write_function(|data| {
        if let Some(tx) = head_tx.take() {
            let head = parse::parse_head(&lines.borrow());
            let success = head.is_success();
            let _ = tx.send(Ok(head));
            if !success {
                return Ok(0); // abort: error bodies are not streamed
            }
        }
        match chunk_tx.blocking_send(Ok(data.to_vec())) {
            Ok(()) => Ok(data.len()),
            Err(_) => Ok(0),
        }
    })?;
    transfer.perform()
}
