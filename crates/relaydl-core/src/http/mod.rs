//! Blocking HTTP via the curl crate (libcurl).
//!
//! Everything here runs on the calling thread; async code reaches it through
//! `spawn_blocking` (see `transport` and `relay`).

mod parse;
mod stream;

pub use stream::{stream_get, ChunkSender, HeadSender};

use anyhow::Result;
use std::str;
use std::time::Duration;

/// Options applied to every curl handle.
#[derive(Debug, Clone)]
pub struct CurlOptions {
    pub connect_timeout: Duration,
    pub user_agent: String,
}

impl Default for CurlOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            user_agent: concat!("relaydl/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

/// Status and declared length of the final response (after redirects).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResponseHead {
    pub status: Option<u32>,
    pub content_length: Option<u64>,
}

impl ResponseHead {
    pub fn is_success(&self) -> bool {
        matches!(self.status, Some(200..=299))
    }
}

/// A fully buffered response.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u32,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Build a handle for `url` with redirects, timeouts and extra `Name: value` headers.
pub(crate) fn new_easy(
    url: &str,
    headers: &[(&str, &str)],
    opts: &CurlOptions,
) -> Result<curl::easy::Easy, curl::Error> {
    let mut easy = curl::easy::Easy::new();
    easy.url(url)?;
    easy.follow_location(true)?;
    easy.max_redirections(10)?;
    easy.connect_timeout(opts.connect_timeout)?;
    easy.useragent(&opts.user_agent)?;

    if !headers.is_empty() {
        let mut list = curl::easy::List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        easy.http_headers(list)?;
    }
    Ok(easy)
}

/// HEAD request: headers only, no body transfer.
pub fn head(url: &str, opts: &CurlOptions) -> Result<ResponseHead, curl::Error> {
    let mut lines: Vec<String> = Vec::new();
    let mut easy = new_easy(url, &[], opts)?;
    easy.nobody(true)?;
    {
        let mut transfer = easy.transfer();
        transfer.header_function(|data| {
            if let Ok(s) = str::from_utf8(data) {
                lines.push(s.trim_end().to_string());
            }
            true
        })?;
        transfer.perform()?;
    }

    let mut head = parse::parse_head(&lines);
    head.status = Some(easy.response_code()?);
    Ok(head)
}

/// GET with the whole body buffered in memory. Non-2xx statuses are returned, not raised.
pub fn get_body(
    url: &str,
    headers: &[(&str, &str)],
    opts: &CurlOptions,
) -> Result<HttpResponse, curl::Error> {
    let mut body: Vec<u8> = Vec::new();
    let mut easy = new_easy(url, headers, opts)?;
    {
        let mut transfer = easy.transfer();
        transfer.write_function(|data| {
            body.extend_from_slice(data);
            Ok(data.len())
        })?;
        transfer.perform()?;
    }

    let status = easy.response_code()?;
    Ok(HttpResponse { status, body })
}
