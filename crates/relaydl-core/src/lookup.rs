//! Client side of the lookup relay: ask the relay for a resource and turn the
//! upstream JSON into a [`DownloadTarget`].
//!
//! Expected body on success: `{"data": {"url": "...", "filename": "..."}}`,
//! `filename` optional. Anything else is treated as "no download options".

use serde_json::Value;
use thiserror::Error;

use crate::downloader::DownloadTarget;
use crate::error::TransferError;
use crate::transport::Transport;

#[derive(Debug, Error)]
pub enum LookupError {
    #[error("invalid relay URL: {0}")]
    RelayUrl(#[from] url::ParseError),
    #[error("relay request failed: {0}")]
    Transport(#[source] TransferError),
    #[error("relay returned HTTP {0}")]
    Status(u32),
    #[error("relay response is not JSON: {0}")]
    Decode(#[from] serde_json::Error),
    /// JSON parsed but `data.url` is missing or empty.
    #[error("relay response has no download URL")]
    Malformed,
}

/// Extract the download target from a lookup response body.
pub fn parse_target(body: &Value, fallback_filename: &str) -> Result<DownloadTarget, LookupError> {
    let data = body.get("data").ok_or(LookupError::Malformed)?;
    let url = data
        .get("url")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .ok_or(LookupError::Malformed)?;
    let filename = data.get("filename").and_then(Value::as_str);
    Ok(DownloadTarget::new(url, filename, fallback_filename))
}

/// Talks to a lookup relay at `relay_url`.
#[derive(Debug, Clone)]
pub struct LookupClient {
    relay_url: url::Url,
    fallback_filename: String,
}

impl LookupClient {
    pub fn new(relay_url: &str, fallback_filename: &str) -> Result<Self, LookupError> {
        Ok(Self {
            relay_url: url::Url::parse(relay_url)?,
            fallback_filename: fallback_filename.to_string(),
        })
    }

    /// `{relay}/resources/{id}/download`. The id is inserted as a single path segment.
    pub fn lookup_url(&self, resource_id: &str) -> String {
        let mut url = self.relay_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["resources", resource_id, "download"]);
        }
        url.to_string()
    }

    /// The raw JSON the relay returned for `resource_id`.
    pub async fn fetch_json<T: Transport>(
        &self,
        transport: &T,
        resource_id: &str,
    ) -> Result<Value, LookupError> {
        let url = self.lookup_url(resource_id);
        tracing::debug!(%url, "looking up resource");
        let resp = transport.fetch(&url).await.map_err(LookupError::Transport)?;
        if !resp.is_success() {
            return Err(LookupError::Status(resp.status));
        }
        Ok(serde_json::from_slice(&resp.body)?)
    }

    pub async fn lookup<T: Transport>(
        &self,
        transport: &T,
        resource_id: &str,
    ) -> Result<DownloadTarget, LookupError> {
        let body = self.fetch_json(transport, resource_id).await?;
        parse_target(&body, &self.fallback_filename)
    }
}
