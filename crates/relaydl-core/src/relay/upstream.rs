//! The single outbound call the relay makes per request.

use axum::http::StatusCode;
use thiserror::Error;

use crate::config::RelaySettings;
use crate::http::{self, CurlOptions};

#[derive(Debug, Error)]
pub enum UpstreamError {
    /// Upstream answered with a non-2xx status.
    #[error("upstream returned HTTP {0}")]
    Status(u32),
    /// No response at all.
    #[error("upstream request failed: {0}")]
    Transport(#[from] curl::Error),
    /// The configured base URL cannot carry a resource path.
    #[error("invalid upstream base URL {0:?}")]
    BaseUrl(String),
}

impl UpstreamError {
    /// Status relayed to the client: the upstream's own code when it is a
    /// valid HTTP status, 500 otherwise.
    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Status(code) => u16::try_from(*code)
                .ok()
                .and_then(|c| StatusCode::from_u16(c).ok())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            UpstreamError::Transport(_) | UpstreamError::BaseUrl(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// Blocking client for the upstream resource API.
#[derive(Debug, Clone)]
pub struct UpstreamClient {
    settings: RelaySettings,
    curl: CurlOptions,
}

impl UpstreamClient {
    pub fn new(settings: RelaySettings, curl: CurlOptions) -> Self {
        Self { settings, curl }
    }

    /// `{base}/resources/{id}/download`. The id is not validated, only
    /// re-escaped as a single path segment.
    pub fn download_url(&self, resource_id: &str) -> Result<String, UpstreamError> {
        let base = &self.settings.upstream_base_url;
        let mut url = url::Url::parse(base).map_err(|_| UpstreamError::BaseUrl(base.clone()))?;
        url.path_segments_mut()
            .map_err(|_| UpstreamError::BaseUrl(base.clone()))?
            .pop_if_empty()
            .extend(["resources", resource_id, "download"]);
        Ok(url.to_string())
    }

    /// Fetch the download descriptor for `resource_id`; returns the raw body.
    /// Call from `spawn_blocking`.
    pub fn fetch_download(&self, resource_id: &str) -> Result<Vec<u8>, UpstreamError> {
        let url = self.download_url(resource_id)?;
        let headers = [(
            self.settings.api_key_header.as_str(),
            self.settings.api_key.as_str(),
        )];
        let resp = http::get_body(&url, &headers, &self.curl)?;
        if !resp.is_success() {
            return Err(UpstreamError::Status(resp.status));
        }
        Ok(resp.body)
    }
}
