//! Lookup relay: `GET /resources/{resource_id}/download` forwarded to the
//! upstream API with the configured credential.
//!
//! The upstream body is returned unmodified on success. On failure the
//! upstream status is relayed with a generic message; the upstream body is
//! never passed through on errors.

mod upstream;

pub use upstream::{UpstreamClient, UpstreamError};

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use tokio::net::TcpListener;

use crate::config::RelaySettings;
use crate::http::CurlOptions;

/// Plain-text body for every failed lookup.
pub const UPSTREAM_ERROR_BODY: &str = "Error fetching data from upstream API";

#[derive(Clone)]
struct RelayState {
    upstream: Arc<UpstreamClient>,
}

/// Build the relay router.
pub fn router(settings: RelaySettings, curl: CurlOptions) -> Router {
    let state = RelayState {
        upstream: Arc::new(UpstreamClient::new(settings, curl)),
    };
    Router::new()
        .route("/resources/{resource_id}/download", get(relay_download))
        .with_state(state)
}

/// Bind `0.0.0.0:{settings.port}` and serve until the process exits.
pub async fn serve(settings: RelaySettings, curl: CurlOptions) -> Result<()> {
    let listener = TcpListener::bind(("0.0.0.0", settings.port))
        .await
        .with_context(|| format!("failed to bind port {}", settings.port))?;
    serve_on(listener, settings, curl).await
}

/// Serve on an already-bound listener.
pub async fn serve_on(
    listener: TcpListener,
    settings: RelaySettings,
    curl: CurlOptions,
) -> Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(%addr, upstream = %settings.upstream_base_url, "lookup relay listening");
    axum::serve(listener, router(settings, curl))
        .await
        .context("relay server failed")
}

async fn relay_download(
    State(state): State<RelayState>,
    Path(resource_id): Path<String>,
) -> Response {
    tracing::info!(%resource_id, "relaying download lookup");
    let upstream = Arc::clone(&state.upstream);
    let id = resource_id.clone();

    match tokio::task::spawn_blocking(move || upstream.fetch_download(&id)).await {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, "application/json")], body).into_response(),
        Ok(Err(e)) => {
            tracing::warn!(%resource_id, "upstream lookup failed: {}", e);
            (e.status_code(), UPSTREAM_ERROR_BODY).into_response()
        }
        Err(e) => {
            tracing::warn!(%resource_id, "upstream task failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, UPSTREAM_ERROR_BODY).into_response()
        }
    }
}
