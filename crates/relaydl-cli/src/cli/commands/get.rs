//! `relaydl get <url>` – download a direct file URL.

use anyhow::{bail, Result};
use relaydl_core::config::RelaydlConfig;
use relaydl_core::downloader::{DownloadOutcome, DownloadTarget, Downloader};
use relaydl_core::session;
use relaydl_core::transport::CurlTransport;
use relaydl_core::url_model;
use std::path::Path;

use super::lookup::transport_for;
use super::progress;

pub async fn run_get(
    cfg: &RelaydlConfig,
    url: &str,
    filename: Option<&str>,
    output_dir: &Path,
) -> Result<()> {
    let filename = filename
        .map(str::to_string)
        .or_else(|| url_model::filename_from_url_path(url));
    let target = DownloadTarget::new(url, filename.as_deref(), &cfg.download.fallback_filename);

    let transport = transport_for(cfg);
    let (events, renderer) = progress::spawn_renderer();
    let probed = session::probe_target(&transport, target, Some(&events)).await;
    drop(events);
    let _ = renderer.await;

    download_target(cfg, transport, &probed?, output_dir).await
}

/// Run the downloader with the configured retry policy and render its events.
pub(super) async fn download_target(
    cfg: &RelaydlConfig,
    transport: CurlTransport,
    target: &DownloadTarget,
    output_dir: &Path,
) -> Result<()> {
    let downloader = Downloader::new(transport, cfg.download.retry_policy(), output_dir);
    tracing::info!(
        url = target.url(),
        output_dir = %downloader.output_dir().display(),
        "starting download"
    );
    let (events, renderer) = progress::spawn_renderer();
    let outcome = downloader.download(target, Some(&events)).await;
    drop(events);
    let _ = renderer.await;

    match outcome {
        DownloadOutcome::Complete(saved) => {
            tracing::info!(path = %saved.path.display(), attempts = saved.attempts, "saved");
            Ok(())
        }
        DownloadOutcome::Failed { attempts, error } => {
            bail!("download failed after {} attempt(s): {}", attempts, error)
        }
    }
}
