//! `relaydl lookup <id>` – show the download option without downloading.

use anyhow::Result;
use relaydl_core::config::RelaydlConfig;
use relaydl_core::lookup::LookupClient;
use relaydl_core::session::{self, DownloadOption, PLEASE_WAIT};
use relaydl_core::transport::CurlTransport;

use super::progress;

pub async fn run_lookup(cfg: &RelaydlConfig, resource_id: &str, relay: Option<&str>) -> Result<()> {
    let transport = transport_for(cfg);
    let option = prepare_option(cfg, &transport, resource_id, relay).await?;
    println!("{}", option.label());
    println!("  {}", option.target.url());
    Ok(())
}

pub(super) fn transport_for(cfg: &RelaydlConfig) -> CurlTransport {
    CurlTransport::new(relaydl_core::http::CurlOptions {
        connect_timeout: cfg.download.connect_timeout(),
        ..Default::default()
    })
}

/// Lookup plus size probe, with the status lines the user sees on the way.
pub(super) async fn prepare_option(
    cfg: &RelaydlConfig,
    transport: &CurlTransport,
    resource_id: &str,
    relay: Option<&str>,
) -> Result<DownloadOption> {
    let relay_url = relay.unwrap_or(&cfg.download.relay_url);
    let client = LookupClient::new(relay_url, &cfg.download.fallback_filename)?;

    eprintln!("{}", PLEASE_WAIT);
    let (events, renderer) = progress::spawn_renderer();
    let result = session::prepare(transport, &client, resource_id, Some(&events)).await;
    drop(events);
    let _ = renderer.await;

    Ok(result?)
}
