//! `relaydl serve` – run the lookup relay.

use anyhow::Result;
use relaydl_core::config::RelaydlConfig;
use relaydl_core::http::CurlOptions;
use relaydl_core::relay;

pub async fn run_serve(cfg: &RelaydlConfig, port: Option<u16>) -> Result<()> {
    let mut relay_cfg = cfg.relay.clone();
    if let Some(port) = port {
        relay_cfg.port = port;
    }
    let settings = relay_cfg.resolve()?;
    tracing::info!(?settings, "starting relay");
    println!("Lookup relay listening on port {}", settings.port);

    let curl = CurlOptions {
        connect_timeout: cfg.download.connect_timeout(),
        ..CurlOptions::default()
    };
    relay::serve(settings, curl).await
}
