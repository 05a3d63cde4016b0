//! `relaydl fetch <id>` – lookup via the relay, probe, then download.

use anyhow::Result;
use relaydl_core::config::RelaydlConfig;
use std::path::Path;

use super::get::download_target;
use super::lookup::{prepare_option, transport_for};

pub async fn run_fetch(
    cfg: &RelaydlConfig,
    resource_id: &str,
    relay: Option<&str>,
    output_dir: &Path,
) -> Result<()> {
    let transport = transport_for(cfg);
    let option = prepare_option(cfg, &transport, resource_id, relay).await?;
    eprintln!("{}", option.label());
    download_target(cfg, transport, &option.target, output_dir).await
}
