//! CLI for relaydl.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use relaydl_core::config::{self, RelaydlConfig};
use std::path::{Path, PathBuf};

use commands::{run_checksum, run_completions, run_fetch, run_get, run_lookup, run_serve};

/// Top-level CLI for relaydl.
#[derive(Debug, Parser)]
#[command(name = "relaydl")]
#[command(about = "relaydl: resource lookup relay and streaming downloader", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the lookup relay in front of the upstream resource API.
    Serve {
        /// Listen port (overrides config and PORT).
        #[arg(long)]
        port: Option<u16>,
    },

    /// Look up a resource via the relay and show the download option.
    Lookup {
        /// Upstream resource identifier.
        resource_id: String,

        /// Relay base URL (overrides config).
        #[arg(long, value_name = "URL")]
        relay: Option<String>,
    },

    /// Look up a resource via the relay and download it.
    Fetch {
        /// Upstream resource identifier.
        resource_id: String,

        /// Directory to save into (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,

        /// Relay base URL (overrides config).
        #[arg(long, value_name = "URL")]
        relay: Option<String>,
    },

    /// Download a direct file URL without going through the relay.
    Get {
        /// Direct HTTP/HTTPS URL of the file.
        url: String,

        /// Save under this name instead of the last URL path segment.
        #[arg(long)]
        filename: Option<String>,

        /// Directory to save into (default: current directory).
        #[arg(long, value_name = "DIR")]
        output_dir: Option<PathBuf>,
    },

    /// Compute SHA-256 of a file (e.g. after download).
    Checksum {
        /// Path to the file.
        path: String,
    },

    /// Print a shell completion script to stdout.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Serve { port } => run_serve(&load_config()?, port).await?,
            CliCommand::Lookup { resource_id, relay } => {
                run_lookup(&load_config()?, &resource_id, relay.as_deref()).await?
            }
            CliCommand::Fetch {
                resource_id,
                output_dir,
                relay,
            } => {
                let cfg = load_config()?;
                let output_dir = resolve_output_dir(output_dir)?;
                run_fetch(&cfg, &resource_id, relay.as_deref(), &output_dir).await?
            }
            CliCommand::Get {
                url,
                filename,
                output_dir,
            } => {
                let cfg = load_config()?;
                let output_dir = resolve_output_dir(output_dir)?;
                run_get(&cfg, &url, filename.as_deref(), &output_dir).await?
            }
            CliCommand::Checksum { path } => run_checksum(Path::new(&path)).await?,
            CliCommand::Completions { shell } => run_completions(shell)?,
        }

        Ok(())
    }
}

/// Config file plus `RELAYDL_API_KEY` / `PORT` overrides.
fn load_config() -> Result<RelaydlConfig> {
    let mut cfg = config::load_or_init()?;
    cfg.apply_env_overrides()?;
    // relay.api_key stays out of the log.
    tracing::debug!(
        relay_url = %cfg.download.relay_url,
        port = cfg.relay.port,
        "loaded config"
    );
    Ok(cfg)
}

fn resolve_output_dir(dir: Option<PathBuf>) -> Result<PathBuf> {
    match dir {
        Some(d) => Ok(d),
        None => Ok(std::env::current_dir()?),
    }
}

#[cfg(test)]
mod tests;
