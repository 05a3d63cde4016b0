use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::retry::{RetryPolicy, DEFAULT_MAX_ATTEMPTS};

/// Environment variable holding the upstream credential.
pub const API_KEY_ENV: &str = "RELAYDL_API_KEY";
/// Environment variable overriding the relay listen port.
pub const PORT_ENV: &str = "PORT";

/// Retry policy parameters (optional section under `[download]`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Maximum number of attempts per download (including the first).
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds (0 = restart immediately).
    #[serde(default)]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            delay_ms: 0,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts.max(1),
            delay: Duration::from_millis(self.delay_ms),
        }
    }
}

/// `[relay]` section: how the lookup relay listens and reaches the upstream API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// TCP port the relay listens on.
    pub port: u16,
    /// Base URL of the upstream resource API (without trailing slash).
    pub upstream_base_url: String,
    /// Header name the credential is sent under.
    pub api_key_header: String,
    /// Upstream credential. Usually supplied via `RELAYDL_API_KEY` instead.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            upstream_base_url: "https://api.freepik.com/v1".to_string(),
            api_key_header: "x-freepik-api-key".to_string(),
            api_key: None,
        }
    }
}

/// Immutable relay settings, resolved once at startup and shared read-only by every request.
#[derive(Clone)]
pub struct RelaySettings {
    pub port: u16,
    pub upstream_base_url: String,
    pub api_key_header: String,
    pub api_key: String,
}

impl fmt::Debug for RelaySettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelaySettings")
            .field("port", &self.port)
            .field("upstream_base_url", &self.upstream_base_url)
            .field("api_key_header", &self.api_key_header)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl RelayConfig {
    /// Freeze the section into `RelaySettings`. Fails when no credential is configured.
    pub fn resolve(&self) -> Result<RelaySettings> {
        let api_key = self
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .with_context(|| {
                format!("no upstream API key configured (set {API_KEY_ENV} or relay.api_key)")
            })?;
        Ok(RelaySettings {
            port: self.port,
            upstream_base_url: self.upstream_base_url.trim_end_matches('/').to_string(),
            api_key_header: self.api_key_header.clone(),
            api_key: api_key.to_string(),
        })
    }
}

/// `[download]` section: client-side lookup and download behaviour.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    /// Base URL of the lookup relay the client talks to.
    pub relay_url: String,
    /// Filename used when the lookup response carries none.
    pub fallback_filename: String,
    /// Connect timeout for outbound HTTP requests, in seconds.
    pub connect_timeout_secs: u64,
    /// Optional retry policy; if missing, built-in defaults are used.
    pub retry: Option<RetryConfig>,
}

impl Default for DownloadConfig {
    fn default() -> Self {
        Self {
            relay_url: "http://127.0.0.1:3000".to_string(),
            fallback_filename: "downloaded-file".to_string(),
            connect_timeout_secs: 30,
            retry: None,
        }
    }
}

impl DownloadConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry.as_ref().map(RetryConfig::policy).unwrap_or_default()
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// Global configuration loaded from `~/.config/relaydl/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaydlConfig {
    #[serde(default)]
    pub relay: RelayConfig,
    #[serde(default)]
    pub download: DownloadConfig,
}

impl RelaydlConfig {
    /// Apply `RELAYDL_API_KEY` and `PORT` from the process environment.
    pub fn apply_env_overrides(&mut self) -> Result<()> {
        self.apply_overrides(
            std::env::var(API_KEY_ENV).ok(),
            std::env::var(PORT_ENV).ok(),
        )
    }

    fn apply_overrides(&mut self, api_key: Option<String>, port: Option<String>) -> Result<()> {
        if let Some(key) = api_key.filter(|k| !k.trim().is_empty()) {
            self.relay.api_key = Some(key);
        }
        if let Some(port) = port.filter(|p| !p.trim().is_empty()) {
            self.relay.port = port
                .trim()
                .parse()
                .with_context(|| format!("invalid {PORT_ENV} value: {port:?}"))?;
        }
        Ok(())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("relaydl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<RelaydlConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = RelaydlConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

/// Load configuration from an explicit file.
pub fn load_from_path(path: &Path) -> Result<RelaydlConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: RelaydlConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = RelaydlConfig::default();
        assert_eq!(cfg.relay.port, 3000);
        assert_eq!(cfg.relay.api_key_header, "x-freepik-api-key");
        assert!(cfg.relay.api_key.is_none());
        assert_eq!(cfg.download.fallback_filename, "downloaded-file");
        assert_eq!(cfg.download.retry_policy().max_attempts, 3);
        assert_eq!(cfg.download.retry_policy().delay, Duration::ZERO);
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = RelaydlConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: RelaydlConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.relay.port, cfg.relay.port);
        assert_eq!(parsed.relay.upstream_base_url, cfg.relay.upstream_base_url);
        assert_eq!(parsed.download.relay_url, cfg.download.relay_url);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            [relay]
            port = 8080
            upstream_base_url = "http://127.0.0.1:9000/v1/"
            api_key_header = "x-api-key"
            api_key = "secret"

            [download]
            relay_url = "http://relay.local:8080"
            fallback_filename = "file.bin"
            connect_timeout_secs = 5

            [download.retry]
            max_attempts = 5
            delay_ms = 100
        "#;
        let cfg: RelaydlConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.relay.port, 8080);
        assert_eq!(cfg.download.connect_timeout(), Duration::from_secs(5));
        let policy = cfg.download.retry_policy();
        assert_eq!(policy.max_attempts, 5);
        assert_eq!(policy.delay, Duration::from_millis(100));

        let settings = cfg.relay.resolve().unwrap();
        assert_eq!(settings.upstream_base_url, "http://127.0.0.1:9000/v1");
        assert_eq!(settings.api_key, "secret");
    }

    #[test]
    fn missing_sections_use_defaults() {
        let cfg: RelaydlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.relay.port, 3000);
        assert!(cfg.download.retry.is_none());

        let cfg: RelaydlConfig = toml::from_str("[relay]\napi_key = \"k\"\n").unwrap();
        assert_eq!(cfg.relay.port, 3000);
        assert_eq!(cfg.relay.api_key_header, "x-freepik-api-key");
    }

    #[test]
    fn settings_debug_hides_key() {
        let relay = RelayConfig {
            api_key: Some("top-secret".to_string()),
            ..RelayConfig::default()
        };
        let dbg = format!("{:?}", relay.resolve().unwrap());
        assert!(!dbg.contains("top-secret"));
        assert!(dbg.contains("<redacted>"));
    }

    #[test]
    fn resolve_requires_api_key() {
        let mut relay = RelayConfig::default();
        assert!(relay.resolve().is_err());
        relay.api_key = Some("   ".to_string());
        assert!(relay.resolve().is_err());
    }

    #[test]
    fn env_overrides_key_and_port() {
        let mut cfg = RelaydlConfig::default();
        cfg.apply_overrides(Some("k-123".to_string()), Some("4321".to_string()))
            .unwrap();
        assert_eq!(cfg.relay.api_key.as_deref(), Some("k-123"));
        assert_eq!(cfg.relay.port, 4321);
    }

    #[test]
    fn env_override_rejects_bad_port() {
        let mut cfg = RelaydlConfig::default();
        assert!(cfg.apply_overrides(None, Some("http".to_string())).is_err());
        assert_eq!(cfg.relay.port, 3000);
        cfg.apply_overrides(None, Some(String::new())).unwrap();
        assert_eq!(cfg.relay.port, 3000);
    }

    #[test]
    fn retry_section_defaults_match_policy() {
        let cfg: RelaydlConfig = toml::from_str("[download.retry]\nmax_attempts = 3\n").unwrap();
        assert_eq!(cfg.download.retry_policy(), RetryPolicy::default());
        assert_eq!(RetryConfig::default().policy(), RetryPolicy::default());
    }

    #[test]
    fn zero_max_attempts_still_runs_once() {
        let retry = RetryConfig {
            max_attempts: 0,
            delay_ms: 0,
        };
        assert_eq!(retry.policy().max_attempts, 1);
    }
}
