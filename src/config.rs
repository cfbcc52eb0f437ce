//! Configuration loading and validation

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub signer: SignerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub scan: ScanConfig,
}

/// Remote collaborator endpoints (detection + risk-scoring services)
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_api_base_url")]
    pub base_url: String,
    #[serde(default = "default_api_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_api_base_url(),
            timeout_ms: default_api_timeout_ms(),
        }
    }
}

/// Wallet-bridge signer endpoint. With no bridge URL configured, revokes
/// fail with an actionable "connect a wallet" error.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SignerConfig {
    #[serde(default)]
    pub bridge_url: Option<String>,
    /// Bounds each bridge call including the confirmation wait
    #[serde(default = "default_signer_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_path")]
    pub path: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            path: default_cache_path(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScanConfig {
    /// Concurrent lookups in flight; 1 scans wallets strictly one at a
    /// time and bounds load on the detection service
    #[serde(default = "default_scan_concurrency")]
    pub concurrency: usize,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_scan_concurrency(),
        }
    }
}

fn default_api_base_url() -> String {
    "http://localhost:5000".to_string()
}

fn default_api_timeout_ms() -> u64 {
    10_000
}

fn default_signer_timeout_ms() -> u64 {
    120_000
}

fn default_cache_path() -> String {
    "revoke_scan.json".to_string()
}

fn default_scan_concurrency() -> usize {
    1
}

impl Config {
    /// Load configuration from file and environment variables
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let settings = config::Config::builder()
            // Start with defaults
            .set_default("api.base_url", default_api_base_url())?
            .set_default("api.timeout_ms", default_api_timeout_ms() as i64)?
            .set_default("scan.concurrency", default_scan_concurrency() as i64)?
            // Load from file if exists
            .add_source(config::File::from(path).required(false))
            // Override with environment variables (prefix RSHIELD_)
            .add_source(
                config::Environment::with_prefix("RSHIELD")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .context("Failed to build configuration")?;

        let config: Config = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        url::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid api.base_url: {}", self.api.base_url))?;

        if let Some(bridge_url) = &self.signer.bridge_url {
            url::Url::parse(bridge_url)
                .with_context(|| format!("Invalid signer.bridge_url: {bridge_url}"))?;
        }

        if self.api.timeout_ms == 0 {
            anyhow::bail!("api.timeout_ms must be positive");
        }

        if self.signer.timeout_ms == 0 {
            anyhow::bail!("signer.timeout_ms must be positive");
        }

        if self.scan.concurrency == 0 {
            anyhow::bail!("scan.concurrency must be at least 1");
        }

        if self.cache.path.trim().is_empty() {
            anyhow::bail!("cache.path must not be empty");
        }

        Ok(())
    }
}
