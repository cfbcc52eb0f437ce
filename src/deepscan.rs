//! Deep-scan client for the wallet-risk-scoring service
//!
//! Consumes `POST /api/deep-scan` and returns the forensic risk report as
//! delivered; scoring heuristics and AI summarization live entirely on the
//! remote side.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::chain::Chain;
use crate::error::{Error, Result};

#[derive(Debug, Clone, Serialize)]
struct DeepScanRequest<'a> {
    wallet: &'a str,
    chain: Chain,
}

/// One flagged finding in a risk report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    pub severity: String,
    pub description: String,
}

/// Aggregate counters reported per wallet
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RiskSummary {
    #[serde(default)]
    pub transactions: u64,
    #[serde(default)]
    pub failed: u64,
    #[serde(default)]
    pub blacklisted_hits: u64,
    #[serde(default)]
    pub unverified_interactions: u64,
}

/// Forensic risk report for one wallet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskReport {
    pub wallet: String,
    pub chain: Chain,
    pub timestamp: DateTime<Utc>,
    /// Risk score from 0 (clean) to 10
    pub score: f64,
    #[serde(default)]
    pub alerts: Vec<RiskAlert>,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub summary: RiskSummary,
    #[serde(default)]
    pub ai_summary: String,
}

/// HTTP client for the risk-scoring service
pub struct DeepScanClient {
    client: Client,
    base_url: String,
}

impl DeepScanClient {
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    /// Request a forensic scan of one wallet
    pub async fn scan(&self, wallet: &str, chain: Chain) -> Result<RiskReport> {
        let url = format!("{}/api/deep-scan", self.base_url.trim_end_matches('/'));
        debug!(wallet, %chain, "Requesting deep scan");

        let response = self
            .client
            .post(&url)
            .json(&DeepScanRequest { wallet, chain })
            .send()
            .await
            .map_err(|e| Error::Lookup(format!("Deep scan request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Risk-scoring service returned {}",
                response.status()
            )));
        }

        let report: RiskReport = response
            .json()
            .await
            .map_err(|e| Error::Lookup(format!("Failed to parse report: {e}")))?;

        debug!(wallet, score = report.score, "Deep scan complete");
        Ok(report)
    }
}
