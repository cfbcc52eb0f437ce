//! Approval lookup client for the remote detection service
//!
//! One request per (wallet, chain) pair against `POST /api/revoke-check`.
//! No retries at this layer - a single attempt per wallet per batch run.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use crate::chain::Chain;
use crate::error::{Error, Result};

/// One outstanding spender permission reported by the detection service.
///
/// `amount` is kept as the opaque string the service reported; it is never
/// parsed or used in arithmetic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Approval {
    pub token: String,
    #[serde(rename = "tokenAddress")]
    pub token_address: String,
    pub spender: String,
    pub amount: String,
}

#[derive(Debug, Clone, Serialize)]
struct RevokeCheckRequest<'a> {
    wallet: &'a str,
    chain: Chain,
}

/// Response body of `/api/revoke-check`. A missing `approvals` field means
/// zero approvals, not an error.
#[derive(Debug, Clone, Deserialize)]
struct RevokeCheckResponse {
    #[serde(default)]
    approvals: Vec<Approval>,
}

/// Lookup capability consumed by the batch orchestrator
#[async_trait]
pub trait ApprovalLookup: Send + Sync {
    async fn lookup(&self, wallet: &str, chain: Chain) -> Result<Vec<Approval>>;
}

/// HTTP client for the remote approval-detection service
pub struct RevokeCheckClient {
    client: Client,
    base_url: String,
}

impl RevokeCheckClient {
    /// Create a new client with a bounded request timeout
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl ApprovalLookup for RevokeCheckClient {
    async fn lookup(&self, wallet: &str, chain: Chain) -> Result<Vec<Approval>> {
        let url = format!("{}/api/revoke-check", self.base_url.trim_end_matches('/'));
        debug!(wallet, %chain, "Requesting approval check");

        let response = self
            .client
            .post(&url)
            .json(&RevokeCheckRequest { wallet, chain })
            .send()
            .await
            .map_err(|e| Error::Lookup(format!("Request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::Lookup(format!(
                "Detection service returned {}",
                response.status()
            )));
        }

        let body: RevokeCheckResponse = response
            .json()
            .await
            .map_err(|e| Error::Lookup(format!("Failed to parse response: {e}")))?;

        debug!(wallet, count = body.approvals.len(), "Approval check complete");
        Ok(body.approvals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approval_wire_names() {
        let json = r#"{
            "token": "USDT",
            "tokenAddress": "0xdac17f958d2ee523a2206206994597c13d831ec7",
            "spender": "0xspender",
            "amount": "115792089237316195423570985008687907853"
        }"#;
        let approval: Approval = serde_json::from_str(json).unwrap();
        assert_eq!(approval.token, "USDT");
        assert_eq!(
            approval.token_address,
            "0xdac17f958d2ee523a2206206994597c13d831ec7"
        );

        let round_trip = serde_json::to_value(&approval).unwrap();
        assert!(round_trip.get("tokenAddress").is_some());
        assert!(round_trip.get("token_address").is_none());
    }

    #[test]
    fn test_missing_approvals_field_is_empty() {
        let body: RevokeCheckResponse = serde_json::from_str("{}").unwrap();
        assert!(body.approvals.is_empty());
    }

    #[test]
    fn test_request_body_shape() {
        let request = RevokeCheckRequest {
            wallet: "0xAAA",
            chain: Chain::Bsc,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["wallet"], "0xAAA");
        assert_eq!(json["chain"], "BSC");
    }
}
