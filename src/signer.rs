//! Wallet signer capability
//!
//! The engine never touches private keys. It consumes a signer capability
//! that can prompt for account access, submit an `approve(spender, amount)`
//! call on a token contract, and await confirmation. `BridgeSigner` talks to
//! a local wallet-bridge HTTP endpoint that fronts the user's actual wallet;
//! tests swap in mock implementations of the trait.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::error::{Error, Result};

/// Handle to a submitted transaction whose confirmation can be awaited
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxHandle(pub String);

/// Signing capability consumed by the revocation executor
#[async_trait]
pub trait WalletSigner: Send + Sync {
    /// Prompt the user to connect; returns the connected accounts
    async fn request_accounts(&self) -> Result<Vec<String>>;

    /// Invoke `approve(spender, amount)` on the token contract, signed by
    /// the connected account
    async fn approve(&self, token_address: &str, spender: &str, amount: &str) -> Result<TxHandle>;

    /// Wait for the submitted transaction to confirm on chain
    async fn await_confirmation(&self, tx: &TxHandle) -> Result<()>;
}

#[derive(Debug, Clone, Deserialize)]
struct AccountsResponse {
    #[serde(default)]
    accounts: Vec<String>,
    error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ApproveRequest<'a> {
    token_address: &'a str,
    spender: &'a str,
    amount: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApproveResponse {
    tx_hash: Option<String>,
    error: Option<String>,
    #[serde(default)]
    rejected: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct WaitRequest<'a> {
    tx_hash: &'a str,
}

#[derive(Debug, Clone, Deserialize)]
struct WaitResponse {
    status: String,
    error: Option<String>,
}

/// HTTP client for a local wallet-bridge endpoint
pub struct BridgeSigner {
    client: Client,
    base_url: String,
}

impl BridgeSigner {
    /// Create a signer against a bridge endpoint.
    ///
    /// `timeout_ms` bounds each bridge call, including the confirmation
    /// wait - a transaction that never confirms surfaces as a failure
    /// instead of hanging the revoke flow.
    pub fn new(base_url: impl Into<String>, timeout_ms: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(Duration::from_millis(timeout_ms))
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl WalletSigner for BridgeSigner {
    async fn request_accounts(&self) -> Result<Vec<String>> {
        debug!("Requesting account access from wallet bridge");

        let response = self
            .client
            .post(self.url("accounts"))
            .send()
            .await
            .map_err(|e| Error::SignerUnavailable(format!("Wallet bridge unreachable: {e}")))?;

        let body: AccountsResponse = response
            .json()
            .await
            .map_err(|e| Error::SignerUnavailable(format!("Invalid bridge response: {e}")))?;

        if let Some(error) = body.error {
            return Err(Error::UserRejected(error));
        }
        if body.accounts.is_empty() {
            return Err(Error::UserRejected(
                "No account was connected".to_string(),
            ));
        }

        debug!(accounts = body.accounts.len(), "Wallet connected");
        Ok(body.accounts)
    }

    async fn approve(&self, token_address: &str, spender: &str, amount: &str) -> Result<TxHandle> {
        info!(token_address, spender, amount, "Submitting approve transaction");

        let request = ApproveRequest {
            token_address,
            spender,
            amount,
        };

        let response = self
            .client
            .post(self.url("approve"))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::TransactionFailed(format!("Submission failed: {e}")))?;

        let body: ApproveResponse = response
            .json()
            .await
            .map_err(|e| Error::TransactionFailed(format!("Invalid bridge response: {e}")))?;

        if body.rejected {
            return Err(Error::UserRejected(
                body.error
                    .unwrap_or_else(|| "Signing prompt declined".to_string()),
            ));
        }
        if let Some(error) = body.error {
            return Err(Error::TransactionFailed(error));
        }

        body.tx_hash
            .map(TxHandle)
            .ok_or_else(|| Error::TransactionFailed("No transaction hash in response".to_string()))
    }

    async fn await_confirmation(&self, tx: &TxHandle) -> Result<()> {
        debug!(tx_hash = %tx.0, "Awaiting confirmation");

        let response = self
            .client
            .post(self.url("wait"))
            .json(&WaitRequest { tx_hash: &tx.0 })
            .send()
            .await
            .map_err(|e| Error::TransactionFailed(format!("Confirmation wait failed: {e}")))?;

        let body: WaitResponse = response
            .json()
            .await
            .map_err(|e| Error::TransactionFailed(format!("Invalid bridge response: {e}")))?;

        match body.status.as_str() {
            "confirmed" => Ok(()),
            other => Err(Error::TransactionFailed(
                body.error
                    .unwrap_or_else(|| format!("Transaction {}: {}", tx.0, other)),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_approve_request_wire_names() {
        let request = ApproveRequest {
            token_address: "0xtoken",
            spender: "0xspender",
            amount: "0",
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["tokenAddress"], "0xtoken");
        assert_eq!(json["spender"], "0xspender");
        assert_eq!(json["amount"], "0");
    }

    #[test]
    fn test_approve_response_variants() {
        let ok: ApproveResponse = serde_json::from_str(r#"{"txHash": "0xabc"}"#).unwrap();
        assert_eq!(ok.tx_hash.as_deref(), Some("0xabc"));
        assert!(!ok.rejected);

        let rejected: ApproveResponse =
            serde_json::from_str(r#"{"rejected": true, "error": "denied"}"#).unwrap();
        assert!(rejected.rejected);
    }

    #[test]
    fn test_bridge_url_joining() {
        let signer = BridgeSigner::new("http://localhost:8999/", 1000);
        assert_eq!(signer.url("accounts"), "http://localhost:8999/accounts");
    }
}
