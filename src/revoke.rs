//! Revocation executor
//!
//! Drives the wallet signer through a zero-allowance approval for one
//! (token, spender) pair and tracks the transaction lifecycle:
//! `Idle -> Pending -> (Success | Error)`. One revocation is active at a
//! time; a new invocation supersedes the previous one and its late terminal
//! write is discarded. Setting the allowance to zero is the only supported
//! revoke semantics.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::{Error, Result};
use crate::signer::{TxHandle, WalletSigner};

/// Allowance value submitted for every revoke
pub const ZERO_ALLOWANCE: &str = "0";

/// Lifecycle state of the active revocation
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case", tag = "state")]
pub enum RevokeState {
    Idle,
    Pending,
    Success { tx_hash: String },
    Error { reason: String },
}

impl RevokeState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RevokeState::Success { .. } | RevokeState::Error { .. })
    }
}

/// Executes revocations through the configured signer capability
pub struct RevocationExecutor {
    signer: Option<Arc<dyn WalletSigner>>,
    state_tx: watch::Sender<RevokeState>,
    generation: AtomicU64,
}

impl RevocationExecutor {
    /// Create an executor. With no signer configured every revoke
    /// short-circuits to an error before any submission.
    pub fn new(signer: Option<Arc<dyn WalletSigner>>) -> Self {
        let (state_tx, _) = watch::channel(RevokeState::Idle);
        Self {
            signer,
            state_tx,
            generation: AtomicU64::new(0),
        }
    }

    /// Subscribe to lifecycle state changes
    pub fn subscribe(&self) -> watch::Receiver<RevokeState> {
        self.state_tx.subscribe()
    }

    /// Current visible state
    pub fn state(&self) -> RevokeState {
        self.state_tx.borrow().clone()
    }

    /// Revoke one approval by setting its allowance to zero.
    ///
    /// Moves to `Pending` before the first suspension point and resolves to
    /// exactly one terminal state. The terminal state persists for display
    /// until the next revoke replaces it.
    pub async fn revoke(&self, token_address: &str, spender: &str) -> RevokeState {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(generation, RevokeState::Pending);

        let state = match self.drive(token_address, spender).await {
            Ok(tx) => {
                info!(token_address, spender, tx_hash = %tx.0, "Revocation confirmed");
                RevokeState::Success { tx_hash: tx.0 }
            }
            Err(e) => {
                warn!(token_address, spender, "Revocation failed: {}", e);
                RevokeState::Error {
                    reason: e.to_string(),
                }
            }
        };

        self.publish(generation, state.clone());
        state
    }

    async fn drive(&self, token_address: &str, spender: &str) -> Result<TxHandle> {
        // Short-circuit before any submission when no signer is present
        let signer = self.signer.as_ref().ok_or_else(|| {
            Error::SignerUnavailable("Connect a wallet to revoke approvals".to_string())
        })?;

        let accounts = signer.request_accounts().await?;
        let account = accounts.first().ok_or_else(|| {
            Error::UserRejected("Wallet returned no accounts".to_string())
        })?;
        info!(account = %account, token_address, spender, "Revoking approval");

        let tx = signer.approve(token_address, spender, ZERO_ALLOWANCE).await?;
        signer.await_confirmation(&tx).await?;
        Ok(tx)
    }

    /// Publish a state change unless a newer revoke has started since
    fn publish(&self, generation: u64, state: RevokeState) {
        if self.generation.load(Ordering::SeqCst) == generation {
            let _ = self.state_tx.send(state);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    /// Gate that lets a test hold the first confirmation open
    #[derive(Default)]
    struct ConfirmGate {
        reached: Notify,
        release: Notify,
    }

    #[derive(Default)]
    struct MockSigner {
        reject_accounts: bool,
        empty_accounts: bool,
        reject_approve: bool,
        fail_confirm: bool,
        confirm_gate: Option<Arc<ConfirmGate>>,
        submitted: AtomicUsize,
        confirms: AtomicUsize,
    }

    #[async_trait]
    impl WalletSigner for MockSigner {
        async fn request_accounts(&self) -> Result<Vec<String>> {
            if self.reject_accounts {
                return Err(Error::UserRejected("connection declined".to_string()));
            }
            if self.empty_accounts {
                return Ok(Vec::new());
            }
            Ok(vec!["0xuser".to_string()])
        }

        async fn approve(
            &self,
            _token_address: &str,
            _spender: &str,
            amount: &str,
        ) -> Result<TxHandle> {
            assert_eq!(amount, ZERO_ALLOWANCE);
            if self.reject_approve {
                return Err(Error::UserRejected("signing declined".to_string()));
            }
            let n = self.submitted.fetch_add(1, Ordering::SeqCst) + 1;
            Ok(TxHandle(format!("0xtx{n}")))
        }

        async fn await_confirmation(&self, _tx: &TxHandle) -> Result<()> {
            let call = self.confirms.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(gate) = &self.confirm_gate {
                // Only the first confirmation parks; later ones run through
                if call == 1 {
                    gate.reached.notify_one();
                    gate.release.notified().await;
                }
            }
            if self.fail_confirm {
                return Err(Error::TransactionFailed("reverted".to_string()));
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_successful_revoke() {
        let signer = Arc::new(MockSigner::default());
        let executor = RevocationExecutor::new(Some(signer.clone()));

        assert_eq!(executor.state(), RevokeState::Idle);
        let state = executor.revoke("0xtoken", "0xspender").await;

        assert_eq!(
            state,
            RevokeState::Success {
                tx_hash: "0xtx1".to_string()
            }
        );
        assert_eq!(executor.state(), state);
        assert_eq!(signer.submitted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_signer_short_circuits_without_submission() {
        let executor = RevocationExecutor::new(None);
        let state = executor.revoke("0xtoken", "0xspender").await;

        match state {
            RevokeState::Error { reason } => assert!(reason.contains("Connect a wallet")),
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_user_rejection_at_connect_submits_nothing() {
        let signer = Arc::new(MockSigner {
            reject_accounts: true,
            ..Default::default()
        });
        let executor = RevocationExecutor::new(Some(signer.clone()));

        let state = executor.revoke("0xtoken", "0xspender").await;
        assert!(matches!(state, RevokeState::Error { .. }));
        assert_eq!(signer.submitted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_empty_account_list_submits_nothing() {
        // Enable info-level logging so the account field is evaluated
        let _ = tracing_subscriber::fmt()
            .with_env_filter("revoke_shield=info")
            .try_init();
        let signer = Arc::new(MockSigner {
            empty_accounts: true,
            ..Default::default()
        });
        let executor = RevocationExecutor::new(Some(signer.clone()));

        let state = executor.revoke("0xtoken", "0xspender").await;
        match state {
            RevokeState::Error { reason } => assert!(reason.contains("no accounts")),
            other => panic!("expected error state, got {other:?}"),
        }
        assert_eq!(signer.submitted.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_user_rejection_at_signing() {
        let signer = Arc::new(MockSigner {
            reject_approve: true,
            ..Default::default()
        });
        let executor = RevocationExecutor::new(Some(signer));

        let state = executor.revoke("0xtoken", "0xspender").await;
        match state {
            RevokeState::Error { reason } => assert!(reason.contains("signing declined")),
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_failed_confirmation() {
        let signer = Arc::new(MockSigner {
            fail_confirm: true,
            ..Default::default()
        });
        let executor = RevocationExecutor::new(Some(signer.clone()));

        let state = executor.revoke("0xtoken", "0xspender").await;
        assert!(matches!(state, RevokeState::Error { .. }));
        // The transaction was submitted once; no automatic retry
        assert_eq!(signer.submitted.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_pending_visible_while_in_flight() {
        let gate = Arc::new(ConfirmGate::default());
        let signer = Arc::new(MockSigner {
            confirm_gate: Some(gate.clone()),
            ..Default::default()
        });
        let executor = Arc::new(RevocationExecutor::new(Some(signer)));

        let task = {
            let executor = executor.clone();
            tokio::spawn(async move { executor.revoke("0xtoken", "0xspender").await })
        };

        gate.reached.notified().await;
        assert_eq!(executor.state(), RevokeState::Pending);

        gate.release.notify_one();
        let state = task.await.unwrap();
        assert!(state.is_terminal());
    }

    #[tokio::test]
    async fn test_second_revoke_supersedes_first() {
        let gate = Arc::new(ConfirmGate::default());
        let signer = Arc::new(MockSigner {
            confirm_gate: Some(gate.clone()),
            ..Default::default()
        });
        let executor = Arc::new(RevocationExecutor::new(Some(signer)));

        // First revoke parks at the confirmation wait
        let first = {
            let executor = executor.clone();
            tokio::spawn(async move { executor.revoke("0xtokenA", "0xspenderA").await })
        };
        gate.reached.notified().await;

        // Second revoke runs to completion while the first is parked
        let second_state = executor.revoke("0xtokenB", "0xspenderB").await;
        assert_eq!(
            second_state,
            RevokeState::Success {
                tx_hash: "0xtx2".to_string()
            }
        );
        assert_eq!(executor.state(), second_state);

        // The first revoke still resolves, but its stale terminal state
        // must not overwrite the newer one
        gate.release.notify_one();
        let first_state = first.await.unwrap();
        assert!(first_state.is_terminal());
        assert_eq!(executor.state(), second_state);
    }

    #[tokio::test]
    async fn test_watch_subscribers_observe_transitions() {
        let signer = Arc::new(MockSigner::default());
        let executor = RevocationExecutor::new(Some(signer));
        let mut rx = executor.subscribe();

        assert_eq!(*rx.borrow(), RevokeState::Idle);
        let state = executor.revoke("0xtoken", "0xspender").await;

        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().clone(), state);
    }
}
