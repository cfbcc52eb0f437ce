//! Audit engine state machine
//!
//! Workflow state (selected chain, scan results, loading flag, revocation
//! lifecycle) lives in one explicit state value with a pure transition
//! function; renderers subscribe to changes through a watch channel instead
//! of reaching into component internals. `AuditEngine` owns the batch
//! orchestrator, the scan cache and the revocation executor, and is the only
//! writer of the shared state.

use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::AbortHandle;
use tracing::warn;

use crate::approval::{Approval, ApprovalLookup};
use crate::cache::{CachedScan, ScanCache};
use crate::chain::Chain;
use crate::error::Result;
use crate::parser::parse_addresses;
use crate::revoke::{RevocationExecutor, RevokeState};
use crate::scan::{BatchScanOrchestrator, ScanResult};
use crate::signer::WalletSigner;

/// Snapshot of the whole workflow state
#[derive(Debug, Clone, PartialEq)]
pub struct EngineState {
    pub chain: Chain,
    pub results: Vec<ScanResult>,
    pub scanning: bool,
    pub revoke: RevokeState,
}

impl Default for EngineState {
    fn default() -> Self {
        Self {
            chain: Chain::default(),
            results: Vec::new(),
            scanning: false,
            revoke: RevokeState::Idle,
        }
    }
}

/// Events that drive the workflow state
#[derive(Debug, Clone)]
pub enum EngineEvent {
    ChainSelected(Chain),
    CacheRestored(CachedScan),
    ScanStarted,
    ScanCompleted(Vec<ScanResult>),
    RevokeStateChanged(RevokeState),
}

/// Pure transition function; rendering concerns never enter here
pub fn apply(state: EngineState, event: EngineEvent) -> EngineState {
    match event {
        EngineEvent::ChainSelected(chain) => EngineState { chain, ..state },
        EngineEvent::CacheRestored(snapshot) => {
            let restored = ScanResult {
                wallet: snapshot.wallet,
                chain: snapshot.chain,
                approvals: snapshot.approvals,
                failed: false,
            };
            EngineState {
                chain: snapshot.chain,
                results: vec![restored],
                ..state
            }
        }
        EngineEvent::ScanStarted => EngineState {
            scanning: true,
            results: Vec::new(),
            ..state
        },
        EngineEvent::ScanCompleted(results) => EngineState {
            scanning: false,
            results,
            ..state
        },
        EngineEvent::RevokeStateChanged(revoke) => EngineState { revoke, ..state },
    }
}

/// Owns the audit/revocation workflow for one session
pub struct AuditEngine {
    orchestrator: Arc<BatchScanOrchestrator>,
    cache: ScanCache,
    executor: RevocationExecutor,
    state_tx: watch::Sender<EngineState>,
    /// Abort handle of the in-flight batch, replaced on every new scan
    active_scan: Mutex<Option<AbortHandle>>,
}

impl AuditEngine {
    pub fn new(
        lookup: Arc<dyn ApprovalLookup>,
        signer: Option<Arc<dyn WalletSigner>>,
        cache: ScanCache,
        concurrency: usize,
    ) -> Self {
        let (state_tx, _) = watch::channel(EngineState::default());
        Self {
            orchestrator: Arc::new(BatchScanOrchestrator::with_concurrency(lookup, concurrency)),
            cache,
            executor: RevocationExecutor::new(signer),
            state_tx,
            active_scan: Mutex::new(None),
        }
    }

    /// Subscribe to workflow state changes
    pub fn subscribe(&self) -> watch::Receiver<EngineState> {
        self.state_tx.subscribe()
    }

    /// Current workflow state snapshot
    pub fn state(&self) -> EngineState {
        self.state_tx.borrow().clone()
    }

    fn dispatch(&self, event: EngineEvent) {
        self.state_tx
            .send_modify(|state| *state = apply(state.clone(), event));
    }

    /// Select the target chain for subsequent scans
    pub fn select_chain(&self, chain: Chain) {
        self.dispatch(EngineEvent::ChainSelected(chain));
    }

    /// Restore the last single-wallet scan from the cache, if present.
    /// Used only at engine start; never consulted mid-session.
    pub async fn restore(&self) -> Result<Option<CachedScan>> {
        let snapshot = self.cache.load().await?;
        if let Some(snapshot) = snapshot.clone() {
            self.dispatch(EngineEvent::CacheRestored(snapshot));
        }
        Ok(snapshot)
    }

    /// Parse the raw input and scan every candidate address on the selected
    /// chain. Starting a new scan aborts the in-flight one; results are
    /// published only if no newer scan has started since, and a successful
    /// single-wallet scan also refreshes the cache slot.
    pub async fn scan(&self, raw_input: &str) -> Vec<ScanResult> {
        let addresses = parse_addresses(raw_input);
        let chain = self.state().chain;

        self.dispatch(EngineEvent::ScanStarted);

        // Spawn and register under one lock so a concurrent scan cannot
        // abort this batch before its handle is stored
        let task = {
            let mut active = match self.active_scan.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            let orchestrator = self.orchestrator.clone();
            let task = tokio::spawn(async move { orchestrator.run_batch(&addresses, chain).await });
            if let Some(previous) = active.replace(task.abort_handle()) {
                previous.abort();
            }
            task
        };

        let outcome = match task.await {
            Ok(outcome) => outcome,
            Err(e) => {
                if !e.is_cancelled() {
                    warn!("Batch scan task failed: {}", e);
                }
                return Vec::new();
            }
        };

        if !self.orchestrator.is_current(outcome.generation) {
            warn!(
                generation = outcome.generation,
                "Discarding superseded batch results"
            );
            return outcome.results;
        }

        if let [only] = outcome.results.as_slice() {
            if !only.failed {
                if let Err(e) = self.cache.save(&only.wallet, chain, &only.approvals).await {
                    warn!("Could not persist scan snapshot: {}", e);
                }
            }
        }

        self.dispatch(EngineEvent::ScanCompleted(outcome.results.clone()));
        outcome.results
    }

    /// Revoke one approval and mirror the executor's lifecycle into the
    /// workflow state
    pub async fn revoke(&self, approval: &Approval) -> RevokeState {
        self.dispatch(EngineEvent::RevokeStateChanged(RevokeState::Pending));
        let state = self
            .executor
            .revoke(&approval.token_address, &approval.spender)
            .await;
        // Mirror whatever the executor considers current; a superseded
        // invocation must not clobber a newer one
        self.dispatch(EngineEvent::RevokeStateChanged(self.executor.state()));
        state
    }
}
