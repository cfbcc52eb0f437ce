//! Batch scan orchestration
//!
//! Runs one approval lookup per input address and collects results in input
//! order. Lookups run through a bounded fan-out stage; the default bound of 1
//! keeps at most one request in flight against the detection service at a
//! time. A failed wallet never aborts the
//! batch. Each run is tagged with a monotonically increasing generation so
//! callers can discard results from a superseded batch.

use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::approval::{Approval, ApprovalLookup};
use crate::chain::Chain;

/// One wallet's outcome within a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub wallet: String,
    pub chain: Chain,
    pub approvals: Vec<Approval>,
    pub failed: bool,
}

impl ScanResult {
    fn ok(wallet: &str, chain: Chain, approvals: Vec<Approval>) -> Self {
        Self {
            wallet: wallet.to_string(),
            chain,
            approvals,
            failed: false,
        }
    }

    fn failure(wallet: &str, chain: Chain) -> Self {
        Self {
            wallet: wallet.to_string(),
            chain,
            approvals: Vec::new(),
            failed: true,
        }
    }
}

/// Result set of one batch run, tagged with its generation
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub generation: u64,
    pub results: Vec<ScanResult>,
}

/// Coordinates approval lookups across a wallet list
pub struct BatchScanOrchestrator {
    lookup: Arc<dyn ApprovalLookup>,
    concurrency: usize,
    generation: AtomicU64,
}

impl BatchScanOrchestrator {
    /// Create an orchestrator with the default concurrency bound of 1
    pub fn new(lookup: Arc<dyn ApprovalLookup>) -> Self {
        Self::with_concurrency(lookup, 1)
    }

    /// Create an orchestrator with a custom concurrency bound.
    ///
    /// Any bound preserves the ordering contract: results come back in
    /// input order regardless of which lookups complete first.
    pub fn with_concurrency(lookup: Arc<dyn ApprovalLookup>, concurrency: usize) -> Self {
        Self {
            lookup,
            concurrency: concurrency.max(1),
            generation: AtomicU64::new(0),
        }
    }

    /// Generation of the most recently started batch
    pub fn current_generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    /// Check whether a batch generation is still the latest one started
    pub fn is_current(&self, generation: u64) -> bool {
        self.current_generation() == generation
    }

    /// Scan every address exactly once, returning one result per input
    /// address in input order
    pub async fn run_batch(&self, addresses: &[String], chain: Chain) -> BatchOutcome {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(
            generation,
            wallets = addresses.len(),
            %chain,
            "Starting batch scan"
        );

        let results: Vec<ScanResult> = stream::iter(addresses.to_vec())
            .map(|wallet| async move { self.scan_one(&wallet, chain).await })
            .buffered(self.concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.failed).count();
        debug!(generation, failed, "Batch scan complete");

        BatchOutcome {
            generation,
            results,
        }
    }

    async fn scan_one(&self, wallet: &str, chain: Chain) -> ScanResult {
        match self.lookup.lookup(wallet, chain).await {
            Ok(approvals) => ScanResult::ok(wallet, chain, approvals),
            Err(e) => {
                warn!(wallet, %chain, "Lookup failed: {}", e);
                ScanResult::failure(wallet, chain)
            }
        }
    }
}
