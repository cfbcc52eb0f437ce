//! Single-slot scan cache
//!
//! Persists the last single-wallet scan so a restart can restore prior
//! results without re-querying the detection service. One JSON file, no
//! history, no versioning: every save replaces the previous snapshot.
//! Batch results are never cached.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::approval::Approval;
use crate::chain::Chain;
use crate::error::{Error, Result};

/// Persisted snapshot of the most recent single-wallet scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedScan {
    pub wallet: String,
    pub chain: Chain,
    pub approvals: Vec<Approval>,
}

/// File-backed single-slot cache
pub struct ScanCache {
    path: PathBuf,
}

impl ScanCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Overwrite the slot with a new snapshot
    pub async fn save(&self, wallet: &str, chain: Chain, approvals: &[Approval]) -> Result<()> {
        let snapshot = CachedScan {
            wallet: wallet.to_string(),
            chain,
            approvals: approvals.to_vec(),
        };
        let data = serde_json::to_string_pretty(&snapshot)
            .map_err(|e| Error::CachePersistence(e.to_string()))?;

        tokio::fs::write(&self.path, data)
            .await
            .map_err(|e| Error::CachePersistence(e.to_string()))?;

        debug!(wallet, %chain, path = %self.path.display(), "Saved scan snapshot");
        Ok(())
    }

    /// Load the stored snapshot, if any
    pub async fn load(&self) -> Result<Option<CachedScan>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let data = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|e| Error::CachePersistence(e.to_string()))?;

        let snapshot: CachedScan =
            serde_json::from_str(&data).map_err(|e| Error::CachePersistence(e.to_string()))?;

        Ok(Some(snapshot))
    }

    /// Remove the stored snapshot
    pub async fn clear(&self) -> Result<()> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::CachePersistence(e.to_string())),
        }
    }
}
