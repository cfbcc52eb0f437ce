//! CLI command implementations

use anyhow::Result;
use dialoguer::Confirm;
use std::sync::Arc;
use tracing::{info, warn};

use crate::approval::RevokeCheckClient;
use crate::cache::ScanCache;
use crate::chain::Chain;
use crate::config::Config;
use crate::deepscan::DeepScanClient;
use crate::engine::AuditEngine;
use crate::revoke::RevokeState;
use crate::scan::ScanResult;
use crate::signer::{BridgeSigner, WalletSigner};

fn build_engine(config: &Config) -> AuditEngine {
    let lookup = Arc::new(RevokeCheckClient::new(
        config.api.base_url.clone(),
        config.api.timeout_ms,
    ));
    let signer = build_signer(config);
    let cache = ScanCache::new(config.cache.path.clone());
    AuditEngine::new(lookup, signer, cache, config.scan.concurrency)
}

fn build_signer(config: &Config) -> Option<Arc<dyn WalletSigner>> {
    config.signer.bridge_url.as_ref().map(|url| {
        Arc::new(BridgeSigner::new(url.clone(), config.signer.timeout_ms))
            as Arc<dyn WalletSigner>
    })
}

/// Audit one or more wallets for outstanding approvals
pub async fn scan(config: &Config, raw_input: &str, chain: Chain, json: bool) -> Result<()> {
    let engine = build_engine(config);
    // Restore the last snapshot at startup; a corrupt cache file is not
    // fatal to a fresh scan
    if let Err(e) = engine.restore().await {
        warn!("Ignoring unreadable scan snapshot: {}", e);
    }
    engine.select_chain(chain);

    info!(%chain, "Scanning wallets for outstanding approvals");
    let results = engine.scan(raw_input).await;

    if results.is_empty() {
        warn!("No wallet addresses found in input");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    for result in &results {
        print_result(result);
    }

    let failed = results.iter().filter(|r| r.failed).count();
    if failed > 0 {
        warn!("{} of {} wallets could not be scanned", failed, results.len());
    }
    Ok(())
}

fn print_result(result: &ScanResult) {
    if result.failed {
        println!("{} — FAILED (detection service unreachable or rejected)", result.wallet);
        return;
    }
    if result.approvals.is_empty() {
        println!("{} — no outstanding approvals", result.wallet);
        return;
    }

    println!(
        "{} — {} outstanding approval(s) [{}]",
        result.wallet,
        result.approvals.len(),
        result.chain.token_standard()
    );
    for approval in &result.approvals {
        println!(
            "  token: {:<12} spender: {}  amount: {}",
            approval.token, approval.spender, approval.amount
        );
        println!("    contract: {}", approval.token_address);
    }
}

/// Run a forensic deep scan of one wallet
pub async fn deep_scan(config: &Config, wallet: &str, chain: Chain, json: bool) -> Result<()> {
    let client = DeepScanClient::new(config.api.base_url.clone(), config.api.timeout_ms);
    let report = client.scan(wallet, chain).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Risk score: {}/10", report.score);
    println!("Wallet:  {}", report.wallet);
    println!("Chain:   {}", report.chain);
    println!("Scanned: {}", report.timestamp);

    if !report.alerts.is_empty() {
        println!("Alerts:");
        for alert in &report.alerts {
            println!("  [{}] {}", alert.severity, alert.description);
        }
    }
    if !report.labels.is_empty() {
        println!("Labels: {}", report.labels.join(", "));
    }
    println!(
        "Summary: {} txs, {} failed, {} blacklisted hits, {} unverified interactions",
        report.summary.transactions,
        report.summary.failed,
        report.summary.blacklisted_hits,
        report.summary.unverified_interactions
    );
    if !report.ai_summary.is_empty() {
        println!("Analysis: {}", report.ai_summary);
    }
    Ok(())
}

/// Revoke one approval by zeroing its allowance
pub async fn revoke(
    config: &Config,
    token_address: &str,
    spender: &str,
    skip_confirm: bool,
) -> Result<()> {
    if !skip_confirm {
        let proceed = Confirm::new()
            .with_prompt(format!(
                "Submit an on-chain transaction revoking {spender} on token {token_address}?"
            ))
            .default(false)
            .interact()?;
        if !proceed {
            info!("Revocation cancelled");
            return Ok(());
        }
    }

    let signer = build_signer(config);
    if signer.is_none() {
        warn!("No signer.bridge_url configured - connect a wallet bridge to revoke");
    }

    let executor = crate::revoke::RevocationExecutor::new(signer);
    match executor.revoke(token_address, spender).await {
        RevokeState::Success { tx_hash } => {
            println!("Revoked: transaction {tx_hash} confirmed");
            Ok(())
        }
        RevokeState::Error { reason } => anyhow::bail!("Revocation failed: {reason}"),
        // revoke() always resolves to a terminal state
        other => anyhow::bail!("Unexpected revocation state: {other:?}"),
    }
}

/// Show the cached snapshot from the last single-wallet scan
pub async fn cache_show(config: &Config) -> Result<()> {
    let cache = ScanCache::new(config.cache.path.clone());
    match cache.load().await? {
        Some(snapshot) => {
            println!(
                "Last scan: {} on {} ({} approvals)",
                snapshot.wallet,
                snapshot.chain,
                snapshot.approvals.len()
            );
            for approval in &snapshot.approvals {
                println!(
                    "  token: {:<12} spender: {}  amount: {}",
                    approval.token, approval.spender, approval.amount
                );
            }
        }
        None => println!("Cache is empty"),
    }
    Ok(())
}

/// Clear the cached snapshot
pub async fn cache_clear(config: &Config) -> Result<()> {
    let cache = ScanCache::new(config.cache.path.clone());
    cache.clear().await?;
    info!("Cache cleared");
    Ok(())
}

/// Show the effective configuration
pub fn show_config(config: &Config) -> Result<()> {
    println!("api.base_url:      {}", config.api.base_url);
    println!("api.timeout_ms:    {}", config.api.timeout_ms);
    println!(
        "signer.bridge_url: {}",
        config.signer.bridge_url.as_deref().unwrap_or("(not set)")
    );
    println!("signer.timeout_ms: {}", config.signer.timeout_ms);
    println!("cache.path:        {}", config.cache.path);
    println!("scan.concurrency:  {}", config.scan.concurrency);
    Ok(())
}
