//! RevokeShield - batch token-approval auditor and revocation engine
//!
//! Audits wallets for outstanding ERC-20/BEP-20/TRC-20 spending approvals
//! via the remote detection service and drives zero-allowance revocation
//! transactions through a connected wallet bridge.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use revoke_shield::chain::Chain;
use revoke_shield::cli::commands;
use revoke_shield::config::Config;

/// RevokeShield - token approval auditor
#[derive(Parser)]
#[command(name = "rshield")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan wallets for outstanding token approvals
    Scan {
        /// Wallet addresses (one per line or comma-separated)
        addresses: Option<String>,

        /// Read addresses from a file instead
        #[arg(long)]
        file: Option<PathBuf>,

        /// Target chain: ETH, BSC or TRON
        #[arg(long, default_value = "ETH")]
        chain: Chain,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a forensic risk scan of one wallet
    DeepScan {
        /// Wallet address
        wallet: String,

        /// Target chain: ETH, BSC or TRON
        #[arg(long, default_value = "ETH")]
        chain: Chain,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Revoke one approval by setting its allowance to zero
    Revoke {
        /// Token contract address
        token_address: String,

        /// Spender address to revoke
        spender: String,

        /// Skip confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Inspect or clear the last-scan cache
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },

    /// Show current configuration
    Config,
}

#[derive(Subcommand)]
enum CacheAction {
    /// Show the cached snapshot
    Show,

    /// Remove the cached snapshot
    Clear,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("revoke_shield=info".parse().unwrap()),
        )
        .with_target(true)
        .init();

    // Parse CLI arguments
    let cli = Cli::parse();

    // Load configuration
    let config = match Config::load(&cli.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    // Execute command
    let result = match cli.command {
        Commands::Scan {
            addresses,
            file,
            chain,
            json,
        } => {
            let raw_input = match (addresses, file) {
                (_, Some(path)) => std::fs::read_to_string(&path)
                    .map_err(|e| anyhow::anyhow!("Cannot read {}: {}", path.display(), e))?,
                (Some(text), None) => text,
                (None, None) => anyhow::bail!("Provide addresses or --file"),
            };
            commands::scan(&config, &raw_input, chain, json).await
        }
        Commands::DeepScan {
            wallet,
            chain,
            json,
        } => commands::deep_scan(&config, &wallet, chain, json).await,
        Commands::Revoke {
            token_address,
            spender,
            yes,
        } => commands::revoke(&config, &token_address, &spender, yes).await,
        Commands::Cache { action } => match action {
            CacheAction::Show => commands::cache_show(&config).await,
            CacheAction::Clear => commands::cache_clear(&config).await,
        },
        Commands::Config => commands::show_config(&config),
    };

    if let Err(e) = result {
        error!("Command failed: {}", e);
        std::process::exit(1);
    }

    Ok(())
}
