//! RevokeShield Library
//!
//! Batch approval audit and revocation engine: scans wallets for
//! outstanding token-spending approvals and revokes risky ones through a
//! connected signer.

pub mod approval;
pub mod cache;
pub mod chain;
pub mod cli;
pub mod config;
pub mod deepscan;
pub mod engine;
pub mod error;
pub mod parser;
pub mod revoke;
pub mod scan;
pub mod signer;

// Re-export commonly used types
pub use config::Config;
pub use error::{Error, Result};
