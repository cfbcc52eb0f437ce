//! Target chain selection
//!
//! The chain determines which token standard's approve-semantics apply and
//! is sent verbatim to the remote collaborators.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported target chains
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Chain {
    Eth,
    Bsc,
    Tron,
}

impl Default for Chain {
    fn default() -> Self {
        Self::Eth
    }
}

impl Chain {
    /// Token approval standard on this chain (display only)
    pub fn token_standard(&self) -> &'static str {
        match self {
            Chain::Eth => "ERC-20",
            Chain::Bsc => "BEP-20",
            Chain::Tron => "TRC-20",
        }
    }

    /// Wire name sent to the remote services
    pub fn wire_name(&self) -> &'static str {
        match self {
            Chain::Eth => "ETH",
            Chain::Bsc => "BSC",
            Chain::Tron => "TRON",
        }
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

impl FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "ETH" | "ETHEREUM" => Ok(Chain::Eth),
            "BSC" | "BNB" => Ok(Chain::Bsc),
            "TRON" | "TRX" => Ok(Chain::Tron),
            other => Err(format!("Unknown chain: {other} (expected ETH, BSC or TRON)")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chain_names() {
        assert_eq!("eth".parse::<Chain>().unwrap(), Chain::Eth);
        assert_eq!(" BNB ".parse::<Chain>().unwrap(), Chain::Bsc);
        assert_eq!("Tron".parse::<Chain>().unwrap(), Chain::Tron);
        assert!("DOGE".parse::<Chain>().is_err());
    }

    #[test]
    fn test_wire_serialization() {
        assert_eq!(serde_json::to_string(&Chain::Eth).unwrap(), "\"ETH\"");
        assert_eq!(serde_json::to_string(&Chain::Tron).unwrap(), "\"TRON\"");
        let chain: Chain = serde_json::from_str("\"BSC\"").unwrap();
        assert_eq!(chain, Chain::Bsc);
    }

    #[test]
    fn test_default_is_eth() {
        assert_eq!(Chain::default(), Chain::Eth);
    }
}
