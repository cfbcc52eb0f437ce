//! Free-form wallet address list parsing
//!
//! Input comes from a textarea-style paste: one address per line or
//! comma-separated. Candidates are trimmed and empties dropped; duplicates
//! are kept as given since scanning is idempotent per address. No format
//! validation happens here - a malformed address surfaces as a per-wallet
//! lookup failure downstream.

/// Split raw text into an ordered list of candidate wallet addresses
pub fn parse_addresses(raw: &str) -> Vec<String> {
    raw.split(['\n', ','])
        .map(str::trim)
        .filter(|w| !w.is_empty())
        .map(str::to_string)
        .collect()
}
