//! Per-account summaries for balance displays and list views.

use serde::{Deserialize, Serialize};

use crate::chain::{Chain, ChainState};

/// Derived view of one account: its ordered blocks and current balance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub account: String,
    /// Hashes of the chain walk, genesis first.
    pub ordered_blocks: Vec<String>,
    /// Balance of the chain's current tail. May lag the globally latest
    /// block while the chain is pending.
    pub current_balance: f64,
    pub chain_state: ChainState,
}

/// Builds [`AccountSummary`] values from assembled chains.
///
/// The coordinator recomputes a summary only when that account's chain
/// changed in the current ingest cycle.
pub struct AccountSummaryBuilder;

impl AccountSummaryBuilder {
    pub fn build(chain: &Chain) -> AccountSummary {
        AccountSummary {
            account: chain.account().to_string(),
            ordered_blocks: chain.blocks().iter().map(|b| b.hash.clone()).collect(),
            current_balance: chain.tail().map(|b| b.balance).unwrap_or(0.0),
            chain_state: chain.state(),
        }
    }
}
