//! Ingest coordination — the single logical writer.
//!
//! Owns all mutable resolver state and serializes inserts: chain re-linking
//! and dangling-reference retry are not commutative across a race, so one
//! writer applies them in arrival order and publishes immutable
//! [`GraphModel`] snapshots for lock-free reading.
//!
//! Per-insert pipeline:
//!
//! ```text
//! validate → index → re-link affected account → resolve own references
//!          → retry references awaiting this hash → refresh summary
//! ```
//!
//! Structural anomalies (forks, duplicate conflicts, danglings) never abort
//! ingestion; the only hard rejection is malformed input.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::anomaly::Anomaly;
use crate::block::Block;
use crate::chain::{Chain, ChainAssembler};
use crate::graph::GraphModel;
use crate::index::{BlockIndex, IndexOutcome};
use crate::resolve::CrossReferenceResolver;
use crate::summary::{AccountSummary, AccountSummaryBuilder};

/// Outcome of [`IngestCoordinator::ingest`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// New block accepted and woven into the graph.
    Inserted,
    /// Identical content already known — a no-op.
    DuplicateIgnored,
    /// Same hash, different content. Original retained, conflict recorded.
    DuplicateConflict,
    /// Malformed input, discarded before indexing.
    Rejected(String),
}

/// Applies inserts idempotently and re-runs the minimal re-resolution each
/// one needs: only the affected account is re-walked, and only references
/// waiting on the new hash are retried.
#[derive(Debug, Default)]
pub struct IngestCoordinator {
    index: BlockIndex,
    assembler: ChainAssembler,
    resolver: CrossReferenceResolver,
    /// Latest assembled chain per account. `Arc` so snapshots share
    /// unaffected accounts across ingests.
    chains: HashMap<String, Arc<Chain>>,
    /// Accounts in order of first appearance of their genesis.
    account_order: Vec<String>,
    registered: HashSet<String>,
    /// Arrival-ordered anomaly events (malformed, duplicate conflict,
    /// self-reference).
    events: Vec<Anomaly>,
    summaries: HashMap<String, AccountSummary>,
}

impl IngestCoordinator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply one block from the feed.
    ///
    /// A pure in-memory transition — never blocks on I/O.
    pub fn ingest(&mut self, block: Block) -> InsertOutcome {
        if let Err(err) = block.validate() {
            let reason = err.reason().to_string();
            tracing::warn!(hash = %block.hash, %reason, "Rejecting malformed block");
            self.events.push(Anomaly::Malformed {
                hash: block.hash.clone(),
                reason: reason.clone(),
                observed_at: chrono::Utc::now().timestamp(),
            });
            return InsertOutcome::Rejected(reason);
        }

        let block = Arc::new(block);
        match self.index.insert(Arc::clone(&block)) {
            IndexOutcome::DuplicateIgnored => {
                tracing::debug!(hash = %block.hash, "Duplicate block ignored");
                return InsertOutcome::DuplicateIgnored;
            }
            IndexOutcome::DuplicateConflict => {
                tracing::warn!(hash = %block.hash, "Conflicting duplicate, original retained");
                self.events.push(Anomaly::DuplicateConflict {
                    hash: block.hash.clone(),
                    observed_at: chrono::Utc::now().timestamp(),
                });
                return InsertOutcome::DuplicateConflict;
            }
            IndexOutcome::Inserted => {}
        }

        self.assembler.add(Arc::clone(&block));
        self.relink(&block.account);

        let self_refs = self.resolver.resolve(&block, &self.index);
        self.events.extend(self_refs);
        let retried = self.resolver.on_arrival(&block.hash);

        tracing::debug!(
            hash = %block.hash,
            account = %block.account,
            action = %block.action,
            retried,
            "Block ingested"
        );
        InsertOutcome::Inserted
    }

    /// Re-walk one account's chain and refresh its summary.
    fn relink(&mut self, account: &str) {
        let Some(chain) = self.assembler.assemble(account) else {
            return;
        };
        if !chain.is_empty() && !self.registered.contains(account) {
            self.registered.insert(account.to_string());
            self.account_order.push(account.to_string());
        }
        self.summaries
            .insert(account.to_string(), AccountSummaryBuilder::build(&chain));
        self.chains.insert(account.to_string(), Arc::new(chain));
    }

    /// Publish an immutable snapshot of the current graph.
    pub fn current_graph(&self) -> Arc<GraphModel> {
        Arc::new(GraphModel::new(
            self.index.snapshot(),
            self.chains.clone(),
            self.account_order.clone(),
            self.resolver.edges_snapshot(),
            self.resolver.awaiting_snapshot(),
            self.events.clone(),
            self.resolver.dangling(),
        ))
    }

    /// Per-account summaries, refreshed only for accounts whose chain
    /// changed in an ingest cycle.
    pub fn account_summaries(&self) -> &HashMap<String, AccountSummary> {
        &self.summaries
    }

    /// All recorded anomalies, in the published snapshot's order.
    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.current_graph().anomalies().to_vec()
    }

    pub fn block_count(&self) -> usize {
        self.index.len()
    }
}
