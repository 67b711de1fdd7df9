//! The published read surface — an immutable snapshot of the resolved graph.

use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::block::Block;
use crate::chain::Chain;
use crate::edge::{Edge, EdgeKind};

/// Where an individual block sits in its lifecycle, derived from the
/// snapshot rather than stored — so it converges with the graph itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlockStatus {
    /// Indexed but not yet linked into its account's chain walk.
    ChainPending,
    /// Linked, with at least one cross-reference still dangling.
    AwaitingReferences,
    /// Linked and every cross-reference resolved.
    Complete,
}

/// Immutable aggregate of nodes, typed edges and per-account chains.
///
/// Handed to consumers as `Arc<GraphModel>`; unaffected accounts' chains are
/// shared across snapshots, so publishing after each insert stays cheap.
/// Consumers must not (and cannot) mutate it.
#[derive(Debug)]
pub struct GraphModel {
    blocks: HashMap<String, Arc<Block>>,
    chains: HashMap<String, Arc<Chain>>,
    /// Accounts in order of first appearance of their genesis.
    account_order: Vec<String>,
    /// Resolved reference edges, keyed by origin hash.
    ref_edges: HashMap<String, Vec<Edge>>,
    /// Intra-account `previous` edges, keyed by origin hash. Derived from
    /// the chain walks: pending blocks carry none.
    chain_edges: HashMap<String, Edge>,
    /// waiter hash → awaited hashes still outstanding.
    awaiting: HashMap<String, BTreeSet<String>>,
    anomalies: Vec<Anomaly>,
}

impl GraphModel {
    pub(crate) fn new(
        blocks: HashMap<String, Arc<Block>>,
        chains: HashMap<String, Arc<Chain>>,
        account_order: Vec<String>,
        ref_edges: HashMap<String, Vec<Edge>>,
        awaiting: HashMap<String, BTreeSet<String>>,
        events: Vec<Anomaly>,
        dangling: Vec<Anomaly>,
    ) -> Self {
        let mut chain_edges = HashMap::new();
        for chain in chains.values() {
            for pair in chain.blocks().windows(2) {
                chain_edges.insert(
                    pair[1].hash.clone(),
                    Edge::new(pair[1].hash.clone(), pair[0].hash.clone(), EdgeKind::Chain),
                );
            }
        }

        // Recorded events first (arrival order), then chain anomalies in
        // account order, then outstanding danglings.
        let mut anomalies = events;
        for account in &account_order {
            if let Some(chain) = chains.get(account) {
                anomalies.extend(chain.anomalies().iter().cloned());
            }
        }
        anomalies.extend(dangling);

        Self {
            blocks,
            chains,
            account_order,
            ref_edges,
            chain_edges,
            awaiting,
            anomalies,
        }
    }

    /// An empty snapshot, for consumers wired up before the first block.
    pub fn empty() -> Self {
        Self::new(
            HashMap::new(),
            HashMap::new(),
            Vec::new(),
            HashMap::new(),
            HashMap::new(),
            Vec::new(),
            Vec::new(),
        )
    }

    pub fn chain_of(&self, account: &str) -> Option<&Arc<Chain>> {
        self.chains.get(account)
    }

    pub fn block_by_hash(&self, hash: &str) -> Option<&Arc<Block>> {
        self.blocks.get(hash)
    }

    /// All edges originating at `hash` — the chain edge (if linked) plus any
    /// resolved reference edges.
    pub fn edges_from(&self, hash: &str) -> Vec<Edge> {
        let mut out = Vec::new();
        if let Some(e) = self.chain_edges.get(hash) {
            out.push(e.clone());
        }
        if let Some(refs) = self.ref_edges.get(hash) {
            out.extend(refs.iter().cloned());
        }
        out
    }

    /// Every edge in the graph, in deterministic order.
    pub fn edges(&self) -> Vec<Edge> {
        let mut out: Vec<Edge> = self.chain_edges.values().cloned().collect();
        out.extend(self.ref_edges.values().flatten().cloned());
        out.sort();
        out
    }

    /// Accounts in order of first appearance of their genesis block.
    pub fn accounts(&self) -> &[String] {
        &self.account_order
    }

    /// All recorded anomalies: malformed / duplicate / self-reference events
    /// in arrival order, fork anomalies per account, then outstanding
    /// dangling references.
    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    pub fn block_status(&self, hash: &str) -> Option<BlockStatus> {
        let block = self.blocks.get(hash)?;
        let chain = self.chains.get(&block.account)?;
        if !chain.is_linked(hash) {
            return Some(BlockStatus::ChainPending);
        }
        if self.awaiting.contains_key(hash) {
            return Some(BlockStatus::AwaitingReferences);
        }
        Some(BlockStatus::Complete)
    }

    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn account_count(&self) -> usize {
        self.account_order.len()
    }
}
