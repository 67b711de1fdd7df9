//! Per-account chain assembly.
//!
//! Each account owns a private, singly-linked chain of blocks. Blocks arrive
//! in no guaranteed order, so assembly is a re-walk from genesis over a
//! `previous → successors` index rather than an append: inserting a block
//! re-walks only that one account, and the result converges to the same
//! chain no matter the arrival order.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::anomaly::Anomaly;
use crate::block::Block;

// ─── Chain ────────────────────────────────────────────────────────────────────

/// Assembly state of an account's chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ChainState {
    /// No genesis candidate yet; all blocks held pending.
    Incomplete,
    /// Genesis found, but some known blocks are not on the walk — a gap
    /// awaiting arrivals, or fork siblings. Not an error.
    Pending,
    /// Every known block of the account is on the walk.
    Linked,
}

impl std::fmt::Display for ChainState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Incomplete => write!(f, "incomplete"),
            Self::Pending => write!(f, "pending"),
            Self::Linked => write!(f, "linked"),
        }
    }
}

/// The assembled chain for one account: the ordered walk from genesis, plus
/// whatever could not be linked yet.
#[derive(Debug)]
pub struct Chain {
    account: String,
    /// The walk, genesis first.
    blocks: Vec<Arc<Block>>,
    /// Hashes on the walk, for O(1) membership checks.
    linked: HashSet<String>,
    /// Known blocks not on the walk, sorted by hash.
    pending: Vec<Arc<Block>>,
    state: ChainState,
    /// Fork / forked-genesis anomalies found during this walk. Recomputed on
    /// every re-assembly so they converge regardless of arrival order.
    anomalies: Vec<Anomaly>,
}

impl Chain {
    pub fn account(&self) -> &str {
        &self.account
    }

    /// The ordered walk, genesis first.
    pub fn blocks(&self) -> &[Arc<Block>] {
        &self.blocks
    }

    /// The current tail — the most recently linked block, which may not be
    /// the globally latest block if the chain is pending.
    pub fn tail(&self) -> Option<&Arc<Block>> {
        self.blocks.last()
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    /// Blocks known for this account but not linked into the walk.
    pub fn pending(&self) -> &[Arc<Block>] {
        &self.pending
    }

    pub fn anomalies(&self) -> &[Anomaly] {
        &self.anomalies
    }

    /// Returns `true` if `hash` is on the walk.
    pub fn is_linked(&self, hash: &str) -> bool {
        self.linked.contains(hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

// ─── ChainAssembler ───────────────────────────────────────────────────────────

/// Per-account block set with a `previous → successors` index.
#[derive(Debug, Default)]
struct AccountBlocks {
    by_hash: HashMap<String, Arc<Block>>,
    /// previous hash → successor hashes, kept sorted for deterministic
    /// tie-breaks.
    successors: HashMap<String, Vec<String>>,
    /// Genesis candidates (empty `previous`), kept sorted.
    genesis: Vec<String>,
}

impl AccountBlocks {
    fn add(&mut self, block: Arc<Block>) {
        if self.by_hash.contains_key(&block.hash) {
            return;
        }
        let hash = block.hash.clone();
        if block.is_genesis() {
            insert_sorted(&mut self.genesis, hash.clone());
        } else {
            insert_sorted(
                self.successors.entry(block.previous.clone()).or_default(),
                hash.clone(),
            );
        }
        self.by_hash.insert(hash, block);
    }
}

fn insert_sorted(v: &mut Vec<String>, value: String) {
    if let Err(pos) = v.binary_search(&value) {
        v.insert(pos, value);
    }
}

/// Groups blocks by account and orders each group into a [`Chain`].
///
/// Re-assembly is incremental: [`ChainAssembler::assemble`] walks a single
/// account; other accounts' state is untouched.
#[derive(Debug, Default)]
pub struct ChainAssembler {
    accounts: HashMap<String, AccountBlocks>,
}

impl ChainAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a block under its account. Idempotent per hash.
    pub fn add(&mut self, block: Arc<Block>) {
        self.accounts
            .entry(block.account.clone())
            .or_default()
            .add(block);
    }

    /// Walk one account's blocks into an ordered chain.
    ///
    /// Genesis selection and every fork advance use the lexicographically
    /// smallest hash as the deterministic tie-break; all contenders are
    /// retained as pending so nothing is lost.
    pub fn assemble(&self, account: &str) -> Option<Chain> {
        let set = self.accounts.get(account)?;

        let mut anomalies = Vec::new();
        let mut blocks: Vec<Arc<Block>> = Vec::new();
        let mut linked: HashSet<String> = HashSet::new();

        if set.genesis.is_empty() {
            let pending = sorted_blocks(set, &linked);
            return Some(Chain {
                account: account.to_string(),
                blocks,
                linked,
                pending,
                state: ChainState::Incomplete,
                anomalies,
            });
        }

        if set.genesis.len() > 1 {
            anomalies.push(Anomaly::ForkedGenesis {
                account: account.to_string(),
                chosen: set.genesis[0].clone(),
                rejected: set.genesis[1..].to_vec(),
            });
        }

        let head = set.genesis[0].clone();
        linked.insert(head.clone());
        blocks.push(Arc::clone(&set.by_hash[&head]));

        loop {
            let tail_hash = &blocks[blocks.len() - 1].hash;
            let candidates: Vec<&String> = match set.successors.get(tail_hash) {
                Some(succ) => succ.iter().filter(|h| !linked.contains(*h)).collect(),
                None => break,
            };
            let Some(next) = candidates.first() else {
                break;
            };
            if candidates.len() > 1 {
                anomalies.push(Anomaly::Fork {
                    account: account.to_string(),
                    previous: tail_hash.clone(),
                    chosen: (*next).clone(),
                    rejected: candidates[1..].iter().map(|h| (*h).clone()).collect(),
                });
            }
            let next = (*next).clone();
            linked.insert(next.clone());
            blocks.push(Arc::clone(&set.by_hash[&next]));
        }

        let pending = sorted_blocks(set, &linked);
        let state = if pending.is_empty() {
            ChainState::Linked
        } else {
            ChainState::Pending
        };

        Some(Chain {
            account: account.to_string(),
            blocks,
            linked,
            pending,
            state,
            anomalies,
        })
    }

    /// Accounts with at least one known block, in arbitrary order.
    pub fn accounts(&self) -> impl Iterator<Item = &str> {
        self.accounts.keys().map(String::as_str)
    }
}

fn sorted_blocks(set: &AccountBlocks, exclude: &HashSet<String>) -> Vec<Arc<Block>> {
    let mut hashes: Vec<&String> = set
        .by_hash
        .keys()
        .filter(|h| !exclude.contains(*h))
        .collect();
    hashes.sort();
    hashes
        .into_iter()
        .map(|h| Arc::clone(&set.by_hash[h]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalyKind;
    use crate::block::Action;

    fn block(hash: &str, previous: &str, balance: f64) -> Arc<Block> {
        Arc::new(Block {
            hash: hash.into(),
            account: "xtb:Account1".into(),
            action: if previous.is_empty() {
                Action::Issue
            } else {
                Action::Change
            },
            previous: previous.into(),
            link: String::new(),
            left: None,
            right: None,
            balance,
            token: None,
            representative: None,
            signature: None,
        })
    }

    fn hashes(chain: &Chain) -> Vec<&str> {
        chain.blocks().iter().map(|b| b.hash.as_str()).collect()
    }

    #[test]
    fn assembles_in_order() {
        let mut asm = ChainAssembler::new();
        asm.add(block("G", "", 100.0));
        asm.add(block("B1", "G", 90.0));
        asm.add(block("B2", "B1", 80.0));

        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(hashes(&chain), vec!["G", "B1", "B2"]);
        assert_eq!(chain.state(), ChainState::Linked);
        assert!(chain.anomalies().is_empty());
        assert_eq!(chain.tail().unwrap().balance, 80.0);
    }

    #[test]
    fn converges_out_of_order() {
        let mut asm = ChainAssembler::new();
        asm.add(block("B2", "B1", 80.0));
        asm.add(block("G", "", 100.0));
        asm.add(block("B1", "G", 90.0));

        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(hashes(&chain), vec!["G", "B1", "B2"]);
        assert_eq!(chain.state(), ChainState::Linked);
        assert!(chain.anomalies().is_empty());
    }

    #[test]
    fn no_genesis_is_incomplete() {
        let mut asm = ChainAssembler::new();
        asm.add(block("B2", "B1", 80.0));
        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(chain.state(), ChainState::Incomplete);
        assert!(chain.is_empty());
        assert_eq!(chain.pending().len(), 1);
    }

    #[test]
    fn gap_leaves_chain_pending() {
        let mut asm = ChainAssembler::new();
        asm.add(block("G", "", 100.0));
        asm.add(block("B2", "B1", 80.0)); // B1 missing
        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(hashes(&chain), vec!["G"]);
        assert_eq!(chain.state(), ChainState::Pending);
        assert_eq!(chain.pending().len(), 1);
        assert!(chain.anomalies().is_empty()); // a gap is not an anomaly
    }

    #[test]
    fn fork_picks_smallest_hash_and_records_anomaly() {
        let mut asm = ChainAssembler::new();
        asm.add(block("G", "", 100.0));
        asm.add(block("B-high", "G", 90.0));
        asm.add(block("A-low", "G", 90.0));

        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(hashes(&chain), vec!["G", "A-low"]);
        assert_eq!(chain.anomalies().len(), 1);
        assert_eq!(chain.anomalies()[0].kind(), AnomalyKind::Fork);
        match &chain.anomalies()[0] {
            Anomaly::Fork {
                previous, chosen, rejected, ..
            } => {
                assert_eq!(previous, "G");
                assert_eq!(chosen, "A-low");
                assert_eq!(rejected, &vec!["B-high".to_string()]);
            }
            other => panic!("unexpected anomaly: {other:?}"),
        }
        // The loser stays available as a pending sibling.
        assert_eq!(chain.pending().len(), 1);
        assert_eq!(chain.pending()[0].hash, "B-high");
    }

    #[test]
    fn forked_genesis_tie_break() {
        let mut asm = ChainAssembler::new();
        asm.add(block("G2", "", 100.0));
        asm.add(block("G1", "", 100.0));

        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(hashes(&chain), vec!["G1"]);
        assert_eq!(chain.anomalies()[0].kind(), AnomalyKind::ForkedGenesis);
    }

    #[test]
    fn self_referential_previous_does_not_loop() {
        let mut asm = ChainAssembler::new();
        asm.add(block("G", "", 100.0));
        asm.add(block("X", "X", 90.0)); // previous == own hash
        let chain = asm.assemble("xtb:Account1").unwrap();
        assert_eq!(hashes(&chain), vec!["G"]);
        assert_eq!(chain.state(), ChainState::Pending);
    }

    #[test]
    fn unknown_account_is_none() {
        let asm = ChainAssembler::new();
        assert!(asm.assemble("xtb:Nobody").is_none());
    }
}
