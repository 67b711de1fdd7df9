//! Hash-keyed block index — the single source of truth for known blocks.

use std::collections::HashMap;
use std::sync::Arc;

use crate::block::Block;

/// Outcome of inserting a block into the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexOutcome {
    /// First time this hash was seen; block stored.
    Inserted,
    /// Same hash, identical content — a no-op.
    DuplicateIgnored,
    /// Same hash, different content. The original is retained; the ledger's
    /// append-only contract was violated by the input, not by the resolver.
    DuplicateConflict,
}

/// Stores every accepted block, keyed by hash. O(1) lookup.
///
/// Blocks are never mutated or deleted for the lifetime of the process.
#[derive(Debug, Default)]
pub struct BlockIndex {
    blocks: HashMap<String, Arc<Block>>,
}

impl BlockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a block, detecting duplicate hashes.
    pub fn insert(&mut self, block: Arc<Block>) -> IndexOutcome {
        match self.blocks.get(&block.hash) {
            Some(existing) if **existing == *block => IndexOutcome::DuplicateIgnored,
            Some(_) => IndexOutcome::DuplicateConflict,
            None => {
                self.blocks.insert(block.hash.clone(), block);
                IndexOutcome::Inserted
            }
        }
    }

    pub fn lookup(&self, hash: &str) -> Option<&Arc<Block>> {
        self.blocks.get(hash)
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.blocks.contains_key(hash)
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Shallow copy of the hash → block map, for snapshot construction.
    pub(crate) fn snapshot(&self) -> HashMap<String, Arc<Block>> {
        self.blocks.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::block::Action;

    fn block(hash: &str, balance: f64) -> Arc<Block> {
        Arc::new(Block {
            hash: hash.into(),
            account: "xtb:Account1".into(),
            action: Action::Issue,
            previous: String::new(),
            link: String::new(),
            left: None,
            right: None,
            balance,
            token: None,
            representative: None,
            signature: None,
        })
    }

    #[test]
    fn insert_then_lookup() {
        let mut index = BlockIndex::new();
        assert_eq!(index.insert(block("A", 1.0)), IndexOutcome::Inserted);
        assert!(index.contains("A"));
        assert_eq!(index.lookup("A").unwrap().balance, 1.0);
        assert!(index.lookup("B").is_none());
    }

    #[test]
    fn identical_duplicate_is_ignored() {
        let mut index = BlockIndex::new();
        index.insert(block("A", 1.0));
        assert_eq!(index.insert(block("A", 1.0)), IndexOutcome::DuplicateIgnored);
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn conflicting_duplicate_keeps_original() {
        let mut index = BlockIndex::new();
        index.insert(block("A", 1.0));
        assert_eq!(index.insert(block("A", 2.0)), IndexOutcome::DuplicateConflict);
        // Original retained
        assert_eq!(index.lookup("A").unwrap().balance, 1.0);
    }
}
