//! Cross-reference resolution.
//!
//! Resolves a block's hash-valued references (`link`, `left`, `right`) into
//! typed [`Edge`]s. A reference to an unknown hash is held in an inverse
//! "awaited hash → waiters" index and retried exactly when that hash
//! arrives, so resolution stays amortized near-linear instead of re-scanning
//! the whole block set on every insert.

use std::collections::{BTreeSet, HashMap};

use crate::anomaly::Anomaly;
use crate::block::{Block, RefField};
use crate::edge::{Edge, EdgeKind};
use crate::index::BlockIndex;

/// A reference parked until its target hash arrives.
#[derive(Debug, Clone)]
struct Waiter {
    hash: String,
    field: RefField,
    kind: EdgeKind,
}

/// Resolves cross-chain references into edges, tracking what is still
/// dangling.
#[derive(Debug, Default)]
pub struct CrossReferenceResolver {
    /// from-hash → resolved reference edges (chain edges live with the
    /// assembled chains, not here).
    edges_from: HashMap<String, Vec<Edge>>,
    /// awaited hash → references waiting on it.
    waiters: HashMap<String, Vec<Waiter>>,
    /// waiter hash → awaited hashes still outstanding.
    awaiting: HashMap<String, BTreeSet<String>>,
}

impl CrossReferenceResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve a newly indexed block's own references.
    ///
    /// Returns any `SelfReference` anomalies found; those references are
    /// rejected outright and never retried.
    pub fn resolve(&mut self, block: &Block, index: &BlockIndex) -> Vec<Anomaly> {
        let mut anomalies = Vec::new();
        for r in block.cross_references() {
            if r.target == block.hash {
                tracing::warn!(hash = %block.hash, field = %r.field, "Self-referential block");
                anomalies.push(Anomaly::SelfReference {
                    hash: block.hash.clone(),
                    field: r.field,
                });
                continue;
            }
            if index.contains(&r.target) {
                self.emit(Edge::new(block.hash.clone(), r.target, r.kind));
            } else {
                tracing::debug!(
                    waiter = %block.hash,
                    awaited = %r.target,
                    "Reference target unknown, holding"
                );
                self.waiters.entry(r.target.clone()).or_default().push(Waiter {
                    hash: block.hash.clone(),
                    field: r.field,
                    kind: r.kind,
                });
                self.awaiting
                    .entry(block.hash.clone())
                    .or_default()
                    .insert(r.target);
            }
        }
        anomalies
    }

    /// Retry every reference that was waiting on `hash`.
    ///
    /// Returns the number of references resolved.
    pub fn on_arrival(&mut self, hash: &str) -> usize {
        let Some(waiters) = self.waiters.remove(hash) else {
            return 0;
        };
        let resolved = waiters.len();
        for w in waiters {
            if let Some(outstanding) = self.awaiting.get_mut(&w.hash) {
                outstanding.remove(hash);
                if outstanding.is_empty() {
                    self.awaiting.remove(&w.hash);
                }
            }
            self.emit(Edge::new(w.hash, hash.to_string(), w.kind));
        }
        tracing::debug!(arrived = %hash, resolved, "Retried dangling references");
        resolved
    }

    fn emit(&mut self, edge: Edge) {
        let slot = self.edges_from.entry(edge.from.clone()).or_default();
        if !slot.contains(&edge) {
            slot.push(edge);
        }
    }

    /// Resolved reference edges originating at `hash`.
    pub fn edges_from(&self, hash: &str) -> &[Edge] {
        self.edges_from.get(hash).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns `true` if `hash` still has unresolved references.
    pub fn is_awaiting(&self, hash: &str) -> bool {
        self.awaiting.contains_key(hash)
    }

    /// Outstanding dangling references as anomaly records, in deterministic
    /// (awaited, waiter) order.
    pub fn dangling(&self) -> Vec<Anomaly> {
        let mut awaited: Vec<&String> = self.waiters.keys().collect();
        awaited.sort();
        let mut out = Vec::new();
        for a in awaited {
            let mut ws: Vec<&Waiter> = self.waiters[a].iter().collect();
            ws.sort_by(|x, y| (&x.hash, x.field).cmp(&(&y.hash, y.field)));
            for w in ws {
                out.push(Anomaly::Dangling {
                    waiter: w.hash.clone(),
                    field: w.field,
                    awaited: a.clone(),
                });
            }
        }
        out
    }

    pub(crate) fn edges_snapshot(&self) -> HashMap<String, Vec<Edge>> {
        self.edges_from.clone()
    }

    pub(crate) fn awaiting_snapshot(&self) -> HashMap<String, BTreeSet<String>> {
        self.awaiting.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anomaly::AnomalyKind;
    use crate::block::Action;
    use std::sync::Arc;

    fn block(hash: &str, account: &str, action: Action) -> Block {
        Block {
            hash: hash.into(),
            account: account.into(),
            action,
            previous: String::new(),
            link: String::new(),
            left: None,
            right: None,
            balance: 0.0,
            token: None,
            representative: None,
            signature: None,
        }
    }

    fn indexed(index: &mut BlockIndex, b: Block) -> Block {
        index.insert(Arc::new(b.clone()));
        b
    }

    #[test]
    fn resolves_known_target_immediately() {
        let mut index = BlockIndex::new();
        let mut resolver = CrossReferenceResolver::new();

        indexed(&mut index, block("SEND1", "xtb:a", Action::Send));
        let mut recv = block("RECV1", "xtb:b", Action::Receive);
        recv.link = "SEND1".into();
        indexed(&mut index, recv.clone());

        assert!(resolver.resolve(&recv, &index).is_empty());
        assert_eq!(
            resolver.edges_from("RECV1"),
            &[Edge::new("RECV1", "SEND1", EdgeKind::Transfer)]
        );
        assert!(!resolver.is_awaiting("RECV1"));
        assert!(resolver.dangling().is_empty());
    }

    #[test]
    fn unknown_target_dangles_then_resolves_on_arrival() {
        let mut index = BlockIndex::new();
        let mut resolver = CrossReferenceResolver::new();

        let mut recv = block("RECV1", "xtb:b", Action::Receive);
        recv.link = "SEND1".into();
        indexed(&mut index, recv.clone());
        resolver.resolve(&recv, &index);

        assert!(resolver.is_awaiting("RECV1"));
        assert_eq!(resolver.dangling().len(), 1);
        assert!(resolver.edges_from("RECV1").is_empty());

        // The awaited send arrives.
        indexed(&mut index, block("SEND1", "xtb:a", Action::Send));
        assert_eq!(resolver.on_arrival("SEND1"), 1);

        assert!(!resolver.is_awaiting("RECV1"));
        assert!(resolver.dangling().is_empty());
        assert_eq!(
            resolver.edges_from("RECV1"),
            &[Edge::new("RECV1", "SEND1", EdgeKind::Transfer)]
        );
    }

    #[test]
    fn commit_awaits_both_legs() {
        let mut index = BlockIndex::new();
        let mut resolver = CrossReferenceResolver::new();

        indexed(&mut index, block("L1", "xtb:a", Action::Send));
        let mut commit = block("C1", "xtb:swap", Action::Commit);
        commit.left = Some("L1".into());
        commit.right = Some("R1".into());
        indexed(&mut index, commit.clone());
        resolver.resolve(&commit, &index);

        // Left leg resolved, right leg outstanding.
        assert_eq!(resolver.edges_from("C1").len(), 1);
        assert!(resolver.is_awaiting("C1"));

        indexed(&mut index, block("R1", "xtb:b", Action::Send));
        resolver.on_arrival("R1");

        assert!(!resolver.is_awaiting("C1"));
        let mut kinds: Vec<EdgeKind> =
            resolver.edges_from("C1").iter().map(|e| e.kind).collect();
        kinds.sort();
        assert_eq!(kinds, vec![EdgeKind::SwapLeft, EdgeKind::SwapRight]);
    }

    #[test]
    fn self_reference_rejected_without_edge() {
        let mut index = BlockIndex::new();
        let mut resolver = CrossReferenceResolver::new();

        let mut b = block("X", "xtb:a", Action::Receive);
        b.link = "X".into();
        indexed(&mut index, b.clone());

        let anomalies = resolver.resolve(&b, &index);
        assert_eq!(anomalies.len(), 1);
        assert_eq!(anomalies[0].kind(), AnomalyKind::SelfReference);
        assert!(resolver.edges_from("X").is_empty());
        assert!(!resolver.is_awaiting("X")); // rejected, not dangling
    }

    #[test]
    fn multiple_waiters_on_one_hash() {
        let mut index = BlockIndex::new();
        let mut resolver = CrossReferenceResolver::new();

        for (hash, account) in [("RECV1", "xtb:b"), ("RECV2", "xtb:c")] {
            let mut r = block(hash, account, Action::Open);
            r.link = "SEND1".into();
            indexed(&mut index, r.clone());
            resolver.resolve(&r, &index);
        }
        assert_eq!(resolver.dangling().len(), 2);

        indexed(&mut index, block("SEND1", "xtb:a", Action::Send));
        assert_eq!(resolver.on_arrival("SEND1"), 2);
        assert!(resolver.dangling().is_empty());
    }
}
