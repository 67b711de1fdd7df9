//! Structural anomaly records.
//!
//! The ledger's own data can be contradictory — forked chains, conflicting
//! duplicates, references to hashes nobody has sent. None of that aborts
//! ingestion; each contradiction is recorded here alongside a best-effort
//! resolution so any consumer can inspect it.

use serde::{Deserialize, Serialize};

use crate::block::RefField;

/// A recorded structural anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case", rename_all_fields = "camelCase")]
pub enum Anomaly {
    /// Input rejected before indexing — missing required field or a negative
    /// balance. The block was discarded.
    Malformed {
        /// Hash as delivered; may be empty if that was the problem.
        hash: String,
        reason: String,
        /// Unix timestamp of when the rejection was observed.
        observed_at: i64,
    },
    /// A previously-seen hash arrived with different content. The original
    /// block is retained; the conflicting payload is dropped.
    DuplicateConflict { hash: String, observed_at: i64 },
    /// More than one block in the account claims an empty `previous`. The
    /// lexicographically smallest hash is exposed as genesis.
    ForkedGenesis {
        account: String,
        chosen: String,
        rejected: Vec<String>,
    },
    /// More than one block in the account claims the same `previous`. The
    /// lexicographically smallest hash extends the chain; the rest are held
    /// as pending siblings.
    Fork {
        account: String,
        previous: String,
        chosen: String,
        rejected: Vec<String>,
    },
    /// A cross-reference names a hash the index has never seen. Held and
    /// retried when the awaited hash arrives; never escalated.
    Dangling {
        waiter: String,
        field: RefField,
        awaited: String,
    },
    /// A block's cross-reference names its own hash. Rejected, no edge.
    SelfReference { hash: String, field: RefField },
}

impl Anomaly {
    pub fn kind(&self) -> AnomalyKind {
        match self {
            Self::Malformed { .. } => AnomalyKind::Malformed,
            Self::DuplicateConflict { .. } => AnomalyKind::DuplicateConflict,
            Self::ForkedGenesis { .. } => AnomalyKind::ForkedGenesis,
            Self::Fork { .. } => AnomalyKind::Fork,
            Self::Dangling { .. } => AnomalyKind::Dangling,
            Self::SelfReference { .. } => AnomalyKind::SelfReference,
        }
    }
}

/// Discriminant-only view of [`Anomaly`], for filtering and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AnomalyKind {
    Malformed,
    DuplicateConflict,
    ForkedGenesis,
    Fork,
    Dangling,
    SelfReference,
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed"),
            Self::DuplicateConflict => write!(f, "duplicate-conflict"),
            Self::ForkedGenesis => write!(f, "forked-genesis"),
            Self::Fork => write!(f, "fork"),
            Self::Dangling => write!(f, "dangling"),
            Self::SelfReference => write!(f, "self-reference"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_matches_variant() {
        let a = Anomaly::Fork {
            account: "xtb:a".into(),
            previous: "G".into(),
            chosen: "A".into(),
            rejected: vec!["B".into()],
        };
        assert_eq!(a.kind(), AnomalyKind::Fork);
        assert_eq!(a.kind().to_string(), "fork");
    }

    #[test]
    fn serializes_with_kind_tag() {
        let a = Anomaly::Dangling {
            waiter: "W".into(),
            field: RefField::Link,
            awaited: "S".into(),
        };
        let v = serde_json::to_value(&a).unwrap();
        assert_eq!(v["kind"], "dangling");
        assert_eq!(v["awaited"], "S");
    }
}
