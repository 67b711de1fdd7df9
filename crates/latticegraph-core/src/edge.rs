//! Typed, directed edges between block hashes.

use serde::{Deserialize, Serialize};

/// Classification of a resolved reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    /// Intra-account `previous` link.
    Chain,
    /// `open` / `receive` / `create-order` → the referenced send/order block.
    Transfer,
    /// Swap leg posted into escrow (`offer.left`, `commit.left`).
    SwapLeft,
    /// Counter-party's send completing the swap (`commit.right`).
    SwapRight,
}

impl std::fmt::Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Chain => write!(f, "chain"),
            Self::Transfer => write!(f, "transfer"),
            Self::SwapLeft => write!(f, "swap-left"),
            Self::SwapRight => write!(f, "swap-right"),
        }
    }
}

/// A directed reference from one block to another.
///
/// Direction follows the reference: the block that names a hash is `from`,
/// the named block is `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>, kind: EdgeKind) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            kind,
        }
    }
}
