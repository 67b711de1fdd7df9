//! Ledger block types and structural validation.

use serde::{Deserialize, Serialize};

use crate::edge::EdgeKind;
use crate::error::ResolverError;

// ─── Action ───────────────────────────────────────────────────────────────────

/// The closed set of ledger actions.
///
/// Cross-reference handling dispatches exhaustively over this enum — adding a
/// variant forces every match site to be revisited instead of silently
/// falling through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Action {
    /// Chain genesis; defines a token.
    Issue,
    /// Debit from the sender's chain. `link` holds the destination account
    /// address, not a block hash.
    Send,
    /// Credit on an existing chain. `link` holds the funding send's hash.
    Receive,
    /// First credit of a new chain. `link` holds the funding send's hash.
    Open,
    /// Representative rotation; carries no cross-reference.
    Change,
    /// Posts one leg of an atomic swap. `left` holds the escrowed send's hash.
    Offer,
    /// Finalizes an atomic swap. `left` and `right` hold the two legs.
    Commit,
    /// Places a limit order. `link` holds the referenced order/send hash.
    CreateOrder,
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Issue => write!(f, "issue"),
            Self::Send => write!(f, "send"),
            Self::Receive => write!(f, "receive"),
            Self::Open => write!(f, "open"),
            Self::Change => write!(f, "change"),
            Self::Offer => write!(f, "offer"),
            Self::Commit => write!(f, "commit"),
            Self::CreateOrder => write!(f, "create-order"),
        }
    }
}

// ─── RefField ─────────────────────────────────────────────────────────────────

/// Which field of a block carries a cross-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RefField {
    Link,
    Left,
    Right,
}

impl std::fmt::Display for RefField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Link => write!(f, "link"),
            Self::Left => write!(f, "left"),
            Self::Right => write!(f, "right"),
        }
    }
}

/// A single hash-valued cross-reference carried by a block, tagged with the
/// edge kind it resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub field: RefField,
    pub target: String,
    pub kind: EdgeKind,
}

// ─── Block ────────────────────────────────────────────────────────────────────

/// A ledger block as delivered by the feed.
///
/// Immutable once inserted: a block is an append-only fact. The wire format
/// is camelCase JSON with kebab-case action names, matching the feed server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    /// Unique identifier; primary key.
    #[serde(default)]
    pub hash: String,
    /// Owning chain identifier, e.g. `"xtb:Account1"`.
    #[serde(default)]
    pub account: String,
    pub action: Action,
    /// Hash of the prior block in the same account's chain; empty for the
    /// chain's first block.
    #[serde(default)]
    pub previous: String,
    /// Action-dependent cross-reference; see [`Action`].
    #[serde(default)]
    pub link: String,
    /// First atomic-swap leg (`Offer`, `Commit`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<String>,
    /// Second atomic-swap leg (`Commit`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<String>,
    /// Account balance as of this block.
    #[serde(default)]
    pub balance: f64,
    /// Opaque descriptive fields, carried through unmodified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub representative: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub signature: Option<String>,
}

impl Block {
    /// Returns `true` if this block claims to start its account's chain.
    pub fn is_genesis(&self) -> bool {
        self.previous.is_empty()
    }

    /// The hash-valued cross-references this block must resolve — the one
    /// dispatch table for the whole resolver.
    ///
    /// `Send` is absent on purpose: its `link` is an account address and is
    /// never resolved to a block.
    pub fn cross_references(&self) -> Vec<Reference> {
        match self.action {
            Action::Issue | Action::Send | Action::Change => vec![],
            Action::Receive | Action::Open | Action::CreateOrder => vec![Reference {
                field: RefField::Link,
                target: self.link.clone(),
                kind: EdgeKind::Transfer,
            }],
            Action::Offer => opt_ref(RefField::Left, EdgeKind::SwapLeft, &self.left)
                .into_iter()
                .collect(),
            Action::Commit => opt_ref(RefField::Left, EdgeKind::SwapLeft, &self.left)
                .into_iter()
                .chain(opt_ref(RefField::Right, EdgeKind::SwapRight, &self.right))
                .collect(),
        }
    }

    /// Structural validation — the only hard rejection in the pipeline.
    ///
    /// A block that fails here is discarded before it enters the index.
    pub fn validate(&self) -> Result<(), ResolverError> {
        if self.hash.is_empty() {
            return Err(ResolverError::malformed("missing hash"));
        }
        if self.account.is_empty() {
            return Err(ResolverError::malformed("missing account"));
        }
        if self.balance < 0.0 {
            return Err(ResolverError::malformed("negative balance"));
        }
        match self.action {
            Action::Issue | Action::Change => {}
            Action::Send => {
                if self.link.is_empty() {
                    return Err(ResolverError::malformed("send requires a destination account in link"));
                }
            }
            Action::Receive | Action::Open | Action::CreateOrder => {
                if self.link.is_empty() {
                    return Err(ResolverError::malformed(format!(
                        "{} requires a source hash in link",
                        self.action
                    )));
                }
            }
            Action::Offer => {
                if is_absent(&self.left) {
                    return Err(ResolverError::malformed("offer requires left"));
                }
            }
            Action::Commit => {
                if is_absent(&self.left) || is_absent(&self.right) {
                    return Err(ResolverError::malformed("commit requires left and right"));
                }
            }
        }
        Ok(())
    }
}

fn is_absent(field: &Option<String>) -> bool {
    field.as_deref().map_or(true, str::is_empty)
}

fn opt_ref(field: RefField, kind: EdgeKind, value: &Option<String>) -> Option<Reference> {
    value
        .as_deref()
        .filter(|v| !v.is_empty())
        .map(|v| Reference {
            field,
            target: v.to_string(),
            kind,
        })
}
