//! latticegraph-core — the block-lattice resolver.
//!
//! Turns an unordered, incrementally-arriving collection of ledger blocks
//! into a validated, navigable graph: per-account chains reconstructed via
//! `previous` pointers, cross-chain references resolved by hash into typed
//! edges, and structural contradictions surfaced as anomalies instead of
//! errors.
//!
//! # Architecture
//!
//! ```text
//! IngestCoordinator
//!     ├── BlockIndex              (hash-keyed store, duplicate detection)
//!     ├── ChainAssembler          (per-account ordering, fork detection)
//!     ├── CrossReferenceResolver  (typed edges, dangling-reference retry)
//!     ├── AccountSummaryBuilder   (ordered blocks + current balance)
//!     └── GraphModel snapshots    (immutable read surface for consumers)
//! ```

pub mod anomaly;
pub mod block;
pub mod chain;
pub mod coordinator;
pub mod edge;
pub mod error;
pub mod graph;
pub mod index;
pub mod resolve;
pub mod summary;

pub use anomaly::{Anomaly, AnomalyKind};
pub use block::{Action, Block, RefField, Reference};
pub use chain::{Chain, ChainAssembler, ChainState};
pub use coordinator::{IngestCoordinator, InsertOutcome};
pub use edge::{Edge, EdgeKind};
pub use error::ResolverError;
pub use graph::{BlockStatus, GraphModel};
pub use index::{BlockIndex, IndexOutcome};
pub use resolve::CrossReferenceResolver;
pub use summary::{AccountSummary, AccountSummaryBuilder};
