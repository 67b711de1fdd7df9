//! latticegraph-feed — async delivery of ledger blocks into the resolver.
//!
//! # Architecture
//!
//! ```text
//! BlockFeed (trait)  →  IngestService  →  watch::Receiver<Arc<GraphModel>>
//!   ├── ChannelFeed        │
//!   └── (network feeds)    └── IngestCoordinator (latticegraph-core)
//! ```
//!
//! Blocks arrive in whatever order the feed yields them; the resolver
//! converges regardless. Consumers read published snapshots without ever
//! blocking ingestion.

pub mod channel;
pub mod error;
pub mod feed;
pub mod service;
pub mod wire;

pub use channel::ChannelFeed;
pub use error::FeedError;
pub use feed::{BlockFeed, BlockStream};
pub use service::{IngestMetrics, IngestService};
pub use wire::{decode_block, decode_blocks};
