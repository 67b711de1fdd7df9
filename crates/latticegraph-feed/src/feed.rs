//! `BlockFeed` trait — abstraction over how blocks reach the resolver.
//!
//! The server may stream blocks or serve them request/response; either way
//! the resolver sees one async stream of blocks in no guaranteed order. A
//! feed error item means one payload was bad, not that the feed is dead.

use async_trait::async_trait;
use futures::Stream;
use std::pin::Pin;

use latticegraph_core::Block;

use crate::error::FeedError;

/// A stream of blocks from a single feed.
pub type BlockStream = Pin<Box<dyn Stream<Item = Result<Block, FeedError>> + Send>>;

/// Abstracts over block delivery backends.
#[async_trait]
pub trait BlockFeed: Send + Sync {
    /// Human-readable label for this feed, used in logs.
    fn source(&self) -> &str;

    /// Start delivering blocks. The stream ends when the feed closes.
    async fn subscribe(&self) -> Result<BlockStream, FeedError>;
}
