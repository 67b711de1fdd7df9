//! In-process feed backed by a Tokio channel.
//!
//! Useful for wiring a network client to the ingest service, and for tests:
//! whatever order the sender pushes blocks is the order the resolver sees.

use async_trait::async_trait;
use std::sync::Mutex;
use tokio::sync::mpsc;

use latticegraph_core::Block;

use crate::error::FeedError;
use crate::feed::{BlockFeed, BlockStream};

/// A feed that yields whatever blocks are pushed into its sender half.
///
/// Single-consumer: the receiver is handed out on the first `subscribe`.
pub struct ChannelFeed {
    source: String,
    rx: Mutex<Option<mpsc::Receiver<Block>>>,
}

impl ChannelFeed {
    /// Create a feed with the given label and channel capacity.
    /// Returns the feed and the sender half to push blocks into.
    pub fn new(source: impl Into<String>, capacity: usize) -> (Self, mpsc::Sender<Block>) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self {
                source: source.into(),
                rx: Mutex::new(Some(rx)),
            },
            tx,
        )
    }
}

#[async_trait]
impl BlockFeed for ChannelFeed {
    fn source(&self) -> &str {
        &self.source
    }

    async fn subscribe(&self) -> Result<BlockStream, FeedError> {
        let rx = self
            .rx
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| FeedError::AlreadySubscribed(self.source.clone()))?;
        let stream = futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|block| (Ok(block), rx))
        });
        Ok(Box::pin(stream))
    }
}
