//! The ingest service — drains a feed into the resolver and publishes
//! snapshots.
//!
//! The coordinator is the single writer; consumers watch a
//! `tokio::sync::watch` channel of `Arc<GraphModel>` snapshots and never
//! block ingestion. A fresh snapshot is published after every insert that
//! changed resolver state (new block, recorded conflict, recorded
//! rejection) — identical duplicates publish nothing.

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::watch;
use tracing::{info, warn};

use latticegraph_core::{Block, GraphModel, IngestCoordinator, InsertOutcome};

use crate::error::FeedError;
use crate::feed::BlockFeed;

/// Counters for feed observability.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestMetrics {
    pub inserted: u64,
    pub duplicates: u64,
    pub conflicts: u64,
    pub rejected: u64,
    pub feed_errors: u64,
}

/// Owns an [`IngestCoordinator`] and feeds it from a [`BlockFeed`].
pub struct IngestService {
    coordinator: IngestCoordinator,
    snapshot_tx: watch::Sender<Arc<GraphModel>>,
    metrics: IngestMetrics,
}

impl IngestService {
    /// Create a service and the first snapshot receiver.
    pub fn new() -> (Self, watch::Receiver<Arc<GraphModel>>) {
        let (snapshot_tx, snapshot_rx) = watch::channel(Arc::new(GraphModel::empty()));
        (
            Self {
                coordinator: IngestCoordinator::new(),
                snapshot_tx,
                metrics: IngestMetrics::default(),
            },
            snapshot_rx,
        )
    }

    /// Subscribe another snapshot consumer.
    pub fn subscribe(&self) -> watch::Receiver<Arc<GraphModel>> {
        self.snapshot_tx.subscribe()
    }

    pub fn metrics(&self) -> IngestMetrics {
        self.metrics
    }

    /// Read access to the resolver, e.g. for account summaries.
    pub fn coordinator(&self) -> &IngestCoordinator {
        &self.coordinator
    }

    /// Apply one block and publish a snapshot if anything changed.
    pub fn apply(&mut self, block: Block) -> InsertOutcome {
        let outcome = self.coordinator.ingest(block);
        match &outcome {
            InsertOutcome::Inserted => self.metrics.inserted += 1,
            InsertOutcome::DuplicateIgnored => {
                self.metrics.duplicates += 1;
                return outcome; // nothing changed, keep the snapshot
            }
            InsertOutcome::DuplicateConflict => self.metrics.conflicts += 1,
            InsertOutcome::Rejected(_) => self.metrics.rejected += 1,
        }
        // Receivers may all be gone (e.g. during shutdown); keep ingesting.
        let _ = self.snapshot_tx.send(self.coordinator.current_graph());
        outcome
    }

    /// Drain the feed until it closes.
    pub async fn run(&mut self, feed: &dyn BlockFeed) -> Result<(), FeedError> {
        let mut stream = feed.subscribe().await?;
        info!(source = feed.source(), "Ingest service started");

        while let Some(item) = stream.next().await {
            match item {
                Ok(block) => {
                    self.apply(block);
                }
                Err(err) => {
                    warn!(source = feed.source(), error = %err, "Bad feed payload, skipping");
                    self.metrics.feed_errors += 1;
                }
            }
        }

        info!(
            source = feed.source(),
            blocks = self.coordinator.block_count(),
            inserted = self.metrics.inserted,
            rejected = self.metrics.rejected,
            "Feed drained"
        );
        Ok(())
    }
}
