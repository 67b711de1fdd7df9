//! Error types for the feed layer.

use thiserror::Error;

/// Errors raised while delivering blocks from a feed.
///
/// None of these stop the resolver: a bad payload is reported and skipped,
/// and a closed feed simply ends the stream.
#[derive(Debug, Error)]
pub enum FeedError {
    #[error("failed to decode block payload: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("feed '{0}' already subscribed")]
    AlreadySubscribed(String),

    #[error("feed '{0}' closed")]
    Closed(String),
}
