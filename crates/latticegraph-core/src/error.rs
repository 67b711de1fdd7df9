//! Error types for the resolver core.

use thiserror::Error;

/// Errors surfaced by the resolver.
///
/// Structural anomalies (forks, duplicate conflicts, dangling references) are
/// not errors — they are recorded as [`crate::anomaly::Anomaly`] values and
/// ingestion continues. The only hard failure is malformed input, which is
/// rejected before it reaches the index.
#[derive(Debug, Clone, Error)]
pub enum ResolverError {
    #[error("malformed block: {reason}")]
    Malformed { reason: String },
}

impl ResolverError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::Malformed {
            reason: reason.into(),
        }
    }

    /// The rejection reason, for reporting back to the feed.
    pub fn reason(&self) -> &str {
        match self {
            Self::Malformed { reason } => reason,
        }
    }
}
