use serde::{Deserialize, Serialize};

/// Prefetch policy for the swipe queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedConfig {
    /// Random summaries requested per batch (default: 5)
    pub batch_size: usize,

    /// Refill once fewer than this many unseen articles remain (default: 3)
    pub low_watermark: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            batch_size: 5,
            low_watermark: 3,
        }
    }
}
