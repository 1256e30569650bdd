use std::time::Duration;

use bookshelf_types::ReadingStatus;
use serde::{Deserialize, Serialize};

/// Tunables for the sync core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Attempts for converting a recommendation into a library entry.
    pub recommendation_attempts: u32,
    /// Attempts for an explicit "add to library" action.
    pub direct_add_attempts: u32,
    /// Backoff before the second attempt; doubles for each further attempt.
    pub base_delay_ms: u64,
    /// Page size requested from the social feed.
    pub feed_page_size: u32,
    /// Status for new readings when the caller does not pick one.
    pub default_status: ReadingStatus,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            recommendation_attempts: 2,
            direct_add_attempts: 1,
            base_delay_ms: 1000,
            feed_page_size: 20,
            default_status: ReadingStatus::WantToRead,
        }
    }
}

impl SyncConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}
