//! Recency filter: only entries newer than the run threshold become candidates

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::types::FeedEntry;

/// Keep entries published strictly after `threshold`, in their original order
pub fn filter_recent(entries: &[FeedEntry], threshold: DateTime<Utc>) -> Vec<FeedEntry> {
    entries
        .iter()
        .filter(|entry| {
            if entry.published_at > threshold {
                info!("RSS candidate: {}", entry.title);
                true
            } else {
                debug!("RSS skipping old entry: {}", entry.title);
                false
            }
        })
        .cloned()
        .collect()
}
