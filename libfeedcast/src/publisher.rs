//! Publisher: post new candidates in feed order, up to the post cap

use std::collections::HashSet;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::dedup::PostedUrls;
use crate::error::Result;
use crate::formatter::Formatter;
use crate::platforms::Platform;
use crate::types::{FeedEntry, PublishedPost};

/// Summary of one publishing pass
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PublishReport {
    /// Links announced (or that would have been, in dry-run), in order
    pub posted: Vec<String>,
    /// Candidates skipped because their link was already published
    pub duplicates: usize,
    /// Candidates skipped because an earlier entry in this run had the same link
    pub repeated: usize,
    /// Candidates the formatter refused
    pub rejected: usize,
    pub dry_run: bool,
}

/// Posts candidates through a platform client
pub struct Publisher<'a> {
    client: &'a dyn Platform,
    formatter: &'a Formatter,
    post_cap: usize,
    dry_run: bool,
}

impl<'a> Publisher<'a> {
    pub fn new(
        client: &'a dyn Platform,
        formatter: &'a Formatter,
        post_cap: usize,
        dry_run: bool,
    ) -> Self {
        Self {
            client,
            formatter,
            post_cap,
            dry_run,
        }
    }

    /// Publish candidates that are not in `posted`
    ///
    /// Candidates whose link is too long are skipped. In dry-run mode the
    /// client is never asked to post.
    ///
    /// # Errors
    ///
    /// A failed submission stops the pass and is returned as-is.
    pub async fn publish(
        &self,
        candidates: &[FeedEntry],
        posted: &PostedUrls,
    ) -> Result<PublishReport> {
        let mut report = PublishReport {
            dry_run: self.dry_run,
            ..Default::default()
        };
        let mut handled: HashSet<&str> = HashSet::new();

        for candidate in candidates {
            if report.posted.len() >= self.post_cap {
                info!(
                    "Stopping posting after reaching post limit: {}",
                    report.posted.len()
                );
                break;
            }

            let link = candidate.link.as_str();
            if posted.contains(link) {
                info!("Disregard already published: {}", link);
                report.duplicates += 1;
                continue;
            }
            if !handled.insert(link) {
                info!("Disregard repeated feed entry: {}", link);
                report.repeated += 1;
                continue;
            }

            debug!("Prepare post: {}", link);
            let composed = match self.formatter.compose(candidate) {
                Ok(composed) => composed,
                Err(e) => {
                    error!("Skipping candidate: {}", e);
                    report.rejected += 1;
                    continue;
                }
            };

            if self.dry_run {
                info!("Dry-run post: {}", link);
                debug!("Dry-run text: {}", composed.body);
            } else {
                info!("Post: {}", link);
                post_raw(self.client, &composed.body).await?;
            }

            report.posted.push(composed.canonical_link);
        }

        Ok(report)
    }
}

/// Submit a literal text and log what the platform made of it
pub async fn post_raw(client: &dyn Platform, text: &str) -> Result<PublishedPost> {
    let published = client.post(text).await.map_err(|e| {
        error!("Posting to {} failed: {}", client.name(), e);
        e
    })?;

    info!("Toot uri: {}", published.uri);
    info!("Toot text: {}", published.content);

    Ok(published)
}
