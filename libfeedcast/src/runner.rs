//! One run of the pipeline
//!
//! `Init → Fetching → Filtering → Resolving → Publishing → Done`
//!
//! Every stage runs once. An empty candidate list or a failed dedup lookup
//! ends the run early without posting; both are normal outcomes rather than
//! errors.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, info};

use crate::config::RunConfig;
use crate::dedup::resolve_posted_urls;
use crate::error::Result;
use crate::feed::FeedSource;
use crate::formatter::Formatter;
use crate::platforms::Platform;
use crate::publisher::{post_raw, PublishReport, Publisher};
use crate::recency::filter_recent;
use crate::types::PublishedPost;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStage {
    Init,
    Fetching,
    Filtering,
    Resolving,
    Publishing,
    Done,
}

impl fmt::Display for RunStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStage::Init => "init",
            RunStage::Fetching => "fetching",
            RunStage::Filtering => "filtering",
            RunStage::Resolving => "resolving",
            RunStage::Publishing => "publishing",
            RunStage::Done => "done",
        };
        write!(f, "{}", name)
    }
}

/// How a run ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Nothing in the feed is recent enough
    NoCandidates,
    /// Already-published links could not be determined, so nothing was posted
    ResolutionFailed { error: String },
    Completed(PublishReport),
}

impl RunOutcome {
    /// Number of posts emitted (or dry-run posts)
    pub fn posted_count(&self) -> usize {
        match self {
            RunOutcome::Completed(report) => report.posted.len(),
            _ => 0,
        }
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::NoCandidates => write!(f, "no new entries"),
            RunOutcome::ResolutionFailed { error } => {
                write!(f, "skipped posting, published links unknown: {}", error)
            }
            RunOutcome::Completed(report) => {
                let verb = if report.dry_run { "would post" } else { "posted" };
                write!(
                    f,
                    "{} {} ({} already published, {} repeated, {} rejected)",
                    verb,
                    report.posted.len(),
                    report.duplicates,
                    report.repeated,
                    report.rejected
                )
            }
        }
    }
}

/// Drives the pipeline for a single invocation
pub struct Runner {
    config: RunConfig,
    formatter: Formatter,
    stage: RunStage,
}

impl Runner {
    pub fn new(config: RunConfig, formatter: Formatter) -> Self {
        Self {
            config,
            formatter,
            stage: RunStage::Init,
        }
    }

    pub fn stage(&self) -> RunStage {
        self.stage
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    fn enter(&mut self, stage: RunStage) {
        debug!(stage = %stage, "Entering stage");
        self.stage = stage;
    }

    /// Run every stage against the given collaborators
    ///
    /// # Errors
    ///
    /// Feed retrieval, credential verification and post submission failures
    /// end the run with an error.
    pub async fn run(
        &mut self,
        feed: &dyn FeedSource,
        client: &dyn Platform,
    ) -> Result<RunOutcome> {
        self.enter(RunStage::Fetching);
        let entries = feed.fetch(self.config.feed_url()).await.map_err(|e| {
            error!("Failed to read feed {}: {}", self.config.feed_url(), e);
            e
        })?;

        self.enter(RunStage::Filtering);
        let candidates = filter_recent(&entries, self.config.threshold());
        if candidates.is_empty() {
            info!(
                "No new RSS entries within the last {} day(s), exiting!",
                self.config.days()
            );
            self.enter(RunStage::Done);
            return Ok(RunOutcome::NoCandidates);
        }

        self.enter(RunStage::Resolving);
        let account = client.verify_credentials().await.map_err(|e| {
            error!("Failed to verify {} credentials: {}", client.name(), e);
            e
        })?;
        info!("Mastodon id: {}", account.id);
        info!("Mastodon username: {}", account.username);
        info!("Mastodon acct: {}", account.acct);
        info!("Mastodon display name: {}", account.display_name);

        let posted = match resolve_posted_urls(client, &account).await {
            Ok(posted) => posted,
            Err(e) => {
                error!("Could not list published posts, refusing to post: {}", e);
                self.enter(RunStage::Done);
                return Ok(RunOutcome::ResolutionFailed {
                    error: e.to_string(),
                });
            }
        };

        self.enter(RunStage::Publishing);
        let report = Publisher::new(
            client,
            &self.formatter,
            self.config.post_cap(),
            self.config.dry_run(),
        )
        .publish(&candidates, &posted)
        .await?;

        self.enter(RunStage::Done);
        info!("Terminating normally. Thanks for All the Fish!");

        Ok(RunOutcome::Completed(report))
    }
}

/// Post a literal text, bypassing the pipeline
pub async fn send_test_post(client: &dyn Platform, text: &str) -> Result<PublishedPost> {
    info!("Tooting: {}", text);
    post_raw(client, text).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::feed::StaticFeed;
    use crate::platforms::mock::MockClient;
    use crate::types::FeedEntry;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 10, 12, 0, 0).unwrap()
    }

    fn runner(dry_run: bool) -> Runner {
        let settings =
            Settings::new("https://example.com/feed.xml", None).with_dry_run(dry_run);
        Runner::new(RunConfig::new(&settings, now()), Formatter::default())
    }

    fn entry(slug: &str, age: Duration) -> FeedEntry {
        FeedEntry::new(
            slug,
            format!("https://example.com/{}", slug),
            "Description",
            now() - age,
        )
    }

    #[tokio::test]
    async fn test_no_candidates_skips_platform() {
        let feed = StaticFeed::new(vec![entry("old", Duration::days(3))]);
        let client = MockClient::success();
        let mut runner = runner(false);

        let outcome = runner.run(&feed, &client).await.unwrap();

        assert_eq!(outcome, RunOutcome::NoCandidates);
        assert_eq!(runner.stage(), RunStage::Done);
        assert_eq!(client.auth_call_count(), 0);
        assert_eq!(client.statuses_call_count(), 0);
    }

    #[tokio::test]
    async fn test_resolution_failure_posts_nothing() {
        let feed = StaticFeed::new(vec![entry("new", Duration::hours(1))]);
        let client = MockClient::statuses_failure("HTTP 502 Bad Gateway");
        let mut runner = runner(false);

        let outcome = runner.run(&feed, &client).await.unwrap();

        assert!(matches!(outcome, RunOutcome::ResolutionFailed { .. }));
        assert_eq!(outcome.posted_count(), 0);
        assert_eq!(runner.stage(), RunStage::Done);
        assert_eq!(client.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_feed_failure_is_an_error() {
        let feed = StaticFeed::failing(404);
        let client = MockClient::success();
        let mut runner = runner(false);

        assert!(runner.run(&feed, &client).await.is_err());
        assert_eq!(runner.stage(), RunStage::Fetching);
    }

    #[tokio::test]
    async fn test_auth_failure_is_an_error() {
        let feed = StaticFeed::new(vec![entry("new", Duration::hours(1))]);
        let client = MockClient::auth_failure("HTTP 401");
        let mut runner = runner(false);

        assert!(runner.run(&feed, &client).await.is_err());
        assert_eq!(client.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_completed_run() {
        let feed = StaticFeed::new(vec![
            entry("new", Duration::hours(1)),
            entry("old", Duration::days(4)),
        ]);
        let client = MockClient::success();
        let mut runner = runner(false);

        let outcome = runner.run(&feed, &client).await.unwrap();

        assert_eq!(outcome.posted_count(), 1);
        assert_eq!(
            outcome.to_string(),
            "posted 1 (0 already published, 0 repeated, 0 rejected)"
        );
        assert_eq!(client.posted_content().len(), 1);
        assert!(client.posted_content()[0].starts_with("📣 new 📣 Description"));
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(RunOutcome::NoCandidates).unwrap();
        assert_eq!(json["outcome"], "no_candidates");

        let json = serde_json::to_value(RunOutcome::Completed(PublishReport {
            posted: vec!["https://a.example/1".to_string()],
            duplicates: 2,
            repeated: 0,
            rejected: 0,
            dry_run: true,
        }))
        .unwrap();
        assert_eq!(json["outcome"], "completed");
        assert_eq!(json["posted"][0], "https://a.example/1");
        assert_eq!(json["dry_run"], true);
    }

    #[tokio::test]
    async fn test_send_test_post() {
        let client = MockClient::success();
        send_test_post(&client, "hello world testing API").await.unwrap();
        assert_eq!(client.post_call_count(), 1);
    }
}
