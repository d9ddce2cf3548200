//! Feed retrieval and parsing
//!
//! Feeds are downloaded with reqwest and parsed with feed-rs, which handles
//! RSS 0.9x/1.0/2.0, Atom and JSON Feed. Parsed entries are converted to
//! [`FeedEntry`] straight away; entries without a link or without any date
//! cannot be announced and are dropped with a warning.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use feed_rs::model::{Entry, Link};
use tracing::{debug, info, warn};

use crate::error::{FeedError, Result};
use crate::types::FeedEntry;

/// Something that can turn a feed URL into entries
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Fetch the feed and return its entries in document order
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>>;
}

/// Feed source backed by HTTP
pub struct HttpFeed {
    client: reqwest::Client,
}

impl HttpFeed {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("feedcast/", env!("CARGO_PKG_VERSION")))
            .gzip(true)
            .build()
            .map_err(FeedError::Http)?;

        Ok(Self { client })
    }
}

#[async_trait]
impl FeedSource for HttpFeed {
    async fn fetch(&self, url: &str) -> Result<Vec<FeedEntry>> {
        info!("Request feed from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(FeedError::Http)?;

        let status = response.status();
        if !status.is_success() {
            return Err(FeedError::Status(status.as_u16()).into());
        }

        let bytes = response.bytes().await.map_err(FeedError::Http)?;
        debug!("Fetched feed ({} bytes)", bytes.len());

        parse_feed(&bytes)
    }
}

/// Parse a feed document into entries
pub fn parse_feed(content: &[u8]) -> Result<Vec<FeedEntry>> {
    let feed = feed_rs::parser::parse(content).map_err(|e| FeedError::Parse(e.to_string()))?;

    let entries: Vec<FeedEntry> = feed.entries.into_iter().filter_map(convert_entry).collect();
    debug!("Parsed feed with {} usable entries", entries.len());

    Ok(entries)
}

fn convert_entry(entry: Entry) -> Option<FeedEntry> {
    let title = entry.title.map(|t| t.content).unwrap_or_default();

    let Some(link) = canonical_link(entry.links) else {
        warn!("Skipping feed entry without link: {}", title);
        return None;
    };

    let Some(published_at) = entry.published.or(entry.updated) else {
        warn!("Skipping feed entry without date: {}", link);
        return None;
    };

    let description = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body))
        .unwrap_or_default();

    Some(FeedEntry {
        title,
        link,
        description,
        published_at,
    })
}

/// The entry's page link
///
/// Atom entries may carry several links; the first `alternate` one (or one
/// without `rel`) wins, otherwise the first link.
fn canonical_link(links: Vec<Link>) -> Option<String> {
    let alternate = links.iter().position(|link| {
        link.rel
            .as_deref()
            .map_or(true, |rel| rel.eq_ignore_ascii_case("alternate"))
    });

    links
        .into_iter()
        .nth(alternate.unwrap_or(0))
        .map(|link| link.href.trim().to_string())
        .filter(|href| !href.is_empty())
}

/// Feed source serving a fixed list of entries
///
/// Available in all builds so integration tests and dry runs can drive the
/// pipeline without network access.
pub struct StaticFeed {
    entries: Vec<FeedEntry>,
    fail_with: Option<u16>,
    fetch_count: AtomicUsize,
}

impl StaticFeed {
    pub fn new(entries: Vec<FeedEntry>) -> Self {
        Self {
            entries,
            fail_with: None,
            fetch_count: AtomicUsize::new(0),
        }
    }

    /// A source whose fetch fails with the given HTTP status
    pub fn failing(status: u16) -> Self {
        Self {
            entries: Vec::new(),
            fail_with: Some(status),
            fetch_count: AtomicUsize::new(0),
        }
    }

    pub fn fetch_count(&self) -> usize {
        self.fetch_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch(&self, _url: &str) -> Result<Vec<FeedEntry>> {
        self.fetch_count.fetch_add(1, Ordering::SeqCst);

        match self.fail_with {
            Some(status) => Err(FeedError::Status(status).into()),
            None => Ok(self.entries.clone()),
        }
    }
}
