//! Core types for Feedcast
//!
//! Everything the collaborators hand back (feed-rs entries, megalodon
//! entities) is converted into these types at the boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single feed item, as seen by the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedEntry {
    pub title: String,
    /// Canonical URL of the entry
    pub link: String,
    pub description: String,
    pub published_at: DateTime<Utc>,
}

impl FeedEntry {
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        description: impl Into<String>,
        published_at: DateTime<Utc>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            description: description.into(),
            published_at,
        }
    }
}

/// The authenticated account
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountIdentity {
    pub id: String,
    pub username: String,
    pub acct: String,
    pub display_name: String,
}

/// An existing post on the account, used to find already-published links
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPost {
    pub id: String,
    /// Rendered HTML body of the post
    pub content: String,
}

/// A post that was accepted by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedPost {
    pub id: String,
    pub uri: String,
    pub content: String,
}

/// Body ready for submission, plus the link it announces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComposedPost {
    pub body: String,
    pub canonical_link: String,
}
