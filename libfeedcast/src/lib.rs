//! Feedcast - announce new feed entries on the Fediverse
//!
//! This library provides the pipeline behind the `feedcast` batch job: read an
//! RSS/Atom feed, keep recent entries, drop the ones the account has already
//! linked to, and post a short summary of the rest.

pub mod config;
pub mod credentials;
pub mod dedup;
pub mod error;
pub mod feed;
pub mod formatter;
pub mod logging;
pub mod platforms;
pub mod publisher;
pub mod recency;
pub mod runner;
pub mod types;

// Re-export commonly used types
pub use config::{RunConfig, Settings};
pub use credentials::SecretSource;
pub use error::{FeedcastError, Result};
pub use runner::{RunOutcome, Runner};
pub use types::{AccountIdentity, AccountPost, ComposedPost, FeedEntry, PublishedPost};
