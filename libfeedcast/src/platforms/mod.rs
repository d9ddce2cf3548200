//! Social platform abstraction
//!
//! The pipeline only needs three things from a social network: who we are,
//! what we already posted, and a way to post something new. Everything the
//! client library returns is converted into the DTOs from [`crate::types`]
//! before it leaves the implementation.
//!
//! # Examples
//!
//! ```no_run
//! use libfeedcast::platforms::{Platform, mastodon::MastodonClient};
//!
//! # async fn example() -> libfeedcast::error::Result<()> {
//! let client = MastodonClient::new("https://mastodon.social".to_string(), None)?;
//!
//! let me = client.verify_credentials().await?;
//! let recent = client.account_statuses(&me).await?;
//! println!("{} has {} recent posts", me.acct, recent.len());
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{AccountIdentity, AccountPost, PublishedPost};

pub mod mastodon;

// Mock platform is available for all builds (not just tests) to support integration tests
pub mod mock;

/// Platform trait for the operations the pipeline performs
#[async_trait]
pub trait Platform: Send + Sync {
    /// Fetch the profile of the authenticated account
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the token is missing or rejected
    async fn verify_credentials(&self) -> Result<AccountIdentity>;

    /// Fetch one page of the account's recent posts
    ///
    /// Ordering and page size are whatever the platform returns by default.
    async fn account_statuses(&self, account: &AccountIdentity) -> Result<Vec<AccountPost>>;

    /// Submit a new public post
    ///
    /// # Errors
    ///
    /// - `PlatformError::Validation` if the body is empty or over the character limit
    /// - `PlatformError::Posting` / `PlatformError::Network` if submission fails
    async fn post(&self, body: &str) -> Result<PublishedPost>;

    /// Lowercase identifier for the platform (e.g. "mastodon")
    fn name(&self) -> &str;
}
