//! Mock platform implementation for testing
//!
//! A scriptable stand-in for a social network account. Tests seed it with
//! existing posts, make individual calls fail, and afterwards inspect what
//! would have been published.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{AccountIdentity, AccountPost, PublishedPost};

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name (e.g., "mock-mastodon")
    pub name: String,

    /// Identity returned by `verify_credentials`
    pub identity: AccountIdentity,

    /// Existing posts returned by `account_statuses`
    pub statuses: Vec<AccountPost>,

    /// Error returned by `verify_credentials`, if any
    pub auth_error: Option<String>,

    /// Error returned by `account_statuses`, if any
    pub statuses_error: Option<String>,

    /// Error returned by `post`, if any
    pub post_error: Option<String>,

    /// Character limit enforced on `post`
    pub character_limit: usize,

    /// Number of times `verify_credentials` has been called
    pub auth_call_count: Arc<Mutex<usize>>,

    /// Number of times `account_statuses` has been called
    pub statuses_call_count: Arc<Mutex<usize>>,

    /// Number of times `post` has been called
    pub post_call_count: Arc<Mutex<usize>>,

    /// Bodies that have been posted (for verification)
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            identity: AccountIdentity {
                id: "109999".to_string(),
                username: "feedbot".to_string(),
                acct: "feedbot@example.social".to_string(),
                display_name: "Feed Bot".to_string(),
            },
            statuses: Vec::new(),
            auth_error: None,
            statuses_error: None,
            post_error: None,
            character_limit: 500,
            auth_call_count: Arc::new(Mutex::new(0)),
            statuses_call_count: Arc::new(Mutex::new(0)),
            post_call_count: Arc::new(Mutex::new(0)),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
pub struct MockClient {
    config: MockConfig,
}

impl MockClient {
    /// Create a new mock platform with the given configuration
    pub fn new(config: MockConfig) -> Self {
        Self { config }
    }

    /// A mock account with no posts where every call succeeds
    pub fn success() -> Self {
        Self::new(MockConfig::default())
    }

    /// A mock account whose existing posts link to the given URLs
    pub fn with_posted_links(links: &[&str]) -> Self {
        let statuses = links
            .iter()
            .enumerate()
            .map(|(i, link)| AccountPost {
                id: format!("{}", 1000 + i),
                content: format!(
                    r#"<p>📣 Old entry 📣 Something<br /><a href="{0}" rel="nofollow noopener noreferrer" target="_blank">{0}</a></p>"#,
                    link
                ),
            })
            .collect();

        Self::new(MockConfig {
            statuses,
            ..Default::default()
        })
    }

    /// A mock account whose status listing fails
    pub fn statuses_failure(error: &str) -> Self {
        Self::new(MockConfig {
            statuses_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A mock account that rejects the access token
    pub fn auth_failure(error: &str) -> Self {
        Self::new(MockConfig {
            auth_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    /// A mock account where posting fails
    pub fn post_failure(error: &str) -> Self {
        Self::new(MockConfig {
            post_error: Some(error.to_string()),
            ..Default::default()
        })
    }

    pub fn auth_call_count(&self) -> usize {
        *self.config.auth_call_count.lock().unwrap()
    }

    pub fn statuses_call_count(&self) -> usize {
        *self.config.statuses_call_count.lock().unwrap()
    }

    pub fn post_call_count(&self) -> usize {
        *self.config.post_call_count.lock().unwrap()
    }

    /// Get all bodies that were posted
    pub fn posted_content(&self) -> Vec<String> {
        self.config.posted_content.lock().unwrap().clone()
    }
}

#[async_trait]
impl Platform for MockClient {
    async fn verify_credentials(&self) -> Result<AccountIdentity> {
        *self.config.auth_call_count.lock().unwrap() += 1;

        match &self.config.auth_error {
            Some(error) => Err(PlatformError::Authentication(error.clone()).into()),
            None => Ok(self.config.identity.clone()),
        }
    }

    async fn account_statuses(&self, _account: &AccountIdentity) -> Result<Vec<AccountPost>> {
        *self.config.statuses_call_count.lock().unwrap() += 1;

        match &self.config.statuses_error {
            Some(error) => Err(PlatformError::Network(error.clone()).into()),
            None => Ok(self.config.statuses.clone()),
        }
    }

    async fn post(&self, body: &str) -> Result<PublishedPost> {
        *self.config.post_call_count.lock().unwrap() += 1;

        if let Some(error) = &self.config.post_error {
            return Err(PlatformError::Posting(error.clone()).into());
        }

        let length = body.chars().count();
        if length > self.config.character_limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds {} character limit (got {} characters)",
                self.config.character_limit, length
            ))
            .into());
        }

        self.config
            .posted_content
            .lock()
            .unwrap()
            .push(body.to_string());

        let id = uuid::Uuid::new_v4().to_string();
        Ok(PublishedPost {
            uri: format!("https://example.social/users/feedbot/statuses/{}", id),
            id,
            content: format!("<p>{}</p>", body),
        })
    }

    fn name(&self) -> &str {
        &self.config.name
    }
}
