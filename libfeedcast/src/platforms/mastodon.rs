//! Mastodon platform implementation
//!
//! Talks to Mastodon (and API-compatible servers such as Pleroma, Akkoma or
//! GoToSocial) through the megalodon library.

use async_trait::async_trait;
use megalodon::megalodon::PostStatusOutput;
use megalodon::{Megalodon, SNS};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::types::{AccountIdentity, AccountPost, PublishedPost};

/// Mastodon's default post length
pub const DEFAULT_CHARACTER_LIMIT: usize = 500;

/// Mastodon platform client
pub struct MastodonClient {
    client: Box<dyn Megalodon + Send + Sync>,
    instance_url: String,
    character_limit: usize,
}

impl MastodonClient {
    /// Create a new Mastodon client
    ///
    /// `access_token` may be `None` for unauthenticated use; every call that
    /// needs the account will then fail with an authentication error from
    /// the server.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use libfeedcast::platforms::mastodon::MastodonClient;
    /// use secrecy::SecretString;
    ///
    /// # fn example() -> libfeedcast::error::Result<()> {
    /// let token = SecretString::from("your-access-token".to_string());
    /// let client = MastodonClient::new("https://mastodon.social".to_string(), Some(token))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(instance_url: String, access_token: Option<SecretString>) -> Result<Self> {
        let token = access_token.map(|t| t.expose_secret().to_string());

        let client = megalodon::generator(SNS::Mastodon, instance_url.clone(), token, None)
            .map_err(|e| {
                PlatformError::Authentication(format!("Failed to create Mastodon client: {:?}", e))
            })?;

        Ok(Self {
            client,
            instance_url,
            character_limit: DEFAULT_CHARACTER_LIMIT,
        })
    }

    pub fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }

        let char_count = content.chars().count();
        if char_count > self.character_limit {
            return Err(PlatformError::Validation(format!(
                "Content exceeds Mastodon's {} character limit (current: {} characters)",
                self.character_limit, char_count
            ))
            .into());
        }

        Ok(())
    }
}

#[async_trait]
impl Platform for MastodonClient {
    async fn verify_credentials(&self) -> Result<AccountIdentity> {
        let response = self
            .client
            .verify_account_credentials()
            .await
            .map_err(|e| map_megalodon_error(e, "verify credentials"))?;

        let account = response.json;
        Ok(AccountIdentity {
            id: account.id,
            username: account.username,
            acct: account.acct,
            display_name: account.display_name,
        })
    }

    async fn account_statuses(&self, account: &AccountIdentity) -> Result<Vec<AccountPost>> {
        let response = self
            .client
            .get_account_statuses(account.id.clone(), None)
            .await
            .map_err(|e| map_megalodon_error(e, "list account statuses"))?;

        debug!("Fetched {} statuses for {}", response.json.len(), account.acct);

        Ok(response
            .json
            .into_iter()
            .map(|status| AccountPost {
                id: status.id,
                content: status.content,
            })
            .collect())
    }

    async fn post(&self, body: &str) -> Result<PublishedPost> {
        self.validate_content(body)?;

        let response = self
            .client
            .post_status(body.to_string(), None)
            .await
            .map_err(|e| map_megalodon_error(e, "post status"))?;

        let published = match response.json {
            PostStatusOutput::Status(status) => PublishedPost {
                id: status.id,
                uri: status.uri,
                content: status.content,
            },
            // Only returned when scheduled_at is set, which we never do
            PostStatusOutput::ScheduledStatus(scheduled) => PublishedPost {
                id: scheduled.id,
                uri: String::new(),
                content: body.to_string(),
            },
        };

        Ok(published)
    }

    fn name(&self) -> &str {
        "mastodon"
    }
}

/// Classify a megalodon error by the HTTP status found in its message
///
/// megalodon does not expose the status as a field, so it is recovered from
/// the rendered error text.
fn map_megalodon_error(error: megalodon::error::Error, context: &str) -> PlatformError {
    let message = error.to_string();
    classify(&message, context)
}

fn classify(message: &str, context: &str) -> PlatformError {
    let detail = format!("Mastodon {} failed: {}", context, message);

    match http_status(message) {
        Some(401) | Some(403) => PlatformError::Authentication(format!(
            "{}. Check that the access token is valid and has the read and write scopes",
            detail
        )),
        Some(422) => PlatformError::Validation(detail),
        Some(429) => PlatformError::RateLimit(detail),
        Some(_) => PlatformError::Network(detail),
        None => {
            let lower = message.to_lowercase();
            if lower.contains("unauthorized") || lower.contains("forbidden") {
                PlatformError::Authentication(detail)
            } else if lower.contains("too many requests") {
                PlatformError::RateLimit(detail)
            } else if context == "post status" {
                PlatformError::Posting(detail)
            } else {
                PlatformError::Network(detail)
            }
        }
    }
}

/// First standalone three-digit number in the HTTP status range
fn http_status(message: &str) -> Option<u16> {
    message
        .split(|c: char| !c.is_ascii_digit())
        .filter(|token| token.len() == 3)
        .filter_map(|token| token.parse::<u16>().ok())
        .find(|code| (100..=599).contains(code))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MastodonClient {
        MastodonClient::new("https://mastodon.social".to_string(), None)
            .expect("Failed to create client")
    }

    #[test]
    fn test_mastodon_client_creation() {
        let client = MastodonClient::new(
            "https://mastodon.social".to_string(),
            Some(SecretString::from("test-token".to_string())),
        )
        .expect("Failed to create client");

        assert_eq!(client.name(), "mastodon");
        assert_eq!(client.instance_url(), "https://mastodon.social");
    }

    #[test]
    fn test_validate_content_limits() {
        let client = client();

        assert!(client.validate_content("Hello fediverse").is_ok());
        assert!(client.validate_content(&"a".repeat(500)).is_ok());
        assert!(client.validate_content(&"a".repeat(501)).is_err());
        assert!(client.validate_content("  \n ").is_err());
    }

    #[test]
    fn test_validate_content_counts_characters_not_bytes() {
        let client = client();

        assert!(client.validate_content(&"📣".repeat(500)).is_ok());
        match client.validate_content(&"📣".repeat(501)) {
            Err(crate::error::FeedcastError::Platform(PlatformError::Validation(msg))) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("501"));
            }
            _ => panic!("Expected validation error"),
        }
    }

    #[test]
    fn test_http_status_extraction() {
        assert_eq!(http_status("HTTP 401 Unauthorized"), Some(401));
        assert_eq!(http_status("status: 429"), Some(429));
        assert_eq!(http_status("Failed with 422: validation error"), Some(422));
        assert_eq!(http_status("error 1234 and 99"), None);
        assert_eq!(http_status("connection refused"), None);
        assert_eq!(http_status("code 999 then 503"), Some(503));
    }

    #[test]
    fn test_classify_by_status() {
        assert!(matches!(
            classify("HTTP 401 Unauthorized", "verify credentials"),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            classify("HTTP 403", "list account statuses"),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            classify("status 422", "post status"),
            PlatformError::Validation(_)
        ));
        assert!(matches!(
            classify("status 429", "post status"),
            PlatformError::RateLimit(_)
        ));
        assert!(matches!(
            classify("status 502", "post status"),
            PlatformError::Network(_)
        ));
    }

    #[test]
    fn test_classify_without_status() {
        assert!(matches!(
            classify("request unauthorized", "verify credentials"),
            PlatformError::Authentication(_)
        ));
        assert!(matches!(
            classify("connection reset", "post status"),
            PlatformError::Posting(_)
        ));
        assert!(matches!(
            classify("connection reset", "list account statuses"),
            PlatformError::Network(_)
        ));
    }

    #[test]
    fn test_classified_message_keeps_context() {
        let error = classify("HTTP 500 Internal Server Error", "list account statuses");
        let message = error.to_string();
        assert!(message.contains("list account statuses"));
        assert!(message.contains("500"));
    }
}
