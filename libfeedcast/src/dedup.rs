//! Dedup resolver: which links has the account already announced?
//!
//! There is no local state. Each run rebuilds the set from the anchors in the
//! account's most recent page of posts.

use std::sync::OnceLock;

use indexmap::IndexSet;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::platforms::Platform;
use crate::types::{AccountIdentity, AccountPost};

fn anchor_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r#"href="(https?://[^"]+)""#).expect("anchor pattern is a valid regex")
    })
}

/// Ordered set of URLs the account has already linked to
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostedUrls {
    urls: IndexSet<String>,
}

impl PostedUrls {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collect links from posts in order; the first occurrence of a URL wins
    pub fn from_posts(posts: &[AccountPost]) -> Self {
        let mut posted = Self::new();
        for post in posts {
            for url in extract_links(&post.content) {
                posted.insert(url);
            }
        }
        posted
    }

    /// Returns `false` if the URL was already present
    pub fn insert(&mut self, url: impl Into<String>) -> bool {
        self.urls.insert(url.into())
    }

    pub fn contains(&self, url: &str) -> bool {
        self.urls.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.urls.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PostedUrls {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            urls: iter.into_iter().map(Into::into).collect(),
        }
    }
}

/// Anchor targets with an http or https scheme, in document order
pub fn extract_links(content: &str) -> Vec<String> {
    anchor_pattern()
        .captures_iter(content)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Fetch the account's recent posts and collect the links they contain
///
/// # Errors
///
/// Any failure listing the statuses is returned unchanged. Callers must not
/// publish anything in that case, since every candidate could be a repost.
pub async fn resolve_posted_urls(
    client: &dyn Platform,
    account: &AccountIdentity,
) -> Result<PostedUrls> {
    let posts = client.account_statuses(account).await?;
    let posted = PostedUrls::from_posts(&posts);

    debug!(
        "Found {} previously published links in {} posts",
        posted.len(),
        posts.len()
    );
    for url in posted.iter() {
        debug!("Previously published: {}", url);
    }

    Ok(posted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::MockClient;

    fn post(content: &str) -> AccountPost {
        AccountPost {
            id: "1".to_string(),
            content: content.to_string(),
        }
    }

    #[test]
    fn test_extract_links_from_mastodon_html() {
        let html = r#"<p>📣 Episode 250 📣 Patches<br /><a href="https://sakerhetspodcasten.se/posts/250/" rel="nofollow noopener noreferrer" target="_blank"><span class="invisible">https://</span><span class="">sakerhetspodcasten.se/posts/250/</span></a></p>"#;

        assert_eq!(
            extract_links(html),
            vec!["https://sakerhetspodcasten.se/posts/250/".to_string()]
        );
    }

    #[test]
    fn test_extract_links_ignores_other_schemes_and_relative_links() {
        let html = r#"<a href="mailto:bot@example.com">mail</a> <a href="/tags/infosec">#infosec</a> <a href="http://plain.example/x">x</a> <a href="ftp://files.example/y">y</a>"#;

        assert_eq!(extract_links(html), vec!["http://plain.example/x".to_string()]);
    }

    #[test]
    fn test_from_posts_first_occurrence_wins() {
        let posts = vec![
            post(r#"<a href="https://a.example/2">2</a> <a href="https://a.example/1">1</a>"#),
            post(r#"<a href="https://a.example/1">again</a> <a href="https://a.example/3">3</a>"#),
        ];

        let posted = PostedUrls::from_posts(&posts);
        let urls: Vec<&str> = posted.iter().collect();
        assert_eq!(
            urls,
            vec!["https://a.example/2", "https://a.example/1", "https://a.example/3"]
        );
    }

    #[test]
    fn test_posts_without_links() {
        let posted = PostedUrls::from_posts(&[post("<p>just chatting</p>")]);
        assert!(posted.is_empty());
    }

    #[test]
    fn test_insert_reports_duplicates() {
        let mut posted = PostedUrls::new();
        assert!(posted.insert("https://a.example/1"));
        assert!(!posted.insert("https://a.example/1"));
        assert_eq!(posted.len(), 1);
        assert!(posted.contains("https://a.example/1"));
        assert!(!posted.contains("https://a.example/2"));
    }

    #[tokio::test]
    async fn test_resolve_posted_urls() {
        let client = MockClient::with_posted_links(&["https://a.example/1", "https://a.example/2"]);
        let me = client.verify_credentials().await.unwrap();

        let posted = resolve_posted_urls(&client, &me).await.unwrap();
        assert_eq!(
            posted,
            PostedUrls::from_iter(["https://a.example/1", "https://a.example/2"])
        );
    }

    #[tokio::test]
    async fn test_resolve_posted_urls_failure_is_reported() {
        let client = MockClient::statuses_failure("HTTP 503 Service Unavailable");
        let me = client.verify_credentials().await.unwrap();

        assert!(resolve_posted_urls(&client, &me).await.is_err());
        assert_eq!(client.statuses_call_count(), 1);
    }
}
