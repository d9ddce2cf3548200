//! Post formatter
//!
//! Turns a feed entry into a post body of at most [`MAX_POST_LENGTH`]
//! characters:
//!
//! ```text
//! 📣 <title> 📣 <description, cleaned and truncated at a word boundary...>
//! <link>
//! ```
//!
//! Lengths are counted in Unicode scalar values, the way Mastodon counts them.

use std::sync::OnceLock;

use regex::Regex;
use tracing::debug;

use crate::config::SanitizeRule;
use crate::error::{ConfigError, FormatError};
use crate::types::{ComposedPost, FeedEntry};

/// Maximum length of a post body
pub const MAX_POST_LENGTH: usize = 500;

/// Links longer than this are rejected
pub const MAX_LINK_LENGTH: usize = 200;

/// Extra room kept free next to the link trailer
const SAFETY_MARGIN: usize = 5;

const ELLIPSIS: &str = "...";
const MARKER: &str = "📣";

/// Boilerplate found in the descriptions of the podcast feeds this was built for
const BUILTIN_RULES: &[(&str, &str)] = &[("Lyssna mp3, längd: ", ""), (" Innehåll ", " ")];

/// Ordered list of pattern replacements applied to descriptions
#[derive(Debug, Clone)]
pub struct Sanitizer {
    rules: Vec<(Regex, String)>,
}

impl Sanitizer {
    /// A sanitizer with no rules at all
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// The built-in rules followed by `extra`
    pub fn with_rules(extra: &[SanitizeRule]) -> Result<Self, ConfigError> {
        let mut sanitizer = Self::default();
        for rule in extra {
            sanitizer.add_rule(rule)?;
        }
        Ok(sanitizer)
    }

    pub fn add_rule(&mut self, rule: &SanitizeRule) -> Result<(), ConfigError> {
        let regex = Regex::new(&rule.pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: rule.pattern.clone(),
            source,
        })?;
        self.rules.push((regex, rule.replacement.clone()));
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Apply every rule in order
    pub fn clean(&self, text: &str) -> String {
        self.rules
            .iter()
            .fold(text.to_string(), |acc, (regex, replacement)| {
                regex.replace_all(&acc, replacement.as_str()).into_owned()
            })
    }
}

impl Default for Sanitizer {
    fn default() -> Self {
        static BUILTIN: OnceLock<Vec<(Regex, String)>> = OnceLock::new();
        let rules = BUILTIN.get_or_init(|| {
            BUILTIN_RULES
                .iter()
                .map(|(pattern, replacement)| {
                    (
                        Regex::new(pattern).expect("built-in sanitize rule is a valid regex"),
                        replacement.to_string(),
                    )
                })
                .collect()
        });

        Self {
            rules: rules.clone(),
        }
    }
}

/// Builds post bodies from feed entries
#[derive(Debug, Clone, Default)]
pub struct Formatter {
    sanitizer: Sanitizer,
}

impl Formatter {
    pub fn new(sanitizer: Sanitizer) -> Self {
        Self { sanitizer }
    }

    /// Untruncated text of the post, without the link
    pub fn draft(&self, entry: &FeedEntry) -> String {
        let description = self.sanitizer.clean(&entry.description);
        format!("{MARKER} {} {MARKER} {}", entry.title, description)
    }

    /// Compose the final post for an entry
    ///
    /// # Errors
    ///
    /// Returns `FormatError::LinkTooLong` if the link exceeds [`MAX_LINK_LENGTH`].
    pub fn compose(&self, entry: &FeedEntry) -> Result<ComposedPost, FormatError> {
        let link_length = entry.link.chars().count();
        if link_length > MAX_LINK_LENGTH {
            return Err(FormatError::LinkTooLong {
                link: entry.link.clone(),
                length: link_length,
                limit: MAX_LINK_LENGTH,
            });
        }

        let draft = self.draft(entry);
        let available = available_space(&entry.link);
        let text = truncate(&draft, available);

        debug!("title: {}", entry.title);
        debug!("description: {}", entry.description);
        debug!("draft: {}", draft);
        debug!("link: {}", entry.link);

        Ok(ComposedPost {
            body: format!("{}\n{}", text, entry.link),
            canonical_link: entry.link.clone(),
        })
    }
}

/// Hyperlink markup the link would occupy once rendered by the server
pub fn link_trailer(link: &str) -> String {
    format!(r#"<p></p><p><a href="{0}">{0}</a></p>"#, link)
}

/// Characters left for the text part of a post announcing `link`
pub fn available_space(link: &str) -> usize {
    MAX_POST_LENGTH.saturating_sub(link_trailer(link).chars().count() + SAFETY_MARGIN)
}

/// Shorten `text` to at most `max_len` characters without splitting words
///
/// Text that already fits is returned unchanged. Otherwise the text is cut at
/// the last space before `max_len - 3` characters and `"..."` is appended.
/// A single word longer than that is cut hard at `max_len - 3` characters.
pub fn truncate(text: &str, max_len: usize) -> String {
    if text.chars().count() <= max_len {
        return text.to_string();
    }

    if max_len < ELLIPSIS.len() {
        return text.chars().take(max_len).collect();
    }

    let cutoff = max_len - ELLIPSIS.len();
    let end = text
        .char_indices()
        .nth(cutoff)
        .map(|(idx, _)| idx)
        .unwrap_or(text.len());

    let cut = text[..end].rfind(' ').unwrap_or(end);
    format!("{}{}", &text[..cut], ELLIPSIS)
}
