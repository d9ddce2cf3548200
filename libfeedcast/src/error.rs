//! Error types for Feedcast

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, FeedcastError>;

#[derive(Error, Debug)]
pub enum FeedcastError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Feed error: {0}")]
    Feed(#[from] FeedError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),
}

impl FeedcastError {
    /// Returns the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            FeedcastError::Config(_) => 2,
            FeedcastError::Feed(_) => 1,
            FeedcastError::Platform(_) => 1,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("Failed to read secret file {path}: {source}")]
    UnreadableSecret {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Secret from {0} is empty")]
    EmptySecret(String),

    #[error("Invalid sanitize pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

#[derive(Error, Debug)]
pub enum FeedError {
    #[error("Failed to fetch feed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed request returned HTTP {0}")]
    Status(u16),

    #[error("Failed to parse feed: {0}")]
    Parse(String),
}

#[derive(Error, Debug, Clone)]
pub enum PlatformError {
    #[error("Authentication failed: {0}")]
    Authentication(String),

    #[error("Content validation failed: {0}")]
    Validation(String),

    #[error("Posting failed: {0}")]
    Posting(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limit exceeded: {0}")]
    RateLimit(String),
}

/// Per-candidate formatting failure; the publisher skips the candidate
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    #[error("Link is {length} characters long (limit {limit}): {link}")]
    LinkTooLong {
        link: String,
        length: usize,
        limit: usize,
    },
}
