//! Configuration management for Feedcast
//!
//! Settings come from three layers, highest precedence first: command-line
//! flags, an optional TOML file, and built-in defaults. The access token is
//! never read from the file.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::credentials::SecretSource;
use crate::error::{ConfigError, Result};

pub const DEFAULT_API_BASE_URL: &str = "https://mastodon.social";
pub const DEFAULT_DAYS: u32 = 1;
pub const DEFAULT_POSTS: usize = 1;

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "FEEDCAST_CONFIG";

/// Contents of the optional TOML config file
///
/// ```toml
/// api_base_url = "https://fosstodon.org"
/// days = 2
/// posts = 3
///
/// [[sanitize]]
/// pattern = "Listen to the episode: "
/// replacement = ""
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub api_base_url: Option<String>,
    pub days: Option<u32>,
    pub posts: Option<usize>,
    pub sanitize: Vec<SanitizeRule>,
}

/// One boilerplate removal rule; `pattern` is a regular expression
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SanitizeRule {
    pub pattern: String,
    #[serde(default)]
    pub replacement: String,
}

impl SanitizeRule {
    pub fn new(pattern: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            pattern: pattern.into(),
            replacement: replacement.into(),
        }
    }

    /// A rule that deletes every match
    pub fn strip(pattern: impl Into<String>) -> Self {
        Self::new(pattern, "")
    }
}

impl FileConfig {
    /// Load the config file
    ///
    /// An explicitly named file (argument or `FEEDCAST_CONFIG`) must exist.
    /// The default location is optional; if nothing is there an empty
    /// configuration is returned.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(&expand(path));
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            return Self::load_from_path(&expand(Path::new(&path)));
        }

        match default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => Ok(Self::default()),
        }
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: FileConfig = toml::from_str(&content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }
}

/// Default config file location under the XDG config directory
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("feedcast").join("config.toml"))
}

fn expand(path: &Path) -> PathBuf {
    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned())
}

/// Values given on the command line that take precedence over the file
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub api_base_url: Option<String>,
    pub days: Option<u32>,
    pub posts: Option<usize>,
    /// Extra patterns removed from descriptions
    pub strip: Vec<String>,
}

/// Fully merged settings for one invocation
#[derive(Debug, Clone)]
pub struct Settings {
    pub feed_url: String,
    pub api_base_url: String,
    pub days: u32,
    pub posts: usize,
    pub dry_run: bool,
    pub secret: Option<SecretSource>,
    /// Rules applied after the built-in ones, in order
    pub sanitize: Vec<SanitizeRule>,
}

impl Settings {
    /// Settings with built-in defaults for everything but the required values
    pub fn new(feed_url: impl Into<String>, secret: Option<SecretSource>) -> Self {
        Self {
            feed_url: feed_url.into(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            days: DEFAULT_DAYS,
            posts: DEFAULT_POSTS,
            dry_run: true,
            secret,
            sanitize: Vec::new(),
        }
    }

    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Layer file values over the defaults
    pub fn with_file(mut self, file: &FileConfig) -> Self {
        if let Some(url) = &file.api_base_url {
            self.api_base_url = url.clone();
        }
        if let Some(days) = file.days {
            self.days = days;
        }
        if let Some(posts) = file.posts {
            self.posts = posts;
        }
        self.sanitize.extend(file.sanitize.iter().cloned());
        self
    }

    /// Layer command-line values over everything else
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(url) = overrides.api_base_url {
            self.api_base_url = url;
        }
        if let Some(days) = overrides.days {
            self.days = days;
        }
        if let Some(posts) = overrides.posts {
            self.posts = posts;
        }
        self.sanitize
            .extend(overrides.strip.into_iter().map(SanitizeRule::strip));
        self
    }

    /// Ensure the instance URL carries a scheme
    pub fn normalized_api_base_url(&self) -> String {
        if self.api_base_url.starts_with("http://") || self.api_base_url.starts_with("https://") {
            self.api_base_url.clone()
        } else {
            format!("https://{}", self.api_base_url)
        }
    }
}

/// Parameters of a single run
///
/// The threshold is fixed when the config is built and cannot be changed
/// afterwards.
#[derive(Debug, Clone)]
pub struct RunConfig {
    feed_url: String,
    days: u32,
    threshold: DateTime<Utc>,
    post_cap: usize,
    dry_run: bool,
    secret: Option<SecretSource>,
}

impl RunConfig {
    pub fn new(settings: &Settings, now: DateTime<Utc>) -> Self {
        Self {
            feed_url: settings.feed_url.clone(),
            days: settings.days,
            threshold: now - Duration::days(i64::from(settings.days)),
            post_cap: settings.posts,
            dry_run: settings.dry_run,
            secret: settings.secret.clone(),
        }
    }

    pub fn feed_url(&self) -> &str {
        &self.feed_url
    }

    /// Lookback window in days
    pub fn days(&self) -> u32 {
        self.days
    }

    pub fn threshold(&self) -> DateTime<Utc> {
        self.threshold
    }

    pub fn post_cap(&self) -> usize {
        self.post_cap
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn secret(&self) -> Option<&SecretSource> {
        self.secret.as_ref()
    }
}
