//! Access token acquisition
//!
//! The token can be given literally, named by an environment variable, or
//! stored in a file. Whichever source is used, it is resolved exactly once
//! into a [`SecretString`] before the pipeline starts.
//!
//! # Example
//!
//! ```no_run
//! use libfeedcast::credentials::{SecretSource, SecretType};
//! use secrecy::ExposeSecret;
//!
//! # fn example() -> Result<(), libfeedcast::error::ConfigError> {
//! if let Some(source) = SecretSource::from_argument("MASTODON_TOKEN", SecretType::Env) {
//!     let token = source.resolve()?;
//!     assert!(!token.expose_secret().is_empty());
//! }
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use secrecy::SecretString;

use crate::error::ConfigError;

/// Argument value meaning "no secret at all"
pub const NO_SECRET: &str = "-";

/// How the `--access-token` argument should be interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretType {
    /// The argument is the token itself
    Arg,
    /// The argument names an environment variable holding the token
    Env,
    /// The argument is a path to a file holding the token
    File,
}

impl FromStr for SecretType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "arg" => Ok(SecretType::Arg),
            "env" => Ok(SecretType::Env),
            "file" => Ok(SecretType::File),
            _ => Err(format!(
                "Invalid secret type: '{}'. Valid options: arg, env, file",
                s
            )),
        }
    }
}

impl fmt::Display for SecretType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretType::Arg => write!(f, "arg"),
            SecretType::Env => write!(f, "env"),
            SecretType::File => write!(f, "file"),
        }
    }
}

/// Where the access token lives
#[derive(Clone, PartialEq, Eq)]
pub enum SecretSource {
    Arg(String),
    Env(String),
    File(PathBuf),
}

impl SecretSource {
    /// Build a source from the raw CLI argument
    ///
    /// Returns `None` when the argument is `-`, which callers use for flows
    /// that do not need authentication.
    pub fn from_argument(value: &str, kind: SecretType) -> Option<Self> {
        if value == NO_SECRET {
            return None;
        }

        Some(match kind {
            SecretType::Arg => SecretSource::Arg(value.to_string()),
            SecretType::Env => SecretSource::Env(value.to_string()),
            SecretType::File => SecretSource::File(PathBuf::from(value)),
        })
    }

    /// Read the secret, trimming surrounding whitespace
    ///
    /// # Errors
    ///
    /// - `ConfigError::MissingEnvVar` if the named variable is unset or not unicode
    /// - `ConfigError::UnreadableSecret` if the file cannot be read
    /// - `ConfigError::EmptySecret` if the source yields only whitespace
    pub fn resolve(&self) -> Result<SecretString, ConfigError> {
        let raw = match self {
            SecretSource::Arg(value) => value.clone(),
            SecretSource::Env(name) => {
                std::env::var(name).map_err(|_| ConfigError::MissingEnvVar(name.clone()))?
            }
            SecretSource::File(path) => {
                let expanded =
                    PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
                std::fs::read_to_string(&expanded).map_err(|source| {
                    ConfigError::UnreadableSecret {
                        path: expanded.clone(),
                        source,
                    }
                })?
            }
        };

        let secret = raw.trim();
        if secret.is_empty() {
            return Err(ConfigError::EmptySecret(self.to_string()));
        }

        Ok(SecretString::from(secret.to_string()))
    }
}

/// Resolve an optional source; `None` stays `None`
pub fn resolve_optional(
    source: Option<&SecretSource>,
) -> Result<Option<SecretString>, ConfigError> {
    source.map(SecretSource::resolve).transpose()
}

impl fmt::Display for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Arg(_) => write!(f, "command-line argument"),
            SecretSource::Env(name) => write!(f, "environment variable {}", name),
            SecretSource::File(path) => write!(f, "file {}", path.display()),
        }
    }
}

// Never print a literal token.
impl fmt::Debug for SecretSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecretSource::Arg(_) => f.debug_tuple("Arg").field(&"[REDACTED]").finish(),
            SecretSource::Env(name) => f.debug_tuple("Env").field(name).finish(),
            SecretSource::File(path) => f.debug_tuple("File").field(path).finish(),
        }
    }
}
