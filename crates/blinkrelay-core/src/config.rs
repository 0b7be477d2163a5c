//! Application configuration.
//!
//! Configuration is read once at process start from environment variables
//! (after `.env` has been loaded by the binary) and passed explicitly into
//! the session manager, snapshot relay and poll loop.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Application name used for the config directory path
const APP_NAME: &str = "blinkrelay";

/// Credential file name in the config directory
const CREDENTIAL_FILE: &str = "blink-cred.json";

/// Default seconds between the end of one poll cycle and the start of the next
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;

/// Default chance that a cycle requests fresh captures from every device
pub const DEFAULT_CAPTURE_PROBABILITY: f64 = 0.2;

const DEFAULT_BUCKET: &str = "housephotos";
const DEFAULT_PATH_PREFIX: &str = "blink";

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("{key} has invalid value {value:?}: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },
}

/// Blink account credentials. Never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub poll_interval_secs: u64,
    /// Supabase project URL, without trailing slash
    pub storage_base_url: String,
    /// Service role key used for storage uploads
    pub storage_key: String,
    pub bucket_name: String,
    /// Prefix for object names, e.g. `blink` in `cameras/blink-latest.jpg`
    pub path_prefix: String,
    pub credential_file: PathBuf,
    pub capture_probability: f64,
    pub credentials: Credentials,
}

impl Config {
    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup.
    /// Empty values are treated as absent.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let require = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        // Blink credentials are checked first so the error order matches the
        // order users set them up in.
        let email = require("BLINK_EMAIL")?;
        let password = require("BLINK_PASSWORD")?;
        let storage_base_url = require("SUPABASE_URL")?;
        let storage_key = require("SUPABASE_SERVICE_ROLE_KEY")?;

        let poll_interval_secs = match get("POLL_INTERVAL") {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) => {
                    return Err(ConfigError::Invalid {
                        key: "POLL_INTERVAL",
                        value: raw,
                        reason: "must be greater than zero",
                    })
                }
                Ok(secs) => secs,
                Err(_) => {
                    return Err(ConfigError::Invalid {
                        key: "POLL_INTERVAL",
                        value: raw,
                        reason: "expected whole seconds",
                    })
                }
            },
            None => DEFAULT_POLL_INTERVAL_SECS,
        };

        let capture_probability = match get("CAPTURE_PROBABILITY") {
            Some(raw) => match raw.parse::<f64>() {
                Ok(p) if (0.0..=1.0).contains(&p) => p,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "CAPTURE_PROBABILITY",
                        value: raw,
                        reason: "expected a number between 0 and 1",
                    })
                }
            },
            None => DEFAULT_CAPTURE_PROBABILITY,
        };

        let credential_file = get("BLINK_CRED_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(default_credential_file);

        Ok(Self {
            poll_interval_secs,
            storage_base_url: storage_base_url.trim_end_matches('/').to_string(),
            storage_key,
            bucket_name: get("STORAGE_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            path_prefix: get("SNAPSHOT_PREFIX").unwrap_or_else(|| DEFAULT_PATH_PREFIX.to_string()),
            credential_file,
            capture_probability,
            credentials: Credentials::new(email, password),
        })
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

/// `~/.config/blinkrelay/blink-cred.json`, or the working directory when the
/// platform has no config directory.
fn default_credential_file() -> PathBuf {
    match dirs::config_dir() {
        Some(dir) => dir.join(APP_NAME).join(CREDENTIAL_FILE),
        None => PathBuf::from(format!(".{}", CREDENTIAL_FILE)),
    }
}
