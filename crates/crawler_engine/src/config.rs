use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_PROFILE_VARIANT: &str = "Default";

const KNOWN_KEYS: &[&str] = &["url", "chrome_profile_dir", "profile_directory", "headless"];
const REQUIRED_KEYS: &[&str] = &["url", "chrome_profile_dir"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found: {0}")]
    NotFound(PathBuf),
    #[error("unable to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("configuration is not valid JSON: {0}")]
    Parse(#[source] serde_json::Error),
    #[error("configuration must be a JSON object")]
    NotAnObject,
    #[error("unknown configuration keys: {0:?}")]
    UnknownKeys(Vec<String>),
    #[error("missing configuration value: {0}")]
    MissingKey(&'static str),
    #[error("invalid configuration value: {0}")]
    InvalidValue(#[source] serde_json::Error),
    #[error("the {0} setting cannot be empty")]
    Empty(&'static str),
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    url: String,
    chrome_profile_dir: String,
    #[serde(default = "default_profile_variant")]
    profile_directory: String,
    #[serde(default)]
    headless: bool,
}

fn default_profile_variant() -> String {
    DEFAULT_PROFILE_VARIANT.to_string()
}

/// Validated crawler settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlerConfig {
    url: String,
    session_profile: String,
    profile_variant: String,
    headless: bool,
}

impl CrawlerConfig {
    pub fn new(
        url: impl Into<String>,
        session_profile: impl Into<String>,
    ) -> Result<Self, ConfigError> {
        let config = Self {
            url: url.into(),
            session_profile: session_profile.into(),
            profile_variant: default_profile_variant(),
            headless: false,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn with_profile_variant(mut self, variant: impl Into<String>) -> Self {
        self.profile_variant = variant.into();
        self
    }

    pub fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Load and validate a JSON configuration file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                ConfigError::NotFound(path.to_path_buf())
            } else {
                ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                }
            }
        })?;
        let value: Value = serde_json::from_str(&text).map_err(ConfigError::Parse)?;
        Self::from_value(value)
    }

    /// Validate an already parsed configuration document.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let object = value.as_object().ok_or(ConfigError::NotAnObject)?;

        let mut unknown: Vec<String> = object
            .keys()
            .filter(|key| !KNOWN_KEYS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            unknown.sort();
            return Err(ConfigError::UnknownKeys(unknown));
        }
        if let Some(missing) = REQUIRED_KEYS.iter().find(|key| !object.contains_key(**key)) {
            return Err(ConfigError::MissingKey(*missing));
        }

        let raw: RawConfig = serde_json::from_value(value).map_err(ConfigError::InvalidValue)?;
        let config = Self {
            url: raw.url,
            session_profile: raw.chrome_profile_dir,
            profile_variant: raw.profile_directory,
            headless: raw.headless,
        };
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.url.is_empty() {
            return Err(ConfigError::Empty("url"));
        }
        if self.session_profile.is_empty() {
            return Err(ConfigError::Empty("chrome_profile_dir"));
        }
        Ok(())
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Browser profile location, as a `--user-data-dir=...` argument or a bare path.
    pub fn session_profile(&self) -> &str {
        &self.session_profile
    }

    /// Profile directory inside the user data dir, e.g. `Default` or `Profile 1`.
    pub fn profile_variant(&self) -> &str {
        &self.profile_variant
    }

    pub fn headless(&self) -> bool {
        self.headless
    }
}
