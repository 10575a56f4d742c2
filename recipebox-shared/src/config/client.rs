use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use std::{
    env, fs,
    path::{Path, PathBuf},
    str::FromStr,
    time::Duration,
};
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Environment variable overriding [`ClientConfig::api_base_url`].
pub const ENV_API_URL: &str = "RECIPEBOX_API_URL";
/// Environment variable overriding [`ClientConfig::token_path`].
pub const ENV_TOKEN_PATH: &str = "RECIPEBOX_TOKEN_PATH";
/// Environment variable overriding [`ClientConfig::log_level`].
pub const ENV_LOG_LEVEL: &str = "RECIPEBOX_LOG_LEVEL";
/// Environment variable overriding [`ClientConfig::request_timeout_secs`].
pub const ENV_REQUEST_TIMEOUT: &str = "RECIPEBOX_REQUEST_TIMEOUT_SECS";

const DEFAULT_API_BASE_URL: &str = "http://localhost:3000/api";
const DEFAULT_LOG_LEVEL: &str = "info";

/// Errors raised while loading or validating a [`ClientConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse configuration file {path}: {message}")]
    Parse { path: PathBuf, message: String },
    #[error("failed to render configuration as {format}: {message}")]
    Render {
        format: ConfigFormat,
        message: String,
    },
    #[error("unsupported configuration format for {0}; use yaml, json or toml")]
    UnsupportedFormat(PathBuf),
    #[error("invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// On-disk formats the configuration can be read from and written to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` / `.yml`
    Yaml,
    /// `.json`
    Json,
    /// `.toml`
    Toml,
}

impl ConfigFormat {
    /// Pick a format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Conventional file name for a generated configuration.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Yaml => "recipebox.yaml",
            Self::Json => "recipebox.json",
            Self::Toml => "recipebox.toml",
        }
    }
}

impl FromStr for ConfigFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "yaml" | "yml" => Ok(Self::Yaml),
            "json" => Ok(Self::Json),
            "toml" => Ok(Self::Toml),
            other => Err(format!("unsupported format '{other}'; use yaml, json or toml")),
        }
    }
}

impl std::fmt::Display for ConfigFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Yaml => "yaml",
            Self::Json => "json",
            Self::Toml => "toml",
        })
    }
}

/// Configuration for `RecipeBox` clients.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL every API path is joined onto, including the `/api` prefix.
    pub api_base_url: String,

    /// File holding the session token. Falls back to [`default_token_path`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_path: Option<PathBuf>,

    /// Logging level used when `RUST_LOG` is not set.
    pub log_level: String,

    /// Per-request timeout. `None` waits indefinitely.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl ClientConfig {
    /// Generates a default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            token_path: None,
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            request_timeout_secs: None,
        }
    }

    /// Loads the configuration from a file, environment variables, or defaults.
    ///
    /// Precedence, lowest first: defaults, the file at `config_path`,
    /// `RECIPEBOX_*` environment variables (only for values the file left at
    /// their default), then `api_url_override`.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if the
    /// resolved configuration fails [`ClientConfig::validate`].
    pub fn load_config(
        config_path: Option<&Path>,
        api_url_override: Option<&str>,
    ) -> Result<Self, ConfigError> {
        Self::load_config_with_env(config_path, api_url_override, |key| env::var(key).ok())
    }

    /// Same as [`ClientConfig::load_config`] with an injectable environment.
    ///
    /// # Errors
    /// See [`ClientConfig::load_config`].
    pub fn load_config_with_env<F>(
        config_path: Option<&Path>,
        api_url_override: Option<&str>,
        lookup: F,
    ) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::with_defaults();
        let mut config = match config_path {
            Some(path) => Self::from_file(path)?,
            None => defaults.clone(),
        };

        if config.api_base_url == defaults.api_base_url {
            if let Some(url) = lookup(ENV_API_URL) {
                config.api_base_url = url;
            }
        }
        if config.token_path.is_none() {
            if let Some(path) = lookup(ENV_TOKEN_PATH).filter(|path| !path.trim().is_empty()) {
                config.token_path = Some(PathBuf::from(path));
            }
        }
        if config.log_level == defaults.log_level {
            if let Some(level) = lookup(ENV_LOG_LEVEL) {
                config.log_level = level;
            }
        }
        if config.request_timeout_secs.is_none() {
            if let Some(raw) = lookup(ENV_REQUEST_TIMEOUT) {
                let secs = raw.trim().parse::<u64>().map_err(|_| ConfigError::InvalidValue {
                    key: ENV_REQUEST_TIMEOUT,
                    message: format!("'{raw}' is not a whole number of seconds"),
                })?;
                config.request_timeout_secs = Some(secs);
            }
        }

        if let Some(url) = api_url_override {
            config.api_base_url = url.to_string();
        }

        config.validate()?;
        Ok(config)
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let format =
            ConfigFormat::from_path(path).ok_or_else(|| ConfigError::UnsupportedFormat(path.into()))?;
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.into(),
            source,
        })?;
        let parse_error = |message: String| ConfigError::Parse {
            path: path.into(),
            message,
        };

        match format {
            ConfigFormat::Yaml => serde_yml::from_str(&content).map_err(|e| parse_error(e.to_string())),
            ConfigFormat::Json => serde_json::from_str(&content).map_err(|e| parse_error(e.to_string())),
            ConfigFormat::Toml => toml::from_str(&content).map_err(|e| parse_error(e.to_string())),
        }
    }

    /// Check that every value is usable.
    ///
    /// # Errors
    /// Returns [`ConfigError::InvalidValue`] naming the first offending key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = Url::parse(&self.api_base_url).map_err(|err| ConfigError::InvalidValue {
            key: "api_base_url",
            message: format!("'{}' is not a valid URL: {err}", self.api_base_url),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidValue {
                key: "api_base_url",
                message: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        self.log_level
            .parse::<LevelFilter>()
            .map_err(|_| ConfigError::InvalidValue {
                key: "log_level",
                message: format!("unknown level '{}'", self.log_level),
            })?;

        if self.request_timeout_secs == Some(0) {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                message: "must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Token file to use, falling back to the per-user default.
    #[must_use]
    pub fn resolved_token_path(&self) -> PathBuf {
        self.token_path.clone().unwrap_or_else(default_token_path)
    }

    /// Per-request timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Serialize the configuration in the given format.
    ///
    /// # Errors
    /// Returns [`ConfigError::Render`] if the serializer rejects the value.
    pub fn render(&self, format: ConfigFormat) -> Result<String, ConfigError> {
        let render_error = |message: String| ConfigError::Render { format, message };
        match format {
            ConfigFormat::Yaml => serde_yml::to_string(self).map_err(|e| render_error(e.to_string())),
            ConfigFormat::Json => {
                serde_json::to_string_pretty(self).map_err(|e| render_error(e.to_string()))
            }
            ConfigFormat::Toml => toml::to_string(self).map_err(|e| render_error(e.to_string())),
        }
    }
}

/// Per-user location of the session token file.
#[must_use]
pub fn default_token_path() -> PathBuf {
    BaseDirs::new()
        .map(|dirs| dirs.config_dir().join("recipebox").join("token"))
        .unwrap_or_else(|| PathBuf::from("./recipebox.token"))
}
