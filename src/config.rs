use std::env;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default port used when `PORT` is not provided.
pub const DEFAULT_PORT: u16 = 5000;
/// Default Gemini API base URL.
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
/// Default Gemini model used for summaries.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
/// Default directory receiving uploaded files.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Default timeout applied to each outbound summarization call.
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
/// Default request body limit for multipart uploads (32 MiB).
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;
/// Default destination of the server's file log layer.
pub const DEFAULT_LOG_FILE: &str = "logs/synopsis.log";

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Synopsis server.
///
/// Built once at process start and shared behind an `Arc`; components never read the
/// environment on their own.
#[derive(Debug, Clone)]
pub struct Config {
    /// Gemini API key. Summaries degrade to the generic failure message when absent.
    pub api_key: Option<String>,
    /// Port the HTTP server binds to.
    pub server_port: u16,
    /// Base URL of the generative-language API.
    pub gemini_base_url: String,
    /// Model identifier used in the `generateContent` path.
    pub gemini_model: String,
    /// Directory where uploaded files are persisted before extraction.
    pub upload_dir: PathBuf,
    /// Timeout applied to each outbound summarization request.
    pub request_timeout: Duration,
    /// Maximum accepted request body size in bytes.
    pub max_upload_bytes: usize,
    /// File the server appends its log lines to.
    pub log_file: PathBuf,
}

impl Config {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup, treating blank values as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        Ok(Self {
            api_key: optional("API_KEY").or_else(|| optional("GEMINI_API_KEY")),
            server_port: parse_optional(optional("PORT"), "PORT")?.unwrap_or(DEFAULT_PORT),
            gemini_base_url: optional("GEMINI_BASE_URL")
                .unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
            gemini_model: optional("GEMINI_MODEL")
                .unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            upload_dir: optional("UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR)),
            request_timeout: Duration::from_secs(
                parse_optional(optional("SUMMARY_TIMEOUT_SECS"), "SUMMARY_TIMEOUT_SECS")?
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            max_upload_bytes: parse_optional(optional("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            log_file: optional("SYNOPSIS_LOG_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE)),
        })
    }

    /// Emit the effective settings at debug level, without the API key itself.
    pub fn log_summary(&self) {
        tracing::debug!(
            server_port = self.server_port,
            model = %self.gemini_model,
            upload_dir = %self.upload_dir.display(),
            log_file = %self.log_file.display(),
            timeout_secs = self.request_timeout.as_secs(),
            api_key_present = self.api_key.is_some(),
            "Loaded configuration"
        );
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            server_port: DEFAULT_PORT,
            gemini_base_url: DEFAULT_GEMINI_BASE_URL.to_string(),
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
        }
    }
}

fn parse_optional<T: std::str::FromStr>(
    value: Option<String>,
    key: &str,
) -> Result<Option<T>, ConfigError> {
    value
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue(key.to_string()))
        })
        .transpose()
}

/// Load `.env`, then build the configuration from the environment.
///
/// Runs before tracing is installed; callers log the result with [`Config::log_summary`].
pub fn init_config() -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    Config::from_env()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_environment_is_empty() {
        let config = Config::from_lookup(lookup_from(&[])).expect("config");
        assert!(config.api_key.is_none());
        assert_eq!(config.server_port, 5000);
        assert_eq!(config.gemini_model, "gemini-2.0-flash");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.request_timeout, Duration::from_secs(60));
        assert_eq!(config.log_file, PathBuf::from("logs/synopsis.log"));
    }

    #[test]
    fn api_key_falls_back_to_gemini_variable() {
        let config =
            Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "gk"), ("API_KEY", "  ")]))
                .expect("config");
        assert_eq!(config.api_key.as_deref(), Some("gk"));

        let config =
            Config::from_lookup(lookup_from(&[("GEMINI_API_KEY", "gk"), ("API_KEY", "primary")]))
                .expect("config");
        assert_eq!(config.api_key.as_deref(), Some("primary"));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = Config::from_lookup(lookup_from(&[
            ("PORT", "8080"),
            ("SUMMARY_TIMEOUT_SECS", "5"),
            ("MAX_UPLOAD_BYTES", "1024"),
            ("UPLOAD_DIR", "/tmp/synopsis"),
            ("SYNOPSIS_LOG_FILE", "/var/log/synopsis/server.log"),
        ]))
        .expect("config");
        assert_eq!(config.log_file, PathBuf::from("/var/log/synopsis/server.log"));
        assert_eq!(config.server_port, 8080);
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_upload_bytes, 1024);
        assert_eq!(config.upload_dir, PathBuf::from("/tmp/synopsis"));
    }

    #[test]
    fn invalid_port_is_rejected() {
        let error = Config::from_lookup(lookup_from(&[("PORT", "not-a-port")]))
            .expect_err("invalid port");
        assert!(matches!(error, ConfigError::InvalidValue(key) if key == "PORT"));
    }
}
