//! Configuration management.
//!
//! Settings come from built-in defaults, an optional configuration file and
//! `GET_PAPERS_LIST_*` environment variables, in increasing priority. Nested
//! keys use `__` in environment variables:
//!
//! ```toml
//! [pubmed]
//! esearch_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi"
//! efetch_url = "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi"
//! database = "pubmed"
//! max_results = 10
//!
//! [http]
//! timeout_secs = 60
//! connect_timeout_secs = 10
//!
//! [logging]
//! level = "info"
//! ```
//!
//! ```bash
//! export GET_PAPERS_LIST_PUBMED__MAX_RESULTS=25
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::models::DEFAULT_MAX_RESULTS;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "GET_PAPERS_LIST";

/// Config file name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "get-papers-list.toml";

/// Application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// PubMed E-utilities settings
    #[serde(default)]
    pub pubmed: PubMedConfig,

    /// Outbound HTTP settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// PubMed E-utilities endpoints and search defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PubMedConfig {
    #[serde(default = "default_esearch_url")]
    pub esearch_url: String,

    #[serde(default = "default_efetch_url")]
    pub efetch_url: String,

    #[serde(default = "default_database")]
    pub database: String,

    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl Default for PubMedConfig {
    fn default() -> Self {
        Self {
            esearch_url: default_esearch_url(),
            efetch_url: default_efetch_url(),
            database: default_database(),
            max_results: default_max_results(),
        }
    }
}

fn default_esearch_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/esearch.fcgi".to_string()
}

fn default_efetch_url() -> String {
    "https://eutils.ncbi.nlm.nih.gov/entrez/eutils/efetch.fcgi".to_string()
}

fn default_database() -> String {
    "pubmed".to_string()
}

fn default_max_results() -> usize {
    DEFAULT_MAX_RESULTS
}

/// HTTP client configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Total request timeout; unset means no timeout
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: None,
            connect_timeout_secs: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Load configuration from an optional file plus environment overrides
pub fn load_config(path: Option<&Path>) -> Result<Config, config::ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path));
    }

    let settings = builder
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

/// Find a configuration file in the working directory or the user config dir
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(env!("CARGO_PKG_NAME")).join("config.toml"))
        .filter(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.pubmed.database, "pubmed");
        assert_eq!(config.pubmed.max_results, 10);
        assert!(config.pubmed.esearch_url.ends_with("esearch.fcgi"));
        assert!(config.pubmed.efetch_url.ends_with("efetch.fcgi"));
        assert_eq!(config.http.timeout_secs, None);
        assert!(config.http.user_agent.starts_with("get-papers-list/"));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_load_config_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(
            &path,
            r#"
[pubmed]
esearch_url = "http://localhost:9999/esearch.fcgi"
max_results = 3

[http]
timeout_secs = 15

[logging]
level = "debug"
"#,
        )
        .unwrap();

        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.pubmed.esearch_url, "http://localhost:9999/esearch.fcgi");
        assert_eq!(config.pubmed.max_results, 3);
        // Unspecified keys keep their defaults
        assert!(config.pubmed.efetch_url.ends_with("efetch.fcgi"));
        assert_eq!(config.http.timeout_secs, Some(15));
        assert_eq!(config.http.connect_timeout_secs, 10);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn test_load_config_missing_file() {
        let path = PathBuf::from("/nonexistent/get-papers-list.toml");
        assert!(load_config(Some(&path)).is_err());
    }

    #[test]
    fn test_load_config_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        fs::write(&path, "invalid = toml = content").unwrap();

        assert!(load_config(Some(&path)).is_err());
    }
}
