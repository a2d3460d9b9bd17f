//! Configuration management.
//!
//! Settings come from defaults, an optional TOML file and `ALBUM_ART_*`
//! environment variables, in that order of precedence (later wins). Nested
//! keys use a double underscore, e.g. `ALBUM_ART_HTTP__TIMEOUT_SECONDS=10`.
//!
//! ```toml
//! locale = "us"
//!
//! [credentials]
//! access_key = "your-access-key"
//! secret_key = "your-secret-key"
//! associate_tag = "your-tag-20"
//!
//! [matching]
//! tolerance = 2
//!
//! [lookup]
//! on_failure = "discard"   # or "keep_match"
//!
//! [http]
//! timeout_seconds = 30
//! connect_timeout_seconds = 10
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::catalog::{Credentials, Locale};
use crate::session::LookupFailurePolicy;
use crate::utils::DEFAULT_TOLERANCE;

/// Name of the configuration file looked up in the working and config directories
pub const CONFIG_FILE_NAME: &str = "album-art.toml";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// API credentials
    #[serde(default)]
    pub credentials: Credentials,

    /// Catalog marketplace
    #[serde(default)]
    pub locale: Locale,

    /// Fuzzy matching settings
    #[serde(default)]
    pub matching: MatchingConfig,

    /// Image lookup settings
    #[serde(default)]
    pub lookup: LookupConfig,

    /// HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// Fuzzy matching configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingConfig {
    /// Largest edit distance at which two names are still the same
    #[serde(default = "default_tolerance")]
    pub tolerance: usize,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            tolerance: default_tolerance(),
        }
    }
}

fn default_tolerance() -> usize {
    DEFAULT_TOLERANCE
}

/// Image lookup configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LookupConfig {
    /// What to return when the album matched but its image lookup failed
    #[serde(default)]
    pub on_failure: LookupFailurePolicy,
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Whole-request timeout
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout(),
            connect_timeout_seconds: default_connect_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_user_agent() -> String {
    concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string()
}

/// Load configuration from a file, with environment overrides
pub fn load_config(path: &Path) -> Result<Config, ::config::ConfigError> {
    with_env(::config::Config::builder().add_source(::config::File::from(path)))
}

/// Layer `ALBUM_ART_*` variables over the given sources and deserialize
fn with_env(
    builder: ::config::ConfigBuilder<::config::builder::DefaultState>,
) -> Result<Config, ::config::ConfigError> {
    builder
        .add_source(
            ::config::Environment::with_prefix("ALBUM_ART")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

/// Find a configuration file in the working directory or the user config directory
pub fn find_config_file() -> Option<PathBuf> {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.is_file() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join("album-art").join("config.toml"))
        .filter(|path| path.is_file())
}

/// Get the configuration from environment variables, or defaults
pub fn get_config() -> Config {
    with_env(::config::Config::builder()).unwrap_or_else(|e| {
        tracing::warn!("Ignoring invalid environment configuration: {}", e);
        Config::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(toml: &str) -> Config {
        ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.locale, Locale::Us);
        assert_eq!(config.matching.tolerance, 2);
        assert_eq!(config.lookup.on_failure, LookupFailurePolicy::Discard);
        assert_eq!(config.http.timeout_seconds, 30);
        assert!(config.http.user_agent.starts_with("album-art/"));
    }

    #[test]
    fn test_config_from_toml() {
        let config = from_toml(
            r#"
            locale = "uk"

            [credentials]
            access_key = "AKIDEXAMPLE"
            secret_key = "secret"

            [matching]
            tolerance = 3

            [lookup]
            on_failure = "keep_match"

            [http]
            timeout_seconds = 5
            "#,
        );

        assert_eq!(config.locale, Locale::Uk);
        assert_eq!(config.credentials.access_key, "AKIDEXAMPLE");
        assert_eq!(config.credentials.secret_key, "secret");
        assert_eq!(config.credentials.associate_tag, None);
        assert_eq!(config.matching.tolerance, 3);
        assert_eq!(config.lookup.on_failure, LookupFailurePolicy::KeepMatch);
        assert_eq!(config.http.timeout_seconds, 5);
        assert_eq!(config.http.connect_timeout_seconds, 10);
    }

    #[test]
    fn test_environment_overrides_file() {
        std::env::set_var("ALBUM_ART_LOCALE", "de");
        std::env::set_var("ALBUM_ART_MATCHING__TOLERANCE", "5");
        std::env::set_var("ALBUM_ART_LOOKUP__ON_FAILURE", "keep_match");

        let config = with_env(::config::Config::builder().add_source(
            ::config::File::from_str(
                "locale = \"uk\"\n[matching]\ntolerance = 1\n",
                ::config::FileFormat::Toml,
            ),
        ))
        .unwrap();
        let from_env_only = get_config();

        std::env::remove_var("ALBUM_ART_LOCALE");
        std::env::remove_var("ALBUM_ART_MATCHING__TOLERANCE");
        std::env::remove_var("ALBUM_ART_LOOKUP__ON_FAILURE");

        assert_eq!(config.locale, Locale::De);
        assert_eq!(config.matching.tolerance, 5);
        assert_eq!(config.lookup.on_failure, LookupFailurePolicy::KeepMatch);
        assert_eq!(config.http.timeout_seconds, 30);

        assert_eq!(from_env_only.locale, Locale::De);
        assert_eq!(from_env_only.matching.tolerance, 5);
    }

    #[test]
    fn test_partial_credentials_fall_back_to_env() {
        std::env::set_var("AMAZON_ACCESS_KEY_ID", "AKID_FROM_ENV");
        std::env::set_var("AMAZON_SECRET_ACCESS_KEY", "secret-from-env");

        let config = from_toml(
            r#"
            [credentials]
            associate_tag = "tag-20"
            "#,
        );

        std::env::remove_var("AMAZON_ACCESS_KEY_ID");
        std::env::remove_var("AMAZON_SECRET_ACCESS_KEY");

        assert_eq!(config.credentials.access_key, "AKID_FROM_ENV");
        assert_eq!(config.credentials.secret_key, "secret-from-env");
        assert_eq!(config.credentials.associate_tag.as_deref(), Some("tag-20"));
        assert!(config.credentials.validate().is_ok());
    }

    #[test]
    fn test_missing_config_file() {
        assert!(load_config(Path::new("/nonexistent/album-art.toml")).is_err());
    }
}
