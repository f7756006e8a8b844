pub use config::ConfigError;

use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::domain::bundle::BundleLimits;

#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub anthropic: AnthropicSettings,
    pub github: GithubSettings,
    pub logging: LoggingSettings,
    /// Read by the client, see `GlassboxClient::with_cache_settings`
    pub cache: CacheSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ApplicationSettings {
    pub host: String,
    pub port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub max_request_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AnthropicSettings {
    /// Upstream credential. Both streaming endpoints refuse to start without it.
    pub api_key: Option<String>,
    pub model_name: String,
    pub base_url: String,
    pub max_tokens: u32,
    pub request_timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GithubSettings {
    pub token: Option<String>,
    pub api_base_url: String,
    pub raw_base_url: String,
    pub request_timeout_secs: u64,
    pub max_readme_chars: usize,
    pub max_file_chars: usize,
    pub max_tree_entries: usize,
    pub max_listed_files: usize,
    pub max_priority_files: usize,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    pub level: String,
    pub format: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheSettings {
    pub enabled: bool,
    pub directory: PathBuf,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            .set_default("application.host", "0.0.0.0")?
            .set_default("application.port", 8000)?
            .set_default("application.environment", environment.clone())?
            .set_default("application.cors_origins", vec!["http://localhost:3000"])?
            .set_default("application.max_request_bytes", 64 * 1024)?
            .set_default("anthropic.model_name", "claude-sonnet-4-5-20250929")?
            .set_default("anthropic.base_url", "https://api.anthropic.com")?
            .set_default("anthropic.max_tokens", 4096)?
            .set_default("anthropic.request_timeout_secs", 300)?
            .set_default("github.api_base_url", "https://api.github.com")?
            .set_default("github.raw_base_url", "https://raw.githubusercontent.com")?
            .set_default("github.request_timeout_secs", 15)?
            .set_default("github.max_readme_chars", 15_000)?
            .set_default("github.max_file_chars", 8_000)?
            .set_default("github.max_tree_entries", 2_000)?
            .set_default("github.max_listed_files", 500)?
            .set_default("github.max_priority_files", 12)?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "json")?
            .set_default("cache.enabled", true)?
            .set_default("cache.directory", ".glassbox-cache")?
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{environment}")).required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("GLASSBOX").separator("__"))
            // Conventional variable names used by hosting platforms
            .set_override_option("anthropic.api_key", non_empty_env("ANTHROPIC_API_KEY"))?
            .set_override_option("anthropic.model_name", non_empty_env("MODEL_NAME"))?
            .set_override_option("github.token", non_empty_env("GITHUB_TOKEN"))?
            .build()?;

        config.try_deserialize()
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.application.host, self.application.port)
    }
}

impl AnthropicSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl GithubSettings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn bundle_limits(&self) -> BundleLimits {
        BundleLimits {
            max_readme_chars: self.max_readme_chars,
            max_file_chars: self.max_file_chars,
            max_tree_entries: self.max_tree_entries,
            max_listed_files: self.max_listed_files,
            max_priority_files: self.max_priority_files,
        }
    }
}

fn non_empty_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|value| !value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_can_be_loaded() {
        let settings = Settings::new();
        assert!(settings.is_ok());
    }

    #[test]
    fn test_default_limits_match_fetcher_bounds() {
        let settings = Settings::new().unwrap();
        let limits = settings.github.bundle_limits();
        assert_eq!(limits.max_priority_files, 12);
        assert_eq!(limits.max_readme_chars, 15_000);
        assert_eq!(limits.max_file_chars, 8_000);
        assert_eq!(settings.github.request_timeout(), Duration::from_secs(15));
    }

    #[test]
    fn test_bind_address_format() {
        let settings = Settings::new().unwrap();
        let address = settings.bind_address();
        assert!(address.ends_with(&format!(":{}", settings.application.port)));
        assert!(address.starts_with(&settings.application.host));
    }
}
