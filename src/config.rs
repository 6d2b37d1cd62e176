use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::time::Duration;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    /// Generation workflow settings
    #[serde(default)]
    pub generation: GenerationConfig,
    /// Catalog listing and query limits
    #[serde(default)]
    pub catalog: CatalogConfig,
}

/// Configuration for calls to the generation service
#[derive(Debug, Deserialize, Clone)]
pub struct GenerationConfig {
    /// Model identifier recorded on every generation (e.g., "gemini-1.5-flash")
    #[serde(default = "default_model")]
    pub model: String,
    /// Number of attempts before the generation is recorded as failed
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Initial delay between retries in milliseconds (grows linearly with each attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    /// Per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl GenerationConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            timeout: default_timeout(),
        }
    }
}

/// Configuration for catalog queries
#[derive(Debug, Deserialize, Clone)]
pub struct CatalogConfig {
    /// Page size used when the caller does not ask for one
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Upper bound on a caller-requested page size
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,
    #[serde(default = "default_popular_limit")]
    pub popular_limit: usize,
    #[serde(default = "default_featured_limit")]
    pub featured_limit: usize,
    #[serde(default = "default_suggestion_limit")]
    pub suggestion_limit: usize,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            max_page_size: default_max_page_size(),
            popular_limit: default_popular_limit(),
            featured_limit: default_featured_limit(),
            suggestion_limit: default_suggestion_limit(),
        }
    }
}

// Default value functions
fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> usize {
    12
}

fn default_max_page_size() -> usize {
    50
}

fn default_popular_limit() -> usize {
    10
}

fn default_featured_limit() -> usize {
    8
}

fn default_suggestion_limit() -> usize {
    5
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECIPE_GEN__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECIPE_GEN__GENERATION__RETRY_ATTEMPTS
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the source priority.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECIPE_GEN__CATALOG__PAGE_SIZE
        .add_source(
            Environment::with_prefix("RECIPE_GEN")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    #[test]
    fn test_default_values() {
        assert_eq!(default_model(), "gemini-1.5-flash");
        assert_eq!(default_retry_attempts(), 3);
        assert_eq!(default_retry_delay_ms(), 1000);
        assert_eq!(default_timeout(), 30);
        assert_eq!(default_page_size(), 12);
        assert_eq!(default_max_page_size(), 50);
    }

    #[test]
    fn test_generation_config_default() {
        let generation = GenerationConfig::default();
        assert_eq!(generation.model, "gemini-1.5-flash");
        assert_eq!(generation.timeout(), Duration::from_secs(30));
    }

    #[test]
    fn test_empty_source_uses_defaults() {
        let config: AppConfig = Config::builder()
            .add_source(File::from_str("", FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.generation.retry_attempts, 3);
        assert_eq!(config.catalog.featured_limit, 8);
        assert_eq!(config.catalog.suggestion_limit, 5);
    }

    #[test]
    fn test_partial_override() {
        let toml = r#"
            [generation]
            model = "gemini-2.5-flash"
            retry_attempts = 5

            [catalog]
            page_size = 20
        "#;
        let config: AppConfig = Config::builder()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.generation.model, "gemini-2.5-flash");
        assert_eq!(config.generation.retry_attempts, 5);
        assert_eq!(config.generation.retry_delay_ms, 1000);
        assert_eq!(config.catalog.page_size, 20);
        assert_eq!(config.catalog.max_page_size, 50);
    }
}
