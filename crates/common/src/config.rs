//! Application configuration.

use serde::Deserialize;
use std::path::Path;

/// Application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    /// Recommendation scoring defaults.
    #[serde(default)]
    pub recommendation: RecommendationConfig,
    /// Demo data seeding.
    #[serde(default)]
    pub seed: SeedConfig,
    /// Log output.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Recommendation scorer configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationConfig {
    /// Search radius used when a request does not give one, in kilometres.
    #[serde(default = "default_radius_km")]
    pub default_radius_km: f64,
    /// Result count used when a request does not give one.
    #[serde(default = "default_max_results")]
    pub default_max_results: usize,
    /// How many catalog candidates to fetch per requested result.
    #[serde(default = "default_over_fetch_factor")]
    pub over_fetch_factor: usize,
    /// Upper bound on the result count a request may ask for.
    #[serde(default = "default_max_results_cap")]
    pub max_results_cap: usize,
}

/// Seeding configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    /// Whether to load demo restaurants at start-up.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

const fn default_radius_km() -> f64 {
    10.0
}

const fn default_max_results() -> usize {
    10
}

const fn default_over_fetch_factor() -> usize {
    2
}

const fn default_max_results_cap() -> usize {
    50
}

const fn default_true() -> bool {
    true
}

fn default_log_filter() -> String {
    "tablemate=debug".to_string()
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            default_radius_km: default_radius_km(),
            default_max_results: default_max_results(),
            over_fetch_factor: default_over_fetch_factor(),
            max_results_cap: default_max_results_cap(),
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: false,
        }
    }
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Configuration is loaded in the following order:
    /// 1. `.env` (if present)
    /// 2. `config/default.toml`
    /// 3. `config/{environment}.toml` (based on `TABLEMATE_ENV`)
    /// 4. Environment variables with `TABLEMATE_` prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        let env = std::env::var("TABLEMATE_ENV").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TABLEMATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration from a specific file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("TABLEMATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}
