use crate::error::{CampaignError, CampaignResult};
use crate::filter::MetricsFilter;
use serde::Deserialize;

/// Root application configuration. Loaded from an optional
/// `traffic-control.toml` and environment variables with the prefix
/// `TRAFFIC_CONTROL__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub reporting: ReportingConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_records_path")]
    pub records_path: String,
    #[serde(default = "default_cache_max_entries")]
    pub cache_max_entries: usize,
    #[serde(default = "default_platform")]
    pub default_platform: String,
    #[serde(default = "default_period")]
    pub default_period: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default = "default_log_json")]
    pub json: bool,
}

// Default functions
fn default_records_path() -> String {
    "data/creatives.json".to_string()
}
fn default_cache_max_entries() -> usize {
    1024
}
fn default_platform() -> String {
    "all".to_string()
}
fn default_period() -> String {
    "month".to_string()
}
fn default_log_filter() -> String {
    "traffic_control=info,traffic_reporting=info,traffic_core=info".to_string()
}
fn default_log_json() -> bool {
    true
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            records_path: default_records_path(),
            cache_max_entries: default_cache_max_entries(),
            default_platform: default_platform(),
            default_period: default_period(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            json: default_log_json(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            reporting: ReportingConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from the optional config file and environment.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("traffic-control").required(false))
            .add_source(
                config::Environment::with_prefix("TRAFFIC_CONTROL")
                    .separator("__")
                    .try_parsing(true),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Reject configured default filters the engine would refuse at query time.
    pub fn validate(&self) -> CampaignResult<()> {
        MetricsFilter::parse(
            &self.reporting.default_platform,
            &self.reporting.default_period,
        )
        .map_err(|e| CampaignError::Config(format!("reporting defaults: {e}")))?;
        Ok(())
    }
}
