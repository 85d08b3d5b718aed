use crate::services::settlement::SettlementPolicy;
use config::builder::DefaultState;
use config::ConfigBuilder;
use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct DutyConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    #[serde(default = "default_service_name")]
    pub service_name: String,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// OTLP collector; spans are only exported when set.
    #[serde(default)]
    pub otlp_endpoint: Option<String>,
    #[serde(default)]
    pub rate_api: RateApiConfig,
    #[serde(default)]
    pub settlement: SettlementPolicy,
}

/// Where the customer rate and duty slip records are stored.
#[derive(Debug, Clone, Deserialize)]
pub struct RateApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for RateApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_service_name() -> String {
    "duty-slip-service".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_base_url() -> String {
    "http://localhost:7000".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl DutyConfig {
    /// Defaults, then an optional `configuration` file, then `APP_*` variables
    /// (`APP_RATE_API__BASE_URL`).
    pub fn load() -> Result<Self, AppError> {
        Self::from_builder(core_config::sources())
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, AppError> {
        let config: DutyConfig = builder.build()?.try_deserialize()?;

        if config.settlement.hours_per_day == 0 {
            return Err(AppError::ConfigError(anyhow::anyhow!(
                "settlement.hours_per_day must be greater than zero"
            )));
        }

        Ok(config)
    }
}
