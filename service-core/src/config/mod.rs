use crate::error::AppError;
use config::builder::DefaultState;
use config::{Config as Cfg, ConfigBuilder, Environment, File};
use serde::Deserialize;

/// Settings every service shares, flattened into each service's own config.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    8080
}

/// Standard sources: an optional `configuration` file, then `APP_*`
/// environment variables with `__` separating nested keys.
///
/// Values from the environment are parsed into numbers and booleans so they
/// survive `#[serde(flatten)]`.
pub fn sources() -> ConfigBuilder<DefaultState> {
    dotenvy::dotenv().ok();

    Cfg::builder()
        .add_source(File::with_name("configuration").required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        Ok(sources().build()?.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn port_defaults_when_absent() {
        let config: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn port_is_read_from_builder() {
        let config: Config = Cfg::builder()
            .set_override("port", 9000)
            .unwrap()
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();
        assert_eq!(config.port, 9000);
    }
}
