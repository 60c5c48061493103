use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub service_url: String,
    pub api_key: String,
    pub network_id: u64,
    pub token_address: String,
    pub token_decimals: u32,
    pub poll_interval_ms: u64,
    pub explorer_url: String,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
}

pub fn load_config() -> Result<AppConfig, ConfigError> {
    let s = Config::builder()
        // Set defaults
        .set_default("service_url", "https://api.enclave.money")?
        .set_default("api_key", "")?
        .set_default("network_id", 10_i64)?
        .set_default("token_address", "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85")?
        .set_default("token_decimals", 6_i64)?
        .set_default("poll_interval_ms", 10_000_i64)?
        .set_default("explorer_url", "https://optimistic.etherscan.io")?
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/aa_transfer.log")?
        // Add configuration from a file
        .add_source(File::with_name("config/config.yaml").required(false))
        // Add configuration from environment variables
        .add_source(config::Environment::with_prefix("APP"))
        .build()?;

    s.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = load_config().unwrap();

        assert_eq!(config.network_id, 10);
        assert_eq!(config.token_decimals, 6);
        assert_eq!(config.poll_interval_ms, 10_000);
        assert_eq!(
            config.token_address,
            "0x0b2C639c533813f4Aa9D7837CAf62653d097Ff85"
        );
        assert_eq!(config.explorer_url, "https://optimistic.etherscan.io");
    }
}
