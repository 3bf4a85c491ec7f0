use std::time::Duration;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::dispatcher::{LoadTestSettings, DEFAULT_TARGET_URL};
use crate::order_generator::{GeneratorSettings, DEFAULT_TICKERS};

pub const DEFAULT_CONFIG_PATH: &str = "config/config.yaml";

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub target_url: String,
    pub concurrent_requests: usize,
    pub iterations: usize,
    pub request_timeout_ms: Option<u64>,
    pub tickers: Vec<String>,
    pub sell_price_min: f64,
    pub sell_price_max: f64,
    pub buy_price_max: f64,
    pub quantity_min: u32,
    pub quantity_max: u32,
    pub log_level: String,
    pub log_to_file: bool,
    pub log_file: String,
    pub print_summary: bool,
}

impl AppConfig {
    pub fn generator_settings(&self) -> GeneratorSettings {
        GeneratorSettings {
            tickers: self.tickers.clone(),
            sell_price_min: self.sell_price_min,
            sell_price_max: self.sell_price_max,
            buy_price_max: self.buy_price_max,
            quantity_min: self.quantity_min,
            quantity_max: self.quantity_max,
        }
    }

    pub fn load_test_settings(&self) -> LoadTestSettings {
        LoadTestSettings {
            target_url: self.target_url.clone(),
            concurrent_requests: self.concurrent_requests,
            iterations: self.iterations,
            request_timeout: self.request_timeout_ms.map(Duration::from_millis),
        }
    }
}

/// Serializes tests that read or mutate `APP_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(DEFAULT_CONFIG_PATH)
}

/// Defaults, then the optional yaml file at `path`, then `APP_*` env vars.
pub fn load_config_from(path: &str) -> Result<AppConfig, ConfigError> {
    let tickers: Vec<&str> = DEFAULT_TICKERS.to_vec();
    let s = Config::builder()
        // Set defaults
        .set_default("target_url", DEFAULT_TARGET_URL)?
        .set_default("concurrent_requests", 50)?
        .set_default("iterations", 20)?
        .set_default("tickers", tickers)?
        .set_default("sell_price_min", 100.0)?
        .set_default("sell_price_max", 150.0)?
        .set_default("buy_price_max", 200.0)?
        .set_default("quantity_min", 10)?
        .set_default("quantity_max", 100)?
        .set_default("log_level", "info")?
        .set_default("log_to_file", false)?
        .set_default("log_file", "log/order_load_test.log")?
        .set_default("print_summary", false)?
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("tickers"),
        )
        .build()?;

    s.try_deserialize()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env_guard() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_config(name: &str, contents: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("{}_{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.yaml");
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_defaults_without_file() {
        let _guard = env_guard();
        let config = load_config_from("config/does_not_exist.yaml").unwrap();

        assert_eq!(config.target_url, "http://127.0.0.1:3030/place_order");
        assert_eq!(config.concurrent_requests, 50);
        assert_eq!(config.iterations, 20);
        assert_eq!(config.request_timeout_ms, None);
        assert_eq!(config.tickers, vec!["AAPL", "GOOG", "TSLA", "MSFT"]);
        assert!(!config.print_summary);

        assert_eq!(config.generator_settings(), GeneratorSettings::default());
        assert_eq!(config.load_test_settings(), LoadTestSettings::default());
    }

    #[test]
    fn test_yaml_overrides_defaults() {
        let _guard = env_guard();
        let path = write_config(
            "order_load_test_cfg",
            "target_url: http://10.0.0.5:3030/place_order\n\
             concurrent_requests: 8\n\
             request_timeout_ms: 1500\n\
             tickers: [NVDA]\n",
        );

        let config = load_config_from(path.to_str().unwrap()).unwrap();
        let settings = config.load_test_settings();
        assert_eq!(settings.target_url, "http://10.0.0.5:3030/place_order");
        assert_eq!(settings.concurrent_requests, 8);
        assert_eq!(settings.iterations, 20);
        assert_eq!(settings.request_timeout, Some(Duration::from_millis(1500)));
        assert_eq!(config.generator_settings().tickers, vec!["NVDA"]);

        std::fs::remove_dir_all(path.parent().unwrap()).ok();
    }

    #[test]
    fn test_env_overrides_file_and_defaults() {
        let _guard = env_guard();
        let path = write_config(
            "order_load_test_env_cfg",
            "target_url: http://10.0.0.5:3030/place_order\n\
             concurrent_requests: 8\n\
             iterations: 7\n\
             tickers: [MSFT]\n",
        );

        std::env::set_var("APP_TARGET_URL", "http://10.1.1.1:3030/place_order");
        std::env::set_var("APP_CONCURRENT_REQUESTS", "6");
        std::env::set_var("APP_TICKERS", "NVDA,AMD");

        let result = load_config_from(path.to_str().unwrap());

        std::env::remove_var("APP_TARGET_URL");
        std::env::remove_var("APP_CONCURRENT_REQUESTS");
        std::env::remove_var("APP_TICKERS");
        std::fs::remove_dir_all(path.parent().unwrap()).ok();

        let config = result.unwrap();
        assert_eq!(config.target_url, "http://10.1.1.1:3030/place_order");
        assert_eq!(config.concurrent_requests, 6);
        assert_eq!(config.tickers, vec!["NVDA", "AMD"]);
        // untouched by env: file value, then default
        assert_eq!(config.iterations, 7);
        assert_eq!(config.quantity_max, 100);
    }
}
