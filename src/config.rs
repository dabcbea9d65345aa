// src/config.rs

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Dashboard settings, read from the environment after `.env` is loaded.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind: String,
    pub port: u16,
    /// Pre-trained forecaster artifact, reloaded on every prediction.
    pub model_path: PathBuf,
    pub market_data_url: String,
    pub frontend_dir: PathBuf,
    pub fetch_timeout: Duration,
}

pub const DEFAULT_MODEL_PATH: &str = "Latest_stock_price_model.json";
pub const DEFAULT_MARKET_DATA_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";

fn env_str(name: &str, default: &str) -> String {
    env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn env_parse<T: std::str::FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|s| s.trim().parse().ok())
        .unwrap_or(default)
}

impl AppConfig {
    pub fn from_env() -> Self {
        AppConfig {
            bind: env_str("DASHBOARD_BIND", "127.0.0.1"),
            port: env_parse("DASHBOARD_PORT", 8080),
            model_path: PathBuf::from(env_str("MODEL_PATH", DEFAULT_MODEL_PATH)),
            market_data_url: env_str("MARKET_DATA_URL", DEFAULT_MARKET_DATA_URL),
            frontend_dir: PathBuf::from(env_str("FRONTEND_DIR", "./frontend")),
            fetch_timeout: Duration::from_secs(env_parse("FETCH_TIMEOUT_SECS", 30)),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            market_data_url: DEFAULT_MARKET_DATA_URL.to_string(),
            frontend_dir: PathBuf::from("./frontend"),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}
