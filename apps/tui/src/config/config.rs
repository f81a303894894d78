use dotenv::dotenv;
use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::location::Geolocator;

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_url: String,
    pub request_timeout: Duration,
    pub geolocator: Geolocator,
    pub log_file: Option<PathBuf>,
    pub debug: bool,
}

/// Initializes the application configuration
/// Reads `.env` first, then the process environment
pub fn init_app_config() -> color_eyre::eyre::Result<AppConfig> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = AppConfig {
        api_url: api_url_from(env::var("API_URL").ok()),
        request_timeout: timeout_from(env::var("REQUEST_TIMEOUT_SECS").ok()),
        geolocator: Geolocator::from_values(
            env::var("USER_LAT").ok().as_deref(),
            env::var("USER_LON").ok().as_deref(),
        ),
        log_file: env::var("LOG_FILE")
            .ok()
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from),
        debug: flag_from(env::var("DEBUG").ok()),
    };

    if config.api_url.is_empty() {
        return Err(color_eyre::eyre::eyre!("API_URL must not be empty"));
    }

    Ok(config)
}

fn api_url_from(value: Option<String>) -> String {
    value
        .map(|url| url.trim().trim_end_matches('/').to_string())
        .filter(|url| !url.is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
}

fn timeout_from(value: Option<String>) -> Duration {
    let secs = value
        .and_then(|secs| secs.trim().parse::<u64>().ok())
        .filter(|&secs| secs > 0)
        .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
    Duration::from_secs(secs)
}

fn flag_from(value: Option<String>) -> bool {
    value.is_some_and(|flag| matches!(flag.trim(), "1" | "true" | "yes" | "on"))
}
