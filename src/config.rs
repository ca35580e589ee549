//! Startup configuration
//!
//! Built once in `main` and handed to the app; nothing reads the environment
//! after that.

use std::env;

use reqwest::Url;
use thiserror::Error;

/// Local development service address
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";

pub const API_BASE_URL_VAR: &str = "RENTSCOPE_API_BASE_URL";
pub const LOG_VAR: &str = "RENTSCOPE_LOG";

/// Captured when the binary is built, overridden by the runtime environment
const BUILD_API_BASE_URL: Option<&str> = option_env!("RENTSCOPE_API_BASE_URL");

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid API base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub api_base_url: String,
    /// Fallback filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            log_filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Flag > runtime environment (including `.env`) > build-time value > default
    pub fn load(flag_base_url: Option<&str>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let runtime_base_url = env::var(API_BASE_URL_VAR).ok();
        let log_filter = env::var(LOG_VAR).ok();

        Self::resolve(
            flag_base_url,
            runtime_base_url.as_deref(),
            BUILD_API_BASE_URL,
            log_filter.as_deref(),
        )
    }

    fn resolve(
        flag: Option<&str>,
        runtime: Option<&str>,
        build: Option<&str>,
        log_filter: Option<&str>,
    ) -> Result<Self, ConfigError> {
        let raw = [flag, runtime, build]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty())
            .unwrap_or(DEFAULT_API_BASE_URL);

        let api_base_url = validate_base_url(raw)?;
        let log_filter = log_filter
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .unwrap_or("info")
            .to_string();

        Ok(Self {
            api_base_url,
            log_filter,
        })
    }
}

fn validate_base_url(raw: &str) -> Result<String, ConfigError> {
    let url = Url::parse(raw).map_err(|err| ConfigError::InvalidBaseUrl {
        value: raw.to_string(),
        reason: err.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidBaseUrl {
            value: raw.to_string(),
            reason: format!("unsupported scheme '{}'", url.scheme()),
        });
    }

    Ok(raw.trim_end_matches('/').to_string())
}
