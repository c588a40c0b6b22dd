// config.rs
use std::time::Duration;

use thiserror::Error;

use crate::utils::currency::CurrencyLocale;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} has an invalid value '{value}'")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_base_url: String,
    pub port: u16,
    pub allowed_origins: Vec<String>,
    // Upstream paging
    pub upstream_page_size: u32,
    pub upstream_max_pages: u32,
    pub request_timeout: Duration,
    // Notification polling
    pub notification_poll_interval: Duration,
    pub notification_idle_timeout: Duration,
    pub currency_locale: CurrencyLocale,
}

impl Config {
    pub fn init() -> Result<Config, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source; `init` passes the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Config, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_base_url = lookup("API_BASE_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .filter(|url| !url.is_empty())
            .ok_or(ConfigError::Missing("API_BASE_URL"))?;

        let allowed_origins = lookup("ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let currency_locale = match lookup("CURRENCY_LOCALE") {
            Some(tag) => CurrencyLocale::parse(&tag).ok_or(ConfigError::Invalid {
                name: "CURRENCY_LOCALE",
                value: tag,
            })?,
            None => CurrencyLocale::default(),
        };

        Ok(Config {
            api_base_url,
            port: parse_or(&lookup, "PORT", 8000)?,
            allowed_origins,
            upstream_page_size: parse_or(&lookup, "UPSTREAM_PAGE_SIZE", 100)?,
            upstream_max_pages: parse_or(&lookup, "UPSTREAM_MAX_PAGES", 20)?,
            request_timeout: Duration::from_secs(parse_or(&lookup, "REQUEST_TIMEOUT_SECS", 15)?),
            notification_poll_interval: Duration::from_secs(parse_or(
                &lookup,
                "NOTIFICATION_POLL_SECS",
                30,
            )?),
            notification_idle_timeout: Duration::from_secs(parse_or(
                &lookup,
                "NOTIFICATION_IDLE_SECS",
                300,
            )?),
            currency_locale,
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::Invalid { name, value: raw }),
        None => Ok(default),
    }
}
