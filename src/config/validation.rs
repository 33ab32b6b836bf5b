use crate::config::types::{Config, ScraperConfig, ServerConfig};
use crate::{ConfigError, ConfigResult};
use reqwest::header::{HeaderName, HeaderValue};
use std::net::SocketAddr;

/// Upper bound on workers per scrape
const MAX_CONCURRENCY: usize = 100_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_server_config(&config.server)?;
    validate_scraper_config(&config.scraper)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> ConfigResult<()> {
    config.bind_address.parse::<SocketAddr>().map_err(|e| {
        ConfigError::InvalidAddress(format!("'{}': {}", config.bind_address, e))
    })?;

    if config.shutdown_timeout < 1 {
        return Err(ConfigError::Validation(
            "shutdown_timeout must be >= 1s".to_string(),
        ));
    }

    Ok(())
}

/// Validates scraper configuration
fn validate_scraper_config(config: &ScraperConfig) -> ConfigResult<()> {
    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if HeaderValue::from_str(&config.user_agent).is_err() {
        return Err(ConfigError::InvalidHeader(format!(
            "user_agent is not a valid header value: '{}'",
            config.user_agent
        )));
    }

    if config.request_timeout < 1 {
        return Err(ConfigError::Validation(
            "request_timeout must be >= 1s".to_string(),
        ));
    }

    if config.connect_timeout < 1 {
        return Err(ConfigError::Validation(
            "connect_timeout must be >= 1s".to_string(),
        ));
    }

    for (name, value) in &config.headers {
        validate_header(name, value)?;
    }

    Ok(())
}

/// Validates one extra request header
fn validate_header(name: &str, value: &str) -> ConfigResult<()> {
    HeaderName::from_bytes(name.as_bytes())
        .map_err(|_| ConfigError::InvalidHeader(format!("invalid header name '{}'", name)))?;

    HeaderValue::from_str(value).map_err(|_| {
        ConfigError::InvalidHeader(format!("invalid value for header '{}'", name))
    })?;

    Ok(())
}
