//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (counts and windows > 0)
//! - Check that a configured backend URL is really an HTTP(S) URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: AppConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;
use url::Url;

use crate::config::schema::AppConfig;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// A single semantic problem with a loaded configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    NotPositive { field: &'static str },

    #[error("backend.url is not an http(s) URL: {0}")]
    InvalidBackendUrl(String),

    #[error("observability.log_level is not a known level: {0}")]
    UnknownLogLevel(String),

    #[error("app.storage_prefix must not be empty")]
    EmptyStoragePrefix,
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &AppConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let limits = &config.rate_limits;

    if limits.api_max_requests == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limits.api_max_requests" });
    }
    if limits.api_window_ms == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limits.api_window_ms" });
    }
    if limits.backend_ops_per_minute == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limits.backend_ops_per_minute" });
    }
    if limits.sync_interval_ms == 0 {
        errors.push(ValidationError::NotPositive { field: "rate_limits.sync_interval_ms" });
    }

    let backend_url = config.backend.url.trim();
    if !backend_url.is_empty() {
        let is_http = Url::parse(backend_url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !is_http {
            errors.push(ValidationError::InvalidBackendUrl(backend_url.to_string()));
        }
    }

    let level = config.observability.log_level.to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ValidationError::UnknownLogLevel(config.observability.log_level.clone()));
    }

    if config.app.storage_prefix.is_empty() {
        errors.push(ValidationError::EmptyStoragePrefix);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
