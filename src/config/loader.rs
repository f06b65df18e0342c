//! Configuration loading from disk and environment.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Environment variables that override file values.
pub const ENV_BACKEND_URL: &str = "AJOS_BACKEND_URL";
pub const ENV_BACKEND_ANON_KEY: &str = "AJOS_BACKEND_ANON_KEY";
pub const ENV_AI_API_KEY: &str = "AJOS_AI_API_KEY";
pub const ENV_LOG_LEVEL: &str = "AJOS_LOG_LEVEL";

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file, applying environment overrides.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let mut config: AppConfig = toml::from_str(&content)?;

    apply_env_overrides(&mut config, |key| std::env::var(key).ok());
    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

/// Load from `path` when given, otherwise start from defaults.
///
/// Environment overrides and validation apply in both cases.
pub fn load_or_default(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    match path {
        Some(path) => load_config(path),
        None => {
            let mut config = AppConfig::default();
            apply_env_overrides(&mut config, |key| std::env::var(key).ok());
            validate_config(&config).map_err(ConfigError::Validation)?;
            Ok(config)
        }
    }
}

/// Overwrite credential and log-level fields from `lookup`.
///
/// Empty values are ignored so an exported-but-blank variable does not wipe
/// a value from the file.
pub fn apply_env_overrides<F>(config: &mut AppConfig, lookup: F)
where
    F: Fn(&str) -> Option<String>,
{
    let fetch = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

    if let Some(url) = fetch(ENV_BACKEND_URL) {
        config.backend.url = url;
    }
    if let Some(key) = fetch(ENV_BACKEND_ANON_KEY) {
        config.backend.anon_key = key;
    }
    if let Some(key) = fetch(ENV_AI_API_KEY) {
        config.ai.api_key = key;
    }
    if let Some(level) = fetch(ENV_LOG_LEVEL) {
        config.observability.log_level = level;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_BACKEND_URL, "https://env.supabase.co"),
            (ENV_AI_API_KEY, "  real-key  "),
            (ENV_BACKEND_ANON_KEY, ""),
        ]);

        let mut config = AppConfig::default();
        config.backend.anon_key = "from-file".to_string();
        apply_env_overrides(&mut config, |k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.backend.url, "https://env.supabase.co");
        assert_eq!(config.ai.api_key, "real-key");
        // Blank variable leaves the file value alone
        assert_eq!(config.backend.anon_key, "from-file");
        assert_eq!(config.observability.log_level, "info");
    }

    #[test]
    fn test_validation_error_display_lists_every_error() {
        let err = ConfigError::Validation(vec![
            ValidationError::EmptyStoragePrefix,
            ValidationError::UnknownLogLevel("loud".into()),
        ]);
        let text = err.to_string();
        assert!(text.starts_with("Validation failed: "));
        assert!(text.contains("storage_prefix"));
        assert!(text.contains("loud"));
    }
}
