//! Derived configuration state: which integrations are usable, and a
//! printable status report with credentials masked.

use std::time::Duration;

use serde::Serialize;

use crate::config::schema::{AppConfig, PLACEHOLDER_AI_KEY, PLACEHOLDER_BACKEND_URL};
use crate::security::ids::mask_sensitive;
use crate::security::rate_limit::RateLimiter;

/// Effective feature flags after credential checks.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EffectiveFeatures {
    pub ai_insights: bool,
    pub backend_sync: bool,
    pub offline_mode: bool,
    pub debug_mode: bool,
}

/// Configuration report for operators.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigStatus {
    pub app: String,
    pub version: String,
    pub backend: &'static str,
    pub ai: &'static str,
    pub backend_url: String,
    pub backend_anon_key: String,
    pub ai_api_key: String,
    pub features: EffectiveFeatures,
}

fn label(configured: bool) -> &'static str {
    if configured {
        "configured"
    } else {
        "not configured"
    }
}

impl AppConfig {
    /// Backend has real credentials (not the placeholder project).
    pub fn is_backend_configured(&self) -> bool {
        !self.backend.url.is_empty()
            && !self.backend.anon_key.is_empty()
            && self.backend.url != PLACEHOLDER_BACKEND_URL
    }

    /// AI has a real API key.
    pub fn is_ai_configured(&self) -> bool {
        !self.ai.api_key.is_empty() && self.ai.api_key != PLACEHOLDER_AI_KEY
    }

    pub fn features(&self) -> EffectiveFeatures {
        EffectiveFeatures {
            ai_insights: self.is_ai_configured(),
            backend_sync: self.is_backend_configured(),
            offline_mode: self.features.offline_mode,
            debug_mode: self.features.debug_mode,
        }
    }

    pub fn status(&self) -> ConfigStatus {
        ConfigStatus {
            app: self.app.name.clone(),
            version: self.app.version.clone(),
            backend: label(self.is_backend_configured()),
            ai: label(self.is_ai_configured()),
            backend_url: self.backend.url.clone(),
            backend_anon_key: mask_sensitive(&self.backend.anon_key, 4),
            ai_api_key: mask_sensitive(&self.ai.api_key, 4),
            features: self.features(),
        }
    }

    /// Limiter for outbound API calls (AI reviews and similar).
    pub fn api_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(
            self.rate_limits.api_max_requests,
            Duration::from_millis(self.rate_limits.api_window_ms),
        )
        .named("api")
    }

    /// Limiter for backend operations, one-minute window.
    pub fn backend_rate_limiter(&self) -> RateLimiter {
        RateLimiter::new(self.rate_limits.backend_ops_per_minute, Duration::from_secs(60))
            .named("backend")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholder_backend_is_not_configured() {
        let mut config = AppConfig::default();
        assert!(!config.is_backend_configured());

        config.backend.url = PLACEHOLDER_BACKEND_URL.to_string();
        config.backend.anon_key = "anon".to_string();
        assert!(!config.is_backend_configured());

        config.backend.url = "https://abc.supabase.co".to_string();
        assert!(config.is_backend_configured());
        assert!(config.features().backend_sync);
    }

    #[test]
    fn test_dummy_ai_key_is_not_configured() {
        let mut config = AppConfig::default();
        config.ai.api_key = PLACEHOLDER_AI_KEY.to_string();
        assert!(!config.is_ai_configured());

        config.ai.api_key = "AIzaSyExampleKey".to_string();
        assert!(config.is_ai_configured());
    }

    #[test]
    fn test_status_masks_credentials() {
        let mut config = AppConfig::default();
        config.backend.url = "https://abc.supabase.co".to_string();
        config.backend.anon_key = "eyJhbGciOiJIUzI1NiJ9".to_string();

        let status = config.status();
        assert_eq!(status.backend, "configured");
        assert_eq!(status.ai, "not configured");
        assert_eq!(status.backend_anon_key, "eyJh***NiJ9");
        assert_eq!(status.ai_api_key, "***");
    }

    #[test]
    fn test_limiters_follow_rate_limit_section() {
        let mut config = AppConfig::default();
        config.rate_limits.api_max_requests = 3;
        let mut limiter = config.api_rate_limiter();
        assert_eq!(limiter.remaining_requests(), 3);
        assert_eq!(limiter.window(), Duration::from_millis(60_000));

        let mut backend = config.backend_rate_limiter();
        assert_eq!(backend.remaining_requests(), 60);
    }
}
