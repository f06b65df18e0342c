//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for AJ OS.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Backend URL the client falls back to when none is configured.
pub const PLACEHOLDER_BACKEND_URL: &str = "https://placeholder.supabase.co";

/// AI key value used by sample environments.
pub const PLACEHOLDER_AI_KEY: &str = "dummy-key";

/// Root configuration for the application.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Application metadata.
    pub app: AppMetadata,

    /// Hosted backend credentials.
    pub backend: BackendConfig,

    /// Generative AI settings.
    pub ai: AiConfig,

    /// Feature switches that do not depend on credentials.
    pub features: FeatureConfig,

    /// Rate limiting and sync timing.
    pub rate_limits: RateLimitConfig,

    /// UI tuning values.
    pub ui: UiConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Application metadata.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AppMetadata {
    pub name: String,
    pub version: String,
    pub description: String,

    /// Default timezone for date operations.
    pub timezone: String,

    /// Prefix for local storage keys.
    pub storage_prefix: String,
}

impl Default for AppMetadata {
    fn default() -> Self {
        Self {
            name: "AJ OS".to_string(),
            version: "26".to_string(),
            description: "Personal Operating System for Productivity".to_string(),
            timezone: "America/Los_Angeles".to_string(),
            storage_prefix: "ajos_".to_string(),
        }
    }
}

/// Hosted backend credentials.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct BackendConfig {
    /// Project URL (e.g., "https://xyz.supabase.co").
    pub url: String,

    /// Public anon key. Row-level policies on the backend do the real gating.
    pub anon_key: String,
}

/// Generative AI settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AiConfig {
    /// API key. Empty disables AI insights.
    pub api_key: String,

    /// Model used for weekly reviews and insights.
    pub model: String,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
        }
    }
}

/// Feature switches.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct FeatureConfig {
    /// Local storage fallback when the backend is unavailable.
    pub offline_mode: bool,

    /// Verbose client-side logging.
    pub debug_mode: bool,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            offline_mode: true,
            debug_mode: false,
        }
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Maximum backend operations per minute.
    pub backend_ops_per_minute: u32,

    /// Background sync interval in milliseconds.
    pub sync_interval_ms: u64,

    /// Debounce delay for save operations in milliseconds.
    pub save_debounce_ms: u64,

    /// Maximum outbound API calls per window.
    pub api_max_requests: u32,

    /// Outbound API window in milliseconds.
    pub api_window_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            backend_ops_per_minute: 60,
            sync_interval_ms: 5 * 60 * 1000,
            save_debounce_ms: 500,
            api_max_requests: 30,
            api_window_ms: 60_000,
        }
    }
}

/// UI tuning values.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub animation_ms: u64,
    pub toast_ms: u64,

    /// Items shown in a list before paginating.
    pub max_list_items: usize,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            animation_ms: 300,
            toast_ms: 3000,
            max_list_items: 50,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON lines.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}
