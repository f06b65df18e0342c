//! AJ OS input guard library.
//!
//! Sanitizers for untrusted text, URLs and emails, a sliding-window rate
//! limiter for outbound calls, and the application configuration they are
//! tuned by.

pub mod config;
pub mod observability;
pub mod security;

pub use config::schema::AppConfig;
pub use security::rate_limit::{RateLimiter, SharedRateLimiter};
pub use security::sanitize::{sanitize_email, sanitize_object, sanitize_text, sanitize_url};
