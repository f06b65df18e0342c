//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! sanitizers, rate limiters, config loader:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters through the `metrics` facade)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → whatever metrics recorder the host application installs
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event, never interpolated messages only
//! - No recorder is installed here; without one, metric calls are no-ops

pub mod logging;
pub mod metrics;
