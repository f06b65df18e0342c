//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! User-entered record:
//!     → sanitize.rs (text / url / email per field)
//!     → persistence layer
//!
//! Outbound API or backend call:
//!     → rate_limit.rs (sliding-window admission)
//!     → call, or skip when denied
//! ```
//!
//! # Design Decisions
//! - Sanitizers never fail; rejection is an empty value or a tagged verdict
//! - Limiters are owned and injected, never global
//! - No trust in client input

pub mod ids;
pub mod rate_limit;
pub mod sanitize;

pub use ids::{generate_secure_id, is_valid_uuid, mask_sensitive};
pub use rate_limit::{Admission, RateLimitError, RateLimiter, SharedRateLimiter};
pub use sanitize::{RejectReason, Verdict};
