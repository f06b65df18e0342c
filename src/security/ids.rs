//! Record identifiers and log-safe masking.

use std::sync::OnceLock;

use regex::Regex;
use uuid::Uuid;

fn uuid_pattern() -> &'static Regex {
    static UUID: OnceLock<Regex> = OnceLock::new();
    UUID.get_or_init(|| {
        Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
            .expect("uuid pattern compiles")
    })
}

/// Hyphenated RFC 4122 UUID, versions 1 through 5, either case.
pub fn is_valid_uuid(id: &str) -> bool {
    uuid_pattern().is_match(id)
}

/// Random v4 UUID for new records.
pub fn generate_secure_id() -> String {
    Uuid::new_v4().to_string()
}

/// Keep `visible` characters at each end and hide the middle.
///
/// Values too short to hide anything give `"***"`. A `visible` of zero
/// also gives `"***"` and deliberately hides the whole value, rather than
/// echoing it after the mask the way the web client's helper does.
pub fn mask_sensitive(data: &str, visible: usize) -> String {
    let len = data.chars().count();
    if visible == 0 || len <= visible {
        return "***".to_string();
    }

    let head: String = data.chars().take(visible).collect();
    let tail: String = data.chars().skip(len - visible).collect();
    format!("{head}***{tail}")
}
