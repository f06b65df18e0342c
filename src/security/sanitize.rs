//! Input sanitization for user-entered fields.
//!
//! Every sanitizer is total: invalid input degrades to an empty string
//! instead of an error. The `check_*` functions expose the same decisions
//! as a tagged [`Verdict`] for callers that need to tell "rejected" apart
//! from "valid but empty".

use std::sync::OnceLock;

use regex::Regex;
use serde::Serialize;
use serde_json::{Map, Value};
use unicode_normalization::UnicodeNormalization;
use url::Url;

use crate::observability::metrics;

/// Maximum length of sanitized free text, in characters.
pub const MAX_TEXT_LEN: usize = 10_000;

/// URL schemes that survive sanitization.
pub const ALLOWED_SCHEMES: [&str; 3] = ["http", "https", "mailto"];

/// Anything a sanitizer can be handed. Non-string values read as absent.
pub trait RawInput {
    fn raw(&self) -> Option<&str>;
}

impl RawInput for str {
    fn raw(&self) -> Option<&str> {
        Some(self)
    }
}

impl RawInput for String {
    fn raw(&self) -> Option<&str> {
        Some(self.as_str())
    }
}

impl<T: RawInput + ?Sized> RawInput for &T {
    fn raw(&self) -> Option<&str> {
        (**self).raw()
    }
}

impl<T: RawInput> RawInput for Option<T> {
    fn raw(&self) -> Option<&str> {
        self.as_ref().and_then(RawInput::raw)
    }
}

impl RawInput for Value {
    fn raw(&self) -> Option<&str> {
        self.as_str()
    }
}

/// Why an input was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RejectReason {
    /// Absent, non-string, or empty after normalization.
    Empty,
    /// Parsed as a URL with a scheme outside the allow-list.
    DisallowedScheme(String),
    /// Not parseable as a URL even with `https://` prefixed.
    Malformed,
    /// Relative path with traversal, backslashes, control characters or a
    /// protocol-relative `//` prefix.
    UnsafeRelativePath,
    /// Does not have the `local@domain.tld` shape.
    InvalidEmail,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RejectReason::Empty => "empty",
            RejectReason::DisallowedScheme(_) => "disallowed_scheme",
            RejectReason::Malformed => "malformed",
            RejectReason::UnsafeRelativePath => "unsafe_relative_path",
            RejectReason::InvalidEmail => "invalid_email",
        }
    }
}

/// Outcome of a sanitizer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "verdict", content = "value", rename_all = "snake_case")]
pub enum Verdict {
    Valid(String),
    Rejected(RejectReason),
}

impl Verdict {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verdict::Valid(_))
    }

    /// Collapse to the string contract: rejection becomes `""`.
    pub fn into_string(self) -> String {
        match self {
            Verdict::Valid(value) => value,
            Verdict::Rejected(_) => String::new(),
        }
    }

    /// The sanitized value, or `None` when rejected.
    pub fn ok(self) -> Option<String> {
        match self {
            Verdict::Valid(value) => Some(value),
            Verdict::Rejected(_) => None,
        }
    }
}

fn reject(kind: &'static str, reason: RejectReason) -> Verdict {
    tracing::debug!(kind, reason = reason.as_str(), "Input rejected");
    metrics::record_input_rejected(kind, reason.as_str());
    Verdict::Rejected(reason)
}

/// Whitespace plus the byte-order mark, which `char::is_whitespace` excludes.
fn is_blank(c: char) -> bool {
    c.is_whitespace() || c == '\u{FEFF}'
}

fn trim_blank(s: &str) -> &str {
    s.trim_matches(is_blank)
}

fn email_pattern() -> &'static Regex {
    static EMAIL: OnceLock<Regex> = OnceLock::new();
    EMAIL.get_or_init(|| {
        Regex::new(r"^[^\s\x{FEFF}@]+@[^\s\x{FEFF}@]+\.[^\s\x{FEFF}@]+$")
            .expect("email pattern compiles")
    })
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// Strip null bytes, NFKC-normalize, trim, and truncate to [`MAX_TEXT_LEN`].
pub fn check_text<I: RawInput + ?Sized>(input: &I) -> Verdict {
    let Some(raw) = input.raw().filter(|s| !s.is_empty()) else {
        return Verdict::Rejected(RejectReason::Empty);
    };

    let normalized: String = raw.chars().filter(|&c| c != '\0').nfkc().collect();
    let text: String = trim_blank(&normalized).chars().take(MAX_TEXT_LEN).collect();

    if text.is_empty() {
        Verdict::Rejected(RejectReason::Empty)
    } else {
        Verdict::Valid(text)
    }
}

/// See [`check_text`]. Never fails; absent input gives `""`.
pub fn sanitize_text<I: RawInput + ?Sized>(input: &I) -> String {
    check_text(input).into_string()
}

// ---------------------------------------------------------------------------
// URLs
// ---------------------------------------------------------------------------

fn allowed(url: &Url) -> bool {
    ALLOWED_SCHEMES.contains(&url.scheme())
}

/// Relative paths skip URL parsing, so they are screened here instead.
fn is_safe_relative_path(path: &str) -> bool {
    if path.starts_with("//") || path.contains('\\') || path.chars().any(char::is_control) {
        return false;
    }

    let path_only = path.split(['?', '#']).next().unwrap_or_default();
    !path_only.split('/').any(|segment| {
        let segment = segment.to_ascii_lowercase();
        matches!(segment.as_str(), ".." | "%2e%2e" | ".%2e" | "%2e.")
    })
}

/// Validate a URL or relative path.
///
/// Absolute URLs must use an allowed scheme and come back canonicalized.
/// Paths starting with `/` or `./` pass unchanged if they are safe.
/// Scheme-less input is retried as `https://`.
pub fn check_url<I: RawInput + ?Sized>(input: &I) -> Verdict {
    let Some(trimmed) = input.raw().map(trim_blank).filter(|s| !s.is_empty()) else {
        return Verdict::Rejected(RejectReason::Empty);
    };

    if let Ok(url) = Url::parse(trimmed) {
        if allowed(&url) {
            return Verdict::Valid(url.into());
        }
        return reject("url", RejectReason::DisallowedScheme(url.scheme().to_string()));
    }

    if trimmed.starts_with('/') || trimmed.starts_with("./") {
        if is_safe_relative_path(trimmed) {
            return Verdict::Valid(trimmed.to_string());
        }
        return reject("url", RejectReason::UnsafeRelativePath);
    }

    if !trimmed.contains("://") {
        if let Ok(url) = Url::parse(&format!("https://{trimmed}")) {
            return Verdict::Valid(url.into());
        }
    }

    reject("url", RejectReason::Malformed)
}

/// See [`check_url`]. Rejection gives `""`, which callers treat as "discard".
pub fn sanitize_url<I: RawInput + ?Sized>(input: &I) -> String {
    check_url(input).into_string()
}

// ---------------------------------------------------------------------------
// Emails
// ---------------------------------------------------------------------------

/// Trim, lowercase, and require a `local@domain.tld` shape.
pub fn check_email<I: RawInput + ?Sized>(input: &I) -> Verdict {
    let Some(trimmed) = input.raw().map(trim_blank).filter(|s| !s.is_empty()) else {
        return Verdict::Rejected(RejectReason::Empty);
    };

    let lowered = trimmed.to_lowercase();
    if email_pattern().is_match(&lowered) {
        Verdict::Valid(lowered)
    } else {
        reject("email", RejectReason::InvalidEmail)
    }
}

/// See [`check_email`]. Rejection gives `""`.
pub fn sanitize_email<I: RawInput + ?Sized>(input: &I) -> String {
    check_email(input).into_string()
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Sanitize every string field of a record.
///
/// Fields named in `url_fields` go through [`sanitize_url`], fields in
/// `email_fields` through [`sanitize_email`], everything else through
/// [`sanitize_text`]. Non-string values are copied as they are.
pub fn sanitize_object<S: AsRef<str>>(
    record: &Map<String, Value>,
    url_fields: &[S],
    email_fields: &[S],
) -> Map<String, Value> {
    let listed = |fields: &[S], key: &str| fields.iter().any(|f| f.as_ref() == key);

    record
        .iter()
        .map(|(key, value)| {
            let cleaned = match value {
                Value::String(s) if listed(url_fields, key) => Value::String(sanitize_url(s)),
                Value::String(s) if listed(email_fields, key) => Value::String(sanitize_email(s)),
                Value::String(s) => Value::String(sanitize_text(s)),
                other => other.clone(),
            };
            (key.clone(), cleaned)
        })
        .collect()
}
