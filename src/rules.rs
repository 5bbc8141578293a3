//! Field validation rules.
//!
//! A library of pure, stateless predicate functions. Each rule takes the
//! field value plus rule-specific parameters and returns a [`RuleResult`];
//! no rule panics or errors for malformed input. Absence, emptiness or an
//! unparseable value is itself a failing result, so call sites stay total.
//!
//! Values are form-field strings. The one exception is [`file`], which
//! checks a [`FileMeta`] against [`FileConstraints`] and is invoked directly
//! rather than through a rule list.
//!
//! Ordered rule lists with short-circuit evaluation live in
//! [`composer`](crate::composer); this module is the predicate layer it
//! dispatches to.
//!
//! # Example
//!
//! ```
//! use formguard::rules;
//!
//! assert!(rules::email("user@example.com").valid);
//! assert!(!rules::email("not-an-email").valid);
//!
//! let result = rules::min_length("ab", 3);
//! assert!(!result.valid);
//! assert!(result.message.is_some());
//! ```

use std::collections::HashMap;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// RULE RESULT
// =============================================================================

/// The outcome of a single validation check.
///
/// Invariant: `valid == false` implies `message` is present and non-empty.
/// The constructors enforce this; build results through them rather than with
/// struct literals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleResult {
    /// Whether the value passed the check.
    pub valid: bool,

    /// Human-readable failure message; present iff the check failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Optional rule-specific details (bounds, parsed values, matched parts).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<HashMap<String, Value>>,
}

impl RuleResult {
    /// Create a passing result.
    pub fn pass() -> Self {
        Self {
            valid: true,
            message: None,
            meta: None,
        }
    }

    /// Create a failing result with the given message.
    ///
    /// An empty message would break the result invariant, so it is replaced
    /// with a generic one.
    pub fn fail(message: impl Into<String>) -> Self {
        let message = message.into();
        let message = if message.is_empty() {
            "Invalid value".to_string()
        } else {
            message
        };
        Self {
            valid: false,
            message: Some(message),
            meta: None,
        }
    }

    /// Attach a metadata entry to this result.
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.meta
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Whether the check passed.
    pub fn is_valid(&self) -> bool {
        self.valid
    }

    /// The failure message, or an empty string for a passing result.
    pub fn message_or_default(&self) -> &str {
        self.message.as_deref().unwrap_or("")
    }
}

impl std::fmt::Display for RuleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.valid {
            write!(f, "valid")
        } else {
            write!(f, "invalid: {}", self.message_or_default())
        }
    }
}

// =============================================================================
// PATTERNS
// =============================================================================

/// Permissive email shape: one `@`, at least one `.` after it, no whitespace.
/// Deliberately not RFC-complete; deliverability is a server concern.
const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(EMAIL_PATTERN).expect("invalid email pattern"));

// =============================================================================
// PRESENCE & LENGTH
// =============================================================================

/// Fails iff the value is the empty string.
pub fn required(value: &str) -> RuleResult {
    if value.is_empty() {
        RuleResult::fail("This field is required")
    } else {
        RuleResult::pass()
    }
}

/// Fails if the value has fewer than `min` characters.
pub fn min_length(value: &str, min: usize) -> RuleResult {
    if value.chars().count() < min {
        RuleResult::fail(format!("Must be at least {min} characters"))
            .with_meta("min", min as u64)
    } else {
        RuleResult::pass()
    }
}

/// Fails if the value has more than `max` characters.
pub fn max_length(value: &str, max: usize) -> RuleResult {
    if value.chars().count() > max {
        RuleResult::fail(format!("Must be at most {max} characters"))
            .with_meta("max", max as u64)
    } else {
        RuleResult::pass()
    }
}

// =============================================================================
// FORMAT RULES
// =============================================================================

/// Permissive email check: one `@` with a `.` somewhere after it.
pub fn email(value: &str) -> RuleResult {
    if EMAIL_REGEX.is_match(value) {
        RuleResult::pass()
    } else {
        RuleResult::fail("Enter a valid email address")
    }
}

/// Strip whitespace, hyphens and parentheses, then require 7 to 15 digits.
pub fn phone(value: &str) -> RuleResult {
    match digits_only(value) {
        Some(digits) if (7..=15).contains(&digits.len()) => RuleResult::pass(),
        _ => RuleResult::fail("Enter a valid phone number"),
    }
}

/// Identity-card number: like [`phone`] but 7 to 10 digits.
pub fn ci(value: &str) -> RuleResult {
    match digits_only(value) {
        Some(digits) if (7..=10).contains(&digits.len()) => RuleResult::pass(),
        _ => RuleResult::fail("Enter a valid identity number"),
    }
}

/// Remove separator characters and return the digit string, or `None` if any
/// non-separator, non-digit character remains.
fn digits_only(value: &str) -> Option<String> {
    let mut digits = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '0'..='9' => digits.push(c),
            ' ' | '\t' | '-' | '(' | ')' => {}
            _ => return None,
        }
    }
    if digits.is_empty() {
        None
    } else {
        Some(digits)
    }
}

/// Fails unless the value parses as a finite number.
pub fn number(value: &str) -> RuleResult {
    match parse_number(value) {
        Some(_) => RuleResult::pass(),
        None => RuleResult::fail("Enter a valid number"),
    }
}

/// Fails unless the value parses as a number with no fractional part.
pub fn integer(value: &str) -> RuleResult {
    match parse_number(value) {
        Some(n) if n.fract() == 0.0 => RuleResult::pass(),
        _ => RuleResult::fail("Enter a whole number"),
    }
}

/// Numeric parse then inclusive-bound check.
pub fn range(value: &str, min: f64, max: f64) -> RuleResult {
    match parse_number(value) {
        Some(n) if n >= min && n <= max => RuleResult::pass(),
        Some(_) => RuleResult::fail(format!("Must be between {min} and {max}"))
            .with_meta("min", min)
            .with_meta("max", max),
        None => RuleResult::fail("Enter a valid number"),
    }
}

fn parse_number(value: &str) -> Option<f64> {
    value.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

// =============================================================================
// DATE RULES
// =============================================================================

/// Fails unless the value coerces to a calendar date (ISO `YYYY-MM-DD`, the
/// shape date inputs produce).
pub fn date(value: &str) -> RuleResult {
    match parse_date(value) {
        Some(_) => RuleResult::pass(),
        None => RuleResult::fail("Enter a valid date"),
    }
}

/// Fails if the value is an invalid date or earlier than `bound`.
pub fn min_date(value: &str, bound: NaiveDate) -> RuleResult {
    match parse_date(value) {
        Some(d) if d >= bound => RuleResult::pass(),
        Some(_) => RuleResult::fail(format!("Date must be on or after {bound}")),
        None => RuleResult::fail("Enter a valid date"),
    }
}

/// Fails if the value is an invalid date or later than `bound`.
pub fn max_date(value: &str, bound: NaiveDate) -> RuleResult {
    match parse_date(value) {
        Some(d) if d <= bound => RuleResult::pass(),
        Some(_) => RuleResult::fail(format!("Date must be on or before {bound}")),
        None => RuleResult::fail("Enter a valid date"),
    }
}

fn parse_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").ok()
}

// =============================================================================
// URL, PATTERN, EQUALITY
// =============================================================================

/// Fails unless the string parses as a well-formed absolute URL.
pub fn url(value: &str) -> RuleResult {
    match url::Url::parse(value.trim()) {
        Ok(_) => RuleResult::pass(),
        Err(_) => RuleResult::fail("Enter a valid URL"),
    }
}

/// Fails unless the custom regex matches the value.
pub fn pattern(value: &str, regex: &Regex) -> RuleResult {
    if regex.is_match(value) {
        RuleResult::pass()
    } else {
        RuleResult::fail("Invalid format")
    }
}

/// Equality check, for confirm-password fields.
pub fn matches(value: &str, compare: &str) -> RuleResult {
    if value == compare {
        RuleResult::pass()
    } else {
        RuleResult::fail("Values do not match")
    }
}

// =============================================================================
// CHARACTER-CLASS RULES
// =============================================================================

/// Unicode-aware letters-only check, spaces permitted. Empty fails.
pub fn alpha(value: &str) -> RuleResult {
    if !value.is_empty() && value.chars().all(|c| c.is_alphabetic() || c == ' ') {
        RuleResult::pass()
    } else {
        RuleResult::fail("Only letters are allowed")
    }
}

/// Unicode-aware letters-and-digits check, spaces permitted. Empty fails.
pub fn alphanumeric(value: &str) -> RuleResult {
    if !value.is_empty() && value.chars().all(|c| c.is_alphanumeric() || c == ' ') {
        RuleResult::pass()
    } else {
        RuleResult::fail("Only letters and numbers are allowed")
    }
}

// =============================================================================
// FILE RULE
// =============================================================================

/// Name and size of a candidate upload, as reported by the form layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileMeta {
    /// File name including extension.
    pub name: String,

    /// Size in bytes.
    pub size: u64,
}

impl FileMeta {
    /// Create a new file descriptor.
    pub fn new(name: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
        }
    }

    /// Lowercased text after the final `.`, or `None` when there is no
    /// extension.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_lowercase())
    }
}

/// Constraints applied by the [`file`] rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileConstraints {
    /// Maximum size in bytes.
    pub max_size: u64,

    /// Allowed extensions, lowercase, without the dot.
    pub allowed_types: Vec<String>,
}

impl Default for FileConstraints {
    fn default() -> Self {
        Self {
            max_size: 5 * 1024 * 1024,
            allowed_types: vec![
                "jpg".into(),
                "jpeg".into(),
                "png".into(),
                "pdf".into(),
            ],
        }
    }
}

impl FileConstraints {
    /// Create constraints with the given size cap and extension whitelist.
    pub fn new(max_size: u64, allowed_types: Vec<String>) -> Self {
        Self {
            max_size,
            allowed_types,
        }
    }

    fn allows_extension(&self, ext: &str) -> bool {
        self.allowed_types.iter().any(|t| t.eq_ignore_ascii_case(ext))
    }
}

/// Fails if the file is absent, exceeds `max_size` bytes, or its extension
/// (case-insensitive, text after the final `.`) is not allowed.
pub fn file(file: Option<&FileMeta>, constraints: &FileConstraints) -> RuleResult {
    let Some(file) = file else {
        return RuleResult::fail("Select a file");
    };

    if file.size > constraints.max_size {
        let max_mb = constraints.max_size as f64 / (1024.0 * 1024.0);
        return RuleResult::fail(format!("File must not exceed {max_mb:.1} MB"))
            .with_meta("max_size", constraints.max_size);
    }

    match file.extension() {
        Some(ext) if constraints.allows_extension(&ext) => RuleResult::pass(),
        _ => RuleResult::fail(format!(
            "Allowed file types: {}",
            constraints.allowed_types.join(", ")
        )),
    }
}
