//! CSRF token retrieval and format validation.
//!
//! Token issuance is server-owned and out of scope; the API layer attaches
//! the token to every mutating request. This module only answers two
//! questions: where is the token, and does it look like one. A token is
//! sourced from the injected store (under [`STORAGE_KEY`]) or passed in
//! directly from page metadata.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::rules::RuleResult;
use crate::storage::KeyValueStore;

/// Storage key the token is expected under.
pub const STORAGE_KEY: &str = "csrf_token";

/// Minimum plausible token length.
pub const MIN_TOKEN_LENGTH: usize = 16;

/// Maximum plausible token length.
pub const MAX_TOKEN_LENGTH: usize = 256;

/// Base64 and URL-safe token alphabet.
const TOKEN_PATTERN: &str = r"^[A-Za-z0-9+/=_-]+$";

static TOKEN_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(TOKEN_PATTERN).expect("invalid token pattern"));

/// Read the token from the store, if present and non-empty.
pub fn token_from_store(store: &impl KeyValueStore) -> Option<String> {
    store.get(STORAGE_KEY).filter(|t| !t.is_empty())
}

/// Whether the string has a plausible token shape: bounded length, base64 or
/// URL-safe alphabet.
pub fn is_valid_token(token: &str) -> bool {
    (MIN_TOKEN_LENGTH..=MAX_TOKEN_LENGTH).contains(&token.len()) && TOKEN_REGEX.is_match(token)
}

/// Validate presence and format, surfacing the outcome through the same
/// result type form code already handles.
pub fn validate_token(token: Option<&str>) -> RuleResult {
    match token {
        None => RuleResult::fail("Security token missing; reload the page"),
        Some(t) if is_valid_token(t) => RuleResult::pass(),
        Some(_) => RuleResult::fail("Security token malformed; reload the page"),
    }
}
