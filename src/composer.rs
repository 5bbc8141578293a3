//! Rule composition and short-circuit evaluation.
//!
//! A [`Rule`] is a pure check from [`rules`](crate::rules) bound to its
//! parameters, optionally carrying a custom failure message that replaces the
//! default one. [`validate`] runs an ordered rule list against a single value
//! and returns the first failing result, so a field shows one error at a
//! time instead of a wall of simultaneous messages.
//!
//! Ordering is caller-controlled and deterministic: rules run in the order
//! given, and nothing after the first failure executes.
//!
//! # Example
//!
//! ```
//! use formguard::composer::{self, validate};
//!
//! let rules = [
//!     composer::required(),
//!     composer::min_length(3).message("Pick a longer username"),
//!     composer::alphanumeric(),
//! ];
//!
//! let result = validate("", &rules);
//! assert!(!result.valid);
//! // The required failure wins; min_length never ran.
//! assert_eq!(result.message.as_deref(), Some("This field is required"));
//! ```

use chrono::NaiveDate;
use regex::Regex;
use tracing::trace;

use crate::rules::{self, RuleResult};

type CheckFn = Box<dyn Fn(&str) -> RuleResult + Send + Sync>;

// =============================================================================
// RULE
// =============================================================================

/// A validation check bound to its parameters.
///
/// Built through the factory functions in this module ([`required`],
/// [`min_length`], [`pattern`], ...) or from any closure via [`Rule::custom`].
/// Rules hold no mutable state and may be reused across fields and calls.
pub struct Rule {
    name: &'static str,
    check: CheckFn,
    message: Option<String>,
}

impl Rule {
    /// Wrap an arbitrary check under the given name.
    pub fn custom(
        name: &'static str,
        check: impl Fn(&str) -> RuleResult + Send + Sync + 'static,
    ) -> Self {
        Self {
            name,
            check: Box::new(check),
            message: None,
        }
    }

    /// Replace the default failure message with a custom one.
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// The rule's name, for logging and debugging.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the check against a value.
    ///
    /// A failing result carries the custom message when one was set.
    pub fn apply(&self, value: &str) -> RuleResult {
        let result = (self.check)(value);
        if result.valid {
            return result;
        }
        match &self.message {
            Some(message) => RuleResult {
                message: Some(message.clone()),
                ..result
            },
            None => result,
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule")
            .field("name", &self.name)
            .field("message", &self.message)
            .finish()
    }
}

// =============================================================================
// VALIDATE
// =============================================================================

/// Evaluate `rules` in order against `value`.
///
/// Returns the first failing [`RuleResult`], or a passing result if all
/// checks succeed. An empty rule list passes.
pub fn validate(value: &str, rules: &[Rule]) -> RuleResult {
    for rule in rules {
        let result = rule.apply(value);
        if !result.valid {
            trace!(rule = rule.name(), "validation failed");
            return result;
        }
    }
    RuleResult::pass()
}

// =============================================================================
// FACTORIES
// =============================================================================

/// The value must be non-empty.
pub fn required() -> Rule {
    Rule::custom("required", rules::required)
}

/// The value must have at least `min` characters.
pub fn min_length(min: usize) -> Rule {
    Rule::custom("min_length", move |v| rules::min_length(v, min))
}

/// The value must have at most `max` characters.
pub fn max_length(max: usize) -> Rule {
    Rule::custom("max_length", move |v| rules::max_length(v, max))
}

/// The value must look like an email address.
pub fn email() -> Rule {
    Rule::custom("email", rules::email)
}

/// The value must be a 7 to 15 digit phone number.
pub fn phone() -> Rule {
    Rule::custom("phone", rules::phone)
}

/// The value must be a 7 to 10 digit identity number.
pub fn ci() -> Rule {
    Rule::custom("ci", rules::ci)
}

/// The value must parse as a number.
pub fn number() -> Rule {
    Rule::custom("number", rules::number)
}

/// The value must parse as a whole number.
pub fn integer() -> Rule {
    Rule::custom("integer", rules::integer)
}

/// The value must be a number within `[min, max]`.
pub fn range(min: f64, max: f64) -> Rule {
    Rule::custom("range", move |v| rules::range(v, min, max))
}

/// The value must be an ISO calendar date.
pub fn date() -> Rule {
    Rule::custom("date", rules::date)
}

/// The value must be a date on or after `bound`.
pub fn min_date(bound: NaiveDate) -> Rule {
    Rule::custom("min_date", move |v| rules::min_date(v, bound))
}

/// The value must be a date on or before `bound`.
pub fn max_date(bound: NaiveDate) -> Rule {
    Rule::custom("max_date", move |v| rules::max_date(v, bound))
}

/// The value must parse as an absolute URL.
pub fn url() -> Rule {
    Rule::custom("url", rules::url)
}

/// The value must match the given regex.
pub fn pattern(regex: Regex) -> Rule {
    Rule::custom("pattern", move |v| rules::pattern(v, &regex))
}

/// The value must equal `compare`.
pub fn matches(compare: impl Into<String>) -> Rule {
    let compare = compare.into();
    Rule::custom("matches", move |v| rules::matches(v, &compare))
}

/// The value must contain only letters and spaces.
pub fn alpha() -> Rule {
    Rule::custom("alpha", rules::alpha)
}

/// The value must contain only letters, digits and spaces.
pub fn alphanumeric() -> Rule {
    Rule::custom("alphanumeric", rules::alphanumeric)
}
