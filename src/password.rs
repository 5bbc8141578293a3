//! Password strength assessment.
//!
//! Two separate judgments over one password:
//!
//! - **Hard requirements** drive the `valid` flag. Every unmet requirement
//!   contributes an error; unlike generic field validation there is no
//!   short-circuit, because a user fixing a password needs the complete
//!   list at once.
//! - **Strength label** is a point score over six independent signals,
//!   mapped to [`Strength::Weak`], [`Strength::Medium`] or
//!   [`Strength::Strong`].
//!
//! The two are independent: a password can satisfy every hard requirement
//! and still be rated `Medium`.
//!
//! # Example
//!
//! ```
//! use formguard::password::{assess, Strength};
//! use formguard::config::PasswordPolicy;
//!
//! let report = assess("abc", &PasswordPolicy::default());
//! assert!(!report.valid);
//! assert_eq!(report.errors.len(), 3);
//! assert_eq!(report.strength, Strength::Weak);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::PasswordPolicy;

// =============================================================================
// STRENGTH
// =============================================================================

/// Categorical password strength label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strength {
    /// Score 0-2: trivially guessable.
    Weak,

    /// Score 3-4: acceptable but improvable.
    Medium,

    /// Score 5-6: all signals present.
    Strong,
}

impl Strength {
    /// Get all strength labels, weakest first.
    pub fn all() -> Vec<Self> {
        vec![Self::Weak, Self::Medium, Self::Strong]
    }

    /// Get a description of this label.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Weak => "Easily guessed; add length and character variety",
            Self::Medium => "Usable; more length or symbols would help",
            Self::Strong => "Good length and full character variety",
        }
    }
}

impl std::fmt::Display for Strength {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Weak => write!(f, "weak"),
            Self::Medium => write!(f, "medium"),
            Self::Strong => write!(f, "strong"),
        }
    }
}

impl std::str::FromStr for Strength {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "weak" => Ok(Self::Weak),
            "medium" => Ok(Self::Medium),
            "strong" => Ok(Self::Strong),
            _ => Err(crate::Error::Config(format!(
                "Unknown strength label: '{s}'. Valid: weak, medium, strong"
            ))),
        }
    }
}

// =============================================================================
// ASSESSMENT
// =============================================================================

/// The full result of assessing one password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordAssessment {
    /// Whether every hard requirement is met.
    pub valid: bool,

    /// One entry per unmet hard requirement, in policy order.
    pub errors: Vec<String>,

    /// Heuristic strength label, independent of `valid`.
    pub strength: Strength,
}

impl PasswordAssessment {
    /// Whether the password met every hard requirement.
    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Check a password against the policy's hard requirements and rate its
/// strength.
///
/// All requirements are checked; `errors` lists every failure, not just the
/// first.
pub fn assess(password: &str, policy: &PasswordPolicy) -> PasswordAssessment {
    let mut errors = Vec::new();

    if password.chars().count() < policy.min_length {
        errors.push(format!(
            "Password must be at least {} characters",
            policy.min_length
        ));
    }
    if policy.require_uppercase && !password.chars().any(|c| c.is_uppercase()) {
        errors.push("Password must contain an uppercase letter".to_string());
    }
    if policy.require_lowercase && !password.chars().any(|c| c.is_lowercase()) {
        errors.push("Password must contain a lowercase letter".to_string());
    }
    if policy.require_digit && !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain a digit".to_string());
    }
    if policy.require_symbol && !password.chars().any(is_symbol) {
        errors.push("Password must contain a symbol".to_string());
    }

    PasswordAssessment {
        valid: errors.is_empty(),
        errors,
        strength: strength_of(password),
    }
}

/// Rate a password over six independent signals: length at least 8, length
/// at least 12, lowercase, uppercase, digit, symbol. One point each;
/// 0-2 is weak, 3-4 medium, 5-6 strong.
pub fn strength_of(password: &str) -> Strength {
    let length = password.chars().count();
    let signals = [
        length >= 8,
        length >= 12,
        password.chars().any(|c| c.is_lowercase()),
        password.chars().any(|c| c.is_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(is_symbol),
    ];
    let score = signals.iter().filter(|&&s| s).count();

    match score {
        0..=2 => Strength::Weak,
        3..=4 => Strength::Medium,
        _ => Strength::Strong,
    }
}

/// Anything that is neither alphanumeric nor whitespace counts as a symbol.
fn is_symbol(c: char) -> bool {
    !c.is_alphanumeric() && !c.is_whitespace()
}
