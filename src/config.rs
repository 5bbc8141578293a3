//! Policy configuration.
//!
//! Central defaults for the password analyzer and the rate limiter, with
//! `strict()` and `permissive()` presets alongside `Default`. Values
//! round-trip through serde so deployments can ship policy as JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Hard requirements enforced by the password analyzer.
///
/// These drive the `valid` flag of an assessment. The strength label is a
/// separate heuristic and does not read this policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasswordPolicy {
    /// Minimum password length.
    pub min_length: usize,

    /// Require at least one uppercase letter.
    pub require_uppercase: bool,

    /// Require at least one lowercase letter.
    pub require_lowercase: bool,

    /// Require at least one digit.
    pub require_digit: bool,

    /// Require at least one symbol.
    pub require_symbol: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: false,
        }
    }
}

impl PasswordPolicy {
    /// High-security preset: longer minimum, all character classes required.
    pub fn strict() -> Self {
        Self {
            min_length: 12,
            require_uppercase: true,
            require_lowercase: true,
            require_digit: true,
            require_symbol: true,
        }
    }

    /// Low-friction preset: length only.
    pub fn permissive() -> Self {
        Self {
            min_length: 6,
            require_uppercase: false,
            require_lowercase: false,
            require_digit: false,
            require_symbol: false,
        }
    }

    /// Reject a policy no password could satisfy.
    pub fn validate(&self) -> Result<()> {
        if self.min_length == 0 {
            return Err(Error::ConfigInvalidValue {
                key: "min_length".into(),
                details: "must be at least 1".into(),
            });
        }
        Ok(())
    }
}

/// Top-level guard configuration: password policy plus rate-limit defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Password hard requirements.
    pub password: PasswordPolicy,

    /// Maximum attempts per rate-limit window.
    pub rate_limit_attempts: usize,

    /// Rate-limit window in milliseconds.
    pub rate_limit_window_ms: i64,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            password: PasswordPolicy::default(),
            rate_limit_attempts: crate::rate_limit::DEFAULT_LIMIT,
            rate_limit_window_ms: crate::rate_limit::DEFAULT_WINDOW_MS,
        }
    }
}

impl GuardConfig {
    /// High-security preset.
    pub fn strict() -> Self {
        Self {
            password: PasswordPolicy::strict(),
            rate_limit_attempts: 3,
            rate_limit_window_ms: 5 * 60 * 1000,
        }
    }

    /// Low-friction preset.
    pub fn permissive() -> Self {
        Self {
            password: PasswordPolicy::permissive(),
            rate_limit_attempts: 20,
            rate_limit_window_ms: 30 * 1000,
        }
    }

    /// Check internal consistency.
    pub fn validate(&self) -> Result<()> {
        self.password.validate()?;
        if self.rate_limit_attempts == 0 {
            return Err(Error::ConfigInvalidValue {
                key: "rate_limit_attempts".into(),
                details: "must be at least 1".into(),
            });
        }
        if self.rate_limit_window_ms <= 0 {
            return Err(Error::ConfigInvalidValue {
                key: "rate_limit_window_ms".into(),
                details: "must be positive".into(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_password_policy_default() {
        let policy = PasswordPolicy::default();
        assert_eq!(policy.min_length, 8);
        assert!(policy.require_uppercase);
        assert!(policy.require_lowercase);
        assert!(policy.require_digit);
        assert!(!policy.require_symbol);
    }

    #[test]
    fn test_password_policy_presets() {
        assert_eq!(PasswordPolicy::strict().min_length, 12);
        assert!(PasswordPolicy::strict().require_symbol);
        assert!(!PasswordPolicy::permissive().require_digit);
    }

    #[test]
    fn test_password_policy_validate() {
        assert!(PasswordPolicy::default().validate().is_ok());
        let bad = PasswordPolicy {
            min_length: 0,
            ..PasswordPolicy::default()
        };
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_guard_config_default_matches_rate_limit_defaults() {
        let config = GuardConfig::default();
        assert_eq!(config.rate_limit_attempts, 5);
        assert_eq!(config.rate_limit_window_ms, 60_000);
    }

    #[test]
    fn test_guard_config_validate() {
        assert!(GuardConfig::default().validate().is_ok());
        assert!(GuardConfig::strict().validate().is_ok());

        let mut bad = GuardConfig::default();
        bad.rate_limit_window_ms = 0;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn test_guard_config_serde_round_trip() {
        let config = GuardConfig::strict();
        let json = serde_json::to_string(&config).unwrap();
        let back: GuardConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, back);
    }
}
