//! # formguard
//!
//! Client-side input validation and defensive sanitization for a web
//! application's forms and API calls.
//!
//! ## Overview
//!
//! The crate is a library of small, composable pieces a form handler or API
//! wrapper calls before anything leaves the page:
//!
//! - **Rules** ([`rules`], [`composer`]): pure predicates composed into
//!   ordered, fail-fast rule lists per field.
//! - **Sanitization** ([`sanitizer`]): HTML escaping, pattern-based XSS
//!   detection and cleaning, URL sanitization.
//! - **Passwords** ([`password`], [`credentials`]): strength assessment with
//!   complete error reporting, and a convenience generator.
//! - **Rate limiting** ([`rate_limit`]): a sliding-window attempt counter
//!   over injected key/value storage.
//! - **CSRF** ([`csrf`]): token retrieval and format validation; issuance is
//!   server-owned.
//!
//! Server-side validation remains authoritative; everything here is a
//! first line of defense and user-experience layer, not a security boundary.
//!
//! ## Architecture
//!
//! ```text
//! form handler / API wrapper
//!     |
//!     |  per field                before submit           before render
//!     v                           v                       v
//! +-----------+             +-------------+         +-----------+
//! | composer  |             | rate_limit  |         | sanitizer |
//! | validate  |             | check       |         | clean_xss |
//! +-----------+             +-------------+         +-----------+
//!     |                           |
//!     v                           v
//! +-----------+             +-----------+
//! |   rules   |             |  storage  |  <-- injected KeyValueStore
//! +-----------+             +-----------+
//! ```
//!
//! ## Error Model
//!
//! Expected failures are values, not errors: a failed check is a
//! [`RuleResult`] with a message, a rate-limit rejection is `false`, a bad
//! URL is `None`. The [`Error`] type covers ambient concerns only (storage
//! I/O, serialization, configuration).
//!
//! ## Quick Start
//!
//! ```
//! use formguard::composer::{self, validate};
//! use formguard::rate_limit::RateLimiter;
//! use formguard::sanitizer::Sanitizer;
//! use formguard::storage::MemoryStore;
//!
//! let email_rules = [composer::required(), composer::email()];
//! assert!(validate("user@example.com", &email_rules).valid);
//!
//! let sanitizer = Sanitizer::new();
//! let safe = sanitizer.sanitize_input("  <b>bio</b>  ");
//! assert_eq!(safe, "&lt;b&gt;bio&lt;/b&gt;");
//!
//! let mut limiter = RateLimiter::new(MemoryStore::new());
//! assert!(limiter.check("login"));
//! ```

pub mod composer;
pub mod config;
pub mod credentials;
pub mod csrf;
pub mod error;
pub mod logging;
pub mod password;
pub mod rate_limit;
pub mod rules;
pub mod sanitizer;
pub mod storage;

// Re-exports for convenient access
pub use composer::{validate, Rule};
pub use config::{GuardConfig, PasswordPolicy};
pub use credentials::{deobfuscate, generate_password, obfuscate, simple_hash, verify_integrity};
pub use error::{Error, Result};
pub use password::{assess, strength_of, PasswordAssessment, Strength};
pub use rate_limit::{Clock, RateLimiter, SystemClock};
pub use rules::{FileConstraints, FileMeta, RuleResult};
pub use sanitizer::{escape_html, Sanitizer};
pub use storage::{JsonFileStore, KeyValueStore, MemoryStore};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name.
pub const NAME: &str = env!("CARGO_PKG_NAME");
