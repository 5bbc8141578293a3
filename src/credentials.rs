//! Credential convenience utilities.
//!
//! Deliberately weak helpers, kept clearly labeled as such:
//!
//! - [`generate_password`] is a convenience generator for suggested
//!   passwords, not a secret-generation primitive; it uses a fast RNG, not
//!   an audited CSPRNG.
//! - [`simple_hash`] is a 32-bit rolling hash for casual tamper-evidence of
//!   locally held data. It is collision-prone and trivially forgeable; never
//!   use it for authentication or integrity across a trust boundary.
//! - [`obfuscate`] / [`deobfuscate`] are a reversible XOR pair for keeping
//!   casual eyes off locally cached values. Obfuscation, not encryption; the
//!   key ships with the client.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;

use crate::error::Result;

/// Lowercase alphabet for generated passwords.
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";

/// Uppercase alphabet for generated passwords.
pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Digit alphabet for generated passwords.
pub const DIGITS: &str = "0123456789";

/// Symbol alphabet for generated passwords.
pub const SYMBOLS: &str = "!@#$%^&*()_+-=[]{}|;:,.<>?";

/// Default generated password length.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

// =============================================================================
// PASSWORD GENERATION
// =============================================================================

/// Generate a password of the given length using the thread-local RNG.
///
/// See [`generate_password_with`] for the guarantees.
pub fn generate_password(length: usize) -> String {
    generate_password_with(&mut rand::thread_rng(), length)
}

/// Generate a password of the given length from the provided RNG.
///
/// The result always contains at least one lowercase letter, one uppercase
/// letter, one digit and one symbol: one pick per class is seeded up front,
/// the rest is drawn uniformly from the combined alphabet, and the whole
/// sequence is shuffled with a uniform Fisher-Yates pass. Lengths under 4
/// are raised to 4 so every class fits.
pub fn generate_password_with<R: Rng + ?Sized>(rng: &mut R, length: usize) -> String {
    let length = length.max(4);
    let classes = [LOWERCASE, UPPERCASE, DIGITS, SYMBOLS];

    let mut chars: Vec<char> = classes.iter().map(|class| pick(rng, class)).collect();

    let combined: Vec<char> = classes.concat().chars().collect();
    while chars.len() < length {
        chars.push(combined[rng.gen_range(0..combined.len())]);
    }

    chars.shuffle(rng);
    chars.into_iter().collect()
}

/// Uniform pick from an ASCII alphabet.
fn pick<R: Rng + ?Sized>(rng: &mut R, alphabet: &str) -> char {
    let bytes = alphabet.as_bytes();
    bytes[rng.gen_range(0..bytes.len())] as char
}

// =============================================================================
// INTEGRITY HASH
// =============================================================================

/// 32-bit rolling hash over the string's UTF-16 code units.
///
/// Multiply-shift form (`h = h * 31 + unit`, wrapping), matching the classic
/// string-hash construction. Non-cryptographic.
pub fn simple_hash(input: &str) -> i32 {
    let mut hash: i32 = 0;
    for unit in input.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    hash
}

/// Hash the JSON serialization of any serializable value.
pub fn hash_value<T: Serialize>(data: &T) -> Result<i32> {
    let json = serde_json::to_string(data)?;
    Ok(simple_hash(&json))
}

/// Check whether `data` still hashes to `expected`.
///
/// Unserializable data verifies as `false` rather than erroring; a value
/// that cannot be hashed cannot match.
pub fn verify_integrity<T: Serialize>(data: &T, expected: i32) -> bool {
    hash_value(data).map(|h| h == expected).unwrap_or(false)
}

// =============================================================================
// OBFUSCATION
// =============================================================================

/// Key used when the caller passes an empty one.
const DEFAULT_OBFUSCATION_KEY: &str = "formguard";

/// XOR the input against a cycling key and hex-encode the result.
///
/// Reversible via [`deobfuscate`] with the same key. This hides values from
/// casual inspection only; anyone with the client has the key.
pub fn obfuscate(input: &str, key: &str) -> String {
    let key = effective_key(key);
    let mut encoded = String::with_capacity(input.len() * 2);
    for (b, k) in input.bytes().zip(key.bytes().cycle()) {
        encoded.push_str(&format!("{:02x}", b ^ k));
    }
    encoded
}

/// Reverse [`obfuscate`]. Returns `None` for input that is not valid
/// hex-encoded output for this key.
pub fn deobfuscate(encoded: &str, key: &str) -> Option<String> {
    if encoded.len() % 2 != 0 {
        return None;
    }
    let key = effective_key(key);
    let mut decoded = Vec::with_capacity(encoded.len() / 2);
    for (chunk, k) in encoded.as_bytes().chunks(2).zip(key.bytes().cycle()) {
        let hex = std::str::from_utf8(chunk).ok()?;
        let byte = u8::from_str_radix(hex, 16).ok()?;
        decoded.push(byte ^ k);
    }
    String::from_utf8(decoded).ok()
}

fn effective_key(key: &str) -> &str {
    if key.is_empty() {
        DEFAULT_OBFUSCATION_KEY
    } else {
        key
    }
}
