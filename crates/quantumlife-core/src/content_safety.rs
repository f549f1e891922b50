//! The forbidden-pattern validator.
//!
//! Any user-visible string produced by the core — rehearsal payloads, trust
//! action descriptions, ledger export bundles — must pass this gate before
//! it leaves a stage. A match here is a programming error, not a runtime
//! condition to recover from: the caller rejects the string and produces no
//! partial output.

use once_cell::sync::Lazy;
use regex::{Regex, RegexSet};
use thiserror::Error;

/// Why a user-visible string was rejected.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContentPolicyError {
    /// The string contains a forbidden structural pattern (an `@`, a URL
    /// scheme, a currency symbol, a raw clock time, or a phone number).
    #[error("user-visible string matched forbidden pattern: {pattern}")]
    ForbiddenPattern {
        /// Which named pattern matched.
        pattern: &'static str,
    },
    /// The string embeds one of the caller-supplied sensitive tokens
    /// (a circle id fragment or a raw merchant name) verbatim.
    #[error("user-visible string embeds sensitive token")]
    SensitiveToken,
}

const PATTERN_NAMES: &[&str] = &[
    "at_sign",
    "http_scheme",
    "https_scheme",
    "currency_symbol",
    "clock_time",
    "phone_number",
];

static STRUCTURAL_PATTERNS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"@",
        r"http://",
        r"https://",
        r"[£$€]",
        r"\b\d{1,2}:\d{2}\b",
        r"\b\d{3}[-.\s]?\d{3}[-.\s]?\d{4}\b",
    ])
    .expect("forbidden-pattern set compiles")
});

static PHONE_DIGIT_RUN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{7,}").expect("digit-run pattern compiles"));

/// Validate a user-visible string against the static forbidden-pattern set.
pub fn validate_user_visible(s: &str) -> Result<(), ContentPolicyError> {
    if let Some(idx) = STRUCTURAL_PATTERNS.matches(s).iter().next() {
        return Err(ContentPolicyError::ForbiddenPattern {
            pattern: PATTERN_NAMES[idx],
        });
    }
    if PHONE_DIGIT_RUN.is_match(s) {
        return Err(ContentPolicyError::ForbiddenPattern {
            pattern: "phone_number",
        });
    }
    Ok(())
}

/// Validate a user-visible string against the static set *and* a caller
/// supplied list of sensitive tokens (raw circle id fragments, merchant
/// names) that must never appear verbatim in output meant for display.
pub fn validate_user_visible_with_registry(
    s: &str,
    sensitive_tokens: &[&str],
) -> Result<(), ContentPolicyError> {
    validate_user_visible(s)?;
    let lower = s.to_lowercase();
    if sensitive_tokens
        .iter()
        .any(|token| !token.is_empty() && lower.contains(&token.to_lowercase()))
    {
        return Err(ContentPolicyError::SensitiveToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_calm_constant_strings() {
        assert!(validate_user_visible("Something needs you. Open QuantumLife.").is_ok());
        assert!(validate_user_visible("Interruptions are off.").is_ok());
        assert!(validate_user_visible("Delivered, quietly.").is_ok());
    }

    #[test]
    fn rejects_email_address() {
        assert!(validate_user_visible("contact me@example.com").is_err());
    }

    #[test]
    fn rejects_urls() {
        assert!(validate_user_visible("see https://example.com").is_err());
        assert!(validate_user_visible("see http://example.com").is_err());
    }

    #[test]
    fn rejects_currency_symbols() {
        assert!(validate_user_visible("your order is $42").is_err());
        assert!(validate_user_visible("costs £10").is_err());
        assert!(validate_user_visible("costs €10").is_err());
    }

    #[test]
    fn rejects_raw_clock_time() {
        assert!(validate_user_visible("meeting at 14:30").is_err());
    }

    #[test]
    fn rejects_phone_number() {
        assert!(validate_user_visible("call 555-123-4567").is_err());
    }

    #[test]
    fn rejects_sensitive_token() {
        assert!(
            validate_user_visible_with_registry("Work circle needs you", &["Work"]).is_err()
        );
    }
}
