//! Validation of a single input against a policy.
//!
//! Combines the detectors, the level character checks, the length check and
//! the sanitizer into one deterministic [`ValidationResult`].

use serde::Serialize;

use super::patterns::{detect_sql_injection, detect_xss};
use super::policy::{SecurityLevel, SecurityPolicy};
use super::sanitizer::{char_len, is_paranoid_safe, is_strict_dangerous, sanitize};

/// Message for a SQL injection match
pub const SQL_INJECTION_MESSAGE: &str = "SQL Injection detected";
/// Message for an XSS match
pub const XSS_MESSAGE: &str = "XSS pattern detected";
/// Message for characters outside the paranoid charset
pub const INVALID_CHARS_MESSAGE: &str = "Invalid characters detected";
/// Message for characters in the strict deny class
pub const DANGEROUS_CHARS_MESSAGE: &str = "Potentially dangerous characters detected";

/// Why an input was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreatCategory {
    /// SQL injection pattern matched
    SqlInjection,
    /// XSS pattern matched
    Xss,
    /// Character not allowed at the policy level
    DisallowedCharacters,
    /// Longer than the policy maximum
    TooLong,
}

impl std::fmt::Display for ThreatCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreatCategory::SqlInjection => write!(f, "sql_injection"),
            ThreatCategory::Xss => write!(f, "xss"),
            ThreatCategory::DisallowedCharacters => write!(f, "disallowed_characters"),
            ThreatCategory::TooLong => write!(f, "too_long"),
        }
    }
}

/// A labelled threat message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Threat {
    /// Category tag
    pub category: ThreatCategory,
    /// Human-readable message
    pub message: String,
}

impl Threat {
    fn new(category: ThreatCategory, message: impl Into<String>) -> Self {
        Self {
            category,
            message: message.into(),
        }
    }
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    /// `true` iff `threats` is empty
    pub is_valid: bool,
    /// Detected threats, in check order
    pub threats: Vec<Threat>,
    /// Sanitized input, computed regardless of validity
    pub sanitized: String,
}

impl ValidationResult {
    fn empty() -> Self {
        Self {
            is_valid: true,
            threats: Vec::new(),
            sanitized: String::new(),
        }
    }

    /// Threat messages, in check order
    pub fn messages(&self) -> Vec<String> {
        self.threats.iter().map(|t| t.message.clone()).collect()
    }

    /// Threat categories, in check order
    pub fn categories(&self) -> Vec<ThreatCategory> {
        self.threats.iter().map(|t| t.category).collect()
    }

    /// Check whether a category was reported
    pub fn has(&self, category: ThreatCategory) -> bool {
        self.threats.iter().any(|t| t.category == category)
    }
}

/// Validate `input` against `policy`.
///
/// Empty input is valid and skips every check.
pub fn validate(input: &str, policy: &SecurityPolicy) -> ValidationResult {
    if input.is_empty() {
        return ValidationResult::empty();
    }

    let mut threats = Vec::new();

    if detect_sql_injection(input) {
        threats.push(Threat::new(ThreatCategory::SqlInjection, SQL_INJECTION_MESSAGE));
    }
    if detect_xss(input) {
        threats.push(Threat::new(ThreatCategory::Xss, XSS_MESSAGE));
    }

    match policy.level {
        SecurityLevel::Paranoid if input.chars().any(|c| !is_paranoid_safe(c)) => {
            threats.push(Threat::new(
                ThreatCategory::DisallowedCharacters,
                INVALID_CHARS_MESSAGE,
            ));
        },
        SecurityLevel::Strict if input.chars().any(is_strict_dangerous) => {
            threats.push(Threat::new(
                ThreatCategory::DisallowedCharacters,
                DANGEROUS_CHARS_MESSAGE,
            ));
        },
        _ => {},
    }

    if let Some(max) = policy.max_length {
        if char_len(input) > max {
            threats.push(Threat::new(
                ThreatCategory::TooLong,
                format!("Input exceeds maximum length of {max} characters"),
            ));
        }
    }

    ValidationResult {
        is_valid: threats.is_empty(),
        threats,
        sanitized: sanitize(input, policy),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::policy::Preset;

    #[test]
    fn test_empty_is_valid() {
        let result = validate("", &Preset::Critical.policy());
        assert!(result.is_valid);
        assert!(result.threats.is_empty());
        assert_eq!(result.sanitized, "");
    }

    #[test]
    fn test_clean_input() {
        let result = validate("hello world", &SecurityPolicy::new(SecurityLevel::Basic));
        assert!(result.is_valid);
        assert_eq!(result.sanitized, "hello world");
    }

    #[test]
    fn test_sql_and_xss_messages() {
        let result = validate(
            "<script>'; DROP TABLE users; --</script>",
            &SecurityPolicy::new(SecurityLevel::Basic),
        );
        assert!(!result.is_valid);
        assert_eq!(result.messages(), vec![SQL_INJECTION_MESSAGE, XSS_MESSAGE]);
        assert_eq!(
            result.categories(),
            vec![ThreatCategory::SqlInjection, ThreatCategory::Xss]
        );
    }

    #[test]
    fn test_attribute_breakout_is_xss() {
        let result = validate(r#"" onmouseover="alert(1)"#, &Preset::Form.policy());
        assert!(!result.is_valid);
        assert!(result.has(ThreatCategory::Xss));
        assert_eq!(result.messages(), vec![XSS_MESSAGE]);
    }

    #[test]
    fn test_paranoid_invalid_chars() {
        let result = validate("bob!", &SecurityPolicy::new(SecurityLevel::Paranoid));
        assert_eq!(result.messages(), vec![INVALID_CHARS_MESSAGE]);
        assert_eq!(result.sanitized, "bob");
    }

    #[test]
    fn test_strict_dangerous_chars() {
        let result = validate("a{b}", &SecurityPolicy::new(SecurityLevel::Strict));
        assert_eq!(result.messages(), vec![DANGEROUS_CHARS_MESSAGE]);
        assert_eq!(result.sanitized, "ab");

        // Basic does not run the character check
        assert!(validate("a{b}", &SecurityPolicy::new(SecurityLevel::Basic)).is_valid);
    }

    #[test]
    fn test_too_long() {
        let policy = SecurityPolicy::new(SecurityLevel::Basic).with_max_length(3);
        let result = validate("abcd", &policy);
        assert!(result.has(ThreatCategory::TooLong));
        assert_eq!(
            result.messages(),
            vec!["Input exceeds maximum length of 3 characters"]
        );
        assert_eq!(result.sanitized, "abc");

        assert!(validate("abc", &policy).is_valid);
    }

    #[test]
    fn test_length_counts_chars() {
        let policy = SecurityPolicy::new(SecurityLevel::Basic).with_max_length(3);
        assert!(validate("日本語", &policy).is_valid);
    }

    #[test]
    fn test_sanitized_computed_for_valid_input() {
        // `&` is not a threat under Basic but is still escaped
        let result = validate("salt & pepper", &SecurityPolicy::new(SecurityLevel::Basic));
        assert!(result.is_valid);
        assert_eq!(result.sanitized, "salt &amp; pepper");
    }

    #[test]
    fn test_deterministic() {
        let policy = Preset::Comment.policy();
        let input = "<img src=x onerror=alert(1)> OR 1=1";
        assert_eq!(validate(input, &policy), validate(input, &policy));
    }
}
