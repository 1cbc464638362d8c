//! Input threat detection, sanitization and validation.
//!
//! This module provides the stateless half of the engine: everything here is a
//! pure function of `(input, policy)`.
//!
//! # Threat Categories
//!
//! | Category               | Trigger                                          |
//! |------------------------|--------------------------------------------------|
//! | `SqlInjection`         | Any SQL injection pattern                        |
//! | `Xss`                  | Any XSS pattern                                  |
//! | `DisallowedCharacters` | Character outside the `Strict`/`Paranoid` charset |
//! | `TooLong`              | Longer than `max_length` characters              |
//!
//! # Security Levels
//!
//! | Level      | Sanitization                                         |
//! |------------|------------------------------------------------------|
//! | `Basic`    | Escape `'` `"` `<` `>` `&`                           |
//! | `Strict`   | Delete `< > ' " & \| ( ) { } [ ] \`                  |
//! | `Paranoid` | Keep only ASCII letters, digits, whitespace, `-_.@`  |
//!
//! # Usage
//!
//! ```rust
//! use fieldguard::security::{resolve_preset, validate, ThreatCategory};
//!
//! let policy = resolve_preset("username").unwrap();
//!
//! let result = validate("alice_01", &policy);
//! assert!(result.is_valid);
//!
//! let result = validate("alice' OR 1=1 --", &policy);
//! assert!(!result.is_valid);
//! assert!(result.has(ThreatCategory::SqlInjection));
//! assert_eq!(result.sanitized, "alice OR 11 --");
//! ```

mod patterns;
mod policy;
mod sanitizer;
mod validator;

pub use patterns::{
    detect_sql_injection, detect_xss, match_patterns, PatternGroup, ThreatPattern,
    SQL_INJECTION_PATTERNS, XSS_PATTERNS,
};
pub use policy::{
    resolve_policy, resolve_preset, CustomPattern, Preset, SecurityLevel, SecurityPolicy,
    SecuritySpec,
};
pub use sanitizer::{char_len, sanitize, truncate_chars};
pub use validator::{validate, Threat, ThreatCategory, ValidationResult};
