//! # fieldguard - Keystroke-level input security for text fields
//!
//! Client-side heuristic guard that inspects every change to a text field,
//! classifies it against SQL injection and XSS pattern sets, optionally
//! sanitizes or blocks it, enforces length policy, and reports a
//! deterministic outcome to the owning field.
//!
//! This is a heuristic guard, not a security boundary of record: it does no
//! SQL/HTML parsing and makes no false-positive guarantees.
//!
//! ## Architecture
//!
//! ```text
//!  keystroke
//!     │
//!     v
//!  FieldSecurityController::handle_change(raw)
//!     │
//!     ├──> validate(raw, policy) ──> detect_sql_injection / detect_xss
//!     │                          ──> level character checks, length check
//!     │                          ──> sanitize(raw, policy)
//!     │
//!     ├──> decision: pass through | warn | block-clear | sanitize-clear
//!     │
//!     └──> ValueBinding::set_value(..) + on_change / on_threat / on_clear
//! ```
//!
//! ### Presets
//!
//! | Name       | Level      | Max length |
//! |------------|------------|------------|
//! | `form`     | `Basic`    | 1000       |
//! | `username` | `Paranoid` | 50         |
//! | `email`    | `Strict`   | 254        |
//! | `search`   | `Basic`    | 200        |
//! | `comment`  | `Basic`    | 5000       |
//! | `critical` | `Paranoid` | 20         |
//!
//! ## Quick Start
//!
//! ### Stateless Validation
//!
//! ```rust
//! use fieldguard::{resolve_preset, validate};
//!
//! let policy = resolve_preset("critical").unwrap();
//! let result = validate("<script>alert(1)</script>", &policy);
//!
//! assert!(!result.is_valid);
//! assert_eq!(result.sanitized, "scriptalert1script");
//! ```
//!
//! ### Guarding a Field
//!
//! ```rust
//! use fieldguard::{FieldOptions, FieldSecurityController, SecurityLevel, SecurityPolicy};
//!
//! let mut value = String::new();
//! let mut field = FieldSecurityController::new(
//!     &mut value,
//!     FieldOptions::new()
//!         .with_security(SecurityPolicy::new(SecurityLevel::Basic))
//!         .with_security_warnings(true)
//!         .with_max_characters(5),
//! );
//!
//! field.handle_change("hello world");
//! assert_eq!(field.value(), "hello");
//!
//! field.handle_change("<script>x</script>");
//! assert!(!field.security_warnings().is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`security`]: Detectors, sanitizer, policies and validation
//! - [`field`]: Per-field controller and value bindings
//! - [`config`]: Configuration management
//! - [`error`]: Error types and result aliases

pub mod config;
pub mod error;
pub mod field;
pub mod security;

// Re-exports for convenience
pub use config::Config;
pub use error::{GuardError, Result};
pub use field::{
    ChangeOutcome, ClearReason, FieldOptions, FieldSecurityController, FieldState, FieldStatus,
    SharedValue, ValueBinding,
};
pub use security::{
    detect_sql_injection, detect_xss, resolve_policy, resolve_preset, sanitize, validate, Preset,
    SecurityLevel, SecurityPolicy, SecuritySpec, Threat, ThreatCategory, ValidationResult,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
