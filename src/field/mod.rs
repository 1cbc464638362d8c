//! Field security controller.
//!
//! Binds a security policy to one field's externally owned value and decides,
//! on every change event, whether the input passes through, is warned about,
//! or is cleared.
//!
//! # State Machine
//!
//! ```text
//!                 valid change / reset_warnings()
//!     ┌──────────────────────────────────────────────┐
//!     v                                              │
//!  [Clean] ──threat + show_security_warnings──> [Warned]
//!     │                                              │
//!     │ threat + block_unsafe_input                  │
//!     ├───────────────────────────> [BlockedCleared] │
//!     │                                              │
//!     │ threat + sanitize_on_change + sanitized != raw
//!     └───────────────────────────> [SanitizedCleared]
//! ```
//!
//! Both clearing transitions write `""` to the binding rather than the
//! sanitized value: a threat disqualifies the whole keystroke.
//!
//! # Usage
//!
//! ```rust
//! use fieldguard::field::{ClearReason, FieldOptions, FieldSecurityController, SharedValue};
//! use fieldguard::security::Preset;
//!
//! let value = SharedValue::default();
//! let mut field = FieldSecurityController::new(
//!     value.clone(),
//!     FieldOptions::new()
//!         .with_security(Preset::Form)
//!         .with_block_unsafe_input(true),
//! );
//!
//! let outcome = field.handle_change("1 OR 1=1");
//! assert_eq!(outcome.cleared, Some(ClearReason::Blocked));
//! assert_eq!(value.get(), "");
//! ```

mod binding;
mod controller;

pub use binding::{FnBinding, ReadOnlyValue, SharedValue, ValueBinding};
pub use controller::{
    ChangeOutcome, ClearReason, FieldOptions, FieldSecurityController, FieldState, FieldStatus,
};
