//! Per-field security controller.
//!
//! Wraps a [`ValueBinding`] and applies the configured policy to every change
//! event before the value is written back.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::binding::ValueBinding;
use crate::error::Result;
use crate::security::{
    char_len, truncate_chars, validate, SecurityPolicy, SecuritySpec, ValidationResult,
};

/// Why a value was forcibly reset to empty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClearReason {
    /// `block_unsafe_input` rejected a threat
    Blocked,
    /// `sanitize_on_change` rejected a threat whose sanitized form differed
    SanitizedClear,
}

impl fmt::Display for ClearReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClearReason::Blocked => write!(f, "blocked"),
            ClearReason::SanitizedClear => write!(f, "sanitized_clear"),
        }
    }
}

/// Field status derived from [`FieldState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    /// No warnings, no clear reason
    Clean,
    /// Warnings shown, value passed through
    Warned,
    /// Value reset because input was blocked
    BlockedCleared,
    /// Value reset because input needed sanitizing
    SanitizedCleared,
}

/// Mutable per-field security state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldState {
    /// Warning messages from the last threatening change
    pub warnings: Vec<String>,
    /// Set when the last change forcibly cleared the value
    pub cleared_reason: Option<ClearReason>,
}

impl FieldState {
    /// Current status; a clear reason takes precedence over warnings
    pub fn status(&self) -> FieldStatus {
        match self.cleared_reason {
            Some(ClearReason::Blocked) => FieldStatus::BlockedCleared,
            Some(ClearReason::SanitizedClear) => FieldStatus::SanitizedCleared,
            None if !self.warnings.is_empty() => FieldStatus::Warned,
            None => FieldStatus::Clean,
        }
    }

    fn clear(&mut self) {
        self.warnings.clear();
        self.cleared_reason = None;
    }
}

/// Field security configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldOptions {
    /// Policy or preset; `None` disables validation
    pub security: Option<SecuritySpec>,

    /// Clear the value when a threat's sanitized form differs from the input
    pub sanitize_on_change: bool,

    /// Store threat messages as warnings
    pub show_security_warnings: bool,

    /// Clear the value on any threat
    pub block_unsafe_input: bool,

    /// Character limit enforced on accepted values
    pub max_characters: Option<usize>,

    /// Fallback limit when `max_characters` is unset
    pub max_length: Option<usize>,
}

impl FieldOptions {
    /// Create options with no policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the policy or preset
    pub fn with_security(mut self, spec: impl Into<SecuritySpec>) -> Self {
        self.security = Some(spec.into());
        self
    }

    /// Set the policy from a preset name
    ///
    /// Fails for names outside the preset table.
    pub fn with_preset_name(mut self, name: &str) -> Result<Self> {
        self.security = Some(name.parse()?);
        Ok(self)
    }

    /// Set `sanitize_on_change`
    pub fn with_sanitize_on_change(mut self, enabled: bool) -> Self {
        self.sanitize_on_change = enabled;
        self
    }

    /// Set `show_security_warnings`
    pub fn with_security_warnings(mut self, enabled: bool) -> Self {
        self.show_security_warnings = enabled;
        self
    }

    /// Set `block_unsafe_input`
    pub fn with_block_unsafe_input(mut self, enabled: bool) -> Self {
        self.block_unsafe_input = enabled;
        self
    }

    /// Set `max_characters`
    pub fn with_max_characters(mut self, max: usize) -> Self {
        self.max_characters = Some(max);
        self
    }

    /// Set the fallback `max_length`
    pub fn with_max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    /// `max_characters`, falling back to `max_length`
    pub fn effective_max_length(&self) -> Option<usize> {
        self.max_characters.or(self.max_length)
    }
}

/// Result of a single [`FieldSecurityController::handle_change`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeOutcome {
    /// Value written to the binding
    pub value: String,
    /// Set when the value was forcibly cleared
    pub cleared: Option<ClearReason>,
    /// Threat messages for this change
    pub threats: Vec<String>,
}

type ChangeCallback = Box<dyn FnMut(&str)>;
type ThreatCallback = Box<dyn FnMut(&[String], &str)>;
type ClearCallback = Box<dyn FnMut(ClearReason, &[String])>;

/// Security controller for one bound field.
///
/// Not reentrant: callers serialize `handle_change` calls. The last call
/// fully determines the resulting state.
pub struct FieldSecurityController<B: ValueBinding> {
    name: String,
    binding: B,
    options: FieldOptions,
    policy: Option<SecurityPolicy>,
    state: FieldState,
    on_change: Option<ChangeCallback>,
    on_threat: Option<ThreatCallback>,
    on_clear: Option<ClearCallback>,
}

impl<B: ValueBinding> FieldSecurityController<B> {
    /// Bind a controller to `binding`
    pub fn new(binding: B, options: FieldOptions) -> Self {
        let policy = options.security.as_ref().map(SecuritySpec::resolve);
        Self {
            name: "field".to_string(),
            binding,
            options,
            policy,
            state: FieldState::default(),
            on_change: None,
            on_threat: None,
            on_clear: None,
        }
    }

    /// Name used in log events
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Called with the final accepted value after every change
    pub fn on_change(mut self, callback: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(callback));
        self
    }

    /// Called with `(threats, attempted_value)` on every detected threat
    pub fn on_threat(mut self, callback: impl FnMut(&[String], &str) + 'static) -> Self {
        self.on_threat = Some(Box::new(callback));
        self
    }

    /// Called with `(reason, threats)` when the value is forcibly cleared
    pub fn on_clear(mut self, callback: impl FnMut(ClearReason, &[String]) + 'static) -> Self {
        self.on_clear = Some(Box::new(callback));
        self
    }

    /// Apply the policy to a new raw value and write the outcome.
    pub fn handle_change(&mut self, raw: &str) -> ChangeOutcome {
        let result = match self.policy.as_ref() {
            Some(policy) => validate(raw, policy),
            None => {
                tracing::debug!(
                    field = %self.name,
                    len = char_len(raw),
                    "change accepted without policy"
                );
                self.state.clear();
                return self.accept(raw, Vec::new());
            },
        };

        if result.is_valid {
            tracing::debug!(field = %self.name, len = char_len(raw), "change accepted");
            self.state.clear();
            return self.accept(raw, Vec::new());
        }

        self.handle_threats(raw, &result)
    }

    fn handle_threats(&mut self, raw: &str, result: &ValidationResult) -> ChangeOutcome {
        let threats = result.messages();
        tracing::warn!(
            field = %self.name,
            categories = ?result.categories(),
            len = char_len(raw),
            "security threats detected"
        );

        if let Some(callback) = self.on_threat.as_mut() {
            callback(&threats, raw);
        }

        if self.options.show_security_warnings {
            self.state.warnings = threats.clone();
        }

        if self.options.block_unsafe_input {
            return self.clear(ClearReason::Blocked, raw, threats);
        }

        if self.options.sanitize_on_change && result.sanitized != raw {
            return self.clear(ClearReason::SanitizedClear, raw, threats);
        }

        tracing::debug!(field = %self.name, len = char_len(raw), "threats passed through");
        self.state.cleared_reason = None;
        self.accept(raw, threats)
    }

    fn accept(&mut self, raw: &str, threats: Vec<String>) -> ChangeOutcome {
        let value = match self.effective_max_length() {
            Some(max) => truncate_chars(raw, max),
            None => raw.to_string(),
        };

        self.binding.set_value(value.clone());
        if let Some(callback) = self.on_change.as_mut() {
            callback(&value);
        }

        ChangeOutcome {
            value,
            cleared: None,
            threats,
        }
    }

    fn clear(&mut self, reason: ClearReason, raw: &str, threats: Vec<String>) -> ChangeOutcome {
        tracing::info!(field = %self.name, %reason, len = char_len(raw), "clearing field value");

        self.binding.set_value(String::new());
        self.state.cleared_reason = Some(reason);

        if let Some(callback) = self.on_clear.as_mut() {
            callback(reason, &threats);
        }
        if let Some(callback) = self.on_change.as_mut() {
            callback("");
        }

        ChangeOutcome {
            value: String::new(),
            cleared: Some(reason),
            threats,
        }
    }

    /// Clear warnings and clear reason without a change event
    pub fn reset_warnings(&mut self) {
        self.state.clear();
    }

    /// Echo of the bound value
    pub fn value(&self) -> String {
        self.binding.value().into_owned()
    }

    /// Current warnings
    pub fn security_warnings(&self) -> &[String] {
        &self.state.warnings
    }

    /// Why the value was last cleared, if it was
    pub fn was_cleared_reason(&self) -> Option<ClearReason> {
        self.state.cleared_reason
    }

    /// Security state
    pub fn state(&self) -> &FieldState {
        &self.state
    }

    /// Derived status
    pub fn status(&self) -> FieldStatus {
        self.state.status()
    }

    /// `max_characters`, falling back to `max_length`
    pub fn effective_max_length(&self) -> Option<usize> {
        self.options.effective_max_length()
    }

    /// Length of the bound value in characters
    pub fn current_length(&self) -> usize {
        char_len(&self.binding.value())
    }

    /// Bound value is longer than the effective limit
    pub fn is_over_limit(&self) -> bool {
        self.effective_max_length()
            .is_some_and(|max| self.current_length() > max)
    }

    /// Re-validates the current bound value
    pub fn has_security_threats(&self) -> bool {
        self.policy
            .as_ref()
            .is_some_and(|policy| !validate(&self.binding.value(), policy).is_valid)
    }

    /// Owning field should render its danger variant
    pub fn should_show_security_variant(&self) -> bool {
        self.has_security_threats()
            && (self.options.show_security_warnings || self.options.block_unsafe_input)
    }

    /// Resolved policy, if any
    pub fn policy(&self) -> Option<&SecurityPolicy> {
        self.policy.as_ref()
    }

    /// Field options
    pub fn options(&self) -> &FieldOptions {
        &self.options
    }

    /// Bound value handle
    pub fn binding(&self) -> &B {
        &self.binding
    }

    /// Release the binding
    pub fn into_binding(self) -> B {
        self.binding
    }
}

impl<B: ValueBinding + fmt::Debug> fmt::Debug for FieldSecurityController<B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSecurityController")
            .field("name", &self.name)
            .field("binding", &self.binding)
            .field("options", &self.options)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
