//! Security policies and the preset table.
//!
//! A [`SecurityPolicy`] is either built directly or looked up by name from
//! the closed [`Preset`] table. [`SecuritySpec`] carries either form until it
//! is resolved.

use std::fmt;
use std::str::FromStr;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};

/// How aggressively input is checked and rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SecurityLevel {
    /// Escape HTML/SQL metacharacters
    Basic,
    /// Delete dangerous punctuation
    Strict,
    /// Restrict to a safe ASCII charset
    Paranoid,
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SecurityLevel::Basic => write!(f, "basic"),
            SecurityLevel::Strict => write!(f, "strict"),
            SecurityLevel::Paranoid => write!(f, "paranoid"),
        }
    }
}

impl FromStr for SecurityLevel {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "basic" => Ok(SecurityLevel::Basic),
            "strict" => Ok(SecurityLevel::Strict),
            "paranoid" => Ok(SecurityLevel::Paranoid),
            _ => Err(GuardError::UnknownLevel(s.to_string())),
        }
    }
}

/// A caller-supplied pattern whose matches are deleted during sanitization.
///
/// Compiled once at construction; a malformed pattern is a configuration
/// error, never a per-keystroke one.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CustomPattern(Regex);

impl CustomPattern {
    /// Compile a custom pattern.
    pub fn new(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self)
            .map_err(|source| GuardError::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })
    }

    /// Pattern source
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Delete every match from `input`.
    pub(crate) fn strip(&self, input: &str) -> String {
        self.0.replace_all(input, "").into_owned()
    }
}

impl PartialEq for CustomPattern {
    fn eq(&self, other: &Self) -> bool {
        self.as_str() == other.as_str()
    }
}

impl Eq for CustomPattern {}

impl TryFrom<String> for CustomPattern {
    type Error = GuardError;

    fn try_from(pattern: String) -> Result<Self> {
        Self::new(&pattern)
    }
}

impl From<CustomPattern> for String {
    fn from(pattern: CustomPattern) -> Self {
        pattern.as_str().to_string()
    }
}

fn default_true() -> bool {
    true
}

/// Security policy applied to a single validation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Sanitization level
    pub level: SecurityLevel,

    /// Carried for integrators; not consulted by validation
    #[serde(default)]
    pub allow_html: bool,

    /// Carried for integrators; not consulted by validation
    #[serde(default = "default_true")]
    pub allow_special_chars: bool,

    /// Maximum length in characters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Extra patterns deleted after level sanitization
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_patterns: Vec<CustomPattern>,
}

impl SecurityPolicy {
    /// Create a policy with default options for `level`
    pub fn new(level: SecurityLevel) -> Self {
        Self {
            level,
            allow_html: false,
            allow_special_chars: true,
            max_length: None,
            custom_patterns: Vec::new(),
        }
    }

    /// Set the maximum length
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Set `allow_html`
    pub fn with_allow_html(mut self, allow: bool) -> Self {
        self.allow_html = allow;
        self
    }

    /// Set `allow_special_chars`
    pub fn with_allow_special_chars(mut self, allow: bool) -> Self {
        self.allow_special_chars = allow;
        self
    }

    /// Compile and append a custom pattern
    pub fn with_custom_pattern(mut self, pattern: &str) -> Result<Self> {
        self.custom_patterns.push(CustomPattern::new(pattern)?);
        Ok(self)
    }
}

/// Named policies for common field types.
///
/// The table is closed: names outside it fail to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Preset {
    /// General form input
    Form,
    /// Account names
    Username,
    /// Email addresses
    Email,
    /// Search boxes
    Search,
    /// Free-text comments
    Comment,
    /// Short, high-value identifiers
    Critical,
}

impl Preset {
    /// Every preset, in table order
    pub const ALL: [Preset; 6] = [
        Preset::Form,
        Preset::Username,
        Preset::Email,
        Preset::Search,
        Preset::Comment,
        Preset::Critical,
    ];

    /// Preset name as used in configuration
    pub fn name(self) -> &'static str {
        match self {
            Preset::Form => "form",
            Preset::Username => "username",
            Preset::Email => "email",
            Preset::Search => "search",
            Preset::Comment => "comment",
            Preset::Critical => "critical",
        }
    }

    /// The canned policy for this preset
    pub fn policy(self) -> SecurityPolicy {
        match self {
            Preset::Form => SecurityPolicy::new(SecurityLevel::Basic).with_max_length(1000),
            Preset::Username => SecurityPolicy::new(SecurityLevel::Paranoid)
                .with_allow_special_chars(false)
                .with_max_length(50),
            Preset::Email => SecurityPolicy::new(SecurityLevel::Strict).with_max_length(254),
            Preset::Search => SecurityPolicy::new(SecurityLevel::Basic).with_max_length(200),
            Preset::Comment => SecurityPolicy::new(SecurityLevel::Basic).with_max_length(5000),
            Preset::Critical => SecurityPolicy::new(SecurityLevel::Paranoid)
                .with_allow_special_chars(false)
                .with_max_length(20),
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name() == s)
            .ok_or_else(|| GuardError::UnknownPreset(s.to_string()))
    }
}

/// A policy given either by preset name or inline.
///
/// Deserializes from a string (preset name) or a table (inline policy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SecuritySpec {
    /// Look up from the preset table
    Preset(Preset),
    /// Use as-is
    Policy(SecurityPolicy),
}

impl SecuritySpec {
    /// Resolve to a concrete policy
    pub fn resolve(&self) -> SecurityPolicy {
        match self {
            SecuritySpec::Preset(preset) => preset.policy(),
            SecuritySpec::Policy(policy) => policy.clone(),
        }
    }
}

impl From<Preset> for SecuritySpec {
    fn from(preset: Preset) -> Self {
        SecuritySpec::Preset(preset)
    }
}

impl From<SecurityPolicy> for SecuritySpec {
    fn from(policy: SecurityPolicy) -> Self {
        SecuritySpec::Policy(policy)
    }
}

impl FromStr for SecuritySpec {
    type Err = GuardError;

    fn from_str(s: &str) -> Result<Self> {
        s.parse().map(SecuritySpec::Preset)
    }
}

/// Resolve a policy or preset to a concrete policy.
///
/// A policy value is returned unchanged.
pub fn resolve_policy(spec: impl Into<SecuritySpec>) -> SecurityPolicy {
    match spec.into() {
        SecuritySpec::Preset(preset) => preset.policy(),
        SecuritySpec::Policy(policy) => policy,
    }
}

/// Resolve a preset by name.
///
/// Unknown names fail with [`GuardError::UnknownPreset`].
pub fn resolve_preset(name: &str) -> Result<SecurityPolicy> {
    name.parse::<Preset>().map(Preset::policy)
}
