//! Configuration management.
//!
//! Supports configuration from:
//! - TOML config files
//! - Environment variables
//! - CLI arguments (for the `fieldguard` binary)
//!
//! Fields are named only to look up their [`FieldOptions`]; controllers are
//! always handed an explicit binding.
//!
//! ```toml
//! [defaults]
//! security = "form"
//! show_security_warnings = true
//!
//! [fields.username]
//! security = "username"
//! block_unsafe_input = true
//!
//! [fields.bio.security]
//! level = "strict"
//! max_length = 280
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{GuardError, Result};
use crate::field::FieldOptions;
use crate::security::{SecurityLevel, SecurityPolicy, SecuritySpec};

/// Main configuration struct
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Options for fields without their own entry
    #[serde(default)]
    pub defaults: FieldOptions,

    /// Per-field options, keyed by field name
    #[serde(default)]
    pub fields: BTreeMap<String, FieldOptions>,
}

impl Config {
    /// Default config file location: `<config_dir>/fieldguard/config.toml`
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("fieldguard").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)?;

        Self::from_toml_str(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Load defaults from environment variables
    ///
    /// | Variable                    | Effect                               |
    /// |-----------------------------|--------------------------------------|
    /// | `FIELDGUARD_PRESET`         | preset name                          |
    /// | `FIELDGUARD_LEVEL`          | inline policy level (if no preset)   |
    /// | `FIELDGUARD_MAX_CHARACTERS` | `max_characters`                     |
    /// | `FIELDGUARD_BLOCK`          | `block_unsafe_input`                 |
    /// | `FIELDGUARD_SANITIZE`       | `sanitize_on_change`                 |
    /// | `FIELDGUARD_WARN`           | `show_security_warnings`             |
    pub fn from_env() -> Result<Self> {
        Self::default().with_env()
    }

    /// Load defaults through an arbitrary variable lookup
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Self::default().with_lookup(lookup)
    }

    /// Overlay the environment variables listed on [`Config::from_env`]
    /// onto these defaults
    pub fn with_env(self) -> Result<Self> {
        self.with_lookup(|key| std::env::var(key).ok())
    }

    /// Overlay variables from `lookup` onto these defaults
    ///
    /// Only variables that are set touch the defaults; everything else,
    /// including a preset loaded from file, is kept.
    pub fn with_lookup(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = &mut self.defaults;

        if let Some(preset) = lookup("FIELDGUARD_PRESET") {
            defaults.security = Some(preset.parse()?);
        } else if let Some(level) = lookup("FIELDGUARD_LEVEL") {
            let level: SecurityLevel = level.parse()?;
            defaults.security = Some(SecuritySpec::Policy(SecurityPolicy::new(level)));
        }

        if let Some(max) = lookup("FIELDGUARD_MAX_CHARACTERS") {
            let max: usize = max.parse().map_err(|e| {
                GuardError::Config(format!("Invalid FIELDGUARD_MAX_CHARACTERS `{max}`: {e}"))
            })?;
            defaults.max_characters = Some(max);
        }

        if let Some(val) = lookup("FIELDGUARD_BLOCK") {
            defaults.block_unsafe_input = parse_flag("FIELDGUARD_BLOCK", &val)?;
        }
        if let Some(val) = lookup("FIELDGUARD_SANITIZE") {
            defaults.sanitize_on_change = parse_flag("FIELDGUARD_SANITIZE", &val)?;
        }
        if let Some(val) = lookup("FIELDGUARD_WARN") {
            defaults.show_security_warnings = parse_flag("FIELDGUARD_WARN", &val)?;
        }

        Ok(self)
    }

    /// Merge with another config (other takes precedence)
    ///
    /// Options are merged setting by setting, for the defaults and for
    /// fields named in both configs: an unset `security` or limit in `other`
    /// keeps this config's value, and flags enabled in either stay enabled.
    pub fn merge(self, other: Self) -> Self {
        let defaults = merge_options(self.defaults, other.defaults);

        let mut fields = self.fields;
        for (name, overlay) in other.fields {
            let merged = match fields.remove(&name) {
                Some(base) => merge_options(base, overlay),
                None => overlay,
            };
            fields.insert(name, merged);
        }

        Self { defaults, fields }
    }

    /// Options for `name`, or the defaults
    pub fn field(&self, name: &str) -> &FieldOptions {
        self.fields.get(name).unwrap_or(&self.defaults)
    }
}

fn merge_options(base: FieldOptions, overlay: FieldOptions) -> FieldOptions {
    FieldOptions {
        security: overlay.security.or(base.security),
        sanitize_on_change: base.sanitize_on_change || overlay.sanitize_on_change,
        show_security_warnings: base.show_security_warnings || overlay.show_security_warnings,
        block_unsafe_input: base.block_unsafe_input || overlay.block_unsafe_input,
        max_characters: overlay.max_characters.or(base.max_characters),
        max_length: overlay.max_length.or(base.max_length),
    }
}

fn parse_flag(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(GuardError::Config(format!("Invalid boolean for {key}: `{value}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::Preset;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert!(config.fields.is_empty());
        assert!(config.defaults.security.is_none());
        assert!(!config.defaults.block_unsafe_input);
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            [defaults]
            security = "form"
            show_security_warnings = true

            [fields.username]
            security = "username"
            block_unsafe_input = true
            max_characters = 16

            [fields.bio.security]
            level = "strict"
            max_length = 280
        "#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.defaults.security, Some(SecuritySpec::Preset(Preset::Form)));
        assert!(config.defaults.show_security_warnings);

        let username = config.field("username");
        assert!(username.block_unsafe_input);
        assert_eq!(username.max_characters, Some(16));

        let bio = config.field("bio").security.as_ref().unwrap().resolve();
        assert_eq!(bio.level, SecurityLevel::Strict);
        assert_eq!(bio.max_length, Some(280));

        assert_eq!(config.field("missing"), &config.defaults);
    }

    #[test]
    fn test_unknown_preset_in_toml_fails() {
        let err = Config::from_toml_str(
            r#"
            [fields.x]
            security = "superuser"
        "#,
        )
        .unwrap_err();
        assert!(matches!(err, GuardError::Config(_)));
    }

    #[test]
    fn test_from_lookup() {
        let config = Config::from_lookup(lookup(&[
            ("FIELDGUARD_PRESET", "email"),
            ("FIELDGUARD_MAX_CHARACTERS", "64"),
            ("FIELDGUARD_BLOCK", "true"),
            ("FIELDGUARD_WARN", "0"),
        ]))
        .unwrap();

        assert_eq!(config.defaults.security, Some(SecuritySpec::Preset(Preset::Email)));
        assert_eq!(config.defaults.max_characters, Some(64));
        assert!(config.defaults.block_unsafe_input);
        assert!(!config.defaults.show_security_warnings);
    }

    #[test]
    fn test_from_lookup_level() {
        let config = Config::from_lookup(lookup(&[("FIELDGUARD_LEVEL", "paranoid")])).unwrap();
        let policy = config.defaults.security.unwrap().resolve();
        assert_eq!(policy.level, SecurityLevel::Paranoid);
    }

    #[test]
    fn test_from_lookup_rejects_bad_values() {
        assert!(matches!(
            Config::from_lookup(lookup(&[("FIELDGUARD_PRESET", "nope")])),
            Err(GuardError::UnknownPreset(_))
        ));
        assert!(Config::from_lookup(lookup(&[("FIELDGUARD_BLOCK", "maybe")])).is_err());
        assert!(Config::from_lookup(lookup(&[("FIELDGUARD_MAX_CHARACTERS", "-1")])).is_err());
    }

    #[test]
    fn test_merge() {
        let base = Config::from_toml_str(
            r#"
            [defaults]
            security = "form"

            [fields.a]
            block_unsafe_input = true

            [fields.b]
            sanitize_on_change = true
        "#,
        )
        .unwrap();
        let overlay = Config::from_toml_str(
            r#"
            [fields.b]
            show_security_warnings = true
        "#,
        )
        .unwrap();

        let merged = base.merge(overlay);
        assert_eq!(merged.defaults.security, Some(SecuritySpec::Preset(Preset::Form)));
        assert!(merged.field("a").block_unsafe_input);
        assert!(merged.field("b").show_security_warnings);
        assert!(merged.field("b").sanitize_on_change);
    }

    #[test]
    fn test_merge_keeps_file_preset_under_env_flag() {
        let file = Config::from_toml_str(
            r#"
            [defaults]
            security = "username"
            max_characters = 30
        "#,
        )
        .unwrap();
        let env = Config::from_lookup(lookup(&[("FIELDGUARD_WARN", "1")])).unwrap();

        let merged = file.merge(env);
        assert_eq!(merged.defaults.security, Some(SecuritySpec::Preset(Preset::Username)));
        assert_eq!(merged.defaults.max_characters, Some(30));
        assert!(merged.defaults.show_security_warnings);
    }

    #[test]
    fn test_with_lookup_overlays_only_set_variables() {
        let file = Config::from_toml_str(
            r#"
            [defaults]
            security = "username"
            block_unsafe_input = true
            show_security_warnings = true
        "#,
        )
        .unwrap();

        let config = file
            .with_lookup(lookup(&[("FIELDGUARD_WARN", "0"), ("FIELDGUARD_SANITIZE", "yes")]))
            .unwrap();
        assert_eq!(config.defaults.security, Some(SecuritySpec::Preset(Preset::Username)));
        assert!(config.defaults.block_unsafe_input);
        assert!(config.defaults.sanitize_on_change);
        // An explicit env value can switch a file flag off
        assert!(!config.defaults.show_security_warnings);
    }
}
