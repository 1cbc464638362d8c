//! Configuration file tests.
//!
//! Load field options from TOML on disk and drive controllers built from them.

use std::io::Write;

use fieldguard::config::Config;
use fieldguard::field::{ClearReason, FieldSecurityController, SharedValue};
use fieldguard::security::{Preset, SecurityLevel, SecuritySpec};
use fieldguard::GuardError;
use tempfile::NamedTempFile;

fn write_config(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn test_load_config_file() {
    let file = write_config(
        r#"
        [defaults]
        security = "comment"
        show_security_warnings = true

        [fields.login]
        security = "username"
        block_unsafe_input = true

        [fields.sku.security]
        level = "paranoid"
        max_length = 12
        custom_patterns = ["^0+"]
        "#,
    );

    let config = Config::from_file(file.path()).unwrap();

    assert_eq!(config.defaults.security, Some(SecuritySpec::Preset(Preset::Comment)));
    assert_eq!(config.fields.len(), 2);

    let sku = config.field("sku").security.as_ref().unwrap().resolve();
    assert_eq!(sku.level, SecurityLevel::Paranoid);
    assert_eq!(sku.custom_patterns.len(), 1);
}

#[test]
fn test_controller_from_config_field() {
    let file = write_config(
        r#"
        [fields.login]
        security = "username"
        block_unsafe_input = true
        "#,
    );
    let config = Config::from_file(file.path()).unwrap();

    let value = SharedValue::default();
    let mut field = FieldSecurityController::new(value.clone(), config.field("login").clone());

    let outcome = field.handle_change("admin'--");
    assert_eq!(outcome.cleared, Some(ClearReason::Blocked));
    assert_eq!(value.get(), "");

    field.handle_change("admin");
    assert_eq!(value.get(), "admin");
}

#[test]
fn test_env_flag_keeps_file_preset() {
    let file = write_config(
        r#"
        [defaults]
        security = "username"
        "#,
    );
    let config = Config::from_file(file.path())
        .unwrap()
        .with_lookup(|key| (key == "FIELDGUARD_WARN").then(|| "1".to_string()))
        .unwrap();

    assert_eq!(config.defaults.security, Some(SecuritySpec::Preset(Preset::Username)));
    assert!(config.defaults.show_security_warnings);

    // Username is paranoid: the punctuation is flagged and the warning shown
    let mut field = FieldSecurityController::new(String::new(), config.defaults);
    let outcome = field.handle_change("bob!");
    assert!(!outcome.threats.is_empty());
    assert_eq!(field.value(), "bob!");
    assert!(field.should_show_security_variant());
    assert_eq!(field.security_warnings(), outcome.threats.as_slice());
}

#[test]
fn test_missing_file_is_io_error() {
    let err = Config::from_file("/nonexistent/fieldguard.toml").unwrap_err();
    assert!(matches!(err, GuardError::Io(_)));
}

#[test]
fn test_malformed_custom_pattern_fails_load() {
    let file = write_config(
        r#"
        [defaults.security]
        level = "basic"
        custom_patterns = ["[unterminated"]
        "#,
    );

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_unknown_preset_fails_load() {
    let file = write_config(
        r#"
        [defaults]
        security = "root"
        "#,
    );

    assert!(Config::from_file(file.path()).is_err());
}

#[test]
fn test_config_roundtrip_through_toml() {
    let config = Config::from_toml_str(
        r#"
        [fields.search]
        security = "search"
        max_characters = 40
        "#,
    )
    .unwrap();

    let text = toml::to_string(&config).unwrap();
    assert_eq!(Config::from_toml_str(&text).unwrap(), config);
}
