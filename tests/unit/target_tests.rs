//! Unit tests for target key normalization and artifact naming.

use recon_bridge::models::target::{artifact_name, TargetKey};
use recon_bridge::AppError;

#[test]
fn parse_trims_surrounding_whitespace() {
    let key = TargetKey::parse("  example.com\n").expect("valid key");
    assert_eq!(key.as_str(), "example.com");
    assert_eq!(key.to_string(), "example.com");
}

#[test]
fn empty_key_is_invalid_argument() {
    let err = TargetKey::parse("").expect_err("empty key");
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn blank_key_is_invalid_argument() {
    let err = TargetKey::parse(" \t ").expect_err("blank key");
    assert!(matches!(err, AppError::InvalidArgument(_)));
}

#[test]
fn artifact_replaces_every_dot() {
    let key = TargetKey::parse("api.dev.example.com").expect("valid key");
    assert_eq!(key.artifact_name(), "api_dev_example_com");
}

#[test]
fn artifact_of_substituted_key_is_unchanged() {
    assert_eq!(artifact_name("example_com"), "example_com");
    assert_eq!(
        artifact_name(&artifact_name("a.b.c")),
        artifact_name("a.b.c")
    );
}

#[test]
fn distinct_keys_may_share_an_artifact() {
    // Accepted limitation of the dot substitution.
    let dotted = TargetKey::parse("a.b").expect("valid key");
    let underscored = TargetKey::parse("a_b").expect("valid key");
    assert_ne!(dotted, underscored);
    assert_eq!(dotted.artifact_name(), underscored.artifact_name());
}
