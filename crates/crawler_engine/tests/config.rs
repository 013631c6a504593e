use std::fs;

use crawler_engine::{ConfigError, CrawlerConfig, DEFAULT_PROFILE_VARIANT};
use serde_json::json;
use tempfile::TempDir;

#[test]
fn from_value_applies_defaults() {
    let config = CrawlerConfig::from_value(json!({
        "url": "https://example.com",
        "chrome_profile_dir": "--user-data-dir=/tmp/profile",
    }))
    .unwrap();

    assert_eq!(config.url(), "https://example.com");
    assert_eq!(config.session_profile(), "--user-data-dir=/tmp/profile");
    assert_eq!(config.profile_variant(), DEFAULT_PROFILE_VARIANT);
    assert!(!config.headless());
}

#[test]
fn missing_required_key_is_rejected() {
    let err = CrawlerConfig::from_value(json!({"url": "https://example.com"})).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("chrome_profile_dir")));

    let err = CrawlerConfig::from_value(json!({"chrome_profile_dir": "/tmp/p"})).unwrap_err();
    assert!(matches!(err, ConfigError::MissingKey("url")));
}

#[test]
fn unknown_keys_are_listed_sorted() {
    let err = CrawlerConfig::from_value(json!({
        "url": "https://example.com",
        "chrome_profile_dir": "/tmp/p",
        "zoom": 2,
        "cookies": [],
    }))
    .unwrap_err();

    match err {
        ConfigError::UnknownKeys(keys) => assert_eq!(keys, vec!["cookies", "zoom"]),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn empty_values_are_rejected() {
    let err = CrawlerConfig::from_value(json!({"url": "", "chrome_profile_dir": "/tmp/p"}))
        .unwrap_err();
    assert!(matches!(err, ConfigError::Empty("url")));

    let err = CrawlerConfig::new("https://example.com", "").unwrap_err();
    assert!(matches!(err, ConfigError::Empty("chrome_profile_dir")));
}

#[test]
fn wrong_types_and_shapes_are_rejected() {
    let err = CrawlerConfig::from_value(json!({
        "url": "https://example.com",
        "chrome_profile_dir": "/tmp/p",
        "headless": "yes",
    }))
    .unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue(_)));

    let err = CrawlerConfig::from_value(json!(["url"])).unwrap_err();
    assert!(matches!(err, ConfigError::NotAnObject));
}

#[test]
fn load_reads_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(
        &path,
        json!({
            "url": "https://example.com",
            "chrome_profile_dir": "--user-data-dir=/tmp/profile",
            "profile_directory": "Profile 1",
            "headless": true,
        })
        .to_string(),
    )
    .unwrap();

    let config = CrawlerConfig::load(&path).unwrap();

    assert_eq!(config.profile_variant(), "Profile 1");
    assert!(config.headless());
}

#[test]
fn load_missing_file() {
    let temp = TempDir::new().unwrap();
    let err = CrawlerConfig::load(&temp.path().join("missing.json")).unwrap_err();
    assert!(matches!(err, ConfigError::NotFound(_)));
}

#[test]
fn load_rejects_invalid_json() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.json");
    fs::write(&path, "{ url: nope").unwrap();

    let err = CrawlerConfig::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse(_)));
}
