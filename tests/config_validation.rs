//! Integration tests for configuration validation

#![allow(clippy::expect_used)]

use std::time::Duration;
use submission_protocol::config::{ClientConfig, Config, LoggingConfig, RetryConfig};
use tracing::Level;

#[test]
fn test_default_config_validates() {
    let config = Config::default();
    let errors = config.validate();
    assert!(
        errors.is_empty(),
        "Default config should be valid, but got errors: {:?}",
        errors
    );
    assert!(config.validate_strict().is_ok());
}

#[test]
fn test_defaults() {
    let config = Config::default();
    assert_eq!(config.client.address(), "127.0.0.1:9009");
    assert_eq!(config.retry.max_attempts, 3);
    assert_eq!(config.retry.retry_delay, Duration::from_millis(500));
    assert_eq!(config.logging.log_level, Level::INFO);
}

#[test]
fn test_empty_host() {
    let mut config = Config::default();
    config.client.host = String::new();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("cannot be empty")));
}

#[test]
fn test_host_with_whitespace() {
    let mut config = Config::default();
    config.client.host = "local host".to_string();

    let errors = config.validate();
    assert!(errors.iter().any(|e| e.contains("Invalid server host")));
}

#[test]
fn test_zero_port() {
    let config = Config::default_with_overrides(|c| c.client.port = 0);
    assert!(config.validate().iter().any(|e| e.contains("port cannot be 0")));
}

#[test]
fn test_timeouts_bounded() {
    let client = ClientConfig {
        connection_timeout: Duration::from_millis(10),
        response_timeout: Duration::from_secs(601),
        ..ClientConfig::default()
    };

    let errors = client.validate();
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().any(|e| e.contains("Connection timeout too short")));
    assert!(errors.iter().any(|e| e.contains("Response timeout too long")));
}

#[test]
fn test_retry_bounds() {
    let zero = RetryConfig {
        max_attempts: 0,
        ..RetryConfig::default()
    };
    assert!(zero.validate().iter().any(|e| e.contains("greater than 0")));

    let many = RetryConfig {
        max_attempts: 11,
        retry_delay: Duration::from_secs(61),
    };
    assert_eq!(many.validate().len(), 2);
}

#[test]
fn test_empty_app_name() {
    let logging = LoggingConfig {
        app_name: String::new(),
        ..LoggingConfig::default()
    };
    assert!(!logging.validate().is_empty());
}

#[test]
fn test_strict_validation_lists_every_problem() {
    let config = Config::default_with_overrides(|c| {
        c.client.port = 0;
        c.retry.max_attempts = 0;
    });

    let err = config.validate_strict().expect_err("config is invalid");
    let message = err.to_string();
    assert!(message.contains("port cannot be 0"));
    assert!(message.contains("Max attempts"));
}

#[test]
fn test_toml_roundtrip() {
    let config = Config::default_with_overrides(|c| {
        c.client.host = "submit.example.com".into();
        c.client.port = 7000;
        c.retry.retry_delay = Duration::from_millis(250);
        c.logging.log_level = Level::DEBUG;
    });

    let text = toml::to_string(&config).expect("serializes");
    let parsed = Config::from_toml(&text).expect("parses");

    assert_eq!(parsed.client.host, "submit.example.com");
    assert_eq!(parsed.client.port, 7000);
    assert_eq!(parsed.retry.retry_delay, Duration::from_millis(250));
    assert_eq!(parsed.logging.log_level, Level::DEBUG);
}

#[test]
fn test_partial_toml_uses_defaults() {
    let config = Config::from_toml(
        r#"
        [retry]
        max_attempts = 5
        retry_delay = 100
        "#,
    )
    .expect("parses");

    assert_eq!(config.retry.max_attempts, 5);
    assert_eq!(config.retry.retry_delay, Duration::from_millis(100));
    assert_eq!(config.client.port, 9009);
}

#[test]
fn test_invalid_toml_is_config_error() {
    assert!(Config::from_toml("[client\nport = ").is_err());
    assert!(Config::from_toml("[logging]\nlog_level = \"loud\"\napp_name = \"x\"\njson_format = false").is_err());
}

#[test]
fn test_example_config_parses() {
    let example = Config::example_config();
    let parsed = Config::from_toml(&example).expect("example config parses");
    assert!(parsed.validate().is_empty());
}

#[test]
fn test_save_and_load() {
    let path = std::env::temp_dir().join(format!("submit-client-{}.toml", std::process::id()));
    let config = Config::default_with_overrides(|c| c.client.port = 8123);

    config.save_to_file(&path).expect("writes");
    let loaded = Config::from_file(&path).expect("reads");
    let _ = std::fs::remove_file(&path);

    assert_eq!(loaded.client.port, 8123);
}
