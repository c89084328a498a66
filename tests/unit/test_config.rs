//! Unit tests for environment configuration.

use model_api::config::{Config, ConfigError, DEFAULT_PORT, DEFAULT_TABLE_NAME, LogFormat};
use serial_test::serial;
use std::collections::HashMap;

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

#[test]
fn test_defaults_when_nothing_set() {
    let config = Config::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, Config::default());
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.table_name, DEFAULT_TABLE_NAME);
    assert_eq!(config.event_source, "model-api");
    assert!(config.database_url.is_none());
    assert!(config.event_bus_endpoint.is_none());
}

#[test]
fn test_all_values_read() {
    let config = Config::from_lookup(lookup(&[
        ("PORT", "9000"),
        ("MODELS_TABLE_NAME", "presidents"),
        ("DATABASE_URL", "postgres://localhost/models"),
        ("SCAN_PAGE_SIZE", "25"),
        ("EVENT_BUS_ENDPOINT", "http://localhost:4010/events"),
        ("EVENT_BUS_NAME", "model-bus"),
        ("EVENT_SOURCE", "presidents-api"),
        ("CHANGE_FEED_BATCH_SIZE", "10"),
        ("LOG_LEVEL", "DEBUG"),
        ("LOG_FORMAT", "json"),
    ]))
    .unwrap();

    assert_eq!(config.port, 9000);
    assert_eq!(config.table_name, "presidents");
    assert_eq!(config.database_url.as_deref(), Some("postgres://localhost/models"));
    assert_eq!(config.scan_page_size, Some(25));
    assert_eq!(
        config.event_bus_endpoint.as_ref().map(|u| u.as_str()),
        Some("http://localhost:4010/events")
    );
    assert_eq!(config.event_bus_name.as_deref(), Some("model-bus"));
    assert_eq!(config.event_source, "presidents-api");
    assert_eq!(config.change_feed_batch_size, 10);
    assert_eq!(config.log_level, "debug");
    assert_eq!(config.log_format, LogFormat::Json);
}

#[test]
fn test_legacy_table_name_variable() {
    let config = Config::from_lookup(lookup(&[("DDB_TABLE_NAME", "legacy")])).unwrap();
    assert_eq!(config.table_name, "legacy");

    let config = Config::from_lookup(lookup(&[
        ("DDB_TABLE_NAME", "legacy"),
        ("MODELS_TABLE_NAME", "current"),
    ]))
    .unwrap();
    assert_eq!(config.table_name, "current");
}

#[test]
fn test_empty_values_are_unset() {
    let config = Config::from_lookup(lookup(&[("DATABASE_URL", ""), ("PORT", "  ")])).unwrap();
    assert!(config.database_url.is_none());
    assert_eq!(config.port, DEFAULT_PORT);
}

#[test]
fn test_zero_page_size_means_backend_default() {
    let config = Config::from_lookup(lookup(&[("SCAN_PAGE_SIZE", "0")])).unwrap();
    assert_eq!(config.scan_page_size, None);
}

#[test]
fn test_invalid_port_is_rejected() {
    let err = Config::from_lookup(lookup(&[("PORT", "eighty")])).unwrap_err();
    assert_eq!(
        err,
        ConfigError::InvalidValue {
            name: "PORT".to_string(),
            value: "eighty".to_string()
        }
    );
}

#[test]
fn test_invalid_endpoint_is_rejected() {
    let err = Config::from_lookup(lookup(&[("EVENT_BUS_ENDPOINT", "not a url")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidUrl { .. }));
}

#[test]
fn test_unknown_log_format_is_rejected() {
    let err = Config::from_lookup(lookup(&[("LOG_FORMAT", "xml")])).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
#[serial]
fn test_from_env_reads_process_environment() {
    // SAFETY: serialized with the other environment tests
    unsafe {
        std::env::set_var("MODELS_TABLE_NAME", "from-env");
        std::env::set_var("PORT", "8123");
    }
    let config = Config::from_env().unwrap();
    unsafe {
        std::env::remove_var("MODELS_TABLE_NAME");
        std::env::remove_var("PORT");
    }

    assert_eq!(config.table_name, "from-env");
    assert_eq!(config.port, 8123);
}
