//! Tests for config loading, defaults and the required-field table.

use std::io::Write;

use super::Config;
use crate::error::SyncError;

fn minimal_json() -> serde_json::Value {
    serde_json::json!({
        "steam_user_id64": 76561198000000000u64,
        "steam_api_key": "key",
        "spreadsheet_id": "sheet-id",
        "sheets_api_token": "token"
    })
}

fn load_value(value: serde_json::Value) -> crate::error::Result<Config> {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    write!(tmp, "{value}").unwrap();
    Config::load(tmp.path())
}

#[test]
fn minimal_config_gets_defaults() {
    let cfg = load_value(minimal_json()).unwrap();

    assert_eq!(cfg.median_price_days, 7);
    assert_eq!(cfg.currency, "EUR");
    assert_eq!(cfg.decimal_separator, ",");
    assert_eq!(cfg.last_updated_cell, "G2");
    assert_eq!(cfg.error_cell, "M2");
    assert_eq!(cfg.total_value_cell, "M4");
    assert_eq!(cfg.difference_cell, "M5");
    assert_eq!(cfg.starting_row, 9);
    assert_eq!(cfg.item_column, "B");
    assert_eq!(cfg.amount_column, "F");
    assert_eq!(cfg.single_price_column, "H");
    assert_eq!(cfg.total_price_column, "J");
    assert_eq!(cfg.update_interval_hours, 12);
    assert_eq!(cfg.retry_minutes, 30);
    assert_eq!(cfg.marker_retry_secs, 60);
    assert_eq!(cfg.cooldown_minutes, 5);
    assert_eq!(cfg.steam_requests_per_minute, 15);
    assert_eq!(cfg.market_requests_per_hour, 1000);
    assert_eq!(cfg.pricing_pause_every, 20);
    assert_eq!(cfg.pricing_pause_secs, 60);
}

#[test]
fn explicit_values_override_defaults() {
    let mut value = minimal_json();
    value["currency"] = "USD".into();
    value["update_interval_hours"] = 6.into();
    value["starting_row"] = 3.into();

    let cfg = load_value(value).unwrap();
    assert_eq!(cfg.currency, "USD");
    assert_eq!(cfg.update_interval_hours, 6);
    assert_eq!(cfg.starting_row, 3);
}

#[test]
fn missing_required_fields_are_all_reported() {
    let result = load_value(serde_json::json!({}));

    match result {
        Err(SyncError::Configuration(msg)) => {
            assert!(msg.contains("steam_user_id64"), "got: {msg}");
            assert!(msg.contains("steam_api_key"), "got: {msg}");
            assert!(msg.contains("spreadsheet_id"), "got: {msg}");
            assert!(msg.contains("sheets_api_token"), "got: {msg}");
        }
        other => panic!("Expected Configuration error, got: {other:?}"),
    }
}

#[test]
fn whitespace_only_required_field_is_rejected() {
    let mut value = minimal_json();
    value["steam_api_key"] = "   ".into();

    let result = load_value(value);
    match result {
        Err(SyncError::Configuration(msg)) => {
            assert!(msg.contains("steam_api_key"), "got: {msg}");
        }
        other => panic!("Expected Configuration error, got: {other:?}"),
    }
}

#[test]
fn unsupported_currency_is_rejected() {
    let mut value = minimal_json();
    value["currency"] = "XXX".into();

    let result = load_value(value);
    match result {
        Err(SyncError::Configuration(msg)) => {
            assert!(msg.contains("XXX"), "got: {msg}");
        }
        other => panic!("Expected Configuration error, got: {other:?}"),
    }
}

#[test]
fn zero_update_interval_is_rejected() {
    let mut value = minimal_json();
    value["update_interval_hours"] = 0.into();

    assert!(load_value(value).is_err());
}

#[test]
fn missing_file_is_a_configuration_error() {
    let result = Config::load(std::path::Path::new("/nonexistent/.config.json"));
    assert!(matches!(result, Err(SyncError::Configuration(_))));
}

#[test]
fn malformed_json_is_a_configuration_error() {
    let mut tmp = tempfile::NamedTempFile::new().unwrap();
    write!(tmp, "{{ not valid json").unwrap();

    let result = Config::load(tmp.path());
    assert!(matches!(result, Err(SyncError::Configuration(_))));
}
