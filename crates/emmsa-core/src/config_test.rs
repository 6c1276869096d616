use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

fn store_env<'a>() -> HashMap<&'a str, &'a str> {
    let mut m = HashMap::new();
    m.insert("PANTRY_API_KEY", "test-key-123");
    m
}

#[test]
fn build_store_config_reads_api_key() {
    let map = store_env();
    let cfg = build_store_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_key, "test-key-123");
    assert!(cfg.base_url.is_none());
    assert_eq!(cfg.request_timeout_secs, 30);
}

#[test]
fn build_store_config_fails_without_api_key() {
    let map: HashMap<&str, &str> = HashMap::new();
    let result = build_store_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "PANTRY_API_KEY"),
        "expected MissingEnvVar(PANTRY_API_KEY), got: {result:?}"
    );
}

#[test]
fn missing_api_key_message_names_the_variable() {
    let map: HashMap<&str, &str> = HashMap::new();
    let err = build_store_config(lookup_from_map(&map)).unwrap_err();
    assert!(
        err.to_string()
            .contains("PANTRY_API_KEY environment variable not set"),
        "unexpected message: {err}"
    );
}

#[test]
fn build_store_config_treats_empty_api_key_as_missing() {
    let mut map = HashMap::new();
    map.insert("PANTRY_API_KEY", "  ");
    let result = build_store_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::MissingEnvVar(_))));
}

#[test]
fn build_store_config_base_url_override() {
    let mut map = store_env();
    map.insert("PANTRY_BASE_URL", "http://localhost:9999/apiv1/pantry");
    let cfg = build_store_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.base_url.as_deref(),
        Some("http://localhost:9999/apiv1/pantry")
    );
}

#[test]
fn build_store_config_timeout_override() {
    let mut map = store_env();
    map.insert("PANTRY_REQUEST_TIMEOUT_SECS", "5");
    let cfg = build_store_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.request_timeout_secs, 5);
}

#[test]
fn build_store_config_timeout_invalid() {
    let mut map = store_env();
    map.insert("PANTRY_REQUEST_TIMEOUT_SECS", "not-a-number");
    let result = build_store_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PANTRY_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(PANTRY_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}

#[test]
fn build_store_config_rejects_zero_timeout() {
    let mut map = store_env();
    map.insert("PANTRY_REQUEST_TIMEOUT_SECS", "0");
    let result = build_store_config(lookup_from_map(&map));
    assert!(matches!(result, Err(ConfigError::InvalidEnvVar { .. })));
}

#[test]
fn store_config_debug_redacts_api_key() {
    let map = store_env();
    let cfg = build_store_config(lookup_from_map(&map)).unwrap();
    let debug = format!("{cfg:?}");
    assert!(!debug.contains("test-key-123"));
    assert!(debug.contains("[redacted]"));
}

#[test]
fn build_scraper_config_defaults() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_scraper_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg,
        ScraperConfig {
            endpoint_url: None,
            request_timeout_secs: 30,
        }
    );
}

#[test]
fn build_scraper_config_overrides() {
    let mut map = HashMap::new();
    map.insert("EMMSA_ENDPOINT_URL", "http://localhost:8080/prices");
    map.insert("EMMSA_REQUEST_TIMEOUT_SECS", "12");
    let cfg = build_scraper_config(lookup_from_map(&map)).unwrap();
    assert_eq!(
        cfg.endpoint_url.as_deref(),
        Some("http://localhost:8080/prices")
    );
    assert_eq!(cfg.request_timeout_secs, 12);
}

#[test]
fn build_scraper_config_timeout_invalid() {
    let mut map = HashMap::new();
    map.insert("EMMSA_REQUEST_TIMEOUT_SECS", "-1");
    let result = build_scraper_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "EMMSA_REQUEST_TIMEOUT_SECS"),
        "expected InvalidEnvVar(EMMSA_REQUEST_TIMEOUT_SECS), got: {result:?}"
    );
}
