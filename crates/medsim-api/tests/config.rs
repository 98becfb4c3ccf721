use std::collections::HashMap;
use std::time::Duration;

use medsim_api::config::{ApiConfig, DEFAULT_MODEL_ID};

fn config_from(vars: &[(&str, &str)]) -> eyre::Result<ApiConfig> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    ApiConfig::from_lookup(|key| vars.get(key).cloned())
}

#[test]
fn defaults_apply_when_unset() {
    let config = config_from(&[]).unwrap();
    assert_eq!(config.bind_addr.port(), 3000);
    assert!(!config.bedrock_enabled);
    assert_eq!(config.model_id, DEFAULT_MODEL_ID);
    assert_eq!(config.region, "us-east-1");
    assert_eq!(config.generator_timeout, Duration::from_millis(8_000));
    assert_eq!(config.history_window, 10);
    assert!(config.case_dir.is_none());
}

#[test]
fn values_are_read_from_the_environment() {
    let config = config_from(&[
        ("MEDSIM_BIND_ADDR", "127.0.0.1:8080"),
        ("MEDSIM_BEDROCK_ENABLED", "true"),
        ("MEDSIM_GENERATOR_TIMEOUT_MS", "2500"),
        ("MEDSIM_FALLBACK_SEED", "99"),
        ("MEDSIM_HISTORY_WINDOW", "4"),
        ("MEDSIM_CASE_DIR", "/srv/cases"),
        ("AWS_REGION", "eu-west-1"),
    ])
    .unwrap();

    assert_eq!(config.bind_addr.to_string(), "127.0.0.1:8080");
    assert!(config.bedrock_enabled);
    assert_eq!(config.generator_timeout, Duration::from_millis(2_500));
    assert_eq!(config.fallback_seed, 99);
    assert_eq!(config.history_window, 4);
    assert_eq!(config.case_dir.unwrap().to_str(), Some("/srv/cases"));
    assert_eq!(config.region, "eu-west-1");
}

#[test]
fn malformed_values_are_rejected() {
    let err = config_from(&[("MEDSIM_GENERATOR_TIMEOUT_MS", "soon")]).unwrap_err();
    assert!(err.to_string().contains("MEDSIM_GENERATOR_TIMEOUT_MS"));

    assert!(config_from(&[("MEDSIM_BEDROCK_ENABLED", "maybe")]).is_err());
    assert!(config_from(&[("MEDSIM_BIND_ADDR", "not-an-addr")]).is_err());
}
