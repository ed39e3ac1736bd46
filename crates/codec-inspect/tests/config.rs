// crates/codec-inspect/tests/config.rs
use std::collections::HashMap;

use codec_inspect::config::Config;
use codec_protocol::Dialect;

fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[test]
fn defaults() {
    let config = Config::default();
    assert_eq!(config.dialect().unwrap(), Dialect::V2);
    assert_eq!(config.log, "warn");
    assert!(config.pretty);
}

#[test]
fn toml_file_overrides_defaults() {
    let config = Config::from_toml("dialect = \"v1\"\npretty = false\n").unwrap();
    assert_eq!(config.dialect().unwrap(), Dialect::V1);
    assert!(!config.pretty);
    assert_eq!(config.log, "warn", "unset keys keep their defaults");
}

#[test]
fn toml_file_with_bad_dialect_is_rejected() {
    assert!(Config::from_toml("dialect = \"v9\"").is_err());
    assert!(Config::from_toml("pretty = \"maybe\"").is_err());
}

#[test]
fn environment_overrides_file() {
    let mut config = Config::from_toml("dialect = \"v1\"\nlog = \"info\"").unwrap();
    let vars = env(&[
        ("INSPECT_DIALECT", "2"),
        ("INSPECT_LOG", "codec_protocol=trace"),
        ("INSPECT_PRETTY", "false"),
    ]);
    config.apply_overrides(|k| vars.get(k).cloned()).unwrap();

    assert_eq!(config.dialect().unwrap(), Dialect::V2);
    assert_eq!(config.log, "codec_protocol=trace");
    assert!(!config.pretty);
}

#[test]
fn invalid_environment_values_are_errors() {
    let mut config = Config::default();
    let vars = env(&[("INSPECT_PRETTY", "sometimes")]);
    assert!(config.apply_overrides(|k| vars.get(k).cloned()).is_err());

    let mut config = Config::default();
    let vars = env(&[("INSPECT_DIALECT", "v3")]);
    assert!(config.apply_overrides(|k| vars.get(k).cloned()).is_err());
}

#[test]
fn missing_config_file_is_an_error() {
    let path = std::path::Path::new("/nonexistent/codec-inspect.toml");
    assert!(Config::load(Some(path)).is_err());
}
