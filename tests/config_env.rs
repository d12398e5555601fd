//! Environment-driven configuration. These tests mutate process-wide
//! variables, so they run serially.

use ferrous_inject::{Graph, GraphConfig, InjectError, TeardownOrder, TypeRegistry};
use serial_test::serial;
use std::env;

const KEYS: [&str; 3] = ["INJECT_MAX_DEPTH", "INJECT_DETECT_CYCLES", "INJECT_TEARDOWN"];

fn clear_env() {
    for key in KEYS {
        env::remove_var(key);
    }
}

#[test]
#[serial]
fn test_defaults_without_variables() {
    clear_env();
    assert_eq!(GraphConfig::from_env().unwrap(), GraphConfig::default());
}

#[test]
#[serial]
fn test_variables_override_defaults() {
    clear_env();
    env::set_var("INJECT_MAX_DEPTH", "32");
    env::set_var("INJECT_DETECT_CYCLES", "false");
    env::set_var("INJECT_TEARDOWN", "registration");

    let config = GraphConfig::from_env().unwrap();
    clear_env();

    assert_eq!(
        config,
        GraphConfig {
            max_depth: 32,
            detect_cycles: false,
            teardown: TeardownOrder::Registration,
        }
    );

    let graph = Graph::with_config(TypeRegistry::new(), config.clone());
    assert_eq!(graph.config(), &config);
}

#[test]
#[serial]
fn test_partial_variables() {
    clear_env();
    env::set_var("INJECT_DETECT_CYCLES", " YES ");

    let config = GraphConfig::from_env().unwrap();
    clear_env();

    assert!(config.detect_cycles);
    assert_eq!(config.max_depth, 256);
    assert_eq!(config.teardown, TeardownOrder::Reverse);
}

#[test]
#[serial]
fn test_invalid_variables_are_reported() {
    clear_env();
    env::set_var("INJECT_DETECT_CYCLES", "maybe");
    let result = GraphConfig::from_env();
    clear_env();

    match result {
        Err(InjectError::Config(message)) => assert!(message.contains("DETECT_CYCLES")),
        other => panic!("expected a config error, got {other:?}"),
    }
}

#[cfg(feature = "config")]
#[test]
fn test_json_fills_missing_fields() {
    let config = GraphConfig::from_json(r#"{ "max_depth": 8, "detect_cycles": false }"#).unwrap();
    assert_eq!(config.max_depth, 8);
    assert!(!config.detect_cycles);
    assert_eq!(config.teardown, TeardownOrder::Reverse);

    assert!(matches!(GraphConfig::from_json("{ nope"), Err(InjectError::Config(_))));
}
