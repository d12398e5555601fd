//! Graph configuration from code, the environment, or JSON.

use std::env;

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use crate::error::{InjectError, InjectResult};

const ENV_PREFIX: &str = "INJECT";

/// Order in which [`Graph::finalize`](crate::Graph::finalize) visits definitions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(rename_all = "lowercase"))]
pub enum TeardownOrder {
    /// Last registered first
    #[default]
    Reverse,
    /// First registered first
    Registration,
}

impl std::str::FromStr for TeardownOrder {
    type Err = InjectError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        match text.trim().to_ascii_lowercase().as_str() {
            "reverse" => Ok(TeardownOrder::Reverse),
            "registration" => Ok(TeardownOrder::Registration),
            other => Err(InjectError::Config(format!(
                "unknown teardown order {other:?}, expected \"reverse\" or \"registration\""
            ))),
        }
    }
}

/// Resolution limits and teardown behaviour for a [`Graph`](crate::Graph).
///
/// # Examples
///
/// ```
/// use ferrous_inject::{GraphConfig, TeardownOrder};
///
/// let config = GraphConfig::default()
///     .with_max_depth(64)
///     .with_teardown(TeardownOrder::Registration);
/// assert_eq!(config.max_depth, 64);
/// assert!(config.detect_cycles);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct GraphConfig {
    /// Deepest chain of nested definition resolutions allowed.
    ///
    /// Every level recurses on the calling thread's stack. The default of 256
    /// fits a 2 MiB thread; raise it only on threads with larger stacks.
    pub max_depth: usize,
    /// Fail with a cycle error instead of recursing until `max_depth`
    pub detect_cycles: bool,
    pub teardown: TeardownOrder,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            max_depth: 256,
            detect_cycles: true,
            teardown: TeardownOrder::Reverse,
        }
    }
}

impl GraphConfig {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_cycle_detection(mut self, enabled: bool) -> Self {
        self.detect_cycles = enabled;
        self
    }

    pub fn with_teardown(mut self, teardown: TeardownOrder) -> Self {
        self.teardown = teardown;
        self
    }

    /// Reads `INJECT_MAX_DEPTH`, `INJECT_DETECT_CYCLES` and `INJECT_TEARDOWN`,
    /// keeping the default for any variable that is not set.
    pub fn from_env() -> InjectResult<Self> {
        Self::from_lookup(|key| env::var(format!("{ENV_PREFIX}_{key}")).ok())
    }

    /// Builds a config from any key lookup; keys are given without prefix.
    pub fn from_lookup<F>(lookup: F) -> InjectResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(value) = lookup("MAX_DEPTH") {
            config.max_depth = value.trim().parse().map_err(|_| {
                InjectError::Config(format!("MAX_DEPTH must be a positive integer, found {value:?}"))
            })?;
        }
        if let Some(value) = lookup("DETECT_CYCLES") {
            config.detect_cycles = parse_bool(&value).ok_or_else(|| {
                InjectError::Config(format!("DETECT_CYCLES must be a boolean, found {value:?}"))
            })?;
        }
        if let Some(value) = lookup("TEARDOWN") {
            config.teardown = value.parse()?;
        }

        tracing::debug!(target: "ferrous_inject", ?config, "loaded graph configuration");
        Ok(config)
    }

    /// Parses a JSON document; missing fields keep their defaults.
    #[cfg(feature = "config")]
    pub fn from_json(text: &str) -> InjectResult<Self> {
        serde_json::from_str(text).map_err(|err| InjectError::Config(err.to_string()))
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_keys_keep_defaults() {
        let config = GraphConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, GraphConfig::default());
    }

    #[test]
    fn all_keys_are_read() {
        let config = GraphConfig::from_lookup(lookup(&[
            ("MAX_DEPTH", "12"),
            ("DETECT_CYCLES", "off"),
            ("TEARDOWN", "Registration"),
        ]))
        .unwrap();
        assert_eq!(config.max_depth, 12);
        assert!(!config.detect_cycles);
        assert_eq!(config.teardown, TeardownOrder::Registration);
    }

    #[test]
    fn bad_values_are_config_errors() {
        assert!(matches!(
            GraphConfig::from_lookup(lookup(&[("MAX_DEPTH", "deep")])),
            Err(InjectError::Config(_))
        ));
        assert!(matches!(
            GraphConfig::from_lookup(lookup(&[("TEARDOWN", "sideways")])),
            Err(InjectError::Config(_))
        ));
    }

    #[cfg(feature = "config")]
    #[test]
    fn json_fills_missing_fields_with_defaults() {
        let config = GraphConfig::from_json(r#"{ "teardown": "registration" }"#).unwrap();
        assert_eq!(config.max_depth, 256);
        assert_eq!(config.teardown, TeardownOrder::Registration);
    }
}
