// Copyright (c) 2025 Ralf Anton Beier
// Licensed under the MIT license.
// SPDX-License-Identifier: MIT

//! Bridge configuration.

use hostlink_error::{Error, Result};
use hostlink_logging::LogLevel;
use serde::{Deserialize, Serialize};

/// Import namespace used when none is configured
pub const DEFAULT_IMPORT_MODULE: &str = "hostlink";

/// `log` target for messages raised by module code
pub const DEFAULT_LOG_TARGET: &str = "hostlink::module";

/// Settings for a [`Bridge`](crate::Bridge)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    /// Namespace the import functions are registered under
    pub import_module: String,
    /// Upper bound on handle table slots, sentinels included
    pub max_handles: Option<u32>,
    /// Size the first string allocation for ASCII and grow on demand
    pub ascii_fast_path: bool,
    /// `log` target for module log and error messages
    pub log_target: String,
    /// Tag attached to module log messages
    pub component_id: Option<String>,
    /// Module messages below this level are dropped
    pub min_log_level: String,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            import_module: DEFAULT_IMPORT_MODULE.to_string(),
            max_handles: None,
            ascii_fast_path: true,
            log_target: DEFAULT_LOG_TARGET.to_string(),
            component_id: None,
            min_log_level: LogLevel::Trace.as_str().to_string(),
        }
    }
}

impl BridgeConfig {
    /// Parse a configuration from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns a parse error for malformed JSON or mistyped fields
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| {
            log::error!("invalid bridge configuration: {e}");
            Error::config_parse_error("Invalid bridge configuration")
        })?;
        config.log_level_threshold()?;
        Ok(config)
    }

    /// The parsed minimum module log level
    ///
    /// # Errors
    ///
    /// Returns a parse error when `min_log_level` names no level
    pub fn log_level_threshold(&self) -> Result<LogLevel> {
        self.min_log_level.parse().map_err(|e| {
            log::error!("invalid bridge configuration: {e}");
            Error::config_parse_error("Invalid minimum log level")
        })
    }

    /// Serialize to JSON
    ///
    /// # Errors
    ///
    /// Returns a parse error if serialization fails
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|_| Error::config_parse_error("Could not serialize bridge configuration"))
    }

    /// Set the import namespace
    #[must_use]
    pub fn with_import_module(mut self, name: &str) -> Self {
        self.import_module = name.to_string();
        self
    }

    /// Cap the handle table
    #[must_use]
    pub fn with_max_handles(mut self, max: u32) -> Self {
        self.max_handles = Some(max);
        self
    }

    /// Toggle the ASCII-first string allocation
    #[must_use]
    pub fn with_ascii_fast_path(mut self, enabled: bool) -> Self {
        self.ascii_fast_path = enabled;
        self
    }

    /// Set the `log` target for module messages
    #[must_use]
    pub fn with_log_target(mut self, target: &str) -> Self {
        self.log_target = target.to_string();
        self
    }

    /// Tag module log messages
    #[must_use]
    pub fn with_component_id(mut self, id: &str) -> Self {
        self.component_id = Some(id.to_string());
        self
    }

    /// Drop module messages below `level`
    #[must_use]
    pub fn with_min_log_level(mut self, level: LogLevel) -> Self {
        self.min_log_level = level.as_str().to_string();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = BridgeConfig::default();
        assert_eq!(config.import_module, "hostlink");
        assert_eq!(config.log_target, "hostlink::module");
        assert!(config.ascii_fast_path);
        assert_eq!(config.max_handles, None);
        assert_eq!(config.log_level_threshold().unwrap(), LogLevel::Trace);
    }

    #[test]
    fn test_min_log_level_from_json() {
        let config = BridgeConfig::from_json(r#"{ "min_log_level": "Warning" }"#).unwrap();
        assert_eq!(config.log_level_threshold().unwrap(), LogLevel::Warn);

        let err = BridgeConfig::from_json(r#"{ "min_log_level": "loud" }"#).unwrap_err();
        assert!(err.is_parse_error());
        assert_eq!(err.code, hostlink_error::codes::CONFIG_PARSE_ERROR);
    }

    #[test]
    fn test_from_json_partial() {
        let config = BridgeConfig::from_json(r#"{ "max_handles": 128, "component_id": "ui" }"#)
            .unwrap();
        assert_eq!(config.max_handles, Some(128));
        assert_eq!(config.component_id.as_deref(), Some("ui"));
        assert_eq!(config.import_module, DEFAULT_IMPORT_MODULE);
    }

    #[test]
    fn test_from_json_rejects_bad_input() {
        let err = BridgeConfig::from_json(r#"{ "max_handles": "lots" }"#).unwrap_err();
        assert!(err.is_parse_error());
        assert!(BridgeConfig::from_json("not json").is_err());
    }

    #[test]
    fn test_json_round_trip() {
        let config = BridgeConfig::default()
            .with_import_module("env")
            .with_ascii_fast_path(false)
            .with_log_target("app::wasm")
            .with_min_log_level(LogLevel::Error);
        let parsed = BridgeConfig::from_json(&config.to_json().unwrap()).unwrap();
        assert_eq!(parsed, config);
    }
}
