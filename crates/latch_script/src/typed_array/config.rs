//! Startup configuration for the typed array bridge

use crate::typed_array::backend::{BackendMode, TypedArrayBackend};
use crate::typed_array::bridge::TypedArrayBridge;
use crate::typed_array::error::BridgeError;
use crate::typed_array::registry;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable overriding the configured mode.
pub const MODE_ENV: &str = "LATCH_TYPED_ARRAY_MODE";

/// Typed array bridge settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BridgeConfig {
    pub mode: BackendMode,
}

impl BridgeConfig {
    pub fn from_json(source: &str) -> Result<Self, BridgeError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Defaults, with the mode taken from `LATCH_TYPED_ARRAY_MODE` if set.
    pub fn from_env() -> Result<Self, BridgeError> {
        let mut config = Self::default();
        config.apply_env()?;
        Ok(config)
    }

    /// Read `path` when given, then apply the environment override.
    pub fn load(path: Option<&Path>) -> Result<Self, BridgeError> {
        let mut config = match path {
            Some(path) => Self::from_json(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    fn apply_env(&mut self) -> Result<(), BridgeError> {
        match std::env::var(MODE_ENV) {
            Ok(raw) => self.apply_override(&raw),
            Err(std::env::VarError::NotPresent) => Ok(()),
            Err(err) => Err(BridgeError::Config(format!("{MODE_ENV}: {err}"))),
        }
    }

    fn apply_override(&mut self, raw: &str) -> Result<(), BridgeError> {
        if raw.trim().is_empty() {
            return Ok(());
        }
        let mode: BackendMode = raw.parse()?;
        if mode != self.mode {
            tracing::debug!(
                from = %self.mode,
                to = %mode,
                "typed array mode overridden by environment"
            );
        }
        self.mode = mode;
        Ok(())
    }

    pub fn build_backend(&self) -> Box<dyn TypedArrayBackend> {
        self.mode.backend()
    }

    pub fn bridge(&self) -> TypedArrayBridge {
        TypedArrayBridge::new(self.build_backend())
    }

    /// Build the configured backend and make it the process-wide one.
    pub fn install(&self) -> Result<&'static TypedArrayBridge, BridgeError> {
        registry::install(self.bridge())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_no_copy() {
        assert_eq!(BridgeConfig::default().mode, BackendMode::NoCopy);
    }

    #[test]
    fn parses_kebab_case_modes() {
        let config = BridgeConfig::from_json(r#"{ "mode": "copy-out" }"#).unwrap();
        assert_eq!(config.mode, BackendMode::CopyOut);

        let config = BridgeConfig::from_json("{}").unwrap();
        assert_eq!(config.mode, BackendMode::NoCopy);
    }

    #[test]
    fn rejects_unknown_modes() {
        let err = BridgeConfig::from_json(r#"{ "mode": "shared" }"#).unwrap_err();
        assert!(matches!(err, BridgeError::Json(_)));
    }

    #[test]
    fn override_replaces_mode() {
        let mut config = BridgeConfig::default();
        config.apply_override("copy-out").unwrap();
        assert_eq!(config.mode, BackendMode::CopyOut);

        config.apply_override("  ").unwrap();
        assert_eq!(config.mode, BackendMode::CopyOut);

        assert!(matches!(config.apply_override("bogus"), Err(BridgeError::Config(_))));
    }

    #[test]
    fn serializes_round_trip() {
        let config = BridgeConfig { mode: BackendMode::CopyOut };
        let json = serde_json::to_string(&config).unwrap();
        assert_eq!(json, r#"{"mode":"copy-out"}"#);
        assert_eq!(BridgeConfig::from_json(&json).unwrap(), config);
    }

    #[test]
    fn bridge_uses_configured_mode() {
        let config = BridgeConfig { mode: BackendMode::CopyOut };
        assert_eq!(config.bridge().mode(), BackendMode::CopyOut);
    }
}
