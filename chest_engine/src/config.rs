use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use serde::{Deserialize, Serialize};

use crate::scheduler::TICK_MILLIS;

/// Runtime knobs for the menu engine. Every field has a default so a config
/// file only needs to mention what it changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Milliseconds per host tick; drives `delay`, title batching and
    /// deferred menu closes.
    pub tick_millis: u64,
    /// Raw channel `connect` directives are written to.
    pub proxy_channel: String,
    /// Install the title flush task when the engine starts.
    pub title_flush_enabled: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_millis: TICK_MILLIS,
            proxy_channel: chest_channel::DEFAULT_CHANNEL.to_string(),
            title_flush_enabled: true,
        }
    }
}

impl EngineConfig {
    pub fn from_json_file(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read engine config: {}", path.display()))?;
        let config: EngineConfig = serde_json::from_str(&raw)
            .with_context(|| format!("failed to parse engine config: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        ensure!(self.tick_millis > 0, "tick_millis must be positive");
        ensure!(
            !self.proxy_channel.is_empty(),
            "proxy_channel must not be empty"
        );
        Ok(())
    }

    /// Wait for `ticks` ticks, one millisecond short so the resume lands
    /// inside the target tick rather than after it.
    pub fn delay_millis(&self, ticks: u64) -> u64 {
        self.tick_millis.saturating_mul(ticks).saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn missing_path_yields_defaults() {
        let config = EngineConfig::from_json_file(None).expect("defaults");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.proxy_channel, "BungeeCord");
        assert_eq!(config.delay_millis(2), 99);
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"proxy_channel": "velocity:main"}}"#).expect("write config");
        let config = EngineConfig::from_json_file(Some(file.path())).expect("config loads");
        assert_eq!(config.proxy_channel, "velocity:main");
        assert_eq!(config.tick_millis, TICK_MILLIS);
        assert!(config.title_flush_enabled);
    }

    #[test]
    fn zero_tick_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{"tick_millis": 0}}"#).expect("write config");
        assert!(EngineConfig::from_json_file(Some(file.path())).is_err());
    }
}
