//! Engine configuration: defaults a script document may leave out, plus the
//! user-visible fallback line.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use biome_core::ScriptDocument;
use biome_engine::TAG_DEPTH;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BotConfig {
    /// Emitted when a turn produces no renderable text.
    pub fallback_reply: String,
    /// Defaults applied to cells whose script leaves them unset.
    pub precision: f32,
    pub retention: f32,
    pub refractory: u32,
    /// Nesting limit for `{TAG}` expansion in the decoders.
    pub tag_depth: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            fallback_reply: "・・・".to_string(),
            precision: 0.3,
            retention: 0.7,
            refractory: 4,
            tag_depth: TAG_DEPTH,
        }
    }
}

impl BotConfig {
    /// Load config from a TOML file, falling back to defaults for missing
    /// fields. Env var overrides are applied after loading.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("reading config file {}", path.as_ref().display()))?;
        let mut config: BotConfig =
            toml::from_str(&content).with_context(|| "parsing TOML config")?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Try to load from path; if the file is missing or invalid, return
    /// defaults with env overrides.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                tracing::info!("config file not found or invalid ({e}), using defaults");
                let mut config = Self::default();
                config.apply_env_overrides();
                config
            }
        }
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("BIOMEBOT_FALLBACK_REPLY") {
            self.fallback_reply = v;
        }
        if let Ok(v) = std::env::var("BIOMEBOT_TAG_DEPTH") {
            if let Ok(n) = v.parse() {
                self.tag_depth = n;
            }
        }
    }

    /// Fill a document's unset thresholds from the config defaults.
    pub fn apply_defaults(&self, doc: &mut ScriptDocument) {
        doc.precision.get_or_insert(self.precision);
        doc.retention.get_or_insert(self.retention);
        doc.refractory.get_or_insert(self.refractory);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let config = BotConfig::load_or_default("/nonexistent/biomebot.toml");
        assert_eq!(config.precision, 0.3);
        assert_eq!(config.tag_depth, TAG_DEPTH);
    }

    #[test]
    fn partial_toml_keeps_the_rest_default() {
        let config: BotConfig = toml::from_str("fallback_reply = \"うーん\"").unwrap();
        assert_eq!(config.fallback_reply, "うーん");
        assert_eq!(config.refractory, 4);
    }
}
