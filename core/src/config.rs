// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::path::Path;

use anyhow::Context;

use crate::Result;

pub mod defaults {
    pub struct Script;

    impl Script {
        pub fn kind() -> String {
            "payload".to_string()
        }

        pub fn source() -> String {
            "payload".to_string()
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Config key [{0}] cannot be empty")]
    Empty(&'static str),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Names under which the payload script is exposed to the host.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ScriptEngineConfig {
    /// The script kind (language) the host dispatches on.
    #[serde(default = "defaults::Script::kind")]
    pub kind: String,

    /// The only script body the engine compiles.
    #[serde(default = "defaults::Script::source")]
    pub source: String,
}

impl Default for ScriptEngineConfig {
    fn default() -> Self {
        Self {
            kind: defaults::Script::kind(),
            source: defaults::Script::source(),
        }
    }
}

impl ScriptEngineConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;

        Ok(config)
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config from {}", path.display()))?;

        Ok(Self::from_toml_str(&raw)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.kind.is_empty() {
            return Err(ConfigError::Empty("kind"));
        }

        if self.source.is_empty() {
            return Err(ConfigError::Empty("source"));
        }

        Ok(())
    }
}
