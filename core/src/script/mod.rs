// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

mod factory;
mod params;
mod service;

use std::fmt;

use postings::SegmentReader;

use crate::config::ScriptEngineConfig;
use crate::scorer::{ScoreError, ScoreScript};

pub use factory::{PayloadLeafFactory, PayloadScoreFactory};
pub use params::ScriptParams;
pub use service::ScriptService;

/// The host contexts a script can be compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScriptContext {
    /// Per-document scoring.
    Score,
    Filter,
    #[serde(rename = "aggs")]
    Aggregation,
    Update,
    Ingest,
}

impl ScriptContext {
    pub fn name(&self) -> &'static str {
        match self {
            ScriptContext::Score => "score",
            ScriptContext::Filter => "filter",
            ScriptContext::Aggregation => "aggs",
            ScriptContext::Update => "update",
            ScriptContext::Ingest => "ingest",
        }
    }
}

impl fmt::Display for ScriptContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("{kind} scripts cannot be used for context [{context}]")]
    UnsupportedContext {
        kind: String,
        context: ScriptContext,
    },

    #[error("Unknown script name {0}")]
    UnknownScript(String),

    #[error("Missing parameter [{0}]")]
    MissingParameter(&'static str),

    #[error("Parameter [{0}] cannot be empty")]
    InvalidParameter(&'static str),

    #[error("No script engine registered for kind [{0}]")]
    UnknownKind(String),

    #[error("A script engine for kind [{0}] is already registered")]
    DuplicateKind(String),
}

/// A script language the host can compile scripts with.
pub trait ScriptEngine: Send + Sync {
    /// The name the host dispatches scripts on.
    fn kind(&self) -> &str;

    fn compile(
        &self,
        source: &str,
        context: ScriptContext,
        params: &ScriptParams,
    ) -> Result<Box<dyn ScoreScriptFactory>, ScriptError>;

    fn supported_contexts(&self) -> &[ScriptContext];

    fn close(&self) {}
}

/// A compiled score script, bound to its parameters once per query.
pub trait ScoreScriptFactory: Send + Sync {
    /// Whether the same document always gets the same score, so the host may
    /// cache results.
    fn is_result_deterministic(&self) -> bool {
        false
    }

    fn new_factory(&self, params: ScriptParams) -> Result<Box<dyn LeafFactory>, ScriptError>;
}

/// Creates one [`ScoreScript`] per segment.
pub trait LeafFactory: Send + Sync {
    /// Whether the scripts consume the score of the underlying query.
    fn needs_score(&self) -> bool;

    fn new_instance(&self, segment: &dyn SegmentReader) -> Result<Box<dyn ScoreScript>, ScoreError>;
}

/// Scores documents by the payloads of a term. Compiles exactly one script body,
/// and only for the [`ScriptContext::Score`] context.
#[derive(Debug, Clone, Default)]
pub struct PayloadScriptEngine {
    config: ScriptEngineConfig,
}

impl PayloadScriptEngine {
    pub fn new(config: ScriptEngineConfig) -> Self {
        Self { config }
    }

    pub fn source(&self) -> &str {
        &self.config.source
    }
}

impl ScriptEngine for PayloadScriptEngine {
    fn kind(&self) -> &str {
        &self.config.kind
    }

    fn compile(
        &self,
        source: &str,
        context: ScriptContext,
        _params: &ScriptParams,
    ) -> Result<Box<dyn ScoreScriptFactory>, ScriptError> {
        if context != ScriptContext::Score {
            return Err(ScriptError::UnsupportedContext {
                kind: self.kind().to_string(),
                context,
            });
        }

        // the script source is the script identifier
        if source != self.config.source {
            return Err(ScriptError::UnknownScript(source.to_string()));
        }

        tracing::debug!(kind = self.kind(), source, "compiled payload script");

        Ok(Box::new(PayloadScoreFactory))
    }

    fn supported_contexts(&self) -> &[ScriptContext] {
        &[ScriptContext::Score]
    }
}
