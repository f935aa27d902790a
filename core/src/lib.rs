// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

//! A `payload` score script.
//!
//! Instead of the lexical relevance of a query, documents are scored by the
//! float payloads attached to the occurrences of a single term. For every
//! segment the host asks the compiled script for a fresh
//! [`PayloadScoreScript`], positions it with
//! [`ScoreScript::set_document`] in increasing document order and reads the
//! score with [`ScoreScript::execute`]: the sum of the big-endian `f32`
//! payloads of the term's occurrences in that document.

pub mod collector;
pub mod config;
pub mod payload;
pub mod scorer;
pub mod script;
pub mod searcher;

pub use collector::{DocAddress, ScoredDoc, TopDocs};
pub use config::ScriptEngineConfig;
pub use scorer::{PayloadScoreScript, ScoreError, ScoreScript, ScorerState};
pub use script::{
    LeafFactory, PayloadLeafFactory, PayloadScoreFactory, PayloadScriptEngine, ScoreScriptFactory,
    ScriptContext, ScriptEngine, ScriptError, ScriptParams, ScriptService,
};
pub use searcher::{Script, Searcher};

pub(crate) type Result<T, E = anyhow::Error> = std::result::Result<T, E>;
