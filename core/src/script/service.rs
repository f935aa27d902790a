// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::collections::HashMap;

use super::{ScoreScriptFactory, ScriptContext, ScriptEngine, ScriptError, ScriptParams};

/// The script engines known to the host, keyed by their kind.
#[derive(Default)]
pub struct ScriptService {
    engines: HashMap<String, Box<dyn ScriptEngine>>,
}

impl std::fmt::Debug for ScriptService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptService")
            .field("kinds", &self.engines.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ScriptService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<E>(&mut self, engine: E) -> Result<(), ScriptError>
    where
        E: ScriptEngine + 'static,
    {
        let kind = engine.kind().to_string();

        if self.engines.contains_key(&kind) {
            return Err(ScriptError::DuplicateKind(kind));
        }

        tracing::debug!(
            kind = %kind,
            contexts = ?engine.supported_contexts(),
            "registered script engine"
        );
        self.engines.insert(kind, Box::new(engine));

        Ok(())
    }

    pub fn engine(&self, kind: &str) -> Option<&dyn ScriptEngine> {
        self.engines.get(kind).map(|engine| engine.as_ref())
    }

    pub fn compile(
        &self,
        kind: &str,
        source: &str,
        context: ScriptContext,
        params: &ScriptParams,
    ) -> Result<Box<dyn ScoreScriptFactory>, ScriptError> {
        let engine = self
            .engine(kind)
            .ok_or_else(|| ScriptError::UnknownKind(kind.to_string()))?;

        engine.compile(source, context, params)
    }

    pub fn close(self) {
        for engine in self.engines.values() {
            engine.close();
        }
    }
}
