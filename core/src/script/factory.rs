// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use postings::{PostingsFlags, SegmentReader, Term};

use crate::scorer::{PayloadScoreScript, ScoreError, ScoreScript};

use super::{LeafFactory, ScoreScriptFactory, ScriptError, ScriptParams};

/// The compiled payload script.
#[derive(Debug, Clone, Copy, Default)]
pub struct PayloadScoreFactory;

impl ScoreScriptFactory for PayloadScoreFactory {
    fn is_result_deterministic(&self) -> bool {
        true
    }

    fn new_factory(&self, params: ScriptParams) -> Result<Box<dyn LeafFactory>, ScriptError> {
        Ok(Box::new(PayloadLeafFactory::new(params)?))
    }
}

/// The payload script bound to the `field` and `term` it scores.
#[derive(Debug, Clone)]
pub struct PayloadLeafFactory {
    params: ScriptParams,
    term: Term,
}

impl PayloadLeafFactory {
    pub fn new(params: ScriptParams) -> Result<Self, ScriptError> {
        let field = required_param(&params, "field")?;
        let term = required_param(&params, "term")?;

        Ok(Self {
            term: Term::new(field, term),
            params,
        })
    }

    pub fn field(&self) -> &str {
        self.term.field()
    }

    pub fn term(&self) -> &Term {
        &self.term
    }

    pub fn params(&self) -> &ScriptParams {
        &self.params
    }

    /// Opens a scorer for `segment`. Segments without the term get a scorer that
    /// scores every document `0.0`.
    pub fn new_scorer(
        &self,
        segment: &dyn SegmentReader,
    ) -> Result<PayloadScoreScript, ScoreError> {
        let postings = segment
            .postings(&self.term, PostingsFlags::Payloads)
            .map_err(|source| ScoreError::Io {
                term: self.term.clone(),
                source,
            })?;

        let Some(postings) = postings else {
            tracing::debug!(
                segment = %segment.segment_id(),
                term = %self.term,
                "term not in segment"
            );
            return Ok(PayloadScoreScript::Empty);
        };

        if !segment.has_payloads(self.field()) {
            tracing::info!(
                segment = %segment.segment_id(),
                field = self.field(),
                "No payloads for field"
            );
        }

        Ok(PayloadScoreScript::active(self.term.clone(), postings))
    }
}

fn required_param(params: &ScriptParams, name: &'static str) -> Result<String, ScriptError> {
    let value = params
        .get_string(name)
        .ok_or(ScriptError::MissingParameter(name))?;

    if value.is_empty() {
        return Err(ScriptError::InvalidParameter(name));
    }

    Ok(value)
}

impl LeafFactory for PayloadLeafFactory {
    fn needs_score(&self) -> bool {
        false
    }

    fn new_instance(
        &self,
        segment: &dyn SegmentReader,
    ) -> Result<Box<dyn ScoreScript>, ScoreError> {
        Ok(Box::new(self.new_scorer(segment)?))
    }
}
