// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::sync::Arc;

use postings::{Index, SegmentReader};
use rayon::prelude::*;

use crate::collector::{ScoredDoc, TopDocs};
use crate::script::{LeafFactory, ScriptContext, ScriptParams, ScriptService};
use crate::Result;

/// An inline script as it appears in a search request.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Script {
    #[serde(rename = "lang")]
    pub kind: String,
    pub source: String,
    #[serde(default)]
    pub params: ScriptParams,
}

impl Script {
    pub fn new(kind: impl Into<String>, source: impl Into<String>, params: ScriptParams) -> Self {
        Self {
            kind: kind.into(),
            source: source.into(),
            params,
        }
    }
}

/// Scores every document of an index with a score script and keeps the best ones.
///
/// Segments are searched in parallel; every segment gets its own script instance
/// which is driven in increasing document order on a single thread.
#[derive(Debug, Clone)]
pub struct Searcher {
    index: Index,
    scripts: Arc<ScriptService>,
}

impl Searcher {
    pub fn new(index: Index, scripts: Arc<ScriptService>) -> Self {
        Self { index, scripts }
    }

    pub fn index(&self) -> &Index {
        &self.index
    }

    pub fn search(&self, script: &Script, top_docs: TopDocs) -> Result<Vec<ScoredDoc>> {
        let factory = self.scripts.compile(
            &script.kind,
            &script.source,
            ScriptContext::Score,
            &ScriptParams::new(),
        )?;

        tracing::debug!(
            kind = %script.kind,
            deterministic = factory.is_result_deterministic(),
            "compiled score script"
        );

        let leaf_factory = factory.new_factory(script.params.clone())?;

        let fruits = self
            .index
            .segments()
            .par_iter()
            .enumerate()
            .map(|(segment_ord, segment)| {
                search_segment(
                    leaf_factory.as_ref(),
                    &**segment,
                    segment_ord as u32,
                    &top_docs,
                )
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(top_docs.merge_fruits(fruits))
    }
}

fn search_segment(
    leaf_factory: &dyn LeafFactory,
    segment: &dyn SegmentReader,
    segment_ord: u32,
    top_docs: &TopDocs,
) -> Result<Vec<ScoredDoc>> {
    let mut script = leaf_factory.new_instance(segment)?;
    let mut collector = top_docs.for_segment(segment_ord);

    for doc in 0..segment.max_doc() {
        script.set_document(doc)?;
        collector.collect(doc, script.execute()?);
    }

    Ok(collector.harvest())
}
