// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

mod top_docs;

use postings::DocId;

pub use top_docs::{SegmentTopDocs, TopDocs};

/// Identifies a document across the segments of an index.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
pub struct DocAddress {
    pub segment_ord: u32,
    pub doc_id: DocId,
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScoredDoc {
    pub address: DocAddress,
    pub score: f64,
}
