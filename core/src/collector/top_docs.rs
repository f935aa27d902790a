// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::cmp::Ordering;

use itertools::Itertools;
use min_max_heap::MinMaxHeap;
use postings::DocId;

use super::{DocAddress, ScoredDoc};

/// Heap entry ordering documents by score. Among equal scores the document with
/// the lower address ranks higher.
#[derive(Clone, Copy, Debug)]
struct Ranked(ScoredDoc);

impl PartialEq for Ranked {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Ranked {}

impl PartialOrd for Ranked {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Ranked {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .score
            .total_cmp(&other.0.score)
            .then_with(|| other.0.address.cmp(&self.0.address))
    }
}

/// Keeps the `limit` best scored documents of a search.
#[derive(Debug, Clone, Copy)]
pub struct TopDocs {
    limit: usize,
}

impl TopDocs {
    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn for_segment(&self, segment_ord: u32) -> SegmentTopDocs {
        SegmentTopDocs {
            segment_ord,
            limit: self.limit,
            heap: MinMaxHeap::with_capacity(self.limit.saturating_add(1).min(1024)),
        }
    }

    /// Merges the harvested results of every segment into the overall best documents,
    /// ordered by descending score.
    pub fn merge_fruits(&self, fruits: Vec<Vec<ScoredDoc>>) -> Vec<ScoredDoc> {
        fruits
            .into_iter()
            .kmerge_by(|a, b| Ranked(*a) > Ranked(*b))
            .take(self.limit)
            .collect()
    }
}

pub struct SegmentTopDocs {
    segment_ord: u32,
    limit: usize,
    heap: MinMaxHeap<Ranked>,
}

impl SegmentTopDocs {
    pub fn collect(&mut self, doc_id: DocId, score: f64) {
        if self.limit == 0 {
            return;
        }

        self.heap.push(Ranked(ScoredDoc {
            address: DocAddress {
                segment_ord: self.segment_ord,
                doc_id,
            },
            score,
        }));

        if self.heap.len() > self.limit {
            self.heap.pop_min();
        }
    }

    /// The collected documents ordered by descending score.
    pub fn harvest(self) -> Vec<ScoredDoc> {
        self.heap
            .into_vec_desc()
            .into_iter()
            .map(|Ranked(doc)| doc)
            .collect()
    }
}
