// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::sync::Arc;

use crate::analyzer::DelimitedPayloadAnalyzer;
use crate::segment::{Segment, SegmentId, SegmentReader};
use crate::writer::{Document, SegmentWriter};
use crate::Result;

/// A searchable snapshot: the list of committed segments.
#[derive(Debug, Clone, Default)]
pub struct Index {
    segments: Vec<Arc<Segment>>,
}

impl Index {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self {
            segments: segments.into_iter().map(Arc::new).collect(),
        }
    }

    pub fn segments(&self) -> &[Arc<Segment>] {
        &self.segments
    }

    pub fn num_docs(&self) -> u64 {
        self.segments
            .iter()
            .map(|segment| segment.max_doc() as u64)
            .sum()
    }
}

/// Buffers documents and turns them into a new immutable segment on every commit.
pub struct IndexWriter {
    analyzer: DelimitedPayloadAnalyzer,
    segments: Vec<Arc<Segment>>,
    current: SegmentWriter,
    next_segment_id: u32,
}

impl Default for IndexWriter {
    fn default() -> Self {
        Self::new(DelimitedPayloadAnalyzer::default())
    }
}

impl IndexWriter {
    pub fn new(analyzer: DelimitedPayloadAnalyzer) -> Self {
        Self {
            current: SegmentWriter::with_analyzer(SegmentId(0), analyzer.clone()),
            analyzer,
            segments: Vec::new(),
            next_segment_id: 1,
        }
    }

    pub fn add_document(&mut self, doc: Document) -> Result<()> {
        self.current.add_document(doc)?;
        Ok(())
    }

    /// Flushes the buffered documents into a segment and returns a snapshot of all
    /// committed segments. Committing without buffered documents creates no segment.
    pub fn commit(&mut self) -> Index {
        if !self.current.is_empty() {
            let id = SegmentId(self.next_segment_id);
            self.next_segment_id += 1;

            let writer = std::mem::replace(
                &mut self.current,
                SegmentWriter::with_analyzer(id, self.analyzer.clone()),
            );
            let segment = writer.finalize();
            tracing::debug!(segment = %segment.segment_id(), "committed segment");
            self.segments.push(Arc::new(segment));
        }

        Index {
            segments: self.segments.clone(),
        }
    }
}
