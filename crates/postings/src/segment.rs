// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::io;
use std::sync::Arc;

use crate::cursor::{PostingsCursor, PostingsFlags, SegmentPostings, TermPostings};
use crate::{DocId, Term};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentId(pub u32);

impl fmt::Display for SegmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "seg-{}", self.0)
    }
}

/// Read access to a single immutable segment.
///
/// Readers are shared between every scorer searching the segment, whereas each
/// cursor returned by [`SegmentReader::postings`] belongs to its caller alone.
pub trait SegmentReader: Send + Sync {
    fn segment_id(&self) -> SegmentId;

    /// One past the largest document id in the segment.
    fn max_doc(&self) -> DocId;

    /// Opens a cursor over the documents containing `term`.
    /// Returns `None` when the term does not occur in the segment.
    fn postings(
        &self,
        term: &Term,
        flags: PostingsFlags,
    ) -> io::Result<Option<Box<dyn PostingsCursor>>>;

    /// Whether any occurrence of `field` in the segment carries a payload.
    fn has_payloads(&self, field: &str) -> bool;
}

#[derive(Debug, Default)]
pub(crate) struct FieldPostings {
    pub terms: BTreeMap<String, Arc<TermPostings>>,
    pub has_payloads: bool,
}

#[derive(Debug)]
pub struct Segment {
    id: SegmentId,
    max_doc: DocId,
    fields: HashMap<String, FieldPostings>,
}

impl Segment {
    pub(crate) fn new(
        id: SegmentId,
        max_doc: DocId,
        fields: HashMap<String, FieldPostings>,
    ) -> Self {
        Self {
            id,
            max_doc,
            fields,
        }
    }

    pub fn num_terms(&self, field: &str) -> usize {
        self.fields
            .get(field)
            .map(|field| field.terms.len())
            .unwrap_or_default()
    }

    /// Number of documents in the segment containing `term`.
    pub fn doc_freq(&self, term: &Term) -> usize {
        self.term_postings(term)
            .map(|postings| postings.doc_freq())
            .unwrap_or_default()
    }

    fn term_postings(&self, term: &Term) -> Option<&Arc<TermPostings>> {
        self.fields.get(term.field())?.terms.get(term.text())
    }
}

impl SegmentReader for Segment {
    fn segment_id(&self) -> SegmentId {
        self.id
    }

    fn max_doc(&self) -> DocId {
        self.max_doc
    }

    fn postings(
        &self,
        term: &Term,
        flags: PostingsFlags,
    ) -> io::Result<Option<Box<dyn PostingsCursor>>> {
        Ok(self.term_postings(term).map(|postings| {
            Box::new(SegmentPostings::new(Arc::clone(postings), flags)) as Box<dyn PostingsCursor>
        }))
    }

    fn has_payloads(&self, field: &str) -> bool {
        self.fields
            .get(field)
            .map(|field| field.has_payloads)
            .unwrap_or(false)
    }
}
