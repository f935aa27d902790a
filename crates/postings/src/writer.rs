// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::analyzer::{DelimitedPayloadAnalyzer, PayloadToken};
use crate::cursor::{Occurrence, PayloadSpan, TermPostings};
use crate::segment::{FieldPostings, Segment, SegmentId};
use crate::{DocId, PostingsError, Result};

#[derive(Debug, Clone, PartialEq)]
enum FieldValue {
    Text(String),
    Tokens(Vec<PayloadToken>),
}

/// A document to be indexed. Text values go through the segment writer's analyzer,
/// token values are indexed as given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document {
    fields: Vec<(String, FieldValue)>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_text(mut self, field: impl Into<String>, text: impl Into<String>) -> Self {
        self.fields
            .push((field.into(), FieldValue::Text(text.into())));
        self
    }

    pub fn with_tokens(mut self, field: impl Into<String>, tokens: Vec<PayloadToken>) -> Self {
        self.fields.push((field.into(), FieldValue::Tokens(tokens)));
        self
    }
}

#[derive(Default)]
struct TermPostingsBuilder {
    postings: TermPostings,
}

impl TermPostingsBuilder {
    fn push(&mut self, doc: DocId, position: u32, payload: Option<&[u8]>) {
        let postings = &mut self.postings;

        if postings.docs.last() != Some(&doc) {
            postings.docs.push(doc);
            postings.doc_starts.push(postings.occurrences.len());
        }

        let payload = payload.map(|bytes| {
            let span = PayloadSpan {
                offset: postings.payload_bytes.len() as u32,
                len: bytes.len() as u32,
            };
            postings.payload_bytes.extend_from_slice(bytes);
            span
        });

        postings.occurrences.push(Occurrence { position, payload });
    }
}

#[derive(Default)]
struct FieldWriter {
    terms: BTreeMap<String, TermPostingsBuilder>,
    has_payloads: bool,
}

impl FieldWriter {
    fn finalize(self) -> FieldPostings {
        FieldPostings {
            terms: self
                .terms
                .into_iter()
                .map(|(term, builder)| (term, Arc::new(builder.postings)))
                .collect(),
            has_payloads: self.has_payloads,
        }
    }
}

/// Buffers documents of one segment. Documents get consecutive ids starting at 0.
pub struct SegmentWriter {
    id: SegmentId,
    analyzer: DelimitedPayloadAnalyzer,
    next_doc: DocId,
    fields: HashMap<String, FieldWriter>,
}

impl SegmentWriter {
    pub fn new(id: SegmentId) -> Self {
        Self::with_analyzer(id, DelimitedPayloadAnalyzer::default())
    }

    pub fn with_analyzer(id: SegmentId, analyzer: DelimitedPayloadAnalyzer) -> Self {
        Self {
            id,
            analyzer,
            next_doc: 0,
            fields: HashMap::new(),
        }
    }

    pub fn num_docs(&self) -> DocId {
        self.next_doc
    }

    pub fn is_empty(&self) -> bool {
        self.next_doc == 0
    }

    pub fn add_document(&mut self, doc: Document) -> Result<DocId> {
        if doc.fields.iter().any(|(field, _)| field.is_empty()) {
            return Err(PostingsError::EmptyFieldName);
        }

        let doc_id = self.next_doc;
        self.next_doc = doc_id
            .checked_add(1)
            .ok_or(PostingsError::SegmentFull(self.id))?;

        // positions continue across multiple values of the same field
        let mut next_positions: HashMap<String, u32> = HashMap::new();

        for (field, value) in doc.fields {
            let tokens = match value {
                FieldValue::Text(text) => self.analyzer.analyze(&text),
                FieldValue::Tokens(tokens) => tokens,
            };

            let next_position = next_positions.entry(field.clone()).or_default();
            let writer = self.fields.entry(field).or_default();

            for token in tokens {
                writer.has_payloads |= token.payload.is_some();
                writer
                    .terms
                    .entry(token.text)
                    .or_default()
                    .push(doc_id, *next_position, token.payload.as_deref());
                *next_position += 1;
            }
        }

        Ok(doc_id)
    }

    pub fn finalize(self) -> Segment {
        tracing::debug!(segment = %self.id, num_docs = self.next_doc, "finalizing segment");

        let fields = self
            .fields
            .into_iter()
            .map(|(name, writer)| (name, writer.finalize()))
            .collect();

        Segment::new(self.id, self.next_doc, fields)
    }
}
