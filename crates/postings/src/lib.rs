// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

//! Immutable in-memory index segments whose postings carry positions and
//! per-occurrence payloads.
//!
//! Documents are buffered by an [`IndexWriter`] and become visible as a new
//! [`Segment`] on commit. Scorers read a segment through the [`SegmentReader`]
//! trait and walk a term's documents with a [`PostingsCursor`].

pub mod analyzer;
pub mod cursor;
pub mod index;
pub mod segment;
pub mod term;
pub mod writer;

pub use analyzer::{encode_float, DelimitedPayloadAnalyzer, PayloadToken};
pub use cursor::{CursorPosition, PostingsCursor, PostingsFlags, SegmentPostings};
pub use index::{Index, IndexWriter};
pub use segment::{Segment, SegmentId, SegmentReader};
pub use term::Term;
pub use writer::{Document, SegmentWriter};

/// Segment local document id.
pub type DocId = tantivy::DocId;

#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum PostingsError {
    #[error("Field name cannot be empty")]
    EmptyFieldName,

    #[error("Segment {0} cannot hold more documents")]
    SegmentFull(SegmentId),
}

pub type Result<T, E = PostingsError> = std::result::Result<T, E>;
