// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::io;
use std::sync::Arc;

use crate::DocId;

/// Where a postings cursor currently points.
///
/// The variants are ordered so that `Unpositioned < At(_) < Exhausted`, which
/// lets callers compare a cursor against a target document with `<`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum CursorPosition {
    /// Freshly opened, before the first document of the postings list.
    Unpositioned,
    At(DocId),
    /// Advanced past the last document of the postings list.
    Exhausted,
}

/// What a postings cursor needs to be able to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum PostingsFlags {
    Freqs,
    Positions,
    Payloads,
}

impl PostingsFlags {
    pub fn has_positions(&self) -> bool {
        *self >= PostingsFlags::Positions
    }

    pub fn has_payloads(&self) -> bool {
        *self >= PostingsFlags::Payloads
    }
}

/// Iterates the documents containing a term, and the positions of the term within
/// the current document.
///
/// `advance` is one-way: calling it with a target at or before the current
/// document is a contract violation and the resulting position is unspecified.
pub trait PostingsCursor: Send {
    fn position(&self) -> CursorPosition;

    /// Moves to the first document `>= target`, or to [`CursorPosition::Exhausted`]
    /// if there is none.
    fn advance(&mut self, target: DocId) -> io::Result<CursorPosition>;

    /// Number of occurrences of the term in the current document.
    fn freq(&self) -> u32;

    /// Moves to the next occurrence in the current document and returns its position.
    /// Must be called at most [`PostingsCursor::freq`] times per document.
    fn next_position(&mut self) -> io::Result<u32>;

    /// Payload of the occurrence last returned by [`PostingsCursor::next_position`].
    fn payload(&self) -> Option<&[u8]>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct PayloadSpan {
    pub offset: u32,
    pub len: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Occurrence {
    pub position: u32,
    pub payload: Option<PayloadSpan>,
}

/// The frozen postings list of a single term in a segment.
///
/// Occurrences of `docs[i]` live in `occurrences[doc_starts[i]..doc_starts[i + 1]]`
/// and every payload is a span of the shared `payload_bytes` buffer.
#[derive(Debug, Default)]
pub(crate) struct TermPostings {
    pub docs: Vec<DocId>,
    pub doc_starts: Vec<usize>,
    pub occurrences: Vec<Occurrence>,
    pub payload_bytes: Vec<u8>,
}

impl TermPostings {
    pub fn doc_freq(&self) -> usize {
        self.docs.len()
    }

    fn occurrence_range(&self, ord: usize) -> std::ops::Range<usize> {
        let start = self.doc_starts[ord];
        let end = self
            .doc_starts
            .get(ord + 1)
            .copied()
            .unwrap_or(self.occurrences.len());

        start..end
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cursor {
    Unpositioned,
    At(usize),
    Exhausted,
}

/// [`PostingsCursor`] over the postings list of a [`crate::Segment`].
///
/// The cursor holds its own reference to the postings so it is independent of
/// every other cursor opened on the same segment.
pub struct SegmentPostings {
    postings: Arc<TermPostings>,
    flags: PostingsFlags,
    cursor: Cursor,
    next_occurrence: usize,
    end_occurrence: usize,
    current: Option<Occurrence>,
}

impl SegmentPostings {
    pub(crate) fn new(postings: Arc<TermPostings>, flags: PostingsFlags) -> Self {
        Self {
            postings,
            flags,
            cursor: Cursor::Unpositioned,
            next_occurrence: 0,
            end_occurrence: 0,
            current: None,
        }
    }

    pub fn doc_freq(&self) -> usize {
        self.postings.doc_freq()
    }

    fn seek_ord(&mut self, ord: usize) {
        if ord >= self.postings.docs.len() {
            self.cursor = Cursor::Exhausted;
            self.next_occurrence = 0;
            self.end_occurrence = 0;
        } else {
            let range = self.postings.occurrence_range(ord);
            self.cursor = Cursor::At(ord);
            self.next_occurrence = range.start;
            self.end_occurrence = range.end;
        }

        self.current = None;
    }
}

impl PostingsCursor for SegmentPostings {
    fn position(&self) -> CursorPosition {
        match self.cursor {
            Cursor::Unpositioned => CursorPosition::Unpositioned,
            Cursor::At(ord) => CursorPosition::At(self.postings.docs[ord]),
            Cursor::Exhausted => CursorPosition::Exhausted,
        }
    }

    fn advance(&mut self, target: DocId) -> io::Result<CursorPosition> {
        let start = match self.cursor {
            Cursor::Unpositioned => 0,
            Cursor::At(ord) => ord + 1,
            Cursor::Exhausted => return Ok(CursorPosition::Exhausted),
        };

        let ord = start
            + self.postings.docs[start..].partition_point(|&doc| doc < target);
        self.seek_ord(ord);

        Ok(self.position())
    }

    fn freq(&self) -> u32 {
        match self.cursor {
            Cursor::At(ord) => self.postings.occurrence_range(ord).len() as u32,
            Cursor::Unpositioned | Cursor::Exhausted => 0,
        }
    }

    fn next_position(&mut self) -> io::Result<u32> {
        if !self.flags.has_positions() {
            return Err(io::Error::new(
                io::ErrorKind::Unsupported,
                "positions were not requested for this cursor",
            ));
        }

        if self.next_occurrence >= self.end_occurrence {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "no more positions in the current document",
            ));
        }

        let occurrence = self.postings.occurrences[self.next_occurrence];
        self.next_occurrence += 1;
        self.current = Some(occurrence);

        Ok(occurrence.position)
    }

    fn payload(&self) -> Option<&[u8]> {
        if !self.flags.has_payloads() {
            return None;
        }

        let span = self.current?.payload?;
        let start = span.offset as usize;

        Some(&self.postings.payload_bytes[start..start + span.len as usize])
    }
}
