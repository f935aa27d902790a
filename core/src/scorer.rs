// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use std::io;

use postings::{CursorPosition, DocId, PostingsCursor, Term};

use crate::payload::decode_float_payload;

#[derive(thiserror::Error, Debug)]
pub enum ScoreError {
    #[error("Failed to read postings of {term}: {source}")]
    Io {
        term: Term,
        #[source]
        source: io::Error,
    },
}

/// A script scoring the documents of a single segment.
///
/// The host calls [`ScoreScript::set_document`] with non-decreasing document ids,
/// each followed by any number of [`ScoreScript::execute`] calls.
pub trait ScoreScript: Send {
    fn set_document(&mut self, doc: DocId) -> Result<(), ScoreError>;

    fn execute(&mut self) -> Result<f64, ScoreError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScorerState {
    /// No document has been set yet.
    Fresh,
    Positioned(DocId),
    /// The postings have no more documents, every later document scores `0.0`.
    Exhausted,
}

/// Sums the float payloads of a term's occurrences in the current document.
pub enum PayloadScoreScript {
    /// The term does not occur in the segment.
    Empty,
    Active(ActivePayloadScorer),
}

impl PayloadScoreScript {
    pub fn active(term: Term, postings: Box<dyn PostingsCursor>) -> Self {
        PayloadScoreScript::Active(ActivePayloadScorer {
            term,
            postings,
            current_doc: None,
            score: None,
        })
    }

    pub fn state(&self) -> ScorerState {
        match self {
            PayloadScoreScript::Empty => ScorerState::Exhausted,
            PayloadScoreScript::Active(scorer) => scorer.state(),
        }
    }
}

impl ScoreScript for PayloadScoreScript {
    fn set_document(&mut self, doc: DocId) -> Result<(), ScoreError> {
        match self {
            PayloadScoreScript::Empty => Ok(()),
            PayloadScoreScript::Active(scorer) => scorer.set_document(doc),
        }
    }

    fn execute(&mut self) -> Result<f64, ScoreError> {
        match self {
            PayloadScoreScript::Empty => Ok(0.0),
            PayloadScoreScript::Active(scorer) => scorer.execute(),
        }
    }
}

pub struct ActivePayloadScorer {
    term: Term,
    postings: Box<dyn PostingsCursor>,
    current_doc: Option<DocId>,
    /// Score of `current_doc`. Reading the positions consumes them, so the score
    /// is computed once per document.
    score: Option<f64>,
}

impl ActivePayloadScorer {
    pub fn state(&self) -> ScorerState {
        match (self.postings.position(), self.current_doc) {
            (CursorPosition::Exhausted, _) => ScorerState::Exhausted,
            (_, None) => ScorerState::Fresh,
            (_, Some(doc)) => ScorerState::Positioned(doc),
        }
    }

    fn io_error(&self, source: io::Error) -> ScoreError {
        ScoreError::Io {
            term: self.term.clone(),
            source,
        }
    }

    fn set_document(&mut self, doc: DocId) -> Result<(), ScoreError> {
        if self.current_doc != Some(doc) {
            self.score = None;
        }

        // advancing to a target at or before the current document is undefined
        if self.postings.position() < CursorPosition::At(doc) {
            tracing::trace!(target_doc = doc, "advancing postings");
            self.postings
                .advance(doc)
                .map_err(|err| self.io_error(err))?;
        }

        self.current_doc = Some(doc);

        Ok(())
    }

    fn execute(&mut self) -> Result<f64, ScoreError> {
        if let Some(score) = self.score {
            return Ok(score);
        }

        let score = self.compute()?;
        self.score = Some(score);

        Ok(score)
    }

    fn compute(&mut self) -> Result<f64, ScoreError> {
        let Some(doc) = self.current_doc else {
            return Ok(0.0);
        };

        // the postings moved past the document, so it does not contain the term
        if self.postings.position() != CursorPosition::At(doc) {
            return Ok(0.0);
        }

        let freq = self.postings.freq();
        // starts from -0.0 so a single payload is returned bit for bit
        let mut sum = -0.0f32;
        let mut decoded = false;

        for _ in 0..freq {
            self.postings
                .next_position()
                .map_err(|err| self.io_error(err))?;

            if let Some(value) = self.postings.payload().and_then(decode_float_payload) {
                sum += value;
                decoded = true;
            }
        }

        Ok(if decoded { sum as f64 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use postings::{
        encode_float, Document, PayloadToken, PostingsFlags, SegmentId, SegmentReader,
        SegmentWriter,
    };
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};

    fn segment(docs: &[&str]) -> postings::Segment {
        let mut writer = SegmentWriter::new(SegmentId(0));
        for text in docs {
            writer
                .add_document(Document::new().with_text("name", *text))
                .unwrap();
        }
        writer.finalize()
    }

    fn scorer(segment: &postings::Segment, term: &str) -> PayloadScoreScript {
        let term = Term::new("name", term);
        match segment.postings(&term, PostingsFlags::Payloads).unwrap() {
            Some(postings) => PayloadScoreScript::active(term, postings),
            None => PayloadScoreScript::Empty,
        }
    }

    fn score_all(scorer: &mut PayloadScoreScript, max_doc: DocId) -> Vec<f64> {
        (0..max_doc)
            .map(|doc| {
                scorer.set_document(doc).unwrap();
                scorer.execute().unwrap()
            })
            .collect()
    }

    #[test]
    fn sums_payloads_of_all_positions() {
        let segment = segment(&["foo|123 bar|2", "foo|1.5 foo|2.5", "foo|0", "bar|5"]);
        let mut scorer = scorer(&segment, "foo");

        assert_eq!(score_all(&mut scorer, 4), vec![123.0, 4.0, 0.0, 0.0]);
    }

    #[test]
    fn missing_payload_contributes_zero() {
        let segment = segment(&["foo foo|2 foo|abc"]);
        let mut scorer = scorer(&segment, "foo");

        assert_eq!(score_all(&mut scorer, 1), vec![2.0]);
    }

    #[test]
    fn payloads_of_other_lengths_are_ignored() {
        let mut writer = SegmentWriter::new(SegmentId(0));
        writer
            .add_document(Document::new().with_tokens(
                "name",
                vec![
                    PayloadToken::with_payload("foo", vec![0x3F, 0x80, 0x00]),
                    PayloadToken::with_payload("foo", vec![0x3F, 0x80, 0x00, 0x00, 0x00]),
                    PayloadToken::with_payload("foo", encode_float(3.0)),
                    PayloadToken::with_payload("foo", Vec::new()),
                ],
            ))
            .unwrap();
        let segment = writer.finalize();
        let mut scorer = scorer(&segment, "foo");

        assert_eq!(score_all(&mut scorer, 1), vec![3.0]);
    }

    #[test]
    fn empty_scorer() {
        let segment = segment(&["bar|5", "baz"]);
        let mut scorer = scorer(&segment, "foo");

        assert!(matches!(scorer, PayloadScoreScript::Empty));
        assert_eq!(score_all(&mut scorer, 2), vec![0.0, 0.0]);
        assert_eq!(scorer.state(), ScorerState::Exhausted);
    }

    #[test]
    fn empty_segment() {
        let segment = segment(&[]);
        let mut scorer = scorer(&segment, "foo");

        assert!(score_all(&mut scorer, segment.max_doc()).is_empty());
        assert_eq!(scorer.execute().unwrap(), 0.0);
    }

    #[test]
    fn execute_before_set_document() {
        let segment = segment(&["foo|1"]);
        let mut scorer = scorer(&segment, "foo");

        assert_eq!(scorer.state(), ScorerState::Fresh);
        assert_eq!(scorer.execute().unwrap(), 0.0);
    }

    #[test]
    fn repeated_execute_is_deterministic() {
        let segment = segment(&["foo|1.5 foo|2.5"]);
        let mut scorer = scorer(&segment, "foo");

        scorer.set_document(0).unwrap();
        let first = scorer.execute().unwrap();
        assert_eq!(first, 4.0);
        assert_eq!(scorer.execute().unwrap().to_bits(), first.to_bits());

        scorer.set_document(0).unwrap();
        assert_eq!(scorer.execute().unwrap().to_bits(), first.to_bits());
    }

    #[test]
    fn skipped_documents() {
        let segment = segment(&["foo|1", "foo|2", "bar", "foo|4", "foo|5"]);
        let mut scorer = scorer(&segment, "foo");

        scorer.set_document(1).unwrap();
        assert_eq!(scorer.execute().unwrap(), 2.0);
        assert_eq!(scorer.state(), ScorerState::Positioned(1));

        scorer.set_document(2).unwrap();
        assert_eq!(scorer.execute().unwrap(), 0.0);

        // the cursor is already at 3 and must not move
        scorer.set_document(3).unwrap();
        assert_eq!(scorer.execute().unwrap(), 4.0);

        scorer.set_document(10).unwrap();
        assert_eq!(scorer.execute().unwrap(), 0.0);
        assert_eq!(scorer.state(), ScorerState::Exhausted);
    }

    /// Records every call made by the scorer and fails on demand.
    struct RecordingCursor {
        docs: Vec<(DocId, Vec<Option<Vec<u8>>>)>,
        ord: Option<usize>,
        next_occurrence: usize,
        advances: Arc<Mutex<Vec<(CursorPosition, DocId)>>>,
        fail_advance: bool,
        fail_positions: bool,
    }

    impl RecordingCursor {
        fn new(docs: Vec<(DocId, Vec<Option<Vec<u8>>>)>) -> Self {
            Self {
                docs,
                ord: None,
                next_occurrence: 0,
                advances: Arc::default(),
                fail_advance: false,
                fail_positions: false,
            }
        }
    }

    impl PostingsCursor for RecordingCursor {
        fn position(&self) -> CursorPosition {
            match self.ord {
                None => CursorPosition::Unpositioned,
                Some(ord) if ord < self.docs.len() => CursorPosition::At(self.docs[ord].0),
                Some(_) => CursorPosition::Exhausted,
            }
        }

        fn advance(&mut self, target: DocId) -> io::Result<CursorPosition> {
            self.advances.lock().unwrap().push((self.position(), target));

            if self.fail_advance {
                return Err(io::Error::new(io::ErrorKind::Other, "disk on fire"));
            }

            let start = self.ord.map(|ord| ord + 1).unwrap_or(0);
            let ord = (start..self.docs.len())
                .find(|&ord| self.docs[ord].0 >= target)
                .unwrap_or(self.docs.len());

            self.ord = Some(ord);
            self.next_occurrence = 0;

            Ok(self.position())
        }

        fn freq(&self) -> u32 {
            match self.ord {
                Some(ord) if ord < self.docs.len() => self.docs[ord].1.len() as u32,
                _ => 0,
            }
        }

        fn next_position(&mut self) -> io::Result<u32> {
            if self.fail_positions {
                return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "truncated positions"));
            }

            self.next_occurrence += 1;
            Ok(self.next_occurrence as u32 - 1)
        }

        fn payload(&self) -> Option<&[u8]> {
            let ord = self.ord?;
            self.docs[ord].1[self.next_occurrence - 1].as_deref()
        }
    }

    #[test]
    fn never_advances_backwards() {
        let cursor = RecordingCursor::new(vec![
            (2, vec![Some(encode_float(1.0).to_vec())]),
            (5, vec![Some(encode_float(2.0).to_vec()), None]),
            (9, vec![Some(encode_float(3.0).to_vec())]),
        ]);
        let advances = Arc::clone(&cursor.advances);
        let mut scorer = PayloadScoreScript::active(Term::new("name", "foo"), Box::new(cursor));

        let scores = score_all(&mut scorer, 12);
        assert_eq!(
            scores,
            vec![0.0, 0.0, 1.0, 0.0, 0.0, 2.0, 0.0, 0.0, 0.0, 3.0, 0.0, 0.0]
        );

        let advances = advances.lock().unwrap();
        for (position, target) in advances.iter() {
            assert!(*position < CursorPosition::At(*target));
        }
        // one advance per visited matching doc plus the one hitting the end
        assert_eq!(
            advances.iter().map(|(_, target)| *target).collect::<Vec<_>>(),
            vec![0, 3, 6, 10]
        );
    }

    #[test]
    fn advance_failure_is_reported() {
        let mut cursor = RecordingCursor::new(vec![(0, vec![None])]);
        cursor.fail_advance = true;
        let mut scorer = PayloadScoreScript::active(Term::new("name", "foo"), Box::new(cursor));

        let err = scorer.set_document(0).unwrap_err();
        assert!(matches!(err, ScoreError::Io { .. }));
        assert!(err.to_string().contains("name:foo"));
    }

    #[test]
    fn position_failure_is_reported() {
        let mut cursor = RecordingCursor::new(vec![(0, vec![Some(encode_float(1.0).to_vec())])]);
        cursor.fail_positions = true;
        let mut scorer = PayloadScoreScript::active(Term::new("name", "foo"), Box::new(cursor));

        scorer.set_document(0).unwrap();
        let err = scorer.execute().unwrap_err();
        let ScoreError::Io { term, .. } = &err;
        assert_eq!(term, &Term::new("name", "foo"));
        assert!(err.to_string().contains("name:foo"));

        let PayloadScoreScript::Active(active) = &scorer else {
            panic!("expected an active scorer");
        };
        assert_eq!(active.score, None);
        assert!(scorer.execute().is_err());
    }

    #[test]
    fn negative_zero_payload() {
        let mut writer = SegmentWriter::new(SegmentId(0));
        writer
            .add_document(Document::new().with_tokens(
                "name",
                vec![PayloadToken::with_float("foo", -0.0)],
            ))
            .unwrap();
        writer
            .add_document(Document::new().with_tokens(
                "name",
                vec![
                    PayloadToken::with_float("foo", -0.0),
                    PayloadToken::with_float("foo", 0.0),
                ],
            ))
            .unwrap();
        writer
            .add_document(Document::new().with_tokens("name", vec![PayloadToken::new("foo")]))
            .unwrap();
        let segment = writer.finalize();
        let mut scorer = scorer(&segment, "foo");

        let bits = score_all(&mut scorer, 3)
            .into_iter()
            .map(f64::to_bits)
            .collect::<Vec<_>>();
        assert_eq!(bits, vec![(-0.0f64).to_bits(), 0.0f64.to_bits(), 0.0f64.to_bits()]);
    }

    proptest! {
        #[test]
        fn prop_single_occurrence_scores_its_payload(
            value in proptest::num::f32::NORMAL | proptest::num::f32::ZERO
        ) {
            let mut writer = SegmentWriter::new(SegmentId(0));
            let tokens = vec![PayloadToken::with_float("foo", value)];
            writer
                .add_document(Document::new().with_tokens("name", tokens))
                .unwrap();
            let segment = writer.finalize();
            let mut scorer = scorer(&segment, "foo");

            scorer.set_document(0).unwrap();
            prop_assert_eq!(scorer.execute().unwrap().to_bits(), (value as f64).to_bits());
        }

        #[test]
        fn prop_score_is_payload_sum(
            docs in proptest::collection::vec(
                proptest::option::of(proptest::collection::vec(-1000i16..1000, 1..5)),
                0..20,
            )
        ) {
            let mut writer = SegmentWriter::new(SegmentId(0));
            for doc in &docs {
                let tokens = match doc {
                    Some(values) => values
                        .iter()
                        .map(|v| PayloadToken::with_float("foo", *v as f32))
                        .collect(),
                    None => vec![PayloadToken::with_float("bar", 1.0)],
                };
                writer
                    .add_document(Document::new().with_tokens("name", tokens))
                    .unwrap();
            }
            let segment = writer.finalize();
            let mut scorer = scorer(&segment, "foo");

            let scores = score_all(&mut scorer, segment.max_doc());
            for (doc, score) in docs.iter().zip(scores) {
                let expected = doc
                    .as_ref()
                    .map(|values| values.iter().map(|v| *v as f32).sum::<f32>())
                    .unwrap_or(0.0);
                prop_assert_eq!(score, expected as f64);
            }
        }
    }
}
