// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

use byteorder::{BigEndian, ByteOrder};
use tantivy::tokenizer::{TokenStream, Tokenizer, WhitespaceTokenizer};

/// A token ready to be indexed, optionally carrying a payload.
#[derive(Debug, Clone, PartialEq)]
pub struct PayloadToken {
    pub text: String,
    pub payload: Option<Vec<u8>>,
}

impl PayloadToken {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            payload: None,
        }
    }

    pub fn with_payload(text: impl Into<String>, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            text: text.into(),
            payload: Some(payload.into()),
        }
    }

    pub fn with_float(text: impl Into<String>, value: f32) -> Self {
        Self::with_payload(text, encode_float(value))
    }
}

/// Encodes `value` as the 4 big-endian bytes of its IEEE-754 representation.
pub fn encode_float(value: f32) -> [u8; 4] {
    let mut buf = [0; 4];
    BigEndian::write_u32(&mut buf, value.to_bits());
    buf
}

/// Splits text on whitespace and each token on its first delimiter. The text before
/// the delimiter is indexed and the text after it is parsed as a float payload.
///
/// `"foo|1.5 bar"` yields `foo` with the payload `1.5` and `bar` without payload.
#[derive(Clone)]
pub struct DelimitedPayloadAnalyzer {
    delimiter: char,
    tokenizer: WhitespaceTokenizer,
}

impl Default for DelimitedPayloadAnalyzer {
    fn default() -> Self {
        Self::new('|')
    }
}

impl DelimitedPayloadAnalyzer {
    pub fn new(delimiter: char) -> Self {
        Self {
            delimiter,
            tokenizer: WhitespaceTokenizer::default(),
        }
    }

    pub fn analyze(&mut self, text: &str) -> Vec<PayloadToken> {
        let delimiter = self.delimiter;
        let mut stream = self.tokenizer.token_stream(text);
        let mut tokens = Vec::new();

        while stream.advance() {
            tokens.push(split_token(&stream.token().text, delimiter));
        }

        tokens
    }
}

fn split_token(raw: &str, delimiter: char) -> PayloadToken {
    match raw.split_once(delimiter) {
        Some((text, suffix)) => match suffix.parse::<f32>() {
            Ok(value) => PayloadToken::with_float(text, value),
            Err(_) => {
                tracing::debug!(token = raw, "ignoring unparsable payload");
                PayloadToken::new(text)
            }
        },
        None => PayloadToken::new(raw),
    }
}
