// Neos is an open source web search engine.
// Copyright (C) 2024 Yeonwoo Sung

//! Decoding of float payloads.
//!
//! A float payload is the IEEE-754 single precision representation of the value
//! in big-endian byte order, as written by [`postings::encode_float`].

use byteorder::{BigEndian, ByteOrder};

pub const FLOAT_PAYLOAD_LEN: usize = 4;

/// Reads the 4 bytes at `offset` as a big-endian `f32`.
/// Returns `None` if fewer than 4 bytes are available from `offset`.
pub fn decode_float(bytes: &[u8], offset: usize) -> Option<f32> {
    let end = offset.checked_add(FLOAT_PAYLOAD_LEN)?;
    bytes.get(offset..end).map(BigEndian::read_f32)
}

/// Decodes a whole payload. Only payloads of exactly [`FLOAT_PAYLOAD_LEN`] bytes
/// are float payloads, anything else counts as absent.
pub fn decode_float_payload(payload: &[u8]) -> Option<f32> {
    if payload.len() != FLOAT_PAYLOAD_LEN {
        return None;
    }

    decode_float(payload, 0)
}
