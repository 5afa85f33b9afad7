//! Bencode encoding and decoding.
//!
//! Used for `.torrent` files and tracker responses. Values are modelled by
//! [`BValue`]; byte strings and dictionary keys are raw bytes.

mod bvalue;
mod decoder;
mod encoder;
mod error;

pub use bvalue::BValue;
pub use decoder::{Decoder, Document, DEFAULT_MAX_DEPTH};
pub use encoder::Encoder;
pub use error::BencodeError;

/// Decodes the first value in `input`, returning it with the number of bytes it used.
pub fn decode(input: &[u8]) -> Result<(BValue, usize), BencodeError> {
    let mut decoder = Decoder::new(input);
    let value = decoder.parse()?;
    Ok((value, decoder.position()))
}

/// Decodes the first value in `input` and records where each top-level
/// dictionary entry sits in the buffer.
pub fn decode_document(input: &[u8]) -> Result<Document<'_>, BencodeError> {
    Decoder::new(input).parse_document()
}

/// Encodes `value` as canonical bencode.
pub fn encode(value: &BValue) -> Vec<u8> {
    Encoder::new().encode(value)
}
