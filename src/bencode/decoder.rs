use std::collections::BTreeMap;
use std::ops::Range;

use tracing::{debug, trace};

use super::bvalue::BValue;
use super::error::BencodeError;

/// Default bound on list/dictionary nesting.
pub const DEFAULT_MAX_DEPTH: usize = 1000;

/// A single-pass bencode decoder over a byte slice.
///
/// The decoder is lenient by default: integers with leading zeros, `-0` and
/// unsorted dictionary keys are accepted. [`Decoder::strict`] turns on
/// rejection of non-canonical integers and string lengths.
pub struct Decoder<'a> {
    input: &'a [u8],
    position: usize,
    depth: usize,
    max_depth: usize,
    strict: bool,
    spans: BTreeMap<Vec<u8>, Range<usize>>,
}

/// A decoded top-level value together with the raw byte span of each entry
/// of the top-level dictionary.
#[derive(Debug)]
pub struct Document<'a> {
    pub value: BValue,
    /// Number of input bytes the value occupied.
    pub consumed: usize,
    input: &'a [u8],
    spans: BTreeMap<Vec<u8>, Range<usize>>,
}

impl<'a> Document<'a> {
    /// Byte range of the value stored under `key` in the top-level dictionary.
    pub fn span(&self, key: &[u8]) -> Option<Range<usize>> {
        self.spans.get(key).cloned()
    }

    /// Exact input bytes of the value stored under `key`, as they appeared in
    /// the source buffer.
    pub fn raw_entry(&self, key: &[u8]) -> Option<&'a [u8]> {
        let input = self.input;
        self.spans.get(key).map(|range| &input[range.clone()])
    }
}

impl<'a> Decoder<'a> {
    pub fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            position: 0,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
            strict: false,
            spans: BTreeMap::new(),
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    /// Offset of the next unread byte.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Decodes one value starting at the current position.
    pub fn parse(&mut self) -> Result<BValue, BencodeError> {
        self.parse_value()
    }

    /// Decodes one value and keeps the spans of the top-level dictionary entries.
    pub fn parse_document(mut self) -> Result<Document<'a>, BencodeError> {
        let value = self.parse_value()?;
        Ok(Document {
            value,
            consumed: self.position,
            input: self.input,
            spans: self.spans,
        })
    }

    fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.position).copied()
    }

    fn consume_byte(&mut self) -> Option<u8> {
        let b = self.peek_byte()?;
        self.position += 1;
        Some(b)
    }

    /// Returns the bytes up to `delimiter` and moves past the delimiter.
    fn consume_until(&mut self, delimiter: u8) -> Result<&'a [u8], BencodeError> {
        let start = self.position;
        let rest = &self.input[start..];
        match rest.iter().position(|&b| b == delimiter) {
            Some(offset) => {
                self.position = start + offset + 1;
                Ok(&rest[..offset])
            }
            None => Err(BencodeError::TruncatedInput {
                position: self.input.len(),
            }),
        }
    }

    fn enter(&mut self) -> Result<(), BencodeError> {
        if self.depth >= self.max_depth {
            return Err(BencodeError::NestingTooDeep {
                position: self.position,
                limit: self.max_depth,
            });
        }
        self.depth += 1;
        Ok(())
    }

    fn parse_value(&mut self) -> Result<BValue, BencodeError> {
        match self.peek_byte() {
            Some(b'i') => Ok(BValue::Integer(self.parse_integer()?)),
            Some(b'l') => self.parse_list(),
            Some(b'd') => self.parse_dict(),
            Some(c) if c.is_ascii_digit() => Ok(BValue::String(self.parse_string()?)),
            Some(c) => {
                debug!(
                    "Unhandled encoded value at position {}: {:?}",
                    self.position, c as char
                );
                Err(BencodeError::UnrecognizedTag {
                    position: self.position,
                    tag: c as char,
                })
            }
            None => Err(BencodeError::TruncatedInput {
                position: self.position,
            }),
        }
    }

    fn parse_integer(&mut self) -> Result<i64, BencodeError> {
        self.consume_byte(); // consume 'i'
        let start = self.position;
        let digits = self.consume_until(b'e')?;

        let (negative, magnitude) = match digits.split_first() {
            Some((b'-', rest)) => (true, rest),
            _ => (false, digits),
        };
        if magnitude.is_empty() || !magnitude.iter().all(u8::is_ascii_digit) {
            return Err(BencodeError::InvalidNumber {
                position: start,
                reason: format!("{:?} is not an integer", String::from_utf8_lossy(digits)),
            });
        }
        if self.strict && (has_leading_zero(magnitude) || (negative && magnitude == b"0")) {
            return Err(BencodeError::NonCanonicalInteger { position: start });
        }

        parse_ascii::<i64>(digits, start)
    }

    fn parse_string(&mut self) -> Result<Vec<u8>, BencodeError> {
        let start = self.position;
        let digits = self.consume_until(b':')?;
        if !digits.iter().all(u8::is_ascii_digit) {
            return Err(BencodeError::InvalidNumber {
                position: start,
                reason: format!(
                    "{:?} is not a string length",
                    String::from_utf8_lossy(digits)
                ),
            });
        }
        if self.strict && has_leading_zero(digits) {
            return Err(BencodeError::NonCanonicalInteger { position: start });
        }
        let len = parse_ascii::<usize>(digits, start)?;

        let remaining = self.input.len() - self.position;
        if remaining < len {
            trace!(
                "string at {} declares {} bytes, {} remain",
                start,
                len,
                remaining
            );
            return Err(BencodeError::TruncatedInput {
                position: self.input.len(),
            });
        }
        let bytes = &self.input[self.position..self.position + len];
        self.position += len;
        Ok(bytes.to_vec())
    }

    fn parse_list(&mut self) -> Result<BValue, BencodeError> {
        self.enter()?;
        self.consume_byte(); // consume 'l'
        let mut values = Vec::new();

        while let Some(c) = self.peek_byte() {
            if c == b'e' {
                self.consume_byte();
                self.depth -= 1;
                return Ok(BValue::List(values));
            }
            values.push(self.parse_value()?);
        }
        Err(BencodeError::TruncatedInput {
            position: self.position,
        })
    }

    fn parse_dict(&mut self) -> Result<BValue, BencodeError> {
        self.enter()?;
        let top_level = self.depth == 1;
        self.consume_byte(); // consume 'd'
        let mut map = BTreeMap::new();

        while let Some(c) = self.peek_byte() {
            if c == b'e' {
                self.consume_byte();
                self.depth -= 1;
                return Ok(BValue::Dict(map));
            }
            let key_position = self.position;
            let key = match self.parse_value()? {
                BValue::String(s) => s,
                _ => {
                    return Err(BencodeError::InvalidDictionaryKey {
                        position: key_position,
                    })
                }
            };
            let value_start = self.position;
            let value = self.parse_value()?;
            if top_level {
                self.spans.insert(key.clone(), value_start..self.position);
            }
            map.insert(key, value);
        }
        Err(BencodeError::TruncatedInput {
            position: self.position,
        })
    }
}

fn has_leading_zero(digits: &[u8]) -> bool {
    digits.len() > 1 && digits[0] == b'0'
}

fn parse_ascii<T>(digits: &[u8], position: usize) -> Result<T, BencodeError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    std::str::from_utf8(digits)
        .map_err(|e| e.to_string())
        .and_then(|s| s.parse::<T>().map_err(|e| e.to_string()))
        .map_err(|reason| BencodeError::InvalidNumber { position, reason })
}
