use thiserror::Error;

/// Grammar violations reported by the [`Decoder`](super::decoder::Decoder).
///
/// Every variant carries the byte offset at which the problem was detected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BencodeError {
    /// A declared length runs past the end of the input, or a list, dictionary,
    /// integer or length prefix is missing its terminator.
    #[error("truncated input at byte {position}")]
    TruncatedInput { position: usize },

    /// Non-digit characters where digits were expected, or a number out of range.
    #[error("invalid number at byte {position}: {reason}")]
    InvalidNumber { position: usize, reason: String },

    /// The first byte of a value is not `i`, `l`, `d` or an ASCII digit.
    #[error("unrecognized tag {tag:?} at byte {position}")]
    UnrecognizedTag { position: usize, tag: char },

    /// A dictionary key decoded to something other than a byte string.
    #[error("dictionary key at byte {position} is not a byte string")]
    InvalidDictionaryKey { position: usize },

    #[error("nesting deeper than {limit} levels at byte {position}")]
    NestingTooDeep { position: usize, limit: usize },

    /// Leading zeros or `-0`, only reported by a strict decoder.
    #[error("non-canonical integer at byte {position}")]
    NonCanonicalInteger { position: usize },
}
