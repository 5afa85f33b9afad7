use std::collections::BTreeMap;
use std::fmt::Display;

use super::error::BencodeError;

/// Represents a Bencode value as defined in the BitTorrent specification.
///
/// Bencode (pronounced like B-encode) supports four different types of values:
/// - Byte strings (raw bytes, not necessarily UTF-8)
/// - Integers
/// - Lists
/// - Dictionaries keyed by byte strings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BValue {
    /// An integer value, can be positive or negative
    /// Example: `i42e` represents 42
    Integer(i64),

    /// A byte string, prefixed with its length
    /// Example: `4:spam` represents "spam"
    String(Vec<u8>),

    /// A list of BValue elements
    /// Example: `l4:spami42ee` represents ["spam", 42]
    List(Vec<BValue>),

    /// A dictionary mapping byte strings to BValues.
    ///
    /// Keys iterate in ascending byte order, which is the order the encoder
    /// writes them in.
    /// Example: `d3:bar4:spam3:fooi42ee` represents {"bar": "spam", "foo": 42}
    Dict(BTreeMap<Vec<u8>, BValue>),
}

impl BValue {
    /// Shorthand for building a byte string value from anything byte-like.
    pub fn string(s: impl AsRef<[u8]>) -> Self {
        BValue::String(s.as_ref().to_vec())
    }

    /// Encodes the value into canonical bencode.
    pub fn to_bytes(&self) -> Vec<u8> {
        crate::bencode::encoder::Encoder::new().encode(self)
    }

    /// Decodes the first value in `bytes`, ignoring anything after it.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BencodeError> {
        crate::bencode::decode(bytes).map(|(value, _)| value)
    }

    pub fn to_json(&self) -> serde_json::Value {
        serde_json::Value::from(self)
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            BValue::Integer(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            BValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// The byte string as UTF-8 text, if it is both.
    pub fn as_str(&self) -> Option<&str> {
        self.as_bytes().and_then(|s| std::str::from_utf8(s).ok())
    }

    pub fn as_list(&self) -> Option<&[BValue]> {
        match self {
            BValue::List(list) => Some(list),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&BTreeMap<Vec<u8>, BValue>> {
        match self {
            BValue::Dict(dict) => Some(dict),
            _ => None,
        }
    }

    /// Looks up `key` if this value is a dictionary.
    pub fn get(&self, key: &[u8]) -> Option<&BValue> {
        self.as_dict().and_then(|dict| dict.get(key))
    }
}

/// Renders a byte string for humans: printable ASCII as text, anything else as hex.
fn printable(s: &[u8]) -> String {
    if s.iter().any(|&b| !(32..=126).contains(&b)) {
        hex::encode(s)
    } else {
        String::from_utf8_lossy(s).into_owned()
    }
}

impl From<&BValue> for serde_json::Value {
    fn from(value: &BValue) -> Self {
        match value {
            BValue::Integer(n) => serde_json::Value::Number((*n).into()),
            BValue::String(s) => serde_json::Value::String(printable(s)),
            BValue::List(arr) => serde_json::Value::Array(arr.iter().map(|v| v.into()).collect()),
            BValue::Dict(map) => {
                let obj = map.iter().map(|(k, v)| (printable(k), v.into())).collect();
                serde_json::Value::Object(obj)
            }
        }
    }
}

impl Display for BValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

impl TryFrom<&[u8]> for BValue {
    type Error = BencodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}
