use std::fmt;

use sha1::{Digest, Sha1};

/// SHA-1 of the bencoded `info` dictionary; identifies a torrent's swarm.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct InfoHash([u8; 20]);

impl InfoHash {
    /// Hashes `info_raw` verbatim.
    ///
    /// The bytes must be the `info` value exactly as it appeared in the
    /// torrent file, not a re-encoding of the parsed fields.
    pub fn compute(info_raw: &[u8]) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(info_raw);
        Self(hasher.finalize().into())
    }

    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; 20]> for InfoHash {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "InfoHash({})", self.to_hex())
    }
}

impl fmt::Display for InfoHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
