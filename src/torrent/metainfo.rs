//! BitTorrent metainfo file parser.
//!
//! A torrent file (also known as a metainfo file) is a bencoded dictionary containing:
//!
//! - `announce`: URL of the tracker server that coordinates peers
//! - `info`: Dictionary containing core metadata about the file:
//!   - `name`: Suggested filename
//!   - `length`: Total size in bytes (single-file torrents only)
//!   - `piece length`: Number of bytes per piece
//!   - `pieces`: Concatenated SHA-1 hashes of all pieces
//!
//! Only single-file torrents are supported. The raw bytes of the `info` value are
//! kept as they appeared in the file, since the info hash is computed over them.

use std::fmt;

use tracing::debug;

use crate::bencode::{self, BValue, Document};
use crate::error::{Error, Result};

use super::info::TorrentInfo;
use super::info_hash::InfoHash;

/// Represents a parsed BitTorrent metainfo file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentMetainfo {
    /// URL of the tracker server
    pub announce: String,
    /// Core metadata about the torrent content
    pub info: TorrentInfo,
    /// The `info` value exactly as it was encoded in the source file
    pub info_raw: Vec<u8>,
}

impl TorrentMetainfo {
    /// Parse a torrent file from its raw bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let document = bencode::decode_document(bytes)?;
        Self::from_document(&document)
    }

    /// Build the metainfo from an already decoded top-level document.
    pub fn from_document(document: &Document<'_>) -> Result<Self> {
        let dict = match &document.value {
            BValue::Dict(dict) => dict,
            _ => return Err(Error::SchemaViolation("torrent")),
        };

        let announce = match dict.get(&b"announce"[..]) {
            Some(BValue::String(s)) => String::from_utf8(s.clone())
                .map_err(|_| Error::SchemaViolation("announce"))?,
            _ => return Err(Error::SchemaViolation("announce")),
        };

        let info = match dict.get(&b"info"[..]) {
            Some(value @ BValue::Dict(_)) => TorrentInfo::from_bvalue(value)?,
            _ => return Err(Error::SchemaViolation("info")),
        };

        let info_raw = document
            .raw_entry(b"info")
            .ok_or(Error::SchemaViolation("info"))?
            .to_vec();

        debug!(
            "parsed torrent {:?}: {} pieces, {} raw info bytes",
            info.name,
            info.total_pieces(),
            info_raw.len()
        );

        Ok(TorrentMetainfo {
            announce,
            info,
            info_raw,
        })
    }

    /// Calculate the SHA-1 hash of the bencoded info dictionary.
    ///
    /// This hash uniquely identifies the torrent and is used in peer protocol
    /// handshakes and tracker communications.
    pub fn info_hash(&self) -> InfoHash {
        InfoHash::compute(&self.info_raw)
    }
}

impl fmt::Display for TorrentMetainfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Tracker URL: {}", self.announce)?;
        writeln!(f, "Length: {}", self.info.length)?;
        writeln!(f, "Info Hash: {}", self.info_hash())?;
        writeln!(f, "Piece Length: {}", self.info.piece_length)?;
        writeln!(f, "Piece Hashes:")?;
        for hash in &self.info.pieces {
            writeln!(f, "{}", hex::encode(hash))?;
        }
        Ok(())
    }
}
