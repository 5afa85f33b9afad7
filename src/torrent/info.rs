use crate::bencode::BValue;
use crate::error::{Error, Result};

/// SHA-1 of one piece, as listed in the `pieces` field.
pub type PieceHash = [u8; 20];

/// The `info` dictionary of a single-file torrent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TorrentInfo {
    /// Suggested file name.
    pub name: String,
    /// File size in bytes.
    pub length: u64,
    /// Bytes per piece.
    pub piece_length: u64,
    /// One hash per piece, in piece order.
    pub pieces: Vec<PieceHash>,
}

impl TorrentInfo {
    /// Extracts the typed fields from a decoded `info` dictionary.
    pub fn from_bvalue(value: &BValue) -> Result<Self> {
        let dict = value.as_dict().ok_or(Error::SchemaViolation("info"))?;

        let length = match dict.get(&b"length"[..]) {
            Some(BValue::Integer(n)) => {
                u64::try_from(*n).map_err(|_| Error::SchemaViolation("length"))?
            }
            _ => return Err(Error::SchemaViolation("length")),
        };

        let name = match dict.get(&b"name"[..]) {
            Some(BValue::String(s)) => String::from_utf8(s.clone())
                .map_err(|_| Error::SchemaViolation("name"))?,
            _ => return Err(Error::SchemaViolation("name")),
        };

        let piece_length = match dict.get(&b"piece length"[..]) {
            Some(BValue::Integer(n)) if *n > 0 => *n as u64,
            _ => return Err(Error::SchemaViolation("piece length")),
        };

        let pieces = match dict.get(&b"pieces"[..]) {
            Some(BValue::String(s)) => split_piece_hashes(s)?,
            _ => return Err(Error::SchemaViolation("pieces")),
        };

        Ok(Self {
            name,
            length,
            piece_length,
            pieces,
        })
    }

    pub fn total_pieces(&self) -> usize {
        self.pieces.len()
    }
}

fn split_piece_hashes(bytes: &[u8]) -> Result<Vec<PieceHash>> {
    if bytes.len() % 20 != 0 {
        return Err(Error::SchemaViolation("pieces"));
    }
    Ok(bytes
        .chunks_exact(20)
        .map(|chunk| {
            let mut hash = [0u8; 20];
            hash.copy_from_slice(chunk);
            hash
        })
        .collect())
}
