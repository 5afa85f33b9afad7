use bytes::{Buf, BufMut, BytesMut};

use crate::error::{Error, Result};

use super::info_hash::InfoHash;
use super::peer::PeerId;

/// Protocol identifier sent in every handshake.
pub const PROTOCOL: &[u8; 19] = b"BitTorrent protocol";

/// Size of a handshake on the wire.
pub const HANDSHAKE_LEN: usize = 68;

/// The fixed-size message exchanged right after a peer connection opens:
/// `19 | "BitTorrent protocol" | reserved[8] | info_hash[20] | peer_id[20]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandshakeMessage {
    pub pstrlen: u8,
    pub pstr: [u8; 19],
    pub reserved: [u8; 8],
    pub info_hash: [u8; 20],
    pub peer_id: PeerId,
}

impl HandshakeMessage {
    /// An outgoing handshake with no extension bits set.
    pub fn new(info_hash: &InfoHash, peer_id: PeerId) -> Self {
        Self {
            pstrlen: PROTOCOL.len() as u8,
            pstr: *PROTOCOL,
            reserved: [0u8; 8],
            info_hash: *info_hash.as_bytes(),
            peer_id,
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = BytesMut::with_capacity(HANDSHAKE_LEN);
        buf.put_u8(self.pstrlen);
        buf.put_slice(&self.pstr);
        buf.put_slice(&self.reserved);
        buf.put_slice(&self.info_hash);
        buf.put_slice(&self.peer_id);
        buf.to_vec()
    }

    /// Splits a received handshake into its fields without checking them.
    pub fn from_bytes(bytes: &[u8; HANDSHAKE_LEN]) -> Self {
        let mut buf = &bytes[..];
        let pstrlen = buf.get_u8();
        let mut pstr = [0u8; 19];
        buf.copy_to_slice(&mut pstr);
        let mut reserved = [0u8; 8];
        buf.copy_to_slice(&mut reserved);
        let mut info_hash = [0u8; 20];
        buf.copy_to_slice(&mut info_hash);
        let mut peer_id = [0u8; 20];
        buf.copy_to_slice(&mut peer_id);
        Self {
            pstrlen,
            pstr,
            reserved,
            info_hash,
            peer_id,
        }
    }

    /// Checks the protocol header and that the peer serves `expected`.
    pub fn validate(&self, expected: &InfoHash) -> Result<()> {
        if self.pstrlen as usize != PROTOCOL.len() || &self.pstr != PROTOCOL {
            return Err(Error::HandshakeMismatch(format!(
                "unexpected protocol {:?}",
                String::from_utf8_lossy(&self.pstr)
            )));
        }
        if &self.info_hash != expected.as_bytes() {
            return Err(Error::HandshakeMismatch(format!(
                "peer sent info hash {}, expected {}",
                hex::encode(self.info_hash),
                expected
            )));
        }
        Ok(())
    }
}
