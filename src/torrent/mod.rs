//! Torrent metadata, tracker announce and the peer handshake.

pub mod info;
pub mod info_hash;
pub mod message;
pub mod metainfo;
pub mod peer;
pub mod tracker;

pub use info::{PieceHash, TorrentInfo};
pub use info_hash::InfoHash;
pub use message::HandshakeMessage;
pub use metainfo::TorrentMetainfo;
pub use peer::{exchange_handshake, perform_handshake, HandshakeOptions, PeerAddress, PeerId};
pub use tracker::{TrackerClient, TrackerResponse};
