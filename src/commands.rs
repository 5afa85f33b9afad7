//! One function per CLI subcommand, each taking explicit inputs.

use std::fs;
use std::path::Path;

use tracing::debug;

use crate::bencode::{BValue, Decoder};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::torrent::{
    perform_handshake, HandshakeOptions, InfoHash, PeerAddress, PeerId, TorrentMetainfo,
    TrackerClient,
};

/// Decodes the first bencoded value in `input`; trailing bytes are ignored.
pub fn decode(input: &[u8], config: &ClientConfig) -> Result<BValue> {
    Ok(Decoder::new(input).with_max_depth(config.max_depth).parse()?)
}

/// Reads and parses a torrent file, returning it with its info hash.
pub fn info(path: &Path, config: &ClientConfig) -> Result<(TorrentMetainfo, InfoHash)> {
    let torrent = load_torrent(path, config)?;
    let info_hash = torrent.info_hash();
    Ok((torrent, info_hash))
}

/// Announces the torrent at `path` once and returns the tracker's peers.
pub fn peers(path: &Path, config: &ClientConfig) -> Result<Vec<PeerAddress>> {
    let (torrent, info_hash) = info(path, config)?;
    TrackerClient::new(config)?.announce(&torrent, &info_hash)
}

/// Handshakes with `peer` (`ip:port`) for the torrent at `path`.
pub fn handshake(path: &Path, peer: &str, config: &ClientConfig) -> Result<PeerId> {
    let addr: PeerAddress = peer.parse()?;
    let (_, info_hash) = info(path, config)?;
    let options = HandshakeOptions {
        timeout: config.timeout,
        strict: config.strict_handshake,
    };
    perform_handshake(addr, &info_hash, config.peer_id, options)
}

fn load_torrent(path: &Path, config: &ClientConfig) -> Result<TorrentMetainfo> {
    debug!("Reading torrent file {}", path.display());
    let bytes = fs::read(path)?;
    let document = Decoder::new(&bytes)
        .with_max_depth(config.max_depth)
        .parse_document()?;
    TorrentMetainfo::from_document(&document)
}
