use std::time::Duration;

use crate::bencode::DEFAULT_MAX_DEPTH;
use crate::torrent::peer::PeerId;

/// Peer id sent to trackers and peers unless the caller picks another one.
pub const DEFAULT_PEER_ID: PeerId = *b"00112233445566778899";

/// Listening port reported to the tracker.
pub const DEFAULT_PORT: u16 = 6881;

/// Settings shared by the tracker and peer stages.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Our 20-byte peer id.
    pub peer_id: PeerId,
    /// Port reported in the announce request.
    pub port: u16,
    /// Bound on the tracker request and on each peer socket operation.
    /// `None` blocks indefinitely.
    pub timeout: Option<Duration>,
    /// Validate the peer's handshake instead of only taking its peer id.
    pub strict_handshake: bool,
    /// Nesting bound for every bencode decode.
    pub max_depth: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            peer_id: DEFAULT_PEER_ID,
            port: DEFAULT_PORT,
            timeout: None,
            strict_handshake: false,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
