//! Error types shared by every stage of the pipeline.

use thiserror::Error;

use crate::bencode::BencodeError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// The input is not valid bencode.
    #[error("malformed bencode: {0}")]
    MalformedEncoding(#[from] BencodeError),

    /// Valid bencode that does not have the shape of a torrent file.
    #[error("invalid torrent metadata: missing or invalid `{0}`")]
    SchemaViolation(&'static str),

    #[error("invalid announce url {url:?}: {source}")]
    InvalidAnnounceUrl {
        url: String,
        source: url::ParseError,
    },

    /// The tracker answered with a 4xx/5xx status.
    #[error("tracker responded with HTTP {status}")]
    TrackerHttp { status: reqwest::StatusCode },

    /// The tracker could not be reached or the body could not be read.
    #[error("tracker request failed: {0}")]
    TrackerTransport(#[from] reqwest::Error),

    /// The tracker answered, but not with a usable peer list.
    #[error("invalid tracker response: {0}")]
    TrackerProtocol(String),

    #[error("invalid peer address {0:?}, expected <ipv4>:<port>")]
    InvalidPeerAddress(String),

    /// The peer closed the stream before a full handshake arrived.
    #[error("handshake response too short: got {received} of 68 bytes")]
    ShortHandshakeResponse { received: usize },

    /// Strict mode only: the peer's handshake does not match what was sent.
    #[error("handshake mismatch: {0}")]
    HandshakeMismatch(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}
