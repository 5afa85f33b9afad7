use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use bt_bootstrap::bencode::DEFAULT_MAX_DEPTH;
use bt_bootstrap::config::{ClientConfig, DEFAULT_PORT};
use bt_bootstrap::utils::generate_peer_id;
use clap::{Parser, Subcommand};

/// Command line arguments for the bittorrent client implementation
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Port reported to the tracker
    #[arg(long, global = true, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// 20-character peer id to announce with
    #[arg(long, global = true, conflicts_with = "random_peer_id")]
    pub peer_id: Option<String>,

    /// Generate a fresh peer id for this run
    #[arg(long, global = true)]
    pub random_peer_id: bool,

    /// Seconds to wait on the tracker and on peer sockets (waits forever if unset)
    #[arg(long, global = true)]
    pub timeout: Option<u64>,

    /// Reject peer handshakes with a foreign protocol header or info hash
    #[arg(long, global = true)]
    pub strict: bool,

    /// Maximum bencode nesting depth
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,
}

/// Available commands for the bittorrent client implementation
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a bencoded string and print it as JSON
    Decode {
        /// The bencoded string to decode
        input: String,
    },
    /// Print tracker, length, info hash and piece hashes of a torrent file
    Info {
        /// The path to the torrent file
        path: PathBuf,
    },
    /// Ask the tracker for peers of a torrent
    Peers {
        /// The path to the torrent file
        path: PathBuf,
    },
    /// Handshake with one peer and print its peer id
    Handshake {
        /// The path to the torrent file
        path: PathBuf,
        /// Peer address as <ip>:<port>
        peer: String,
    },
}

impl Args {
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }

    /// Builds the library configuration from the global flags.
    pub fn config(&self) -> Result<ClientConfig> {
        let peer_id = match (&self.peer_id, self.random_peer_id) {
            (Some(id), _) => {
                let Ok(id) = <[u8; 20]>::try_from(id.as_bytes()) else {
                    bail!("--peer-id must be exactly 20 bytes, got {}", id.len());
                };
                id
            }
            (None, true) => generate_peer_id(),
            (None, false) => ClientConfig::default().peer_id,
        };

        Ok(ClientConfig {
            peer_id,
            port: self.port,
            timeout: self.timeout.map(Duration::from_secs),
            strict_handshake: self.strict,
            max_depth: self.max_depth,
        })
    }
}
