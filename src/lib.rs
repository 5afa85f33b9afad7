//! Bootstrap layer of a BitTorrent client.
//!
//! Goes from a `.torrent` file to a validated peer: decode the bencoded
//! metainfo, hash its `info` dictionary, announce to the HTTP tracker for
//! compact peers, and run the 68-byte handshake with one of them.

pub mod bencode;
pub mod commands;
pub mod config;
pub mod error;
pub mod torrent;
pub mod utils;

pub use config::ClientConfig;
pub use error::{Error, Result};
