//! HTTP tracker announce with compact peer lists.

use percent_encoding::{percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::blocking::Client;
use serde::Serialize;
use tracing::{debug, info, warn};
use url::Url;

use crate::bencode::{BValue, Decoder};
use crate::config::ClientConfig;
use crate::error::{Error, Result};

use super::info_hash::InfoHash;
use super::metainfo::TorrentMetainfo;
use super::peer::{PeerAddress, PeerId};

/// Bytes left unescaped in `info_hash` and `peer_id` (RFC 3986 unreserved).
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Size of one peer in a compact peer list.
const COMPACT_PEER_LEN: usize = 6;

/// The textual announce parameters. `info_hash` and `peer_id` are raw bytes
/// and are encoded separately.
#[derive(Debug, Serialize)]
struct TrackerRequest {
    port: u16,
    uploaded: u64,
    downloaded: u64,
    left: u64,
    compact: u8,
}

/// A decoded announce response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerResponse {
    /// Seconds the tracker wants between announces.
    pub interval: Option<i64>,
    pub min_interval: Option<i64>,
    /// Seeders.
    pub complete: Option<i64>,
    /// Leechers.
    pub incomplete: Option<i64>,
    /// Peers in the order the tracker listed them.
    pub peers: Vec<PeerAddress>,
}

pub struct TrackerClient {
    client: Client,
    peer_id: PeerId,
    port: u16,
    max_depth: usize,
}

impl TrackerClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            peer_id: config.peer_id,
            port: config.port,
            max_depth: config.max_depth,
        })
    }

    /// The torrent's announce URL with the announce parameters appended.
    pub fn announce_url(&self, metainfo: &TorrentMetainfo, info_hash: &InfoHash) -> Result<Url> {
        let mut url =
            Url::parse(&metainfo.announce).map_err(|source| Error::InvalidAnnounceUrl {
                url: metainfo.announce.clone(),
                source,
            })?;

        let request = TrackerRequest {
            port: self.port,
            uploaded: 0,
            downloaded: 0,
            left: metainfo.info.length,
            compact: 1,
        };
        let params = serde_urlencoded::to_string(&request)
            .map_err(|e| Error::TrackerProtocol(format!("cannot encode announce: {}", e)))?;

        let mut query = url.query().map(|q| format!("{}&", q)).unwrap_or_default();
        query.push_str(&format!(
            "info_hash={}&peer_id={}&{}",
            percent_encode(info_hash.as_bytes(), UNRESERVED),
            percent_encode(&self.peer_id, UNRESERVED),
            params
        ));
        url.set_query(Some(&query));
        Ok(url)
    }

    /// Announces once and returns the peers the tracker listed.
    pub fn announce(
        &self,
        metainfo: &TorrentMetainfo,
        info_hash: &InfoHash,
    ) -> Result<Vec<PeerAddress>> {
        Ok(self.announce_response(metainfo, info_hash)?.peers)
    }

    /// Announces once and returns the whole decoded response.
    pub fn announce_response(
        &self,
        metainfo: &TorrentMetainfo,
        info_hash: &InfoHash,
    ) -> Result<TrackerResponse> {
        let url = self.announce_url(metainfo, info_hash)?;
        info!("Announcing {} to {}", info_hash, metainfo.announce);

        let response = self.client.get(url).send()?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            warn!("Tracker responded with {}", status);
            return Err(Error::TrackerHttp { status });
        }

        let body = response.bytes()?;
        debug!("Tracker response: {} bytes", body.len());
        let parsed = parse_response(&body, self.max_depth)?;
        info!(
            "Tracker listed {} peers (interval {:?})",
            parsed.peers.len(),
            parsed.interval
        );
        Ok(parsed)
    }
}

/// Decodes a tracker's bencoded response body.
pub fn parse_response(body: &[u8], max_depth: usize) -> Result<TrackerResponse> {
    let value = Decoder::new(body).with_max_depth(max_depth).parse()?;
    let dict = value
        .as_dict()
        .ok_or_else(|| Error::TrackerProtocol("response is not a dictionary".into()))?;

    if let Some(reason) = dict.get(&b"failure reason"[..]) {
        let reason = reason
            .as_bytes()
            .map(String::from_utf8_lossy)
            .unwrap_or_default();
        return Err(Error::TrackerProtocol(format!("tracker failure: {}", reason)));
    }

    let peers = match dict.get(&b"peers"[..]) {
        Some(BValue::String(bytes)) => decode_compact_peers(bytes)?,
        Some(_) => {
            return Err(Error::TrackerProtocol(
                "`peers` is not a compact byte string".into(),
            ))
        }
        None => return Err(Error::TrackerProtocol("missing `peers`".into())),
    };

    let integer = |key: &[u8]| dict.get(key).and_then(BValue::as_integer);
    Ok(TrackerResponse {
        interval: integer(&b"interval"[..]),
        min_interval: integer(&b"min interval"[..]),
        complete: integer(&b"complete"[..]),
        incomplete: integer(&b"incomplete"[..]),
        peers,
    })
}

/// Splits a compact peer list into 6-byte IPv4 records, keeping their order.
pub fn decode_compact_peers(bytes: &[u8]) -> Result<Vec<PeerAddress>> {
    if bytes.len() % COMPACT_PEER_LEN != 0 {
        return Err(Error::TrackerProtocol(format!(
            "`peers` length {} is not a multiple of {}",
            bytes.len(),
            COMPACT_PEER_LEN
        )));
    }
    Ok(bytes
        .chunks_exact(COMPACT_PEER_LEN)
        .map(|chunk| {
            let mut record = [0u8; COMPACT_PEER_LEN];
            record.copy_from_slice(chunk);
            PeerAddress::from_compact(&record)
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use std::net::Ipv4Addr;

    use super::*;
    use crate::bencode::DEFAULT_MAX_DEPTH;
    use crate::torrent::info::TorrentInfo;

    fn metainfo(announce: &str) -> TorrentMetainfo {
        TorrentMetainfo {
            announce: announce.to_string(),
            info: TorrentInfo {
                name: "sample.txt".into(),
                length: 92063,
                piece_length: 32768,
                pieces: vec![],
            },
            info_raw: b"de".to_vec(),
        }
    }

    #[test]
    fn test_decode_compact_peers() {
        let bytes = [192, 168, 1, 1, 0x1a, 0xe1, 10, 0, 0, 2, 0x00, 0x50];
        let peers = decode_compact_peers(&bytes).unwrap();
        assert_eq!(
            peers,
            vec![
                PeerAddress::new(Ipv4Addr::new(192, 168, 1, 1), 6881),
                PeerAddress::new(Ipv4Addr::new(10, 0, 0, 2), 80),
            ]
        );
        assert_eq!(peers[0].to_string(), "192.168.1.1:6881");
        assert!(decode_compact_peers(&[]).unwrap().is_empty());
    }

    #[test]
    fn test_decode_compact_peers_bad_length() {
        assert!(matches!(
            decode_compact_peers(&[1, 2, 3, 4, 5, 6, 7]),
            Err(Error::TrackerProtocol(_))
        ));
    }

    #[test]
    fn test_parse_response() {
        let mut body = b"d8:completei3e10:incompletei1e8:intervali60e12:min intervali30e5:peers6:".to_vec();
        body.extend_from_slice(&[127, 0, 0, 1, 0x1a, 0xe1]);
        body.push(b'e');

        let response = parse_response(&body, DEFAULT_MAX_DEPTH).unwrap();
        assert_eq!(
            response,
            TrackerResponse {
                interval: Some(60),
                min_interval: Some(30),
                complete: Some(3),
                incomplete: Some(1),
                peers: vec![PeerAddress::new(Ipv4Addr::LOCALHOST, 6881)],
            }
        );
    }

    #[test]
    fn test_parse_response_errors() {
        let cases: [&[u8]; 5] = [
            b"le",
            b"d8:intervali60ee",
            b"d5:peersleee",
            b"d5:peers5:abcdee",
            b"d14:failure reason12:unregisterede",
        ];
        for body in cases {
            assert!(
                matches!(
                    parse_response(body, DEFAULT_MAX_DEPTH),
                    Err(Error::TrackerProtocol(_))
                ),
                "{:?}",
                String::from_utf8_lossy(body)
            );
        }
        assert!(matches!(
            parse_response(b"d5:peers", DEFAULT_MAX_DEPTH),
            Err(Error::MalformedEncoding(_))
        ));
    }

    #[test]
    fn test_announce_url() {
        let config = ClientConfig::default();
        let client = TrackerClient::new(&config).unwrap();
        let mut hash = [0u8; 20];
        hash[0] = 0xd6;
        hash[1] = b'A';
        hash[2] = b' ';
        hash[3] = b'~';
        let info_hash = InfoHash::from(hash);

        let url = client
            .announce_url(&metainfo("http://tracker.example/announce"), &info_hash)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://tracker.example/announce\
             ?info_hash=%D6A%20~%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00%00\
             &peer_id=00112233445566778899\
             &port=6881&uploaded=0&downloaded=0&left=92063&compact=1"
        );
    }

    #[test]
    fn test_announce_url_keeps_existing_query() {
        let client = TrackerClient::new(&ClientConfig::default()).unwrap();
        let url = client
            .announce_url(
                &metainfo("http://tracker.example/announce?key=abc"),
                &InfoHash::from([0x41; 20]),
            )
            .unwrap();
        assert!(url
            .as_str()
            .starts_with("http://tracker.example/announce?key=abc&info_hash=AAAA"));
    }

    #[test]
    fn test_invalid_announce_url() {
        let client = TrackerClient::new(&ClientConfig::default()).unwrap();
        assert!(matches!(
            client.announce_url(&metainfo("not a url"), &InfoHash::from([0; 20])),
            Err(Error::InvalidAnnounceUrl { .. })
        ));
    }
}
