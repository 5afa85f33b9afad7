use std::fmt;
use std::io::{self, Read, Write};
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, TcpStream};
use std::str::FromStr;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::error::{Error, Result};

use super::info_hash::InfoHash;
use super::message::{HandshakeMessage, HANDSHAKE_LEN};

/// The 20-byte identifier a client announces itself with.
pub type PeerId = [u8; 20];

/// An IPv4 peer as listed by a tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PeerAddress {
    pub ip: Ipv4Addr,
    pub port: u16,
}

impl PeerAddress {
    pub fn new(ip: Ipv4Addr, port: u16) -> Self {
        Self { ip, port }
    }

    /// Decodes one compact record: 4 address bytes then a big-endian port.
    pub fn from_compact(record: &[u8; 6]) -> Self {
        Self {
            ip: Ipv4Addr::new(record[0], record[1], record[2], record[3]),
            port: u16::from_be_bytes([record[4], record[5]]),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::V4(SocketAddrV4::new(self.ip, self.port))
    }
}

impl fmt::Display for PeerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ip, self.port)
    }
}

impl FromStr for PeerAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let addr: SocketAddrV4 = s
            .parse()
            .map_err(|_| Error::InvalidPeerAddress(s.to_string()))?;
        Ok(Self::new(*addr.ip(), addr.port()))
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HandshakeOptions {
    /// Bound on connect, write and read. `None` blocks indefinitely.
    pub timeout: Option<Duration>,
    /// Reject responses with a foreign protocol header or info hash.
    pub strict: bool,
}

/// Connects to `addr`, exchanges handshakes and returns the remote peer id.
///
/// The connection is closed when this returns, whatever the outcome.
pub fn perform_handshake(
    addr: PeerAddress,
    info_hash: &InfoHash,
    peer_id: PeerId,
    options: HandshakeOptions,
) -> Result<PeerId> {
    info!("Connecting to peer: {}", addr);
    let mut stream = match options.timeout {
        Some(timeout) => TcpStream::connect_timeout(&addr.socket_addr(), timeout)?,
        None => TcpStream::connect(addr.socket_addr())?,
    };
    stream.set_read_timeout(options.timeout)?;
    stream.set_write_timeout(options.timeout)?;

    exchange_handshake(&mut stream, info_hash, peer_id, options.strict)
}

/// Runs the handshake over an already open stream.
///
/// Reads until 68 bytes have arrived; a stream that ends earlier is a
/// [`Error::ShortHandshakeResponse`]. Without `strict`, the peer id is taken from
/// the last 20 bytes of the response as-is.
pub fn exchange_handshake<S: Read + Write>(
    stream: &mut S,
    info_hash: &InfoHash,
    peer_id: PeerId,
    strict: bool,
) -> Result<PeerId> {
    let message = HandshakeMessage::new(info_hash, peer_id);
    stream.write_all(&message.to_bytes())?;
    stream.flush()?;
    debug!("Sent handshake message");

    let response = read_response(stream)?;
    debug!("Received handshake response");

    let response = HandshakeMessage::from_bytes(&response);
    if strict {
        response.validate(info_hash)?;
    }
    info!("Handshake complete, peer id {}", hex::encode(response.peer_id));
    Ok(response.peer_id)
}

fn read_response<R: Read>(reader: &mut R) -> Result<[u8; HANDSHAKE_LEN]> {
    let mut response = [0u8; HANDSHAKE_LEN];
    let mut received = 0;
    while received < HANDSHAKE_LEN {
        match reader.read(&mut response[received..]) {
            Ok(0) => {
                warn!("Peer closed the stream after {} handshake bytes", received);
                return Err(Error::ShortHandshakeResponse { received });
            }
            Ok(n) => received += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(response)
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// In-memory stream: reads from a canned response, records what was written.
    struct MockStream {
        input: Cursor<Vec<u8>>,
        output: Vec<u8>,
    }

    impl MockStream {
        fn new(response: Vec<u8>) -> Self {
            Self {
                input: Cursor::new(response),
                output: Vec::new(),
            }
        }
    }

    impl Read for MockStream {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            // hand out at most 7 bytes per call to exercise partial reads
            let n = buf.len().min(7);
            self.input.read(&mut buf[..n])
        }
    }

    impl Write for MockStream {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.output.write(buf)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_compact_record() {
        let addr = PeerAddress::from_compact(&[192, 168, 1, 1, 0x1a, 0xe1]);
        assert_eq!(addr.to_string(), "192.168.1.1:6881");
    }

    #[test]
    fn test_parse_peer_address() {
        let addr: PeerAddress = "10.0.0.7:51413".parse().unwrap();
        assert_eq!(addr, PeerAddress::new(Ipv4Addr::new(10, 0, 0, 7), 51413));
        for bad in ["10.0.0.7", "host:80", "10.0.0.7:99999", "[::1]:80"] {
            assert!(matches!(
                bad.parse::<PeerAddress>(),
                Err(Error::InvalidPeerAddress(_))
            ));
        }
    }

    #[test]
    fn test_exchange_returns_last_20_bytes() {
        let mut response = vec![0xee; 48];
        response.extend_from_slice(b"-XX0001-abcdefghijkl");
        let mut stream = MockStream::new(response);

        let info_hash = InfoHash::from([5; 20]);
        let peer_id = exchange_handshake(&mut stream, &info_hash, [1; 20], false).unwrap();

        assert_eq!(&peer_id, b"-XX0001-abcdefghijkl");
        assert_eq!(
            stream.output,
            HandshakeMessage::new(&info_hash, [1; 20]).to_bytes()
        );
    }

    #[test]
    fn test_short_response() {
        let mut stream = MockStream::new(vec![19; 67]);
        let err = exchange_handshake(&mut stream, &InfoHash::from([0; 20]), [1; 20], false)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::ShortHandshakeResponse { received: 67 }
        ));
    }

    #[test]
    fn test_strict_mode() {
        let info_hash = InfoHash::from([5; 20]);
        let echoed = HandshakeMessage::new(&info_hash, [2; 20]).to_bytes();
        let mut stream = MockStream::new(echoed);
        assert_eq!(
            exchange_handshake(&mut stream, &info_hash, [1; 20], true).unwrap(),
            [2; 20]
        );

        let foreign = HandshakeMessage::new(&InfoHash::from([6; 20]), [2; 20]).to_bytes();
        let mut stream = MockStream::new(foreign.clone());
        assert!(matches!(
            exchange_handshake(&mut stream, &info_hash, [1; 20], true),
            Err(Error::HandshakeMismatch(_))
        ));

        // lenient mode ignores the mismatch
        let mut stream = MockStream::new(foreign);
        assert_eq!(
            exchange_handshake(&mut stream, &info_hash, [1; 20], false).unwrap(),
            [2; 20]
        );
    }
}
