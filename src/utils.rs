use rand::Rng;

use crate::torrent::peer::PeerId;

/// Client prefix in Azureus style, `-<client><version>-`.
const PEER_ID_PREFIX: &[u8; 8] = b"-BB0100-";

/// A fresh peer id: the client prefix followed by 12 random alphanumerics.
pub fn generate_peer_id() -> PeerId {
    let mut rng = rand::thread_rng();
    let mut id = [0u8; 20];
    id[..8].copy_from_slice(PEER_ID_PREFIX);
    for byte in &mut id[8..] {
        *byte = rng.sample(rand::distributions::Alphanumeric);
    }
    id
}
