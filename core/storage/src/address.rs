//! Digest-based addressing for stores that compute addresses locally.

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};

use chainvault_common::{ContentAddress, Result};

/// Prefix marking a BLAKE2b-256 content address.
pub const ADDRESS_PREFIX: &str = "b2-";

/// Compute the content address of a byte string.
///
/// Identical bytes always map to the same address.
pub fn content_address_for(data: &[u8]) -> Result<ContentAddress> {
    let digest = Blake2b::<U32>::digest(data);
    let mut address = String::with_capacity(ADDRESS_PREFIX.len() + digest.len() * 2);
    address.push_str(ADDRESS_PREFIX);
    for byte in digest.iter() {
        address.push_str(&format!("{:02x}", byte));
    }
    ContentAddress::new(address)
}
