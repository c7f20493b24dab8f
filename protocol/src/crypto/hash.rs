//! # Hashing
//!
//! SHA-256, because that is what the chain hashes transactions with. There
//! is no second hash function in this crate and there shouldn't be.
//!
//! [`sha256_with_prefix`] exists for one job: a transaction inside a batch
//! blob is stored without its 2-byte codec version, but its ID is the hash
//! *with* that version in front. Feeding the prefix to the hasher first
//! gives the same digest without copying the transaction into a new buffer.

use sha2::{Digest, Sha256};

/// SHA-256 of `data`.
///
/// ```
/// use atomix_protocol::crypto::sha256;
///
/// let digest = sha256(b"");
/// assert_eq!(digest[0], 0xe3);
/// ```
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// SHA-256 of `prefix || data`, without concatenating.
pub fn sha256_with_prefix(prefix: &[u8], data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(prefix);
    hasher.update(data);
    hasher.finalize().into()
}
