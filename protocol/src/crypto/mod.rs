//! # Cryptographic Primitives
//!
//! Three small things, all of them thin wrappers over audited crates:
//!
//! - **SHA-256** for transaction IDs and signing digests (`sha2`).
//! - **CB58** for printing and parsing IDs the way the rest of the
//!   ecosystem does (`bs58` plus a SHA-256 checksum).
//! - **secp256k1** recoverable signatures and the adapter that squeezes them
//!   into the chain's 65-byte format (`k256`).
//!
//! Nothing here rolls its own curve arithmetic. If you find yourself wanting
//! to, stop.

pub mod cb58;
pub mod hash;
pub mod secp256k1;

use thiserror::Error;

pub use hash::{sha256, sha256_with_prefix};
pub use secp256k1::{
    compact_signature, is_valid_chain_signature, recover_public_key, to_chain_signature, RawSignature,
    RecoverableSigner,
};

/// Errors from key handling, signing and ID encoding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// Private key bytes were not a valid secp256k1 scalar.
    #[error("invalid private key: {0}")]
    InvalidKey(String),

    /// The signing primitive refused to sign.
    #[error("signing failed: {0}")]
    Signing(String),

    /// No public key could be recovered from a signature.
    #[error("public key recovery failed: {0}")]
    Recovery(String),

    /// The string is not valid base58.
    #[error("invalid base58: {0}")]
    InvalidBase58(String),

    /// The CB58 checksum did not match its payload.
    #[error("cb58 checksum mismatch")]
    ChecksumMismatch,

    /// Decoded bytes had the wrong length for the target type.
    #[error("invalid length: expected {expected} bytes, got {actual}")]
    InvalidLength { expected: usize, actual: usize },
}
