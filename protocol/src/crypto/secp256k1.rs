//! # secp256k1 Signature Adapter
//!
//! Signing primitives hand back `(r, s, v)` with `v` in the Ethereum
//! convention of 27 or 28, and with `r`/`s` as big-endian integers of
//! whatever width their bignum type felt like. The chain wants exactly
//! `r(32) || s(32) || v(1)` with `v` in `[0, 3]`.
//!
//! [`compact_signature`] does that conversion and nothing else. It panics on
//! a recovery ID it cannot map and on an `r`/`s` wider than 32 significant
//! bytes: both mean the signing primitive is broken, and a malformed
//! signature on the wire is worse than a crash.

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use rand_core::OsRng;

use super::CryptoError;
use crate::config::SIGNATURE_LEN;
use crate::transaction::types::ChainSignature;

/// A signature as a generic ECDSA primitive reports it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawSignature {
    /// Big-endian `r`, any width.
    pub r: Vec<u8>,
    /// Big-endian `s`, any width.
    pub s: Vec<u8>,
    /// Recovery ID, either raw (`0..=3`) or offset by 27.
    pub v: u8,
}

/// Anything that can produce a recoverable signature over a 32-byte digest.
///
/// Implemented for `k256`'s [`SigningKey`]; hardware wallets and remote
/// signers plug in here.
pub trait RecoverableSigner {
    fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<RawSignature, CryptoError>;
}

impl RecoverableSigner for SigningKey {
    fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<RawSignature, CryptoError> {
        let (signature, recovery_id) = self
            .sign_prehash_recoverable(digest)
            .map_err(|e| CryptoError::Signing(e.to_string()))?;
        let (r, s) = signature.split_bytes();
        Ok(RawSignature {
            r: r.to_vec(),
            s: s.to_vec(),
            v: 27 + recovery_id.to_byte(),
        })
    }
}

impl<T: RecoverableSigner + ?Sized> RecoverableSigner for &T {
    fn sign_recoverable(&self, digest: &[u8; 32]) -> Result<RawSignature, CryptoError> {
        (**self).sign_recoverable(digest)
    }
}

/// Fits a big-endian integer into 32 bytes.
///
/// # Panics
///
/// If more than 32 bytes are significant.
fn fit_scalar(name: &str, bytes: &[u8]) -> [u8; 32] {
    let mut out = [0u8; 32];
    if bytes.len() > 32 {
        let (excess, tail) = bytes.split_at(bytes.len() - 32);
        assert!(
            excess.iter().all(|b| *b == 0),
            "signature {} has {} significant bytes",
            name,
            bytes.len()
        );
        out.copy_from_slice(tail);
    } else {
        out[32 - bytes.len()..].copy_from_slice(bytes);
    }
    out
}

/// Converts a generic signature into the chain's compact encoding.
///
/// # Panics
///
/// If `v` is not in `[0, 3]` after removing the 27 offset, or if `r` or `s`
/// carry more than 32 significant bytes.
pub fn compact_signature(raw: &RawSignature) -> ChainSignature {
    let mut out = [0u8; SIGNATURE_LEN];
    out[..32].copy_from_slice(&fit_scalar("r", &raw.r));
    out[32..64].copy_from_slice(&fit_scalar("s", &raw.s));

    let v = if raw.v >= 27 { raw.v - 27 } else { raw.v };
    assert!(v <= 3, "invalid recovery id {} from signer", raw.v);
    out[64] = v;

    ChainSignature::from_bytes_unchecked(out)
}

/// Signs `digest` and returns the 65-byte chain signature.
pub fn to_chain_signature<S: RecoverableSigner + ?Sized>(
    digest: &[u8; 32],
    signer: &S,
) -> Result<ChainSignature, CryptoError> {
    let raw = signer.sign_recoverable(digest)?;
    Ok(compact_signature(&raw))
}

/// `true` if `bytes` is a well-formed chain signature: 65 bytes, `v <= 3`.
pub fn is_valid_chain_signature(bytes: &[u8]) -> bool {
    bytes.len() == SIGNATURE_LEN && bytes[SIGNATURE_LEN - 1] <= 3
}

/// Recovers the public key that produced `signature` over `digest`.
pub fn recover_public_key(digest: &[u8; 32], signature: &ChainSignature) -> Result<VerifyingKey, CryptoError> {
    let sig = Signature::from_slice(signature.rs()).map_err(|e| CryptoError::Recovery(e.to_string()))?;
    let recovery_id = RecoveryId::from_byte(signature.recovery_id())
        .ok_or_else(|| CryptoError::Recovery(format!("bad recovery id {}", signature.recovery_id())))?;
    VerifyingKey::recover_from_prehash(digest, &sig, recovery_id).map_err(|e| CryptoError::Recovery(e.to_string()))
}

/// A fresh random key from the OS RNG.
pub fn generate_key() -> SigningKey {
    SigningKey::random(&mut OsRng)
}

/// Parses a hex private key (with or without `0x`).
pub fn signing_key_from_hex(s: &str) -> Result<SigningKey, CryptoError> {
    let trimmed = s.trim().strip_prefix("0x").unwrap_or(s.trim());
    let bytes = hex::decode(trimmed).map_err(|e| CryptoError::InvalidKey(e.to_string()))?;
    SigningKey::from_slice(&bytes).map_err(|e| CryptoError::InvalidKey(e.to_string()))
}
