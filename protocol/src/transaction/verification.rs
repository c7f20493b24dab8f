//! Verification of signed atomic transactions.
//!
//! [`verify_atomic_tx`] runs the checks a node would run before accepting an
//! atomic transaction, short of looking anything up in shared memory. The
//! cheap structural checks come first; signature recovery last.

use k256::ecdsa::VerifyingKey;
use thiserror::Error;

use super::atomic::AtomicTx;
use super::types::Credential;
use super::unsigned::UnsignedAtomicTx;
use crate::crypto::{recover_public_key, CryptoError};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during verification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VerificationError {
    /// The body has no inputs or no outputs.
    #[error("transaction has no {0}")]
    Empty(&'static str),

    /// Credentials and inputs must pair up one to one.
    #[error("{inputs} inputs but {credentials} credentials")]
    CredentialCount { inputs: usize, credentials: usize },

    /// A credential carries a different number of signatures than its input
    /// has signer indices.
    #[error("credential {index} has {actual} signatures, expected {expected}")]
    SignatureCount {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// Inputs are not strictly increasing in canonical order.
    #[error("inputs are not sorted and unique at position {index}")]
    InputsNotCanonical { index: usize },

    /// A signature did not recover to a public key.
    #[error("credential {index}: {source}")]
    Signature {
        index: usize,
        #[source]
        source: CryptoError,
    },
}

/// Checks a signed transaction and returns the public keys that signed it,
/// in credential order.
///
/// What is checked:
/// 1. The body has inputs and outputs.
/// 2. Exactly one credential per input.
/// 3. Each credential has one signature per signer index of its input
///    (exports: exactly one).
/// 4. Inputs are strictly increasing in canonical order, which also rules
///    out duplicates.
/// 5. Every signature recovers a key over `SHA-256(unsigned bytes)`.
///
/// Whether the recovered keys actually own the inputs can only be decided
/// against the UTXO set, which is the caller's business.
pub fn verify_atomic_tx(tx: &AtomicTx) -> Result<Vec<VerifyingKey>, VerificationError> {
    let unsigned = tx.unsigned();
    if unsigned.input_count() == 0 {
        return Err(VerificationError::Empty("inputs"));
    }
    if unsigned.output_count() == 0 {
        return Err(VerificationError::Empty("outputs"));
    }

    let credentials = tx.credentials();
    if credentials.len() != unsigned.input_count() {
        return Err(VerificationError::CredentialCount {
            inputs: unsigned.input_count(),
            credentials: credentials.len(),
        });
    }

    check_signature_counts(unsigned, credentials)?;
    check_canonical_inputs(unsigned)?;

    let digest = unsigned.signing_digest();
    let mut keys = Vec::with_capacity(credentials.len());
    for (index, credential) in credentials.iter().enumerate() {
        for signature in &credential.signatures {
            let key = recover_public_key(&digest, signature)
                .map_err(|source| VerificationError::Signature { index, source })?;
            keys.push(key);
        }
    }
    Ok(keys)
}

fn check_signature_counts(unsigned: &UnsignedAtomicTx, credentials: &[Credential]) -> Result<(), VerificationError> {
    for (index, credential) in credentials.iter().enumerate() {
        let expected = match unsigned {
            UnsignedAtomicTx::Import(tx) => tx.imported_inputs[index].sig_indices.len(),
            UnsignedAtomicTx::Export(_) => 1,
        };
        if credential.signatures.len() != expected {
            return Err(VerificationError::SignatureCount {
                index,
                expected,
                actual: credential.signatures.len(),
            });
        }
    }
    Ok(())
}

fn check_canonical_inputs(unsigned: &UnsignedAtomicTx) -> Result<(), VerificationError> {
    let first_violation = match unsigned {
        UnsignedAtomicTx::Import(tx) => tx
            .imported_inputs
            .windows(2)
            .position(|w| w[0].canonical_cmp(&w[1]).is_ge()),
        UnsignedAtomicTx::Export(tx) => tx.ins.windows(2).position(|w| w[0].canonical_cmp(&w[1]).is_ge()),
    };
    match first_violation {
        Some(i) => Err(VerificationError::InputsNotCanonical { index: i + 1 }),
        None => Ok(()),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
