//! Signing atomic transactions.
//!
//! Signing is a separate step from building because the key may live
//! elsewhere (a hardware wallet, a remote signer). Every credential signs
//! the same digest, `SHA-256(version | typeTag | body)`, and credential `i`
//! authorizes input `i` in the body's canonical input order.

use thiserror::Error;

use super::atomic::{append_credentials, AtomicTx};
use super::types::Credential;
use super::unsigned::UnsignedAtomicTx;
use crate::codec::CodecError;
use crate::crypto::{sha256, to_chain_signature, CryptoError, RecoverableSigner};

/// Errors that can occur while signing.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SigningError {
    /// One signer per input, no more, no less.
    #[error("transaction has {inputs} inputs but {signers} signers were supplied")]
    SignerCountMismatch { inputs: usize, signers: usize },

    /// `sign_import` was handed an export.
    #[error("expected an import transaction")]
    NotAnImport,

    #[error(transparent)]
    Codec(#[from] CodecError),

    #[error(transparent)]
    Crypto(#[from] CryptoError),
}

fn credentials_for<S: RecoverableSigner>(
    digest: &[u8; 32],
    inputs: usize,
    signers: &[S],
) -> Result<Vec<Credential>, SigningError> {
    if inputs != signers.len() {
        return Err(SigningError::SignerCountMismatch {
            inputs,
            signers: signers.len(),
        });
    }
    signers
        .iter()
        .map(|signer| -> Result<Credential, SigningError> {
            Ok(Credential::single(to_chain_signature(digest, signer)?))
        })
        .collect()
}

/// Signs an unsigned transaction of either kind.
///
/// `signers[i]` signs for input `i`. Returns the signed transaction with its
/// ID computed.
pub fn sign_unsigned<S: RecoverableSigner>(
    unsigned: &UnsignedAtomicTx,
    signers: &[S],
) -> Result<AtomicTx, SigningError> {
    let digest = unsigned.signing_digest();
    let credentials = credentials_for(&digest, unsigned.input_count(), signers)?;
    Ok(AtomicTx::new(unsigned.clone(), credentials))
}

/// Signs versioned unsigned import bytes, as produced by the builder, and
/// returns signed bytes ready for submission.
///
/// The digest is taken over `unsigned_bytes` exactly as given; the bytes are
/// decoded only to count inputs and are never re-encoded.
pub fn sign_import<S: RecoverableSigner>(unsigned_bytes: &[u8], signers: &[S]) -> Result<Vec<u8>, SigningError> {
    let unsigned = UnsignedAtomicTx::from_bytes(unsigned_bytes)?;
    let import = unsigned.as_import().ok_or(SigningError::NotAnImport)?;

    let digest = sha256(unsigned_bytes);
    let credentials = credentials_for(&digest, import.imported_inputs.len(), signers)?;
    Ok(append_credentials(unsigned_bytes, &credentials))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::recover_public_key;
    use crate::crypto::secp256k1::generate_key;
    use crate::transaction::builder::{ChainIds, ImportTxBuilder};
    use crate::transaction::types::{EvmInput, Id, ShortId, TransferableOutput, Utxo};
    use crate::transaction::unsigned::UnsignedExportTx;
    use k256::ecdsa::SigningKey;

    fn built_import(n: u8) -> Vec<u8> {
        let avax = Id::new([0xAA; 32]);
        let utxos = (0..n).map(|i| Utxo {
            tx_id: Id::new([i + 1; 32]),
            output_index: 0,
            asset_id: avax,
            amount: 5_000_000,
            address: ShortId::new([1; 20]),
        });
        ImportTxBuilder::new(
            5,
            ChainIds {
                blockchain_id: Id::new([0xCC; 32]),
                source_chain: Id::EMPTY,
            },
        )
        .utxos(utxos)
        .destination(ShortId::new([2; 20]))
        .fee_asset(avax)
        .base_fee(25_000_000_000)
        .build()
        .unwrap()
        .bytes
    }

    #[test]
    fn signed_import_decodes_with_one_credential_per_input() {
        let unsigned = built_import(2);
        let keys = vec![generate_key(), generate_key()];
        let signed = sign_import(&unsigned, &keys).unwrap();

        assert_eq!(&signed[..unsigned.len()], &unsigned[..]);
        let tx = AtomicTx::from_bytes(&signed).unwrap();
        assert_eq!(tx.credentials().len(), 2);

        let digest = sha256(&unsigned);
        for (cred, key) in tx.credentials().iter().zip(&keys) {
            assert_eq!(cred.signatures.len(), 1);
            let recovered = recover_public_key(&digest, &cred.signatures[0]).unwrap();
            assert_eq!(&recovered, key.verifying_key());
        }
    }

    #[test]
    fn byte_and_struct_paths_agree() {
        let unsigned = built_import(1);
        let key = vec![SigningKey::from_slice(&[0x42; 32]).unwrap()];
        let signed = sign_import(&unsigned, &key).unwrap();
        let tx = sign_unsigned(&UnsignedAtomicTx::from_bytes(&unsigned).unwrap(), &key).unwrap();
        assert_eq!(signed, tx.to_bytes());
    }

    #[test]
    fn signer_count_must_match_inputs() {
        let unsigned = built_import(2);
        let err = sign_import(&unsigned, &[generate_key()]).unwrap_err();
        assert_eq!(err, SigningError::SignerCountMismatch { inputs: 2, signers: 1 });
    }

    #[test]
    fn export_is_not_an_import() {
        let export = UnsignedAtomicTx::Export(UnsignedExportTx {
            network_id: 5,
            blockchain_id: Id::new([0xCC; 32]),
            destination_chain: Id::EMPTY,
            ins: vec![EvmInput {
                address: ShortId::new([3; 20]),
                amount: 10,
                asset_id: Id::new([0xAA; 32]),
                nonce: 0,
            }],
            exported_outputs: vec![TransferableOutput::new(Id::new([0xAA; 32]), 9, 0, 1, vec![ShortId::new([4; 20])])
                .unwrap()],
        });
        let key = [generate_key()];
        assert_eq!(
            sign_import(&export.to_bytes(), &key).unwrap_err(),
            SigningError::NotAnImport
        );
        // The generic path signs exports fine.
        let tx = sign_unsigned(&export, &key).unwrap();
        assert_eq!(tx.credentials().len(), 1);
    }

    #[test]
    fn garbage_bytes_are_a_codec_error() {
        let key = [generate_key()];
        assert!(matches!(sign_import(&[0, 0, 0], &key), Err(SigningError::Codec(_))));
    }

    #[test]
    fn trait_objects_can_sign() {
        let a = generate_key();
        let b = generate_key();
        let signers: Vec<&dyn RecoverableSigner> = vec![&a, &b];
        let signed = sign_import(&built_import(2), &signers).unwrap();
        assert!(AtomicTx::from_bytes(&signed).is_ok());
    }
}
