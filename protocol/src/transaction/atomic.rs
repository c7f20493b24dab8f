//! Signed atomic transactions: framing, credentials and IDs.
//!
//! A standalone signed transaction is
//! `version | typeTag | body | credCount | credential*` and its ID is the
//! SHA-256 of exactly those bytes.
//!
//! Inside a batch blob the same transaction appears *without* the version,
//! because the blob carries one version for everything. The ID still covers
//! the version, so [`AtomicTx::read_unversioned`] hashes the transaction's
//! byte span with the version fed to the hasher first. Both decode entry
//! points go through that one function, so the two paths cannot disagree.

use serde::Serialize;

use super::types::{Credential, Id, TxKind, CREDENTIAL_MIN_LEN};
use super::unsigned::UnsignedAtomicTx;
use crate::codec::{pack_seq, unpack_seq, CodecError, Packable, Packer, Reader};
use crate::config::CODEC_VERSION;
use crate::crypto::{sha256, sha256_with_prefix};

/// A signed atomic transaction with its ID.
///
/// Fields are private: the ID is a function of the other two and is
/// computed once, at construction or decode.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct AtomicTx {
    id: Id,
    unsigned: UnsignedAtomicTx,
    credentials: Vec<Credential>,
}

impl AtomicTx {
    /// Assembles a signed transaction and computes its ID.
    ///
    /// No signature checks happen here; see
    /// [`verify_atomic_tx`](super::verification::verify_atomic_tx).
    pub fn new(unsigned: UnsignedAtomicTx, credentials: Vec<Credential>) -> Self {
        let mut tx = Self {
            id: Id::EMPTY,
            unsigned,
            credentials,
        };
        tx.id = Id::new(sha256(&tx.to_bytes()));
        tx
    }

    /// Decodes a standalone signed transaction (physical version prefix).
    ///
    /// Trailing bytes are an error: a standalone encoding is exactly one
    /// transaction.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        reader.expect_version()?;
        let tx = Self::read_unversioned(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Decodes one transaction with no version prefix, as stored in a batch.
    pub fn from_unversioned_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        let tx = Self::read_unversioned(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// Reads one version-less transaction at the reader's cursor.
    ///
    /// The ID is the hash of the consumed span with the codec version
    /// virtually prepended.
    pub fn read_unversioned(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let start = reader.position();
        let unsigned = UnsignedAtomicTx::unpack(reader)?;
        let credentials = unpack_seq(reader, "credentials", CREDENTIAL_MIN_LEN)?;
        let end = reader.position();

        let id = sha256_with_prefix(&CODEC_VERSION.to_be_bytes(), reader.span(start, end));
        Ok(Self {
            id: Id::new(id),
            unsigned,
            credentials,
        })
    }

    pub fn id(&self) -> &Id {
        &self.id
    }

    pub fn unsigned(&self) -> &UnsignedAtomicTx {
        &self.unsigned
    }

    pub fn credentials(&self) -> &[Credential] {
        &self.credentials
    }

    pub fn kind(&self) -> TxKind {
        self.unsigned.kind()
    }

    /// Takes the transaction apart.
    pub fn into_parts(self) -> (UnsignedAtomicTx, Vec<Credential>) {
        (self.unsigned, self.credentials)
    }

    /// Standalone signed encoding, version included. Ready for submission.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_capacity(512);
        packer.put_u16(CODEC_VERSION);
        self.pack(&mut packer);
        packer.into_vec()
    }

    /// Encoding without the version, as it appears inside a batch.
    pub fn to_unversioned_bytes(&self) -> Vec<u8> {
        let mut packer = Packer::with_capacity(512);
        self.pack(&mut packer);
        packer.into_vec()
    }
}

impl Packable for AtomicTx {
    fn pack(&self, packer: &mut Packer) {
        self.unsigned.pack(packer);
        pack_seq(packer, &self.credentials);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Self::read_unversioned(reader)
    }
}

/// Appends credentials to versioned unsigned bytes, giving signed bytes.
///
/// This is a byte-level splice; `unsigned_bytes` is not re-decoded.
pub fn append_credentials(unsigned_bytes: &[u8], credentials: &[Credential]) -> Vec<u8> {
    let mut packer = Packer::with_capacity(unsigned_bytes.len() + 8 + credentials.len() * 73);
    packer.put_bytes(unsigned_bytes);
    pack_seq(&mut packer, credentials);
    packer.into_vec()
}

/// The ID of a standalone signed encoding, without decoding it.
pub fn compute_tx_id(signed_bytes: &[u8]) -> Id {
    Id::new(sha256(signed_bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::{ChainSignature, EvmOutput, ShortId, TransferableInput};
    use crate::transaction::unsigned::UnsignedImportTx;

    fn sig(fill: u8, v: u8) -> ChainSignature {
        let mut raw = [fill; 65];
        raw[64] = v;
        ChainSignature::from_bytes(raw).unwrap()
    }

    fn sample() -> AtomicTx {
        let unsigned = UnsignedAtomicTx::Import(UnsignedImportTx {
            network_id: 1,
            blockchain_id: Id::new([9; 32]),
            source_chain: Id::EMPTY,
            imported_inputs: vec![TransferableInput {
                tx_id: Id::new([1; 32]),
                output_index: 3,
                asset_id: Id::new([2; 32]),
                amount: 50_000,
                sig_indices: vec![0],
            }],
            outs: vec![EvmOutput {
                address: ShortId::new([5; 20]),
                amount: 40_000,
                asset_id: Id::new([2; 32]),
            }],
        });
        AtomicTx::new(unsigned, vec![Credential::single(sig(0x42, 1))])
    }

    #[test]
    fn signed_layout_and_id() {
        let tx = sample();
        let bytes = tx.to_bytes();
        // 230 versioned unsigned bytes, then 4 count + 4 tag + 4 count + 65 sig.
        assert_eq!(bytes.len(), 230 + 77);
        assert_eq!(&bytes[230..242], &[0, 0, 0, 1, 0, 0, 0, 9, 0, 0, 0, 1]);
        assert_eq!(*tx.id(), compute_tx_id(&bytes));
    }

    #[test]
    fn standalone_roundtrip() {
        let tx = sample();
        let decoded = AtomicTx::from_bytes(&tx.to_bytes()).unwrap();
        assert_eq!(decoded, tx);
    }

    #[test]
    fn unversioned_decode_yields_same_id() {
        let tx = sample();
        let decoded = AtomicTx::from_unversioned_bytes(&tx.to_unversioned_bytes()).unwrap();
        assert_eq!(decoded.id(), tx.id());
        assert_eq!(decoded.to_bytes(), tx.to_bytes());
    }

    #[test]
    fn append_matches_full_encoding() {
        let tx = sample();
        let spliced = append_credentials(&tx.unsigned().to_bytes(), tx.credentials());
        assert_eq!(spliced, tx.to_bytes());
    }

    #[test]
    fn wrong_version_is_rejected() {
        let mut bytes = sample().to_bytes();
        bytes[1] = 1;
        assert_eq!(
            AtomicTx::from_bytes(&bytes).unwrap_err(),
            CodecError::UnsupportedVersion(1)
        );
    }

    #[test]
    fn bad_credential_tag_is_rejected() {
        let mut bytes = sample().to_bytes();
        bytes[237] = 8;
        assert!(matches!(
            AtomicTx::from_bytes(&bytes),
            Err(CodecError::UnknownTypeTag {
                context: "credential",
                tag: 8
            })
        ));
    }

    #[test]
    fn bad_recovery_id_in_credential_is_rejected() {
        let mut bytes = sample().to_bytes();
        let last = bytes.len() - 1;
        bytes[last] = 4;
        assert!(matches!(AtomicTx::from_bytes(&bytes), Err(CodecError::InvalidRecord(_))));
    }

    #[test]
    fn id_changes_with_credentials() {
        let tx = sample();
        let other = AtomicTx::new(tx.unsigned().clone(), vec![Credential::single(sig(0x43, 0))]);
        assert_ne!(tx.id(), other.id());
    }
}
