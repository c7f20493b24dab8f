//! Unsigned transaction bodies.
//!
//! An unsigned body is everything a signer commits to. Its versioned
//! encoding, `version | typeTag | body`, is the preimage of the signing
//! digest, and it is also the exact byte string the fee is charged on.

use serde::Serialize;

use super::types::{
    EvmInput, EvmOutput, Id, TransferableInput, TransferableOutput, TxKind, EVM_INPUT_LEN, EVM_OUTPUT_LEN,
    TRANSFERABLE_INPUT_MIN_LEN, TRANSFERABLE_OUTPUT_MIN_LEN,
};
use crate::codec::{pack_seq, unpack_seq, CodecError, Packable, Packer, Reader};
use crate::config::{CODEC_VERSION, TYPE_UNSIGNED_EXPORT_TX, TYPE_UNSIGNED_IMPORT_TX};
use crate::crypto::sha256;

// ---------------------------------------------------------------------------
// UnsignedImportTx
// ---------------------------------------------------------------------------

/// Consumes UTXOs exported from `source_chain` and credits EVM accounts.
///
/// Wire: `networkId | blockchainId | sourceChain | inputs | outs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedImportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub source_chain: Id,
    pub imported_inputs: Vec<TransferableInput>,
    pub outs: Vec<EvmOutput>,
}

impl UnsignedImportTx {
    /// Sum of the input amounts, `None` on overflow.
    pub fn input_total(&self) -> Option<u64> {
        self.imported_inputs
            .iter()
            .try_fold(0u64, |acc, input| acc.checked_add(input.amount))
    }

    /// Sum of the output amounts, `None` on overflow.
    pub fn output_total(&self) -> Option<u64> {
        self.outs.iter().try_fold(0u64, |acc, out| acc.checked_add(out.amount))
    }

    /// Number of signatures the credentials must carry.
    pub fn signature_count(&self) -> usize {
        self.imported_inputs.iter().map(|i| i.sig_indices.len()).sum()
    }

    /// `version | typeTag(0) | body`, without wrapping in [`UnsignedAtomicTx`].
    pub fn to_bytes(&self) -> Vec<u8> {
        versioned(TYPE_UNSIGNED_IMPORT_TX, self)
    }
}

impl Packable for UnsignedImportTx {
    fn pack(&self, packer: &mut Packer) {
        packer.put_u32(self.network_id);
        self.blockchain_id.pack(packer);
        self.source_chain.pack(packer);
        pack_seq(packer, &self.imported_inputs);
        pack_seq(packer, &self.outs);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: reader.read_u32()?,
            blockchain_id: Id::unpack(reader)?,
            source_chain: Id::unpack(reader)?,
            imported_inputs: unpack_seq(reader, "imported inputs", TRANSFERABLE_INPUT_MIN_LEN)?,
            outs: unpack_seq(reader, "evm outputs", EVM_OUTPUT_LEN)?,
        })
    }
}

// ---------------------------------------------------------------------------
// UnsignedExportTx
// ---------------------------------------------------------------------------

/// Debits EVM accounts and creates UTXOs on `destination_chain`.
///
/// Wire: `networkId | blockchainId | destinationChain | ins | exportedOutputs`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedExportTx {
    pub network_id: u32,
    pub blockchain_id: Id,
    pub destination_chain: Id,
    pub ins: Vec<EvmInput>,
    pub exported_outputs: Vec<TransferableOutput>,
}

impl UnsignedExportTx {
    pub fn input_total(&self) -> Option<u64> {
        self.ins.iter().try_fold(0u64, |acc, input| acc.checked_add(input.amount))
    }

    pub fn output_total(&self) -> Option<u64> {
        self.exported_outputs
            .iter()
            .try_fold(0u64, |acc, out| acc.checked_add(out.amount()))
    }

    /// `version | typeTag(1) | body`.
    pub fn to_bytes(&self) -> Vec<u8> {
        versioned(TYPE_UNSIGNED_EXPORT_TX, self)
    }
}

fn versioned<T: Packable>(type_tag: u32, body: &T) -> Vec<u8> {
    let mut packer = Packer::with_capacity(256);
    packer.put_u16(CODEC_VERSION);
    packer.put_u32(type_tag);
    body.pack(&mut packer);
    packer.into_vec()
}

impl Packable for UnsignedExportTx {
    fn pack(&self, packer: &mut Packer) {
        packer.put_u32(self.network_id);
        self.blockchain_id.pack(packer);
        self.destination_chain.pack(packer);
        pack_seq(packer, &self.ins);
        pack_seq(packer, &self.exported_outputs);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            network_id: reader.read_u32()?,
            blockchain_id: Id::unpack(reader)?,
            destination_chain: Id::unpack(reader)?,
            ins: unpack_seq(reader, "evm inputs", EVM_INPUT_LEN)?,
            exported_outputs: unpack_seq(reader, "exported outputs", TRANSFERABLE_OUTPUT_MIN_LEN)?,
        })
    }
}

// ---------------------------------------------------------------------------
// UnsignedAtomicTx
// ---------------------------------------------------------------------------

/// The closed set of unsigned bodies, dispatched by type tag.
///
/// Encodes as `typeTag | body`. An unknown tag is a decode error, never a
/// default.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum UnsignedAtomicTx {
    Import(UnsignedImportTx),
    Export(UnsignedExportTx),
}

impl UnsignedAtomicTx {
    pub fn kind(&self) -> TxKind {
        match self {
            Self::Import(_) => TxKind::Import,
            Self::Export(_) => TxKind::Export,
        }
    }

    pub fn type_tag(&self) -> u32 {
        match self {
            Self::Import(_) => TYPE_UNSIGNED_IMPORT_TX,
            Self::Export(_) => TYPE_UNSIGNED_EXPORT_TX,
        }
    }

    pub fn network_id(&self) -> u32 {
        match self {
            Self::Import(tx) => tx.network_id,
            Self::Export(tx) => tx.network_id,
        }
    }

    pub fn blockchain_id(&self) -> &Id {
        match self {
            Self::Import(tx) => &tx.blockchain_id,
            Self::Export(tx) => &tx.blockchain_id,
        }
    }

    /// Number of inputs, which is also the number of credentials a signed
    /// transaction must carry.
    pub fn input_count(&self) -> usize {
        match self {
            Self::Import(tx) => tx.imported_inputs.len(),
            Self::Export(tx) => tx.ins.len(),
        }
    }

    /// Number of outputs.
    pub fn output_count(&self) -> usize {
        match self {
            Self::Import(tx) => tx.outs.len(),
            Self::Export(tx) => tx.exported_outputs.len(),
        }
    }

    pub fn as_import(&self) -> Option<&UnsignedImportTx> {
        match self {
            Self::Import(tx) => Some(tx),
            Self::Export(_) => None,
        }
    }

    pub fn as_export(&self) -> Option<&UnsignedExportTx> {
        match self {
            Self::Export(tx) => Some(tx),
            Self::Import(_) => None,
        }
    }

    /// `version | typeTag | body`: the signing preimage.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Import(tx) => tx.to_bytes(),
            Self::Export(tx) => tx.to_bytes(),
        }
    }

    /// Decodes a versioned unsigned body. Trailing bytes are an error.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        let mut reader = Reader::new(bytes);
        reader.expect_version()?;
        let tx = Self::unpack(&mut reader)?;
        reader.finish()?;
        Ok(tx)
    }

    /// SHA-256 of [`to_bytes`](Self::to_bytes). Every credential signs this.
    pub fn signing_digest(&self) -> [u8; 32] {
        sha256(&self.to_bytes())
    }
}

impl From<UnsignedImportTx> for UnsignedAtomicTx {
    fn from(tx: UnsignedImportTx) -> Self {
        Self::Import(tx)
    }
}

impl From<UnsignedExportTx> for UnsignedAtomicTx {
    fn from(tx: UnsignedExportTx) -> Self {
        Self::Export(tx)
    }
}

impl Packable for UnsignedAtomicTx {
    fn pack(&self, packer: &mut Packer) {
        packer.put_u32(self.type_tag());
        match self {
            Self::Import(tx) => tx.pack(packer),
            Self::Export(tx) => tx.pack(packer),
        }
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        match reader.read_u32()? {
            TYPE_UNSIGNED_IMPORT_TX => Ok(Self::Import(UnsignedImportTx::unpack(reader)?)),
            TYPE_UNSIGNED_EXPORT_TX => Ok(Self::Export(UnsignedExportTx::unpack(reader)?)),
            tag => Err(CodecError::UnknownTypeTag {
                context: "unsigned atomic tx",
                tag,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::ShortId;

    fn id(b: u8) -> Id {
        Id::new([b; 32])
    }

    fn sample_import() -> UnsignedImportTx {
        UnsignedImportTx {
            network_id: 5,
            blockchain_id: id(0xCC),
            source_chain: Id::EMPTY,
            imported_inputs: vec![TransferableInput {
                tx_id: id(0x11),
                output_index: 0,
                asset_id: id(0xAA),
                amount: 1_000_000,
                sig_indices: vec![0],
            }],
            outs: vec![EvmOutput {
                address: ShortId::new([0x22; 20]),
                amount: 1_000_000,
                asset_id: id(0xAA),
            }],
        }
    }

    fn sample_export() -> UnsignedExportTx {
        UnsignedExportTx {
            network_id: 1,
            blockchain_id: id(0xCC),
            destination_chain: Id::EMPTY,
            ins: vec![EvmInput {
                address: ShortId::new([0x33; 20]),
                amount: 5_000,
                asset_id: id(0xAA),
                nonce: 9,
            }],
            exported_outputs: vec![TransferableOutput::new(id(0xAA), 4_000, 0, 1, vec![ShortId::new([0x44; 20])])
                .unwrap()],
        }
    }

    #[test]
    fn single_input_import_is_230_bytes() {
        // 2 version + 4 tag + 4 network + 32 + 32 chains
        // + 4 count + 88 input + 4 count + 60 output
        let bytes = UnsignedAtomicTx::Import(sample_import()).to_bytes();
        assert_eq!(bytes.len(), 230);
        assert_eq!(&bytes[..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(&bytes[6..10], &5u32.to_be_bytes());
    }

    #[test]
    fn export_tag_is_one() {
        let bytes = UnsignedAtomicTx::Export(sample_export()).to_bytes();
        assert_eq!(&bytes[2..6], &[0, 0, 0, 1]);
    }

    #[test]
    fn versioned_roundtrip() {
        for tx in [
            UnsignedAtomicTx::from(sample_import()),
            UnsignedAtomicTx::from(sample_export()),
        ] {
            let bytes = tx.to_bytes();
            assert_eq!(UnsignedAtomicTx::from_bytes(&bytes).unwrap(), tx);
        }
    }

    #[test]
    fn unknown_body_tag_is_rejected() {
        let mut bytes = UnsignedAtomicTx::from(sample_import()).to_bytes();
        bytes[5] = 2;
        assert_eq!(
            UnsignedAtomicTx::from_bytes(&bytes).unwrap_err(),
            CodecError::UnknownTypeTag {
                context: "unsigned atomic tx",
                tag: 2
            }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = UnsignedAtomicTx::from(sample_import()).to_bytes();
        bytes.push(0);
        assert_eq!(
            UnsignedAtomicTx::from_bytes(&bytes).unwrap_err(),
            CodecError::TrailingBytes(1)
        );
    }

    #[test]
    fn truncated_body_is_rejected() {
        let bytes = UnsignedAtomicTx::from(sample_export()).to_bytes();
        for cut in [1, 6, 50, bytes.len() - 1] {
            assert!(UnsignedAtomicTx::from_bytes(&bytes[..cut]).is_err(), "cut at {}", cut);
        }
    }

    #[test]
    fn totals_and_accessors() {
        let import = sample_import();
        assert_eq!(import.input_total(), Some(1_000_000));
        assert_eq!(import.signature_count(), 1);
        let export = sample_export();
        assert_eq!(export.input_total(), Some(5_000));
        assert_eq!(export.output_total(), Some(4_000));

        let tx = UnsignedAtomicTx::from(export);
        assert_eq!(tx.kind(), TxKind::Export);
        assert_eq!(tx.network_id(), 1);
        assert_eq!(tx.input_count(), 1);
        assert!(tx.as_import().is_none());
    }

    #[test]
    fn body_bytes_match_wrapped_bytes() {
        let import = sample_import();
        assert_eq!(import.to_bytes(), UnsignedAtomicTx::from(import.clone()).to_bytes());
        let export = sample_export();
        assert_eq!(export.to_bytes(), UnsignedAtomicTx::from(export.clone()).to_bytes());
    }

    #[test]
    fn digest_is_hash_of_versioned_bytes() {
        let tx = UnsignedAtomicTx::from(sample_import());
        assert_eq!(tx.signing_digest(), sha256(&tx.to_bytes()));
    }
}
