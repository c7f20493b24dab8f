//! Value types for atomic transactions.
//!
//! Every record here maps one-to-one onto a wire layout. Fixed-length byte
//! fields are fixed-size arrays, so a 31-byte asset ID simply cannot be
//! constructed. The two invariants the type system can't carry on its own
//! (signature recovery IDs and output thresholds) are checked by the
//! constructors and by the decoders, which go through the same checks.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::codec::{pack_seq, unpack_seq, CodecError, Packable, Packer, Reader};
use crate::config::{
    ID_LEN, SHORT_ID_LEN, SIGNATURE_LEN, TYPE_SECP256K1_CREDENTIAL, TYPE_SECP256K1_TRANSFER_INPUT,
    TYPE_SECP256K1_TRANSFER_OUTPUT,
};

/// Minimum encoded size of a [`TransferableInput`] (empty signer list).
pub const TRANSFERABLE_INPUT_MIN_LEN: usize = ID_LEN + 4 + ID_LEN + 4 + 8 + 4;

/// Minimum encoded size of a [`TransferableOutput`] (empty address list).
pub const TRANSFERABLE_OUTPUT_MIN_LEN: usize = ID_LEN + 4 + 8 + 8 + 4 + 4;

/// Encoded size of an [`EvmInput`].
pub const EVM_INPUT_LEN: usize = SHORT_ID_LEN + 8 + ID_LEN + 8;

/// Encoded size of an [`EvmOutput`].
pub const EVM_OUTPUT_LEN: usize = SHORT_ID_LEN + 8 + ID_LEN;

/// Minimum encoded size of a [`Credential`] (no signatures).
pub const CREDENTIAL_MIN_LEN: usize = 4 + 4;

// ---------------------------------------------------------------------------
// Id / ShortId
// ---------------------------------------------------------------------------

/// A 32-byte identifier: transaction IDs, blockchain IDs, asset IDs.
///
/// Ordering is plain lexicographic byte order, which is exactly what the
/// canonical input sort needs.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Id([u8; ID_LEN]);

impl Id {
    /// The all-zero ID. The P-Chain's blockchain ID happens to be this.
    pub const EMPTY: Id = Id([0u8; ID_LEN]);

    pub const fn new(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }

    /// Builds an ID from a slice that must be exactly 32 bytes long.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; ID_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            field: "id",
            expected: ID_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parses lowercase or uppercase hex, with or without a `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let raw = decode_hex(s)?;
        Self::from_slice(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; ID_LEN]> for Id {
    fn from(bytes: [u8; ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Id({})", self.to_hex())
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Packable for Id {
    fn pack(&self, packer: &mut Packer) {
        packer.put_bytes(&self.0);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(reader.read_array()?))
    }
}

/// A 20-byte short identifier. Used for addresses, both on the EVM side and
/// in output owner lists.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct ShortId([u8; SHORT_ID_LEN]);

impl ShortId {
    pub const EMPTY: ShortId = ShortId([0u8; SHORT_ID_LEN]);

    pub const fn new(bytes: [u8; SHORT_ID_LEN]) -> Self {
        Self(bytes)
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; SHORT_ID_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            field: "short id",
            expected: SHORT_ID_LEN,
            actual: bytes.len(),
        })?;
        Ok(Self(arr))
    }

    /// Parses a hex address such as `0x8db97c7cece249c2b98bdc0226cc4c2a57bf52fc`.
    pub fn from_hex(s: &str) -> Result<Self, CodecError> {
        let raw = decode_hex(s)?;
        Self::from_slice(&raw)
    }

    pub fn as_bytes(&self) -> &[u8; SHORT_ID_LEN] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl From<[u8; SHORT_ID_LEN]> for ShortId {
    fn from(bytes: [u8; SHORT_ID_LEN]) -> Self {
        Self(bytes)
    }
}

impl fmt::Debug for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ShortId(0x{})", self.to_hex())
    }
}

impl fmt::Display for ShortId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", self.to_hex())
    }
}

impl Packable for ShortId {
    fn pack(&self, packer: &mut Packer) {
        packer.put_bytes(&self.0);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self(reader.read_array()?))
    }
}

fn decode_hex(s: &str) -> Result<Vec<u8>, CodecError> {
    let trimmed = s.strip_prefix("0x").unwrap_or(s);
    hex::decode(trimmed).map_err(|e| CodecError::InvalidRecord(format!("invalid hex: {}", e)))
}

// IDs travel through JSON as hex strings, never as 32-element arrays.
macro_rules! hex_serde {
    ($ty:ty) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(&self.to_hex())
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = String::deserialize(deserializer)?;
                <$ty>::from_hex(&s).map_err(serde::de::Error::custom)
            }
        }
    };
}

hex_serde!(Id);
hex_serde!(ShortId);

// ---------------------------------------------------------------------------
// ChainSignature
// ---------------------------------------------------------------------------

/// A compact recoverable secp256k1 signature: `r(32) || s(32) || v(1)` with
/// `v` in `[0, 3]`.
///
/// Only [`ChainSignature::from_bytes`] and the decoder create one, and both
/// reject an out-of-range recovery ID.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainSignature([u8; SIGNATURE_LEN]);

impl ChainSignature {
    /// Wraps 65 bytes, checking the recovery ID.
    pub fn from_bytes(bytes: [u8; SIGNATURE_LEN]) -> Result<Self, CodecError> {
        let v = bytes[SIGNATURE_LEN - 1];
        if v > 3 {
            return Err(CodecError::InvalidRecord(format!(
                "signature recovery id {} outside [0, 3]",
                v
            )));
        }
        Ok(Self(bytes))
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, CodecError> {
        let arr: [u8; SIGNATURE_LEN] = bytes.try_into().map_err(|_| CodecError::InvalidLength {
            field: "signature",
            expected: SIGNATURE_LEN,
            actual: bytes.len(),
        })?;
        Self::from_bytes(arr)
    }

    /// Caller guarantees `bytes[64] <= 3`.
    pub(crate) fn from_bytes_unchecked(bytes: [u8; SIGNATURE_LEN]) -> Self {
        debug_assert!(bytes[SIGNATURE_LEN - 1] <= 3);
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LEN] {
        &self.0
    }

    /// The 64-byte `r || s` part.
    pub fn rs(&self) -> &[u8] {
        &self.0[..64]
    }

    /// The recovery ID, always in `[0, 3]`.
    pub fn recovery_id(&self) -> u8 {
        self.0[SIGNATURE_LEN - 1]
    }
}

impl fmt::Debug for ChainSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChainSignature({})", hex::encode(self.0))
    }
}

impl Serialize for ChainSignature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(self.0))
    }
}

impl Packable for ChainSignature {
    fn pack(&self, packer: &mut Packer) {
        packer.put_bytes(&self.0);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Self::from_bytes(reader.read_array()?)
    }
}

// ---------------------------------------------------------------------------
// TransferableInput
// ---------------------------------------------------------------------------

/// A reference to a UTXO on the source chain, plus the amount it carries and
/// which of its owners sign for it.
///
/// Wire: `txId | outputIndex | assetId | tag(5) | amount | sigIndices`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableInput {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub amount: u64,
    pub sig_indices: Vec<u32>,
}

impl TransferableInput {
    /// Canonical order: `tx_id` bytewise, then `output_index`.
    ///
    /// Not an `Ord` impl because two inputs can tie on this key and still
    /// differ in other fields.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.tx_id, self.output_index).cmp(&(other.tx_id, other.output_index))
    }
}

impl Packable for TransferableInput {
    fn pack(&self, packer: &mut Packer) {
        self.tx_id.pack(packer);
        packer.put_u32(self.output_index);
        self.asset_id.pack(packer);
        packer.put_u32(TYPE_SECP256K1_TRANSFER_INPUT);
        packer.put_u64(self.amount);
        pack_seq(packer, &self.sig_indices);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let tx_id = Id::unpack(reader)?;
        let output_index = reader.read_u32()?;
        let asset_id = Id::unpack(reader)?;
        reader.expect_type_tag("transfer input", TYPE_SECP256K1_TRANSFER_INPUT)?;
        let amount = reader.read_u64()?;
        let sig_indices = unpack_seq(reader, "signature indices", 4)?;
        Ok(Self {
            tx_id,
            output_index,
            asset_id,
            amount,
            sig_indices,
        })
    }
}

// ---------------------------------------------------------------------------
// TransferableOutput
// ---------------------------------------------------------------------------

/// An output on the destination chain of an export, locked to a threshold
/// of addresses.
///
/// Fields are private so the `threshold <= addresses.len()` invariant holds
/// for every value in existence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferableOutput {
    asset_id: Id,
    amount: u64,
    locktime: u64,
    threshold: u32,
    addresses: Vec<ShortId>,
}

impl TransferableOutput {
    pub fn new(
        asset_id: Id,
        amount: u64,
        locktime: u64,
        threshold: u32,
        addresses: Vec<ShortId>,
    ) -> Result<Self, CodecError> {
        if threshold as usize > addresses.len() {
            return Err(CodecError::InvalidRecord(format!(
                "output threshold {} exceeds {} addresses",
                threshold,
                addresses.len()
            )));
        }
        Ok(Self {
            asset_id,
            amount,
            locktime,
            threshold,
            addresses,
        })
    }

    /// Unlocked output spendable by one address. Threshold 1 over one
    /// address always holds, so this cannot fail.
    pub fn single_owner(asset_id: Id, amount: u64, address: ShortId) -> Self {
        Self {
            asset_id,
            amount,
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }

    pub fn asset_id(&self) -> &Id {
        &self.asset_id
    }

    pub fn amount(&self) -> u64 {
        self.amount
    }

    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn addresses(&self) -> &[ShortId] {
        &self.addresses
    }
}

impl Packable for TransferableOutput {
    fn pack(&self, packer: &mut Packer) {
        self.asset_id.pack(packer);
        packer.put_u32(TYPE_SECP256K1_TRANSFER_OUTPUT);
        packer.put_u64(self.amount);
        packer.put_u64(self.locktime);
        packer.put_u32(self.threshold);
        pack_seq(packer, &self.addresses);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        let asset_id = Id::unpack(reader)?;
        reader.expect_type_tag("transfer output", TYPE_SECP256K1_TRANSFER_OUTPUT)?;
        let amount = reader.read_u64()?;
        let locktime = reader.read_u64()?;
        let threshold = reader.read_u32()?;
        let addresses = unpack_seq(reader, "output addresses", SHORT_ID_LEN)?;
        Self::new(asset_id, amount, locktime, threshold, addresses)
    }
}

// ---------------------------------------------------------------------------
// EvmInput / EvmOutput
// ---------------------------------------------------------------------------

/// An EVM account debited by an export.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmInput {
    pub address: ShortId,
    pub amount: u64,
    pub asset_id: Id,
    pub nonce: u64,
}

impl EvmInput {
    /// Canonical order: `address`, then `asset_id`.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.address, self.asset_id).cmp(&(other.address, other.asset_id))
    }
}

impl Packable for EvmInput {
    fn pack(&self, packer: &mut Packer) {
        self.address.pack(packer);
        packer.put_u64(self.amount);
        self.asset_id.pack(packer);
        packer.put_u64(self.nonce);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            address: ShortId::unpack(reader)?,
            amount: reader.read_u64()?,
            asset_id: Id::unpack(reader)?,
            nonce: reader.read_u64()?,
        })
    }
}

/// An EVM account credited by an import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EvmOutput {
    pub address: ShortId,
    pub amount: u64,
    pub asset_id: Id,
}

impl EvmOutput {
    /// Canonical order: `address`, then `asset_id`.
    pub fn canonical_cmp(&self, other: &Self) -> Ordering {
        (self.address, self.asset_id).cmp(&(other.address, other.asset_id))
    }
}

impl Packable for EvmOutput {
    fn pack(&self, packer: &mut Packer) {
        self.address.pack(packer);
        packer.put_u64(self.amount);
        self.asset_id.pack(packer);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        Ok(Self {
            address: ShortId::unpack(reader)?,
            amount: reader.read_u64()?,
            asset_id: Id::unpack(reader)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Credential
// ---------------------------------------------------------------------------

/// The signatures authorizing one input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Credential {
    pub signatures: Vec<ChainSignature>,
}

impl Credential {
    /// A credential carrying exactly one signature, the only shape the
    /// builder produces.
    pub fn single(signature: ChainSignature) -> Self {
        Self {
            signatures: vec![signature],
        }
    }
}

impl Packable for Credential {
    fn pack(&self, packer: &mut Packer) {
        packer.put_u32(TYPE_SECP256K1_CREDENTIAL);
        pack_seq(packer, &self.signatures);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.expect_type_tag("credential", TYPE_SECP256K1_CREDENTIAL)?;
        let signatures = unpack_seq(reader, "signatures", SIGNATURE_LEN)?;
        Ok(Self { signatures })
    }
}

// ---------------------------------------------------------------------------
// Utxo
// ---------------------------------------------------------------------------

/// A spendable output as reported by the UTXO-lookup service.
///
/// Single-owner only: `address` is the one key that can spend it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Utxo {
    pub tx_id: Id,
    pub output_index: u32,
    pub asset_id: Id,
    pub amount: u64,
    pub address: ShortId,
}

impl Utxo {
    /// The input that spends this UTXO with signer index 0.
    pub fn to_input(&self) -> TransferableInput {
        TransferableInput {
            tx_id: self.tx_id,
            output_index: self.output_index,
            asset_id: self.asset_id,
            amount: self.amount,
            sig_indices: vec![0],
        }
    }
}

// ---------------------------------------------------------------------------
// TxKind
// ---------------------------------------------------------------------------

/// Which of the two atomic transaction kinds a body is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxKind {
    /// Moves funds onto this chain.
    Import,
    /// Moves funds off this chain.
    Export,
}

impl fmt::Display for TxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Export => write!(f, "export"),
        }
    }
}

// ---------------------------------------------------------------------------
// TxStatus
// ---------------------------------------------------------------------------

/// Status string returned by the submission service.
///
/// Anything the service says that we don't recognise becomes `Unknown`
/// rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxStatus {
    Accepted,
    Processing,
    Rejected,
    Unknown,
}

impl TxStatus {
    /// `true` once the status can no longer change.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Accepted | Self::Rejected)
    }
}

impl FromStr for TxStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Accepted" => Self::Accepted,
            "Processing" => Self::Processing,
            "Rejected" => Self::Rejected,
            _ => Self::Unknown,
        })
    }
}

impl fmt::Display for TxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "Accepted"),
            Self::Processing => write!(f, "Processing"),
            Self::Rejected => write!(f, "Rejected"),
            Self::Unknown => write!(f, "Unknown"),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
