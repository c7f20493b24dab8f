//! # Protocol Configuration & Constants
//!
//! Every magic number in the atomic codec lives here. These values are not
//! ours to choose: they are fixed by the reference node, and a single wrong
//! byte width turns every transaction ID we compute into garbage.
//!
//! The only knob that is genuinely ours is the batch-count ceiling in
//! [`DecoderConfig`], which guards allocation and carries no protocol meaning.

use serde::{Deserialize, Serialize};

use crate::crypto::{cb58, CryptoError};
use crate::transaction::types::Id;

// ---------------------------------------------------------------------------
// Codec
// ---------------------------------------------------------------------------

/// The only codec version we speak. Blobs with any other version are not
/// atomic data as far as we are concerned.
pub const CODEC_VERSION: u16 = 0;

/// Type tag of an unsigned import body.
pub const TYPE_UNSIGNED_IMPORT_TX: u32 = 0;

/// Type tag of an unsigned export body.
pub const TYPE_UNSIGNED_EXPORT_TX: u32 = 1;

/// Type tag of a secp256k1 transfer input payload.
pub const TYPE_SECP256K1_TRANSFER_INPUT: u32 = 5;

/// Type tag of a secp256k1 transfer output payload.
pub const TYPE_SECP256K1_TRANSFER_OUTPUT: u32 = 7;

/// Type tag of a secp256k1 credential.
pub const TYPE_SECP256K1_CREDENTIAL: u32 = 9;

/// Length of a full ID (tx IDs, chain IDs, asset IDs).
pub const ID_LEN: usize = 32;

/// Length of a short ID (addresses).
pub const SHORT_ID_LEN: usize = 20;

/// Compact recoverable signature: `r(32) || s(32) || v(1)`.
pub const SIGNATURE_LEN: usize = 65;

// ---------------------------------------------------------------------------
// Gas & Fees
// ---------------------------------------------------------------------------

/// Gas charged per encoded byte of the unsigned transaction.
pub const TX_BYTES_GAS: u64 = 1;

/// Gas charged per signature the transaction carries.
pub const COST_PER_SIGNATURE: u64 = 1_000;

/// Flat surcharge on every atomic transaction.
pub const ATOMIC_TX_INTRINSIC_GAS: u64 = 10_000;

/// Gas of one encoded EVM output (`20 + 8 + 32` bytes at one gas per byte).
pub const EVM_OUTPUT_GAS: u64 = 60;

/// Gas of one EVM input: its output-sized body plus one signature.
pub const EVM_INPUT_GAS: u64 = EVM_OUTPUT_GAS + COST_PER_SIGNATURE;

/// Wei per minor unit of the native asset. Base fees are quoted in wei,
/// atomic amounts are denominated in minor units (1 minor unit = 1 gwei).
pub const X2C_RATE: u128 = 1_000_000_000;

// ---------------------------------------------------------------------------
// Decoder Limits
// ---------------------------------------------------------------------------

/// Default ceiling on the declared transaction count of a batch blob.
///
/// A real block carries a handful of atomic transactions. Anything past this
/// is corrupt or hostile and is treated as "no atomic data".
pub const DEFAULT_MAX_BATCH_TXS: u32 = 1_000;

/// Tunable limits for the batch decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecoderConfig {
    /// Largest declared transaction count accepted before the blob is
    /// discarded as corrupt.
    #[serde(default = "default_max_batch_txs")]
    pub max_batch_txs: u32,
}

fn default_max_batch_txs() -> u32 {
    DEFAULT_MAX_BATCH_TXS
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_batch_txs: DEFAULT_MAX_BATCH_TXS,
        }
    }
}

// ---------------------------------------------------------------------------
// Network Presets
// ---------------------------------------------------------------------------

/// Mainnet network ID.
pub const MAINNET_ID: u32 = 1;

/// Fuji testnet network ID.
pub const FUJI_ID: u32 = 5;

/// The P-Chain's blockchain ID is the empty ID.
pub const P_CHAIN_ID: Id = Id::EMPTY;

/// Static parameters of a known network. IDs are kept in their CB58 form,
/// the way explorers and node configs print them, and decoded on demand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkParams {
    /// Short lowercase name, used by the CLI.
    pub name: &'static str,
    /// Numeric network ID written into every unsigned body.
    pub network_id: u32,
    /// CB58 C-Chain blockchain ID.
    pub c_chain_id: &'static str,
    /// CB58 ID of the native asset.
    pub avax_asset_id: &'static str,
    /// Public API base URL.
    pub api_url: &'static str,
}

/// Mainnet.
pub const MAINNET: NetworkParams = NetworkParams {
    name: "mainnet",
    network_id: MAINNET_ID,
    c_chain_id: "2q9e4r6Mu3U68nU1fYjgbR6JvwrRx36CohpAX5UQxse55x1Q5",
    avax_asset_id: "FvwEAhmxKfeiG8SnEvq42hc6whRyY3EFYAvebMqDNDGCgxN5Z",
    api_url: "https://api.avax.network",
};

/// Fuji testnet.
pub const FUJI: NetworkParams = NetworkParams {
    name: "fuji",
    network_id: FUJI_ID,
    c_chain_id: "yH8D7ThNJkxmtkuv2jgBa4P1Rn3Qpr4pPr7QYNfcdoS6k6HWp",
    avax_asset_id: "U8iRqJoiJm8xZHAacmvYyZVwqQx6uDNtQeP3CQ6fcgQk3JqnK",
    api_url: "https://api.avax-test.network",
};

impl NetworkParams {
    /// Looks up a preset by name (`"mainnet"` or `"fuji"`, case-insensitive).
    pub fn by_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "mainnet" => Some(MAINNET),
            "fuji" | "testnet" => Some(FUJI),
            _ => None,
        }
    }

    /// Decoded C-Chain blockchain ID.
    pub fn c_chain(&self) -> Result<Id, CryptoError> {
        cb58::decode_id(self.c_chain_id)
    }

    /// Decoded native asset ID.
    pub fn avax_asset(&self) -> Result<Id, CryptoError> {
        cb58::decode_id(self.avax_asset_id)
    }
}

/// Returns a friendly name for a network ID, mainly for logging.
pub fn network_name(network_id: u32) -> String {
    match network_id {
        MAINNET_ID => "mainnet".to_string(),
        FUJI_ID => "fuji".to_string(),
        other => format!("unknown({})", other),
    }
}
