//! Import transaction construction.
//!
//! The [`ImportTxBuilder`] turns a set of spendable UTXOs into an unsigned
//! import that credits one EVM address with everything minus the fee.
//!
//! The fee depends on the encoded size, and the encoded size depends on
//! the output. The output amount is a fixed-width `u64`, though, so the
//! size of a provisional transaction crediting the full total is the size
//! of the final one. Measure once, deduct, re-encode.
//!
//! The builder does not sign; that happens in [`super::signing`].

use std::collections::HashSet;

use thiserror::Error;
use tracing::debug;

use super::fee::{calculate_fee, gas_used, FeeError};
use super::types::{EvmOutput, Id, ShortId, TransferableInput, Utxo};
use super::unsigned::UnsignedImportTx;
use crate::codec::CodecError;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Reasons a build is refused. No bytes are produced in any of these cases.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// There is nothing to import.
    #[error("no UTXOs to import")]
    NoInputs,

    /// The inputs do not cover the fee with anything left over.
    #[error("insufficient funds: have {available}, fee is {fee}")]
    InsufficientFunds { available: u64, fee: u64 },

    /// The input amounts sum past `u64::MAX`.
    #[error("input amounts overflow u64")]
    AmountOverflow,

    /// A UTXO is not denominated in the fee asset.
    #[error("UTXO {tx_id}:{output_index} holds asset {asset_id}, expected the fee asset")]
    AssetMismatch { tx_id: Id, output_index: u32, asset_id: Id },

    /// The same UTXO was supplied twice.
    #[error("duplicate UTXO {tx_id}:{output_index}")]
    DuplicateInput { tx_id: Id, output_index: u32 },

    /// A required builder field was never set.
    #[error("missing builder field: {0}")]
    MissingField(&'static str),

    #[error(transparent)]
    Fee(#[from] FeeError),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

// ---------------------------------------------------------------------------
// ChainIds
// ---------------------------------------------------------------------------

/// The two chain IDs an import names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChainIds {
    /// The chain the import executes on (the C-Chain).
    pub blockchain_id: Id,
    /// The chain the UTXOs were exported from.
    pub source_chain: Id,
}

// ---------------------------------------------------------------------------
// BuiltImport
// ---------------------------------------------------------------------------

/// A finished unsigned import and the numbers that went into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltImport {
    pub tx: UnsignedImportTx,
    /// Versioned unsigned encoding: the bytes to sign.
    pub bytes: Vec<u8>,
    pub gas: u64,
    pub fee: u64,
}

// ---------------------------------------------------------------------------
// ImportTxBuilder
// ---------------------------------------------------------------------------

/// Fluent builder for unsigned imports.
///
/// # Usage
///
/// ```rust
/// use atomix_protocol::transaction::builder::{ChainIds, ImportTxBuilder};
/// use atomix_protocol::transaction::types::{Id, ShortId, Utxo};
///
/// let avax = Id::new([0x21; 32]);
/// let built = ImportTxBuilder::new(5, ChainIds {
///         blockchain_id: Id::new([0x7f; 32]),
///         source_chain: Id::EMPTY,
///     })
///     .utxo(Utxo {
///         tx_id: Id::new([1; 32]),
///         output_index: 0,
///         asset_id: avax,
///         amount: 1_000_000,
///         address: ShortId::new([9; 20]),
///     })
///     .destination(ShortId::new([2; 20]))
///     .fee_asset(avax)
///     .base_fee(25_000_000_000)
///     .build()
///     .unwrap();
///
/// assert_eq!(built.tx.outs[0].amount, 1_000_000 - built.fee);
/// ```
///
/// Every input is spent with signer index 0: one key, one signature per
/// input. Multisig UTXOs are not supported.
#[derive(Debug, Clone)]
pub struct ImportTxBuilder {
    network_id: u32,
    chain_ids: ChainIds,
    utxos: Vec<Utxo>,
    destination: Option<ShortId>,
    fee_asset: Option<Id>,
    base_fee: u128,
}

impl ImportTxBuilder {
    /// Creates a builder. `base_fee` defaults to zero, which makes the
    /// import free; set it from the chain's current base fee.
    pub fn new(network_id: u32, chain_ids: ChainIds) -> Self {
        Self {
            network_id,
            chain_ids,
            utxos: Vec::new(),
            destination: None,
            fee_asset: None,
            base_fee: 0,
        }
    }

    /// Adds one UTXO.
    pub fn utxo(mut self, utxo: Utxo) -> Self {
        self.utxos.push(utxo);
        self
    }

    /// Adds UTXOs, in any order.
    pub fn utxos(mut self, utxos: impl IntoIterator<Item = Utxo>) -> Self {
        self.utxos.extend(utxos);
        self
    }

    /// EVM address credited by the import.
    pub fn destination(mut self, address: ShortId) -> Self {
        self.destination = Some(address);
        self
    }

    /// Asset the fee is paid in. Every UTXO must hold it.
    pub fn fee_asset(mut self, asset_id: Id) -> Self {
        self.fee_asset = Some(asset_id);
        self
    }

    /// Base fee in wei per gas unit.
    pub fn base_fee(mut self, wei: u128) -> Self {
        self.base_fee = wei;
        self
    }

    /// Consumes the builder and produces the unsigned import.
    pub fn build(self) -> Result<BuiltImport, BuildError> {
        let destination = self.destination.ok_or(BuildError::MissingField("destination"))?;
        let fee_asset = self.fee_asset.ok_or(BuildError::MissingField("fee_asset"))?;

        if self.utxos.is_empty() {
            return Err(BuildError::NoInputs);
        }

        let mut seen = HashSet::with_capacity(self.utxos.len());
        let mut total: u64 = 0;
        for utxo in &self.utxos {
            if utxo.asset_id != fee_asset {
                return Err(BuildError::AssetMismatch {
                    tx_id: utxo.tx_id,
                    output_index: utxo.output_index,
                    asset_id: utxo.asset_id,
                });
            }
            if !seen.insert((utxo.tx_id, utxo.output_index)) {
                return Err(BuildError::DuplicateInput {
                    tx_id: utxo.tx_id,
                    output_index: utxo.output_index,
                });
            }
            total = total.checked_add(utxo.amount).ok_or(BuildError::AmountOverflow)?;
        }

        let mut inputs: Vec<TransferableInput> = self.utxos.iter().map(Utxo::to_input).collect();
        inputs.sort_by(TransferableInput::canonical_cmp);

        let provisional = UnsignedImportTx {
            network_id: self.network_id,
            blockchain_id: self.chain_ids.blockchain_id,
            source_chain: self.chain_ids.source_chain,
            imported_inputs: inputs,
            outs: vec![EvmOutput {
                address: destination,
                amount: total,
                asset_id: fee_asset,
            }],
        };

        let encoded_len = provisional.to_bytes().len();
        let gas = gas_used(encoded_len, provisional.signature_count())?;
        let fee = calculate_fee(gas, self.base_fee)?;
        if total <= fee {
            return Err(BuildError::InsufficientFunds { available: total, fee });
        }

        // Same length as the provisional encoding: only a u64 changed.
        let tx = UnsignedImportTx {
            outs: vec![EvmOutput {
                address: destination,
                amount: total - fee,
                asset_id: fee_asset,
            }],
            ..provisional
        };
        let bytes = tx.to_bytes();

        debug!(
            inputs = tx.imported_inputs.len(),
            encoded_len,
            gas,
            fee,
            amount = total - fee,
            "built import transaction"
        );

        Ok(BuiltImport { tx, bytes, gas, fee })
    }
}

/// Builds an unsigned import and returns its versioned bytes.
///
/// The free-function form of [`ImportTxBuilder`]. Deterministic: the same
/// UTXO set in any order gives the same bytes.
pub fn build_import(
    network_id: u32,
    chain_ids: ChainIds,
    utxos: &[Utxo],
    destination: ShortId,
    fee_asset: Id,
    base_fee: u128,
) -> Result<Vec<u8>, BuildError> {
    ImportTxBuilder::new(network_id, chain_ids)
        .utxos(utxos.iter().cloned())
        .destination(destination)
        .fee_asset(fee_asset)
        .base_fee(base_fee)
        .build()
        .map(|built| built.bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::unsigned::UnsignedAtomicTx;

    const BASE_FEE: u128 = 25_000_000_000;

    fn avax() -> Id {
        Id::new([0x21; 32])
    }

    fn chains() -> ChainIds {
        ChainIds {
            blockchain_id: Id::new([0x7f; 32]),
            source_chain: Id::EMPTY,
        }
    }

    fn utxo(tx: u8, index: u32, amount: u64) -> Utxo {
        Utxo {
            tx_id: Id::new([tx; 32]),
            output_index: index,
            asset_id: avax(),
            amount,
            address: ShortId::new([0xEE; 20]),
        }
    }

    fn dest() -> ShortId {
        ShortId::new([0x0D; 20])
    }

    fn build(utxos: &[Utxo]) -> Result<BuiltImport, BuildError> {
        ImportTxBuilder::new(5, chains())
            .utxos(utxos.to_vec())
            .destination(dest())
            .fee_asset(avax())
            .base_fee(BASE_FEE)
            .build()
    }

    #[test]
    fn single_input_fee_and_amount() {
        let built = build(&[utxo(1, 0, 1_000_000)]).unwrap();
        assert_eq!(built.bytes.len(), 230);
        assert_eq!(built.gas, 11_230);
        assert_eq!(built.fee, 280_750);
        assert_eq!(built.tx.outs.len(), 1);
        assert_eq!(built.tx.outs[0].amount, 1_000_000 - 280_750);
        assert_eq!(built.tx.outs[0].address, dest());
        assert_eq!(built.tx.imported_inputs[0].sig_indices, vec![0]);
    }

    #[test]
    fn bytes_decode_back_to_the_built_tx() {
        let built = build(&[utxo(1, 0, 1_000_000), utxo(2, 1, 5)]).unwrap();
        let decoded = UnsignedAtomicTx::from_bytes(&built.bytes).unwrap();
        assert_eq!(decoded, UnsignedAtomicTx::Import(built.tx));
    }

    #[test]
    fn input_order_does_not_matter() {
        let a = [utxo(3, 0, 400_000), utxo(1, 7, 300_000), utxo(1, 2, 500_000)];
        let b = [a[2].clone(), a[0].clone(), a[1].clone()];
        let built_a = build(&a).unwrap();
        let built_b = build(&b).unwrap();
        assert_eq!(built_a.bytes, built_b.bytes);

        let keys: Vec<_> = built_a
            .tx
            .imported_inputs
            .iter()
            .map(|i| (i.tx_id.as_bytes()[0], i.output_index))
            .collect();
        assert_eq!(keys, vec![(1, 2), (1, 7), (3, 0)]);
    }

    #[test]
    fn gas_counts_one_signature_per_input() {
        let built = build(&[utxo(1, 0, 1_000_000), utxo(2, 0, 1_000_000)]).unwrap();
        // One more input adds 88 bytes and 1000 signature gas.
        assert_eq!(built.bytes.len(), 230 + 88);
        assert_eq!(built.gas, 11_230 + 88 + 1_000);
    }

    #[test]
    fn insufficient_funds() {
        let err = build(&[utxo(1, 0, 280_750)]).unwrap_err();
        assert_eq!(
            err,
            BuildError::InsufficientFunds {
                available: 280_750,
                fee: 280_750
            }
        );
        assert!(build(&[utxo(1, 0, 280_751)]).is_ok());
    }

    #[test]
    fn empty_input_set_is_rejected() {
        assert_eq!(build(&[]).unwrap_err(), BuildError::NoInputs);
    }

    #[test]
    fn amount_overflow_is_rejected() {
        let err = build(&[utxo(1, 0, u64::MAX), utxo(2, 0, 1)]).unwrap_err();
        assert_eq!(err, BuildError::AmountOverflow);
    }

    #[test]
    fn duplicate_utxo_is_rejected() {
        let err = build(&[utxo(1, 0, 10_000_000), utxo(1, 0, 10_000_000)]).unwrap_err();
        assert!(matches!(err, BuildError::DuplicateInput { output_index: 0, .. }));
    }

    #[test]
    fn foreign_asset_is_rejected() {
        let mut other = utxo(1, 0, 10_000_000);
        other.asset_id = Id::new([0x99; 32]);
        assert!(matches!(build(&[other]).unwrap_err(), BuildError::AssetMismatch { .. }));
    }

    #[test]
    fn missing_destination() {
        let err = ImportTxBuilder::new(5, chains())
            .utxo(utxo(1, 0, 1_000_000))
            .fee_asset(avax())
            .build()
            .unwrap_err();
        assert_eq!(err, BuildError::MissingField("destination"));
    }

    #[test]
    fn zero_base_fee_imports_everything() {
        let built = ImportTxBuilder::new(5, chains())
            .utxo(utxo(1, 0, 1))
            .destination(dest())
            .fee_asset(avax())
            .build()
            .unwrap();
        assert_eq!(built.fee, 0);
        assert_eq!(built.tx.outs[0].amount, 1);
    }

    #[test]
    fn free_function_matches_builder() {
        let utxos = [utxo(4, 1, 2_000_000)];
        let bytes = build_import(5, chains(), &utxos, dest(), avax(), BASE_FEE).unwrap();
        assert_eq!(bytes, build(&utxos).unwrap().bytes);
    }
}
