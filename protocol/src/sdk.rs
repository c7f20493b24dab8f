//! # SDK Facade
//!
//! [`AtomicSdk`] ties the pieces together for the common flow: find UTXOs
//! waiting in shared memory, read the current base fee, build an import, sign it, submit it
//! and poll its status. It also watches blocks: hand it a block's atomic
//! blob and it tells you which imports credited the addresses you care
//! about.
//!
//! The collaborator `C` is generic. Methods that need the network are only
//! available when `C` implements the matching trait from
//! [`crate::client`]; the decoding half works with `C = ()`.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::batch::BatchDecoder;
use crate::client::{BaseFeeSource, ClientError, TxSubmitter, UtxoSource};
use crate::config::{DecoderConfig, NetworkParams, P_CHAIN_ID};
use crate::crypto::{CryptoError, RecoverableSigner};
use crate::transaction::builder::{BuildError, BuiltImport, ChainIds, ImportTxBuilder};
use crate::transaction::signing::{sign_import, SigningError};
use crate::transaction::types::{EvmOutput, Id, ShortId, TxStatus, Utxo};
use crate::transaction::AtomicTx;

/// Source chain alias used when asking for pending imports.
pub const P_CHAIN_ALIAS: &str = "P";

/// Errors surfaced by the facade.
#[derive(Debug, Error)]
pub enum SdkError {
    #[error("invalid network parameters: {0}")]
    Network(#[from] CryptoError),

    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Signing(#[from] SigningError),

    #[error(transparent)]
    Client(#[from] ClientError),
}

/// An import found in a block that credits at least one watched address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedImport {
    pub tx_id: Id,
    /// Only the outputs paying a watched address.
    pub outputs: Vec<EvmOutput>,
}

impl DetectedImport {
    /// Sum of the matched outputs. Saturates; a real block can't get near.
    pub fn total_amount(&self) -> u64 {
        self.outputs.iter().fold(0u64, |acc, out| acc.saturating_add(out.amount))
    }
}

/// Build, sign, submit and detect atomic imports on one network.
#[derive(Debug)]
pub struct AtomicSdk<C> {
    client: C,
    network_id: u32,
    chain_ids: ChainIds,
    fee_asset: Id,
    decoder: BatchDecoder,
}

impl<C> AtomicSdk<C> {
    /// Creates a facade for imports from the P-Chain into `chain_ids.blockchain_id`.
    pub fn new(client: C, network_id: u32, chain_ids: ChainIds, fee_asset: Id) -> Self {
        Self {
            client,
            network_id,
            chain_ids,
            fee_asset,
            decoder: BatchDecoder::default(),
        }
    }

    /// Creates a facade from a network preset.
    pub fn for_network(client: C, network: &NetworkParams) -> Result<Self, SdkError> {
        let chain_ids = ChainIds {
            blockchain_id: network.c_chain()?,
            source_chain: P_CHAIN_ID,
        };
        Ok(Self::new(client, network.network_id, chain_ids, network.avax_asset()?))
    }

    /// Replaces the batch decoder settings.
    pub fn with_decoder_config(mut self, config: DecoderConfig) -> Self {
        self.decoder = BatchDecoder::new(config);
        self
    }

    pub fn client(&self) -> &C {
        &self.client
    }

    pub fn network_id(&self) -> u32 {
        self.network_id
    }

    pub fn chain_ids(&self) -> &ChainIds {
        &self.chain_ids
    }

    pub fn fee_asset(&self) -> &Id {
        &self.fee_asset
    }

    // -- Building and signing ----------------------------------------------

    /// Builds an unsigned import of `utxos` to `destination`.
    pub fn build_import(&self, utxos: &[Utxo], destination: ShortId, base_fee: u128) -> Result<BuiltImport, SdkError> {
        let built = ImportTxBuilder::new(self.network_id, self.chain_ids)
            .utxos(utxos.iter().cloned())
            .destination(destination)
            .fee_asset(self.fee_asset)
            .base_fee(base_fee)
            .build()?;
        Ok(built)
    }

    /// Signs unsigned import bytes, one signer per input.
    pub fn sign<S: RecoverableSigner>(&self, unsigned_bytes: &[u8], signers: &[S]) -> Result<Vec<u8>, SdkError> {
        Ok(sign_import(unsigned_bytes, signers)?)
    }

    // -- Detection -----------------------------------------------------------

    /// Every atomic transaction in a block's atomic blob.
    pub fn detect_atomic_transactions(&self, blob: &[u8]) -> Vec<AtomicTx> {
        self.decoder.decode(blob)
    }

    /// Imports in `blob` crediting any of `watch`.
    pub fn detect_imports(&self, blob: &[u8], watch: &[ShortId]) -> Vec<DetectedImport> {
        self.detect_atomic_transactions(blob)
            .into_iter()
            .filter_map(|tx| {
                let import = tx.unsigned().as_import()?;
                let outputs: Vec<EvmOutput> = import
                    .outs
                    .iter()
                    .filter(|out| watch.contains(&out.address))
                    .cloned()
                    .collect();
                if outputs.is_empty() {
                    return None;
                }
                Some(DetectedImport { tx_id: *tx.id(), outputs })
            })
            .collect()
    }
}

impl<C: UtxoSource> AtomicSdk<C> {
    /// UTXOs exported from the P-Chain to `addresses`, waiting to be imported.
    pub async fn pending_imports(&self, addresses: &[String]) -> Result<Vec<Utxo>, SdkError> {
        let utxos = self.client.get_utxos(addresses, P_CHAIN_ALIAS).await?;
        debug!(addresses = addresses.len(), found = utxos.len(), "pending imports");
        Ok(utxos)
    }
}

impl<C: BaseFeeSource> AtomicSdk<C> {
    /// Current base fee in wei, ready for [`AtomicSdk::build_import`].
    pub async fn base_fee(&self) -> Result<u128, SdkError> {
        let base_fee = self.client.base_fee().await?;
        debug!(base_fee, "fetched base fee");
        Ok(base_fee)
    }
}

impl<C: TxSubmitter> AtomicSdk<C> {
    /// Submits signed bytes; returns the node's CB58 transaction ID.
    pub async fn submit(&self, signed_tx: &[u8]) -> Result<String, SdkError> {
        let tx_id = self.client.issue_tx(signed_tx).await?;
        info!(%tx_id, len = signed_tx.len(), "issued atomic transaction");
        Ok(tx_id)
    }

    pub async fn tx_status(&self, tx_id: &str) -> Result<TxStatus, SdkError> {
        Ok(self.client.tx_status(tx_id).await?)
    }
}
