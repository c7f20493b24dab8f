//! JSON views of decoded transactions, as printed on stdout.

use serde::Serialize;

use atomix_protocol::config::network_name;
use atomix_protocol::crypto::cb58;
use atomix_protocol::transaction::{AtomicTx, Id, TxKind, UnsignedAtomicTx};

/// One decoded transaction.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TxSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
    pub kind: TxKind,
    pub id: Id,
    pub id_cb58: String,
    pub network_id: u32,
    pub network: String,
    pub blockchain_id: Id,
    /// Source chain for imports, destination chain for exports.
    pub peer_chain: Id,
    pub inputs: usize,
    pub outputs: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input_total: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output_total: Option<u64>,
    pub credential_count: usize,
    pub body: &'a UnsignedAtomicTx,
}

impl<'a> TxSummary<'a> {
    pub fn new(tx: &'a AtomicTx, index: Option<usize>) -> Self {
        let unsigned = tx.unsigned();
        let (peer_chain, input_total, output_total) = match unsigned {
            UnsignedAtomicTx::Import(body) => (body.source_chain, body.input_total(), body.output_total()),
            UnsignedAtomicTx::Export(body) => (body.destination_chain, body.input_total(), body.output_total()),
        };
        Self {
            index,
            kind: tx.kind(),
            id: *tx.id(),
            id_cb58: cb58::encode_id(tx.id()),
            network_id: unsigned.network_id(),
            network: network_name(unsigned.network_id()),
            blockchain_id: *unsigned.blockchain_id(),
            peer_chain,
            inputs: unsigned.input_count(),
            outputs: unsigned.output_count(),
            input_total,
            output_total,
            credential_count: tx.credentials().len(),
            body: unsigned,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use atomix_protocol::transaction::{ChainSignature, Credential, EvmOutput, ShortId, TransferableInput};
    use atomix_protocol::UnsignedImportTx;

    #[test]
    fn summary_fields() {
        let unsigned = UnsignedAtomicTx::Import(UnsignedImportTx {
            network_id: 5,
            blockchain_id: Id::new([0xCC; 32]),
            source_chain: Id::EMPTY,
            imported_inputs: vec![TransferableInput {
                tx_id: Id::new([1; 32]),
                output_index: 0,
                asset_id: Id::new([0xAA; 32]),
                amount: 1_000,
                sig_indices: vec![0],
            }],
            outs: vec![EvmOutput {
                address: ShortId::new([2; 20]),
                amount: 900,
                asset_id: Id::new([0xAA; 32]),
            }],
        });
        let sig = ChainSignature::from_bytes([0u8; 65]).unwrap();
        let tx = AtomicTx::new(unsigned, vec![Credential::single(sig)]);

        let json = serde_json::to_value(TxSummary::new(&tx, Some(3))).unwrap();
        assert_eq!(json["index"], 3);
        assert_eq!(json["kind"], "import");
        assert_eq!(json["network"], "fuji");
        assert_eq!(json["inputTotal"], 1_000);
        assert_eq!(json["outputTotal"], 900);
        assert_eq!(json["credentialCount"], 1);
        assert_eq!(json["idCb58"], cb58::encode_id(tx.id()));
        assert_eq!(json["body"]["kind"], "import");
    }
}
