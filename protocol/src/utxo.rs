//! Parser for the UTXO encoding served by the lookup service.
//!
//! `avax.getUTXOs` with `encoding: "hex"` returns each UTXO as
//!
//! ```text
//! version:u16 | txId:32 | outputIndex:u32 | transferable output
//! ```
//!
//! where the output is the same record an export creates. Only
//! single-owner outputs (threshold 1) are spendable by the builder; the
//! first address is taken as the owner.

use tracing::warn;

use crate::codec::{CodecError, Packable, Packer, Reader};
use crate::config::CODEC_VERSION;
use crate::transaction::types::{Id, TransferableOutput, Utxo};

/// Parses one binary UTXO.
pub fn parse_utxo(bytes: &[u8]) -> Result<Utxo, CodecError> {
    let mut reader = Reader::new(bytes);
    reader.expect_version()?;
    let tx_id = Id::unpack(&mut reader)?;
    let output_index = reader.read_u32()?;
    let output = TransferableOutput::unpack(&mut reader)?;
    reader.finish()?;

    if output.threshold() != 1 {
        return Err(CodecError::InvalidRecord(format!(
            "unsupported UTXO threshold {} (only single-signature outputs)",
            output.threshold()
        )));
    }
    let address = *output
        .addresses()
        .first()
        .ok_or_else(|| CodecError::InvalidRecord("UTXO has no owner address".to_string()))?;

    Ok(Utxo {
        tx_id,
        output_index,
        asset_id: *output.asset_id(),
        amount: output.amount(),
        address,
    })
}

/// Parses one hex-encoded UTXO, `0x` prefix optional.
pub fn parse_utxo_hex(s: &str) -> Result<Utxo, CodecError> {
    let trimmed = s.trim();
    let trimmed = trimmed.strip_prefix("0x").unwrap_or(trimmed);
    let bytes = hex::decode(trimmed).map_err(|e| CodecError::InvalidRecord(format!("invalid hex: {}", e)))?;
    parse_utxo(&bytes)
}

/// Parses a list of hex UTXOs, skipping (and logging) the ones that fail.
///
/// A lookup response mixes in outputs we can't spend, multisig ones for
/// instance, and one of those should not hide the rest.
pub fn parse_utxos<I, S>(hexes: I) -> Vec<Utxo>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    hexes
        .into_iter()
        .enumerate()
        .filter_map(|(index, hex)| match parse_utxo_hex(hex.as_ref()) {
            Ok(utxo) => Some(utxo),
            Err(error) => {
                warn!(index, %error, "skipping unparseable UTXO");
                None
            }
        })
        .collect()
}

/// Encodes a single-owner, unlocked UTXO the way the lookup service does.
pub fn encode_utxo(utxo: &Utxo) -> Vec<u8> {
    let mut packer = Packer::with_capacity(118);
    packer.put_u16(CODEC_VERSION);
    utxo.tx_id.pack(&mut packer);
    packer.put_u32(utxo.output_index);
    TransferableOutput::single_owner(utxo.asset_id, utxo.amount, utxo.address).pack(&mut packer);
    packer.into_vec()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::types::ShortId;

    fn sample() -> Utxo {
        Utxo {
            tx_id: Id::new([0x11; 32]),
            output_index: 2,
            asset_id: Id::new([0x21; 32]),
            amount: 50_000_000,
            address: ShortId::new([0x3C; 20]),
        }
    }

    /// Hand-assembled UTXO with `threshold` and `addrs` owners.
    fn raw(threshold: u32, addrs: u32) -> Vec<u8> {
        let mut b = vec![0u8, 0];
        b.extend_from_slice(&[0x11; 32]);
        b.extend_from_slice(&2u32.to_be_bytes());
        b.extend_from_slice(&[0x21; 32]);
        b.extend_from_slice(&7u32.to_be_bytes());
        b.extend_from_slice(&50_000_000u64.to_be_bytes());
        b.extend_from_slice(&0u64.to_be_bytes());
        b.extend_from_slice(&threshold.to_be_bytes());
        b.extend_from_slice(&addrs.to_be_bytes());
        for i in 0..addrs {
            b.extend_from_slice(&[0x3C + i as u8; 20]);
        }
        b
    }

    #[test]
    fn parses_hand_built_utxo() {
        let bytes = raw(1, 1);
        assert_eq!(bytes.len(), 118);
        assert_eq!(parse_utxo(&bytes).unwrap(), sample());
    }

    #[test]
    fn encoder_matches_service_layout() {
        assert_eq!(encode_utxo(&sample()), raw(1, 1));
    }

    #[test]
    fn first_address_owns_multi_address_output() {
        let utxo = parse_utxo(&raw(1, 3)).unwrap();
        assert_eq!(utxo.address, ShortId::new([0x3C; 20]));
    }

    #[test]
    fn multisig_is_rejected() {
        assert!(matches!(parse_utxo(&raw(2, 2)), Err(CodecError::InvalidRecord(_))));
    }

    #[test]
    fn ownerless_output_is_rejected() {
        // threshold 1 with zero addresses already fails the output invariant
        assert!(parse_utxo(&raw(1, 0)).is_err());
        assert!(parse_utxo(&raw(0, 0)).is_err());
    }

    #[test]
    fn wrong_output_type_is_rejected() {
        let mut bytes = raw(1, 1);
        bytes[73] = 6;
        assert!(matches!(
            parse_utxo(&bytes),
            Err(CodecError::UnknownTypeTag { tag: 6, .. })
        ));
    }

    #[test]
    fn hex_with_prefix() {
        let hex = format!("0x{}", hex::encode(raw(1, 1)));
        assert_eq!(parse_utxo_hex(&hex).unwrap(), sample());
    }

    #[test]
    fn list_parsing_skips_bad_entries() {
        let good = hex::encode(raw(1, 1));
        let multisig = hex::encode(raw(2, 2));
        let parsed = parse_utxos(vec![good.as_str(), "zz", multisig.as_str(), good.as_str()]);
        assert_eq!(parsed.len(), 2);
    }
}
