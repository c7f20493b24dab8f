//! CB58: base58 over `payload || sha256(payload)[28..32]`.
//!
//! This is how IDs are printed by the node, explorers and wallets. We only
//! ever decode it into 32-byte IDs, but encode/decode work on any payload.

use super::hash::sha256;
use super::CryptoError;
use crate::config::ID_LEN;
use crate::transaction::types::Id;

const CHECKSUM_LEN: usize = 4;

/// Encodes `payload` as CB58.
pub fn encode(payload: &[u8]) -> String {
    let digest = sha256(payload);
    let mut buf = Vec::with_capacity(payload.len() + CHECKSUM_LEN);
    buf.extend_from_slice(payload);
    buf.extend_from_slice(&digest[digest.len() - CHECKSUM_LEN..]);
    bs58::encode(buf).into_string()
}

/// Decodes a CB58 string and verifies its checksum.
pub fn decode(s: &str) -> Result<Vec<u8>, CryptoError> {
    let raw = bs58::decode(s)
        .into_vec()
        .map_err(|e| CryptoError::InvalidBase58(e.to_string()))?;
    if raw.len() < CHECKSUM_LEN {
        return Err(CryptoError::InvalidLength {
            expected: CHECKSUM_LEN,
            actual: raw.len(),
        });
    }
    let (payload, checksum) = raw.split_at(raw.len() - CHECKSUM_LEN);
    let digest = sha256(payload);
    if checksum != &digest[digest.len() - CHECKSUM_LEN..] {
        return Err(CryptoError::ChecksumMismatch);
    }
    Ok(payload.to_vec())
}

/// Decodes a CB58 string that must carry a 32-byte ID.
pub fn decode_id(s: &str) -> Result<Id, CryptoError> {
    let payload = decode(s)?;
    Id::from_slice(&payload).map_err(|_| CryptoError::InvalidLength {
        expected: ID_LEN,
        actual: payload.len(),
    })
}

/// CB58 form of an ID.
pub fn encode_id(id: &Id) -> String {
    encode(id.as_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    const FUJI_C_CHAIN: &str = "yH8D7ThNJkxmtkuv2jgBa4P1Rn3Qpr4pPr7QYNfcdoS6k6HWp";

    #[test]
    fn roundtrip_known_chain_id() {
        let id = decode_id(FUJI_C_CHAIN).unwrap();
        assert_eq!(encode_id(&id), FUJI_C_CHAIN);
    }

    #[test]
    fn empty_id_has_a_stable_encoding() {
        // The P-Chain ID as printed by the node.
        assert_eq!(
            encode_id(&Id::EMPTY),
            "11111111111111111111111111111111LpoYY"
        );
    }

    #[test]
    fn corrupted_checksum_is_rejected() {
        let mut s = FUJI_C_CHAIN.to_string();
        // Swap the last character for a different base58 digit.
        let last = s.pop().unwrap();
        s.push(if last == 'p' { 'q' } else { 'p' });
        assert!(matches!(
            decode(&s),
            Err(CryptoError::ChecksumMismatch) | Err(CryptoError::InvalidLength { .. })
        ));
    }

    #[test]
    fn invalid_alphabet_is_rejected() {
        assert!(matches!(decode("0OIl"), Err(CryptoError::InvalidBase58(_))));
    }

    #[test]
    fn short_payload_is_not_an_id() {
        let s = encode(&[1, 2, 3]);
        assert_eq!(decode(&s).unwrap(), vec![1, 2, 3]);
        assert_eq!(
            decode_id(&s).unwrap_err(),
            CryptoError::InvalidLength {
                expected: 32,
                actual: 3
            }
        );
    }
}
