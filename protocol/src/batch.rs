//! # Batch Decoder
//!
//! A block's atomic blob is `version:u16 | count:u32 | tx*`, where each `tx`
//! is a signed transaction *without* its own version prefix.
//!
//! The decoder never fails. A blob with a version we don't speak is not an
//! error, it is a block without atomic data, so the answer is an empty list.
//! A count of zero or beyond the configured ceiling is treated the same way
//! and stops a corrupt header from sizing an allocation. Transactions are
//! decoded in a single pass, recording each one's byte span so its ID can be
//! hashed with the version virtually prepended. The first transaction that
//! fails to decode ends the walk and everything before it is returned.
//!
//! Anomalies are logged at `warn` with structured fields; the caller gets a
//! [`BatchFailure`] from [`BatchDecoder::decode_report`] if it cares why.

use std::fmt;

use tracing::warn;

use crate::codec::{CodecError, Packable, Packer, Reader};
use crate::config::{DecoderConfig, CODEC_VERSION};
use crate::transaction::AtomicTx;

/// Why a batch decode stopped early (or never started).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchFailure {
    /// The blob is too short to hold a version and a count.
    Header(CodecError),
    /// The version is not ours; the block carries no atomic data.
    UnsupportedVersion(u16),
    /// The declared count is zero or above the ceiling.
    SuspiciousCount(u32),
    /// Transaction `index` failed to decode.
    Transaction { index: usize, error: CodecError },
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header(e) => write!(f, "truncated batch header: {}", e),
            Self::UnsupportedVersion(v) => write!(f, "unsupported batch version {}", v),
            Self::SuspiciousCount(c) => write!(f, "suspicious transaction count {}", c),
            Self::Transaction { index, error } => write!(f, "transaction {} failed: {}", index, error),
        }
    }
}

/// Everything a batch decode found out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BatchReport {
    /// Successfully decoded transactions, in blob order.
    pub transactions: Vec<AtomicTx>,
    /// Count from the header, if it was read.
    pub declared_count: Option<u32>,
    /// Set when fewer than `declared_count` transactions came back.
    pub failure: Option<BatchFailure>,
}

impl BatchReport {
    /// `true` if every declared transaction decoded.
    pub fn is_complete(&self) -> bool {
        self.failure.is_none()
    }
}

/// Splits atomic blobs into transactions.
#[derive(Debug, Clone, Copy, Default)]
pub struct BatchDecoder {
    config: DecoderConfig,
}

impl BatchDecoder {
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes a blob, returning whatever prefix of transactions decoded.
    pub fn decode(&self, blob: &[u8]) -> Vec<AtomicTx> {
        self.decode_report(blob).transactions
    }

    /// Decodes a blob and reports why it stopped, if it stopped early.
    pub fn decode_report(&self, blob: &[u8]) -> BatchReport {
        let mut report = BatchReport::default();
        if blob.is_empty() {
            return report;
        }

        let mut reader = Reader::new(blob);
        let (version, count) = match read_header(&mut reader) {
            Ok(header) => header,
            Err(error) => {
                warn!(len = blob.len(), %error, "atomic blob shorter than its header");
                report.failure = Some(BatchFailure::Header(error));
                return report;
            }
        };

        if version != CODEC_VERSION {
            warn!(version, "unsupported atomic blob version");
            report.failure = Some(BatchFailure::UnsupportedVersion(version));
            return report;
        }

        report.declared_count = Some(count);
        if count == 0 || count > self.config.max_batch_txs {
            warn!(count, max = self.config.max_batch_txs, "suspicious atomic transaction count");
            report.failure = Some(BatchFailure::SuspiciousCount(count));
            return report;
        }

        report.transactions.reserve(count as usize);
        for index in 0..count as usize {
            match AtomicTx::read_unversioned(&mut reader) {
                Ok(tx) => report.transactions.push(tx),
                Err(error) => {
                    warn!(index, count, offset = reader.position(), %error, "failed to decode atomic transaction");
                    report.failure = Some(BatchFailure::Transaction { index, error });
                    break;
                }
            }
        }
        report
    }
}

fn read_header(reader: &mut Reader<'_>) -> Result<(u16, u32), CodecError> {
    Ok((reader.read_u16()?, reader.read_u32()?))
}

/// Decodes a blob with the default ceiling.
///
/// Never fails; see the module docs for what an empty result can mean.
pub fn decode_batch(blob: &[u8]) -> Vec<AtomicTx> {
    BatchDecoder::default().decode(blob)
}

/// Encodes transactions as an atomic blob, the inverse of [`decode_batch`].
pub fn encode_batch(txs: &[AtomicTx]) -> Vec<u8> {
    let mut packer = Packer::with_capacity(6 + txs.len() * 320);
    packer.put_u16(CODEC_VERSION);
    packer.put_count(txs.len());
    for tx in txs {
        tx.pack(&mut packer);
    }
    packer.into_vec()
}
