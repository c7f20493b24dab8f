//! Error types for the linear codec.
//!
//! Every decode failure is fatal for the record being decoded. Callers that
//! want partial results (the batch decoder) catch these one level up.

use thiserror::Error;

/// Errors raised while decoding (or validating) codec bytes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The buffer ended before a fixed-width field could be read.
    #[error("unexpected end of input at offset {offset}: needed {needed} bytes, {remaining} left")]
    UnexpectedEof {
        /// Bytes the field required.
        needed: usize,
        /// Bytes that were actually left.
        remaining: usize,
        /// Cursor position at the failed read.
        offset: usize,
    },

    /// A decode was asked to start past the end of the buffer.
    #[error("cursor {cursor} is past the end of a {len}-byte buffer")]
    CursorOutOfRange {
        /// Requested start offset.
        cursor: usize,
        /// Buffer length.
        len: usize,
    },

    /// A type tag did not name a variant we support in this position.
    #[error("unknown type tag {tag} for {context}")]
    UnknownTypeTag {
        /// What was being decoded when the tag was read.
        context: &'static str,
        /// The offending tag.
        tag: u32,
    },

    /// The codec version prefix is not one we speak.
    #[error("unsupported codec version: {0}")]
    UnsupportedVersion(u16),

    /// A fixed-length byte field was built from a slice of the wrong length.
    #[error("invalid length for {field}: expected {expected} bytes, got {actual}")]
    InvalidLength {
        /// Field name.
        field: &'static str,
        /// Required length.
        expected: usize,
        /// Supplied length.
        actual: usize,
    },

    /// A declared sequence count cannot possibly fit in the remaining bytes.
    #[error("declared count {count} for {field} exceeds the {remaining} bytes left")]
    LengthOverflow {
        /// Sequence name.
        field: &'static str,
        /// Declared element count.
        count: u32,
        /// Bytes left in the buffer.
        remaining: usize,
    },

    /// A record decoded cleanly but violates one of its invariants.
    #[error("invalid record: {0}")]
    InvalidRecord(String),

    /// Bytes remained after a standalone record was fully decoded.
    #[error("{0} trailing bytes after record")]
    TrailingBytes(usize),
}
