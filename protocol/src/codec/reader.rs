//! Bounds-checked, big-endian cursor over a borrowed byte slice.
//!
//! The reader never panics and never allocates on behalf of the input: a
//! declared count is checked against the bytes left before anyone builds a
//! `Vec` for it. That single rule is what keeps a hostile blob from asking
//! us for four billion elements.

use super::error::CodecError;
use crate::config::CODEC_VERSION;

/// A read cursor over a borrowed buffer.
///
/// The reader tracks an absolute offset so callers can slice the original
/// buffer by `[start, end)` positions after decoding a record.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    /// Creates a reader positioned at the start of `buf`.
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Creates a reader positioned at `pos`.
    ///
    /// Fails if `pos` lies past the end of the buffer.
    pub fn at(buf: &'a [u8], pos: usize) -> Result<Self, CodecError> {
        if pos > buf.len() {
            return Err(CodecError::CursorOutOfRange {
                cursor: pos,
                len: buf.len(),
            });
        }
        Ok(Self { buf, pos })
    }

    /// Current absolute offset.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes left to read.
    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    /// `true` once every byte has been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    /// The underlying buffer, start to end.
    pub fn buffer(&self) -> &'a [u8] {
        self.buf
    }

    /// Borrows `[start, end)` of the underlying buffer.
    ///
    /// Used after a decode to recover the exact bytes a record spanned.
    pub fn span(&self, start: usize, end: usize) -> &'a [u8] {
        &self.buf[start..end]
    }

    /// Consumes `n` bytes.
    pub fn take(&mut self, n: usize) -> Result<&'a [u8], CodecError> {
        if n > self.remaining() {
            return Err(CodecError::UnexpectedEof {
                needed: n,
                remaining: self.remaining(),
                offset: self.pos,
            });
        }
        let out = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(out)
    }

    /// Reads a fixed-size array.
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N], CodecError> {
        let bytes = self.take(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(bytes);
        Ok(out)
    }

    /// Reads a big-endian `u16`.
    pub fn read_u16(&mut self) -> Result<u16, CodecError> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u32`.
    pub fn read_u32(&mut self) -> Result<u32, CodecError> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Reads a big-endian `u64`.
    pub fn read_u64(&mut self) -> Result<u64, CodecError> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Reads the 2-byte codec version and fails unless we speak it.
    pub fn expect_version(&mut self) -> Result<(), CodecError> {
        match self.read_u16()? {
            CODEC_VERSION => Ok(()),
            other => Err(CodecError::UnsupportedVersion(other)),
        }
    }

    /// Fails if any input is left unread.
    pub fn finish(&self) -> Result<(), CodecError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(CodecError::TrailingBytes(n)),
        }
    }

    /// Reads a type tag and fails unless it equals `expected`.
    pub fn expect_type_tag(&mut self, context: &'static str, expected: u32) -> Result<(), CodecError> {
        let tag = self.read_u32()?;
        if tag != expected {
            return Err(CodecError::UnknownTypeTag { context, tag });
        }
        Ok(())
    }

    /// Reads a sequence count and checks it against the bytes left.
    ///
    /// `min_elem_len` is the smallest number of bytes one element can occupy.
    /// A count whose minimum footprint exceeds the remaining input is
    /// rejected before any allocation happens.
    pub fn read_count(&mut self, field: &'static str, min_elem_len: usize) -> Result<usize, CodecError> {
        let count = self.read_u32()?;
        let needed = (count as usize).checked_mul(min_elem_len);
        match needed {
            Some(n) if n <= self.remaining() => Ok(count as usize),
            _ => Err(CodecError::LengthOverflow {
                field,
                count,
                remaining: self.remaining(),
            }),
        }
    }
}
