//! Big-endian write buffer.

use bytes::{BufMut, BytesMut};

/// Append-only encoder for codec bytes.
///
/// A thin wrapper over [`BytesMut`] so every integer goes out big-endian and
/// every sequence count goes out as a `u32`. Nothing here can fail.
#[derive(Debug, Default)]
pub struct Packer {
    buf: BytesMut,
}

impl Packer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(capacity),
        }
    }

    /// Bytes written so far.
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn put_u16(&mut self, v: u16) {
        self.buf.put_u16(v);
    }

    pub fn put_u32(&mut self, v: u32) {
        self.buf.put_u32(v);
    }

    pub fn put_u64(&mut self, v: u64) {
        self.buf.put_u64(v);
    }

    /// Raw bytes, no length prefix.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    /// Writes a sequence count.
    ///
    /// Sequences are bounded by their in-memory `Vec`, and the wire count is
    /// a `u32`; a longer sequence cannot be represented at all.
    pub fn put_count(&mut self, len: usize) {
        debug_assert!(len <= u32::MAX as usize, "sequence too long for the codec");
        self.buf.put_u32(len as u32);
    }

    /// Consumes the packer.
    pub fn into_vec(self) -> Vec<u8> {
        self.buf.to_vec()
    }

    /// Borrows what has been written.
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integers_are_big_endian() {
        let mut p = Packer::new();
        p.put_u16(0x0102);
        p.put_u32(0x0304_0506);
        p.put_u64(7);
        assert_eq!(
            p.into_vec(),
            vec![1, 2, 3, 4, 5, 6, 0, 0, 0, 0, 0, 0, 0, 7]
        );
    }

    #[test]
    fn count_is_four_bytes() {
        let mut p = Packer::with_capacity(4);
        p.put_count(3);
        assert_eq!(p.as_slice(), &[0, 0, 0, 3]);
        assert_eq!(p.len(), 4);
    }
}
