//! # Linear Codec
//!
//! The serialization format every atomic record uses. There is nothing
//! clever about it, which is the point:
//!
//! - fixed-width integers, big-endian;
//! - fixed-length byte fields written raw;
//! - sequences as a `u32` count followed by the elements;
//! - polymorphic payloads as a `u32` type tag followed by the body;
//! - a `u16` codec version in front of a top-level record.
//!
//! Records implement [`Packable`]. The free functions [`encode`] and
//! [`decode`] add nothing but convenience around a [`Packer`] and a
//! [`Reader`].

mod error;
mod packer;
mod reader;

pub use error::CodecError;
pub use packer::Packer;
pub use reader::Reader;

/// A record with a fixed linear encoding.
pub trait Packable: Sized {
    /// Appends the encoding of `self`.
    fn pack(&self, packer: &mut Packer);

    /// Decodes one record, advancing the reader past it.
    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError>;
}

/// Encodes a single record with no version prefix.
pub fn encode<T: Packable>(value: &T) -> Vec<u8> {
    let mut packer = Packer::new();
    value.pack(&mut packer);
    packer.into_vec()
}

/// Decodes one record starting at `cursor`.
///
/// Returns the record and the cursor just past it, so callers can chain
/// decodes through a buffer without building a [`Reader`] themselves.
pub fn decode<T: Packable>(bytes: &[u8], cursor: usize) -> Result<(T, usize), CodecError> {
    let mut reader = Reader::at(bytes, cursor)?;
    let value = T::unpack(&mut reader)?;
    Ok((value, reader.position()))
}

/// Writes a counted sequence.
pub fn pack_seq<T: Packable>(packer: &mut Packer, items: &[T]) {
    packer.put_count(items.len());
    for item in items {
        item.pack(packer);
    }
}

/// Reads a counted sequence.
///
/// `min_elem_len` is the smallest encoding of one `T`; the declared count is
/// checked against it before the `Vec` is allocated.
pub fn unpack_seq<T: Packable>(
    reader: &mut Reader<'_>,
    field: &'static str,
    min_elem_len: usize,
) -> Result<Vec<T>, CodecError> {
    let count = reader.read_count(field, min_elem_len)?;
    let mut items = Vec::with_capacity(count);
    for _ in 0..count {
        items.push(T::unpack(reader)?);
    }
    Ok(items)
}

impl Packable for u32 {
    fn pack(&self, packer: &mut Packer) {
        packer.put_u32(*self);
    }

    fn unpack(reader: &mut Reader<'_>) -> Result<Self, CodecError> {
        reader.read_u32()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn u32_sequence_encodes_with_count() {
        let mut p = Packer::new();
        pack_seq(&mut p, &[1u32, 2]);
        assert_eq!(p.into_vec(), vec![0, 0, 0, 2, 0, 0, 0, 1, 0, 0, 0, 2]);
    }

    #[test]
    fn decode_returns_advanced_cursor() {
        let bytes = [0xAA, 0, 0, 0, 9, 0xBB];
        let (v, next): (u32, usize) = decode(&bytes, 1).unwrap();
        assert_eq!(v, 9);
        assert_eq!(next, 5);
    }

    #[test]
    fn decode_past_end_fails() {
        assert!(decode::<u32>(&[0u8; 4], 10).is_err());
        assert!(decode::<u32>(&[0u8; 4], 2).is_err());
    }

    #[test]
    fn hostile_sequence_count_does_not_allocate() {
        let bytes = [0xFF, 0xFF, 0xFF, 0xFF, 0, 0, 0, 1];
        let mut r = Reader::new(&bytes);
        let err = unpack_seq::<u32>(&mut r, "indices", 4).unwrap_err();
        assert!(matches!(err, CodecError::LengthOverflow { .. }));
    }
}
