//! Flat binary columns shared by every codec.
//!
//! A column is a little-endian array of one fixed-width element type stored in
//! a `BinaryData`. Builders know their final length up front and refuse to
//! finish short or overflow, so encoded buffers are always exactly sized.

use core::fmt;
use core::marker::PhantomData;
use core::ops::Deref;
use core::str::FromStr;
use std::sync::Arc;

use sha2::{Digest, Sha256};

use crate::error::{CoreError, CoreResult};

/// How encoded buffers are allocated and handed across a thread boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum BufferType {
    /// Uniquely owned bytes. Handing them over moves them; cloning copies them.
    #[default]
    Array,
    /// Reference-counted read-only bytes. Handing them over is zero-copy.
    Shared,
}

impl BufferType {
    pub fn as_str(self) -> &'static str {
        match self {
            BufferType::Array => "array",
            BufferType::Shared => "shared",
        }
    }
}

impl fmt::Display for BufferType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BufferType {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "array" => Ok(BufferType::Array),
            "shared" => Ok(BufferType::Shared),
            other => Err(CoreError::InvalidArg {
                what: format!("unknown buffer type '{other}' (expected 'array' or 'shared')"),
            }),
        }
    }
}

/// An encoded byte buffer.
#[derive(Clone)]
pub enum BinaryData {
    Array(Vec<u8>),
    Shared(Arc<[u8]>),
}

impl BinaryData {
    pub fn from_vec(bytes: Vec<u8>, buffer_type: BufferType) -> Self {
        match buffer_type {
            BufferType::Array => BinaryData::Array(bytes),
            BufferType::Shared => BinaryData::Shared(Arc::from(bytes)),
        }
    }

    pub fn buffer_type(&self) -> BufferType {
        match self {
            BinaryData::Array(_) => BufferType::Array,
            BinaryData::Shared(_) => BufferType::Shared,
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            BinaryData::Array(bytes) => bytes,
            BinaryData::Shared(bytes) => bytes,
        }
    }

    pub fn into_vec(self) -> Vec<u8> {
        match self {
            BinaryData::Array(bytes) => bytes,
            BinaryData::Shared(bytes) => bytes.to_vec(),
        }
    }
}

impl Deref for BinaryData {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl AsRef<[u8]> for BinaryData {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl PartialEq for BinaryData {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for BinaryData {}

impl fmt::Debug for BinaryData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BinaryData({}, {} bytes)", self.buffer_type(), self.len())
    }
}

/// Fixed-width element stored little-endian in a column.
pub trait ColumnElem: Copy + 'static {
    const SIZE: usize;

    fn put(self, out: &mut Vec<u8>);

    /// Decode from exactly `SIZE` bytes.
    fn take(bytes: &[u8]) -> Self;
}

impl ColumnElem for u8 {
    const SIZE: usize = 1;

    fn put(self, out: &mut Vec<u8>) {
        out.push(self);
    }

    fn take(bytes: &[u8]) -> Self {
        bytes[0]
    }
}

macro_rules! le_column_elem {
    ($ty:ty) => {
        impl ColumnElem for $ty {
            const SIZE: usize = core::mem::size_of::<$ty>();

            fn put(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            fn take(bytes: &[u8]) -> Self {
                let mut raw = [0_u8; core::mem::size_of::<$ty>()];
                raw.copy_from_slice(&bytes[..Self::SIZE]);
                <$ty>::from_le_bytes(raw)
            }
        }
    };
}

le_column_elem!(u32);
le_column_elem!(i32);
le_column_elem!(f32);

/// Builder for a column whose final length is known in advance.
#[derive(Debug)]
pub struct ColumnBuilder<T> {
    what: &'static str,
    expected: usize,
    bytes: Vec<u8>,
    _elem: PhantomData<T>,
}

impl<T: ColumnElem> ColumnBuilder<T> {
    pub fn new(what: &'static str, expected: usize) -> Self {
        Self {
            what,
            expected,
            bytes: Vec::with_capacity(expected * T::SIZE),
            _elem: PhantomData,
        }
    }

    /// Number of elements written so far.
    pub fn len(&self) -> usize {
        self.bytes.len() / T::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn push(&mut self, value: T) -> CoreResult<()> {
        let len = self.len();
        if len >= self.expected {
            return Err(CoreError::IndexOob {
                what: self.what,
                index: len,
                len: self.expected,
            });
        }
        value.put(&mut self.bytes);
        Ok(())
    }

    /// Finish the column; fails unless exactly `expected` elements were pushed.
    pub fn finish(self, buffer_type: BufferType) -> CoreResult<BinaryData> {
        let written = self.len();
        if written != self.expected {
            return Err(CoreError::IncompleteColumn {
                what: self.what,
                written,
                expected: self.expected,
            });
        }
        Ok(BinaryData::from_vec(self.bytes, buffer_type))
    }
}

/// Read-only typed view over column bytes. Nothing is copied.
#[derive(Debug, Clone, Copy)]
pub struct Column<'a, T> {
    bytes: &'a [u8],
    _elem: PhantomData<T>,
}

impl<'a, T: ColumnElem> Column<'a, T> {
    pub fn new(what: &'static str, bytes: &'a [u8]) -> CoreResult<Self> {
        if bytes.len() % T::SIZE != 0 {
            return Err(CoreError::MisalignedColumn {
                what,
                len: bytes.len(),
                elem_size: T::SIZE,
            });
        }
        Ok(Self {
            bytes,
            _elem: PhantomData,
        })
    }

    pub fn len(&self) -> usize {
        self.bytes.len() / T::SIZE
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<T> {
        let start = index.checked_mul(T::SIZE)?;
        let chunk = self.bytes.get(start..start + T::SIZE)?;
        Some(T::take(chunk))
    }

    pub fn iter(&self) -> impl Iterator<Item = T> + 'a {
        let bytes = self.bytes;
        bytes.chunks_exact(T::SIZE).map(T::take)
    }
}

/// Read one element at a byte offset of an arbitrary buffer.
pub fn read_le<T: ColumnElem>(what: &'static str, bytes: &[u8], offset: usize) -> CoreResult<T> {
    bytes
        .get(offset..offset + T::SIZE)
        .map(T::take)
        .ok_or(CoreError::RangeOob {
            what,
            offset,
            size: T::SIZE,
            len: bytes.len(),
        })
}

/// SHA-256 identity of an encoded snapshot.
pub type SnapshotDigest = [u8; 32];

/// Digest a sequence of columns. Each column is length-prefixed so column
/// boundaries take part in the identity.
pub fn digest_columns(columns: &[&[u8]]) -> SnapshotDigest {
    let mut hasher = Sha256::new();
    for column in columns {
        hasher.update((column.len() as u64).to_le_bytes());
        hasher.update(column);
    }
    let mut digest = [0_u8; 32];
    digest.copy_from_slice(&hasher.finalize());
    digest
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn builder_exact_size() {
        let mut builder = ColumnBuilder::<u32>::new("ids", 3);
        builder.push(1).unwrap();
        builder.push(2).unwrap();
        builder.push(0xdead_beef).unwrap();
        assert!(builder.push(4).is_err());

        let data = builder.finish(BufferType::Array).unwrap();
        assert_eq!(data.len(), 12);
        assert_eq!(&data[8..12], &0xdead_beef_u32.to_le_bytes());
    }

    #[test]
    fn builder_rejects_short_column() {
        let mut builder = ColumnBuilder::<u8>::new("types", 2);
        builder.push(1).unwrap();
        let err = builder.finish(BufferType::Array).unwrap_err();
        assert_eq!(
            err,
            CoreError::IncompleteColumn {
                what: "types",
                written: 1,
                expected: 2
            }
        );
    }

    #[test]
    fn column_reads_back_values() {
        let mut builder = ColumnBuilder::<f32>::new("values", 2);
        builder.push(1.5).unwrap();
        builder.push(-2.25).unwrap();
        let data = builder.finish(BufferType::Shared).unwrap();
        assert_eq!(data.buffer_type(), BufferType::Shared);

        let column = Column::<f32>::new("values", &data).unwrap();
        assert_eq!(column.len(), 2);
        assert_eq!(column.get(1), Some(-2.25));
        assert_eq!(column.get(2), None);
        assert_eq!(column.iter().collect::<Vec<_>>(), vec![1.5, -2.25]);
    }

    #[test]
    fn column_rejects_misaligned_bytes() {
        let bytes = [0_u8; 7];
        assert!(Column::<u32>::new("ids", &bytes).is_err());
    }

    #[test]
    fn read_le_out_of_range() {
        let bytes = 7_i32.to_le_bytes();
        assert_eq!(read_le::<i32>("count", &bytes, 0).unwrap(), 7);
        assert!(read_le::<i32>("count", &bytes, 1).is_err());
    }

    #[test]
    fn shared_clone_is_same_allocation() {
        let data = BinaryData::from_vec(vec![1, 2, 3], BufferType::Shared);
        let copy = data.clone();
        match (&data, &copy) {
            (BinaryData::Shared(a), BinaryData::Shared(b)) => assert!(Arc::ptr_eq(a, b)),
            _ => panic!("expected shared buffers"),
        }
    }

    #[test]
    fn buffer_type_parse() {
        assert_eq!("array".parse::<BufferType>().unwrap(), BufferType::Array);
        assert_eq!("shared".parse::<BufferType>().unwrap(), BufferType::Shared);
        assert!("mmap".parse::<BufferType>().is_err());
    }

    #[test]
    fn digest_depends_on_column_boundaries() {
        let a = digest_columns(&[&[1, 2], &[3]]);
        let b = digest_columns(&[&[1], &[2, 3]]);
        assert_ne!(a, b);
        assert_eq!(a, digest_columns(&[&[1, 2], &[3]]));
    }

    proptest! {
        #[test]
        fn columns_read_back_what_was_written(
            values in prop::collection::vec(any::<i32>(), 0..64),
            shared in any::<bool>(),
        ) {
            let buffer_type = if shared { BufferType::Shared } else { BufferType::Array };
            let mut builder = ColumnBuilder::<i32>::new("values", values.len());
            for &v in &values {
                builder.push(v).unwrap();
            }
            let data = builder.finish(buffer_type).unwrap();
            prop_assert_eq!(data.buffer_type(), buffer_type);
            prop_assert_eq!(data.len(), values.len() * 4);

            let column = Column::<i32>::new("values", &data).unwrap();
            prop_assert_eq!(column.iter().collect::<Vec<_>>(), values.clone());
            for (i, &v) in values.iter().enumerate() {
                prop_assert_eq!(read_le::<i32>("values", &data, i * 4).unwrap(), v);
            }

            let other = BinaryData::from_vec(data.as_bytes().to_vec(), BufferType::Array);
            prop_assert_eq!(
                digest_columns(&[data.as_bytes()]),
                digest_columns(&[other.as_bytes()])
            );
        }
    }
}
