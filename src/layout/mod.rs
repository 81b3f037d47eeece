//! Fixed layout byte unpacking.
//!
//! A [StructLayout](struct.StructLayout.html) is an ordered list of named
//! little endian scalars. Both the table header and each field sub record
//! of a DBF file are declared this way and materialized through
//! [StructLayout::unpack](struct.StructLayout.html#method.unpack).

use byteorder::{ByteOrder, LittleEndian};
use std::io::{ErrorKind, Read};

use crate::error::{DbfError, Result};


/// Primitive slot of a layout. Multi byte integers are little endian.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Primitive {
    U8,
    U16,
    U32,
    I32,
    I64,
    /// Fixed width byte array
    Bytes(usize),
}

impl Primitive {
    pub const fn width(&self) -> usize {
        match *self {
            Primitive::U8 => 1,
            Primitive::U16 => 2,
            Primitive::U32 | Primitive::I32 => 4,
            Primitive::I64 => 8,
            Primitive::Bytes(n) => n,
        }
    }

    fn decode(&self, bytes: &[u8]) -> Scalar {
        match self {
            Primitive::U8 => Scalar::U8(bytes[0]),
            Primitive::U16 => Scalar::U16(LittleEndian::read_u16(bytes)),
            Primitive::U32 => Scalar::U32(LittleEndian::read_u32(bytes)),
            Primitive::I32 => Scalar::I32(LittleEndian::read_i32(bytes)),
            Primitive::I64 => Scalar::I64(LittleEndian::read_i64(bytes)),
            Primitive::Bytes(_) => Scalar::Bytes(bytes.to_vec()),
        }
    }
}

/// One decoded slot.
#[derive(Clone, Debug, PartialEq)]
pub enum Scalar {
    U8(u8),
    U16(u16),
    U32(u32),
    I32(i32),
    I64(i64),
    Bytes(Vec<u8>),
}

#[derive(Debug)]
pub struct StructLayout {
    context: &'static str,
    fields: &'static [(&'static str, Primitive)],
    size: usize,
}

impl StructLayout {
    /// `context` names the layout in length errors.
    pub const fn new(context: &'static str, fields: &'static [(&'static str, Primitive)]) -> StructLayout {
        let mut size = 0;
        let mut i = 0;
        while i < fields.len() {
            size += fields[i].1.width();
            i += 1;
        }
        StructLayout { context, fields, size }
    }

    /// Total bytes needed by this layout.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn unpack(&self, bytes: &[u8]) -> Result<Unpacked> {
        if bytes.len() != self.size {
            return Err(DbfError::LengthMismatch {
                context: self.context,
                expected: self.size,
                found: bytes.len(),
            });
        }

        let mut offset = 0;
        let values = self
            .fields
            .iter()
            .map(|(name, primitive)| {
                let end = offset + primitive.width();
                let scalar = primitive.decode(&bytes[offset..end]);
                offset = end;
                (*name, scalar)
            })
            .collect();

        Ok(Unpacked { values })
    }

    /// Read at most `size()` bytes from `reader` and unpack them. A short
    /// read is reported as a length mismatch rather than an IO error.
    pub fn read<R: Read>(&self, reader: &mut R) -> Result<Unpacked> {
        self.read_with_prefix(reader, &[])
    }

    /// Same as [read](#method.read) when the first bytes of the struct were
    /// already taken from the stream.
    pub fn read_with_prefix<R: Read>(&self, reader: &mut R, prefix: &[u8]) -> Result<Unpacked> {
        let mut buffer = Vec::with_capacity(self.size);
        buffer.extend_from_slice(prefix);
        let remain = self.size.saturating_sub(prefix.len()) as u64;
        reader.by_ref().take(remain).read_to_end(&mut buffer)?;
        self.unpack(&buffer)
    }
}

/// Read a single byte, `None` at the end of stream.
pub(crate) fn read_byte<R: Read>(reader: &mut R) -> Result<Option<u8>> {
    let mut buffer = [0u8; 1];
    loop {
        match reader.read(&mut buffer) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buffer[0])),
            Err(ref e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e.into())
        }
    }
}

/// Named scalars produced by [StructLayout::unpack](struct.StructLayout.html#method.unpack),
/// kept in declaration order.
#[derive(Clone, Debug, PartialEq)]
pub struct Unpacked {
    values: Vec<(&'static str, Scalar)>,
}

macro_rules! scalar_getter {
    ($fn_name: ident, $variant: ident, $ty: ty) => {
        pub fn $fn_name(&self, name: &'static str) -> Result<$ty> {
            match self.get(name) {
                Some(Scalar::$variant(v)) => Ok(*v),
                _ => Err(DbfError::MissingLayoutField {
                    name,
                    expected: stringify!($ty),
                }),
            }
        }
    };
}

impl Unpacked {
    pub fn get(&self, name: &str) -> Option<&Scalar> {
        self.values.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    scalar_getter!(u8, U8, u8);
    scalar_getter!(u16, U16, u16);
    scalar_getter!(u32, U32, u32);
    scalar_getter!(i32, I32, i32);
    scalar_getter!(i64, I64, i64);

    pub fn bytes(&self, name: &'static str) -> Result<&[u8]> {
        match self.get(name) {
            Some(Scalar::Bytes(v)) => Ok(v.as_slice()),
            _ => Err(DbfError::MissingLayoutField {
                name,
                expected: "bytes",
            }),
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
