use log::{debug, warn};
use std::io::Read;

use crate::codepage::TextEncoding;
use crate::error::{DbfError, Result};
use crate::layout::{read_byte, Primitive, StructLayout};


/// Field sub record, one per column, directly after the table header.
///
/// ## Field Subrecords Structure
/// ---
/// | Byte offset | Description |
/// ---
/// | 0 - 10 | Field name, right hand padded with 0 |
/// | 11 | Field type code |
/// | 12 - 15 | Displacement of field in record |
/// | 16 | Length of field (bytes) |
/// | 17 | Number of decimal places |
/// | 18 - 19 | Reserved |
/// | 20 | Work area id |
/// | 21 - 22 | Reserved |
/// | 23 | Set fields flag |
/// | 24 - 30 | Reserved |
/// | 31 | Index field flag |
pub const FIELD_LAYOUT: StructLayout = StructLayout::new(
    "field descriptor",
    &[
        ("name", Primitive::Bytes(11)),
        ("type", Primitive::U8),
        ("address", Primitive::U32),
        ("length", Primitive::U8),
        ("decimal_count", Primitive::U8),
        ("reserved1", Primitive::U16),
        ("workarea_id", Primitive::U8),
        ("reserved2", Primitive::U8),
        ("reserved3", Primitive::U8),
        ("set_fields_flag", Primitive::U8),
        ("reserved4", Primitive::Bytes(7)),
        ("index_field_flag", Primitive::U8),
    ],
);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FieldType {
    /// Fixed length character data type
    Character,
    /// 8 bytes integer divide by 10,000 so it can contains at most 4 digit precisions.
    Currency,
    /// 8 ASCII digits YYYYMMDD
    Date,
    /// 8 bytes DateTime. 4 first bytes is julian day. 4 later bytes is milliseconds since midnight.
    DateTime,
    /// Double in Visual FoxPro, memo pointer elsewhere
    Binary,
    /// Float - Store as ASCII text on disk
    Float,
    /// OLE Object
    General,
    /// 32 bit integer
    Integer,
    /// Same as integer but the value is generated by the table
    Autoincrement,
    /// 1 bytes logical data representation as True/False
    Logical,
    /// 4 or 10 bytes represent an offset inside memo file
    Memo,
    /// Store as ASCII text on disk, integer when there is no decimal part.
    Numeric,
    /// IEEE double (dBase 7)
    Double,
    /// Picture stored in the memo file, decoded as `FieldValue::Raw`
    Picture,
    /// Same as DateTime (dBase 7)
    Timestamp,
    /// Variable length binary data, decoded as `FieldValue::Raw`
    Varbinary,
    /// Variable length character data, decoded as `FieldValue::Raw`
    Varchar,
    /// Hidden null flags column
    NullFlags,
}

impl FieldType {
    pub fn from_code(code: u8) -> Option<FieldType> {
        match code {
            b'C' => Some(FieldType::Character),
            b'Y' => Some(FieldType::Currency),
            b'D' => Some(FieldType::Date),
            b'T' => Some(FieldType::DateTime),
            b'B' => Some(FieldType::Binary),
            b'F' => Some(FieldType::Float),
            b'G' => Some(FieldType::General),
            b'I' => Some(FieldType::Integer),
            b'+' => Some(FieldType::Autoincrement),
            b'L' => Some(FieldType::Logical),
            b'M' => Some(FieldType::Memo),
            b'N' => Some(FieldType::Numeric),
            b'O' => Some(FieldType::Double),
            b'P' => Some(FieldType::Picture),
            b'@' => Some(FieldType::Timestamp),
            b'Q' => Some(FieldType::Varbinary),
            b'V' => Some(FieldType::Varchar),
            b'0' => Some(FieldType::NullFlags),
            _ => None
        }
    }
}

/// Width every field with type `code` must have, when the type fixes one.
pub fn required_length(code: u8) -> Option<u8> {
    match code {
        b'I' | b'+' => Some(4),
        b'L' => Some(1),
        _ => None
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Single character type code, e.g. `b'C'`
    pub field_type: u8,
    pub address: u32,
    pub length: u8,
    pub decimal_count: u8,
    pub workarea_id: u8,
    pub set_fields_flag: u8,
    pub index_field_flag: u8
}

impl FieldDescriptor {
    /// Decode one 32 bytes sub record whose first byte was already consumed.
    fn read<R: Read>(reader: &mut R, first: u8, encoding: TextEncoding) -> Result<FieldDescriptor> {
        let raw = FIELD_LAYOUT.read_with_prefix(reader, &[first])?;
        let name_slot = raw.bytes("name")?;
        let name_bytes = match name_slot.iter().position(|b| *b == 0) {
            Some(end) => &name_slot[..end],
            None => name_slot
        };

        Ok(FieldDescriptor {
            name: encoding.decode(name_bytes)?,
            field_type: raw.u8("type")?,
            address: raw.u32("address")?,
            length: raw.u8("length")?,
            decimal_count: raw.u8("decimal_count")?,
            workarea_id: raw.u8("workarea_id")?,
            set_fields_flag: raw.u8("set_fields_flag")?,
            index_field_flag: raw.u8("index_field_flag")?,
        })
    }

    pub fn kind(&self) -> Option<FieldType> {
        FieldType::from_code(self.field_type)
    }

    /// Type code as a character.
    pub fn type_char(&self) -> char {
        self.field_type as char
    }

    /// Reject widths that the field type does not allow.
    pub fn validate(&self) -> Result<()> {
        match required_length(self.field_type) {
            Some(expected) if expected != self.length => Err(DbfError::InvalidFieldLength {
                name: self.name.clone(),
                field_type: self.type_char(),
                expected,
                found: self.length,
            }),
            _ => Ok(())
        }
    }
}

/// Read field descriptors until the header terminator (`\r`, `\n`) or the
/// end of stream, then validate all of them. The stream is left right after
/// the terminator byte; callers seek to the header length afterward.
pub fn read_descriptors<R: Read, E: Into<TextEncoding>>(reader: &mut R, encoding: E) -> Result<Vec<FieldDescriptor>> {
    let encoding = encoding.into();
    let mut fields: Vec<FieldDescriptor> = vec![];

    loop {
        let first = match read_byte(reader)? {
            None | Some(b'\r') | Some(b'\n') => break,
            Some(b) => b
        };
        fields.push(FieldDescriptor::read(reader, first, encoding)?);
    }

    for (i, field) in fields.iter().enumerate() {
        field.validate()?;
        if fields[..i].iter().any(|f| f.name == field.name) {
            warn!("Duplicate field name `{}`, later column wins in records", field.name);
        }
        debug!("Field `{}` type {} length {} decimals {}", field.name, field.type_char(), field.length, field.decimal_count);
    }

    Ok(fields)
}
