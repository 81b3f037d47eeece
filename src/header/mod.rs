use chrono::naive::NaiveDate;
use log::debug;
use std::io::Read;

use crate::error::Result;
use crate::layout::{Primitive, StructLayout};


/// Dialect named by the first byte of a DBF file.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DBFType {
    FoxBase,
    DBaseIIIPlus,
    DBaseIV,
    DBaseV,
    VisualFoxPro,
    VisualFoxProAutoInc,
    VisualFoxProVarBLOB,
    DBaseIVSQLTableFiles,
    DBaseIVSQLSystem,
    DBaseIIIPlusMemos,
    DBaseIVMemos,
    DBaseIVSQLTable,
    FoxProMemos,
    Undefined
}

impl DBFType {
    pub fn parse_type(flag: u8) -> DBFType {
        match flag {
            0x02 => DBFType::FoxBase,
            0x03 => DBFType::DBaseIIIPlus,
            0x04 => DBFType::DBaseIV,
            0x05 => DBFType::DBaseV,
            0x30 => DBFType::VisualFoxPro,
            0x31 => DBFType::VisualFoxProAutoInc,
            0x32 => DBFType::VisualFoxProVarBLOB,
            0x43 => DBFType::DBaseIVSQLTableFiles,
            0x63 => DBFType::DBaseIVSQLSystem,
            0x83 => DBFType::DBaseIIIPlusMemos,
            0x8b => DBFType::DBaseIVMemos,
            0x8e => DBFType::DBaseIVSQLTable,
            0xf5 => DBFType::FoxProMemos,
            _ => DBFType::Undefined
        }
    }

    /// Visual FoxPro tables store `B` fields as doubles instead of memo pointers.
    pub fn is_visual_foxpro(&self) -> bool {
        match self {
            DBFType::VisualFoxPro | DBFType::VisualFoxProAutoInc | DBFType::VisualFoxProVarBLOB => true,
            _ => false
        }
    }
}

/// Table header is the first 32 bytes of a DBF file.
///
/// ## Header Structure
/// ---
/// | Byte offset | Description |
/// ---
/// | 0 | Version / dialect flag |
/// | 1 - 3 | Last update as YY MM DD, year counted from 1900 |
/// | 4 - 7 | Number of records |
/// | 8 - 9 | Position of the first data record |
/// | 10 - 11 | Length of one data record, deletion flag included |
/// | 12 - 13 | Reserved |
/// | 14 | Incomplete transaction flag |
/// | 15 | Encryption flag |
/// | 16 - 19 | Free record thread |
/// | 20 - 27 | Reserved |
/// | 28 | MDX / table flag |
/// | 29 | Language driver (code page mark) |
/// | 30 - 31 | Reserved |
pub const HEADER_LAYOUT: StructLayout = StructLayout::new(
    "table header",
    &[
        ("dbversion", Primitive::U8),
        ("year", Primitive::U8),
        ("month", Primitive::U8),
        ("day", Primitive::U8),
        ("numrecords", Primitive::U32),
        ("headerlen", Primitive::U16),
        ("recordlen", Primitive::U16),
        ("reserved1", Primitive::U16),
        ("incomplete_transaction", Primitive::U8),
        ("encryption_flag", Primitive::U8),
        ("free_record_thread", Primitive::U32),
        ("reserved2", Primitive::U32),
        ("reserved3", Primitive::U32),
        ("mdx_flag", Primitive::U8),
        ("language_driver", Primitive::U8),
        ("reserved4", Primitive::U16),
    ],
);

#[derive(Clone, Debug, PartialEq)]
pub struct Header {
    pub dbversion: u8,
    pub year: u8,
    pub month: u8,
    pub day: u8,
    pub numrecords: u32,
    /// Absolute offset of the first data record
    pub headerlen: u16,
    /// Length of one record slot including the deletion flag
    pub recordlen: u16,
    pub reserved1: u16,
    pub incomplete_transaction: u8,
    pub encryption_flag: u8,
    pub free_record_thread: u32,
    pub reserved2: u32,
    pub reserved3: u32,
    pub mdx_flag: u8,
    pub language_driver: u8,
    pub reserved4: u16
}

impl Header {
    /// Read exactly one header from the current position of `reader`.
    pub fn read<R: Read>(reader: &mut R) -> Result<Header> {
        let raw = HEADER_LAYOUT.read(reader)?;
        let header = Header {
            dbversion: raw.u8("dbversion")?,
            year: raw.u8("year")?,
            month: raw.u8("month")?,
            day: raw.u8("day")?,
            numrecords: raw.u32("numrecords")?,
            headerlen: raw.u16("headerlen")?,
            recordlen: raw.u16("recordlen")?,
            reserved1: raw.u16("reserved1")?,
            incomplete_transaction: raw.u8("incomplete_transaction")?,
            encryption_flag: raw.u8("encryption_flag")?,
            free_record_thread: raw.u32("free_record_thread")?,
            reserved2: raw.u32("reserved2")?,
            reserved3: raw.u32("reserved3")?,
            mdx_flag: raw.u8("mdx_flag")?,
            language_driver: raw.u8("language_driver")?,
            reserved4: raw.u16("reserved4")?,
        };
        debug!(
            "DBF header: version {:#04x}, {} records, header {} bytes, record {} bytes, language driver {}",
            header.dbversion, header.numrecords, header.headerlen, header.recordlen, header.language_driver
        );

        Ok(header)
    }

    pub fn db_type(&self) -> DBFType {
        DBFType::parse_type(self.dbversion)
    }

    /// Last update date. The raw bytes are never validated while reading so
    /// this is `None` when they do not form a calendar date.
    pub fn last_update(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(1900 + self.year as i32, self.month as u32, self.day as u32)
    }
}
