//! Field value decoding.
//!
//! [FieldDecoder](struct.FieldDecoder.html) owns a table from type code to
//! decode function. The table is filled once at construction and only knows
//! two things about the table being read: its text encoding and its dialect
//! version. Record streaming never looks at type codes itself so new codes
//! can be added with [with_decoder](struct.FieldDecoder.html#method.with_decoder).

use byteorder::{ByteOrder, LittleEndian};
use chrono::naive::{NaiveDate, NaiveDateTime};
use chrono::Duration;
use rust_decimal::Decimal;
use std::{collections::HashMap, convert::TryFrom, fmt};

use crate::codepage::TextEncoding;
use crate::error::{DbfError, Result};
use crate::header::DBFType;

#[cfg(test)]
mod tests;

/// Offset from julian day numbers to proleptic Gregorian ordinals where
/// 0001-01-01 is day 1.
const JULIAN_DAY_OFFSET: i64 = 1_721_425;

/// Decoded content of one field.
#[derive(Clone, Debug, PartialEq)]
pub enum FieldValue {
    Character(String),
    Integer(i64),
    Float(f64),
    /// Exact fixed point value, 4 fractional digits
    Currency(Decimal),
    Logical(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    /// Uninterpreted bytes, used for flag columns and unknown types
    Raw(Vec<u8>),
    /// Empty field
    Null
}

impl FieldValue {
    pub fn is_null(&self) -> bool {
        *self == FieldValue::Null
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Character(s) => write!(f, "{}", s),
            FieldValue::Integer(i) => write!(f, "{}", i),
            FieldValue::Float(v) => write!(f, "{}", v),
            FieldValue::Currency(d) => write!(f, "{}", d),
            FieldValue::Logical(b) => write!(f, "{}", b),
            FieldValue::Date(d) => write!(f, "{}", d),
            FieldValue::DateTime(dt) => write!(f, "{}", dt),
            FieldValue::Raw(bytes) => write!(f, "{:?}", bytes),
            FieldValue::Null => write!(f, "null")
        }
    }
}

/// Decode function registered for a type code. It receives the decoder (for
/// encoding and version), the type code and the field's raw bytes.
pub type DecodeFn = fn(&FieldDecoder, u8, &[u8]) -> Result<FieldValue>;

const DECODERS: &[(u8, DecodeFn)] = &[
    (b'0', decode_raw),
    (b'B', decode_binary),
    (b'C', decode_character),
    (b'D', decode_date),
    (b'F', decode_float),
    (b'I', decode_integer),
    (b'+', decode_integer),
    (b'L', decode_logical),
    (b'N', decode_numeric),
    (b'O', decode_double),
    (b'T', decode_datetime),
    (b'@', decode_datetime),
    (b'Y', decode_currency),
];

#[derive(Clone)]
pub struct FieldDecoder {
    encoding: TextEncoding,
    dbversion: u8,
    table: HashMap<u8, DecodeFn>
}

impl FieldDecoder {
    pub fn new<E: Into<TextEncoding>>(encoding: E, dbversion: u8) -> FieldDecoder {
        FieldDecoder {
            encoding: encoding.into(),
            dbversion,
            table: DECODERS.iter().cloned().collect()
        }
    }

    /// Register (or replace) the decode function of a type code.
    pub fn with_decoder(mut self, code: u8, decoder: DecodeFn) -> FieldDecoder {
        self.table.insert(code, decoder);
        self
    }

    /// Decode raw field bytes. Unknown type codes never fail, their bytes are
    /// returned as is.
    pub fn decode(&self, code: u8, data: &[u8]) -> Result<FieldValue> {
        match self.table.get(&code) {
            Some(decoder) => decoder(self, code, data),
            None => Ok(FieldValue::Raw(data.to_vec()))
        }
    }

    pub fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    pub fn dbversion(&self) -> u8 {
        self.dbversion
    }

    pub fn db_type(&self) -> DBFType {
        DBFType::parse_type(self.dbversion)
    }
}

impl fmt::Debug for FieldDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut codes: Vec<char> = self.table.keys().map(|c| *c as char).collect();
        codes.sort_unstable();
        f.debug_struct("FieldDecoder")
            .field("encoding", &self.encoding.name())
            .field("dbversion", &self.dbversion)
            .field("codes", &codes)
            .finish()
    }
}

fn is_blank(b: u8) -> bool {
    b.is_ascii_whitespace() || b == 0x0b
}

/// Strip ASCII whitespace on both ends.
fn trim_blank(data: &[u8]) -> &[u8] {
    let start = data.iter().position(|b| !is_blank(*b)).unwrap_or(data.len());
    let end = data.iter().rposition(|b| !is_blank(*b)).map_or(start, |i| i + 1);
    &data[start..end]
}

fn ascii_text(code: u8, data: &[u8]) -> Result<&str> {
    std::str::from_utf8(data).map_err(|_| DbfError::invalid_value(code, data, "not ASCII text"))
}

fn exact_width(code: u8, data: &[u8], width: usize) -> Result<()> {
    if data.len() != width {
        return Err(DbfError::LengthMismatch {
            context: match code {
                b'I' | b'+' => "integer field",
                b'Y' => "currency field",
                b'T' | b'@' => "datetime field",
                _ => "double field"
            },
            expected: width,
            found: data.len()
        });
    }
    Ok(())
}

fn decode_raw(_: &FieldDecoder, _: u8, data: &[u8]) -> Result<FieldValue> {
    Ok(FieldValue::Raw(data.to_vec()))
}

fn decode_character(decoder: &FieldDecoder, _: u8, data: &[u8]) -> Result<FieldValue> {
    let end = data.iter().rposition(|b| *b != 0 && *b != b' ').map_or(0, |i| i + 1);
    decoder.encoding.decode(&data[..end]).map(FieldValue::Character)
}

fn parse_yyyymmdd(data: &[u8]) -> Option<NaiveDate> {
    let text = std::str::from_utf8(data).ok()?;
    let year: i32 = text.get(0..4)?.trim().parse().ok()?;
    let month: u32 = text.get(4..6)?.trim().parse().ok()?;
    let day: u32 = text.get(6..8)?.trim().parse().ok()?;
    if year < 1 {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn decode_date(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    if let Some(date) = parse_yyyymmdd(data) {
        return Ok(FieldValue::Date(date));
    }
    // Only spaces and zeros means no date was entered
    if data.iter().all(|b| *b == b' ' || *b == b'0') {
        return Ok(FieldValue::Null);
    }
    Err(DbfError::invalid_value(code, data, "invalid date, expected YYYYMMDD"))
}

fn decode_float(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    let trimmed = trim_blank(data);
    if trimmed.is_empty() {
        return Ok(FieldValue::Null);
    }
    ascii_text(code, trimmed)?
        .parse::<f64>()
        .map(FieldValue::Float)
        .map_err(|e| DbfError::invalid_value(code, data, e.to_string()))
}

fn decode_integer(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    exact_width(code, data, 4)?;
    Ok(FieldValue::Integer(i64::from(LittleEndian::read_i32(data))))
}

fn decode_logical(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    match data {
        [b'T' | b't' | b'Y' | b'y'] => Ok(FieldValue::Logical(true)),
        [b'F' | b'f' | b'N' | b'n'] => Ok(FieldValue::Logical(false)),
        [b'?' | b' '] => Ok(FieldValue::Null),
        _ => Err(DbfError::invalid_value(code, data, "illegal value for logical field"))
    }
}

fn decode_numeric(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    let trimmed = trim_blank(data);
    if trimmed.is_empty() {
        return Ok(FieldValue::Null);
    }
    let text = ascii_text(code, trimmed)?;
    if let Ok(value) = text.parse::<i64>() {
        return Ok(FieldValue::Integer(value));
    }
    // Some writers use a decimal comma
    text.replace(',', ".")
        .parse::<f64>()
        .map(FieldValue::Float)
        .map_err(|e| DbfError::invalid_value(code, data, e.to_string()))
}

fn decode_double(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    exact_width(code, data, 8)?;
    Ok(FieldValue::Float(LittleEndian::read_f64(data)))
}

fn decode_datetime(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    if trim_blank(data).is_empty() {
        return Ok(FieldValue::Null);
    }
    exact_width(code, data, 8)?;
    let day = LittleEndian::read_u32(&data[..4]);
    let milli_from_midnight = LittleEndian::read_u32(&data[4..]);
    // Day 0 shows up with a few stray milliseconds in real files, still empty
    if day == 0 {
        return Ok(FieldValue::Null);
    }

    i32::try_from(i64::from(day) - JULIAN_DAY_OFFSET)
        .ok()
        .filter(|ordinal| *ordinal >= 1)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .and_then(|midnight| midnight.checked_add_signed(Duration::milliseconds(i64::from(milli_from_midnight))))
        .map(FieldValue::DateTime)
        .ok_or_else(|| DbfError::invalid_value(code, data, format!("julian day {} out of range", day)))
}

fn decode_currency(_: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    exact_width(code, data, 8)?;
    Ok(FieldValue::Currency(Decimal::new(LittleEndian::read_i64(data), 4)))
}

/// `B` is a double in Visual FoxPro and a memo file pointer in every other
/// dialect. Memo files are not read so the latter is always null.
fn decode_binary(decoder: &FieldDecoder, code: u8, data: &[u8]) -> Result<FieldValue> {
    if decoder.db_type().is_visual_foxpro() {
        decode_double(decoder, code, data)
    } else {
        Ok(FieldValue::Null)
    }
}
