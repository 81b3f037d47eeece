use encoding_rs::WINDOWS_1252;
use futures::stream::Stream;
use futures::task::{Context, Poll};
use log::{debug, info, trace, warn};
use std::{
    io::{Read, Seek, SeekFrom},
    ops::Index,
    pin::Pin
};

use crate::codepage::{self, TextEncoding};
use crate::decode::{FieldDecoder, FieldValue};
use crate::error::{DbfError, Result};
use crate::field::{read_descriptors, FieldDescriptor};
use crate::header::Header;
use crate::layout::read_byte;


/// Deletion flag byte of a live record.
const ACTIVE_RECORD: u8 = b' ';
/// Marks the end of the data region.
const END_OF_RECORDS: u8 = 0x1A;

/// Options applied when opening a table.
#[derive(Clone, Debug)]
pub struct ReaderOptions {
    encoding: Option<String>,
    fallback_encoding: TextEncoding
}

impl Default for ReaderOptions {
    fn default() -> ReaderOptions {
        ReaderOptions {
            encoding: None,
            // What the `ascii` label resolves to
            fallback_encoding: TextEncoding::Whatwg(WINDOWS_1252)
        }
    }
}

impl ReaderOptions {
    pub fn new() -> ReaderOptions {
        ReaderOptions::default()
    }

    /// Force a text encoding by label instead of using the language driver
    /// byte. Any WHATWG label works, as do DOS code pages like `cp437`.
    pub fn encoding<S: Into<String>>(mut self, label: S) -> ReaderOptions {
        self.encoding = Some(label.into());
        self
    }

    /// Encoding used when the language driver byte is not recognized.
    pub fn fallback_encoding<E: Into<TextEncoding>>(mut self, encoding: E) -> ReaderOptions {
        self.fallback_encoding = encoding.into();
        self
    }

    fn resolve(&self, header: &Header) -> Result<TextEncoding> {
        if let Some(label) = &self.encoding {
            return TextEncoding::for_label(label)
                .ok_or_else(|| DbfError::UnknownEncoding(label.clone()));
        }
        match codepage::encoding_for(header.language_driver) {
            Some(encoding) => Ok(encoding),
            None => {
                warn!(
                    "Unknown language driver {:#04x}, falling back to {}",
                    header.language_driver,
                    self.fallback_encoding.name()
                );
                Ok(self.fallback_encoding)
            }
        }
    }
}

/// One decoded row, field name to value in table column order.
///
/// Names are unique. When a table repeats a column name the value of the
/// last such column is kept at the position of the first one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, FieldValue)>
}

impl Record {
    fn insert(&mut self, name: &str, value: FieldValue) {
        match self.fields.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.fields.push((name.to_owned(), value))
        }
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(n, _)| n.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl Index<&str> for Record {
    type Output = FieldValue;

    fn index(&self, name: &str) -> &FieldValue {
        match self.get(name) {
            Some(value) => value,
            None => panic!("Record has no field named {}", name)
        }
    }
}

impl IntoIterator for Record {
    type Item = (String, FieldValue);
    type IntoIter = std::vec::IntoIter<(String, FieldValue)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}

/// An opened table positioned at its first record.
///
/// Opening reads the header and the field descriptors, validates them and
/// seeks to the data region. Nothing else is buffered.
#[derive(Debug)]
pub struct DbfReader<R> {
    source: R,
    header: Header,
    fields: Vec<FieldDescriptor>,
    decoder: FieldDecoder
}

impl<R: Read + Seek> DbfReader<R> {
    pub fn new(source: R) -> Result<DbfReader<R>> {
        DbfReader::with_options(source, ReaderOptions::default())
    }

    pub fn with_options(mut source: R, options: ReaderOptions) -> Result<DbfReader<R>> {
        let header = Header::read(&mut source)?;
        let encoding = options.resolve(&header)?;
        debug!("Reading field descriptors as {}", encoding.name());
        let fields = read_descriptors(&mut source, encoding)?;
        source.seek(SeekFrom::Start(u64::from(header.headerlen)))?;

        Ok(DbfReader {
            decoder: FieldDecoder::new(encoding, header.dbversion),
            source,
            header,
            fields
        })
    }

    pub fn header(&self) -> &Header {
        &self.header
    }

    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    pub fn encoding(&self) -> TextEncoding {
        self.decoder.encoding()
    }

    pub fn decoder(&self) -> &FieldDecoder {
        &self.decoder
    }

    /// Replace the field decoder, e.g. one with extra type codes registered.
    pub fn set_decoder(&mut self, decoder: FieldDecoder) {
        self.decoder = decoder;
    }

    /// Stream records from the current position. Consumes the reader.
    pub fn records(self) -> Records<R> {
        Records {
            skip_len: i64::from(self.header.recordlen.saturating_sub(1)),
            source: self.source,
            fields: self.fields,
            decoder: self.decoder,
            state: State::Streaming,
            produced: 0
        }
    }
}

impl<R: Read + Seek> IntoIterator for DbfReader<R> {
    type Item = Result<Record>;
    type IntoIter = Records<R>;

    fn into_iter(self) -> Records<R> {
        self.records()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum State {
    Streaming,
    Done
}

/// Forward only record sequence.
///
/// Deleted records are skipped. The first error is yielded once and ends the
/// sequence. Dropping it leaves the source after the last record read, or
/// after the deletion flag of a record that failed.
#[derive(Debug)]
pub struct Records<R> {
    source: R,
    fields: Vec<FieldDescriptor>,
    decoder: FieldDecoder,
    skip_len: i64,
    state: State,
    produced: u64
}

impl<R: Read + Seek> Records<R> {
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Give back the underlying source at its current position.
    pub fn into_inner(self) -> R {
        self.source
    }

    fn read_record(&mut self) -> Result<Record> {
        let mut record = Record {
            fields: Vec::with_capacity(self.fields.len())
        };
        for field in &self.fields {
            let length = field.length as usize;
            let mut data = Vec::with_capacity(length);
            self.source.by_ref().take(length as u64).read_to_end(&mut data)?;
            if data.len() != length {
                return Err(DbfError::LengthMismatch {
                    context: "field data",
                    expected: length,
                    found: data.len()
                });
            }
            let value = self.decoder.decode(field.field_type, &data).map_err(|e| DbfError::Field {
                name: field.name.clone(),
                source: Box::new(e)
            })?;
            record.insert(&field.name, value);
        }
        Ok(record)
    }

    fn next_record(&mut self) -> Result<Option<Record>> {
        loop {
            match read_byte(&mut self.source)? {
                None | Some(END_OF_RECORDS) => return Ok(None),
                Some(ACTIVE_RECORD) => return self.read_record().map(Some),
                Some(flag) => {
                    trace!("Skip inactive record with flag {:#04x}", flag);
                    self.source.seek(SeekFrom::Current(self.skip_len))?;
                }
            }
        }
    }
}

impl<R: Read + Seek> Iterator for Records<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Result<Record>> {
        if self.state == State::Done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => {
                self.produced += 1;
                Some(Ok(record))
            },
            Ok(None) => {
                self.state = State::Done;
                info!("Finished reading {} records", self.produced);
                None
            },
            Err(e) => {
                self.state = State::Done;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read + Seek> std::iter::FusedIterator for Records<R> {}

/// Records are decoded synchronously so every poll is immediately ready.
impl<R: Read + Seek + Unpin> Stream for Records<R> {
    type Item = Result<Record>;

    fn poll_next(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Poll::Ready(self.get_mut().next())
    }
}
