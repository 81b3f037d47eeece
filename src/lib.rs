//! Streaming reader for dBase / FoxPro / Visual FoxPro tables (`.dbf`).
//!
//! The table is never loaded in memory. [DbfReader](struct.DbfReader.html)
//! reads the header and the field descriptors, then
//! [Records](struct.Records.html) pulls one fixed size record at a time,
//! skips deleted ones and decodes every field with a
//! [FieldDecoder](decode/struct.FieldDecoder.html).
//!
//! ```no_run
//! use adbf_rs::{DbfReader, FieldValue};
//! use std::{fs::File, io::BufReader};
//!
//! let file = BufReader::new(File::open("table.dbf").unwrap());
//! for record in DbfReader::new(file).unwrap() {
//!     for (name, value) in record.unwrap() {
//!         if let FieldValue::Character(text) = value {
//!             println!("{}: {}", name, text);
//!         }
//!     }
//! }
//! ```
//!
//! Memo files (`.fpt`, `.dbt`) are not read, memo pointer fields are
//! returned as raw bytes or null.


pub mod codepage;
pub mod decode;
pub mod error;
pub mod field;
pub mod header;
pub mod layout;
pub mod reader;

pub use codepage::TextEncoding;
pub use decode::{FieldDecoder, FieldValue};
pub use error::{DbfError, Result};
pub use field::{FieldDescriptor, FieldType};
pub use header::{DBFType, Header};
pub use reader::{DbfReader, ReaderOptions, Record, Records};
