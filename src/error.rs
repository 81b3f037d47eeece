//! Error types for reading DBF tables.

use thiserror::Error;

/// Every failure the decoder can report.
///
/// None of them is transient: a DBF file is read front to back and a bad
/// byte offset cannot be guessed, so callers get the error as soon as it
/// happens and the record stream ends there.
#[derive(Debug, Error)]
pub enum DbfError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fewer (or more) bytes than a fixed layout needs.
    #[error("Size mismatch for {context}: expected {expected} bytes, but found {found} bytes")]
    LengthMismatch {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// A layout getter was asked for a name or width it does not declare.
    #[error("Layout has no {expected} field named `{name}`")]
    MissingLayoutField {
        name: &'static str,
        expected: &'static str,
    },

    /// Field descriptor breaks the fixed width rule of its type.
    #[error("Field: `{name}` of type {field_type} must have length {expected} (was {found})")]
    InvalidFieldLength {
        name: String,
        field_type: char,
        expected: u8,
        found: u8,
    },

    /// Raw bytes that do not follow the grammar of their field type.
    #[error("Invalid value for {field_type} field {value:?}: {reason}")]
    InvalidValue {
        field_type: char,
        value: Vec<u8>,
        reason: String,
    },

    #[error("Bytes {value:?} are not valid {encoding} text")]
    Encoding {
        encoding: &'static str,
        value: Vec<u8>,
    },

    #[error("Unknown encoding label `{0}`")]
    UnknownEncoding(String),

    /// Decoding error inside a named field of a record.
    #[error("Fail to decode field `{name}`: {source}")]
    Field {
        name: String,
        #[source]
        source: Box<DbfError>,
    },
}

impl DbfError {
    pub(crate) fn invalid_value(field_type: u8, value: &[u8], reason: impl Into<String>) -> DbfError {
        DbfError::InvalidValue {
            field_type: field_type as char,
            value: value.to_vec(),
            reason: reason.into(),
        }
    }
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, DbfError>;
