//! Language driver byte to text encoding.
//!
//! Windows, Mac and CJK code pages are decoded with `encoding_rs`. DOS (OEM)
//! code pages such as 437 or 850 have no WHATWG encoding, they go through
//! the single byte tables of `oem_cp`.

use encoding_rs::{
    Encoding, BIG5, EUC_KR, GBK, IBM866, MACINTOSH, SHIFT_JIS, WINDOWS_1250, WINDOWS_1251,
    WINDOWS_1252, WINDOWS_1253, WINDOWS_1254, WINDOWS_1255, WINDOWS_1256, WINDOWS_1257,
    WINDOWS_874, X_MAC_CYRILLIC,
};
use oem_cp::code_table::DECODING_TABLE_CP_MAP;
use std::fmt;

use crate::error::{DbfError, Result};

/// Text encoding of names and character fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextEncoding {
    Whatwg(&'static Encoding),
    /// DOS code page number
    Oem(u16)
}

impl TextEncoding {
    /// Resolve a label. WHATWG labels (`cp1251`, `cp866`, `utf-8`, ...) win,
    /// then `cp437`, `ibm850` or a bare `852` name a DOS code page.
    pub fn for_label(label: &str) -> Option<TextEncoding> {
        let label = label.trim();
        if let Some(encoding) = Encoding::for_label(label.as_bytes()) {
            return Some(TextEncoding::Whatwg(encoding));
        }
        let lower = label.to_ascii_lowercase();
        let number = lower
            .trim_start_matches("cp")
            .trim_start_matches("ibm")
            .trim_start_matches("oem")
            .trim_start_matches(|c| c == '-' || c == '_');
        number
            .parse::<u16>()
            .ok()
            .and_then(TextEncoding::oem)
    }

    /// DOS code page, if `oem_cp` has a table for it.
    pub fn oem(code_page: u16) -> Option<TextEncoding> {
        if oem_name(code_page).is_some() && DECODING_TABLE_CP_MAP.get(&code_page).is_some() {
            Some(TextEncoding::Oem(code_page))
        } else {
            None
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TextEncoding::Whatwg(encoding) => encoding.name(),
            TextEncoding::Oem(code_page) => oem_name(*code_page).unwrap_or("oem")
        }
    }

    /// Decode without replacement characters. Malformed input is an error.
    pub fn decode(&self, bytes: &[u8]) -> Result<String> {
        let text = match self {
            TextEncoding::Whatwg(encoding) => encoding
                .decode_without_bom_handling_and_without_replacement(bytes)
                .map(|text| text.into_owned()),
            TextEncoding::Oem(code_page) => DECODING_TABLE_CP_MAP
                .get(code_page)
                .and_then(|table| table.decode_string_checked(bytes))
        };
        text.ok_or_else(|| DbfError::Encoding {
            encoding: self.name(),
            value: bytes.to_vec()
        })
    }
}

impl From<&'static Encoding> for TextEncoding {
    fn from(encoding: &'static Encoding) -> TextEncoding {
        TextEncoding::Whatwg(encoding)
    }
}

impl PartialEq<&'static Encoding> for TextEncoding {
    fn eq(&self, other: &&'static Encoding) -> bool {
        *self == TextEncoding::Whatwg(*other)
    }
}

impl fmt::Display for TextEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

fn oem_name(code_page: u16) -> Option<&'static str> {
    match code_page {
        437 => Some("cp437"),
        737 => Some("cp737"),
        850 => Some("cp850"),
        852 => Some("cp852"),
        857 => Some("cp857"),
        860 => Some("cp860"),
        861 => Some("cp861"),
        863 => Some("cp863"),
        865 => Some("cp865"),
        _ => None
    }
}

fn whatwg(language_driver: u8) -> Option<&'static Encoding> {
    match language_driver {
        0x03 | 0x57 | 0x58 | 0x59 => Some(WINDOWS_1252),
        0x04 => Some(MACINTOSH),
        0x13 | 0x7B => Some(SHIFT_JIS),
        0x26 | 0x65 => Some(IBM866),
        0x4D | 0x7A => Some(GBK),
        0x4E | 0x79 => Some(EUC_KR),
        0x4F | 0x78 => Some(BIG5),
        0x50 | 0x7C => Some(WINDOWS_874),
        0x7D => Some(WINDOWS_1255),
        0x7E => Some(WINDOWS_1256),
        0x96 => Some(X_MAC_CYRILLIC),
        0xC8 => Some(WINDOWS_1250),
        0xC9 => Some(WINDOWS_1251),
        0xCA => Some(WINDOWS_1254),
        0xCB => Some(WINDOWS_1253),
        0xCC => Some(WINDOWS_1257),
        _ => None
    }
}

fn dos_code_page(language_driver: u8) -> Option<u16> {
    match language_driver {
        0x01 | 0x09 | 0x0B | 0x0D | 0x0F | 0x11 | 0x15 | 0x18 | 0x19 | 0x1B => Some(437),
        0x02 | 0x0A | 0x0E | 0x10 | 0x12 | 0x14 | 0x16 | 0x1A | 0x1D | 0x25 | 0x37 => Some(850),
        0x1F | 0x22 | 0x23 | 0x40 | 0x64 => Some(852),
        0x08 | 0x17 | 0x66 => Some(865),
        0x1C | 0x6C => Some(863),
        0x24 => Some(860),
        0x67 => Some(861),
        0x6A => Some(737),
        0x6B => Some(857),
        _ => None
    }
}

/// Encoding marked by the header's language driver byte, if it is known.
pub fn encoding_for(language_driver: u8) -> Option<TextEncoding> {
    whatwg(language_driver)
        .map(TextEncoding::Whatwg)
        .or_else(|| dos_code_page(language_driver).and_then(TextEncoding::oem))
}
