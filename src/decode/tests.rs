use super::*;
use encoding_rs::{IBM866, WINDOWS_1251, WINDOWS_1252};
use std::str::FromStr;
use crate::field::{required_length, FieldType};

fn decoder() -> FieldDecoder {
    FieldDecoder::new(WINDOWS_1252, 0x02)
}

fn assert_invalid(result: Result<FieldValue>) {
    match result {
        Err(DbfError::InvalidValue { .. }) => {},
        other => panic!("Expect invalid value but got {:?}", other)
    }
}

#[test]
fn test_raw_flags() {
    let d = decoder();
    assert_eq!(d.decode(b'0', b"\0").unwrap(), FieldValue::Raw(vec![0]));
    assert_eq!(d.decode(b'0', b"\xaa\xff").unwrap(), FieldValue::Raw(vec![0xaa, 0xff]));
}

#[test]
fn test_unknown_code_returns_bytes() {
    let d = decoder();
    assert_eq!(d.decode(b'M', b"  12").unwrap(), FieldValue::Raw(b"  12".to_vec()));
    assert_eq!(d.decode(b'Z', b"").unwrap(), FieldValue::Raw(vec![]));
    for code in b"PQV" {
        assert_eq!(d.decode(*code, b"\x01\x02").unwrap(), FieldValue::Raw(vec![1, 2]));
    }
}

#[test]
fn test_date() {
    let d = decoder();
    assert_eq!(d.decode(b'D', b"00000000").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'D', b"        ").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'D', b"").unwrap(), FieldValue::Null);
    assert_eq!(
        d.decode(b'D', b"19700101").unwrap(),
        FieldValue::Date(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap())
    );
    assert_eq!(
        d.decode(b'D', b"20200229").unwrap(),
        FieldValue::Date(NaiveDate::from_ymd_opt(2020, 2, 29).unwrap())
    );
    assert_invalid(d.decode(b'D', b"NotIntgr"));
    assert_invalid(d.decode(b'D', b"20190229"));
}

#[test]
fn test_date_error_names_value() {
    let err = decoder().decode(b'D', b"NotIntgr").unwrap_err();
    match err {
        DbfError::InvalidValue { field_type, value, .. } => {
            assert_eq!(field_type, 'D');
            assert_eq!(value, b"NotIntgr".to_vec());
        }
        other => panic!("Unexpected error {:?}", other)
    }
}

#[test]
fn test_float() {
    let d = decoder();
    assert_eq!(d.decode(b'F', b"").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'F', b" ").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'F', b"0").unwrap(), FieldValue::Float(0.0));
    assert_eq!(d.decode(b'F', b"1").unwrap(), FieldValue::Float(1.0));
    assert_eq!(d.decode(b'F', b"-1").unwrap(), FieldValue::Float(-1.0));
    assert_eq!(d.decode(b'F', b"  3.14").unwrap(), FieldValue::Float(3.14));
    assert_invalid(d.decode(b'F', b"jsdf"));
}

#[test]
fn test_integer_and_autoincrement() {
    let d = decoder();
    for code in &[b'I', b'+'] {
        assert_eq!(d.decode(*code, b"\x00\x00\x00\x00").unwrap(), FieldValue::Integer(0));
        assert_eq!(d.decode(*code, b"\x01\x00\x00\x00").unwrap(), FieldValue::Integer(1));
        assert_eq!(d.decode(*code, b"\xff\xff\xff\xff").unwrap(), FieldValue::Integer(-1));
    }
    assert!(matches!(
        d.decode(b'I', b"\x01\x00"),
        Err(DbfError::LengthMismatch { expected: 4, found: 2, .. })
    ));
}

#[test]
fn test_numeric() {
    let d = decoder();
    assert_eq!(d.decode(b'N', b"").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'N', b" ").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'N', b"         1").unwrap(), FieldValue::Integer(1));
    assert_eq!(d.decode(b'N', b"-99").unwrap(), FieldValue::Integer(-99));
    assert_eq!(d.decode(b'N', b"3.14").unwrap(), FieldValue::Float(3.14));
    assert_eq!(d.decode(b'N', b"  2,5").unwrap(), FieldValue::Float(2.5));
    assert_invalid(d.decode(b'N', b"okasd"));
}

#[test]
fn test_double() {
    let d = decoder();
    assert_eq!(d.decode(b'O', &[0u8; 8]).unwrap(), FieldValue::Float(0.0));
    assert_eq!(d.decode(b'O', b"\x00\x00\x00\x00\x00\x00\xf0?").unwrap(), FieldValue::Float(1.0));
    assert_eq!(d.decode(b'O', b"\x00\x00\x00\x00\x00\x00Y\xc0").unwrap(), FieldValue::Float(-100.0));
    assert!(matches!(d.decode(b'O', b""), Err(DbfError::LengthMismatch { .. })));
}

#[test]
fn test_datetime() {
    let d = decoder();
    for code in &[b'T', b'@'] {
        assert_eq!(d.decode(*code, b"").unwrap(), FieldValue::Null);
        assert_eq!(d.decode(*code, b" ").unwrap(), FieldValue::Null);
        assert_eq!(d.decode(*code, b"        ").unwrap(), FieldValue::Null);
    }

    // Day 0 with a few milliseconds is still empty
    let mut raw = [0u8; 8];
    raw[4] = 2;
    assert_eq!(d.decode(b'T', &raw).unwrap(), FieldValue::Null);

    // 1970-01-01 is julian day 2440588, 13:30:15.250 is 48615250 ms
    let mut raw = Vec::new();
    raw.extend_from_slice(&2_440_588u32.to_le_bytes());
    raw.extend_from_slice(&48_615_250u32.to_le_bytes());
    let expected = NaiveDate::from_ymd_opt(1970, 1, 1)
        .unwrap()
        .and_hms_milli_opt(13, 30, 15, 250)
        .unwrap();
    assert_eq!(d.decode(b'T', &raw).unwrap(), FieldValue::DateTime(expected));
    assert_eq!(d.decode(b'@', &raw).unwrap(), FieldValue::DateTime(expected));
}

#[test]
fn test_datetime_before_common_era() {
    let mut raw = Vec::new();
    raw.extend_from_slice(&5u32.to_le_bytes());
    raw.extend_from_slice(&0u32.to_le_bytes());
    assert_invalid(decoder().decode(b'T', &raw));
}

#[test]
fn test_currency() {
    let d = decoder();
    assert_eq!(
        d.decode(b'Y', b"\x01\x00\x00\x00\x00\x00\x00\x00").unwrap(),
        FieldValue::Currency(Decimal::from_str("0.0001").unwrap())
    );
    assert_eq!(
        d.decode(b'Y', b"\xff\xff\xff\xff\xff\xff\xff\xff").unwrap(),
        FieldValue::Currency(Decimal::from_str("-0.0001").unwrap())
    );
    assert_eq!(
        d.decode(b'Y', &1_234_500i64.to_le_bytes()).unwrap().to_string(),
        "123.4500"
    );
}

#[test]
fn test_logical() {
    let d = decoder();
    for b in b"TtYy" {
        assert_eq!(d.decode(b'L', &[*b]).unwrap(), FieldValue::Logical(true));
    }
    for b in b"FfNn" {
        assert_eq!(d.decode(b'L', &[*b]).unwrap(), FieldValue::Logical(false));
    }
    for b in b"? " {
        assert_eq!(d.decode(b'L', &[*b]).unwrap(), FieldValue::Null);
    }
    for b in b"!0" {
        assert_invalid(d.decode(b'L', &[*b]));
    }
}

#[test]
fn test_binary_in_visual_foxpro() {
    let d = FieldDecoder::new(WINDOWS_1252, 0x30);
    match d.decode(b'B', b"01abcdef").unwrap() {
        FieldValue::Float(_) => {},
        other => panic!("Expect float but got {:?}", other)
    }
    assert_eq!(d.decode(b'B', &[0u8; 8]).unwrap(), FieldValue::Float(0.0));
    assert!(d.decode(b'B', b"").is_err());
}

#[test]
fn test_binary_is_memo_elsewhere() {
    let d = FieldDecoder::new(WINDOWS_1252, 0x02);
    assert_eq!(d.decode(b'B', b"1").unwrap(), FieldValue::Null);
    assert_eq!(d.decode(b'B', b"").unwrap(), FieldValue::Null);
}

#[test]
fn test_character() {
    let d = decoder();
    assert_eq!(d.decode(b'C', b"test").unwrap(), FieldValue::Character("test".to_owned()));
    assert_eq!(d.decode(b'C', b"  lead \0 \0").unwrap(), FieldValue::Character("  lead".to_owned()));
    assert_eq!(d.decode(b'C', b"    ").unwrap(), FieldValue::Character(String::new()));
}

#[test]
fn test_character_encodings() {
    let text = "Привет мир";
    for encoding in &[WINDOWS_1251, IBM866] {
        let d = FieldDecoder::new(*encoding, 0x03);
        let (encoded, _, _) = encoding.encode(text);
        let mut raw = encoded.into_owned();
        raw.extend_from_slice(b"  \0\0");
        assert_eq!(d.decode(b'C', &raw).unwrap(), FieldValue::Character(text.to_owned()));
    }
}

#[test]
fn test_character_malformed_text() {
    let d = FieldDecoder::new(encoding_rs::UTF_8, 0x03);
    assert!(matches!(d.decode(b'C', b"\xff\xfe"), Err(DbfError::Encoding { .. })));
}

#[test]
fn test_registered_decoder() {
    fn decode_memo(_: &FieldDecoder, _: u8, data: &[u8]) -> Result<FieldValue> {
        Ok(FieldValue::Integer(data.len() as i64))
    }

    let d = decoder().with_decoder(b'M', decode_memo);
    assert_eq!(d.decode(b'M', b"0000000012").unwrap(), FieldValue::Integer(10));
    assert_eq!(d.decode(b'C', b"x").unwrap(), FieldValue::Character("x".to_owned()));
}

#[test]
fn test_decoder_context() {
    let d = FieldDecoder::new(WINDOWS_1251, 0x31);
    assert_eq!(d.encoding(), WINDOWS_1251);
    assert_eq!(d.dbversion(), 0x31);
    assert_eq!(d.db_type(), DBFType::VisualFoxProAutoInc);
}

#[test]
fn test_builtin_codes_are_field_types() {
    for (code, _) in DECODERS {
        assert!(FieldType::from_code(*code).is_some(), "type {} has no FieldType", *code as char);
    }
}

#[test]
fn test_fixed_width_codes_decode_at_that_width() {
    let d = decoder();
    for code in b"CYDTBFGILMNOP@QV0" {
        if let Some(width) = required_length(*code) {
            let data = vec![b'T'; width as usize];
            assert!(d.decode(*code, &data).is_ok(), "type {} width {}", *code as char, width);
        }
    }
}
