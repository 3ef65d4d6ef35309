//! Decoded columns resolved to store types and written back as literals.

use chrono::NaiveDate;
use mysqlkit::prelude::*;
use mysqlkit::xproto::ColumnType;

fn zigzag(n: i64) -> Vec<u8> {
    let mut buf = Vec::new();
    mysqlkit::xproto::wire::write_zigzag(&mut buf, n);
    buf
}

fn fields(parts: &[u64]) -> Vec<u8> {
    let mut buf = Vec::new();
    for &p in parts {
        mysqlkit::xproto::wire::write_varint(&mut buf, p);
    }
    buf
}

#[test]
fn decoded_values_render_through_mappings() {
    let metadata = vec![
        ColumnMetaData::new(ColumnType::SInt.code()).name("id").length(11),
        ColumnMetaData::new(ColumnType::Bytes.code())
            .name("title")
            .collation(255)
            .length(200),
        ColumnMetaData::new(ColumnType::DateTime.code())
            .name("born")
            .length(10),
    ];
    let columns = decode_columns(&metadata).unwrap();

    let id = zigzag(7);
    let title = b"it's\0".to_vec();
    let born = fields(&[1990, 7, 4]);
    let row: Vec<Option<&[u8]>> = vec![
        Some(id.as_slice()),
        Some(title.as_slice()),
        Some(born.as_slice()),
    ];
    let values = decode_row(&columns, &row).unwrap();
    assert_eq!(
        values[2],
        Value::Date(NaiveDate::from_ymd_opt(1990, 7, 4).unwrap())
    );

    let registry = MappingRegistry::global();
    let literals: Vec<String> = columns
        .iter()
        .zip(&values)
        .map(|((_, decoder), value)| {
            registry
                .find(None, Some(decoder.native_type()), &MappingFacets::new())
                .unwrap()
                .sql_literal(value)
                .unwrap()
        })
        .collect();
    assert_eq!(literals, vec!["7", "'it''s'", "DATE '1990-07-04'"]);
}

#[test]
fn parse_errors_carry_source_text() {
    let err = parse("a +").unwrap_err();
    assert!(matches!(err, Error::Parse(_)));
    assert_eq!(err.source_text(), Some("a +"));
}
