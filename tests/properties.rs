use dredge::{
    FieldDescriptor, FieldType, Record, Value,
    avec::{Collect, slice::Error},
};

/// Build a table from `(name, type, length, decimal count)` field descriptors
/// and records given with their deletion marker.
fn table(fields: &[(&str, u8, u8, u8)], records: &[&[u8]], padded: bool) -> Vec<u8> {
    let record_size = 1 + fields.iter().map(|f| f.2 as u16).sum::<u16>();
    let header_size = 32 + 32 * fields.len() as u16 + 1 + padded as u16;

    let mut r = vec![0x03, 124, 3, 15];
    r.extend_from_slice(&(records.len() as u32).to_le_bytes());
    r.extend_from_slice(&header_size.to_le_bytes());
    r.extend_from_slice(&record_size.to_le_bytes());
    r.extend_from_slice(&[0; 20]);

    for (name, kind, length, decimal_count) in fields {
        let mut descriptor = [0; 32];
        descriptor[..name.len()].copy_from_slice(name.as_bytes());
        descriptor[11] = *kind;
        descriptor[16] = *length;
        descriptor[17] = *decimal_count;
        r.extend_from_slice(&descriptor);
    }

    r.push(0x0D);
    if padded {
        r.push(0x00);
    }

    for record in records {
        r.extend_from_slice(record);
    }

    r
}

fn set_record_count(r: &mut [u8], count: u32) {
    r[4..8].copy_from_slice(&count.to_le_bytes());
}

fn text(s: &str) -> Value {
    Value::Text(s.to_string())
}

const PEOPLE: &[(&str, u8, u8, u8)] = &[
    ("NAME", b'C', 8, 0),
    ("AGE", b'N', 3, 0),
    ("BALANCE", b'N', 7, 2),
    ("NOTES", b'M', 10, 0),
];

const PEOPLE_RECORDS: &[&[u8]] = &[
    b" Alice    31  12.50         1",
    b"*Mallory  66 999.99          ",
    b" Bob     abc       ",
    b" Carol       x.y          2",
];

fn people(padded: bool) -> Vec<u8> {
    // Pad each record to the full record width.
    let records: Vec<Vec<u8>> = PEOPLE_RECORDS
        .iter()
        .map(|r| {
            let mut r = r.to_vec();
            r.resize(29, b' ');
            r
        })
        .collect();
    let records: Vec<&[u8]> = records.iter().map(|r| r.as_slice()).collect();

    table(PEOPLE, &records, padded)
}

#[test]
fn end_to_end_single_character_field() {
    let mut r = vec![0x03, 124, 3, 15];
    r.extend_from_slice(&2u32.to_le_bytes());
    r.extend_from_slice(&97u16.to_le_bytes());
    r.extend_from_slice(&13u16.to_le_bytes());
    r.extend_from_slice(&[0; 20]);

    let mut descriptor = [0; 32];
    descriptor[..4].copy_from_slice(b"NAME");
    descriptor[11] = b'C';
    descriptor[16] = 12;
    r.extend_from_slice(&descriptor);

    r.push(0x0D);
    r.extend_from_slice(b" John Doe    ");
    r.extend_from_slice(b"*Jane Doe    ");

    let records = dredge::parse(&r).unwrap();

    let expected: Record = [("NAME".to_string(), text("John Doe"))].into_iter().collect();
    assert_eq!(records, [expected]);
}

#[test]
fn active_records_in_file_order() {
    let records = dredge::parse(&people(false)).unwrap();

    let names: Vec<_> = records.iter().map(|r| r.get("NAME").unwrap()).collect();
    assert_eq!(names, [&text("Alice"), &text("Bob"), &text("Carol")]);
}

#[test]
fn padding_after_terminator_is_detected() {
    assert_eq!(
        dredge::parse(&people(true)).unwrap(),
        dredge::parse(&people(false)).unwrap()
    );
}

#[test]
fn deleted_records_never_appear() {
    let data = people(false);

    let all = dredge::parse_with(&data, Some(&["NAME"]), |mut r| {
        r.insert("SEEN", Value::Integer(1));
        Some(r)
    })
    .unwrap();

    assert_eq!(all.len(), 3);
    assert!(all.iter().all(|r| r.get("NAME") != Some(&text("Mallory"))));
}

#[test]
fn any_marker_but_space_deletes() {
    let data = table(
        &[("NAME", b'C', 4, 0)],
        &[b" KEEP", b"XGONE", b"#GONE", b" LAST"],
        false,
    );

    let records = dredge::parse(&data).unwrap();

    let names: Vec<_> = records.iter().map(|r| r.get("NAME").unwrap()).collect();
    assert_eq!(names, [&text("KEEP"), &text("LAST")]);
}

#[test]
fn end_of_file_marker_after_terminator() {
    let mut data = table(&[("NAME", b'C', 4, 0)], &[], false);
    set_record_count(&mut data, 2);
    data.push(0x1A);
    data.extend_from_slice(b" JUNK");

    assert!(dredge::parse(&data).unwrap().is_empty());
}

#[test]
fn numeric_fields_span_widest_integers() {
    let data = table(
        &[("QTY", b'N', 19, 0), ("DEBT", b'N', 20, 0)],
        &[b" 9999999999999999999-9999999999999999999"],
        false,
    );

    let records = dredge::parse(&data).unwrap();

    assert_eq!(
        records[0].get("QTY"),
        Some(&Value::Integer(9_999_999_999_999_999_999))
    );
    assert_eq!(
        records[0].get("DEBT"),
        Some(&Value::Integer(-9_999_999_999_999_999_999))
    );
}

#[test]
fn projection_selects_declared_columns() {
    let data = people(false);
    let records = dredge::parse_with(&data, Some(&["AGE", "NAME", "MISSING"]), Some).unwrap();

    for record in &records {
        let keys: Vec<_> = record.keys().collect();
        // Table order, not projection order.
        assert_eq!(keys, ["NAME", "AGE"]);
    }

    // An empty projection selects every column.
    let records = dredge::parse_with(&data, Some(&[]), Some).unwrap();
    assert_eq!(records[0].len(), 4);
}

#[test]
fn transform_drops_and_rewrites_records() {
    let data = people(false);

    let records = dredge::parse_with(&data, None, |mut r| {
        if r.get("NAME") == Some(&text("Bob")) {
            return None;
        }
        r.remove("NOTES");
        Some(r)
    })
    .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| !r.contains_key("NOTES")));
}

#[test]
fn numeric_fields_fall_back_to_zero() {
    let records = dredge::parse(&people(false)).unwrap();

    assert_eq!(records[0].get("AGE"), Some(&Value::Integer(31)));
    // "abc"
    assert_eq!(records[1].get("AGE"), Some(&Value::Integer(0)));
    // Empty.
    assert_eq!(records[2].get("AGE"), Some(&Value::Integer(0)));

    let Some(Value::Decimal(balance)) = records[0].get("BALANCE") else {
        panic!("expected a decimal");
    };
    assert_eq!(balance.to_string(), "12.50");

    // Empty, then "x.y".
    for record in &records[1..] {
        let Some(Value::Decimal(balance)) = record.get("BALANCE") else {
            panic!("expected a decimal");
        };
        assert!(balance.is_zero());
        assert_eq!(balance.to_string(), "0.00");
    }
}

#[test]
fn memo_fields_are_absent() {
    let records = dredge::parse(&people(false)).unwrap();
    assert!(records.iter().all(|r| r.get("NOTES") == Some(&Value::Absent)));
}

#[test]
fn field_info_trims_names_at_null() {
    let fields = dredge::field_info(&people(false)).unwrap();

    assert_eq!(
        fields[0],
        FieldDescriptor {
            name: "NAME".to_string(),
            kind: FieldType::Character,
            length: 8,
            decimal_count: 0,
        }
    );
    assert_eq!(fields[2].kind, FieldType::Numeric);
    assert_eq!(fields[2].decimal_count, 2);
    assert_eq!(fields[3].kind, FieldType::Memo);
}

#[test]
fn other_field_types_pass_through_as_text() {
    let data = table(&[("ACTIVE", b'L', 1, 0)], &[b" T", b" ?"], false);

    let fields = dredge::field_info(&data).unwrap();
    assert_eq!(fields[0].kind, FieldType::Other(b'L'));
    assert_eq!(fields[0].kind.tag(), b'L');

    let records = dredge::parse(&data).unwrap();
    assert_eq!(records[0].get("ACTIVE"), Some(&text("T")));
    assert_eq!(records[1].get("ACTIVE"), Some(&text("?")));
}

#[test]
fn version_labels() {
    let mut data = people(false);
    assert_eq!(
        dredge::header_info(&data).unwrap().version,
        "FoxBase 2.x / dBASE III"
    );

    data[0] = 0x99;
    assert!(matches!(
        dredge::header_info(&data),
        Err(Error::UnsupportedVersion(0x99))
    ));

    // Records decode regardless of the version label.
    assert_eq!(dredge::parse(&data).unwrap().len(), 3);
}

#[test]
fn truncated_header() {
    let data = people(false);
    assert!(matches!(
        dredge::parse(&data[..31]),
        Err(Error::TruncatedHeader)
    ));
    assert!(matches!(
        dredge::header_info(&data[..10]),
        Err(Error::TruncatedHeader)
    ));
}

#[test]
fn truncated_field_table() {
    let data = people(false);

    // Within the second descriptor.
    assert!(matches!(
        dredge::field_info(&data[..80]),
        Err(Error::TruncatedFieldTable)
    ));

    // Before the terminator.
    let terminator = 32 + 32 * PEOPLE.len();
    assert!(matches!(
        dredge::parse(&data[..terminator]),
        Err(Error::TruncatedFieldTable)
    ));
}

#[test]
fn truncated_record() {
    let data = people(false);
    assert!(matches!(
        dredge::parse(&data[..data.len() - 5]),
        Err(Error::TruncatedRecord { index: 3 })
    ));
}

#[test]
fn record_size_mismatch() {
    let mut data = people(false);
    data[10..12].copy_from_slice(&40u16.to_le_bytes());

    assert!(matches!(
        dredge::parse(&data),
        Err(Error::RecordSizeMismatch {
            declared: 40,
            computed: 29
        })
    ));
}

#[test]
fn exhausted_input_stops_early() {
    let mut data = people(false);
    set_record_count(&mut data, 10);

    assert_eq!(dredge::parse(&data).unwrap().len(), 3);

    // End-of-file marker in place of a deletion marker.
    data.push(0x1A);
    data.extend_from_slice(&[b' '; 29]);
    assert_eq!(dredge::parse(&data).unwrap().len(), 3);
}

#[test]
fn declared_record_count_bounds_decoding() {
    let mut data = people(false);
    set_record_count(&mut data, 1);
    assert_eq!(dredge::parse(&data).unwrap().len(), 1);

    set_record_count(&mut data, 0);
    assert!(dredge::parse(&data).unwrap().is_empty());
}

#[test]
fn receiver_collects_through_transform() {
    let data = people(true);
    let mut records = Collect::new(|r: Record| (r.get("AGE") != Some(&Value::Integer(0))).then_some(r));

    let header = dredge::avec::decode_slice(&data, None, &mut records).unwrap();

    assert_eq!(header.record_count, 4);
    assert_eq!(records.records().len(), 1);
}

#[cfg(feature = "std")]
#[test]
fn reader_matches_slice() {
    for padded in [false, true] {
        let data = people(padded);

        let mut records = Collect::new(Some);
        dredge::avec::decode_reader(&mut data.as_slice(), None, &mut records).unwrap();

        assert_eq!(records.into_records(), dredge::parse(&data).unwrap());
    }
}

#[cfg(feature = "std")]
#[test]
fn reader_stops_at_end_of_file_marker_after_terminator() {
    let mut data = table(&[("NAME", b'C', 4, 0)], &[], false);
    set_record_count(&mut data, 2);
    data.push(0x1A);
    data.extend_from_slice(b" JUNK");

    let mut records = Collect::new(Some);
    dredge::avec::decode_reader(&mut data.as_slice(), None, &mut records).unwrap();

    assert!(records.into_records().is_empty());
}

#[cfg(feature = "std")]
#[test]
fn reader_reports_truncation() {
    use dredge::avec::reader;

    let data = people(false);
    let mut records = Collect::new(Some);

    let result = dredge::avec::decode_reader(&mut &data[..20], None, &mut records);
    assert!(matches!(result, Err(reader::Error::TruncatedHeader)));

    let result = dredge::avec::decode_reader(&mut &data[..data.len() - 5], None, &mut records);
    assert!(matches!(
        result,
        Err(reader::Error::TruncatedRecord { index: 3 })
    ));
}
