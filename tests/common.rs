#![cfg(feature = "std")]

use std::path::Path;

use csv::ReaderBuilder;
use dredge::{
    Decimal,
    avec::{FromRecord, FromRecords},
};

#[test]
fn decode_slice_people() {
    const PATH: &str = "fixtures/people.dbf";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    dredge::avec::decode_slice(&data, None, &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_slice_stock() {
    const PATH: &str = "fixtures/stock.dbf";
    let data = std::fs::read(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    dredge::avec::decode_slice(&data, None, &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_reader_people() {
    const PATH: &str = "fixtures/people.dbf";
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    dredge::avec::decode_reader(&mut file, None, &mut validator).unwrap();
    validator.finish();
}

#[test]
fn decode_reader_stock() {
    const PATH: &str = "fixtures/stock.dbf";
    let mut file = std::fs::File::open(PATH).unwrap();
    let mut validator = Validator::new(PATH);
    dredge::avec::decode_reader(&mut file, None, &mut validator).unwrap();
    validator.finish();
}

#[test]
fn header_info_people() {
    let data = std::fs::read("fixtures/people.dbf").unwrap();
    let info = dredge::header_info(&data).unwrap();

    assert_eq!(info.version, "FoxBase 2.x / dBASE III");
    assert!(!info.header.version.has_memo_file());
    assert_eq!(info.header.record_count, 5);
    assert_eq!(info.header.header_size, 193);
    assert_eq!(info.header.record_size, 44);
    assert_eq!(info.header.last_update, [124, 3, 15]);
    assert_eq!(info.header.language_driver, 0x57);
}

#[test]
fn header_info_stock() {
    let data = std::fs::read("fixtures/stock.dbf").unwrap();
    let info = dredge::header_info(&data).unwrap();

    assert_eq!(info.version, "FoxBase 2.x / dBASE III with memo file");
    assert!(info.header.version.has_memo_file());
    assert_eq!(info.header.header_size, 98);
}

/// Compares published records against a CSV file of expected values.
struct Validator {
    header: Vec<String>,
    expected: Vec<Vec<String>>,
    row: Vec<String>,
    column: usize,
}

impl Validator {
    fn new(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().with_extension("csv");

        let mut reader = ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)
            .unwrap();

        let header = reader
            .headers()
            .unwrap()
            .iter()
            .map(|f| f.to_string())
            .collect();

        let expected = reader
            .records()
            .map(|r| r.unwrap().iter().map(|f| f.to_string()).collect())
            .collect();

        Self {
            header,
            expected,
            row: vec![],
            column: 0,
        }
    }

    fn validate(&mut self, field: &str, value: impl ToString) {
        assert_eq!(self.header[self.column], field);
        assert_eq!(self.row.remove(0), value.to_string());
        self.column += 1;
    }

    fn finish(self) {
        assert!(self.expected.is_empty(), "records left undecoded");
    }
}

impl FromRecords for Validator {
    fn add_record(&mut self) -> Option<&mut dyn FromRecord> {
        self.row = self.expected.remove(0);
        self.column = 0;
        Some(self)
    }

    fn end_record(&mut self) {
        assert!(self.row.is_empty(), "fields left unpublished");
    }
}

impl FromRecord for Validator {
    fn add_text(&mut self, field: &str, value: &str) {
        self.validate(field, value);
    }
    fn add_date(&mut self, field: &str, value: &str) {
        self.validate(field, value);
    }
    fn add_integer(&mut self, field: &str, value: i128) {
        self.validate(field, value);
    }
    fn add_decimal(&mut self, field: &str, value: Decimal) {
        self.validate(field, value);
    }
    fn add_absent(&mut self, field: &str) {
        self.validate(field, "");
    }
}
