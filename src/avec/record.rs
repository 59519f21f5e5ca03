//! Dynamically shaped records.

use alloc::{
    string::{String, ToString},
    vec::{self, Vec},
};
use core::{mem, slice};

use rust_decimal::Decimal;

use crate::sans::value::Value;

use super::{FromRecord, FromRecords};

/// Field values of a record, in table order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Record(Vec<(String, Value)>);

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Value of a field, if present.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.iter().find(|(k, _)| k == field).map(|(_, v)| v)
    }

    pub fn contains_key(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    /// Set the value of a field, returning its previous value.
    ///
    /// New fields are appended after existing ones.
    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        let field = field.into();

        match self.0.iter_mut().find(|(k, _)| *k == field) {
            Some((_, v)) => Some(mem::replace(v, value)),
            None => {
                self.0.push((field, value));
                None
            }
        }
    }

    /// Remove a field, returning its value.
    pub fn remove(&mut self, field: &str) -> Option<Value> {
        let position = self.0.iter().position(|(k, _)| k == field)?;
        Some(self.0.remove(position).1)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Field names, in table order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> slice::Iter<'_, (String, Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl IntoIterator for Record {
    type Item = (String, Value);
    type IntoIter = vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Record {
    type Item = &'a (String, Value);
    type IntoIter = slice::Iter<'a, (String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl FromRecord for Record {
    fn add_text(&mut self, field: &str, value: &str) {
        self.insert(field, Value::Text(value.to_string()));
    }
    fn add_date(&mut self, field: &str, value: &str) {
        self.insert(field, Value::RawDateText(value.to_string()));
    }
    fn add_integer(&mut self, field: &str, value: i128) {
        self.insert(field, Value::Integer(value));
    }
    fn add_decimal(&mut self, field: &str, value: Decimal) {
        self.insert(field, Value::Decimal(value));
    }
    fn add_absent(&mut self, field: &str) {
        self.insert(field, Value::Absent);
    }
}

/// Collect records, passing each through a transform.
///
/// Records for which the transform returns `None` are dropped.
pub struct Collect<F> {
    records: Vec<Record>,
    pending: Record,
    transform: F,
}

impl<F: FnMut(Record) -> Option<Record>> Collect<F> {
    pub fn new(transform: F) -> Self {
        Self {
            records: Vec::new(),
            pending: Record::new(),
            transform,
        }
    }

    /// Records collected so far, in table order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl<F: FnMut(Record) -> Option<Record>> FromRecords for Collect<F> {
    fn add_record(&mut self) -> Option<&mut dyn FromRecord> {
        self.pending = Record::new();
        Some(&mut self.pending)
    }

    fn end_record(&mut self) {
        let record = mem::take(&mut self.pending);
        if let Some(record) = (self.transform)(record) {
            self.records.push(record);
        }
    }
}
