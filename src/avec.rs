//! Convenience interfaces for common decoding patterns.
//!
//! The functions in this module are suited to decoding records from files and
//! data slices, publishing to the [`FromRecords`] and [`FromRecord`] traits.
//!
//! For most applications, [`parse`] and [`parse_with`] are the simplest entry
//! points, collecting each active record into a [`Record`]. When records are of
//! a known shape, the [`FromRecord`](macro@FromRecord) derive macro decodes
//! directly into a struct instead.

#[cfg(feature = "std")]
pub mod reader;
pub mod record;
pub mod slice;

use alloc::vec::Vec;

use rust_decimal::Decimal;

use crate::sans::{
    field::FieldDescriptor,
    header::Header,
    record::Cells,
    value::{Value, coerce},
    version::Version,
};

#[cfg(feature = "std")]
pub use reader::decode as decode_reader;
pub use record::{Collect, Record};
pub use slice::decode as decode_slice;

/// Produce record receivers for a table.
///
/// Implemented for any `Vec<T>` of default-constructible records.
pub trait FromRecords {
    /// Retrieve a receiver for the next active record, if one is wanted.
    fn add_record(&mut self) -> Option<&mut dyn FromRecord>;

    /// Finish the record most recently retrieved with
    /// [`FromRecords::add_record`], once all of its fields are published.
    fn end_record(&mut self) {}
}

impl<T: FromRecord + Default> FromRecords for Vec<T> {
    fn add_record(&mut self) -> Option<&mut dyn FromRecord> {
        self.push(T::default());
        self.last_mut().map(|r| r as _)
    }
}

/// Derive [`FromRecord`] for a struct representing a single record.
///
/// _Requires Cargo feature `derive`._
///
/// # Examples
///
/// To receive a value for a table field, add the `field("NAME")` attribute to
/// an `Option<T>` struct field, where `NAME` is the field name and `T` is one of
/// `String` (character and date fields), `i128` (numeric fields without decimal
/// places), or `Decimal` (numeric fields with decimal places).
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Customer {
///     #[field("NAME")]
///     name: Option<String>,
///     #[field("BORN")]
///     born: Option<String>,
///     #[field("BALANCE")]
///     balance: Option<Decimal>,
/// }
/// ```
///
/// To receive into arbitrary types, supply an accumulator closure. Since the
/// value type cannot be inferred, the second argument must be typed.
///
/// ```
/// #[derive(Debug, Default, FromRecord)]
/// struct Customer {
///     #[field("NAME", |v, s: &str| v.extend_from_slice(s.as_bytes()))]
///     name: ArrayVec<[u8; 16]>,
/// }
/// ```
#[cfg(feature = "derive")]
pub use dredge_derive::FromRecord;

/// Receive field values for a record.
///
/// Fields are published in table order, skipping those excluded by the column
/// projection. The default implementation of each method ignores received
/// values.
///
/// See the [`FromRecord`](macro@FromRecord) derive macro for an automatic
/// implementation of this trait.
#[allow(unused_variables)]
pub trait FromRecord {
    /// Add the contents of a character field to the record.
    ///
    /// This also receives fields of types outside the dBASE III set.
    fn add_text(&mut self, field: &str, _: &str) {}
    /// Add the contents of a date field to the record, as stored.
    fn add_date(&mut self, field: &str, _: &str) {}
    /// Add a numeric field without decimal places to the record.
    fn add_integer(&mut self, field: &str, _: i128) {}
    /// Add a numeric field with decimal places to the record.
    fn add_decimal(&mut self, field: &str, _: Decimal) {}
    /// Add a field without a value, such as a memo field, to the record.
    fn add_absent(&mut self, field: &str) {}
}

/// Publish a value to a record receiver.
pub(crate) fn publish(o: &mut dyn FromRecord, field: &str, value: Value) {
    match value {
        Value::Text(s) => o.add_text(field, &s),
        Value::RawDateText(s) => o.add_date(field, &s),
        Value::Integer(n) => o.add_integer(field, n),
        Value::Decimal(d) => o.add_decimal(field, d),
        Value::Absent => o.add_absent(field),
    }
}

/// Publish the selected fields of an active record to a receiver.
pub(crate) fn publish_record(cells: Cells<'_>, projection: &Projection, o: &mut impl FromRecords) {
    let Some(record) = o.add_record() else {
        return;
    };

    for (position, (field, r)) in cells.enumerate() {
        // Fields outside the projection are never coerced.
        if projection.includes(position) {
            publish(record, &field.name, coerce(field, r));
        }
    }

    o.end_record();
}

/// Mask of the fields selected for decoding.
pub(crate) struct Projection(Vec<bool>);

impl Projection {
    /// Select the named columns, or all of them if none are named.
    pub(crate) fn new(fields: &[FieldDescriptor], columns: Option<&[&str]>) -> Self {
        let mask = match columns {
            Some(columns) if !columns.is_empty() => fields
                .iter()
                .map(|f| columns.contains(&f.name.as_str()))
                .collect(),
            _ => fields.iter().map(|_| true).collect(),
        };

        Self(mask)
    }

    pub(crate) fn includes(&self, position: usize) -> bool {
        self.0.get(position).copied().unwrap_or(false)
    }
}

/// A table header with its version resolved to a label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderInfo {
    pub version: &'static str,
    pub header: Header,
}

/// Decode every active record of a table.
pub fn parse(r: &[u8]) -> Result<Vec<Record>, slice::Error> {
    parse_with(r, None, Some)
}

/// Decode the active records of a table, keeping only the named columns (all,
/// if `None` or empty) and passing each record through a transform.
///
/// Records for which the transform returns `None` are left out.
pub fn parse_with<F>(
    r: &[u8],
    columns: Option<&[&str]>,
    transform: F,
) -> Result<Vec<Record>, slice::Error>
where
    F: FnMut(Record) -> Option<Record>,
{
    let mut records = Collect::new(transform);
    slice::decode(r, columns, &mut records)?;
    Ok(records.into_records())
}

/// Decode the field descriptors of a table.
pub fn field_info(r: &[u8]) -> Result<Vec<FieldDescriptor>, slice::Error> {
    let (_, fields, _) = slice::decode_table(r, &mut 0)?;
    Ok(fields)
}

/// Decode the header of a table, resolving its version label.
pub fn header_info(r: &[u8]) -> Result<HeaderInfo, slice::Error> {
    let (header, _) = slice::decode_header(r, &mut 0)?;
    let version = Version::label(header.version)?;
    Ok(HeaderInfo { version, header })
}
