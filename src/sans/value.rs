//! Coercion of field bytes into typed values.

use alloc::string::String;
use core::{fmt, str::FromStr};

use rust_decimal::Decimal;
use tracing::warn;

use super::field::{FieldDescriptor, FieldType};

/// A typed field value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Contents of a character field.
    Text(String),
    /// Contents of a date field, as stored (`YYYYMMDD`).
    RawDateText(String),
    /// Contents of a numeric field without decimal places.
    Integer(i128),
    /// Contents of a numeric field with decimal places.
    Decimal(Decimal),
    /// No value. Memo fields always decode to this.
    Absent,
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) | Value::RawDateText(s) => f.write_str(s),
            Value::Integer(n) => write!(f, "{n}"),
            Value::Decimal(d) => write!(f, "{d}"),
            Value::Absent => Ok(()),
        }
    }
}

/// Convert the trimmed bytes of a field to a value of its declared type.
///
/// Malformed numeric fields decode to zero rather than failing, as they are
/// common in real tables.
pub fn coerce(field: &FieldDescriptor, r: &[u8]) -> Value {
    match field.kind {
        FieldType::Character | FieldType::Other(_) => Value::Text(text(r)),
        FieldType::Date => Value::RawDateText(text(r)),
        FieldType::Memo => Value::Absent,
        FieldType::Numeric if field.decimal_count == 0 => Value::Integer(integer(field, r)),
        FieldType::Numeric => Value::Decimal(decimal(field, r)),
    }
}

fn text(r: &[u8]) -> String {
    String::from_utf8_lossy(r).into_owned()
}

fn integer(field: &FieldDescriptor, r: &[u8]) -> i128 {
    if r.is_empty() {
        return 0;
    }

    parse(r).unwrap_or_else(|| {
        fallback(field, r);
        0
    })
}

fn decimal(field: &FieldDescriptor, r: &[u8]) -> Decimal {
    let zero = || {
        let mut zero = Decimal::ZERO;
        zero.rescale(field.decimal_count.into());
        zero
    };

    if r.is_empty() {
        return zero();
    }

    parse(r).unwrap_or_else(|| {
        fallback(field, r);
        zero()
    })
}

/// Parse a numeric field. Digit separators are not part of the format.
fn parse<T: FromStr>(r: &[u8]) -> Option<T> {
    if r.contains(&b'_') {
        return None;
    }

    core::str::from_utf8(r).ok()?.parse().ok()
}

fn fallback(field: &FieldDescriptor, r: &[u8]) {
    warn!(
        field = %field.name,
        raw = %String::from_utf8_lossy(r),
        "malformed numeric field, substituting zero"
    );
}
