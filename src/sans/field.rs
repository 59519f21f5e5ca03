//! States processing the field descriptor table.

use alloc::string::String;

use either::Either::{self, Left, Right};
use thiserror::Error;
use tracing::debug;
use zerocopy::FromBytes;

use super::record::{End, RecordBody, RecordSlot, Status};

/// Byte ending the field descriptor table.
pub const TERMINATOR: u8 = 0x0D;

/// Size of a single field descriptor.
pub const DESCRIPTOR_SIZE: usize = 32;

/// The declared type of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// `C`
    Character,
    /// `D`
    Date,
    /// `N`
    Numeric,
    /// `M`
    Memo,
    /// Any tag outside the dBASE III set, such as `L` or `F`.
    Other(u8),
}

impl FieldType {
    /// The single-character tag stored in the descriptor.
    pub fn tag(self) -> u8 {
        match self {
            FieldType::Character => b'C',
            FieldType::Date => b'D',
            FieldType::Numeric => b'N',
            FieldType::Memo => b'M',
            FieldType::Other(tag) => tag,
        }
    }
}

impl From<u8> for FieldType {
    fn from(tag: u8) -> Self {
        match tag {
            b'C' => FieldType::Character,
            b'D' => FieldType::Date,
            b'N' => FieldType::Numeric,
            b'M' => FieldType::Memo,
            tag => FieldType::Other(tag),
        }
    }
}

/// A decoded field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    /// Name up to the first null byte.
    pub name: String,
    pub kind: FieldType,
    /// Width of the field within a record, in bytes.
    pub length: u8,
    pub decimal_count: u8,
}

/// An error advancing over the field descriptor table.
#[derive(Debug, Error)]
pub enum FieldTableError {
    /// Field widths do not add up to the record size.
    #[error("Declared record size ({declared}) does not match the field table ({computed}).")]
    RecordSizeMismatch { declared: u16, computed: usize },
}

/// State token to decode the next entry of the field descriptor table.
#[derive(Debug)]
pub struct FieldTable {
    pub(super) record_count: u32,
    pub(super) record_size: u16,
    pub(super) header_size: u16,
    /// Bytes of the document consumed so far.
    pub(super) offset: usize,
    /// Sum of field lengths so far.
    pub(super) width: usize,
}

impl FieldTable {
    /// Transition to another state by decoding the first byte of a field
    /// descriptor, or the table terminator.
    ///
    /// Returns a successor state token. After the terminator, this is the
    /// padding state, or the end state for a table without records.
    pub fn advance(
        self,
        r: [u8; 1],
    ) -> Result<Either<FieldEntry, Either<Padding, End>>, FieldTableError> {
        let r = r[0];

        if r != TERMINATOR {
            return Ok(Left(FieldEntry {
                first: r,
                table: self,
            }));
        }

        let computed = self.width + 1; // Deletion marker.
        if computed != self.record_size as usize {
            Err(FieldTableError::RecordSizeMismatch {
                declared: self.record_size,
                computed,
            })?;
        }

        let successor = match RecordSlot::start(self.record_count, self.width) {
            Left(slot) => Left(Padding {
                slot,
                offset: self.offset + 1,
                header_size: self.header_size,
            }),
            Right(end) => Right(end),
        };

        Ok(Right(successor))
    }
}

/// State token to decode the remainder of a field descriptor.
#[derive(Debug)]
pub struct FieldEntry {
    first: u8,
    table: FieldTable,
}

impl FieldEntry {
    /// Transition to another state by decoding the remaining bytes of a field
    /// descriptor.
    ///
    /// Returns the field descriptor, and a successor state token.
    pub fn advance(self, r: [u8; DESCRIPTOR_SIZE - 1]) -> (FieldDescriptor, FieldTable) {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawDescriptor {
            name: [u8; 11],
            kind: u8,
            _address: [u8; 4],
            length: u8,
            decimal_count: u8,
            _reserved: [u8; 14],
        }

        let mut bytes = [0; DESCRIPTOR_SIZE];
        bytes[0] = self.first;
        bytes[1..].copy_from_slice(&r);

        let RawDescriptor {
            name,
            kind,
            length,
            decimal_count,
            ..
        } = zerocopy::transmute!(bytes);

        let end = name.iter().position(|&b| b == 0).unwrap_or(name.len());

        let descriptor = FieldDescriptor {
            name: String::from_utf8_lossy(&name[..end]).into_owned(),
            kind: FieldType::from(kind),
            length,
            decimal_count,
        };

        if let FieldType::Other(tag) = descriptor.kind {
            debug!(
                field = %descriptor.name,
                tag = %char::from(tag),
                "field type outside the dBASE III set, values pass through as text"
            );
        }

        let successor = FieldTable {
            offset: self.table.offset + DESCRIPTOR_SIZE,
            width: self.table.width + length as usize,
            ..self.table
        };

        (descriptor, successor)
    }
}

/// State token to decode the byte following the table terminator.
///
/// Some writers place a single null byte after the terminator, others begin
/// record data immediately.
#[derive(Debug)]
pub struct Padding {
    slot: RecordSlot,
    offset: usize,
    header_size: u16,
}

impl Padding {
    /// Transition to another state by decoding the byte following the table
    /// terminator.
    ///
    /// Returns the first record slot if the byte was padding. Otherwise, the
    /// byte is the first record's deletion marker, and the result is that of
    /// advancing the first record slot with it.
    pub fn advance(
        self,
        r: [u8; 1],
    ) -> Either<RecordSlot, Either<(Status, RecordBody), End>> {
        let padded = r[0] == 0x00;
        let data_offset = if padded { self.offset + 1 } else { self.offset };

        debug!(padded, data_offset, "found end of field table");

        if data_offset != self.header_size as usize {
            debug!(
                declared = self.header_size,
                detected = data_offset,
                "record data offset disagrees with header size"
            );
        }

        if padded {
            Left(self.slot)
        } else {
            Right(self.slot.advance(r))
        }
    }
}
