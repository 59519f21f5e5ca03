//! States processing records.

use core::slice;

use either::Either::{self, Left, Right};
use tracing::{debug, trace};

use super::field::FieldDescriptor;

/// Deletion marker of an active record.
pub const ACTIVE: u8 = b' ';

/// Marker some writers place after the last record.
pub const END_OF_FILE: u8 = 0x1A;

/// Whether a record slot holds an active or a deleted record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Active,
    Deleted,
}

/// State token marking the end of the table.
#[derive(Debug)]
pub struct End(pub(super) ());

/// State token to decode the deletion marker of a record.
#[derive(Debug)]
pub struct RecordSlot {
    index: u32,
    remaining: u32,
    body_size: usize,
}

impl RecordSlot {
    pub(super) fn start(record_count: u32, body_size: usize) -> Either<Self, End> {
        if record_count != 0 {
            Left(Self {
                index: 0,
                remaining: record_count,
                body_size,
            })
        } else {
            Right(End(()))
        }
    }

    /// Position of this slot among the declared records.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Transition to another state by decoding a deletion marker.
    ///
    /// Returns the record status and a successor state token, or the end state
    /// if the byte is an end-of-file marker.
    pub fn advance(self, r: [u8; 1]) -> Either<(Status, RecordBody), End> {
        let r = r[0];

        if r == END_OF_FILE {
            debug!(
                index = self.index,
                remaining = self.remaining,
                "found end-of-file marker before the declared record count"
            );
            return Right(End(()));
        }

        let status = if r == ACTIVE {
            Status::Active
        } else {
            trace!(index = self.index, marker = r, "skipping deleted record");
            Status::Deleted
        };

        let successor = RecordBody {
            index: self.index,
            remaining: self.remaining - 1,
            body_size: self.body_size,
        };

        Left((status, successor))
    }
}

/// State token to decode the body of a record.
#[derive(Debug)]
pub struct RecordBody {
    index: u32,
    remaining: u32,
    body_size: usize,
}

impl RecordBody {
    /// Number of bytes expected by [`RecordBody::advance`].
    pub fn body_size(&self) -> usize {
        self.body_size
    }

    /// Position of this record among the declared records.
    pub fn index(&self) -> u32 {
        self.index
    }

    /// Transition to another state by walking the body of a record.
    ///
    /// `r` must hold exactly [`RecordBody::body_size`] bytes, and `fields` must be the
    /// descriptors decoded from this table, in order.
    ///
    /// Returns an iterator over each field and its bytes with surrounding
    /// whitespace trimmed, and a successor state token.
    pub fn advance<'a>(
        self,
        fields: &'a [FieldDescriptor],
        r: &'a [u8],
    ) -> (Cells<'a>, Either<RecordSlot, End>) {
        debug_assert_eq!(r.len(), self.body_size);

        let cells = Cells {
            fields: fields.iter(),
            r,
        };

        let successor = if self.remaining != 0 {
            Left(RecordSlot {
                index: self.index + 1,
                remaining: self.remaining,
                body_size: self.body_size,
            })
        } else {
            Right(End(()))
        };

        (cells, successor)
    }
}

/// Fields of a record paired with their trimmed bytes.
#[derive(Debug, Clone)]
pub struct Cells<'a> {
    fields: slice::Iter<'a, FieldDescriptor>,
    r: &'a [u8],
}

impl<'a> Iterator for Cells<'a> {
    type Item = (&'a FieldDescriptor, &'a [u8]);

    fn next(&mut self) -> Option<Self::Item> {
        let field = self.fields.next()?;
        let (cell, rest) = self.r.split_at_checked(field.length as usize)?;
        self.r = rest;

        Some((field, cell.trim_ascii()))
    }
}
