//! Slice-based decoder implementation.

use alloc::vec::Vec;

use either::Either::{self, Left, Right};
use thiserror::Error;
use tracing::debug;

use crate::sans::{
    Decoder,
    field::{FieldDescriptor, FieldTable, FieldTableError, Padding},
    header::Header,
    record::{End, RecordBody, RecordSlot, Status},
    version::VersionError,
};

use super::{FromRecords, Projection, publish_record};

/// Errors occurring while decoding from a slice.
#[derive(Debug, Error)]
pub enum Error {
    /// Reached the end of the slice within the table header.
    #[error("Reached the end of the slice within the table header.")]
    TruncatedHeader,
    /// Reached the end of the slice within the field descriptor table.
    #[error("Reached the end of the slice within the field descriptor table.")]
    TruncatedFieldTable,
    /// Reached the end of the slice within a record.
    #[error("Reached the end of the slice within record {index}.")]
    TruncatedRecord { index: u32 },
    /// Field widths do not add up to the declared record size.
    #[error("Declared record size ({declared}) does not match the field table ({computed}).")]
    RecordSizeMismatch { declared: u16, computed: usize },
    /// Version byte outside the known set.
    #[error("Unsupported version byte ({0:#04x}).")]
    UnsupportedVersion(u8),
}

impl From<FieldTableError> for Error {
    fn from(err: FieldTableError) -> Self {
        match err {
            FieldTableError::RecordSizeMismatch { declared, computed } => {
                Self::RecordSizeMismatch { declared, computed }
            }
        }
    }
}

impl From<VersionError> for Error {
    fn from(err: VersionError) -> Self {
        match err {
            VersionError::Unsupported(code) => Self::UnsupportedVersion(code),
        }
    }
}

/// Decode records from a slice of a table, publishing active records to a
/// receiver.
///
/// Only the named columns are published, or all of them if `columns` is `None`
/// or empty. Decoding stops early, without error, if the slice ends between
/// records.
///
/// Returns the table header.
///
/// This method is also re-exported as `dredge::avec::decode_slice`.
pub fn decode(
    r: &[u8],
    columns: Option<&[&str]>,
    o: &mut impl FromRecords,
) -> Result<Header, Error> {
    let i = &mut 0; // Counter of bytes read, used to read bytes from the tip.

    let (header, fields, successor) = decode_table(r, i)?;
    let projection = Projection::new(&fields, columns);

    let Left(padding) = successor else {
        return Ok(header);
    };

    let Some(bytes) = take(r, i) else {
        debug!("reached the end of the slice before the first record");
        return Ok(header);
    };

    let mut slot = match padding.advance(bytes) {
        Left(slot) => slot,
        Right(Left((status, body))) => {
            match decode_record(status, body, &fields, &projection, r, i, o)? {
                Left(slot) => slot,
                Right(_) => return Ok(header),
            }
        }
        Right(Right(_)) => return Ok(header),
    };

    loop {
        let Some(bytes) = take(r, i) else {
            debug!(
                index = slot.index(),
                "reached the end of the slice before the declared record count"
            );
            break;
        };

        let (status, body) = match slot.advance(bytes) {
            Left(state) => state,
            Right(_) => break,
        };

        slot = match decode_record(status, body, &fields, &projection, r, i, o)? {
            Left(state) => state,
            Right(_) => break,
        };
    }

    Ok(header)
}

/// Decode the table header.
pub(crate) fn decode_header(r: &[u8], i: &mut usize) -> Result<(Header, FieldTable), Error> {
    Ok(Decoder::advance(take(r, i).ok_or(Error::TruncatedHeader)?))
}

/// Decode the table header and field descriptor table.
pub(crate) fn decode_table(
    r: &[u8],
    i: &mut usize,
) -> Result<(Header, Vec<FieldDescriptor>, Either<Padding, End>), Error> {
    let (header, mut table) = decode_header(r, i)?;
    let mut fields = Vec::new();

    let successor = loop {
        table = match table.advance(take(r, i).ok_or(Error::TruncatedFieldTable)?)? {
            Left(state) => {
                let bytes = take(r, i).ok_or(Error::TruncatedFieldTable)?;
                let (field, state) = state.advance(bytes);
                fields.push(field);
                state
            }
            Right(state) => break state,
        };
    };

    Ok((header, fields, successor))
}

fn decode_record(
    status: Status,
    body: RecordBody,
    fields: &[FieldDescriptor],
    projection: &Projection,
    r: &[u8],
    i: &mut usize,
    o: &mut impl FromRecords,
) -> Result<Either<RecordSlot, End>, Error> {
    let index = body.index();
    let bytes = take_slice(r, i, body.body_size()).ok_or(Error::TruncatedRecord { index })?;

    let (cells, successor) = body.advance(fields, bytes);

    if status == Status::Active {
        publish_record(cells, projection, o);
    }

    Ok(successor)
}

/// Take an exact number of bytes from an offset in a slice, advancing the offset.
fn take<const N: usize>(r: &[u8], i: &mut usize) -> Option<[u8; N]> {
    let bytes: [u8; N] = r.get(*i..*i + N)?.try_into().ok()?;
    *i += N;

    Some(bytes)
}

/// Take a run of bytes from an offset in a slice, advancing the offset.
fn take_slice<'a>(r: &'a [u8], i: &mut usize, n: usize) -> Option<&'a [u8]> {
    let bytes = r.get(*i..*i + n)?;
    *i += n;

    Some(bytes)
}
