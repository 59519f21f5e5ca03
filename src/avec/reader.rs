//! Reader-based decoder implementation.
//!
//! _Requires Cargo feature `std`._

use std::{
    io::{self, ErrorKind, Read},
    vec::Vec,
};

use either::Either::{Left, Right};
use thiserror::Error;
use tracing::debug;

use crate::sans::{
    Decoder,
    field::{FieldDescriptor, FieldTableError},
    header::Header,
    record::{RecordBody, RecordSlot, Status},
};

use super::{FromRecords, Projection, publish_record};

extern crate std;

/// Errors occurring while decoding from a reader.
#[derive(Debug, Error)]
pub enum Error {
    /// An error from the supplied reader.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// Reached the end of the reader within the table header.
    #[error("Reached the end of the reader within the table header.")]
    TruncatedHeader,
    /// Reached the end of the reader within the field descriptor table.
    #[error("Reached the end of the reader within the field descriptor table.")]
    TruncatedFieldTable,
    /// Reached the end of the reader within a record.
    #[error("Reached the end of the reader within record {index}.")]
    TruncatedRecord { index: u32 },
    /// Field widths do not add up to the declared record size.
    #[error("Declared record size ({declared}) does not match the field table ({computed}).")]
    RecordSizeMismatch { declared: u16, computed: usize },
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

/// Decode records from a reader of a table, publishing active records to a
/// receiver.
///
/// Only the named columns are published, or all of them if `columns` is `None`
/// or empty. Decoding stops early, without error, if the reader ends between
/// records.
///
/// Returns the table header.
///
/// This method is also re-exported as `dredge::avec::decode_reader`.
///
/// _Requires Cargo feature `std`._
pub fn decode(
    r: &mut impl Read,
    columns: Option<&[&str]>,
    o: &mut impl FromRecords,
) -> Result<Header, Error> {
    let (header, mut table) = Decoder::advance(take(r, Error::TruncatedHeader)?);

    let mut fields = Vec::new();

    let successor = loop {
        table = match table.advance(take(r, Error::TruncatedFieldTable)?)? {
            Left(state) => {
                let (field, state) = state.advance(take(r, Error::TruncatedFieldTable)?);
                fields.push(field);
                state
            }
            Right(state) => break state,
        };
    };

    let projection = Projection::new(&fields, columns);

    let Left(padding) = successor else {
        return Ok(header);
    };

    let Some(bytes) = take_marker(r)? else {
        debug!("reached the end of the reader before the first record");
        return Ok(header);
    };

    // Buffer reused for each record body.
    let mut buf = Vec::new();

    let mut slot = match padding.advance(bytes) {
        Left(slot) => slot,
        Right(Left((status, body))) => {
            match decode_record(status, body, &fields, &projection, r, &mut buf, o)? {
                Some(slot) => slot,
                None => return Ok(header),
            }
        }
        Right(Right(_)) => return Ok(header),
    };

    loop {
        let Some(bytes) = take_marker(r)? else {
            debug!(
                index = slot.index(),
                "reached the end of the reader before the declared record count"
            );
            break;
        };

        let (status, body) = match slot.advance(bytes) {
            Left(state) => state,
            Right(_) => break,
        };

        slot = match decode_record(status, body, &fields, &projection, r, &mut buf, o)? {
            Some(state) => state,
            None => break,
        };
    }

    Ok(header)
}

fn decode_record(
    status: Status,
    body: RecordBody,
    fields: &[FieldDescriptor],
    projection: &Projection,
    r: &mut impl Read,
    buf: &mut Vec<u8>,
    o: &mut impl FromRecords,
) -> Result<Option<RecordSlot>, Error> {
    let index = body.index();

    buf.resize(body.body_size(), 0);
    r.read_exact(buf)
        .map_err(|err| eof_or(err, Error::TruncatedRecord { index }))?;

    let (cells, successor) = body.advance(fields, &buf[..]);

    if status == Status::Active {
        publish_record(cells, projection, o);
    }

    Ok(successor.left())
}

/// Take an exact number of bytes from a reader, reporting the end of the reader
/// as the given error.
fn take<const N: usize>(r: &mut impl Read, truncated: Error) -> Result<[u8; N], Error> {
    let mut buf = [0; N];
    r.read_exact(&mut buf).map_err(|err| eof_or(err, truncated))?;

    Ok(buf)
}

/// Take a deletion marker from a reader, if the reader has not ended.
fn take_marker(r: &mut impl Read) -> Result<Option<[u8; 1]>, Error> {
    let mut buf = [0; 1];

    loop {
        match r.read(&mut buf) {
            Ok(0) => return Ok(None),
            Ok(_) => return Ok(Some(buf)),
            Err(err) if err.kind() == ErrorKind::Interrupted => {}
            Err(err) => Err(err)?,
        }
    }
}

fn eof_or(err: io::Error, truncated: Error) -> Error {
    if err.kind() == ErrorKind::UnexpectedEof {
        truncated
    } else {
        Error::Io(err)
    }
}
