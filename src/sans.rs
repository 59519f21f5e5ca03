//! Internal finite-state machine for implementing decoders.
//!
//! This module is intended for applications that need fine control over
//! decoder internals, such as reading from an unusual byte source. See
//! [`crate::avec`] for implementations covering common decoding patterns.
//!
//! # Architecture
//!
//! All states are represented by a non-copy token. Once enough bytes are
//! ready, transition to another state by calling the token's `advance` method.
//! This will return a successor state token, along with any extracted data.
//!
//! A table is laid out as a fixed 32-byte header, a field descriptor table
//! ended by a terminator byte (sometimes followed by a single null byte), and
//! a run of fixed-size records. The states follow that layout:
//!
//! 1. [`Decoder`] takes the header.
//! 2. [`field::FieldTable`] takes one byte at a time, either the first byte of
//!    a descriptor ([`field::FieldEntry`] then takes the remaining 31) or the
//!    terminator.
//! 3. [`field::Padding`] takes the byte after the terminator. If it is not
//!    padding, it is the deletion marker of the first record.
//! 4. [`record::RecordSlot`] takes a deletion marker, and
//!    [`record::RecordBody`] walks the fields of the record body.
//!
//! Only the initial state, re-exported for convenience as [`Decoder`], can be
//! constructed.
//!
//! Some areas of the decoding process are not represented in the finite-state
//! machine and must be carefully written:
//!
//! - Reading bytes from the correct place in the document, including buffering
//! as necessary.
//!
//! - Keeping the decoded field descriptors, which are needed to walk each
//! record body.
//!
//! - Stopping when the byte source runs out before the declared number of
//! records has been read.
//!
//! Implementers are recommended to begin by studying and modifying a decoder
//! from the [`crate::avec`] module.

pub mod field;
pub mod header;
pub mod record;
pub mod value;
pub mod version;

/// Entrypoint to the finite-state machine.
pub type Decoder = header::TableHeader;
