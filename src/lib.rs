#![no_std]

//! An efficient decoder for dBASE III table (`.dbf`) files.
//!
//! Dredge reads the header, field descriptors, and records of a table into
//! typed values, and exposes its underlying finite-state machine for
//! applications needing finer control over internals.
//!
//! Most users should begin with [`parse`], [`field_info`], and [`header_info`],
//! or the decoders and derive macro in the [`avec`] module. If these prove
//! insufficient, consider implementing a decoder as described in the [`sans`]
//! module.
//!
//! Memo field contents live in a separate file, which is never read. Memo
//! fields always decode to [`Value::Absent`].
//!
//! ## Cargo Features
//!
//! The following crate feature flags are available:
//!
//! - `derive`: enable derive macros (default).
//! - `std`: enable reader-based decoder (default).

extern crate alloc;

pub mod avec;
pub mod sans;

pub use avec::{HeaderInfo, Record, field_info, header_info, parse, parse_with};
pub use rust_decimal::Decimal;
pub use sans::{
    field::{FieldDescriptor, FieldType},
    header::Header,
    value::Value,
    version::Version,
};
