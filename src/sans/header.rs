//! States processing the table header.

use zerocopy::FromBytes;

use super::{field::FieldTable, version::Version};

/// Size of the fixed table header.
pub const HEADER_SIZE: usize = 32;

/// A decoded table header.
///
/// Flags and the last-update date are kept as raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    pub version: Version,
    /// Year since 1900, month, and day, as stored.
    pub last_update: [u8; 3],
    pub record_count: u32,
    pub header_size: u16,
    pub record_size: u16,
    pub incomplete_transaction: u8,
    pub encryption: u8,
    pub multi_user: [u8; 12],
    pub mdx: u8,
    pub language_driver: u8,
}

/// State token to decode a table header.
#[derive(Debug)]
pub struct TableHeader;

impl TableHeader {
    /// Transition to another state by decoding a table header.
    ///
    /// Returns the header, and a successor state token.
    pub fn advance(r: [u8; HEADER_SIZE]) -> (Header, FieldTable) {
        #[repr(C, packed)]
        #[derive(FromBytes)]
        struct RawHeader {
            version: u8,
            last_update: [u8; 3],
            record_count: [u8; 4],
            header_size: [u8; 2],
            record_size: [u8; 2],
            _reserved: [u8; 2],
            incomplete_transaction: u8,
            encryption: u8,
            multi_user: [u8; 12],
            mdx: u8,
            language_driver: u8,
            _reserved_tail: [u8; 2],
        }

        let RawHeader {
            version,
            last_update,
            record_count,
            header_size,
            record_size,
            incomplete_transaction,
            encryption,
            multi_user,
            mdx,
            language_driver,
            ..
        } = zerocopy::transmute!(r);

        let header = Header {
            version: Version(version),
            last_update,
            record_count: u32::from_le_bytes(record_count),
            header_size: u16::from_le_bytes(header_size),
            record_size: u16::from_le_bytes(record_size),
            incomplete_transaction,
            encryption,
            multi_user,
            mdx,
            language_driver,
        };

        let successor = FieldTable {
            record_count: header.record_count,
            record_size: header.record_size,
            header_size: header.header_size,
            offset: HEADER_SIZE,
            width: 0,
        };

        (header, successor)
    }
}
