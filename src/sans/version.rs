//! Descriptive labels for table version bytes.

use tartan_bitfield::bitfield;
use thiserror::Error;

/// An error resolving a version byte.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Version byte outside the known set.
    #[error("Unsupported version byte ({0:#04x}).")]
    Unsupported(u8),
}

/// The version byte opening a table header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version(pub u8);

impl Version {
    /// Resolve the version byte to a descriptive label.
    pub fn label(self) -> Result<&'static str, VersionError> {
        Ok(match self.0 {
            0x02 => "FoxBase",
            0x03 => "FoxBase 2.x / dBASE III",
            0x04 => "dBASE IV",
            0x05 => "dBASE V",
            0x30 => "Visual FoxPro",
            0x31 => "Visual FoxPro, autoincrement enabled",
            0x32 => "Visual FoxPro, varchar or varbinary",
            0x43 => "dBASE IV SQL table, no memo",
            0x63 => "dBASE IV SQL system, no memo",
            0x83 => "FoxBase 2.x / dBASE III with memo file",
            0x8B => "dBASE IV with memo file",
            0xCB => "dBASE IV SQL table with memo file",
            0xF5 => "FoxPro 2.x with memo file",
            0xFB => "FoxPro 2.x",
            code => Err(VersionError::Unsupported(code))?,
        })
    }

    /// Whether the version byte announces a companion memo file.
    ///
    /// The memo file itself is never read.
    pub fn has_memo_file(self) -> bool {
        bitfield! {
            struct VersionBits(u8) {
                [7] has_memo_file,
            }
        }

        VersionBits(self.0).has_memo_file()
    }
}

impl From<u8> for Version {
    fn from(code: u8) -> Self {
        Self(code)
    }
}
