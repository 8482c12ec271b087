use std::io::ErrorKind;

use thiserror::Error;

/// Errors returned when parsing a fat archive or selecting one of its slices.
///
/// None of them are recoverable by retrying: parsing is a deterministic
/// function of the input bytes.
#[derive(Debug, Error)]
pub enum Error {
    /// The buffer ends before a field that has to be read.
    #[error("unexpected end of data: field at offset {offset} does not fit in {len} byte(s)")]
    Truncated {
        /// Offset of the field that could not be read.
        offset: usize,
        /// Total length of the buffer.
        len: usize,
    },

    /// The buffer does not start with the fat magic number.
    ///
    /// The data may still be valid in a different format, e.g. a thin Mach-O file.
    #[error("not a fat archive: magic {magic:#010x}")]
    NotFat {
        /// The magic number that was found instead.
        magic: u32,
    },

    /// A slice descriptor points outside of the buffer.
    #[error("slice {index} at offset {offset} with size {size} exceeds archive length {len}")]
    SliceOutOfBounds {
        /// Index of the descriptor in the table.
        index: u32,
        /// Offset of the slice.
        offset: u32,
        /// Size of the slice.
        size: u32,
        /// Total length of the buffer.
        len: usize,
    },

    /// No slice has the requested CPU type.
    #[error("no slice for cputype {cpu_type:#x}")]
    NoMatchingArch {
        /// The CPU type that was looked up.
        cpu_type: u32,
    },

    /// Architecture name is not known.
    #[error("unknown arch: {0}")]
    UnknownArch(String),

    /// Reading the archive from a reader failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<Error> for std::io::Error {
    fn from(other: Error) -> Self {
        let kind = match other {
            Error::Io(e) => return e,
            Error::Truncated { .. } => ErrorKind::UnexpectedEof,
            Error::NotFat { .. } | Error::UnknownArch(..) => ErrorKind::InvalidInput,
            Error::SliceOutOfBounds { .. } => ErrorKind::InvalidData,
            Error::NoMatchingArch { .. } => ErrorKind::NotFound,
        };
        std::io::Error::new(kind, other)
    }
}

/// Result type used by this crate.
pub type Result<T> = std::result::Result<T, Error>;
