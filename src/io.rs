use std::io::Read;

use crate::Error;

/// Read binary values in big-endian order.
pub trait BigEndianRead {
    /// Size of the encoded value in bytes.
    const LEN: usize;

    /// Read `Self` from `reader` using big-endian byte order.
    fn read_be<R: Read>(reader: R) -> Result<Self, std::io::Error>
    where
        Self: Sized;

    /// Read `Self` from `data` at byte offset `offset`.
    ///
    /// Fails with [`Error::Truncated`] when `data` ends before `offset + Self::LEN`.
    fn read_be_at(data: &[u8], offset: usize) -> Result<Self, Error>
    where
        Self: Sized,
    {
        let truncated = || Error::Truncated {
            offset,
            len: data.len(),
        };
        let end = offset.checked_add(Self::LEN).ok_or_else(truncated)?;
        let bytes = data.get(offset..end).ok_or_else(truncated)?;
        Self::read_be(bytes).map_err(|_| truncated())
    }
}

impl BigEndianRead for u32 {
    const LEN: usize = 4;

    fn read_be<R: Read>(mut reader: R) -> Result<Self, std::io::Error> {
        let mut data = [0_u8; 4];
        reader.read_exact(&mut data[..])?;
        Ok(u32::from_be_bytes(data))
    }
}
