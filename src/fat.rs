use std::io::Read;

use log::trace;

use crate::cpu::CpuId;
use crate::cpu::HOST_CPU_TYPE;
use crate::BigEndianRead;
use crate::Error;

/// Fat (universal) binary.
///
/// Immutable list of architecture-specific slices in the order they appear
/// in the descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FatArchive {
    slices: Vec<ArchiveSlice>,
}

impl FatArchive {
    /// Parse fat archive from `data`.
    ///
    /// Either every descriptor is decoded and every slice is in bounds, or an
    /// error is returned and nothing else.
    pub fn parse(data: &[u8]) -> Result<Self, Error> {
        if data.len() < HEADER_LEN {
            return Err(Error::Truncated {
                offset: 0,
                len: data.len(),
            });
        }
        let magic = u32::read_be_at(data, 0)?;
        if magic != MAGIC {
            return Err(Error::NotFat { magic });
        }
        let num_arches = u32::read_be_at(data, 4)?;
        // Never allocate more than the buffer can describe.
        let max_arches = (data.len() - HEADER_LEN) / FAT_ARCH_LEN;
        let mut slices = Vec::with_capacity(max_arches.min(num_arches as usize));
        for i in 0..num_arches {
            let offset = (i as usize)
                .checked_mul(FAT_ARCH_LEN)
                .and_then(|n| n.checked_add(HEADER_LEN))
                .ok_or(Error::Truncated {
                    offset: usize::MAX,
                    len: data.len(),
                })?;
            let arch = FatArch::read_be_at(data, offset)?;
            slices.push(arch.to_slice(i, data)?);
        }
        Ok(Self { slices })
    }

    /// Read the whole `reader` and parse its contents as a fat archive.
    pub fn read<R: Read>(mut reader: R) -> Result<Self, Error> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::parse(&data[..])
    }

    /// Find the first slice with `cpu_type` equal to `target_cpu_type`.
    ///
    /// Only exact matches count: [`CPU_TYPE_ANY`](crate::cpu::CPU_TYPE_ANY) is
    /// not a wildcard, and subtypes are ignored.
    pub fn select_best_arch(&self, target_cpu_type: u32) -> Result<&ArchiveSlice, Error> {
        self.position_best_arch(target_cpu_type)
            .map(|(_, slice)| slice)
    }

    /// Same as [`select_best_arch`](Self::select_best_arch) but also returns
    /// the index of the slice in the descriptor table.
    pub fn position_best_arch(
        &self,
        target_cpu_type: u32,
    ) -> Result<(usize, &ArchiveSlice), Error> {
        self.slices
            .iter()
            .enumerate()
            .find(|(_, slice)| slice.cpu_type == target_cpu_type)
            .ok_or(Error::NoMatchingArch {
                cpu_type: target_cpu_type,
            })
    }

    /// Find the slice for the architecture this crate was compiled for.
    pub fn best_arch(&self) -> Result<&ArchiveSlice, Error> {
        self.select_best_arch(HOST_CPU_TYPE)
    }

    /// Slices in descriptor table order.
    pub fn slices(&self) -> &[ArchiveSlice] {
        &self.slices[..]
    }

    /// Iterate over slices in descriptor table order.
    pub fn iter(&self) -> std::slice::Iter<'_, ArchiveSlice> {
        self.slices.iter()
    }

    /// No. of slices.
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    /// Returns `true` if the archive has no slices.
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Take ownership of the slices.
    pub fn into_slices(self) -> Vec<ArchiveSlice> {
        self.slices
    }
}

impl TryFrom<&[u8]> for FatArchive {
    type Error = Error;

    fn try_from(data: &[u8]) -> Result<Self, Self::Error> {
        Self::parse(data)
    }
}

impl<'a> IntoIterator for &'a FatArchive {
    type Item = &'a ArchiveSlice;
    type IntoIter = std::slice::Iter<'a, ArchiveSlice>;

    fn into_iter(self) -> Self::IntoIter {
        self.slices.iter()
    }
}

/// Architecture-specific slice of a fat archive.
///
/// Owns a copy of the slice bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveSlice {
    cpu_type: u32,
    cpu_sub_type: u32,
    offset: u32,
    data: Vec<u8>,
}

impl ArchiveSlice {
    /// CPU type, optionally with ABI flags.
    pub fn cpu_type(&self) -> u32 {
        self.cpu_type
    }

    /// CPU subtype.
    pub fn cpu_sub_type(&self) -> u32 {
        self.cpu_sub_type
    }

    /// CPU type and subtype.
    pub fn cpu_id(&self) -> CpuId {
        CpuId::new(self.cpu_type, self.cpu_sub_type)
    }

    /// Offset of the slice from the start of the archive.
    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Size of the slice in bytes.
    pub fn size(&self) -> u32 {
        // Bounded by the `u32` size field of the descriptor.
        self.data.len() as u32
    }

    /// Slice contents.
    pub fn data(&self) -> &[u8] {
        &self.data[..]
    }

    /// Take ownership of the slice contents.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}

/// Slice descriptor as stored in the table.
struct FatArch {
    cpu_type: u32,
    cpu_sub_type: u32,
    offset: u32,
    size: u32,
}

impl FatArch {
    fn read_be_at(data: &[u8], offset: usize) -> Result<Self, Error> {
        let cpu_type = u32::read_be_at(data, offset)?;
        let cpu_sub_type = u32::read_be_at(data, offset.saturating_add(4))?;
        let slice_offset = u32::read_be_at(data, offset.saturating_add(8))?;
        let size = u32::read_be_at(data, offset.saturating_add(12))?;
        Ok(Self {
            cpu_type,
            cpu_sub_type,
            offset: slice_offset,
            size,
        })
    }

    fn to_slice(&self, index: u32, data: &[u8]) -> Result<ArchiveSlice, Error> {
        let start = self.offset as u64;
        let end = start + self.size as u64;
        if end > data.len() as u64 {
            return Err(Error::SliceOutOfBounds {
                index,
                offset: self.offset,
                size: self.size,
                len: data.len(),
            });
        }
        trace!(
            "slice {}: cputype {:#x} subtype {:#x} offset {} size {}",
            index,
            self.cpu_type,
            self.cpu_sub_type,
            self.offset,
            self.size
        );
        Ok(ArchiveSlice {
            cpu_type: self.cpu_type,
            cpu_sub_type: self.cpu_sub_type,
            offset: self.offset,
            data: data[start as usize..end as usize].to_vec(),
        })
    }
}

/// Returns `true` if `data` starts with the fat magic number.
pub fn is_fat(data: &[u8]) -> bool {
    matches!(u32::read_be_at(data, 0), Ok(MAGIC))
}

/// Fat magic number.
pub const MAGIC: u32 = 0xcafebabe;
pub(crate) const HEADER_LEN: usize = 8;
/// `cpu_type`, `cpu_sub_type`, `offset` and `size` followed by the alignment word.
pub(crate) const FAT_ARCH_LEN: usize = 4 * 4 + FAT_ARCH_ALIGN_LEN;
/// Trailing `align` field of a descriptor. It is never read.
pub(crate) const FAT_ARCH_ALIGN_LEN: usize = 4;
