use std::ops::Range;

use crate::TransferError;

/// How a file of a given size is transferred.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// One request carrying the whole payload.
    Single,
    /// `init` → sequential parts → `complete`.
    Multipart,
}

impl Strategy {
    /// Picks the transfer strategy for `size` bytes.
    ///
    /// The boundary is inclusive on the small side: a file of exactly
    /// `multipart_threshold` bytes goes out in one request.
    pub fn select(size: u64, multipart_threshold: u64) -> Self {
        if size <= multipart_threshold {
            Strategy::Single
        } else {
            Strategy::Multipart
        }
    }
}

/// One byte range of a chunked transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartRange {
    /// 1-based part number.
    pub number: u32,
    /// Byte offset of the first byte of this part.
    pub offset: u64,
    /// Number of bytes in this part.
    pub len: u64,
}

impl PartRange {
    /// Half-open byte range `[offset, offset + len)`.
    pub fn range(&self) -> Range<u64> {
        self.offset..self.offset + self.len
    }
}

/// Layout of a file split into fixed-size parts.
///
/// Every part is `part_size` bytes except possibly the last one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartPlan {
    size: u64,
    part_size: u64,
    total_parts: u32,
}

impl PartPlan {
    /// Plans the parts for a file of `size` bytes.
    ///
    /// Fails for a zero `part_size`, or when the file would need more
    /// parts than a `u32` part number can address.
    pub fn new(size: u64, part_size: u64) -> Result<Self, TransferError> {
        if part_size == 0 {
            return Err(TransferError::InvalidPartSize(
                "must be greater than zero".into(),
            ));
        }
        let parts = size.div_ceil(part_size);
        let total_parts = u32::try_from(parts).map_err(|_| TransferError::TooManyParts { parts })?;
        Ok(Self {
            size,
            part_size,
            total_parts,
        })
    }

    /// Total file size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Nominal part size in bytes.
    pub fn part_size(&self) -> u64 {
        self.part_size
    }

    /// `ceil(size / part_size)`.
    pub fn total_parts(&self) -> u32 {
        self.total_parts
    }

    /// Returns the byte range of part `number`, or `None` if out of range.
    pub fn part(&self, number: u32) -> Option<PartRange> {
        if number == 0 || number > self.total_parts {
            return None;
        }
        let offset = u64::from(number - 1) * self.part_size;
        let end = (offset + self.part_size).min(self.size);
        Some(PartRange {
            number,
            offset,
            len: end - offset,
        })
    }

    /// Iterates over all parts in transmission order.
    pub fn parts(&self) -> impl Iterator<Item = PartRange> + '_ {
        (1..=self.total_parts).filter_map(|n| self.part(n))
    }

    /// Integer percentage after `completed` parts, rounded half up.
    ///
    /// Never exceeds 100; 0 for an empty plan.
    pub fn progress_after(&self, completed: u32) -> u8 {
        if self.total_parts == 0 {
            return 0;
        }
        let completed = u64::from(completed.min(self.total_parts));
        let total = u64::from(self.total_parts);
        let pct = (completed * 200 + total) / (total * 2);
        pct.min(100) as u8
    }
}
