//! Splitting a file into upload parts

/// Byte range of one multipart part
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PartPlan {
    /// 1-based part number
    pub part_number: i32,
    pub offset: u64,
    pub len: u64,
}

/// Number of parts needed for `total_size` bytes.
pub fn part_count(total_size: u64, chunk_size: u64) -> u64 {
    if chunk_size == 0 {
        return 0;
    }
    total_size.div_ceil(chunk_size)
}

/// Slice `total_size` bytes into consecutive `chunk_size` parts; only the
/// last one may be shorter. An empty file has no parts.
pub fn plan_parts(total_size: u64, chunk_size: u64) -> Vec<PartPlan> {
    (0..part_count(total_size, chunk_size))
        .map(|index| {
            let offset = index * chunk_size;
            PartPlan {
                part_number: index as i32 + 1,
                offset,
                len: chunk_size.min(total_size - offset),
            }
        })
        .collect()
}
