//! Range planner — splits a block interval into provider-sized chunks.

use crate::types::BlockRange;

/// Split `[resume, head]` into ascending, contiguous, non-overlapping chunks.
///
/// Each chunk is `[from, min(from + chunk_size, head)]` and the next one starts
/// right after it, so `to - from` never exceeds `chunk_size` and one chunk spans
/// up to `chunk_size + 1` blocks inclusive. The last chunk may be shorter.
/// Returns an empty plan when `resume > head`.
///
/// A `chunk_size` of 0 is treated as 1.
pub fn plan_ranges(resume: u64, head: u64, chunk_size: u64) -> Vec<BlockRange> {
    if resume > head {
        return Vec::new();
    }
    let step = chunk_size.max(1);

    let mut chunks = Vec::new();
    let mut from = resume;
    loop {
        let to = from.saturating_add(step).min(head);
        chunks.push(BlockRange::new(from, to));
        if to == head {
            break;
        }
        from = to + 1;
    }
    chunks
}
