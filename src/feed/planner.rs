//! Range planning.
//!
//! Public RPC endpoints cap how many blocks a single `eth_getLogs` call may
//! span, so the scan window is partitioned up front into consecutive
//! sub-ranges no wider than that cap.

/// Inclusive block range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    pub from: u64,
    pub to: u64,
}

impl BlockRange {
    pub fn new(from: u64, to: u64) -> Self {
        Self { from, to }
    }

    /// Number of blocks the range covers, inclusive of both ends. The full
    /// `0..=u64::MAX` range has `u64::MAX + 1` blocks, which does not fit in
    /// a `u64`; it saturates rather than overflowing.
    pub fn width(&self) -> u64 {
        (self.to - self.from).saturating_add(1)
    }
}

impl std::fmt::Display for BlockRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.from, self.to)
    }
}

/// Partition `[start_block, head_block]` into consecutive inclusive ranges
/// of at most `max_width` blocks. The first range starts at `start_block`,
/// each subsequent range picks up one block after the previous one ended,
/// and the final range is clipped to end exactly at `head_block`.
///
/// `start_block == head_block` yields a single one-block range. A start
/// beyond the head yields no ranges. `max_width` is clamped to at least 1.
pub fn plan_ranges(start_block: u64, head_block: u64, max_width: u64) -> Vec<BlockRange> {
    if start_block > head_block {
        return Vec::new();
    }

    let max_width = max_width.max(1);
    let mut ranges = Vec::new();
    let mut from = start_block;
    loop {
        let to = from.saturating_add(max_width - 1).min(head_block);
        ranges.push(BlockRange::new(from, to));
        if to == head_block {
            break;
        }
        from = to + 1;
    }
    ranges
}
