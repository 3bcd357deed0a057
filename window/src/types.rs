use core::ops::Range;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Align {
    Start,
    Center,
    End,
    Auto,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

/// A contiguous run of row indexes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RowRange {
    pub start_index: usize,
    pub end_index: usize, // exclusive
}

impl RowRange {
    pub const EMPTY: Self = Self {
        start_index: 0,
        end_index: 0,
    };

    pub fn new(start_index: usize, end_index: usize) -> Self {
        Self {
            start_index,
            end_index,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start_index >= self.end_index
    }

    pub fn len(&self) -> usize {
        self.end_index.saturating_sub(self.start_index)
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start_index && index < self.end_index
    }

    pub fn indexes(&self) -> Range<usize> {
        self.start_index..self.end_index.max(self.start_index)
    }
}

/// A materialized row and its position in the scroll axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct WindowedRow {
    pub index: usize,
    /// Start offset in the scroll axis.
    pub start: u64,
    pub size: u32,
}

impl WindowedRow {
    pub fn end(&self) -> u64 {
        self.start.saturating_add(self.size as u64)
    }
}

/// Scroll space reserved for rows that are not materialized.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacers {
    /// Combined height of the rows above the materialized range.
    pub before: u64,
    /// Combined height of the rows below the materialized range.
    pub after: u64,
}

/// The change between two materialized ranges.
///
/// Both ranges are contiguous, so each side of the difference is at most two runs. The delta is
/// iterated rather than collected to keep scroll handling allocation-free.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RangeDelta {
    pub previous: RowRange,
    pub current: RowRange,
}

impl RangeDelta {
    pub fn new(previous: RowRange, current: RowRange) -> Self {
        Self { previous, current }
    }

    /// Returns `true` when both ranges cover the same rows.
    pub fn is_unchanged(&self) -> bool {
        self.previous == self.current || (self.previous.is_empty() && self.current.is_empty())
    }

    /// Indexes that entered the window, ascending.
    pub fn for_each_mounted(&self, f: impl FnMut(usize)) {
        for_each_outside(self.current, self.previous, f);
    }

    /// Indexes that left the window, ascending.
    pub fn for_each_unmounted(&self, f: impl FnMut(usize)) {
        for_each_outside(self.previous, self.current, f);
    }

    pub fn mounted_count(&self) -> usize {
        let mut n = 0usize;
        self.for_each_mounted(|_| n += 1);
        n
    }

    pub fn unmounted_count(&self) -> usize {
        let mut n = 0usize;
        self.for_each_unmounted(|_| n += 1);
        n
    }
}

// Emits the indexes of `range` that are not in `other`.
fn for_each_outside(range: RowRange, other: RowRange, mut f: impl FnMut(usize)) {
    if other.is_empty() {
        range.indexes().for_each(f);
        return;
    }
    let head_end = range.end_index.min(other.start_index);
    for i in range.start_index..head_end {
        f(i);
    }
    let tail_start = range.start_index.max(other.end_index);
    for i in tail_start..range.end_index {
        f(i);
    }
}
