use alloc::sync::Arc;
use alloc::vec::Vec;
use core::cell::Cell;
use core::cmp;

use crate::{
    Align, RangeDelta, RowRange, ScrollDirection, Spacers, ViewportState, WindowOptions,
    WindowedRow,
};

/// A headless windowing engine for lists whose rows all share one height.
///
/// The type is UI-agnostic:
/// - It does not hold any UI objects or row data, only the row count.
/// - Your adapter drives it with viewport heights and scroll offsets.
/// - Rendering is exposed via zero-allocation iteration (`for_each_row`), and every state change
///   can be observed as a [`RangeDelta`] so rows can be mounted and unmounted incrementally.
#[derive(Clone, Debug)]
pub struct WindowedList {
    options: WindowOptions,
    viewport_height: u32,
    scroll_offset: u64,
    scroll_direction: Option<ScrollDirection>,

    notified_range: Cell<RowRange>,
    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl WindowedList {
    pub fn new(options: WindowOptions) -> Self {
        wdebug!(
            row_count = options.row_count,
            row_height = options.row_height,
            overscan = options.overscan,
            "WindowedList::new"
        );
        let mut w = Self {
            viewport_height: options.viewport_height,
            scroll_offset: 0,
            scroll_direction: None,
            options,
            notified_range: Cell::new(RowRange::EMPTY),
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        };
        w.scroll_offset = w.clamp_scroll_offset(w.options.initial_offset);
        w.notified_range.set(w.materialized_range());
        w
    }

    pub fn options(&self) -> &WindowOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: WindowOptions) {
        self.options = options;
        self.viewport_height = self.options.viewport_height;
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
        wtrace!(
            row_count = self.options.row_count,
            overscan = self.options.overscan,
            "WindowedList::set_options"
        );
        self.notify();
    }

    pub fn set_on_change(
        &mut self,
        on_change: Option<impl Fn(&WindowedList, RangeDelta) + Send + Sync + 'static>,
    ) {
        self.options.on_change = on_change.map(|f| Arc::new(f) as _);
    }

    fn notify_now(&self) {
        let current = self.materialized_range();
        let previous = self.notified_range.replace(current);
        if let Some(cb) = &self.options.on_change {
            cb(self, RangeDelta::new(previous, current));
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    ///
    /// A typical frame updates the viewport height and the scroll offset together; batching keeps
    /// the callback (which usually drives rendering) to one call per frame.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    pub fn row_count(&self) -> usize {
        self.options.row_count
    }

    pub fn row_height(&self) -> u32 {
        self.options.effective_row_height()
    }

    pub fn overscan(&self) -> usize {
        self.options.overscan
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    pub fn scroll_offset(&self) -> u64 {
        self.scroll_offset
    }

    pub fn scroll_direction(&self) -> Option<ScrollDirection> {
        self.scroll_direction
    }

    pub fn set_row_count(&mut self, row_count: usize) {
        if self.options.row_count == row_count {
            return;
        }
        self.options.row_count = row_count;
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
        self.notify();
    }

    pub fn set_row_height(&mut self, row_height: u32) {
        if self.options.row_height == row_height {
            return;
        }
        if row_height == 0 {
            wwarn!("WindowedList: row_height 0 is treated as 1");
        }
        self.options.row_height = row_height;
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
        self.notify();
    }

    pub fn set_overscan(&mut self, overscan: usize) {
        if self.options.overscan == overscan {
            return;
        }
        self.options.overscan = overscan;
        self.notify();
    }

    pub fn set_viewport_height(&mut self, viewport_height: u32) {
        if self.viewport_height == viewport_height {
            return;
        }
        self.viewport_height = viewport_height;
        self.options.viewport_height = viewport_height;
        self.scroll_offset = self.clamp_scroll_offset(self.scroll_offset);
        self.notify();
    }

    /// Applies a scroll offset from your UI layer (wheel, drag, keyboard).
    ///
    /// The offset is clamped to [`Self::max_scroll_offset`]. Returns the change of the
    /// materialized range caused by this scroll.
    pub fn apply_scroll(&mut self, offset: u64) -> RangeDelta {
        let before = self.materialized_range();
        let offset = self.clamp_scroll_offset(offset);
        if offset != self.scroll_offset {
            wtrace!(offset, prev = self.scroll_offset, "apply_scroll");
            self.scroll_direction = match offset.cmp(&self.scroll_offset) {
                cmp::Ordering::Greater => Some(ScrollDirection::Forward),
                cmp::Ordering::Less => Some(ScrollDirection::Backward),
                cmp::Ordering::Equal => self.scroll_direction,
            };
            self.scroll_offset = offset;
            self.notify();
        }
        RangeDelta::new(before, self.materialized_range())
    }

    /// Scrolls by a signed amount, saturating at both ends.
    pub fn scroll_by(&mut self, delta: i64) -> RangeDelta {
        let target = if delta >= 0 {
            self.scroll_offset.saturating_add(delta as u64)
        } else {
            self.scroll_offset.saturating_sub(delta.unsigned_abs())
        };
        self.apply_scroll(target)
    }

    /// Sets both viewport height and scroll offset in a single coalesced update.
    pub fn apply_viewport(&mut self, viewport_height: u32, offset: u64) -> RangeDelta {
        let before = self.materialized_range();
        self.batch_update(|w| {
            w.set_viewport_height(viewport_height);
            w.apply_scroll(offset);
        });
        RangeDelta::new(before, self.materialized_range())
    }

    /// Programmatically scrolls to a row (no animation). Returns the applied (clamped) offset.
    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> u64 {
        let offset = self.scroll_to_index_offset(index, align);
        self.apply_scroll(offset);
        self.scroll_offset
    }

    pub fn scroll_to_index_offset(&self, index: usize, align: Align) -> u64 {
        let count = self.options.row_count;
        if count == 0 {
            return 0;
        }
        let index = index.min(count - 1);
        let start = self.row_start(index);
        let end = start.saturating_add(self.row_height() as u64);
        let view = self.viewport_height as u64;

        let target = match align {
            Align::Start => start,
            Align::End => end.saturating_sub(view),
            Align::Center => {
                let center = start.saturating_add(self.row_height() as u64 / 2);
                center.saturating_sub(view / 2)
            }
            Align::Auto => {
                let cur = self.scroll_offset;
                let cur_end = cur.saturating_add(view);
                if start >= cur && end <= cur_end {
                    cur
                } else if start < cur {
                    start
                } else {
                    end.saturating_sub(view)
                }
            }
        };

        self.clamp_scroll_offset(target)
    }

    pub fn total_height(&self) -> u64 {
        (self.options.row_count as u64).saturating_mul(self.row_height() as u64)
    }

    pub fn max_scroll_offset(&self) -> u64 {
        self.max_scroll_offset_for(self.viewport_height)
    }

    fn max_scroll_offset_for(&self, viewport_height: u32) -> u64 {
        self.total_height().saturating_sub(viewport_height as u64)
    }

    pub fn clamp_scroll_offset(&self, offset: u64) -> u64 {
        offset.min(self.max_scroll_offset())
    }

    /// Rows intersecting the viewport, without overscan.
    pub fn visible_range(&self) -> RowRange {
        self.visible_range_for(self.scroll_offset, self.viewport_height)
    }

    /// `[floor(offset / row_height), ceil((offset + viewport) / row_height))`, clamped to the
    /// row count. Offsets past the end are clamped to the last full page first.
    pub fn visible_range_for(&self, scroll_offset: u64, viewport_height: u32) -> RowRange {
        let count = self.options.row_count;
        if count == 0 || viewport_height == 0 {
            return RowRange::EMPTY;
        }

        let row = self.row_height() as u64;
        let offset = scroll_offset.min(self.max_scroll_offset_for(viewport_height));
        let end = offset.saturating_add(viewport_height as u64);

        let first = offset / row;
        let last = end.div_ceil(row);
        let first = cmp::min(first, count as u64) as usize;
        let last = cmp::min(last, count as u64) as usize;
        RowRange::new(first, last)
    }

    /// Rows to materialize: the visible range widened by `overscan` on both sides.
    pub fn materialized_range(&self) -> RowRange {
        self.materialized_range_for(self.scroll_offset, self.viewport_height)
    }

    pub fn materialized_range_for(&self, scroll_offset: u64, viewport_height: u32) -> RowRange {
        let visible = self.visible_range_for(scroll_offset, viewport_height);
        if visible.is_empty() {
            return visible;
        }
        let overscan = self.options.overscan;
        RowRange::new(
            visible.start_index.saturating_sub(overscan),
            cmp::min(
                self.options.row_count,
                visible.end_index.saturating_add(overscan),
            ),
        )
    }

    /// Scroll space reserved for the rows around the materialized range.
    pub fn spacers(&self) -> Spacers {
        let range = self.materialized_range();
        if range.is_empty() {
            return Spacers {
                before: 0,
                after: self.total_height(),
            };
        }
        let row = self.row_height() as u64;
        let after_rows = self.options.row_count.saturating_sub(range.end_index) as u64;
        Spacers {
            before: (range.start_index as u64).saturating_mul(row),
            after: after_rows.saturating_mul(row),
        }
    }

    pub fn for_each_index(&self, f: impl FnMut(usize)) {
        self.materialized_range().indexes().for_each(f);
    }

    pub fn for_each_row(&self, f: impl FnMut(WindowedRow)) {
        self.for_each_row_for(self.scroll_offset, self.viewport_height, f);
    }

    pub fn for_each_row_for(
        &self,
        scroll_offset: u64,
        viewport_height: u32,
        mut f: impl FnMut(WindowedRow),
    ) {
        let range = self.materialized_range_for(scroll_offset, viewport_height);
        let size = self.row_height();
        for index in range.indexes() {
            f(WindowedRow {
                index,
                start: self.row_start(index),
                size,
            });
        }
    }

    /// Collects materialized rows into `out` (clears `out` first).
    ///
    /// For maximum performance, prefer `for_each_row` and reuse a scratch buffer in your adapter.
    pub fn collect_rows(&self, out: &mut Vec<WindowedRow>) {
        out.clear();
        self.for_each_row(|row| out.push(row));
    }

    pub fn row(&self, index: usize) -> Option<WindowedRow> {
        (index < self.options.row_count).then(|| WindowedRow {
            index,
            start: self.row_start(index),
            size: self.row_height(),
        })
    }

    pub fn index_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.options.row_count;
        if count == 0 {
            return None;
        }
        let index = offset / self.row_height() as u64;
        Some(cmp::min(index, (count - 1) as u64) as usize)
    }

    /// Returns a lightweight snapshot of the current viewport geometry.
    pub fn viewport_state(&self) -> ViewportState {
        ViewportState {
            scroll_offset: self.scroll_offset,
            viewport_height: self.viewport_height,
            row_height: self.options.row_height,
            overscan: self.options.overscan,
        }
    }

    /// Restores viewport geometry from a previously captured snapshot.
    pub fn restore_viewport_state(&mut self, state: ViewportState) {
        self.batch_update(|w| {
            w.set_row_height(state.row_height);
            w.set_overscan(state.overscan);
            w.set_viewport_height(state.viewport_height);
            w.apply_scroll(state.scroll_offset);
        });
    }

    fn row_start(&self, index: usize) -> u64 {
        (index as u64).saturating_mul(self.row_height() as u64)
    }
}
