//! Windowed results list

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;

use vitrine_window::{
    Align, RangeDelta, RowRange, SlotPool, Spacers, ViewportState, WindowOptions, WindowedList,
};

use crate::product::Product;
use crate::row::{MemoRow, RowView};
use crate::wishlist::{ConfirmationLoader, PromptState, WishlistCallback};

/// A materialized row ready to be drawn.
#[derive(Debug, Clone, Copy)]
pub struct RenderedRow<'a> {
    pub index: usize,
    /// Recycled layout slot holding this row.
    pub slot: usize,
    /// Offset of the row in the scroll axis.
    pub start: u64,
    pub view: &'a RowView,
}

/// The results list: a [`WindowedList`] plus one [`MemoRow`] per materialized index.
///
/// Rows are keyed by index, like the layout slots they sit in. A row that scrolls out of the
/// window is unmounted and its prompt state is dropped with it.
#[derive(Debug)]
pub struct ResultsView {
    window: WindowedList,
    slots: SlotPool,
    mounted: BTreeMap<usize, MemoRow>,
    confirmation: ConfirmationLoader,
}

impl ResultsView {
    pub fn new(options: WindowOptions, confirmation: ConfirmationLoader) -> Self {
        let window = WindowedList::new(options);
        let mut slots = SlotPool::new();
        slots.sync(window.materialized_range());
        Self {
            window,
            slots,
            mounted: BTreeMap::new(),
            confirmation,
        }
    }

    pub fn window(&self) -> &WindowedList {
        &self.window
    }

    pub fn viewport_state(&self) -> ViewportState {
        self.window.viewport_state()
    }

    pub fn materialized_range(&self) -> RowRange {
        self.window.materialized_range()
    }

    pub fn spacers(&self) -> Spacers {
        self.window.spacers()
    }

    pub fn total_height(&self) -> u64 {
        self.window.total_height()
    }

    pub fn mounted_len(&self) -> usize {
        self.mounted.len()
    }

    pub fn slot_capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn row(&self, index: usize) -> Option<&MemoRow> {
        self.mounted.get(&index)
    }

    /// Resizes the list for a new row sequence.
    ///
    /// Rows that stay inside the window keep their state; whether they re-render is decided by
    /// their product comparison on the next [`Self::render`].
    pub fn set_row_count(&mut self, row_count: usize) -> RangeDelta {
        self.update(|w| w.set_row_count(row_count))
    }

    /// Starts over for a new result set: back to the top with every row unmounted.
    ///
    /// Rows are keyed by index, so an open prompt would otherwise stay attached to whatever
    /// product the new results put at its index.
    pub fn replace_rows(&mut self, row_count: usize) -> RangeDelta {
        self.mounted.clear();
        self.update(|w| {
            w.set_row_count(row_count);
            w.apply_scroll(0);
        })
    }

    pub fn scroll_to(&mut self, offset: u64) -> RangeDelta {
        self.update(|w| {
            w.apply_scroll(offset);
        })
    }

    pub fn scroll_by(&mut self, delta: i64) -> RangeDelta {
        self.update(|w| {
            w.scroll_by(delta);
        })
    }

    pub fn scroll_to_index(&mut self, index: usize, align: Align) -> RangeDelta {
        self.update(|w| {
            w.scroll_to_index(index, align);
        })
    }

    pub fn resize(&mut self, viewport_height: u32) -> RangeDelta {
        self.update(|w| w.set_viewport_height(viewport_height))
    }

    fn update(&mut self, f: impl FnOnce(&mut WindowedList)) -> RangeDelta {
        let before = self.window.materialized_range();
        f(&mut self.window);
        let delta = RangeDelta::new(before, self.window.materialized_range());
        self.apply(delta);
        delta
    }

    fn apply(&mut self, delta: RangeDelta) {
        if delta.is_unchanged() {
            return;
        }
        let mounted = &mut self.mounted;
        delta.for_each_unmounted(|index| {
            mounted.remove(&index);
        });
        self.slots.apply(delta);
        tracing::trace!(
            target: "vitrine",
            start = delta.current.start_index,
            end = delta.current.end_index,
            mounted = delta.mounted_count(),
            unmounted = delta.unmounted_count(),
            "window moved"
        );
    }

    /// Invokes the row renderer for the materialized indexes only.
    ///
    /// `rows` must be the full sequence the list was sized for; a length mismatch resizes the
    /// list first.
    pub fn render(&mut self, rows: &[Product], on_add: &WishlistCallback) -> Vec<RenderedRow<'_>> {
        if rows.len() != self.window.row_count() {
            self.set_row_count(rows.len());
        }

        let range = self.window.materialized_range();
        for index in range.indexes() {
            let product = &rows[index];
            match self.mounted.entry(index) {
                Entry::Occupied(mut row) => {
                    row.get_mut().render(product, on_add);
                }
                Entry::Vacant(vacant) => {
                    vacant.insert(MemoRow::mount(product, on_add, self.confirmation.clone()));
                }
            }
        }

        let mounted = &self.mounted;
        let slots = &self.slots;
        let mut out = Vec::with_capacity(range.len());
        self.window.for_each_row(|row| {
            if let (Some(memo), Some(slot)) = (mounted.get(&row.index), slots.slot_of(row.index)) {
                out.push(RenderedRow {
                    index: row.index,
                    slot,
                    start: row.start,
                    view: memo.view(),
                });
            }
        });
        out
    }

    pub fn prompt_state(&self, index: usize) -> Option<PromptState> {
        self.mounted.get(&index).map(MemoRow::prompt_state)
    }

    /// Activates the trigger of the row at `index`. Returns `false` if the row is not mounted or
    /// its prompt is already open.
    pub fn open_prompt(&mut self, index: usize) -> bool {
        self.mounted.get_mut(&index).is_some_and(MemoRow::open_prompt)
    }

    pub fn confirm(&mut self, index: usize) -> bool {
        self.mounted.get_mut(&index).is_some_and(MemoRow::confirm)
    }

    pub fn decline(&mut self, index: usize) -> bool {
        self.mounted.get_mut(&index).is_some_and(MemoRow::decline)
    }

    pub fn dismiss(&mut self, index: usize) -> bool {
        self.mounted.get_mut(&index).is_some_and(MemoRow::dismiss)
    }

    /// Index of the mounted row whose prompt is open, if any.
    pub fn open_prompt_index(&self) -> Option<usize> {
        self.mounted
            .iter()
            .find(|(_, row)| row.prompt_state() == PromptState::Prompting)
            .map(|(index, _)| *index)
    }
}
