use alloc::sync::Arc;

use crate::RangeDelta;
use crate::window::WindowedList;

/// A callback fired when the window state changes.
///
/// The second argument is the change of the materialized range since the previous notification.
pub type OnChangeCallback = Arc<dyn Fn(&WindowedList, RangeDelta) + Send + Sync>;

/// Configuration for [`crate::WindowedList`].
///
/// Cheap to clone: the callback is stored in an `Arc`.
#[derive(Clone)]
pub struct WindowOptions {
    pub row_count: usize,
    /// Fixed height of every row in the scroll axis. Zero is treated as one.
    pub row_height: u32,
    pub viewport_height: u32,
    /// Rows materialized beyond each edge of the viewport.
    pub overscan: usize,
    pub initial_offset: u64,
    pub on_change: Option<OnChangeCallback>,
}

impl WindowOptions {
    pub fn new(row_count: usize, row_height: u32) -> Self {
        Self {
            row_count,
            row_height,
            viewport_height: 0,
            overscan: 1,
            initial_offset: 0,
            on_change: None,
        }
    }

    pub fn with_viewport_height(mut self, viewport_height: u32) -> Self {
        self.viewport_height = viewport_height;
        self
    }

    pub fn with_overscan(mut self, overscan: usize) -> Self {
        self.overscan = overscan;
        self
    }

    pub fn with_initial_offset(mut self, initial_offset: u64) -> Self {
        self.initial_offset = initial_offset;
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: Option<impl Fn(&WindowedList, RangeDelta) + Send + Sync + 'static>,
    ) -> Self {
        self.on_change = on_change.map(|f| Arc::new(f) as _);
        self
    }

    pub(crate) fn effective_row_height(&self) -> u32 {
        self.row_height.max(1)
    }
}

impl Default for WindowOptions {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl core::fmt::Debug for WindowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("WindowOptions")
            .field("row_count", &self.row_count)
            .field("row_height", &self.row_height)
            .field("viewport_height", &self.viewport_height)
            .field("overscan", &self.overscan)
            .field("initial_offset", &self.initial_offset)
            .finish_non_exhaustive()
    }
}
