//! A headless windowing engine for fixed-height row lists.
//!
//! The engine answers one question per frame: which rows of a potentially huge list have to be
//! materialized for the current viewport? Everything else is reported as reserved scroll space so
//! a scrollbar keeps its real geometry without the rows being built.
//!
//! It is UI-agnostic. A TUI/GUI layer is expected to provide:
//! - the row count and a fixed row height
//! - the viewport height
//! - scroll offsets, as scroll events arrive
//!
//! Range changes are reported as [`RangeDelta`]s, and [`SlotPool`] maps mounted rows onto a
//! bounded set of recycled layout slots.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod key;
mod options;
mod slots;
mod state;
mod types;
mod window;


pub use options::{OnChangeCallback, WindowOptions};
pub use slots::SlotPool;
pub use state::ViewportState;
pub use types::{Align, RangeDelta, RowRange, ScrollDirection, Spacers, WindowedRow};
pub use window::WindowedList;
