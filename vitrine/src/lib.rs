//! Windowed product search results.
//!
//! The crate wires a [`vitrine_window::WindowedList`] to a row renderer that skips work for rows
//! whose data did not change:
//!
//! - [`SearchSession`] submits queries, owns the current [`ResultSet`] and a single, identity
//!   stable [`WishlistCallback`].
//! - [`ResultsView`] materializes only the rows inside the viewport (plus overscan) and keeps one
//!   [`MemoRow`] per mounted row.
//! - [`MemoRow`] compares products field by field and reuses its previous output when they are
//!   equivalent, whatever callback it was handed.
//! - [`WishlistPrompt`] is the row-local `Idle → Prompting → Idle` confirmation.
//!
//! Nothing here draws to a screen; a front-end turns [`RowView`]s into widgets.
#![forbid(unsafe_code)]

mod config;
mod error;
mod format;
mod product;
mod results;
mod row;
mod session;
mod source;
mod wishlist;

#[cfg(test)]
mod tests;

pub use config::{ConfigError, DEFAULT_ENDPOINT, ViewportConfig, VitrineConfig};
pub use error::SearchError;
pub use format::{Currency, CurrencyFormat, Locale, PriceFormatter};
pub use product::{Product, ProductId, RawProduct, ResultSet, RowEquivalence};
pub use results::{RenderedRow, ResultsView};
pub use row::{MemoRow, PromptView, RowView};
pub use session::{Completion, QueryTicket, SearchSession};
pub use source::{HttpProductSource, ProductSource, decode_products};
pub use wishlist::{
    ConfirmationCopy, ConfirmationLoader, LOADING_PLACEHOLDER, PromptState, WishlistCallback,
    WishlistPrompt,
};

pub use rust_decimal::Decimal;
pub use vitrine_window::{Align, RangeDelta, RowRange, Spacers, ViewportState, WindowedList};
