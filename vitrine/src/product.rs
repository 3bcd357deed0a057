//! Row model and result set

use std::fmt;
use std::sync::Arc;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::SearchError;
use crate::format::PriceFormatter;

/// Stable identity of a product across renders of the same logical item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u64);

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A product as returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawProduct {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
}

/// A row of the results list.
///
/// `price_formatted` is derived once when the row is built, never per render.
#[derive(Debug, Clone, Serialize)]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    pub price: Decimal,
    pub price_formatted: String,
}

impl Product {
    pub fn from_raw(raw: &RawProduct, formatter: &dyn PriceFormatter) -> Self {
        Self {
            id: raw.id,
            title: raw.title.clone(),
            price: raw.price,
            price_formatted: formatter.format_price(raw.price),
        }
    }
}

/// Value equality used to decide whether a row can skip rendering.
///
/// Rows are rebuilt from scratch on every query, so two equivalent rows are almost never the
/// same allocation; implementations must compare contents, not addresses.
pub trait RowEquivalence {
    fn is_equivalent(&self, other: &Self) -> bool;
}

impl RowEquivalence for Product {
    fn is_equivalent(&self, other: &Self) -> bool {
        self.id == other.id
            && self.title == other.title
            && self.price == other.price
            && self.price_formatted == other.price_formatted
    }
}

impl PartialEq for Product {
    fn eq(&self, other: &Self) -> bool {
        self.is_equivalent(other)
    }
}

impl Eq for Product {}

/// The rows of one query plus their aggregate price.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultSet {
    total_price: Decimal,
    rows: Arc<[Product]>,
}

impl ResultSet {
    pub fn empty() -> Self {
        Self {
            total_price: Decimal::ZERO,
            rows: Arc::from(Vec::new()),
        }
    }

    /// Maps raw records into rows and sums their prices.
    ///
    /// The total is computed here, once per query. Fails only if the sum overflows `Decimal`.
    pub fn from_raw(
        raw: &[RawProduct],
        formatter: &dyn PriceFormatter,
    ) -> Result<Self, SearchError> {
        let total_price = raw
            .iter()
            .try_fold(Decimal::ZERO, |acc, p| acc.checked_add(p.price))
            .ok_or_else(|| SearchError::malformed("price total overflows"))?;
        let rows: Vec<Product> = raw
            .iter()
            .map(|p| Product::from_raw(p, formatter))
            .collect();
        Ok(Self {
            total_price,
            rows: Arc::from(rows),
        })
    }

    pub fn total_price(&self) -> Decimal {
        self.total_price
    }

    pub fn rows(&self) -> &[Product] {
        &self.rows
    }

    /// Shared handle to the rows; cloning it does not copy them.
    pub fn shared_rows(&self) -> Arc<[Product]> {
        Arc::clone(&self.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Default for ResultSet {
    fn default() -> Self {
        Self::empty()
    }
}
