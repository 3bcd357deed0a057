//! Search session

use std::collections::BTreeSet;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::error::SearchError;
use crate::format::PriceFormatter;
use crate::product::{ProductId, RawProduct, ResultSet};
use crate::source::ProductSource;
use crate::wishlist::WishlistCallback;

/// A query that passed validation and is waiting for its results.
///
/// Tickets are numbered in submission order; only the most recent one may replace the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryTicket {
    seq: u64,
    query: String,
}

impl QueryTicket {
    pub fn seq(&self) -> u64 {
        self.seq
    }

    /// The trimmed query text.
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// What happened to a finished query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// The results were replaced.
    Applied { rows: usize },
    /// The fetch failed; the previous results are still shown.
    Failed,
    /// A newer query was submitted meanwhile; this response was discarded.
    Stale,
}

/// Orchestrates query submission and owns the current [`ResultSet`].
///
/// A session is driven from a single task. Fetches can run elsewhere: take a ticket with
/// [`Self::begin`], run [`ProductSource::search`] on [`Self::source`], and hand the outcome back
/// to [`Self::complete`] on the session's task.
pub struct SearchSession {
    source: Arc<dyn ProductSource>,
    formatter: Arc<dyn PriceFormatter>,
    results: ResultSet,
    issued: u64,
    applied: u64,
    last_error: Option<SearchError>,
    on_add: WishlistCallback,
    wishlist_rx: mpsc::UnboundedReceiver<ProductId>,
    wishlisted: BTreeSet<ProductId>,
}

impl SearchSession {
    pub fn new(source: Arc<dyn ProductSource>, formatter: Arc<dyn PriceFormatter>) -> Self {
        let (wishlist_tx, wishlist_rx) = mpsc::unbounded_channel();
        let on_add = WishlistCallback::new(move |id| {
            if wishlist_tx.send(id).is_err() {
                tracing::warn!(target: "vitrine", %id, "wishlist request dropped: session is gone");
            }
        });
        Self {
            source,
            formatter,
            results: ResultSet::empty(),
            issued: 0,
            applied: 0,
            last_error: None,
            on_add,
            wishlist_rx,
            wishlisted: BTreeSet::new(),
        }
    }

    pub fn source(&self) -> Arc<dyn ProductSource> {
        Arc::clone(&self.source)
    }

    pub fn results(&self) -> &ResultSet {
        &self.results
    }

    /// The error of the most recent failed query, cleared by the next applied one.
    pub fn last_error(&self) -> Option<&SearchError> {
        self.last_error.as_ref()
    }

    /// Whether a submitted query has not completed yet.
    pub fn is_pending(&self) -> bool {
        self.issued > self.applied
    }

    /// The session's "add to wishlist" capability.
    ///
    /// Built once in [`Self::new`]; every call returns a handle to the same closure.
    pub fn on_add_to_wishlist(&self) -> &WishlistCallback {
        &self.on_add
    }

    /// Starts a query. Blank input is ignored and yields no ticket.
    pub fn begin(&mut self, query: &str) -> Option<QueryTicket> {
        let query = query.trim();
        if query.is_empty() {
            tracing::trace!(target: "vitrine", "blank query ignored");
            return None;
        }
        self.issued += 1;
        tracing::debug!(target: "vitrine", seq = self.issued, query, "query submitted");
        Some(QueryTicket {
            seq: self.issued,
            query: query.to_string(),
        })
    }

    /// Applies the outcome of a ticket's fetch.
    ///
    /// Only the latest ticket can change the session. On failure the previous results are kept
    /// and the error is stored in [`Self::last_error`].
    pub fn complete(
        &mut self,
        ticket: &QueryTicket,
        outcome: Result<Vec<RawProduct>, SearchError>,
    ) -> Completion {
        if ticket.seq != self.issued {
            tracing::debug!(
                target: "vitrine",
                seq = ticket.seq,
                latest = self.issued,
                "stale response discarded"
            );
            return Completion::Stale;
        }
        self.applied = ticket.seq;

        let mapped = outcome.and_then(|raw| ResultSet::from_raw(&raw, self.formatter.as_ref()));
        match mapped {
            Ok(results) => {
                let rows = results.len();
                tracing::info!(
                    target: "vitrine",
                    query = ticket.query.as_str(),
                    rows,
                    total = %results.total_price(),
                    "results applied"
                );
                self.results = results;
                self.last_error = None;
                Completion::Applied { rows }
            }
            Err(err) => {
                tracing::warn!(
                    target: "vitrine",
                    query = ticket.query.as_str(),
                    error = %err,
                    "search failed"
                );
                self.last_error = Some(err);
                Completion::Failed
            }
        }
    }

    /// Submits a query and waits for it. Returns `None` for blank input.
    pub async fn submit(&mut self, query: &str) -> Option<Completion> {
        let ticket = self.begin(query)?;
        let outcome = self.source.search(ticket.query()).await;
        Some(self.complete(&ticket, outcome))
    }

    /// Processes the wishlist requests made through the callback since the last call.
    ///
    /// Returns the ids that were newly added.
    pub fn drain_wishlist_requests(&mut self) -> Vec<ProductId> {
        let mut added = Vec::new();
        while let Ok(id) = self.wishlist_rx.try_recv() {
            if self.wishlisted.insert(id) {
                tracing::info!(target: "vitrine", %id, "added to wishlist");
                added.push(id);
            }
        }
        added
    }

    pub fn wishlisted(&self) -> &BTreeSet<ProductId> {
        &self.wishlisted
    }

    pub fn is_wishlisted(&self, id: ProductId) -> bool {
        self.wishlisted.contains(&id)
    }
}

impl std::fmt::Debug for SearchSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SearchSession")
            .field("results", &self.results)
            .field("issued", &self.issued)
            .field("applied", &self.applied)
            .field("last_error", &self.last_error)
            .field("wishlisted", &self.wishlisted)
            .finish_non_exhaustive()
    }
}
