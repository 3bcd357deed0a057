//! Wishlist confirmation

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::OnceCell;

use crate::product::ProductId;

/// Shown in place of the confirmation while its copy is still loading.
pub const LOADING_PLACEHOLDER: &str = "carregando...";

/// The "add to wishlist" capability handed down to every row.
///
/// Cloning shares the underlying closure; [`Self::ptr_eq`] tells whether two handles are the same
/// capability. A session builds exactly one for its whole lifetime.
#[derive(Clone)]
pub struct WishlistCallback(Arc<dyn Fn(ProductId) + Send + Sync>);

impl WishlistCallback {
    pub fn new(f: impl Fn(ProductId) + Send + Sync + 'static) -> Self {
        Self(Arc::new(f))
    }

    pub fn call(&self, id: ProductId) {
        (self.0)(id)
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for WishlistCallback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WishlistCallback(..)")
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PromptState {
    #[default]
    Idle,
    Prompting,
}

/// Row-local confirmation: `Idle → Prompting → Idle`.
///
/// Every action reports whether it applied; actions that do not fit the current state are
/// ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WishlistPrompt {
    state: PromptState,
}

impl WishlistPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> PromptState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == PromptState::Prompting
    }

    /// The row's trigger was activated.
    pub fn open(&mut self) -> bool {
        if self.state != PromptState::Idle {
            return false;
        }
        self.state = PromptState::Prompting;
        true
    }

    /// The user answered yes: invokes `on_add(id)` once, then closes.
    pub fn confirm(&mut self, id: ProductId, on_add: &WishlistCallback) -> bool {
        if self.state != PromptState::Prompting {
            return false;
        }
        on_add.call(id);
        self.state = PromptState::Idle;
        true
    }

    /// The user answered no.
    pub fn decline(&mut self) -> bool {
        self.close()
    }

    /// The prompt was dismissed without an answer.
    pub fn dismiss(&mut self) -> bool {
        self.close()
    }

    fn close(&mut self) -> bool {
        if self.state != PromptState::Prompting {
            return false;
        }
        self.state = PromptState::Idle;
        true
    }
}

/// User-facing text of the confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfirmationCopy {
    pub question: String,
    pub confirm_label: String,
    pub decline_label: String,
}

impl Default for ConfirmationCopy {
    fn default() -> Self {
        Self {
            question: "Deseja adicionar aos favoritos?".to_string(),
            confirm_label: "Sim".to_string(),
            decline_label: "Não".to_string(),
        }
    }
}

/// Lazily loaded confirmation UI.
///
/// The copy is resolved at most once and shared by every row holding a clone of the loader.
/// Until then rows render [`LOADING_PLACEHOLDER`]. This is separate from [`WishlistPrompt`]: a row
/// can be `Prompting` while the copy is still loading.
#[derive(Debug, Clone, Default)]
pub struct ConfirmationLoader {
    cell: Arc<OnceCell<ConfirmationCopy>>,
}

impl ConfirmationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// A loader whose copy is already available.
    pub fn ready(copy: ConfirmationCopy) -> Self {
        Self {
            cell: Arc::new(OnceCell::new_with(Some(copy))),
        }
    }

    /// Returns the copy if it has been loaded.
    pub fn get(&self) -> Option<&ConfirmationCopy> {
        self.cell.get()
    }

    pub fn is_loaded(&self) -> bool {
        self.cell.initialized()
    }

    /// Loads the default copy.
    pub async fn load(&self) -> &ConfirmationCopy {
        self.load_with(|| async { ConfirmationCopy::default() })
            .await
    }

    /// Loads the copy with `f`; concurrent callers wait for the first load.
    pub async fn load_with<F, Fut>(&self, f: F) -> &ConfirmationCopy
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ConfirmationCopy>,
    {
        let copy = self.cell.get_or_init(f).await;
        tracing::debug!(target: "vitrine", "confirmation copy loaded");
        copy
    }
}
