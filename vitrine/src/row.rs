//! Memoized row renderer

use crate::product::{Product, ProductId, RowEquivalence};
use crate::wishlist::{
    ConfirmationLoader, LOADING_PLACEHOLDER, PromptState, WishlistCallback, WishlistPrompt,
};

/// Label of the trigger that opens the confirmation.
pub const TRIGGER_LABEL: &str = "Adicionar aos favoritos";

/// The confirmation part of a row's output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptView {
    Closed,
    Loading,
    Asking {
        question: String,
        confirm_label: String,
        decline_label: String,
    },
}

/// What a row renders to. Front-ends turn this into widgets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowView {
    pub id: ProductId,
    pub title: String,
    pub price: String,
    pub trigger_label: &'static str,
    pub prompt: PromptView,
}

impl RowView {
    /// `"Chair - R$ 49,90"`
    pub fn summary(&self) -> String {
        format!("{} - {}", self.title, self.price)
    }

    pub fn prompt_text(&self) -> Option<String> {
        match &self.prompt {
            PromptView::Closed => None,
            PromptView::Loading => Some(LOADING_PLACEHOLDER.to_string()),
            PromptView::Asking {
                question,
                confirm_label,
                decline_label,
            } => Some(format!("{question} [{confirm_label}] [{decline_label}]")),
        }
    }
}

/// One mounted row.
///
/// `render` recomputes the output only when the product is not equivalent to the one rendered
/// last, or when the row's own prompt changed. The callback is stored on every call but never
/// invalidates the output, so a parent re-creating its callback cannot force re-renders.
///
/// Rows are keyed by index. When a product with another id lands on the row, an open prompt is
/// dismissed without invoking the callback.
#[derive(Debug)]
pub struct MemoRow {
    product: Product,
    on_add: WishlistCallback,
    prompt: WishlistPrompt,
    confirmation: ConfirmationLoader,
    output: RowView,
    rendered_with_copy: bool,
    dirty: bool,
    renders: u64,
    skips: u64,
}

impl MemoRow {
    /// Mounts a row and renders it once.
    pub fn mount(
        product: &Product,
        on_add: &WishlistCallback,
        confirmation: ConfirmationLoader,
    ) -> Self {
        let prompt = WishlistPrompt::new();
        let output = build_view(product, &prompt, &confirmation);
        let rendered_with_copy = confirmation.is_loaded();
        Self {
            product: product.clone(),
            on_add: on_add.clone(),
            prompt,
            confirmation,
            output,
            rendered_with_copy,
            dirty: false,
            renders: 1,
            skips: 0,
        }
    }

    pub fn render(&mut self, product: &Product, on_add: &WishlistCallback) -> &RowView {
        self.on_add = on_add.clone();

        // A different product now occupies this row; its prompt belonged to the old one.
        if self.product.id != product.id && self.prompt.dismiss() {
            self.dirty = true;
        }

        if self.can_skip(product) {
            self.skips += 1;
            return &self.output;
        }

        if !self.product.is_equivalent(product) {
            self.product = product.clone();
        }
        self.output = build_view(&self.product, &self.prompt, &self.confirmation);
        self.rendered_with_copy = self.confirmation.is_loaded();
        self.dirty = false;
        self.renders += 1;
        tracing::trace!(
            target: "vitrine",
            id = %self.product.id,
            renders = self.renders,
            "row rendered"
        );
        &self.output
    }

    fn can_skip(&self, product: &Product) -> bool {
        if self.dirty {
            return false;
        }
        // The loader resolving while the prompt is open changes the output.
        if self.prompt.is_open() && self.confirmation.is_loaded() != self.rendered_with_copy {
            return false;
        }
        self.product.is_equivalent(product)
    }

    /// The last rendered output.
    pub fn view(&self) -> &RowView {
        &self.output
    }

    pub fn product(&self) -> &Product {
        &self.product
    }

    pub fn prompt_state(&self) -> PromptState {
        self.prompt.state()
    }

    /// Number of times the output was computed, including the mount.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    /// Number of `render` calls that reused the previous output.
    pub fn skip_count(&self) -> u64 {
        self.skips
    }

    pub fn open_prompt(&mut self) -> bool {
        self.mark(|p, _, _| p.open())
    }

    /// Invokes the most recent callback with this row's id, then closes the prompt.
    pub fn confirm(&mut self) -> bool {
        self.mark(|p, id, cb| p.confirm(id, cb))
    }

    pub fn decline(&mut self) -> bool {
        self.mark(|p, _, _| p.decline())
    }

    pub fn dismiss(&mut self) -> bool {
        self.mark(|p, _, _| p.dismiss())
    }

    fn mark(
        &mut self,
        f: impl FnOnce(&mut WishlistPrompt, ProductId, &WishlistCallback) -> bool,
    ) -> bool {
        let changed = f(&mut self.prompt, self.product.id, &self.on_add);
        if changed {
            self.dirty = true;
        }
        changed
    }
}

fn build_view(
    product: &Product,
    prompt: &WishlistPrompt,
    confirmation: &ConfirmationLoader,
) -> RowView {
    let prompt = match prompt.state() {
        PromptState::Idle => PromptView::Closed,
        PromptState::Prompting => match confirmation.get() {
            None => PromptView::Loading,
            Some(copy) => PromptView::Asking {
                question: copy.question.clone(),
                confirm_label: copy.confirm_label.clone(),
                decline_label: copy.decline_label.clone(),
            },
        },
    };
    RowView {
        id: product.id,
        title: product.title.clone(),
        price: product.price_formatted.clone(),
        trigger_label: TRIGGER_LABEL,
        prompt,
    }
}
