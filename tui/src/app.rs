//! Application state and key handling

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use vitrine::{
    Align, Completion, ConfirmationLoader, CurrencyFormat, PromptState, QueryTicket, RawProduct,
    ResultsView, SearchError, SearchSession, VitrineConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Search,
    Results,
}

/// Work the event loop has to start after a key press.
#[derive(Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Fetch(QueryTicket),
    LoadConfirmation,
}

pub struct App {
    pub input: String,
    pub focus: Focus,
    pub selected: usize,
    pub status: Option<String>,
    pub session: SearchSession,
    pub view: ResultsView,
    pub confirmation: ConfirmationLoader,
    pub currency: CurrencyFormat,
    row_height: u32,
}

impl App {
    pub fn new(
        session: SearchSession,
        config: &VitrineConfig,
        confirmation: ConfirmationLoader,
    ) -> Self {
        Self {
            input: String::new(),
            focus: Focus::Search,
            selected: 0,
            status: None,
            session,
            view: ResultsView::new(config.viewport.window_options(0), confirmation.clone()),
            confirmation,
            currency: config.currency,
            row_height: config.viewport.row_height.max(1),
        }
    }

    pub fn row_height(&self) -> u32 {
        self.row_height
    }

    /// Terminal lines the list currently shows; one line per row.
    pub fn page_len(&self) -> usize {
        (self.view.window().viewport_height() / self.row_height).max(1) as usize
    }

    pub fn resize_list(&mut self, lines: u16) {
        let height = u32::from(lines).saturating_mul(self.row_height);
        if height != self.view.window().viewport_height() {
            self.view.resize(height);
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.kind != KeyEventKind::Press {
            return Action::None;
        }
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Action::Quit;
        }
        let action = match self.focus {
            Focus::Search => self.search_key(key),
            Focus::Results => self.results_key(key),
        };
        self.refresh();
        action
    }

    fn search_key(&mut self, key: KeyEvent) -> Action {
        match key.code {
            KeyCode::Char(c) => self.input.push(c),
            KeyCode::Backspace => {
                self.input.pop();
            }
            KeyCode::Enter => {
                if let Some(ticket) = self.session.begin(&self.input) {
                    self.status = Some(format!("Buscando \"{}\"...", ticket.query()));
                    return Action::Fetch(ticket);
                }
            }
            KeyCode::Tab | KeyCode::Down if !self.session.results().is_empty() => {
                self.focus = Focus::Results;
            }
            KeyCode::Esc => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    fn results_key(&mut self, key: KeyEvent) -> Action {
        let index = self.selected;
        if self.view.prompt_state(index) == Some(PromptState::Prompting) {
            match key.code {
                KeyCode::Char('y') | KeyCode::Enter => {
                    self.view.confirm(index);
                    self.collect_wishlist();
                }
                KeyCode::Char('n') => {
                    self.view.decline(index);
                }
                KeyCode::Esc => {
                    self.view.dismiss(index);
                }
                _ => {}
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.select(index.saturating_sub(1)),
            KeyCode::Down | KeyCode::Char('j') => self.select(index.saturating_add(1)),
            KeyCode::PageUp => self.select(index.saturating_sub(self.page_len())),
            KeyCode::PageDown => self.select(index.saturating_add(self.page_len())),
            KeyCode::Home => self.select(0),
            KeyCode::End => self.select(usize::MAX),
            KeyCode::Char('w') | KeyCode::Enter => {
                if self.view.open_prompt(index) && !self.confirmation.is_loaded() {
                    return Action::LoadConfirmation;
                }
            }
            KeyCode::Tab | KeyCode::Char('/') => self.focus = Focus::Search,
            KeyCode::Esc | KeyCode::Char('q') => return Action::Quit,
            _ => {}
        }
        Action::None
    }

    fn select(&mut self, index: usize) {
        let len = self.session.results().len();
        if len == 0 {
            return;
        }
        self.selected = index.min(len - 1);
        self.view.scroll_to_index(self.selected, Align::Auto);
    }

    /// Hands a finished fetch back to the session.
    pub fn apply_completion(
        &mut self,
        ticket: &QueryTicket,
        outcome: Result<Vec<RawProduct>, SearchError>,
    ) {
        match self.session.complete(ticket, outcome) {
            Completion::Applied { rows } => {
                self.selected = 0;
                self.view.replace_rows(rows);
                self.status = Some(match rows {
                    0 => "Nenhum resultado".to_string(),
                    1 => "1 resultado".to_string(),
                    n => format!("{n} resultados"),
                });
            }
            Completion::Failed => {
                self.status = self.session.last_error().map(|e| format!("Erro: {e}"));
            }
            Completion::Stale => {}
        }
        self.refresh();
    }

    fn collect_wishlist(&mut self) {
        for id in self.session.drain_wishlist_requests() {
            let title = self
                .session
                .results()
                .rows()
                .iter()
                .find(|p| p.id == id)
                .map_or_else(|| id.to_string(), |p| p.title.clone());
            tracing::info!(%id, "wishlist updated from the terminal");
            self.status = Some(format!("{title} adicionado aos favoritos"));
        }
    }

    /// Brings the mounted rows in line with the current results.
    fn refresh(&mut self) {
        let rows = self.session.results().shared_rows();
        self.view.render(&rows, self.session.on_add_to_wishlist());
    }
}
