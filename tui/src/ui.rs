//! Drawing

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style, Stylize};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState};
use vitrine::{LOADING_PLACEHOLDER, PriceFormatter};

use crate::app::{App, Focus};

pub fn draw(frame: &mut Frame, app: &mut App) {
    let [input_area, total_area, list_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Length(1),
        Constraint::Min(3),
        Constraint::Length(3),
    ])
    .areas(frame.area());

    draw_input(frame, app, input_area);

    let total = app.currency.format_price(app.session.results().total_price());
    frame.render_widget(
        Paragraph::new(Line::from(vec![Span::raw(" Total: "), Span::raw(total).bold()])),
        total_area,
    );

    draw_results(frame, app, list_area);
    draw_status(frame, app, status_area);
}

fn focus_style(focused: bool) -> Style {
    if focused {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default()
    }
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let focused = app.focus == Focus::Search;
    let block = Block::bordered()
        .title(" Buscar ")
        .border_style(focus_style(focused));
    frame.render_widget(Paragraph::new(app.input.as_str()).block(block), area);
    if focused {
        let typed = u16::try_from(app.input.chars().count()).unwrap_or(u16::MAX);
        let x = area.x.saturating_add(1).saturating_add(typed);
        frame.set_cursor_position((x.min(area.right().saturating_sub(2)), area.y + 1));
    }
}

fn draw_results(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::bordered()
        .title(" Resultados ")
        .border_style(focus_style(app.focus == Focus::Results));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = app.session.results().shared_rows();
    if rows.is_empty() {
        let text = if app.session.is_pending() {
            LOADING_PLACEHOLDER
        } else {
            "Nenhum resultado"
        };
        frame.render_widget(Paragraph::new(text).dim(), inner);
        return;
    }

    app.resize_list(inner.height);
    let row_height = u64::from(app.row_height());
    let offset = app.view.viewport_state().scroll_offset;
    let first_visible = (offset / row_height) as usize;
    let selected = app.selected;

    let rendered = app.view.render(&rows, app.session.on_add_to_wishlist());
    for row in &rendered {
        // Overscan rows are materialized but sit outside the drawable area.
        if row.start < offset {
            continue;
        }
        let line = (row.start - offset) / row_height;
        if line >= u64::from(inner.height) {
            continue;
        }

        let is_selected = row.index == selected;
        let mut spans = vec![
            Span::raw(if is_selected { "> " } else { "  " }),
            Span::raw(row.view.title.as_str()),
            Span::raw(" - "),
            Span::raw(row.view.price.as_str()).bold(),
        ];
        if app.session.is_wishlisted(row.view.id) {
            spans.push(Span::raw(" ★").fg(Color::Yellow));
        }
        match row.view.prompt_text() {
            Some(text) => spans.push(Span::raw(format!("  {text}")).fg(Color::Magenta)),
            None if is_selected => {
                spans.push(Span::raw(format!("  [w] {}", row.view.trigger_label)).dim());
            }
            None => {}
        }

        let style = if is_selected && app.focus == Focus::Results {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let rect = Rect {
            x: inner.x,
            y: inner.y + line as u16,
            width: inner.width,
            height: 1,
        };
        frame.render_widget(Paragraph::new(Line::from(spans)).style(style), rect);
    }

    let mut scrollbar = ScrollbarState::new(rows.len()).position(first_visible);
    frame.render_stateful_widget(
        Scrollbar::new(ScrollbarOrientation::VerticalRight),
        area,
        &mut scrollbar,
    );
}

fn draw_status(frame: &mut Frame, app: &App, area: Rect) {
    let hint = match app.focus {
        Focus::Search => "Enter buscar  Tab resultados  Esc sair",
        Focus::Results => "↑↓ mover  w favoritar  y/n responder  / buscar  q sair",
    };
    let mut lines = Vec::with_capacity(2);
    if let Some(status) = &app.status {
        lines.push(Line::raw(status.as_str()));
    } else if let Some(err) = app.session.last_error() {
        lines.push(Line::raw(format!("Erro: {err}")).fg(Color::Red));
    }
    lines.push(Line::raw(hint).dim());
    frame.render_widget(Paragraph::new(lines).block(Block::bordered()), area);
}
