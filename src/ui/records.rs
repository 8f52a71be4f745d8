use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::api::Record;
use crate::app::{AppState, InputMode};

/// Rows taken by one card including its border.
pub const CARD_HEIGHT: u16 = 4;

pub fn render_title(f: &mut Frame, area: Rect, app: &AppState) {
    let p = Paragraph::new("User inform")
        .alignment(Alignment::Center)
        .style(
            Style::default()
                .fg(app.theme.title)
                .add_modifier(Modifier::BOLD),
        );
    f.render_widget(p, area);
}

/// Search box; shows a placeholder while empty and the cursor while focused.
pub fn render_search_box(f: &mut Frame, area: Rect, app: &AppState) {
    let focused = app.input_mode == InputMode::Search && !app.form.is_open();
    let border = if focused { app.theme.accent } else { app.theme.border };
    let text = if app.search_query.is_empty() {
        Span::styled("Search Users", Style::default().fg(app.theme.muted))
    } else {
        Span::styled(app.search_query.clone(), Style::default().fg(app.theme.text))
    };
    let p = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(border))
            .style(Style::default().bg(app.theme.card_bg)),
    );
    f.render_widget(p, area);

    if focused {
        let x = area.x + 1 + app.search_query.chars().count() as u16;
        f.set_cursor_position(Position::new(
            x.min(area.right().saturating_sub(2)),
            area.y + 1,
        ));
    }
}

/// The page of cards containing the selection.
pub fn render_cards(f: &mut Frame, area: Rect, app: &mut AppState) {
    let per_page = (area.height / CARD_HEIGHT).max(1) as usize;
    app.rows_per_page = per_page;

    if app.visible.is_empty() {
        let msg = if app.records.is_empty() {
            "No users yet. Press n to add one."
        } else {
            "No users match the search."
        };
        let p = Paragraph::new(msg)
            .alignment(Alignment::Center)
            .style(Style::default().fg(app.theme.title));
        f.render_widget(p, Rect { height: 1u16.min(area.height), ..area });
        return;
    }

    let start = (app.selected / per_page) * per_page;
    let end = (start + per_page).min(app.visible.len());
    for (i, record) in app.visible[start..end].iter().enumerate() {
        let rect = Rect {
            x: area.x,
            y: area.y + i as u16 * CARD_HEIGHT,
            width: area.width,
            height: CARD_HEIGHT,
        };
        render_card(f, rect, app, record, start + i == app.selected);
    }
}

fn render_card(f: &mut Frame, area: Rect, app: &AppState, record: &Record, selected: bool) {
    let border = if selected {
        Style::default()
            .fg(app.theme.highlight_fg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(app.theme.border)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(border)
        .style(Style::default().bg(app.theme.card_bg));
    let inner = block.inner(area);
    f.render_widget(block, area);

    let lines = vec![
        Line::from(Span::styled(
            record.name.clone(),
            Style::default()
                .fg(app.theme.text)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(vec![
            Span::styled("◉ ", Style::default().fg(app.theme.accent)),
            Span::styled(record.avatar.clone(), Style::default().fg(app.theme.muted)),
        ]),
    ];
    f.render_widget(Paragraph::new(lines), inner);

    let actions = Line::from(vec![
        Span::styled(
            " Edit ",
            Style::default()
                .fg(app.theme.card_bg)
                .bg(app.theme.edit)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" "),
        Span::styled(
            " Delete ",
            Style::default()
                .fg(app.theme.card_bg)
                .bg(app.theme.danger)
                .add_modifier(Modifier::BOLD),
        ),
    ]);
    let row = Rect { height: 1u16.min(inner.height), ..inner };
    f.render_widget(Paragraph::new(actions).alignment(Alignment::Right), row);
}

/// Floating add button in the bottom-right corner of the list.
pub fn render_add_button(f: &mut Frame, area: Rect, app: &AppState) {
    let label = " + Add (n) ";
    let width = label.chars().count() as u16;
    if area.width <= width + 2 || area.height < 2 {
        return;
    }
    let rect = Rect {
        x: area.right() - width - 2,
        y: area.bottom() - 1,
        width,
        height: 1,
    };
    let p = Paragraph::new(label).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.accent)
            .add_modifier(Modifier::BOLD),
    );
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
