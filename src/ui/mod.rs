pub mod components;
pub mod form;
pub mod records;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::Style;
use ratatui::widgets::Block;

use crate::app::{AppState, Dialog};

/// Draw the whole screen for the current state.
pub fn render(f: &mut Frame, app: &mut AppState) {
    let area = f.area();
    f.render_widget(
        Block::default().style(Style::default().bg(app.theme.background)),
        area,
    );

    if app.loading {
        components::render_loading(f, area, app);
        return;
    }

    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(4),
            Constraint::Length(1),
        ])
        .split(area);

    records::render_title(f, root[0], app);
    records::render_search_box(f, root[1], app);
    records::render_cards(f, root[2], app);
    records::render_add_button(f, root[2], app);
    components::render_status_bar(f, root[3], app);

    if app.form.is_open() {
        form::render_form(f, area, app);
    }
    if app.show_help {
        components::render_help_modal(f, area, app);
    }
    match &app.dialog {
        Some(Dialog::Alert { title, message }) => {
            components::render_alert_modal(f, area, app, title, message)
        }
        Some(Dialog::ConfirmDelete { name, confirm, .. }) => {
            components::render_confirm_delete(f, area, app, name, *confirm)
        }
        None => {}
    }
}
