//! Shared UI components (status bar, loading screen, dialogs).
//!
use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph, Wrap};

use crate::app::keymap::{KeyAction, format_action};
use crate::app::{AppState, InputMode};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Full-screen spinner shown while the list is being fetched.
pub fn render_loading(f: &mut Frame, area: Rect, app: &AppState) {
    let frame = (app.started_at.elapsed().as_millis() / 80) as usize % SPINNER.len();
    let rect = centered_rect(24, 1, area);
    let line = Line::from(vec![
        Span::styled(
            SPINNER[frame],
            Style::default()
                .fg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(" Loading users…", Style::default().fg(app.theme.title)),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), rect);
}

/// Bottom line: mode, counts, running request and the main keys.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
    };
    let busy = app
        .in_flight
        .as_ref()
        .map(|job| format!("  [{}…]", job.label()))
        .unwrap_or_default();
    let msg = format!(
        "mode: {mode}  users: {}/{}{busy}  | /: search  n: add  e: edit  d: delete  ?: help  \
         q: quit",
        app.visible.len(),
        app.records.len(),
    );
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

fn dialog_block(title: &str, app: &AppState) -> Block<'static> {
    Block::default()
        .title(title.to_string())
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border))
        .style(Style::default().fg(app.theme.text).bg(app.theme.card_bg))
}

/// Blocking alert with a single OK.
pub fn render_alert_modal(f: &mut Frame, area: Rect, app: &AppState, title: &str, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let width = 48u16.min(max_w);
    let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)) + 1;
    let height = (approx_lines + 4).min(area.height).max(5);
    let rect = centered_rect(width, height, area);

    let lines = vec![
        Line::raw(message.to_string()),
        Line::raw(""),
        Line::from(Span::styled(
            " OK ",
            Style::default()
                .fg(app.theme.status_fg)
                .bg(app.theme.accent)
                .add_modifier(Modifier::BOLD),
        ))
        .alignment(Alignment::Right),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(dialog_block(title, app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Two-choice delete prompt; `confirm` highlights "Delete" instead of "Cancel".
pub fn render_confirm_delete(f: &mut Frame, area: Rect, app: &AppState, name: &str, confirm: bool) {
    let rect = centered_rect(52, 7, area);
    let chosen = Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED);
    let cancel_style = if confirm { Style::default() } else { chosen };
    let delete_style = if confirm {
        chosen.fg(app.theme.danger)
    } else {
        Style::default().fg(app.theme.danger)
    };
    let lines = vec![
        Line::raw("Are you sure you want to delete this user?"),
        Line::from(Span::styled(
            name.to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::styled(" Cancel ", cancel_style),
            Span::raw("   "),
            Span::styled(" Delete ", delete_style),
        ])
        .alignment(Alignment::Right),
    ];
    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(dialog_block("Confirm Delete", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Key reference built from the active keymap.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let width = 60u16.min(area.width.saturating_sub(4)).max(40);
    let height = 20u16.min(area.height.saturating_sub(2)).max(10);
    let rect = centered_rect(width, height, area);

    let mut lines: Vec<Line> = vec![Line::from(Span::styled(
        "Main screen",
        Style::default().add_modifier(Modifier::BOLD),
    ))];
    for action in [
        KeyAction::StartSearch,
        KeyAction::NewRecord,
        KeyAction::EditSelection,
        KeyAction::DeleteSelection,
        KeyAction::MoveUp,
        KeyAction::MoveDown,
        KeyAction::PageUp,
        KeyAction::PageDown,
        KeyAction::OpenHelp,
        KeyAction::Quit,
    ] {
        let keys = app.keymap.keys_for(action).join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:<16}", format_action(action))),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Search box",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw("  type to filter, Enter: keep, Esc: clear"));
    lines.push(Line::from(Span::styled(
        "Form",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw("  Tab/Up/Down: move, Enter: submit, Esc: cancel"));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(dialog_block("Help", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
