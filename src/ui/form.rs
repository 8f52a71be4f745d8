use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Clear, Paragraph};

use crate::app::{AppState, FormFocus, FormState, Job};
use crate::ui::components::centered_rect;

/// The create/edit modal.
pub fn render_form(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(fields) = app.form.fields() else {
        return;
    };
    let editing = matches!(app.form, FormState::Editing { .. });
    let saving = matches!(app.in_flight, Some(Job::Create(_)) | Some(Job::Update(..)));

    let width = (area.width / 10 * 9).clamp(30, 70).min(area.width);
    let rect = centered_rect(width, 12, area);
    let mut title = if editing { "Update User".to_string() } else { "Add User".to_string() };
    if saving {
        title.push_str(" (saving…)");
    }
    let outer = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(app.theme.border))
        .style(Style::default().bg(app.theme.card_bg));
    let inner = outer.inner(rect);
    f.render_widget(Clear, rect);
    f.render_widget(outer, rect);
    if inner.height < 7 {
        return;
    }

    let name_rect = Rect {
        x: inner.x + 1,
        y: inner.y,
        width: inner.width.saturating_sub(2),
        height: 3,
    };
    let avatar_rect = Rect {
        y: inner.y + 3,
        ..name_rect
    };
    let buttons_rect = Rect {
        y: inner.y + 7u16.min(inner.height - 1),
        height: 1,
        ..name_rect
    };

    render_input(
        f,
        name_rect,
        app,
        "Name",
        &fields.name,
        fields.focus == FormFocus::Name,
    );
    render_input(
        f,
        avatar_rect,
        app,
        "Avatar URL",
        &fields.avatar,
        fields.focus == FormFocus::Avatar,
    );

    let submit_label = if editing { " Update User " } else { " Add User " };
    let button = |label: &'static str, color: Color, focused: bool| {
        let mut style = Style::default()
            .fg(app.theme.card_bg)
            .bg(color)
            .add_modifier(Modifier::BOLD);
        if focused {
            style = style.add_modifier(Modifier::REVERSED | Modifier::UNDERLINED);
        }
        Span::styled(label, style)
    };
    let line = Line::from(vec![
        button(submit_label, app.theme.accent, fields.focus == FormFocus::Submit),
        Span::raw("  "),
        button(" Cancel ", app.theme.danger, fields.focus == FormFocus::Cancel),
    ]);
    f.render_widget(Paragraph::new(line).alignment(Alignment::Center), buttons_rect);
}

fn render_input(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    placeholder: &str,
    value: &str,
    focused: bool,
) {
    let border = if focused { app.theme.accent } else { app.theme.border };
    let text = if value.is_empty() {
        Span::styled(placeholder.to_string(), Style::default().fg(app.theme.muted))
    } else {
        Span::styled(value.to_string(), Style::default().fg(app.theme.text))
    };
    let p = Paragraph::new(Line::from(text)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(p, area);

    if focused {
        let x = area.x + 1 + value.chars().count() as u16;
        f.set_cursor_position(Position::new(
            x.min(area.right().saturating_sub(2)),
            area.y + 1,
        ));
    }
}
