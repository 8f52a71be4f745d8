use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::time::Duration;

use crate::app::keymap::KeyAction;
use crate::app::worker::Worker;
use crate::app::{AppState, Dialog, FormFields, FormFocus, FormState, InputMode, Job, Outcome};
use crate::error::ApiError;
use crate::search::apply_search;
use crate::ui;

/// Drive the screen: draw, feed finished jobs back in, react to keys.
pub fn run_app(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    mut app: AppState,
    worker: Worker,
) -> Result<()> {
    if let Some(job) = initial_fetch(&mut app) {
        worker.submit(job)?;
    }

    while !app.should_quit {
        terminal
            .draw(|f| ui::render(f, &mut app))
            .context("draw frame")?;

        while let Some(outcome) = worker.try_recv()? {
            if let Some(job) = handle_outcome(&mut app, outcome) {
                worker.submit(job)?;
            }
        }

        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(job) = handle_key(&mut app, key) {
                        worker.submit(job)?;
                    }
                }
            }
        }
    }

    Ok(())
}

/// The list fetch issued once at start-up.
pub fn initial_fetch(app: &mut AppState) -> Option<Job> {
    dispatch(app, Job::List)
}

/// Mark `job` as in flight and hand it back for the worker. Refused while
/// another job is still running so a double submit cannot race.
fn dispatch(app: &mut AppState, job: Job) -> Option<Job> {
    if let Some(running) = &app.in_flight {
        tracing::debug!(
            running = running.label(),
            refused = job.label(),
            "job already in flight"
        );
        return None;
    }
    if job == Job::List {
        app.loading = true;
    }
    tracing::debug!(job = job.label(), "dispatching");
    app.in_flight = Some(job.clone());
    Some(job)
}

/// Apply a finished job. Any mutation the server answered closes the form and
/// triggers a resync; a request that never got an answer leaves things as they are.
pub fn handle_outcome(app: &mut AppState, outcome: Outcome) -> Option<Job> {
    app.in_flight = None;
    match outcome {
        Outcome::Listed(Ok(records)) => {
            tracing::info!(count = records.len(), "records loaded");
            app.records = records;
            apply_search(app);
            app.loading = false;
            None
        }
        Outcome::Listed(Err(e)) => {
            tracing::error!(error = %e, "error fetching records");
            app.loading = false;
            None
        }
        Outcome::Mutated(job, Ok(())) => {
            tracing::info!(job = job.label(), "mutation accepted");
            if !matches!(job, Job::Delete(_)) {
                app.form = FormState::Closed;
            }
            dispatch(app, Job::List)
        }
        Outcome::Mutated(job, Err(e @ ApiError::Status { .. })) => {
            // The server answered, so its list is the truth: close and resync.
            tracing::error!(job = job.label(), error = %e, "server rejected change");
            if !matches!(job, Job::Delete(_)) {
                app.form = FormState::Closed;
            }
            dispatch(app, Job::List)
        }
        Outcome::Mutated(job, Err(e)) => {
            tracing::error!(job = job.label(), error = %e, "error saving record");
            None
        }
    }
}

/// Route one key press to whatever currently owns the keyboard.
pub fn handle_key(app: &mut AppState, key: KeyEvent) -> Option<Job> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return None;
    }
    if app.loading {
        if key.code == KeyCode::Char('q') {
            app.should_quit = true;
        }
        return None;
    }
    if app.dialog.is_some() {
        return handle_dialog_key(app, key.code);
    }
    if app.show_help {
        if matches!(
            key.code,
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('?') | KeyCode::Char('q')
        ) {
            app.show_help = false;
        }
        return None;
    }
    if app.form.is_open() {
        return handle_form_key(app, key);
    }
    match app.input_mode {
        InputMode::Search => {
            handle_search_key(app, key);
            None
        }
        InputMode::Normal => handle_normal_key(app, key),
    }
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Option<Job> {
    let Some(action) = app.keymap.resolve(&key) else {
        return None;
    };
    let rpp = app.rows_per_page.max(1);
    match action {
        KeyAction::Quit => app.should_quit = true,
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::NewRecord => open_create(app),
        KeyAction::EditSelection => {
            if let Some(record) = app.selected_record().cloned() {
                begin_edit(app, &record);
            }
        }
        KeyAction::DeleteSelection => request_delete(app),
        KeyAction::MoveUp => app.selected = app.selected.saturating_sub(1),
        KeyAction::MoveDown => {
            if app.selected + 1 < app.visible.len() {
                app.selected += 1;
            }
        }
        KeyAction::PageUp => app.selected = app.selected.saturating_sub(rpp),
        KeyAction::PageDown => {
            app.selected = (app.selected + rpp).min(app.visible.len().saturating_sub(1));
        }
        KeyAction::OpenHelp => app.show_help = true,
        KeyAction::Ignore => {}
    }
    None
}

fn handle_search_key(app: &mut AppState, key: KeyEvent) {
    match key.code {
        KeyCode::Enter => app.input_mode = InputMode::Normal,
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
            set_search(app, String::new());
        }
        KeyCode::Backspace => {
            let mut q = app.search_query.clone();
            q.pop();
            set_search(app, q);
        }
        KeyCode::Up => app.selected = app.selected.saturating_sub(1),
        KeyCode::Down => {
            if app.selected + 1 < app.visible.len() {
                app.selected += 1;
            }
        }
        KeyCode::Char(c) => {
            let mut q = app.search_query.clone();
            q.push(c);
            set_search(app, q);
        }
        _ => {}
    }
}

/// Replace the search text and refilter immediately.
pub fn set_search(app: &mut AppState, query: String) {
    app.search_query = query;
    apply_search(app);
}

fn handle_form_key(app: &mut AppState, key: KeyEvent) -> Option<Job> {
    let focus = app.form.fields().map(|f| f.focus).unwrap_or_default();
    match key.code {
        KeyCode::Esc => cancel_form(app),
        KeyCode::Tab | KeyCode::Down => {
            if let Some(fields) = app.form.fields_mut() {
                fields.focus = fields.focus.next();
            }
        }
        KeyCode::BackTab | KeyCode::Up => {
            if let Some(fields) = app.form.fields_mut() {
                fields.focus = fields.focus.prev();
            }
        }
        KeyCode::Enter => {
            if focus == FormFocus::Cancel {
                cancel_form(app);
            } else {
                return submit_form(app);
            }
        }
        KeyCode::Backspace => {
            if let Some(text) = focused_text(app) {
                text.pop();
            }
        }
        KeyCode::Char(c) => {
            if let Some(text) = focused_text(app) {
                text.push(c);
            }
        }
        _ => {}
    }
    None
}

fn focused_text(app: &mut AppState) -> Option<&mut String> {
    let fields = app.form.fields_mut()?;
    match fields.focus {
        FormFocus::Name => Some(&mut fields.name),
        FormFocus::Avatar => Some(&mut fields.avatar),
        FormFocus::Submit | FormFocus::Cancel => None,
    }
}

fn handle_dialog_key(app: &mut AppState, code: KeyCode) -> Option<Job> {
    match app.dialog.as_mut() {
        Some(Dialog::Alert { .. }) => {
            if matches!(code, KeyCode::Enter | KeyCode::Esc) {
                app.dialog = None;
            }
            None
        }
        Some(Dialog::ConfirmDelete { confirm, .. }) => match code {
            KeyCode::Left
            | KeyCode::Right
            | KeyCode::Tab
            | KeyCode::BackTab
            | KeyCode::Char('h')
            | KeyCode::Char('l') => {
                *confirm = !*confirm;
                None
            }
            KeyCode::Esc | KeyCode::Char('n') => {
                cancel_delete(app);
                None
            }
            KeyCode::Char('y') => confirm_delete(app),
            KeyCode::Enter => {
                if *confirm {
                    confirm_delete(app)
                } else {
                    cancel_delete(app);
                    None
                }
            }
            _ => None,
        },
        None => None,
    }
}

/// Closed -> Creating with empty fields.
pub fn open_create(app: &mut AppState) {
    if app.is_busy() {
        tracing::debug!("add ignored while a request is running");
        return;
    }
    app.form = FormState::Creating(FormFields::default());
}

/// Any form state -> Editing `record`, fields loaded from it.
pub fn begin_edit(app: &mut AppState, record: &crate::api::Record) {
    if app.is_busy() {
        tracing::debug!("edit ignored while a request is running");
        return;
    }
    app.form = FormState::Editing {
        target: record.id.clone(),
        fields: FormFields::from_record(record),
    };
}

/// Creating/Editing -> Closed, discarding whatever was typed.
pub fn cancel_form(app: &mut AppState) {
    app.form = FormState::Closed;
}

/// Validate and send the form. Invalid input raises an alert and keeps the form open.
pub fn submit_form(app: &mut AppState) -> Option<Job> {
    let fields = app.form.fields()?;
    let Some(input) = fields.to_input() else {
        app.dialog = Some(Dialog::Alert {
            title: "Error".to_string(),
            message: "Please provide both name and avatar URL.".to_string(),
        });
        return None;
    };
    let job = match app.form.edit_target() {
        Some(id) => Job::Update(id.clone(), input),
        None => Job::Create(input),
    };
    dispatch(app, job)
}

/// Ask before deleting the selected record.
pub fn request_delete(app: &mut AppState) {
    if app.is_busy() {
        tracing::debug!("delete ignored while a request is running");
        return;
    }
    if let Some(record) = app.selected_record() {
        app.dialog = Some(Dialog::ConfirmDelete {
            target: record.id.clone(),
            name: record.name.clone(),
            confirm: false,
        });
    }
}

pub fn cancel_delete(app: &mut AppState) {
    app.dialog = None;
}

/// Close the prompt and send the delete.
pub fn confirm_delete(app: &mut AppState) -> Option<Job> {
    match app.dialog.take() {
        Some(Dialog::ConfirmDelete { target, .. }) => dispatch(app, Job::Delete(target)),
        other => {
            app.dialog = other;
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{Record, RecordId, RecordInput};

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn type_text(app: &mut AppState, text: &str) {
        for c in text.chars() {
            assert!(handle_key(app, press(KeyCode::Char(c))).is_none());
        }
    }

    fn alice() -> Record {
        Record {
            id: RecordId::new("1"),
            name: "Alice".to_string(),
            avatar: "http://x/a.png".to_string(),
        }
    }

    fn loaded(records: Vec<Record>) -> AppState {
        let mut app = AppState::default();
        assert_eq!(initial_fetch(&mut app), Some(Job::List));
        assert!(handle_outcome(&mut app, Outcome::Listed(Ok(records))).is_none());
        app
    }

    #[test]
    fn starts_loading_and_first_fetch_clears_it() {
        let mut app = AppState::default();
        assert!(app.loading);
        let job = initial_fetch(&mut app);
        assert_eq!(job, Some(Job::List));
        handle_outcome(&mut app, Outcome::Listed(Ok(vec![alice()])));
        assert!(!app.loading);
        assert_eq!(app.visible, vec![alice()]);
    }

    #[test]
    fn failed_fetch_keeps_previous_records() {
        let mut app = loaded(vec![alice()]);
        assert_eq!(dispatch(&mut app, Job::List), Some(Job::List));
        assert!(app.loading);
        handle_outcome(
            &mut app,
            Outcome::Listed(Err(ApiError::Transport("offline".to_string()))),
        );
        assert!(!app.loading);
        assert_eq!(app.records, vec![alice()]);
        assert_eq!(app.visible, vec![alice()]);
    }

    #[test]
    fn keys_are_ignored_while_loading() {
        let mut app = AppState::default();
        initial_fetch(&mut app);
        assert!(handle_key(&mut app, press(KeyCode::Char('n'))).is_none());
        assert_eq!(app.form, FormState::Closed);
        handle_key(&mut app, press(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn search_keystrokes_filter_live() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('/')));
        assert_eq!(app.input_mode, InputMode::Search);
        type_text(&mut app, "bob");
        assert!(app.visible.is_empty());
        for _ in 0..3 {
            handle_key(&mut app, press(KeyCode::Backspace));
        }
        assert_eq!(app.visible, vec![alice()]);
    }

    #[test]
    fn escape_in_search_clears_the_query() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('/')));
        type_text(&mut app, "zz");
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.search_query, "");
        assert_eq!(app.visible.len(), 1);
        assert_eq!(app.input_mode, InputMode::Normal);
    }

    #[test]
    fn resync_keeps_the_current_filter() {
        let mut app = loaded(vec![alice()]);
        set_search(&mut app, "ali".to_string());
        let bob = Record {
            id: RecordId::new("2"),
            name: "Bob".to_string(),
            avatar: "http://x/b.png".to_string(),
        };
        dispatch(&mut app, Job::List);
        handle_outcome(&mut app, Outcome::Listed(Ok(vec![alice(), bob])));
        assert_eq!(app.records.len(), 2);
        assert_eq!(app.visible, vec![alice()]);
    }

    #[test]
    fn create_flow_posts_then_resyncs() {
        let mut app = loaded(vec![]);
        handle_key(&mut app, press(KeyCode::Char('n')));
        assert!(matches!(app.form, FormState::Creating(_)));
        type_text(&mut app, "Carol");
        handle_key(&mut app, press(KeyCode::Tab));
        type_text(&mut app, "http://x/c.png");

        let job = handle_key(&mut app, press(KeyCode::Enter));
        let expected = Job::Create(RecordInput::new("Carol", "http://x/c.png"));
        assert_eq!(job, Some(expected.clone()));
        assert!(app.form.is_open());

        let next = handle_outcome(&mut app, Outcome::Mutated(expected, Ok(())));
        assert_eq!(next, Some(Job::List));
        assert_eq!(app.form, FormState::Closed);
        assert!(app.loading);
    }

    #[test]
    fn empty_submit_alerts_and_keeps_form() {
        let mut app = loaded(vec![]);
        handle_key(&mut app, press(KeyCode::Char('n')));
        assert!(handle_key(&mut app, press(KeyCode::Enter)).is_none());
        assert!(matches!(app.dialog, Some(Dialog::Alert { .. })));
        assert!(app.form.is_open());
        assert!(app.in_flight.is_none());

        handle_key(&mut app, press(KeyCode::Enter));
        assert!(app.dialog.is_none());
        assert!(app.form.is_open());
    }

    #[test]
    fn edit_prefills_and_submits_update() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('e')));
        let fields = app.form.fields().unwrap();
        assert_eq!(fields.name, "Alice");
        assert_eq!(fields.avatar, "http://x/a.png");
        assert_eq!(app.form.edit_target(), Some(&RecordId::new("1")));

        type_text(&mut app, "!");
        let job = submit_form(&mut app);
        assert_eq!(
            job,
            Some(Job::Update(
                RecordId::new("1"),
                RecordInput::new("Alice!", "http://x/a.png")
            ))
        );
    }

    #[test]
    fn edit_replaces_an_open_create_form() {
        let mut app = loaded(vec![alice()]);
        open_create(&mut app);
        begin_edit(&mut app, &alice());
        assert_eq!(app.form.edit_target(), Some(&RecordId::new("1")));
    }

    #[test]
    fn cancel_discards_target_and_fields() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('e')));
        handle_key(&mut app, press(KeyCode::Esc));
        assert_eq!(app.form, FormState::Closed);
        handle_key(&mut app, press(KeyCode::Char('n')));
        assert_eq!(app.form, FormState::Creating(FormFields::default()));
    }

    #[test]
    fn failed_mutation_leaves_form_open() {
        let mut app = loaded(vec![]);
        open_create(&mut app);
        if let Some(f) = app.form.fields_mut() {
            f.name = "Carol".to_string();
            f.avatar = "http://x/c.png".to_string();
        }
        let job = submit_form(&mut app).unwrap();
        let next = handle_outcome(
            &mut app,
            Outcome::Mutated(job, Err(ApiError::Transport("timed out".to_string()))),
        );
        assert!(next.is_none());
        assert!(app.form.is_open());
        assert!(!app.is_busy());
    }

    #[test]
    fn rejected_mutation_closes_form_and_resyncs() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('e')));
        let job = submit_form(&mut app).unwrap();
        let rejected = ApiError::Status {
            status: 404,
            body: "\"Not found\"".to_string(),
        };
        let next = handle_outcome(&mut app, Outcome::Mutated(job, Err(rejected)));
        assert_eq!(next, Some(Job::List));
        assert_eq!(app.form, FormState::Closed);
        assert!(app.loading);
    }

    #[test]
    fn rejected_delete_still_resyncs() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('d')));
        let job = handle_key(&mut app, press(KeyCode::Char('y'))).unwrap();
        let rejected = ApiError::Status {
            status: 500,
            body: String::new(),
        };
        let next = handle_outcome(&mut app, Outcome::Mutated(job, Err(rejected)));
        assert_eq!(next, Some(Job::List));
    }

    #[test]
    fn delete_prompt_refused_while_busy() {
        let bob = Record {
            id: RecordId::new("2"),
            name: "Bob".to_string(),
            avatar: "http://x/b.png".to_string(),
        };
        let mut app = loaded(vec![alice(), bob]);
        handle_key(&mut app, press(KeyCode::Char('d')));
        assert!(handle_key(&mut app, press(KeyCode::Char('y'))).is_some());
        handle_key(&mut app, press(KeyCode::Down));
        handle_key(&mut app, press(KeyCode::Char('d')));
        assert!(app.dialog.is_none());
    }

    #[test]
    fn double_submit_sends_once() {
        let mut app = loaded(vec![]);
        open_create(&mut app);
        if let Some(f) = app.form.fields_mut() {
            f.name = "Carol".to_string();
            f.avatar = "http://x/c.png".to_string();
        }
        assert!(submit_form(&mut app).is_some());
        assert!(submit_form(&mut app).is_none());
    }

    #[test]
    fn delete_cancel_sends_nothing() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Char('d')));
        assert!(matches!(app.dialog, Some(Dialog::ConfirmDelete { confirm: false, .. })));
        assert!(handle_key(&mut app, press(KeyCode::Enter)).is_none());
        assert!(app.dialog.is_none());
        assert_eq!(app.visible, vec![alice()]);
    }

    #[test]
    fn delete_confirm_sends_and_resyncs() {
        let mut app = loaded(vec![alice()]);
        handle_key(&mut app, press(KeyCode::Delete));
        handle_key(&mut app, press(KeyCode::Right));
        let job = handle_key(&mut app, press(KeyCode::Enter));
        assert_eq!(job, Some(Job::Delete(RecordId::new("1"))));
        assert!(app.dialog.is_none());
        let next = handle_outcome(
            &mut app,
            Outcome::Mutated(Job::Delete(RecordId::new("1")), Ok(())),
        );
        assert_eq!(next, Some(Job::List));
    }

    #[test]
    fn delete_on_empty_list_does_nothing() {
        let mut app = loaded(vec![]);
        request_delete(&mut app);
        assert!(app.dialog.is_none());
    }
}
