//! Application state types and entry glue.
//!
//! Defines the view state of the records screen, the form and dialog state
//! machines, and re-exports the event loop as `run`.
//!
pub mod keymap;
pub mod update;
pub mod worker;

use ratatui::style::Color;
use std::path::Path;
use std::time::Instant;

use crate::api::{Record, RecordId, RecordInput};
use crate::error::ApiError;

/// Current input mode for key handling on the main screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub card_bg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub accent: Color,
    pub edit: Color,
    pub danger: Color,
}

impl Theme {
    /// Light sky-blue screen with white cards.
    pub fn sky() -> Self {
        Self {
            background: Color::Rgb(0x00, 0xbf, 0xff), // deepskyblue
            text: Color::Rgb(0x33, 0x33, 0x33),
            muted: Color::Rgb(0x77, 0x77, 0x77),
            title: Color::Rgb(0xff, 0xff, 0xff),
            border: Color::Rgb(0xcc, 0xcc, 0xcc),
            card_bg: Color::Rgb(0xff, 0xff, 0xff),
            status_bg: Color::Rgb(0x00, 0x7b, 0xff),
            status_fg: Color::Rgb(0xff, 0xff, 0xff),
            highlight_fg: Color::Rgb(0x00, 0x7b, 0xff),
            accent: Color::Rgb(0x00, 0x7b, 0xff),
            edit: Color::Rgb(0x28, 0xa7, 0x45),
            danger: Color::Rgb(0xdc, 0x35, 0x45),
        }
    }

    /// Terminal-default background for dark terminals.
    pub fn dark() -> Self {
        Self {
            background: Color::Reset,
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            card_bg: Color::Reset,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            accent: Color::Cyan,
            edit: Color::Green,
            danger: Color::Red,
        }
    }

    /// Load theme from a simple key=value file. A `preset` key picks the base
    /// palette (`sky` or `dark`); other keys override single colors.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        let mut theme = Self::sky();
        let mut overrides = Vec::new();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut parts = line.splitn(2, '=');
            let key = parts.next().map(|s| s.trim()).unwrap_or("");
            let val = parts.next().map(|s| s.trim()).unwrap_or("");
            if key.is_empty() || val.is_empty() {
                continue;
            }
            if key == "preset" {
                match val.to_ascii_lowercase().as_str() {
                    "dark" => theme = Self::dark(),
                    "sky" => theme = Self::sky(),
                    other => tracing::warn!(preset = other, "unknown theme preset"),
                }
                continue;
            }
            if let Some(color) = Self::parse_color(val) {
                overrides.push((key.to_string(), color));
            }
        }

        for (key, color) in overrides {
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "card_bg" => theme.card_bg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "accent" => theme.accent = color,
                "edit" => theme.edit = color,
                "danger" => theme.danger = color,
                _ => {}
            }
        }
        theme
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or special names: "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Some(Color::Rgb(r, g, b));
            }
        }
        None
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdeck theme configuration\n");
        buf.push_str("# preset = sky | dark, then per-key overrides\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#008000".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::White => "#FFFFFF".to_string(),
                _ => "reset".to_string(),
            }
        }

        let mut kv = |k: &str, v: Color| {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        };

        kv("background", self.background);
        kv("text", self.text);
        kv("muted", self.muted);
        kv("title", self.title);
        kv("border", self.border);
        kv("card_bg", self.card_bg);
        kv("status_bg", self.status_bg);
        kv("status_fg", self.status_fg);
        kv("highlight_fg", self.highlight_fg);
        kv("accent", self.accent);
        kv("edit", self.edit);
        kv("danger", self.danger);

        std::fs::write(path, buf)
    }

    /// Load the theme file, writing the default palette first if it is missing.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_else(Self::sky);
        }
        let t = Self::sky();
        if let Err(e) = t.write_file(path) {
            tracing::warn!(path = %path.display(), error = %e, "could not write default theme");
        }
        t
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::sky()
    }
}

/// Which element of the form has the cursor.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum FormFocus {
    #[default]
    Name,
    Avatar,
    Submit,
    Cancel,
}

impl FormFocus {
    pub fn next(self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Avatar,
            FormFocus::Avatar => FormFocus::Submit,
            FormFocus::Submit => FormFocus::Cancel,
            FormFocus::Cancel => FormFocus::Name,
        }
    }

    pub fn prev(self) -> Self {
        match self {
            FormFocus::Name => FormFocus::Cancel,
            FormFocus::Avatar => FormFocus::Name,
            FormFocus::Submit => FormFocus::Avatar,
            FormFocus::Cancel => FormFocus::Submit,
        }
    }
}

/// Text typed into the form.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct FormFields {
    pub name: String,
    pub avatar: String,
    pub focus: FormFocus,
}

impl FormFields {
    pub fn from_record(record: &Record) -> Self {
        Self {
            name: record.name.clone(),
            avatar: record.avatar.clone(),
            focus: FormFocus::Name,
        }
    }

    /// Both fields must be non-empty before anything is sent.
    pub fn to_input(&self) -> Option<RecordInput> {
        if self.name.is_empty() || self.avatar.is_empty() {
            return None;
        }
        Some(RecordInput::new(self.name.clone(), self.avatar.clone()))
    }
}

/// The editor modal. The edit target only exists while editing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum FormState {
    #[default]
    Closed,
    Creating(FormFields),
    Editing {
        target: RecordId,
        fields: FormFields,
    },
}

impl FormState {
    pub fn is_open(&self) -> bool {
        !matches!(self, FormState::Closed)
    }

    pub fn fields(&self) -> Option<&FormFields> {
        match self {
            FormState::Closed => None,
            FormState::Creating(fields) | FormState::Editing { fields, .. } => Some(fields),
        }
    }

    pub fn fields_mut(&mut self) -> Option<&mut FormFields> {
        match self {
            FormState::Closed => None,
            FormState::Creating(fields) | FormState::Editing { fields, .. } => Some(fields),
        }
    }

    pub fn edit_target(&self) -> Option<&RecordId> {
        match self {
            FormState::Editing { target, .. } => Some(target),
            _ => None,
        }
    }
}

/// Blocking dialogs drawn above everything else.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dialog {
    Alert {
        title: String,
        message: String,
    },
    /// `confirm` is true while the "Delete" choice is highlighted.
    ConfirmDelete {
        target: RecordId,
        name: String,
        confirm: bool,
    },
}

/// A network operation handed to the worker.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Job {
    List,
    Create(RecordInput),
    Update(RecordId, RecordInput),
    Delete(RecordId),
}

impl Job {
    pub fn label(&self) -> &'static str {
        match self {
            Job::List => "loading",
            Job::Create(_) => "creating",
            Job::Update(..) => "updating",
            Job::Delete(_) => "deleting",
        }
    }
}

/// Result of a finished job, fed back into the state machine.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    Listed(Result<Vec<Record>, ApiError>),
    Mutated(Job, Result<(), ApiError>),
}

pub struct AppState {
    pub started_at: Instant,
    /// Last fetched snapshot, replaced wholesale on every list fetch.
    pub records: Vec<Record>,
    /// `records` filtered by `search_query`.
    pub visible: Vec<Record>,
    pub loading: bool,
    pub selected: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    pub search_query: String,
    pub form: FormState,
    pub dialog: Option<Dialog>,
    pub in_flight: Option<Job>,
    pub show_help: bool,
    pub should_quit: bool,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
}

impl AppState {
    /// Fresh state: nothing fetched yet and the loading screen up.
    pub fn new(theme: Theme, keymap: keymap::Keymap) -> Self {
        Self {
            started_at: Instant::now(),
            records: Vec::new(),
            visible: Vec::new(),
            loading: true,
            selected: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            search_query: String::new(),
            form: FormState::Closed,
            dialog: None,
            in_flight: None,
            show_help: false,
            should_quit: false,
            theme,
            keymap,
        }
    }

    pub fn selected_record(&self) -> Option<&Record> {
        self.visible.get(self.selected)
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Theme::default(), keymap::Keymap::default())
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preset_then_overrides() {
        let t = Theme::parse("# comment\npreset = dark\ntitle = #112233\nbogus = #000000\n");
        assert_eq!(t.title, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(t.text, Theme::dark().text);
    }

    #[test]
    fn overrides_win_regardless_of_order() {
        let t = Theme::parse("accent = 010203\npreset = dark\n");
        assert_eq!(t.accent, Color::Rgb(1, 2, 3));
    }

    #[test]
    fn bad_colors_are_skipped() {
        let t = Theme::parse("text = #GGHHII\nborder = reset\n");
        assert_eq!(t.text, Theme::sky().text);
        assert_eq!(t.border, Color::Reset);
    }

    #[test]
    fn focus_cycles_both_ways() {
        let mut f = FormFocus::Name;
        for _ in 0..4 {
            f = f.next();
        }
        assert_eq!(f, FormFocus::Name);
        assert_eq!(FormFocus::Name.prev(), FormFocus::Cancel);
    }

    #[test]
    fn fields_require_name_and_avatar() {
        let mut fields = FormFields::default();
        assert!(fields.to_input().is_none());
        fields.name = "Eve".to_string();
        assert!(fields.to_input().is_none());
        fields.avatar = "http://x/e.png".to_string();
        assert_eq!(
            fields.to_input(),
            Some(RecordInput::new("Eve", "http://x/e.png"))
        );
    }
}
