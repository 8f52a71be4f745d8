//! Main-screen key bindings, loaded from `keybinds.conf` on top of built-in defaults.
//!
//! This module covers:
//! - The semantic actions available on the records screen
//! - A default binding set that works without any config file
//! - Reading and writing `keybinds.conf` so users can rebind keys
//! - Resolving key presses to actions and formatting keys for the help modal
//!
//! Only the main screen goes through the keymap. Text inputs (search box,
//! form fields) and dialogs take raw keys.

use std::collections::HashMap;
use std::path::Path;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic actions on the main screen.
///
/// Several keys may map to the same action, e.g. both `j` and Down move the
/// selection down.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Leave userdeck.
    Quit,
    /// Focus the search box.
    StartSearch,
    /// Open the form to create a record.
    NewRecord,
    /// Open the form on the selected record.
    EditSelection,
    /// Ask to delete the selected record.
    DeleteSelection,
    /// Select the previous card.
    MoveUp,
    /// Select the next card.
    MoveDown,
    /// Jump one page of cards up.
    PageUp,
    /// Jump one page of cards down.
    PageDown,
    /// Show the key reference.
    OpenHelp,
    /// Swallow the key.
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 11] = [
    KeyAction::Quit,
    KeyAction::StartSearch,
    KeyAction::NewRecord,
    KeyAction::EditSelection,
    KeyAction::DeleteSelection,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::PageUp,
    KeyAction::PageDown,
    KeyAction::OpenHelp,
    KeyAction::Ignore,
];

/// Mapping from `(KeyModifiers, KeyCode)` to [`KeyAction`].
///
/// Starts from [`Keymap::new_defaults`]; lines in `keybinds.conf` add or
/// replace individual bindings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
    /// One action per key combination.
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Create a keymap with the built-in bindings.
    ///
    /// Includes:
    /// - `q` and Ctrl+c to quit, `/` to search, `?` for help
    /// - `n`/`+` to add, `e`/Enter to edit, `d`/Delete to delete
    /// - Arrow keys and `j`/`k` to move, PageUp/PageDown to page
    /// - Esc bound to [`KeyAction::Ignore`] so it never falls through
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewRecord);
        bindings.insert((M::NONE, Char('+')), KeyAction::NewRecord);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditSelection);
        bindings.insert((M::NONE, Enter), KeyAction::EditSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);
        Self { bindings }
    }

    /// Load a keymap file, or write the defaults there if it does not exist yet.
    ///
    /// An unreadable file falls back to the defaults. A failed write is only
    /// logged; the defaults are still returned.
    ///
    /// # Arguments
    ///
    /// * `path` - Location of `keybinds.conf`.
    ///
    /// # Returns
    ///
    /// The keymap to use for this session.
    pub fn load_or_init(path: &Path) -> Self {
        if path.exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "could not write default keybindings"
            );
        }
        km
    }

    /// Defaults overridden by `<Action> = <KeySpec>` lines from `path`.
    ///
    /// Blank lines and `#` comments are skipped; lines that do not parse are
    /// logged and ignored.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the keymap configuration file.
    ///
    /// # Returns
    ///
    /// `Some(keymap)` if the file could be read; `None` otherwise.
    pub fn from_file(path: &Path) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            // KeySpec may itself be "=" so split on the first one only.
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            match (parse_action(lhs), parse_key(rhs)) {
                (Some(action), Some(key)) => {
                    map.bindings.insert(key, action);
                }
                _ => tracing::warn!(line, "ignoring unparsable keybinding"),
            }
        }
        map
    }

    /// Write every binding to `path` as sorted `<Action> = <KeySpec>` lines.
    ///
    /// A comment header lists the accepted key names and actions.
    ///
    /// # Arguments
    ///
    /// * `path` - Where the keymap will be written.
    ///
    /// # Returns
    ///
    /// `std::io::Result<()>` indicating success or failure of the write.
    pub fn write_file(&self, path: &Path) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdeck keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Enter, Esc, Up, Down, PageUp, PageDown,\n");
        buf.push_str("#   Delete, /, +\n");
        buf.push_str("# Actions: Quit, StartSearch, NewRecord, EditSelection, DeleteSelection,\n");
        buf.push_str("#   MoveUp, MoveDown, PageUp, PageDown, OpenHelp, Ignore\n\n");

        let mut lines: Vec<String> = self
            .all_bindings()
            .into_iter()
            .map(|((mods, code), action)| {
                format!("{} = {}", format_action(action), Self::format_key(mods, code))
            })
            .collect();
        lines.sort();
        for line in lines {
            let _ = writeln!(&mut buf, "{line}");
        }

        std::fs::write(path, buf)
    }

    /// Resolve a key event. Shifted characters fall back to the unshifted binding
    /// because terminals disagree on whether `?` or `+` carry SHIFT.
    ///
    /// # Arguments
    ///
    /// * `key` - The key event read from the terminal.
    ///
    /// # Returns
    ///
    /// `Some(action)` if the key is bound; `None` otherwise.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        if let Some(action) = self.bindings.get(&(key.modifiers, key.code)) {
            return Some(*action);
        }
        if key.modifiers == KeyModifiers::SHIFT && matches!(key.code, KeyCode::Char(_)) {
            return self.bindings.get(&(KeyModifiers::NONE, key.code)).copied();
        }
        None
    }

    /// All bindings as `((modifiers, code), action)` pairs, in no particular order.
    pub fn all_bindings(&self) -> Vec<((KeyModifiers, KeyCode), KeyAction)> {
        self.bindings.iter().map(|(k, v)| (*k, *v)).collect()
    }

    /// Keys bound to `action`, formatted and sorted, for the help screen.
    ///
    /// # Arguments
    ///
    /// * `action` - The action to look up.
    ///
    /// # Returns
    ///
    /// Display strings such as `"Enter"` or `"e"`; empty if nothing is bound.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((mods, code), _)| Self::format_key(*mods, *code))
            .collect();
        keys.sort();
        keys
    }

    /// Format a key (modifiers + code) into text like "Ctrl+c" or "PageUp".
    ///
    /// The output is accepted back by the `keybinds.conf` parser.
    ///
    /// # Arguments
    ///
    /// * `mods` - Modifier keys; only Ctrl is rendered.
    /// * `code` - The key code.
    ///
    /// # Returns
    ///
    /// A human-readable key string.
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

/// Parse a KeySpec such as `q`, `Ctrl+x` or `PageDown`.
fn parse_key(text: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = text.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) if !after.is_empty() => (KeyModifiers::CONTROL, after),
        _ => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

/// Look an action up by its config-file name.
fn parse_action(s: &str) -> Option<KeyAction> {
    ALL_ACTIONS
        .into_iter()
        .find(|a| format_action(*a) == s.trim())
}

/// Config-file and help-screen name of an action.
///
/// # Arguments
///
/// * `a` - The action to name.
///
/// # Returns
///
/// A static string like `"DeleteSelection"`.
pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::NewRecord => "NewRecord",
        KeyAction::EditSelection => "EditSelection",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PageUp => "PageUp",
        KeyAction::PageDown => "PageDown",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::Ignore => "Ignore",
    }
}
