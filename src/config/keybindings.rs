//! Keybinding configuration for the TUI.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::Deserialize;

use crate::tui::event::Action;

/// Key lists per action. Earlier entries in [`KeybindingConfig::get_action`]
/// win when two actions share a key.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct KeybindingConfig {
    pub quit: Vec<String>,
    pub like: Vec<String>,
    pub skip: Vec<String>,
    pub deep_dive: Vec<String>,
    pub back: Vec<String>,
    pub toggle_view: Vec<String>,
    pub toggle_save: Vec<String>,
    pub open_in_browser: Vec<String>,
    pub retry: Vec<String>,
    pub move_up: Vec<String>,
    pub move_down: Vec<String>,
    pub next_page: Vec<String>,
    pub prev_page: Vec<String>,
    pub remove_saved: Vec<String>,
    pub search: Vec<String>,
}

fn keys(list: &[&str]) -> Vec<String> {
    list.iter().map(|k| k.to_string()).collect()
}

impl Default for KeybindingConfig {
    fn default() -> Self {
        Self {
            quit: keys(&["q", "Ctrl+c"]),
            like: keys(&["Right", "l"]),
            skip: keys(&["Left", "h"]),
            deep_dive: keys(&["Down", "Enter"]),
            back: keys(&["Esc", "Backspace"]),
            toggle_view: keys(&["Tab"]),
            toggle_save: keys(&["s"]),
            open_in_browser: keys(&["o"]),
            retry: keys(&["r"]),
            move_up: keys(&["k", "Up"]),
            move_down: keys(&["j"]),
            next_page: keys(&["n", "PageDown"]),
            prev_page: keys(&["p", "PageUp"]),
            remove_saved: keys(&["d", "Delete"]),
            search: keys(&["/"]),
        }
    }
}

impl KeybindingConfig {
    /// Get the action for a key event.
    pub fn get_action(&self, key: &KeyEvent) -> Action {
        let table: [(&[String], Action); 15] = [
            (&self.quit, Action::Quit),
            (&self.like, Action::Like),
            (&self.skip, Action::Skip),
            (&self.deep_dive, Action::DeepDive),
            (&self.back, Action::Back),
            (&self.toggle_view, Action::ToggleView),
            (&self.toggle_save, Action::ToggleSave),
            (&self.open_in_browser, Action::OpenInBrowser),
            (&self.retry, Action::Retry),
            (&self.move_up, Action::MoveUp),
            (&self.move_down, Action::MoveDown),
            (&self.next_page, Action::NextPage),
            (&self.prev_page, Action::PrevPage),
            (&self.remove_saved, Action::RemoveSaved),
            (&self.search, Action::Search),
        ];

        table
            .iter()
            .find(|(bindings, _)| matches_key(key, bindings))
            .map(|(_, action)| *action)
            .unwrap_or(Action::None)
    }
}

fn matches_key(key: &KeyEvent, bindings: &[String]) -> bool {
    bindings
        .iter()
        .filter_map(|binding| parse_key_string(binding).ok())
        .any(|parsed| parsed.matches(key))
}

/// A parsed key binding with code and modifiers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    /// Shift is ignored unless the binding asks for it, so "S" matches a
    /// shifted key press.
    pub fn matches(&self, key: &KeyEvent) -> bool {
        self.code == key.code
            && (key.modifiers == self.modifiers
                || key.modifiers.difference(KeyModifiers::SHIFT) == self.modifiers)
    }
}

/// Parse "a", "/", "Enter", "Right", "F5", "Space", optionally prefixed by
/// "Ctrl+", "Alt+" or "Shift+".
pub fn parse_key_string(s: &str) -> Result<KeyBinding, String> {
    let s = s.trim();
    let (prefix, key) = match s.rsplit_once('+') {
        // A lone "+" is the plus key itself.
        Some((prefix, key)) if !key.is_empty() => (Some(prefix), key),
        _ => (None, s),
    };

    let mut modifiers = KeyModifiers::NONE;
    for part in prefix.into_iter().flat_map(|p| p.split('+')) {
        modifiers |= match part.to_lowercase().as_str() {
            "ctrl" | "control" => KeyModifiers::CONTROL,
            "shift" => KeyModifiers::SHIFT,
            "alt" => KeyModifiers::ALT,
            _ => return Err(format!("Unknown modifier: {}", part)),
        };
    }

    Ok(KeyBinding {
        code: parse_key_code(key)?,
        modifiers,
    })
}

fn parse_key_code(s: &str) -> Result<KeyCode, String> {
    let mut chars = s.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        return Ok(KeyCode::Char(c));
    }

    let lower = s.to_lowercase();
    if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
        if (1..=12).contains(&n) {
            return Ok(KeyCode::F(n));
        }
    }

    let code = match lower.as_str() {
        "enter" | "return" => KeyCode::Enter,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "backspace" | "bs" => KeyCode::Backspace,
        "delete" | "del" => KeyCode::Delete,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" | "pgup" => KeyCode::PageUp,
        "pagedown" | "pgdn" => KeyCode::PageDown,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "esc" | "escape" => KeyCode::Esc,
        "space" => KeyCode::Char(' '),
        _ => return Err(format!("Unknown key: {}", s)),
    };
    Ok(code)
}
