//! Grid actions and the key bindings that trigger them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::str::FromStr;

use super::schema::CustomKeyBinding;

/// Everything a key can do while the grid is navigating (not editing).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    // Navigation
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    MoveToTop,
    MoveToBottom,
    MoveToStart,
    MoveToEnd,
    PageUp,
    PageDown,

    // Selection
    GridSelectAll,
    CollapseSelection,

    // Cell actions
    EditCell,
    CopySelection,
    AddWhereClause,

    // Application
    Quit,
}

impl Action {
    pub const ALL: [Action; 16] = [
        Action::MoveUp,
        Action::MoveDown,
        Action::MoveLeft,
        Action::MoveRight,
        Action::MoveToTop,
        Action::MoveToBottom,
        Action::MoveToStart,
        Action::MoveToEnd,
        Action::PageUp,
        Action::PageDown,
        Action::GridSelectAll,
        Action::CollapseSelection,
        Action::EditCell,
        Action::CopySelection,
        Action::AddWhereClause,
        Action::Quit,
    ];

    /// Get the default description for this action
    pub fn description(&self) -> &'static str {
        match self {
            Action::MoveUp => "Move cursor up",
            Action::MoveDown => "Move cursor down",
            Action::MoveLeft => "Move cursor left",
            Action::MoveRight => "Move cursor right",
            Action::MoveToTop => "Move to first row",
            Action::MoveToBottom => "Move to last row",
            Action::MoveToStart => "Move to first column",
            Action::MoveToEnd => "Move to last column",
            Action::PageUp => "Page up",
            Action::PageDown => "Page down",
            Action::GridSelectAll => "Select all cells",
            Action::CollapseSelection => "Collapse selection to the focused cell",
            Action::EditCell => "Edit cell",
            Action::CopySelection => "Copy selection",
            Action::AddWhereClause => "Filter query by the focused cell",
            Action::Quit => "Quit",
        }
    }

    /// Movement actions grow the selection instead when Shift is held.
    pub fn is_movement(&self) -> bool {
        matches!(
            self,
            Action::MoveUp
                | Action::MoveDown
                | Action::MoveLeft
                | Action::MoveRight
                | Action::MoveToTop
                | Action::MoveToBottom
                | Action::MoveToStart
                | Action::MoveToEnd
                | Action::PageUp
                | Action::PageDown
        )
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");

        match normalized.as_str() {
            "move_up" => Ok(Action::MoveUp),
            "move_down" => Ok(Action::MoveDown),
            "move_left" => Ok(Action::MoveLeft),
            "move_right" => Ok(Action::MoveRight),
            "move_to_top" => Ok(Action::MoveToTop),
            "move_to_bottom" => Ok(Action::MoveToBottom),
            "move_to_start" => Ok(Action::MoveToStart),
            "move_to_end" => Ok(Action::MoveToEnd),
            "page_up" => Ok(Action::PageUp),
            "page_down" => Ok(Action::PageDown),

            "grid_select_all" | "select_all" => Ok(Action::GridSelectAll),
            "collapse_selection" => Ok(Action::CollapseSelection),

            "edit_cell" => Ok(Action::EditCell),
            "copy_selection" | "copy" => Ok(Action::CopySelection),
            "add_where_clause" | "filter_by_cell" => Ok(Action::AddWhereClause),

            "quit" => Ok(Action::Quit),

            _ => Err(format!("Unknown action: {}", s)),
        }
    }
}

/// Represents a key binding (key + modifiers)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyBinding {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl KeyBinding {
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Parse a key binding from a string like "ctrl+c", "f2", "super+;"
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim().to_lowercase();
        let parts: Vec<&str> = s.split('+').collect();

        let mut modifiers = KeyModifiers::NONE;
        let key_part = if parts.len() == 1 {
            parts[0]
        } else {
            for part in &parts[..parts.len() - 1] {
                match *part {
                    "ctrl" | "control" => modifiers |= KeyModifiers::CONTROL,
                    "alt" | "meta" | "option" => modifiers |= KeyModifiers::ALT,
                    "shift" => modifiers |= KeyModifiers::SHIFT,
                    "super" | "cmd" | "command" => modifiers |= KeyModifiers::SUPER,
                    _ => return None,
                }
            }
            parts[parts.len() - 1]
        };

        let code = match key_part {
            "enter" | "return" => KeyCode::Enter,
            "tab" => KeyCode::Tab,
            "backspace" | "bs" => KeyCode::Backspace,
            "delete" | "del" => KeyCode::Delete,
            "esc" | "escape" => KeyCode::Esc,
            "space" => KeyCode::Char(' '),
            "up" => KeyCode::Up,
            "down" => KeyCode::Down,
            "left" => KeyCode::Left,
            "right" => KeyCode::Right,
            "home" => KeyCode::Home,
            "end" => KeyCode::End,
            "pageup" | "pgup" => KeyCode::PageUp,
            "pagedown" | "pgdn" => KeyCode::PageDown,
            f if f.len() >= 2 && f.starts_with('f') => {
                let n: u8 = f[1..].parse().ok()?;
                if !(1..=12).contains(&n) {
                    return None;
                }
                KeyCode::F(n)
            }
            s => {
                let mut chars = s.chars();
                let ch = chars.next()?;
                if chars.next().is_some() {
                    return None;
                }
                KeyCode::Char(ch)
            }
        };

        Some(Self { code, modifiers })
    }
}

impl std::fmt::Display for KeyBinding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        if self.modifiers.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SUPER) {
            parts.push("Super".to_string());
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.modifiers.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }

        let key = match self.code {
            KeyCode::Enter => "Enter".to_string(),
            KeyCode::Tab => "Tab".to_string(),
            KeyCode::Backspace => "Backspace".to_string(),
            KeyCode::Delete => "Delete".to_string(),
            KeyCode::Esc => "Esc".to_string(),
            KeyCode::Up => "↑".to_string(),
            KeyCode::Down => "↓".to_string(),
            KeyCode::Left => "←".to_string(),
            KeyCode::Right => "→".to_string(),
            KeyCode::Home => "Home".to_string(),
            KeyCode::End => "End".to_string(),
            KeyCode::PageUp => "PgUp".to_string(),
            KeyCode::PageDown => "PgDn".to_string(),
            KeyCode::F(n) => format!("F{}", n),
            KeyCode::Char(' ') => "Space".to_string(),
            KeyCode::Char(c) => c.to_uppercase().to_string(),
            _ => "?".to_string(),
        };

        parts.push(key);
        write!(f, "{}", parts.join("+"))
    }
}

impl From<KeyEvent> for KeyBinding {
    fn from(event: KeyEvent) -> Self {
        Self {
            code: event.code,
            modifiers: event.modifiers,
        }
    }
}

/// A keymap is a collection of key bindings mapped to actions
#[derive(Debug, Clone, Default)]
pub struct Keymap {
    bindings: HashMap<KeyBinding, Action>,
}

impl Keymap {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn bind(&mut self, key: KeyBinding, action: Action) {
        self.bindings.insert(key, action);
    }

    pub fn unbind(&mut self, key: &KeyBinding) {
        self.bindings.remove(key);
    }

    pub fn get(&self, key: &KeyBinding) -> Option<&Action> {
        self.bindings.get(key)
    }

    /// Look up an action for a KeyEvent
    pub fn get_action(&self, event: &KeyEvent) -> Option<Action> {
        let binding = KeyBinding::from(*event);
        self.bindings.get(&binding).copied()
    }

    /// Keys bound to `action`, sorted for stable display.
    pub fn keys_for(&self, action: Action) -> Vec<KeyBinding> {
        let mut keys: Vec<KeyBinding> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|(k, _)| *k)
            .collect();
        keys.sort_by_key(|k| k.to_string());
        keys
    }

    /// Applies user bindings on top of this keymap. Entries with an unknown
    /// key or action are skipped and returned as warnings.
    pub fn apply_custom(&mut self, custom: &[CustomKeyBinding]) -> Vec<String> {
        let mut warnings = Vec::new();
        for entry in custom {
            let Some(key) = KeyBinding::parse(&entry.key) else {
                warnings.push(format!("Invalid key '{}' in keymap", entry.key));
                continue;
            };
            match entry.action.parse::<Action>() {
                Ok(action) => self.bind(key, action),
                Err(e) => warnings.push(e),
            }
        }
        warnings
    }

    /// Create the default keymap for grid navigation
    pub fn default_grid_keymap() -> Self {
        let mut km = Self::new();

        // Arrow keys
        km.bind(
            KeyBinding::new(KeyCode::Left, KeyModifiers::NONE),
            Action::MoveLeft,
        );
        km.bind(
            KeyBinding::new(KeyCode::Down, KeyModifiers::NONE),
            Action::MoveDown,
        );
        km.bind(
            KeyBinding::new(KeyCode::Up, KeyModifiers::NONE),
            Action::MoveUp,
        );
        km.bind(
            KeyBinding::new(KeyCode::Right, KeyModifiers::NONE),
            Action::MoveRight,
        );

        // Vim-style navigation
        km.bind(
            KeyBinding::new(KeyCode::Char('h'), KeyModifiers::NONE),
            Action::MoveLeft,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('j'), KeyModifiers::NONE),
            Action::MoveDown,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('k'), KeyModifiers::NONE),
            Action::MoveUp,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('l'), KeyModifiers::NONE),
            Action::MoveRight,
        );

        // Page navigation
        km.bind(
            KeyBinding::new(KeyCode::PageDown, KeyModifiers::NONE),
            Action::PageDown,
        );
        km.bind(
            KeyBinding::new(KeyCode::PageUp, KeyModifiers::NONE),
            Action::PageUp,
        );

        // Jump to edges
        km.bind(
            KeyBinding::new(KeyCode::Home, KeyModifiers::NONE),
            Action::MoveToStart,
        );
        km.bind(
            KeyBinding::new(KeyCode::End, KeyModifiers::NONE),
            Action::MoveToEnd,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('g'), KeyModifiers::NONE),
            Action::MoveToTop,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('G'), KeyModifiers::SHIFT),
            Action::MoveToBottom,
        );

        // Selection
        km.bind(
            KeyBinding::new(KeyCode::Esc, KeyModifiers::NONE),
            Action::CollapseSelection,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('a'), KeyModifiers::CONTROL),
            Action::GridSelectAll,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('a'), KeyModifiers::SUPER),
            Action::GridSelectAll,
        );

        // Copy
        km.bind(
            KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            Action::CopySelection,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('c'), KeyModifiers::SUPER),
            Action::CopySelection,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char('y'), KeyModifiers::NONE),
            Action::CopySelection,
        );

        // Edit
        km.bind(
            KeyBinding::new(KeyCode::Enter, KeyModifiers::NONE),
            Action::EditCell,
        );
        km.bind(
            KeyBinding::new(KeyCode::F(2), KeyModifiers::NONE),
            Action::EditCell,
        );

        // Filter by focused cell
        km.bind(
            KeyBinding::new(KeyCode::Char(';'), KeyModifiers::CONTROL),
            Action::AddWhereClause,
        );
        km.bind(
            KeyBinding::new(KeyCode::Char(';'), KeyModifiers::SUPER),
            Action::AddWhereClause,
        );
        // Legacy terminals send Ctrl+; as a bare ';' but do deliver Alt+;.
        km.bind(
            KeyBinding::new(KeyCode::Char(';'), KeyModifiers::ALT),
            Action::AddWhereClause,
        );

        km.bind(
            KeyBinding::new(KeyCode::Char('q'), KeyModifiers::NONE),
            Action::Quit,
        );

        km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_key() {
        let kb = KeyBinding::parse("a").unwrap();
        assert_eq!(kb.code, KeyCode::Char('a'));
        assert_eq!(kb.modifiers, KeyModifiers::NONE);
    }

    #[test]
    fn test_parse_ctrl_key() {
        let kb = KeyBinding::parse("ctrl+c").unwrap();
        assert_eq!(kb.code, KeyCode::Char('c'));
        assert_eq!(kb.modifiers, KeyModifiers::CONTROL);
    }

    #[test]
    fn test_parse_super_semicolon() {
        let kb = KeyBinding::parse("cmd+;").unwrap();
        assert_eq!(kb.code, KeyCode::Char(';'));
        assert_eq!(kb.modifiers, KeyModifiers::SUPER);
    }

    #[test]
    fn test_parse_special_keys() {
        assert_eq!(KeyBinding::parse("enter").unwrap().code, KeyCode::Enter);
        assert_eq!(KeyBinding::parse("esc").unwrap().code, KeyCode::Esc);
        assert_eq!(KeyBinding::parse("f2").unwrap().code, KeyCode::F(2));
        assert_eq!(KeyBinding::parse("F12").unwrap().code, KeyCode::F(12));
        assert_eq!(KeyBinding::parse("pgdn").unwrap().code, KeyCode::PageDown);
        assert_eq!(KeyBinding::parse("f").unwrap().code, KeyCode::Char('f'));
    }

    #[test]
    fn test_parse_invalid() {
        assert!(KeyBinding::parse("hyper+a").is_none());
        assert!(KeyBinding::parse("f13").is_none());
        assert!(KeyBinding::parse("abc").is_none());
    }

    #[test]
    fn test_key_binding_display() {
        let kb = KeyBinding::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(kb.to_string(), "Ctrl+C");

        let kb = KeyBinding::new(KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(kb.to_string(), "F2");
    }

    #[test]
    fn test_default_grid_keymap() {
        let km = Keymap::default_grid_keymap();

        let up = KeyBinding::new(KeyCode::Up, KeyModifiers::NONE);
        assert_eq!(km.get(&up), Some(&Action::MoveUp));

        let f2 = KeyBinding::new(KeyCode::F(2), KeyModifiers::NONE);
        assert_eq!(km.get(&f2), Some(&Action::EditCell));

        let copy = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert_eq!(km.get_action(&copy), Some(Action::CopySelection));

        let filter = KeyEvent::new(KeyCode::Char(';'), KeyModifiers::SUPER);
        assert_eq!(km.get_action(&filter), Some(Action::AddWhereClause));
        let alt_filter = KeyEvent::new(KeyCode::Char(';'), KeyModifiers::ALT);
        assert_eq!(km.get_action(&alt_filter), Some(Action::AddWhereClause));
        let bare = KeyEvent::new(KeyCode::Char(';'), KeyModifiers::NONE);
        assert_eq!(km.get_action(&bare), None);
    }

    #[test]
    fn test_action_from_str() {
        assert_eq!("move_up".parse::<Action>().unwrap(), Action::MoveUp);
        assert_eq!("move-up".parse::<Action>().unwrap(), Action::MoveUp);
        assert_eq!("EDIT_CELL".parse::<Action>().unwrap(), Action::EditCell);
        assert_eq!(
            "filter_by_cell".parse::<Action>().unwrap(),
            Action::AddWhereClause
        );
        assert!("execute_query".parse::<Action>().is_err());
        assert!("".parse::<Action>().is_err());
    }

    #[test]
    fn test_movement_actions() {
        assert!(Action::MoveLeft.is_movement());
        assert!(Action::PageDown.is_movement());
        assert!(!Action::CopySelection.is_movement());
        assert!(!Action::EditCell.is_movement());
    }

    #[test]
    fn test_apply_custom_bindings() {
        let mut km = Keymap::default_grid_keymap();
        let custom = vec![
            CustomKeyBinding {
                key: "ctrl+f".to_string(),
                action: "add_where_clause".to_string(),
                description: None,
            },
            CustomKeyBinding {
                key: "ctrl+nope+x".to_string(),
                action: "quit".to_string(),
                description: None,
            },
            CustomKeyBinding {
                key: "x".to_string(),
                action: "explode".to_string(),
                description: None,
            },
        ];

        let warnings = km.apply_custom(&custom);
        assert_eq!(warnings.len(), 2);

        let ctrl_f = KeyEvent::new(KeyCode::Char('f'), KeyModifiers::CONTROL);
        assert_eq!(km.get_action(&ctrl_f), Some(Action::AddWhereClause));
    }

    #[test]
    fn test_every_action_has_default_key() {
        let km = Keymap::default_grid_keymap();
        for action in Action::ALL {
            assert!(!km.keys_for(action).is_empty(), "{:?} is unbound", action);
            assert!(!action.description().is_empty());
        }
    }

    #[test]
    fn test_keys_for_action() {
        let km = Keymap::default_grid_keymap();
        let keys = km.keys_for(Action::EditCell);
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_keymap_unbind() {
        let mut km = Keymap::default_grid_keymap();
        let j = KeyBinding::new(KeyCode::Char('j'), KeyModifiers::NONE);
        assert!(km.get(&j).is_some());

        km.unbind(&j);
        assert!(km.get(&j).is_none());
    }
}
