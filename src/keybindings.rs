use std::collections::HashMap;
use std::fmt;

use crossterm::event::{KeyCode, KeyModifiers, ModifierKeyCode};
use thiserror::Error;

use crate::layout::Direction;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    CycleNext,
    CyclePrev,
    Move(Direction),
    /// Close the switcher without committing.
    Cancel,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("empty key name")]
    Empty,
    #[error("unknown modifier `{0}` (expected super, alt, ctrl, shift, meta or hyper)")]
    UnknownModifier(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyCombo {
    pub code: KeyCode,
    pub mods: KeyModifiers,
}

impl KeyCombo {
    pub fn new(code: KeyCode, mods: KeyModifiers) -> Self {
        Self { code, mods }
    }

    /// True when `code` is pressed with at least `self.mods` held.
    pub fn matches(&self, code: KeyCode, mods: KeyModifiers) -> bool {
        normalize(code) == normalize(self.code) && mods.contains(self.mods)
    }

    pub fn display(&self) -> String {
        let mut parts = Vec::new();
        if self.mods.contains(KeyModifiers::SUPER) {
            parts.push("Super".to_string());
        }
        if self.mods.contains(KeyModifiers::CONTROL) {
            parts.push("Ctrl".to_string());
        }
        if self.mods.contains(KeyModifiers::SHIFT) {
            parts.push("Shift".to_string());
        }
        if self.mods.contains(KeyModifiers::ALT) {
            parts.push("Alt".to_string());
        }
        if self.mods.contains(KeyModifiers::META) {
            parts.push("Meta".to_string());
        }
        if self.mods.contains(KeyModifiers::HYPER) {
            parts.push("Hyper".to_string());
        }
        parts.push(key_name(self.code));
        parts.join("+")
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display())
    }
}

fn key_name(code: KeyCode) -> String {
    match code {
        KeyCode::Char(' ') => "Space".to_string(),
        KeyCode::Char(c) => c.to_ascii_uppercase().to_string(),
        KeyCode::Esc => "Esc".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::BackTab => "BackTab".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Left => "Left".to_string(),
        KeyCode::Right => "Right".to_string(),
        KeyCode::Up => "Up".to_string(),
        KeyCode::Down => "Down".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        other => format!("{:?}", other),
    }
}

/// Letters compare case-insensitively; Shift+Tab arrives as BackTab.
fn normalize(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        KeyCode::BackTab => KeyCode::Tab,
        other => other,
    }
}

/// Physical keys that produce `mods`.
pub fn modifier_key_codes(mods: KeyModifiers) -> Vec<ModifierKeyCode> {
    use ModifierKeyCode::*;
    let mut codes = Vec::new();
    if mods.contains(KeyModifiers::SHIFT) {
        codes.extend([LeftShift, RightShift]);
    }
    if mods.contains(KeyModifiers::CONTROL) {
        codes.extend([LeftControl, RightControl]);
    }
    if mods.contains(KeyModifiers::ALT) {
        codes.extend([LeftAlt, RightAlt]);
    }
    if mods.contains(KeyModifiers::SUPER) {
        codes.extend([LeftSuper, RightSuper]);
    }
    if mods.contains(KeyModifiers::HYPER) {
        codes.extend([LeftHyper, RightHyper]);
    }
    if mods.contains(KeyModifiers::META) {
        codes.extend([LeftMeta, RightMeta]);
    }
    codes
}

pub fn parse_modifier(name: &str) -> Result<KeyModifiers, BindingError> {
    let lowered = name.trim().to_ascii_lowercase();
    match lowered.as_str() {
        "" => Err(BindingError::Empty),
        "super" | "mod4" | "win" | "logo" => Ok(KeyModifiers::SUPER),
        "alt" | "mod1" => Ok(KeyModifiers::ALT),
        "ctrl" | "control" => Ok(KeyModifiers::CONTROL),
        "shift" => Ok(KeyModifiers::SHIFT),
        "meta" => Ok(KeyModifiers::META),
        "hyper" => Ok(KeyModifiers::HYPER),
        _ => Err(BindingError::UnknownModifier(name.to_string())),
    }
}

pub fn parse_key(name: &str) -> Result<KeyCode, BindingError> {
    let trimmed = name.trim();
    let lowered = trimmed.to_ascii_lowercase();
    let code = match lowered.as_str() {
        "" => return Err(BindingError::Empty),
        "tab" => KeyCode::Tab,
        "esc" | "escape" => KeyCode::Esc,
        "enter" | "return" => KeyCode::Enter,
        "space" => KeyCode::Char(' '),
        "backspace" => KeyCode::Backspace,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "grave" | "backtick" => KeyCode::Char('`'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                (Some('f'), Some(_)) => match other[1..].parse::<u8>() {
                    Ok(n) if (1..=24).contains(&n) => KeyCode::F(n),
                    _ => return Err(BindingError::UnknownKey(trimmed.to_string())),
                },
                _ => return Err(BindingError::UnknownKey(trimmed.to_string())),
            }
        }
    };
    Ok(code)
}

/// Keys the switcher reacts to.
///
/// The activation chord is `modifier` + `action_key`. While the switcher is
/// open, the other bindings fire regardless of which modifiers are held.
#[derive(Debug, Clone)]
pub struct Bindings {
    modifier: KeyModifiers,
    action_key: KeyCode,
    map: HashMap<KeyCode, Action>,
}

impl Default for Bindings {
    fn default() -> Self {
        Self::with_defaults(KeyModifiers::SUPER, KeyCode::Tab)
    }
}

impl Bindings {
    /// Activation chord only, no navigation keys.
    pub fn new(modifier: KeyModifiers, action_key: KeyCode) -> Self {
        Self {
            modifier,
            action_key,
            map: HashMap::new(),
        }
    }

    /// Activation chord plus vi keys, arrows and Escape.
    pub fn with_defaults(modifier: KeyModifiers, action_key: KeyCode) -> Self {
        use Direction::*;
        let mut kb = Self::new(modifier, action_key);
        kb.bind(KeyCode::Char('l'), Action::Move(East));
        kb.bind(KeyCode::Char('h'), Action::Move(West));
        kb.bind(KeyCode::Char('k'), Action::Move(North));
        kb.bind(KeyCode::Char('j'), Action::Move(South));
        kb.bind(KeyCode::Right, Action::Move(East));
        kb.bind(KeyCode::Left, Action::Move(West));
        kb.bind(KeyCode::Up, Action::Move(North));
        kb.bind(KeyCode::Down, Action::Move(South));
        kb.bind(KeyCode::Esc, Action::Cancel);
        kb
    }

    /// Later bindings for the same key replace earlier ones. The action key
    /// cannot be rebound.
    pub fn bind(&mut self, code: KeyCode, action: Action) {
        let code = normalize(code);
        if code == normalize(self.action_key) {
            return;
        }
        self.map.insert(code, action);
    }

    pub fn modifier(&self) -> KeyModifiers {
        self.modifier
    }

    pub fn action_key(&self) -> KeyCode {
        self.action_key
    }

    pub fn activation(&self) -> KeyCombo {
        KeyCombo::new(self.action_key, self.modifier)
    }

    pub fn holds_modifier(&self, mods: KeyModifiers) -> bool {
        mods.contains(self.modifier)
    }

    /// Whether `code` is one of the physical keys of the configured modifier.
    pub fn is_modifier_key(&self, code: KeyCode) -> bool {
        match code {
            KeyCode::Modifier(key) => modifier_key_codes(self.modifier).contains(&key),
            _ => false,
        }
    }

    /// Action for a key press; the action key cycles backwards with Shift.
    pub fn action_for(&self, code: KeyCode, mods: KeyModifiers) -> Option<Action> {
        let backtab = code == KeyCode::BackTab;
        let code = normalize(code);
        if code == normalize(self.action_key) {
            let shifted = mods.contains(KeyModifiers::SHIFT)
                && !self.modifier.contains(KeyModifiers::SHIFT);
            return Some(if shifted || backtab {
                Action::CyclePrev
            } else {
                Action::CycleNext
            });
        }
        self.map.get(&code).copied()
    }
}
