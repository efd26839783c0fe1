//! Turns crossterm key events into controller input.
//!
//! Terminals that speak the keyboard enhancement protocol report releases,
//! including releases of bare modifier keys. Legacy terminals only report
//! presses and attach the modifiers held at that moment, so a modifier that
//! was held on the previous press and is missing now has been released in
//! between; the normalizer synthesizes that release before the press.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, ModifierKeyCode};

use crate::controller::InputEvent;
use crate::keybindings::modifier_key_codes;

#[derive(Debug)]
pub struct KeyboardNormalizer {
    reports_releases: bool,
    held: KeyModifiers,
}

impl KeyboardNormalizer {
    pub fn new(reports_releases: bool) -> Self {
        Self {
            reports_releases,
            held: KeyModifiers::NONE,
        }
    }

    pub fn reports_releases(&self) -> bool {
        self.reports_releases
    }

    /// Modifiers seen on the most recent key event.
    pub fn held(&self) -> KeyModifiers {
        self.held
    }

    pub fn normalize(&mut self, key: KeyEvent) -> Vec<InputEvent> {
        let mut code = key.code;
        let mut modifiers = key.modifiers;
        if code == KeyCode::Tab && modifiers.contains(KeyModifiers::SHIFT) {
            code = KeyCode::BackTab;
        }
        // bare modifier keys are reported with or without their own bit
        if let KeyCode::Modifier(physical) = code {
            let bit = modifier_bit(physical);
            if key.kind == KeyEventKind::Release {
                modifiers.remove(bit);
            } else {
                modifiers.insert(bit);
            }
        }

        let mut out = Vec::new();
        match key.kind {
            KeyEventKind::Press | KeyEventKind::Repeat => {
                if !self.reports_releases {
                    let released = self.held.difference(modifiers);
                    for bit in released.iter() {
                        if let Some(physical) = modifier_key_codes(bit).first() {
                            out.push(InputEvent::release(KeyCode::Modifier(*physical), modifiers));
                        }
                    }
                }
                out.push(InputEvent::press(code, modifiers));
            }
            KeyEventKind::Release => out.push(InputEvent::release(code, modifiers)),
        }
        self.held = modifiers;
        out
    }
}

fn modifier_bit(key: ModifierKeyCode) -> KeyModifiers {
    use ModifierKeyCode::*;
    match key {
        LeftShift | RightShift => KeyModifiers::SHIFT,
        LeftControl | RightControl => KeyModifiers::CONTROL,
        LeftAlt | RightAlt => KeyModifiers::ALT,
        LeftSuper | RightSuper => KeyModifiers::SUPER,
        LeftHyper | RightHyper => KeyModifiers::HYPER,
        LeftMeta | RightMeta => KeyModifiers::META,
        _ => KeyModifiers::NONE,
    }
}
