//! Keyboard input as reported by the host text field
//!
//! The host widget stays external; it hands over key-down events together
//! with a snapshot of its value length and selection.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

/// Keys the popover reacts to, plus enough others to pass through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    Enter,
    Escape,
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Tab,
    Backspace,
    Char(char),
}

bitflags! {
    /// Modifier keys held during a key event
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b0001;
        const ALT   = 0b0010;
        const CTRL  = 0b0100;
        const SUPER = 0b1000;
    }
}

/// A key-down event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::empty(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn shift(&self) -> bool {
        self.modifiers.contains(Modifiers::SHIFT)
    }

    /// Parse names like `down`, `shift-down`, `esc` or `ctrl-a`
    pub fn parse(name: &str) -> Option<Self> {
        let mut modifiers = Modifiers::empty();
        let mut parts: Vec<&str> = name.trim().split('-').collect();
        let key_name = parts.pop()?;

        for part in parts {
            modifiers |= match part.to_ascii_lowercase().as_str() {
                "shift" => Modifiers::SHIFT,
                "alt" => Modifiers::ALT,
                "ctrl" => Modifiers::CTRL,
                "super" | "cmd" => Modifiers::SUPER,
                _ => return None,
            };
        }

        let key = match key_name.to_ascii_lowercase().as_str() {
            "enter" | "return" => Key::Enter,
            "esc" | "escape" => Key::Escape,
            "up" => Key::Up,
            "down" => Key::Down,
            "left" => Key::Left,
            "right" => Key::Right,
            "home" => Key::Home,
            "end" => Key::End,
            "tab" => Key::Tab,
            "backspace" => Key::Backspace,
            _ => {
                let mut chars = key_name.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Key::Char(c),
                    _ => return None,
                }
            }
        };

        Some(Self { key, modifiers })
    }
}

/// Value length and selection of the host text field, in characters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FieldState {
    pub len: usize,
    pub selection_start: usize,
    pub selection_end: usize,
}

impl FieldState {
    /// Field holding `text` with the caret after the last character
    pub fn caret_at_end(text: &str) -> Self {
        let len = text.chars().count();
        Self {
            len,
            selection_start: len,
            selection_end: len,
        }
    }

    /// Field holding `text` with the caret at `pos` (clamped)
    pub fn caret_at(text: &str, pos: usize) -> Self {
        let len = text.chars().count();
        let pos = pos.min(len);
        Self {
            len,
            selection_start: pos,
            selection_end: pos,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_caret_at_end(&self) -> bool {
        self.selection_start == self.len
    }

    pub fn is_caret_at_start(&self) -> bool {
        self.selection_end == 0
    }

    /// The same field with its entire value selected
    pub fn select_all(&self) -> Self {
        Self {
            len: self.len,
            selection_start: 0,
            selection_end: self.len,
        }
    }
}
