//! # Automation Types
//!
//! Windows, key chords and errors exchanged with an `AutomationTarget`.

use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// Opaque reference to a top-level window. `id` is whatever the driver
/// needs to find it again (an X11 window id, an `HWND` value).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowHandle {
    pub id: String,
    pub title: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Ctrl,
    Shift,
    Alt,
    Meta,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Delete,
    Backspace,
    Escape,
    Tab,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyChord {
    pub modifiers: Vec<Modifier>,
    pub key: Key,
}

impl KeyChord {
    pub fn key(key: Key) -> Self {
        Self {
            modifiers: Vec::new(),
            key,
        }
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            modifiers: vec![Modifier::Ctrl],
            key: Key::Char(c),
        }
    }

    /// Parses `"ctrl+shift+l"`, `"enter"`, `"delete"` and similar.
    pub fn parse(spec: &str) -> Result<Self, TargetError> {
        let parts: Vec<String> = spec
            .split('+')
            .map(|p| p.trim().to_lowercase())
            .filter(|p| !p.is_empty())
            .collect();
        let Some((last, mods)) = parts.split_last() else {
            return Err(TargetError::InvalidChord(spec.to_string()));
        };

        let mut modifiers = Vec::with_capacity(mods.len());
        for m in mods {
            modifiers.push(match m.as_str() {
                "ctrl" | "control" => Modifier::Ctrl,
                "shift" => Modifier::Shift,
                "alt" => Modifier::Alt,
                "meta" | "super" | "cmd" | "win" => Modifier::Meta,
                _ => return Err(TargetError::InvalidChord(spec.to_string())),
            });
        }

        let key = match last.as_str() {
            "enter" | "return" => Key::Enter,
            "delete" | "del" => Key::Delete,
            "backspace" => Key::Backspace,
            "escape" | "esc" => Key::Escape,
            "tab" => Key::Tab,
            s if s.chars().count() == 1 => Key::Char(s.chars().next().unwrap_or(' ')),
            _ => return Err(TargetError::InvalidChord(spec.to_string())),
        };

        Ok(Self { modifiers, key })
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            let name = match m {
                Modifier::Ctrl => "ctrl",
                Modifier::Shift => "shift",
                Modifier::Alt => "alt",
                Modifier::Meta => "super",
            };
            write!(f, "{name}+")?;
        }
        match self.key {
            Key::Char(c) => write!(f, "{c}"),
            Key::Enter => f.write_str("Return"),
            Key::Delete => f.write_str("Delete"),
            Key::Backspace => f.write_str("BackSpace"),
            Key::Escape => f.write_str("Escape"),
            Key::Tab => f.write_str("Tab"),
        }
    }
}

#[derive(Debug, Error)]
pub enum TargetError {
    #[error("no visible window title contains '{0}'")]
    NotFound(String),

    #[error("invalid key chord '{0}'")]
    InvalidChord(String),

    #[error("automation driver unavailable: {0}")]
    Unavailable(String),

    #[error("automation driver failed: {0}")]
    Driver(String),

    #[error("automation driver timed out after {0}ms")]
    Timeout(u64),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_chords() {
        assert_eq!(KeyChord::parse("ctrl+l").unwrap(), KeyChord::ctrl('l'));
        assert_eq!(KeyChord::parse("Enter").unwrap(), KeyChord::key(Key::Enter));

        let chord = KeyChord::parse("ctrl + shift + L").unwrap();
        assert_eq!(chord.modifiers, vec![Modifier::Ctrl, Modifier::Shift]);
        assert_eq!(chord.key, Key::Char('l'));
        assert_eq!(chord.to_string(), "ctrl+shift+l");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(KeyChord::parse("").is_err());
        assert!(KeyChord::parse("hyper+l").is_err());
        assert!(KeyChord::parse("ctrl+pagedownish").is_err());
    }
}
