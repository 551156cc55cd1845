//! Global hotkeys.
//!
//! Parses chords such as "ctrl+alt+d" and, on Windows, runs a listener
//! thread that turns hotkey presses and tray menu picks into
//! [`HotkeyEvent`]s for the launcher.

pub mod listener;

use thiserror::Error;

pub use listener::spawn_listener;

/// Requests delivered from the hotkey thread to the launcher.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HotkeyEvent {
    /// Open a new overlay instance.
    Activate,
    /// Shut the application down.
    Quit,
}

/// Errors raised while parsing a chord.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum HotkeyError {
    #[error("hotkey is empty")]
    Empty,
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("hotkey `{0}` has modifiers but no key")]
    MissingKey(String),
    #[error("hotkey `{0}` names more than one key")]
    DuplicateKey(String),
}

/// Modifier keys held with a chord.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub win: bool,
}

/// The non-modifier key of a chord.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Key {
    /// Uppercase ASCII letter.
    Letter(char),
    /// ASCII digit.
    Digit(char),
    /// Function key F1..F24.
    Function(u8),
    Escape,
    Space,
    Enter,
    Tab,
}

impl Key {
    fn parse(token: &str) -> Option<Key> {
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if c.is_ascii_alphabetic() {
                return Some(Key::Letter(c.to_ascii_uppercase()));
            }
            if c.is_ascii_digit() {
                return Some(Key::Digit(c));
            }
            return None;
        }

        match token {
            "esc" | "escape" => Some(Key::Escape),
            "space" => Some(Key::Space),
            "enter" | "return" => Some(Key::Enter),
            "tab" => Some(Key::Tab),
            _ => {
                let n: u8 = token.strip_prefix('f')?.parse().ok()?;
                (1..=24).contains(&n).then_some(Key::Function(n))
            }
        }
    }

    /// Win32 virtual-key code.
    pub fn virtual_key(self) -> u32 {
        match self {
            // VK codes for letters and digits equal their ASCII values
            Key::Letter(c) | Key::Digit(c) => c as u32,
            Key::Function(n) => 0x70 + u32::from(n) - 1, // VK_F1 = 0x70
            Key::Escape => 0x1B,
            Key::Space => 0x20,
            Key::Enter => 0x0D,
            Key::Tab => 0x09,
        }
    }
}

/// A global key chord.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Hotkey {
    pub modifiers: Modifiers,
    pub key: Key,
}

impl Hotkey {
    /// Parses a chord like "ctrl+alt+d" (case-insensitive, `+`-separated).
    pub fn parse(raw: &str) -> Result<Hotkey, HotkeyError> {
        let normalized = raw.trim().to_ascii_lowercase();
        if normalized.is_empty() {
            return Err(HotkeyError::Empty);
        }

        let mut modifiers = Modifiers::default();
        let mut key = None;
        for token in normalized.split('+').map(str::trim) {
            match token {
                "ctrl" | "control" => modifiers.ctrl = true,
                "alt" => modifiers.alt = true,
                "shift" => modifiers.shift = true,
                "win" | "super" | "meta" => modifiers.win = true,
                _ => {
                    let parsed =
                        Key::parse(token).ok_or_else(|| HotkeyError::UnknownKey(token.to_string()))?;
                    if key.replace(parsed).is_some() {
                        return Err(HotkeyError::DuplicateKey(raw.to_string()));
                    }
                }
            }
        }

        let key = key.ok_or_else(|| HotkeyError::MissingKey(raw.to_string()))?;
        Ok(Hotkey { modifiers, key })
    }

    /// Parses `raw`, falling back to `default` when it is invalid.
    pub fn parse_or(raw: &str, default: &str) -> Hotkey {
        match Hotkey::parse(raw) {
            Ok(hotkey) => hotkey,
            Err(e) => {
                crate::log(&format!(
                    "Invalid hotkey \"{}\": {}. Using \"{}\".",
                    raw, e, default
                ));
                // Built-in defaults are constants that always parse.
                Hotkey::parse(default).unwrap_or(Hotkey {
                    modifiers: Modifiers::default(),
                    key: Key::Function(12),
                })
            }
        }
    }

    pub fn virtual_key(&self) -> u32 {
        self.key.virtual_key()
    }
}

impl std::fmt::Display for Hotkey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let m = self.modifiers;
        for (held, name) in [(m.ctrl, "Ctrl"), (m.alt, "Alt"), (m.shift, "Shift"), (m.win, "Win")] {
            if held {
                write!(f, "{}+", name)?;
            }
        }
        match self.key {
            Key::Letter(c) | Key::Digit(c) => write!(f, "{}", c),
            Key::Function(n) => write!(f, "F{}", n),
            Key::Escape => write!(f, "Esc"),
            Key::Space => write!(f, "Space"),
            Key::Enter => write!(f, "Enter"),
            Key::Tab => write!(f, "Tab"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_default_chords() {
        let activate = Hotkey::parse("ctrl+alt+d").unwrap();
        assert!(activate.modifiers.ctrl && activate.modifiers.alt);
        assert!(!activate.modifiers.shift && !activate.modifiers.win);
        assert_eq!(activate.key, Key::Letter('D'));
        assert_eq!(activate.virtual_key(), 0x44);

        let quit = Hotkey::parse("Ctrl + Alt + Q").unwrap();
        assert_eq!(quit.key, Key::Letter('Q'));
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(Hotkey::parse("esc").unwrap().virtual_key(), 0x1B);
        assert_eq!(Hotkey::parse("shift+f9").unwrap().virtual_key(), 0x78);
        assert_eq!(Hotkey::parse("win+f24").unwrap().virtual_key(), 0x87);
        assert_eq!(Hotkey::parse("control+7").unwrap().virtual_key(), 0x37);
        assert_eq!(Hotkey::parse("alt+space").unwrap().key, Key::Space);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!(Hotkey::parse("  "), Err(HotkeyError::Empty));
        assert_eq!(
            Hotkey::parse("ctrl+alt"),
            Err(HotkeyError::MissingKey("ctrl+alt".to_string()))
        );
        assert_eq!(
            Hotkey::parse("ctrl+f25"),
            Err(HotkeyError::UnknownKey("f25".to_string()))
        );
        assert_eq!(
            Hotkey::parse("ctrl+a+b"),
            Err(HotkeyError::DuplicateKey("ctrl+a+b".to_string()))
        );
        assert!(matches!(Hotkey::parse("ctrl+"), Err(HotkeyError::UnknownKey(_))));
    }

    #[test]
    fn test_parse_or_falls_back() {
        let hotkey = Hotkey::parse_or("hyper+x", "ctrl+alt+d");
        assert_eq!(hotkey, Hotkey::parse("ctrl+alt+d").unwrap());
    }

    #[test]
    fn test_display() {
        assert_eq!(Hotkey::parse("ctrl+alt+d").unwrap().to_string(), "Ctrl+Alt+D");
        assert_eq!(Hotkey::parse("shift+win+f3").unwrap().to_string(), "Shift+Win+F3");
    }
}
