//! Launcher state management.
//!
//! Tracks hotkey availability and overlay numbering for display.

use crate::hotkey::Hotkey;

/// Whether global hotkeys are available.
#[derive(Clone, Debug)]
pub enum HotkeyStatus {
    /// Listener thread is running with both chords registered
    Active { activate: Hotkey, quit: Hotkey },
    /// Listener could not start; buttons still work
    Unavailable(String),
    /// Listener has stopped
    Stopped,
}

impl HotkeyStatus {
    /// Get display text for the current status.
    pub fn status_text(&self) -> String {
        match self {
            Self::Active { activate, quit } => {
                format!("{} opens an overlay, {} quits", activate, quit)
            }
            Self::Unavailable(reason) => format!("Global hotkeys unavailable: {}", reason),
            Self::Stopped => "Global hotkeys stopped".to_string(),
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active { .. })
    }
}

/// Launcher state.
#[derive(Debug)]
pub struct LauncherState {
    pub hotkeys: HotkeyStatus,
    /// Number of overlays opened so far, used for instance ids.
    pub overlays_opened: u64,
    /// Set once shutdown has been requested.
    pub quitting: bool,
}

impl LauncherState {
    pub fn new(hotkeys: HotkeyStatus) -> Self {
        Self {
            hotkeys,
            overlays_opened: 0,
            quitting: false,
        }
    }

    /// Allocates the id for the next overlay (1-based).
    pub fn next_overlay_id(&mut self) -> u64 {
        self.overlays_opened += 1;
        self.overlays_opened
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlay_ids_are_sequential() {
        let mut state = LauncherState::new(HotkeyStatus::Stopped);
        assert_eq!(state.next_overlay_id(), 1);
        assert_eq!(state.next_overlay_id(), 2);
        assert_eq!(state.overlays_opened, 2);
    }

    #[test]
    fn test_status_text() {
        let status = HotkeyStatus::Active {
            activate: Hotkey::parse("ctrl+alt+d").unwrap(),
            quit: Hotkey::parse("ctrl+alt+q").unwrap(),
        };
        assert!(status.is_active());
        assert_eq!(status.status_text(), "Ctrl+Alt+D opens an overlay, Ctrl+Alt+Q quits");

        let status = HotkeyStatus::Unavailable("busy".to_string());
        assert!(!status.is_active());
        assert_eq!(status.status_text(), "Global hotkeys unavailable: busy");
    }
}
