//! Launcher rendering functions.
//!
//! Contains the launcher window layout.

use eframe::egui::{self, Color32, RichText};

use super::state::{HotkeyStatus, LauncherState};
use crate::config::OverlayConfig;
use crate::measure::Mode;
use crate::overlay::OverlayInstance;

/// Render the usage instructions and hotkey status.
pub fn render_instructions(ui: &mut egui::Ui, state: &LauncherState, config: &OverlayConfig) {
    ui.heading("How to use");
    ui.add_space(8.0);

    ui.label(format!(
        "1. Open an overlay, then click two points {} m apart to calibrate.",
        config.reference_distance_m
    ));
    ui.label("2. Click any two points to measure the distance between them.");
    ui.label("3. A third click starts a new measurement. R recalibrates, Esc closes the overlay.");

    ui.add_space(8.0);

    let status_color = match &state.hotkeys {
        HotkeyStatus::Active { .. } => Color32::from_rgb(0, 150, 0),
        HotkeyStatus::Unavailable(_) => Color32::from_rgb(200, 150, 0),
        HotkeyStatus::Stopped => Color32::GRAY,
    };
    ui.label(RichText::new(state.hotkeys.status_text()).color(status_color));
}

/// Render the control buttons.
/// Returns (new_overlay_clicked, quit_clicked).
pub fn render_controls(ui: &mut egui::Ui) -> (bool, bool) {
    let mut new_clicked = false;
    let mut quit_clicked = false;

    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    ui.horizontal(|ui| {
        if ui.button(RichText::new("New overlay").size(16.0)).clicked() {
            new_clicked = true;
        }

        ui.add_space(20.0);

        if ui.button(RichText::new("Quit").size(16.0)).clicked() {
            quit_clicked = true;
        }
    });

    (new_clicked, quit_clicked)
}

/// Render the list of open overlays.
pub fn render_overlays(ui: &mut egui::Ui, overlays: &[OverlayInstance]) {
    ui.add_space(8.0);
    ui.separator();
    ui.add_space(8.0);

    if overlays.is_empty() {
        ui.label(RichText::new("No overlay open").color(Color32::GRAY));
        return;
    }

    for overlay in overlays {
        let state = overlay.state();
        let detail = match (state.mode(), state.meters_per_pixel()) {
            (Mode::Measuring, Some(mpp)) => format!("Measuring ({:.4} m/px)", mpp),
            (mode, _) => mode.to_string(),
        };
        ui.label(format!("Overlay #{}: {}", overlay.id(), detail));
        if let Some(notice) = overlay.notice() {
            ui.label(RichText::new(notice).color(Color32::from_rgb(200, 150, 0)));
        }
    }
}
