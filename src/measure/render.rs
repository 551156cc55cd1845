//! Scene painting for an overlay state.
//!
//! Drawing goes through [`Surface`], so the state machine and its scene
//! stay independent of the windowing backend.

use crate::measure::geometry::Point;
use crate::measure::state::{Mode, OverlayState};

/// Where the status hint is drawn, in surface pixels.
pub const HINT_ANCHOR: Point = Point::new(24, 40);

/// Drawing primitives offered by the display backend.
pub trait Surface {
    /// Covers the whole surface with the translucent backdrop.
    fn fill_backdrop(&mut self);
    /// Draws a segment in the accent color.
    fn draw_line(&mut self, from: Point, to: Point);
    /// Draws text with its baseline starting at `at`.
    fn draw_text(&mut self, at: Point, text: &str);
}

/// Default hint for a mode, shown when no notice overrides it.
pub fn mode_hint(state: &OverlayState, reference_distance_m: f64) -> String {
    match state.mode() {
        Mode::Calibrating => format!(
            "Calibrating: click two points {} m apart  (R: restart, Esc: close)",
            reference_distance_m
        ),
        Mode::Measuring => {
            "Measuring: click two points  (R: recalibrate, Esc: close)".to_string()
        }
    }
}

/// Paints the backdrop, the current annotation and an optional hint.
pub fn paint<S: Surface>(
    surface: &mut S,
    state: &OverlayState,
    reference_distance_m: f64,
    hint: Option<&str>,
) {
    surface.fill_backdrop();

    if let Some(annotation) = state.annotation(reference_distance_m) {
        surface.draw_line(annotation.from, annotation.to);
        surface.draw_text(annotation.anchor, &annotation.label);
    }

    if let Some(hint) = hint {
        surface.draw_text(HINT_ANCHOR, hint);
    }
}
