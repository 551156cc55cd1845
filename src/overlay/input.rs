//! Translation of egui input into overlay events.

use eframe::egui;

use crate::measure::{OverlayEvent, OverlayKey, Point, PointerButton};

/// Converts a position in egui points to physical surface pixels.
pub fn to_pixels(pos: egui::Pos2, pixels_per_point: f32) -> Point {
    Point::new(
        (pos.x * pixels_per_point).round() as i32,
        (pos.y * pixels_per_point).round() as i32,
    )
}

/// Converts physical surface pixels back to egui points.
pub fn to_points(p: Point, pixels_per_point: f32) -> egui::Pos2 {
    egui::pos2(p.x as f32 / pixels_per_point, p.y as f32 / pixels_per_point)
}

/// Maps one egui event to an overlay event. Releases, key repeats and
/// everything else the overlay has no use for map to `None`.
pub fn translate(event: &egui::Event, pixels_per_point: f32) -> Option<OverlayEvent> {
    match event {
        egui::Event::PointerButton {
            pos,
            button,
            pressed: true,
            ..
        } => {
            let button = match button {
                egui::PointerButton::Primary => PointerButton::Primary,
                egui::PointerButton::Secondary => PointerButton::Secondary,
                egui::PointerButton::Middle => PointerButton::Middle,
                _ => PointerButton::Other,
            };
            Some(OverlayEvent::Click {
                button,
                at: to_pixels(*pos, pixels_per_point),
            })
        }
        egui::Event::Key {
            key,
            pressed: true,
            repeat: false,
            ..
        } => Some(OverlayEvent::Key(match key {
            egui::Key::Escape => OverlayKey::Escape,
            egui::Key::R => OverlayKey::R,
            _ => OverlayKey::Other,
        })),
        _ => None,
    }
}

/// Translates a frame's events, keeping their order.
pub fn collect(events: &[egui::Event], pixels_per_point: f32) -> Vec<OverlayEvent> {
    events
        .iter()
        .filter_map(|event| translate(event, pixels_per_point))
        .collect()
}
