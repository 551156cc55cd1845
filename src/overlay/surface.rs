//! [`Surface`] backed by an egui painter.

use eframe::egui::{self, Align2, Color32, FontId, Stroke};

use crate::config::{OverlayConfig, Rgba};
use crate::measure::{Point, Surface};
use crate::overlay::input::to_points;

fn color32(c: Rgba) -> Color32 {
    Color32::from_rgba_unmultiplied(c.r(), c.g(), c.b(), c.a())
}

/// Paints overlay scenes with the configured colors and sizes.
pub struct EguiSurface<'a> {
    painter: &'a egui::Painter,
    pixels_per_point: f32,
    backdrop: Color32,
    accent: Color32,
    stroke_width: f32,
    font_size: f32,
}

impl<'a> EguiSurface<'a> {
    pub fn new(painter: &'a egui::Painter, pixels_per_point: f32, config: &OverlayConfig) -> Self {
        Self {
            painter,
            pixels_per_point,
            backdrop: color32(config.backdrop_color),
            accent: color32(config.accent_color),
            stroke_width: config.line_width,
            font_size: config.font_size,
        }
    }
}

impl Surface for EguiSurface<'_> {
    fn fill_backdrop(&mut self) {
        self.painter
            .rect_filled(self.painter.clip_rect(), 0.0, self.backdrop);
    }

    fn draw_line(&mut self, from: Point, to: Point) {
        self.painter.line_segment(
            [
                to_points(from, self.pixels_per_point),
                to_points(to, self.pixels_per_point),
            ],
            Stroke::new(self.stroke_width, self.accent),
        );
    }

    fn draw_text(&mut self, at: Point, text: &str) {
        self.painter.text(
            to_points(at, self.pixels_per_point),
            Align2::LEFT_BOTTOM,
            text,
            FontId::proportional(self.font_size),
            self.accent,
        );
    }
}
