//! Overlay instances.
//!
//! Each instance is a borderless, transparent, always-on-top, full-screen
//! viewport with its own state machine. Instances share nothing, so
//! closing or resetting one leaves the others untouched.

pub mod input;
pub mod surface;

use std::panic::{self, AssertUnwindSafe};

use eframe::egui;

use crate::config::OverlayConfig;
use crate::log;
use crate::measure::{mode_hint, paint, transition, Effect, OverlayEvent, OverlayState};

use surface::EguiSurface;

/// Viewport settings for overlay `id`: borderless, transparent,
/// always on top and covering the whole monitor.
pub fn overlay_viewport_builder(id: u64) -> egui::ViewportBuilder {
    egui::ViewportBuilder::default()
        .with_title(format!("Overlay Ruler #{}", id))
        .with_decorations(false)
        .with_transparent(true)
        .with_always_on_top()
        .with_fullscreen(true)
}

/// One overlay window and its measurement state.
pub struct OverlayInstance {
    id: u64,
    state: OverlayState,
    /// Feedback shown instead of the mode hint until the next accepted click.
    notice: Option<String>,
    open: bool,
    focus_requested: bool,
}

impl OverlayInstance {
    pub fn new(id: u64) -> Self {
        log(&format!("Overlay #{}: opened in calibration mode", id));
        Self {
            id,
            state: OverlayState::default(),
            notice: None,
            open: true,
            focus_requested: false,
        }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn state(&self) -> &OverlayState {
        &self.state
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn viewport_id(&self) -> egui::ViewportId {
        egui::ViewportId::from_hash_of(("overlay", self.id))
    }

    /// Applies one input event. Events arriving after close are ignored.
    pub fn handle(&mut self, event: OverlayEvent, reference_distance_m: f64) {
        if !self.open {
            return;
        }

        let (next, effect) = transition(self.state, event, reference_distance_m);
        self.state = next;

        match effect {
            Effect::None => {}
            Effect::PointPlaced => self.notice = None,
            Effect::Calibrated {
                pixel_distance,
                meters_per_pixel,
            } => {
                self.notice = None;
                log(&format!(
                    "Overlay #{}: scale set: {:.2} px = {} m ({:.4} m/px)",
                    self.id, pixel_distance, reference_distance_m, meters_per_pixel
                ));
            }
            Effect::DegenerateCalibration(e) => {
                log(&format!("Overlay #{}: calibration click rejected: {}", self.id, e));
                self.notice = Some(
                    "Second point is on top of the first one. Click a different point."
                        .to_string(),
                );
            }
            Effect::Measured { meters } => {
                self.notice = None;
                log(&format!("Overlay #{}: measured {:.2} m", self.id, meters));
            }
            Effect::Reset => {
                self.notice = None;
                log(&format!("Overlay #{}: calibration reset", self.id));
            }
            Effect::Close => self.close("Escape pressed"),
        }
    }

    fn close(&mut self, reason: &str) {
        if self.open {
            self.open = false;
            log(&format!("Overlay #{}: closed ({})", self.id, reason));
        }
    }

    /// Text for the corner hint, if any.
    fn hint(&self, config: &OverlayConfig) -> Option<String> {
        self.notice.clone().or_else(|| {
            config
                .show_hints
                .then(|| mode_hint(&self.state, config.reference_distance_m))
        })
    }

    /// Shows the overlay viewport for this frame. A closed instance is not
    /// shown, which makes egui drop its window.
    pub fn show(&mut self, ctx: &egui::Context, config: &OverlayConfig) {
        if !self.open {
            return;
        }

        let viewport_id = self.viewport_id();
        let builder = overlay_viewport_builder(self.id);
        let mut rendered = false;

        // egui panics after a backend skips the callback, which is what
        // happens when the native window cannot be created.
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            ctx.show_viewport_immediate(viewport_id, builder, |ctx, class| {
                rendered = true;
                if matches!(class, egui::ViewportClass::Embedded) {
                    // The backend cannot open another native window.
                    self.close("native overlay windows are unavailable");
                    return;
                }
                self.frame(ctx, config);
            })
        }));

        match result {
            Err(payload) if rendered => panic::resume_unwind(payload),
            _ => self.finish_show(rendered),
        }
    }

    /// Aborts the instance when its window never rendered.
    fn finish_show(&mut self, rendered: bool) {
        if !rendered {
            self.close("native window could not be created");
        }
    }

    fn frame(&mut self, ctx: &egui::Context, config: &OverlayConfig) {
        if !self.focus_requested {
            ctx.send_viewport_cmd(egui::ViewportCommand::Focus);
            self.focus_requested = true;
        }

        let pixels_per_point = ctx.pixels_per_point();
        let (events, close_requested) = ctx.input(|i| {
            (
                input::collect(&i.events, pixels_per_point),
                i.viewport().close_requested(),
            )
        });

        for event in events {
            self.handle(event, config.reference_distance_m);
        }
        if close_requested {
            self.close("window closed");
        }
        if !self.open {
            return;
        }

        let painter = ctx.layer_painter(egui::LayerId::background());
        let mut surface = EguiSurface::new(&painter, pixels_per_point, config);
        let hint = self.hint(config);
        paint(
            &mut surface,
            &self.state,
            config.reference_distance_m,
            hint.as_deref(),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::measure::state::PointPair;
    use crate::measure::{Mode, OverlayKey, Point, PointerButton};

    const REF: f64 = 100.0;

    fn click(x: i32, y: i32) -> OverlayEvent {
        OverlayEvent::Click {
            button: PointerButton::Primary,
            at: Point::new(x, y),
        }
    }

    #[test]
    fn test_new_instance_starts_calibrating() {
        let overlay = OverlayInstance::new(1);
        assert!(overlay.is_open());
        assert_eq!(overlay.state().mode(), Mode::Calibrating);
        assert_eq!(overlay.notice(), None);
    }

    #[test]
    fn test_degenerate_click_sets_notice_until_next_click() {
        let mut overlay = OverlayInstance::new(1);
        overlay.handle(click(100, 100), REF);
        overlay.handle(click(100, 100), REF);
        assert_eq!(overlay.state().mode(), Mode::Calibrating);
        assert!(overlay.notice().is_some());

        let config = OverlayConfig::default();
        assert_eq!(overlay.hint(&config).as_deref(), overlay.notice());

        overlay.handle(click(100, 400), REF);
        assert_eq!(overlay.state().mode(), Mode::Measuring);
        assert_eq!(overlay.notice(), None);
    }

    #[test]
    fn test_escape_closes_only_that_instance() {
        let mut first = OverlayInstance::new(1);
        let mut second = OverlayInstance::new(2);
        for overlay in [&mut first, &mut second] {
            overlay.handle(click(0, 0), REF);
            overlay.handle(click(300, 0), REF);
        }
        second.handle(click(5, 5), REF);
        let before = *second.state();

        first.handle(OverlayEvent::Key(OverlayKey::Escape), REF);
        assert!(!first.is_open());
        assert!(second.is_open());
        assert_eq!(*second.state(), before);
        assert_ne!(first.viewport_id(), second.viewport_id());
    }

    #[test]
    fn test_events_after_close_are_ignored() {
        let mut overlay = OverlayInstance::new(3);
        overlay.handle(click(1, 1), REF);
        overlay.handle(OverlayEvent::Key(OverlayKey::Escape), REF);
        let closed = *overlay.state();
        overlay.handle(click(50, 1), REF);
        overlay.handle(OverlayEvent::Key(OverlayKey::R), REF);
        assert_eq!(*overlay.state(), closed);
        assert_eq!(overlay.state().points(), PointPair::First(Point::new(1, 1)));
    }

    #[test]
    fn test_viewport_builder_is_a_transparent_overlay() {
        let builder = overlay_viewport_builder(7);
        assert_eq!(builder.transparent, Some(true));
        assert_eq!(builder.decorations, Some(false));
        assert_eq!(builder.window_level, Some(egui::WindowLevel::AlwaysOnTop));
        assert_eq!(builder.fullscreen, Some(true));
        assert_eq!(builder.title.as_deref(), Some("Overlay Ruler #7"));
    }

    #[test]
    fn test_window_that_never_rendered_is_closed() {
        let mut overlay = OverlayInstance::new(5);
        overlay.finish_show(true);
        assert!(overlay.is_open());

        overlay.finish_show(false);
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_show_without_native_windows_closes_instance() {
        // A bare context has no viewport renderer, so it embeds.
        let ctx = egui::Context::default();
        let mut overlay = OverlayInstance::new(6);
        overlay.show(&ctx, &OverlayConfig::default());
        assert!(!overlay.is_open());
    }

    #[test]
    fn test_hints_follow_config() {
        let overlay = OverlayInstance::new(4);
        let mut config = OverlayConfig::default();
        assert!(overlay.hint(&config).unwrap().starts_with("Calibrating"));
        config.show_hints = false;
        assert_eq!(overlay.hint(&config), None);
    }
}
