//! GUI module for the application.
//!
//! The launcher window hosts every overlay viewport and reacts to the
//! global hotkey listener.

pub mod render;
pub mod state;

use std::sync::mpsc::{self, Receiver, TryRecvError};

use eframe::egui::{self, Vec2};

use crate::config::{get_config, DEFAULT_ACTIVATE_HOTKEY, DEFAULT_QUIT_HOTKEY};
use crate::hotkey::{spawn_listener, Hotkey, HotkeyEvent};
use crate::overlay::OverlayInstance;

use state::{HotkeyStatus, LauncherState};

/// Main GUI application struct.
pub struct LauncherApp {
    /// Application state.
    state: LauncherState,
    /// Open overlay instances, each with its own state machine.
    overlays: Vec<OverlayInstance>,
    /// Events from the hotkey listener thread.
    hotkey_events: Receiver<HotkeyEvent>,
}

impl LauncherApp {
    /// Create a new launcher and start the hotkey listener.
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        let config = get_config();
        let activate = Hotkey::parse_or(&config.activate_hotkey, DEFAULT_ACTIVATE_HOTKEY);
        let quit = Hotkey::parse_or(&config.quit_hotkey, DEFAULT_QUIT_HOTKEY);

        let (tx, rx) = mpsc::channel();
        let ctx = cc.egui_ctx.clone();
        let hotkeys = match spawn_listener(activate, quit, tx, Box::new(move || ctx.request_repaint())) {
            Ok(_) => {
                crate::log(&format!(
                    "Press {} to start measuring, {} to quit. In an overlay: Esc closes it, R recalibrates.",
                    activate, quit
                ));
                HotkeyStatus::Active { activate, quit }
            }
            Err(e) => {
                crate::log(&format!("Warning: hotkey listener unavailable: {}", e));
                HotkeyStatus::Unavailable(e.to_string())
            }
        };

        Self::with_receiver(rx, hotkeys)
    }

    /// Create a launcher fed by an existing hotkey event channel.
    pub fn with_receiver(hotkey_events: Receiver<HotkeyEvent>, hotkeys: HotkeyStatus) -> Self {
        Self {
            state: LauncherState::new(hotkeys),
            overlays: Vec::new(),
            hotkey_events,
        }
    }

    /// Drain pending hotkey events.
    fn poll_hotkeys(&mut self, ctx: &egui::Context) {
        loop {
            match self.hotkey_events.try_recv() {
                Ok(HotkeyEvent::Activate) => self.open_overlay(),
                Ok(HotkeyEvent::Quit) => {
                    self.state.hotkeys = HotkeyStatus::Stopped;
                    self.request_quit(ctx);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    if self.state.hotkeys.is_active() {
                        self.state.hotkeys = HotkeyStatus::Stopped;
                    }
                    break;
                }
            }
        }
    }

    /// Spawn a new overlay instance. Earlier instances stay open.
    fn open_overlay(&mut self) {
        if self.state.quitting {
            return;
        }
        let id = self.state.next_overlay_id();
        self.overlays.push(OverlayInstance::new(id));
    }

    /// Close the launcher, which ends the process.
    fn request_quit(&mut self, ctx: &egui::Context) {
        if self.state.quitting {
            return;
        }
        self.state.quitting = true;
        crate::log(&format!(
            "Quit requested with {} overlay(s) open",
            self.overlays.len()
        ));
        ctx.send_viewport_cmd(egui::ViewportCommand::Close);
    }
}

impl eframe::App for LauncherApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_hotkeys(ctx);

        let config = get_config();

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.heading("Overlay Ruler");
            ui.add_space(16.0);

            render::render_instructions(ui, &self.state, config);

            let (new_clicked, quit_clicked) = render::render_controls(ui);
            if new_clicked {
                self.open_overlay();
            }
            if quit_clicked {
                self.request_quit(ctx);
            }

            render::render_overlays(ui, &self.overlays);
        });

        for overlay in &mut self.overlays {
            overlay.show(ctx, config);
        }
        self.overlays.retain(OverlayInstance::is_open);
    }

    fn clear_color(&self, _visuals: &egui::Visuals) -> [f32; 4] {
        // Overlay viewports rely on a transparent clear.
        egui::Rgba::TRANSPARENT.to_array()
    }
}

/// Run the GUI application.
/// This function blocks until the launcher window is closed.
pub fn run_gui() -> eframe::Result<()> {
    crate::log("GUI: Creating native options...");

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(Vec2::new(460.0, 320.0))
            .with_min_inner_size(Vec2::new(360.0, 260.0))
            .with_title("Overlay Ruler")
            .with_drag_and_drop(false)
            // The GL config is shared by every viewport, so overlays are
            // only transparent if the root asks for it.
            .with_transparent(true),
        ..Default::default()
    };

    eframe::run_native(
        "Overlay Ruler",
        options,
        Box::new(|cc| {
            crate::log("GUI: Creating launcher...");
            Ok(Box::new(LauncherApp::new(cc)))
        }),
    )
}
