//! Overlay Ruler
//!
//! Puts a translucent full-screen layer over other applications, calibrates
//! a pixels-to-meters scale from two clicks a known distance apart and then
//! measures on-screen distances with it.

// Hide console window on Windows for GUI mode
#![windows_subsystem = "windows"]

mod config;
mod gui;
mod hotkey;
mod measure;
mod overlay;
mod paths;

use anyhow::{anyhow, Result};
use chrono::Local;
use std::fs::OpenOptions;
use std::io::Write;

/// Logs a message to both console and log file with timestamp.
pub fn log(msg: &str) {
    let timestamp = Local::now().format("%H:%M:%S%.3f");
    let line = format!("[{}] {}\n", timestamp, msg);
    print!("{}", line);
    if let Ok(mut file) = OpenOptions::new()
        .create(true)
        .append(true)
        .open(paths::get_log_file())
    {
        let _ = file.write_all(line.as_bytes());
    }
}

fn main() -> Result<()> {
    // Set up panic hook to log panics
    std::panic::set_hook(Box::new(|panic_info| {
        let msg = if let Some(s) = panic_info.payload().downcast_ref::<&str>() {
            s.to_string()
        } else if let Some(s) = panic_info.payload().downcast_ref::<String>() {
            s.clone()
        } else {
            "Unknown panic".to_string()
        };
        let location = if let Some(loc) = panic_info.location() {
            format!(" at {}:{}:{}", loc.file(), loc.line(), loc.column())
        } else {
            String::new()
        };
        log(&format!("[PANIC]{} {}", location, msg));
    }));

    // Ensure output directories exist
    if let Err(e) = paths::ensure_directories() {
        eprintln!("Could not create log directory: {}", e);
    }

    log("Overlay Ruler starting");

    // Load configuration
    config::init_config();

    match gui::run_gui() {
        Ok(()) => {
            log("Overlay Ruler exited normally");
            Ok(())
        }
        Err(e) => {
            log(&format!("GUI error: {}", e));
            Err(anyhow!("GUI error: {}", e))
        }
    }
}
