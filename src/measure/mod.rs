//! Measurement core: pixel geometry, the overlay state machine and scene
//! painting. Nothing here depends on the windowing backend.

pub mod geometry;
pub mod render;
pub mod state;

pub use geometry::{Point, DEFAULT_REFERENCE_DISTANCE_M};
pub use render::{mode_hint, paint, Surface};
pub use state::{transition, Effect, Mode, OverlayEvent, OverlayKey, OverlayState, PointerButton};
