//! Overlay interaction state machine.
//!
//! Calibration collects two clicks a known real distance apart and derives
//! meters per pixel. Measurement then converts any click pair to meters.
//! `transition` is pure; the overlay shell owns one state cell per window.

use crate::measure::geometry::{compute_scale, pixel_distance, to_meters, Point, ScaleError};

/// Which interpretation clicks currently get.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    Calibrating,
    Measuring,
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Mode::Calibrating => write!(f, "Calibrating"),
            Mode::Measuring => write!(f, "Measuring"),
        }
    }
}

/// Up to two clicked points. A second point never exists without a first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointPair {
    #[default]
    Empty,
    First(Point),
    Both(Point, Point),
}

impl PointPair {
    /// Returns both endpoints once the pair is complete.
    pub fn endpoints(&self) -> Option<(Point, Point)> {
        match *self {
            PointPair::Both(a, b) => Some((a, b)),
            _ => None,
        }
    }

    /// Adds a click: fills the next free slot, or restarts from the click
    /// when the pair is already complete.
    pub fn push(self, p: Point) -> PointPair {
        match self {
            PointPair::Empty => PointPair::First(p),
            PointPair::First(a) => PointPair::Both(a, p),
            PointPair::Both(..) => PointPair::First(p),
        }
    }
}

/// State of one overlay instance.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum OverlayState {
    /// Waiting for the reference click pair.
    Calibrating { points: PointPair },
    /// Scale is known; clicks measure distances.
    Measuring {
        points: PointPair,
        meters_per_pixel: f64,
    },
}

impl Default for OverlayState {
    fn default() -> Self {
        OverlayState::Calibrating {
            points: PointPair::Empty,
        }
    }
}

/// Pointer buttons the overlay can receive.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
    Other,
}

/// Keys the overlay reacts to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayKey {
    Escape,
    R,
    Other,
}

/// Input delivered to an overlay instance, in arrival order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OverlayEvent {
    Click { button: PointerButton, at: Point },
    Key(OverlayKey),
}

/// Side effect of a transition, for the shell to act on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Effect {
    /// Nothing changed.
    None,
    /// A point was stored without completing a pair.
    PointPlaced,
    /// Calibration finished and the overlay switched to measuring.
    Calibrated {
        pixel_distance: f64,
        meters_per_pixel: f64,
    },
    /// The second calibration click was rejected.
    DegenerateCalibration(ScaleError),
    /// A measurement pair was completed.
    Measured { meters: f64 },
    /// Calibration and measurement were discarded.
    Reset,
    /// The instance should close.
    Close,
}

/// Line and label to draw for a complete point pair.
#[derive(Clone, Debug, PartialEq)]
pub struct Annotation {
    pub from: Point,
    pub to: Point,
    /// Label anchor, the segment midpoint.
    pub anchor: Point,
    pub label: String,
}

impl OverlayState {
    pub fn mode(&self) -> Mode {
        match self {
            OverlayState::Calibrating { .. } => Mode::Calibrating,
            OverlayState::Measuring { .. } => Mode::Measuring,
        }
    }

    pub fn points(&self) -> PointPair {
        match *self {
            OverlayState::Calibrating { points } | OverlayState::Measuring { points, .. } => {
                points
            }
        }
    }

    pub fn meters_per_pixel(&self) -> Option<f64> {
        match *self {
            OverlayState::Calibrating { .. } => None,
            OverlayState::Measuring {
                meters_per_pixel, ..
            } => Some(meters_per_pixel),
        }
    }

    /// Returns what to draw, if the active pair is complete.
    pub fn annotation(&self, reference_distance_m: f64) -> Option<Annotation> {
        let (from, to) = self.points().endpoints()?;
        let pixels = pixel_distance(from, to);
        let label = match *self {
            OverlayState::Calibrating { .. } => {
                format!("{:.2} px = {} m", pixels, reference_distance_m)
            }
            OverlayState::Measuring {
                meters_per_pixel, ..
            } => format!("{:.2} m", to_meters(pixels, meters_per_pixel)),
        };
        Some(Annotation {
            from,
            to,
            anchor: from.midpoint(to),
            label,
        })
    }
}

/// Applies one input event to a state.
///
/// `reference_distance_m` is the real distance the calibration clicks span.
pub fn transition(
    state: OverlayState,
    event: OverlayEvent,
    reference_distance_m: f64,
) -> (OverlayState, Effect) {
    match event {
        OverlayEvent::Key(OverlayKey::Escape) => (state, Effect::Close),
        OverlayEvent::Key(OverlayKey::R) => (OverlayState::default(), Effect::Reset),
        OverlayEvent::Key(OverlayKey::Other) => (state, Effect::None),
        OverlayEvent::Click { button, .. } if button != PointerButton::Primary => {
            (state, Effect::None)
        }
        OverlayEvent::Click { at, .. } => click(state, at, reference_distance_m),
    }
}

fn click(state: OverlayState, at: Point, reference_distance_m: f64) -> (OverlayState, Effect) {
    match state {
        OverlayState::Calibrating {
            points: PointPair::First(first),
        } => {
            let pixels = pixel_distance(first, at);
            match compute_scale(pixels, reference_distance_m) {
                Ok(meters_per_pixel) => (
                    OverlayState::Measuring {
                        points: PointPair::Empty,
                        meters_per_pixel,
                    },
                    Effect::Calibrated {
                        pixel_distance: pixels,
                        meters_per_pixel,
                    },
                ),
                // Second point is dropped; the first one stays.
                Err(e) => (state, Effect::DegenerateCalibration(e)),
            }
        }
        OverlayState::Calibrating { points } => (
            OverlayState::Calibrating {
                points: points.push(at),
            },
            Effect::PointPlaced,
        ),
        OverlayState::Measuring {
            points,
            meters_per_pixel,
        } => {
            let points = points.push(at);
            let effect = match points.endpoints() {
                Some((a, b)) => Effect::Measured {
                    meters: to_meters(pixel_distance(a, b), meters_per_pixel),
                },
                None => Effect::PointPlaced,
            };
            (
                OverlayState::Measuring {
                    points,
                    meters_per_pixel,
                },
                effect,
            )
        }
    }
}
