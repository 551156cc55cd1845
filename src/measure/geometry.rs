//! Pixel geometry and scale conversion.
//!
//! All distances are computed in physical pixels relative to the overlay
//! surface origin. Scale is expressed as meters per pixel.

use thiserror::Error;

/// Real distance covered by a calibration click pair, in meters.
pub const DEFAULT_REFERENCE_DISTANCE_M: f64 = 100.0;

/// A pixel coordinate on the overlay surface.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Integer midpoint of two points, rounded towards negative infinity.
    pub fn midpoint(self, other: Point) -> Point {
        let mx = (i64::from(self.x) + i64::from(other.x)).div_euclid(2);
        let my = (i64::from(self.y) + i64::from(other.y)).div_euclid(2);
        // Both values lie between two i32s, so they fit.
        Point::new(mx as i32, my as i32)
    }
}

/// Errors raised while deriving a scale.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ScaleError {
    /// Both calibration points coincide.
    #[error("calibration points coincide, cannot divide by a zero pixel distance")]
    DivisionByZero,
}

/// Euclidean distance between two points, in pixels.
pub fn pixel_distance(a: Point, b: Point) -> f64 {
    let dx = f64::from(a.x) - f64::from(b.x);
    let dy = f64::from(a.y) - f64::from(b.y);
    dx.hypot(dy)
}

/// Derives meters per pixel from a measured pixel distance and the real
/// distance it spans.
pub fn compute_scale(pixel_distance: f64, real_distance_m: f64) -> Result<f64, ScaleError> {
    if pixel_distance == 0.0 {
        return Err(ScaleError::DivisionByZero);
    }
    Ok(real_distance_m / pixel_distance)
}

/// Converts a pixel distance to meters.
pub fn to_meters(pixel_distance: f64, meters_per_pixel: f64) -> f64 {
    pixel_distance * meters_per_pixel
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_pixel_distance_is_symmetric() {
        let samples = [
            (Point::new(0, 0), Point::new(3, 4)),
            (Point::new(-20, 7), Point::new(110, -45)),
            (Point::new(1920, 1080), Point::new(0, 0)),
        ];
        for (a, b) in samples {
            assert_eq!(pixel_distance(a, b), pixel_distance(b, a));
        }
        assert!((pixel_distance(Point::new(0, 0), Point::new(3, 4)) - 5.0).abs() < EPS);
    }

    #[test]
    fn test_pixel_distance_to_self_is_zero() {
        let p = Point::new(512, -17);
        assert_eq!(pixel_distance(p, p), 0.0);
    }

    #[test]
    fn test_compute_scale_rejects_zero_distance() {
        assert_eq!(
            compute_scale(0.0, DEFAULT_REFERENCE_DISTANCE_M),
            Err(ScaleError::DivisionByZero)
        );
        let scale = compute_scale(300.0, DEFAULT_REFERENCE_DISTANCE_M).unwrap();
        assert!((scale - 100.0 / 300.0).abs() < EPS);
        assert!(compute_scale(0.5, DEFAULT_REFERENCE_DISTANCE_M).is_ok());
    }

    #[test]
    fn test_to_meters_inverts_scale() {
        for mpp in [0.001, 0.3333, 1.0, 42.5] {
            for d in [0.0, 1.0, 150.0, 2203.7] {
                let meters = to_meters(d, mpp);
                assert!((meters / mpp - d).abs() < 1e-6, "mpp={} d={}", mpp, d);
            }
        }
    }

    #[test]
    fn test_midpoint_floors() {
        assert_eq!(Point::new(0, 0).midpoint(Point::new(150, 0)), Point::new(75, 0));
        assert_eq!(Point::new(0, 0).midpoint(Point::new(3, 5)), Point::new(1, 2));
        assert_eq!(Point::new(-3, 0).midpoint(Point::new(0, 0)), Point::new(-2, 0));
        assert_eq!(
            Point::new(i32::MAX, i32::MIN).midpoint(Point::new(i32::MAX, i32::MIN)),
            Point::new(i32::MAX, i32::MIN)
        );
    }
}
