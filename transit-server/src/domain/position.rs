//! Geographic positions of stops.

use serde::{Deserialize, Serialize};

/// Mean Earth radius in metres.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A latitude/longitude pair in decimal degrees.
///
/// Positions only feed search heuristics; they never contribute to the
/// true cost of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

impl Position {
    /// Create a new position.
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Whether both coordinates are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lon.is_finite()
    }

    /// Sum of absolute coordinate differences, in degrees.
    ///
    /// This treats the coordinates as a flat grid and ignores both
    /// projection and curvature.
    pub fn manhattan_degrees(&self, other: &Position) -> f64 {
        (self.lat - other.lat).abs() + (self.lon - other.lon).abs()
    }

    /// Great-circle distance in metres (haversine formula).
    pub fn haversine_metres(&self, other: &Position) -> f64 {
        let p = std::f64::consts::PI / 180.0;
        let a = 0.5 - ((other.lat - self.lat) * p).cos() / 2.0
            + (self.lat * p).cos() * (other.lat * p).cos() * (1.0 - ((other.lon - self.lon) * p).cos())
                / 2.0;

        // Rounding can push `a` fractionally outside [0, 1].
        2.0 * EARTH_RADIUS_M * a.clamp(0.0, 1.0).sqrt().asin()
    }
}

impl From<(f64, f64)> for Position {
    fn from((lat, lon): (f64, f64)) -> Self {
        Self::new(lat, lon)
    }
}
