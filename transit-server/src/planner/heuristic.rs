//! Remaining-cost estimates that steer the search toward the goal.
//!
//! A heuristic only orders the frontier. Routes found with a heuristic that
//! overestimates the remaining cost (or with a weight factor above 1) are
//! not guaranteed to be cheapest.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::Position;

/// Estimate of the remaining cost from one position to the goal.
///
/// Implementations must be pure and return a non-negative value; the search
/// may evaluate the same pair many times.
pub trait Heuristic {
    fn estimate(&self, from: Position, goal: Position) -> f64;
}

impl<F> Heuristic for F
where
    F: Fn(Position, Position) -> f64,
{
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        self(from, goal)
    }
}

/// Sum of absolute latitude and longitude differences.
///
/// Cheap, but measured in degrees, so it is not in the same unit as
/// time-based edge costs and is not admissible for them.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Manhattan;

impl Heuristic for Manhattan {
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        from.manhattan_degrees(&goal)
    }
}

/// Great-circle distance divided by an assumed average speed.
///
/// Yields seconds, matching edge costs built from GTFS schedules.
/// Admissible whenever no vehicle in the network beats `speed_mps`
/// as the crow flies.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TravelTime {
    pub speed_mps: f64,
}

impl TravelTime {
    /// Average urban rail speed.
    pub const DEFAULT_SPEED_MPS: f64 = 8.0;

    pub fn new(speed_mps: f64) -> Self {
        Self { speed_mps }
    }
}

impl Default for TravelTime {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SPEED_MPS)
    }
}

impl Heuristic for TravelTime {
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        from.haversine_metres(&goal) / self.speed_mps
    }
}

/// Always zero: the search degrades to uniform-cost (Dijkstra) order.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Zero;

impl Heuristic for Zero {
    fn estimate(&self, _from: Position, _goal: Position) -> f64 {
        0.0
    }
}

/// Runtime choice of built-in heuristic.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeuristicKind {
    #[default]
    Manhattan,
    TravelTime,
    Zero,
}

impl HeuristicKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HeuristicKind::Manhattan => "manhattan",
            HeuristicKind::TravelTime => "travel_time",
            HeuristicKind::Zero => "zero",
        }
    }
}

impl Heuristic for HeuristicKind {
    fn estimate(&self, from: Position, goal: Position) -> f64 {
        match self {
            HeuristicKind::Manhattan => Manhattan.estimate(from, goal),
            HeuristicKind::TravelTime => TravelTime::default().estimate(from, goal),
            HeuristicKind::Zero => Zero.estimate(from, goal),
        }
    }
}

/// Error returned when parsing an unknown heuristic name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown heuristic {0:?} (expected manhattan, travel_time or zero)")]
pub struct UnknownHeuristic(pub String);

impl FromStr for HeuristicKind {
    type Err = UnknownHeuristic;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "manhattan" => Ok(HeuristicKind::Manhattan),
            "travel_time" | "travel-time" => Ok(HeuristicKind::TravelTime),
            "zero" | "none" => Ok(HeuristicKind::Zero),
            _ => Err(UnknownHeuristic(s.to_string())),
        }
    }
}

impl fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pos(lat: f64, lon: f64) -> Position {
        Position::new(lat, lon)
    }

    #[test]
    fn manhattan_sums_axes() {
        assert_eq!(Manhattan.estimate(pos(0.0, 0.0), pos(2.0, 0.0)), 2.0);
        assert_eq!(Manhattan.estimate(pos(1.0, -1.0), pos(-1.0, 1.0)), 4.0);
        assert_eq!(Manhattan.estimate(pos(3.0, 3.0), pos(3.0, 3.0)), 0.0);
    }

    #[test]
    fn travel_time_is_distance_over_speed() {
        let a = pos(40.0, -74.0);
        let b = pos(40.01, -74.0);
        let metres = a.haversine_metres(&b);

        let est = TravelTime::default().estimate(a, b);
        assert!((est - metres / 8.0).abs() < 1e-9);

        let faster = TravelTime::new(16.0).estimate(a, b);
        assert!((faster * 2.0 - est).abs() < 1e-9);
    }

    #[test]
    fn zero_is_zero() {
        assert_eq!(Zero.estimate(pos(0.0, 0.0), pos(50.0, 50.0)), 0.0);
    }

    #[test]
    fn closures_are_heuristics() {
        let double = |a: Position, b: Position| 2.0 * (a.lat - b.lat).abs();
        assert_eq!(double.estimate(pos(1.0, 0.0), pos(4.0, 9.0)), 6.0);
    }

    #[test]
    fn kind_dispatches() {
        let (a, b) = (pos(0.0, 0.0), pos(0.5, 0.5));
        assert_eq!(HeuristicKind::Manhattan.estimate(a, b), 1.0);
        assert_eq!(HeuristicKind::Zero.estimate(a, b), 0.0);
        assert_eq!(
            HeuristicKind::TravelTime.estimate(a, b),
            TravelTime::default().estimate(a, b)
        );
    }

    #[test]
    fn kind_parses_and_displays() {
        assert_eq!("manhattan".parse(), Ok(HeuristicKind::Manhattan));
        assert_eq!(" Travel_Time ".parse(), Ok(HeuristicKind::TravelTime));
        assert_eq!("travel-time".parse(), Ok(HeuristicKind::TravelTime));
        assert_eq!("zero".parse(), Ok(HeuristicKind::Zero));
        assert!("euclid".parse::<HeuristicKind>().is_err());

        for kind in [
            HeuristicKind::Manhattan,
            HeuristicKind::TravelTime,
            HeuristicKind::Zero,
        ] {
            assert_eq!(kind.to_string().parse(), Ok(kind));
        }
    }

    #[test]
    fn kind_serde_names() {
        assert_eq!(
            serde_json::to_string(&HeuristicKind::TravelTime).unwrap(),
            r#""travel_time""#
        );
        assert_eq!(
            serde_json::from_str::<HeuristicKind>(r#""zero""#).unwrap(),
            HeuristicKind::Zero
        );
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn position() -> impl Strategy<Value = Position> {
        (-80.0f64..80.0, -179.0f64..179.0).prop_map(|(lat, lon)| Position::new(lat, lon))
    }

    proptest! {
        /// Built-in heuristics are non-negative and zero at the goal.
        #[test]
        fn non_negative_and_zero_at_goal(a in position(), b in position()) {
            for kind in [HeuristicKind::Manhattan, HeuristicKind::TravelTime, HeuristicKind::Zero] {
                prop_assert!(kind.estimate(a, b) >= 0.0);
                prop_assert!(kind.estimate(b, b).abs() < 1e-6);
            }
        }

        /// Both distance heuristics are symmetric.
        #[test]
        fn symmetric(a in position(), b in position()) {
            prop_assert_eq!(Manhattan.estimate(a, b), Manhattan.estimate(b, a));
            let (ab, ba) = (TravelTime::default().estimate(a, b), TravelTime::default().estimate(b, a));
            prop_assert!((ab - ba).abs() < 1e-6);
        }
    }
}
