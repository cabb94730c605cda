//! Route planner using weighted A* search.
//!
//! This module implements the core routing algorithm that answers:
//! "what is the cheapest way from this stop to that one?"
//!
//! The search is generic over the node type, so it runs equally on the
//! transit network's [`StopId`](crate::domain::StopId) keys and on small
//! synthetic graphs in tests.

mod config;
mod frontier;
mod heuristic;
mod search;


pub use config::{InvalidWeight, SearchConfig};
pub use heuristic::{Heuristic, HeuristicKind, Manhattan, TravelTime, UnknownHeuristic, Zero};
pub use search::{Outcome, Planner, Route, SearchError, SearchResult, SearchStats, search};
