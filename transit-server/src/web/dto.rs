//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

use crate::graph::StopInfo;

/// Query for `GET /route`.
#[derive(Debug, Deserialize)]
pub struct RouteRequest {
    /// Origin stop id
    pub from: String,

    /// Destination stop id
    pub to: String,

    /// Heuristic weight, overriding the server default
    pub weight: Option<f64>,

    /// Heuristic name (`manhattan`, `travel_time`, `zero`)
    pub heuristic: Option<String>,
}

/// A stop on a route or in search results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopResult {
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

impl From<StopInfo> for StopResult {
    fn from(info: StopInfo) -> Self {
        Self {
            id: info.id.to_string(),
            name: info.name,
            lat: info.position.lat,
            lon: info.position.lon,
        }
    }
}

/// Response for `GET /route`.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    /// Whether a route exists
    pub found: bool,

    /// Stop ids from origin to destination; empty when not found
    pub path: Vec<String>,

    /// Total route cost; `null` when not found
    pub cost: Option<f64>,

    /// Details of each stop on `path`
    pub stops: Vec<StopResult>,

    /// Nodes expanded by the search
    pub expanded: usize,
}

/// Query for `GET /stops`.
#[derive(Debug, Deserialize)]
pub struct StopSearchRequest {
    /// Search query (partial stop id or name)
    pub q: String,

    /// Maximum results to return (default 10, capped at 50)
    pub limit: Option<usize>,
}

/// Response for `GET /stops`.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
