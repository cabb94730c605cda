//! HTTP route handlers.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use tower_http::trace::TraceLayer;
use tracing::{debug, error, warn};

use crate::domain::StopId;
use crate::planner::{HeuristicKind, SearchError};

use super::dto::*;
use super::state::AppState;

const DEFAULT_STOP_LIMIT: usize = 10;
const MAX_STOP_LIMIT: usize = 50;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops", get(search_stops))
        .route("/route", get(find_route))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by id or name.
async fn search_stops(
    State(state): State<AppState>,
    Query(req): Query<StopSearchRequest>,
) -> Json<StopSearchResponse> {
    let limit = req.limit.unwrap_or(DEFAULT_STOP_LIMIT).min(MAX_STOP_LIMIT);
    let stops = state
        .network
        .search_stops(&req.q, limit)
        .into_iter()
        .map(StopResult::from)
        .collect();

    Json(StopSearchResponse { stops })
}

/// Parse a stop id from a query parameter and check the network has it.
fn known_stop(state: &AppState, param: &str, raw: &str) -> Result<StopId, AppError> {
    let stop = StopId::parse_normalized(raw).map_err(|e| AppError::BadRequest {
        message: format!("Invalid {param} stop: {e}"),
    })?;
    if !state.network.contains_stop(&stop) {
        return Err(AppError::NotFound {
            message: format!("Unknown stop: {stop}"),
        });
    }
    Ok(stop)
}

/// Find the cheapest route between two stops.
async fn find_route(
    State(state): State<AppState>,
    Query(req): Query<RouteRequest>,
) -> Result<Json<RouteResponse>, AppError> {
    let from = known_stop(&state, "from", &req.from)?;
    let to = known_stop(&state, "to", &req.to)?;

    let mut config = (*state.config).clone();
    if let Some(weight) = req.weight {
        config = config.with_weight(weight);
    }
    if let Some(name) = req.heuristic.as_deref() {
        let heuristic = name.parse::<HeuristicKind>().map_err(|e| AppError::BadRequest {
            message: e.to_string(),
        })?;
        config = config.with_heuristic(heuristic);
    }

    debug!(%from, %to, weight = config.weight_factor, heuristic = %config.heuristic, "Route request");

    // The search is CPU-bound; keep it off the async workers
    let network = Arc::clone(&state.network);
    let response = tokio::task::spawn_blocking(move || {
        let result = network.route(&from, &to, &config)?;
        let expanded = result.stats.expanded;

        let response = match result.outcome.into_route() {
            Some(route) => RouteResponse {
                found: true,
                stops: route
                    .path
                    .iter()
                    .filter_map(|stop| network.stop_info(stop))
                    .map(StopResult::from)
                    .collect(),
                path: route.path.iter().map(StopId::to_string).collect(),
                cost: Some(route.cost),
                expanded,
            },
            None => RouteResponse {
                found: false,
                path: Vec::new(),
                cost: None,
                stops: Vec::new(),
                expanded,
            },
        };
        Ok::<_, SearchError<StopId>>(response)
    })
    .await
    .map_err(|e| AppError::Internal {
        message: format!("Search task failed: {e}"),
    })??;

    Ok(Json(response))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
    Internal { message: String },
}

impl From<SearchError<StopId>> for AppError {
    fn from(e: SearchError<StopId>) -> Self {
        match e {
            SearchError::InvalidWeight(_) => AppError::BadRequest {
                message: e.to_string(),
            },
            _ => AppError::Internal {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
            AppError::Internal { message } => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };

        if status.is_server_error() {
            error!(%status, %message, "Request failed");
        } else {
            warn!(%status, %message, "Request rejected");
        }

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
