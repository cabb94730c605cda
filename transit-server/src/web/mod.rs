//! Web layer for the transit router.
//!
//! Provides HTTP endpoints for looking up stops and finding routes.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
