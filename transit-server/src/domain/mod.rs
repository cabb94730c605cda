//! Domain types for the transit router.
//!
//! This module contains the validated value types shared by the graph
//! builder and the search. All types enforce their invariants at
//! construction time.

mod error;
mod position;
mod stop;
mod time;

pub use error::DomainError;
pub use position::Position;
pub use stop::{InvalidStopId, StopId};
pub use time::{ServiceTime, TimeError};
