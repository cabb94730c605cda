//! Transit graph: adjacency structure, positions and the builders that
//! produce them.
//!
//! A [`TransitNetwork`] is assembled either directly with
//! [`NetworkBuilder`], from a persisted [`NodeLinkDocument`], or from a GTFS
//! feed via [`gtfs::build_document`].

mod error;
pub mod gtfs;
mod network;
mod node_link;

pub use error::{GraphError, InvalidCost};
pub use gtfs::GtfsConfig;
pub use network::{Cost, Edge, Graph, NetworkBuilder, PositionTable, StopInfo, TransitNetwork};
pub use node_link::{EdgeMode, EdgeRecord, NodeLinkDocument, NodeRecord, UnknownEdgeMode};
