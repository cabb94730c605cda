//! Node-link JSON graph documents.
//!
//! The on-disk graph is a node-link document: a list of stops with their
//! coordinates and a list of weighted edges between them.
//!
//! ```json
//! {
//!   "directed": true,
//!   "multigraph": false,
//!   "graph": {},
//!   "nodes": [{"id": "A36", "name": "Chambers St", "lat": 40.714, "lon": -74.008}],
//!   "edges": [{"source": "A36", "target": "A34", "weight": 90.0, "route_id": "A"}]
//! }
//! ```

use std::fmt;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{Position, StopId};

use super::error::GraphError;
use super::network::{Cost, NetworkBuilder, TransitNetwork};

/// A stop entry in a node-link document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: StopId,
    #[serde(default)]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
}

/// An edge entry in a node-link document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: StopId,
    pub target: StopId,
    pub weight: Cost,

    /// Route served on this hop, for ride edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub route_id: Option<String>,

    /// Whether this edge is a walking transfer between stops.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub transfer: bool,
}

/// How document edges become graph edges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum EdgeMode {
    /// Every edge is traversable in both directions.
    #[default]
    Undirected,
    /// Edges are traversable only from source to target.
    Directed,
    /// Follow the document's `directed` flag.
    AsDeclared,
}

impl EdgeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeMode::Undirected => "undirected",
            EdgeMode::Directed => "directed",
            EdgeMode::AsDeclared => "as_declared",
        }
    }
}

/// Error returned when parsing an unrecognised edge mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown edge mode {0:?}, expected undirected, directed or as_declared")]
pub struct UnknownEdgeMode(pub String);

impl FromStr for EdgeMode {
    type Err = UnknownEdgeMode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "undirected" => Ok(EdgeMode::Undirected),
            "directed" => Ok(EdgeMode::Directed),
            "as_declared" | "as-declared" => Ok(EdgeMode::AsDeclared),
            _ => Err(UnknownEdgeMode(s.to_string())),
        }
    }
}

impl fmt::Display for EdgeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

fn default_directed() -> bool {
    true
}

/// A serialized transit graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeLinkDocument {
    #[serde(default = "default_directed")]
    pub directed: bool,

    #[serde(default)]
    pub multigraph: bool,

    /// Free-form graph attributes, kept for round-tripping.
    #[serde(default)]
    pub graph: serde_json::Map<String, serde_json::Value>,

    pub nodes: Vec<NodeRecord>,

    #[serde(alias = "links")]
    pub edges: Vec<EdgeRecord>,
}

impl Default for NodeLinkDocument {
    fn default() -> Self {
        Self {
            directed: true,
            multigraph: false,
            graph: serde_json::Map::new(),
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }
}

impl NodeLinkDocument {
    /// Parse a document from any reader.
    pub fn from_reader(reader: impl Read) -> Result<Self, GraphError> {
        Ok(serde_json::from_reader(reader)?)
    }

    /// Load a document from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, GraphError> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| GraphError::io(path, e))?;
        let doc = Self::from_reader(BufReader::new(file))?;
        info!(
            path = %path.display(),
            nodes = doc.nodes.len(),
            edges = doc.edges.len(),
            "Loaded graph document"
        );
        Ok(doc)
    }

    /// Serialize the document as pretty-printed JSON.
    pub fn to_writer(&self, writer: impl Write) -> Result<(), GraphError> {
        Ok(serde_json::to_writer_pretty(writer, self)?)
    }

    /// Write the document to a JSON file.
    ///
    /// Creates parent directories if they don't exist.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), GraphError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| GraphError::io(parent, e))?;
        }

        let file = File::create(path).map_err(|e| GraphError::io(path, e))?;
        let mut writer = BufWriter::new(file);
        self.to_writer(&mut writer)?;
        writer.flush().map_err(|e| GraphError::io(path, e))?;

        info!(
            path = %path.display(),
            nodes = self.nodes.len(),
            edges = self.edges.len(),
            "Saved graph document"
        );
        Ok(())
    }

    /// Build a routable network from this document.
    ///
    /// Fails if an edge refers to a stop missing from `nodes` or carries a
    /// negative or non-finite weight.
    pub fn to_network(&self, mode: EdgeMode) -> Result<TransitNetwork, GraphError> {
        let undirected = match mode {
            EdgeMode::Undirected => true,
            EdgeMode::Directed => false,
            EdgeMode::AsDeclared => !self.directed,
        };

        let mut builder = NetworkBuilder::new();
        for node in &self.nodes {
            builder.add_stop(
                node.id.clone(),
                node.name.clone(),
                Position::new(node.lat, node.lon),
            )?;
        }

        for edge in &self.edges {
            if undirected {
                builder.add_undirected_edge(&edge.source, &edge.target, edge.weight)?;
            } else {
                builder.add_edge(&edge.source, &edge.target, edge.weight)?;
            }
        }

        debug!(?mode, "Converted graph document");
        Ok(builder.build())
    }
}
