//! Adjacency graph, position table and the assembled transit network.

use std::collections::HashMap;
use std::hash::Hash;

use tracing::debug;

use crate::domain::{Position, StopId};
use crate::planner::{Planner, SearchConfig, SearchError, SearchResult};

use super::error::{GraphError, InvalidCost};

/// Cost of traversing an edge. For GTFS-derived graphs this is seconds.
pub type Cost = f64;

/// A directed edge to `to` costing `cost`.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge<N> {
    pub to: N,
    pub cost: Cost,
}

/// Directed weighted adjacency list.
///
/// Every stored cost is finite and non-negative; the search relies on this
/// and does not check it again.
#[derive(Debug, Clone)]
pub struct Graph<N> {
    adjacency: HashMap<N, Vec<Edge<N>>>,
}

impl<N> Default for Graph<N> {
    fn default() -> Self {
        Self {
            adjacency: HashMap::new(),
        }
    }
}

impl<N: Clone + Eq + Hash> Graph<N> {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from `(from, to, cost)` triples.
    ///
    /// # Examples
    ///
    /// ```
    /// use transit_server::graph::Graph;
    ///
    /// let g = Graph::from_edges([("A", "B", 1.0), ("B", "C", 2.0)]).unwrap();
    /// assert_eq!(g.neighbors(&"A").len(), 1);
    /// assert!(g.neighbors(&"C").is_empty());
    /// assert!(Graph::from_edges([("A", "B", -1.0)]).is_err());
    /// ```
    pub fn from_edges(edges: impl IntoIterator<Item = (N, N, Cost)>) -> Result<Self, InvalidCost> {
        let mut graph = Self::new();
        for (from, to, cost) in edges {
            graph.add_edge(from, to, cost)?;
        }
        Ok(graph)
    }

    /// Ensure `node` has an adjacency entry, even with no out-edges.
    pub fn add_node(&mut self, node: N) {
        self.adjacency.entry(node).or_default();
    }

    /// Append a directed edge.
    ///
    /// Both endpoints get an adjacency entry. Parallel edges are kept.
    pub fn add_edge(&mut self, from: N, to: N, cost: Cost) -> Result<(), InvalidCost> {
        if !cost.is_finite() || cost < 0.0 {
            return Err(InvalidCost { cost });
        }
        self.add_node(to.clone());
        self.adjacency.entry(from).or_default().push(Edge { to, cost });
        Ok(())
    }

    /// Append an edge in each direction with the same cost.
    pub fn add_undirected_edge(&mut self, a: N, b: N, cost: Cost) -> Result<(), InvalidCost> {
        self.add_edge(a.clone(), b.clone(), cost)?;
        self.add_edge(b, a, cost)
    }

    /// Outgoing edges of `node`, in insertion order.
    ///
    /// Nodes without an adjacency entry have no out-edges.
    pub fn neighbors(&self, node: &N) -> &[Edge<N>] {
        self.adjacency.get(node).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cheapest direct edge cost from `from` to `to`, if any.
    pub fn edge_cost(&self, from: &N, to: &N) -> Option<Cost> {
        self.neighbors(from)
            .iter()
            .filter(|e| &e.to == to)
            .map(|e| e.cost)
            .min_by(f64::total_cmp)
    }

    /// Sum of the cheapest edge costs along `path`.
    ///
    /// Returns `None` if two consecutive nodes are not connected.
    pub fn path_cost(&self, path: &[N]) -> Option<Cost> {
        path.windows(2)
            .map(|pair| self.edge_cost(&pair[0], &pair[1]))
            .sum()
    }

    /// Whether `node` has an adjacency entry.
    pub fn contains(&self, node: &N) -> bool {
        self.adjacency.contains_key(node)
    }

    /// All nodes with an adjacency entry, in arbitrary order.
    pub fn nodes(&self) -> impl Iterator<Item = &N> {
        self.adjacency.keys()
    }

    /// Number of nodes with an adjacency entry.
    pub fn node_count(&self) -> usize {
        self.adjacency.len()
    }

    /// Number of directed edges.
    pub fn edge_count(&self) -> usize {
        self.adjacency.values().map(Vec::len).sum()
    }
}

/// Mapping from node to its coordinates.
#[derive(Debug, Clone)]
pub struct PositionTable<N> {
    positions: HashMap<N, Position>,
}

impl<N> Default for PositionTable<N> {
    fn default() -> Self {
        Self {
            positions: HashMap::new(),
        }
    }
}

impl<N: Eq + Hash> PositionTable<N> {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the position of `node`, replacing any previous entry.
    pub fn insert(&mut self, node: N, position: Position) {
        self.positions.insert(node, position);
    }

    /// Look up the position of `node`.
    pub fn get(&self, node: &N) -> Option<Position> {
        self.positions.get(node).copied()
    }

    pub fn contains(&self, node: &N) -> bool {
        self.positions.contains_key(node)
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<N: Eq + Hash, P: Into<Position>> FromIterator<(N, P)> for PositionTable<N> {
    fn from_iter<I: IntoIterator<Item = (N, P)>>(iter: I) -> Self {
        Self {
            positions: iter.into_iter().map(|(n, p)| (n, p.into())).collect(),
        }
    }
}

/// A stop with its display name and coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct StopInfo {
    pub id: StopId,
    pub name: String,
    pub position: Position,
}

/// A transit network ready for routing.
///
/// Built once by [`NetworkBuilder`] and immutable afterwards, so it can be
/// shared between concurrent searches.
#[derive(Debug, Clone, Default)]
pub struct TransitNetwork {
    pub graph: Graph<StopId>,
    pub positions: PositionTable<StopId>,
    names: HashMap<StopId, String>,
}

impl TransitNetwork {
    /// Display name of a stop, if known.
    pub fn stop_name(&self, stop: &StopId) -> Option<&str> {
        self.names.get(stop).map(String::as_str)
    }

    /// Full description of a stop, if it has a position.
    pub fn stop_info(&self, stop: &StopId) -> Option<StopInfo> {
        let position = self.positions.get(stop)?;
        Some(StopInfo {
            id: stop.clone(),
            name: self.stop_name(stop).unwrap_or_default().to_string(),
            position,
        })
    }

    /// Whether the stop is part of the network.
    pub fn contains_stop(&self, stop: &StopId) -> bool {
        self.positions.contains(stop) || self.graph.contains(stop)
    }

    /// Number of stops with a known position.
    pub fn stop_count(&self) -> usize {
        self.positions.len()
    }

    /// Search stops by case-insensitive substring of id or name.
    ///
    /// Exact id matches come first, then results ordered by name.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<StopInfo> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }

        let mut matches: Vec<StopInfo> = self
            .names
            .iter()
            .filter(|(id, name)| {
                id.as_str().to_lowercase().contains(&needle)
                    || name.to_lowercase().contains(&needle)
            })
            .filter_map(|(id, _)| self.stop_info(id))
            .collect();

        matches.sort_by(|a, b| {
            let a_exact = a.id.as_str().to_lowercase() == needle;
            let b_exact = b.id.as_str().to_lowercase() == needle;
            b_exact
                .cmp(&a_exact)
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.id.cmp(&b.id))
        });
        matches.truncate(limit);
        matches
    }

    /// Find a route between two stops using the configured heuristic.
    pub fn route(
        &self,
        start: &StopId,
        goal: &StopId,
        config: &SearchConfig,
    ) -> Result<SearchResult<StopId>, SearchError<StopId>> {
        let planner = Planner::new(&config.heuristic, config);
        planner.search(&self.graph, &self.positions, start, goal)
    }
}

/// Incremental builder for a [`TransitNetwork`].
///
/// Stops must be added before any edge that refers to them.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    network: TransitNetwork,
}

impl NetworkBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) a stop.
    ///
    /// Fails if either coordinate is NaN or infinite.
    pub fn add_stop(
        &mut self,
        id: StopId,
        name: impl Into<String>,
        position: Position,
    ) -> Result<(), GraphError> {
        if !position.is_finite() {
            return Err(GraphError::InvalidPosition {
                stop: id,
                lat: position.lat,
                lon: position.lon,
            });
        }
        self.network.graph.add_node(id.clone());
        self.network.positions.insert(id.clone(), position);
        self.network.names.insert(id, name.into());
        Ok(())
    }

    /// Add a directed edge between two known stops.
    pub fn add_edge(&mut self, from: &StopId, to: &StopId, cost: Cost) -> Result<(), GraphError> {
        self.check_known(from)?;
        self.check_known(to)?;
        self.network
            .graph
            .add_edge(from.clone(), to.clone(), cost)
            .map_err(|source| GraphError::InvalidCost {
                from: from.clone(),
                to: to.clone(),
                source,
            })
    }

    /// Add an edge in both directions between two known stops.
    pub fn add_undirected_edge(
        &mut self,
        a: &StopId,
        b: &StopId,
        cost: Cost,
    ) -> Result<(), GraphError> {
        self.add_edge(a, b, cost)?;
        self.add_edge(b, a, cost)
    }

    fn check_known(&self, stop: &StopId) -> Result<(), GraphError> {
        if self.network.positions.contains(stop) {
            Ok(())
        } else {
            Err(GraphError::UnknownStop(stop.clone()))
        }
    }

    /// Finish building.
    pub fn build(self) -> TransitNetwork {
        debug!(
            stops = self.network.stop_count(),
            edges = self.network.graph.edge_count(),
            "Built transit network"
        );
        self.network
    }
}
