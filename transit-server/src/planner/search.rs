//! Weighted A* route search.
//!
//! Expands nodes best-first by `g + w * h`, where `g` is the cheapest known
//! cost from the start and `h` the heuristic estimate to the goal. The
//! weight `w` trades optimality for speed: 0 is uniform-cost search, 1 is
//! plain A*, and larger values head for the goal more greedily.
//!
//! Edge costs must be non-negative. The graph builders enforce this, so it
//! is not checked again here.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

use tracing::{debug, trace};

use crate::domain::Position;
use crate::graph::{Cost, Graph, PositionTable};

use super::config::{InvalidWeight, SearchConfig};
use super::frontier::Frontier;
use super::heuristic::{Heuristic, Manhattan};

/// Error from route search.
///
/// An unreachable goal is not an error; see [`Outcome::NotFound`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SearchError<N> {
    /// A node that needs a heuristic estimate has no position
    #[error("no position recorded for node {0}")]
    MissingPosition(N),

    /// The weight factor is negative or not a number
    #[error(transparent)]
    InvalidWeight(#[from] InvalidWeight),

    /// The configured expansion limit was reached before the goal
    #[error("search gave up after expanding {limit} nodes")]
    ExpansionLimit { limit: usize },
}

/// A path from start to goal with its total cost.
#[derive(Debug, Clone, PartialEq)]
pub struct Route<N> {
    /// Nodes from start to goal inclusive.
    pub path: Vec<N>,

    /// Sum of edge costs along `path`.
    pub cost: Cost,
}

impl<N> Route<N> {
    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Result of a search: a route, or proof that none exists.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<N> {
    Found(Route<N>),
    NotFound,
}

impl<N> Outcome<N> {
    pub fn is_found(&self) -> bool {
        matches!(self, Outcome::Found(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Outcome::NotFound)
    }

    pub fn route(&self) -> Option<&Route<N>> {
        match self {
            Outcome::Found(route) => Some(route),
            Outcome::NotFound => None,
        }
    }

    pub fn into_route(self) -> Option<Route<N>> {
        match self {
            Outcome::Found(route) => Some(route),
            Outcome::NotFound => None,
        }
    }

    /// Total cost, or infinity when no route exists.
    pub fn cost(&self) -> Cost {
        self.route().map_or(f64::INFINITY, |r| r.cost)
    }
}

/// Counters describing the work a search did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Nodes popped from the frontier and expanded.
    pub expanded: usize,

    /// Entries pushed onto the frontier, including the start.
    pub pushed: usize,

    /// Popped entries discarded because a cheaper one was already seen.
    pub stale_skipped: usize,
}

/// Outcome of a search together with its statistics.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult<N> {
    pub outcome: Outcome<N>,
    pub stats: SearchStats,
}

/// Route planner using weighted A*.
///
/// Holds no per-search state, so one planner can serve any number of
/// searches, including concurrent ones over the same graph.
pub struct Planner<'a, H: Heuristic + ?Sized> {
    heuristic: &'a H,
    config: &'a SearchConfig,
}

impl<'a, H: Heuristic + ?Sized> Planner<'a, H> {
    /// Create a new planner.
    pub fn new(heuristic: &'a H, config: &'a SearchConfig) -> Self {
        Self { heuristic, config }
    }

    /// Search for the cheapest route from `start` to `goal`.
    ///
    /// `positions` must cover `goal` and every node the search reaches;
    /// a missing entry fails with [`SearchError::MissingPosition`].
    pub fn search<N>(
        &self,
        graph: &Graph<N>,
        positions: &PositionTable<N>,
        start: &N,
        goal: &N,
    ) -> Result<SearchResult<N>, SearchError<N>>
    where
        N: Clone + Eq + Hash + Ord + fmt::Debug,
    {
        self.config.validate()?;

        let mut stats = SearchStats::default();

        if start == goal {
            return Ok(SearchResult {
                outcome: Outcome::Found(Route {
                    path: vec![start.clone()],
                    cost: 0.0,
                }),
                stats,
            });
        }

        let weight = self.config.weight_factor;
        let mut g_cost: HashMap<N, Cost> = HashMap::new();
        let mut came_from: HashMap<N, (N, Cost)> = HashMap::new();
        let mut frontier = Frontier::new();

        // Only looked up once something is pushed, so a start with no
        // out-edges reports NotFound even without a goal position.
        let mut goal_position: Option<Position> = None;

        g_cost.insert(start.clone(), 0.0);
        frontier.push(start.clone(), 0.0, 0.0);
        stats.pushed += 1;

        loop {
            let popped = frontier.pop_min(|node, g| {
                let stale = g_cost.get(node).is_some_and(|&best| g > best);
                if stale {
                    stats.stale_skipped += 1;
                }
                stale
            });
            let Some((current, current_g)) = popped else {
                break;
            };

            if &current == goal {
                let route = reconstruct_route(&came_from, current);
                debug!(
                    expanded = stats.expanded,
                    pushed = stats.pushed,
                    stale = stats.stale_skipped,
                    hops = route.hops(),
                    cost = route.cost,
                    g = current_g,
                    "Route found"
                );
                return Ok(SearchResult {
                    outcome: Outcome::Found(route),
                    stats,
                });
            }

            if let Some(limit) = self.config.max_expansions
                && stats.expanded >= limit
            {
                debug!(limit, frontier = frontier.len(), "Expansion limit reached");
                return Err(SearchError::ExpansionLimit { limit });
            }
            stats.expanded += 1;

            trace!(node = ?current, g = current_g, frontier = frontier.len(), "Expanding");

            for edge in graph.neighbors(&current) {
                let tentative_g = current_g + edge.cost;
                let improves = g_cost
                    .get(&edge.to)
                    .is_none_or(|&known| tentative_g < known);
                if !improves {
                    continue;
                }

                let goal_pos = match goal_position {
                    Some(p) => p,
                    None => {
                        let p = positions
                            .get(goal)
                            .ok_or_else(|| SearchError::MissingPosition(goal.clone()))?;
                        goal_position = Some(p);
                        p
                    }
                };
                let neighbor_pos = positions
                    .get(&edge.to)
                    .ok_or_else(|| SearchError::MissingPosition(edge.to.clone()))?;

                let priority = tentative_g + weight * self.heuristic.estimate(neighbor_pos, goal_pos);

                g_cost.insert(edge.to.clone(), tentative_g);
                came_from.insert(edge.to.clone(), (current.clone(), edge.cost));
                frontier.push(edge.to.clone(), tentative_g, priority);
                stats.pushed += 1;
            }
        }

        debug!(
            expanded = stats.expanded,
            pushed = stats.pushed,
            stale = stats.stale_skipped,
            "Frontier exhausted, no route"
        );

        Ok(SearchResult {
            outcome: Outcome::NotFound,
            stats,
        })
    }
}

/// Follow predecessor links back from `goal` and return the route in
/// start-to-goal order.
///
/// A predecessor is only recorded when a node's cost strictly drops, so
/// with non-negative edges the links cannot form a cycle.
///
/// The cost is summed along the links rather than read from the goal's
/// g-cost. The two agree unless an inconsistent heuristic let the goal be
/// popped while a cheaper chain to one of its ancestors was still queued,
/// in which case the sum is the true (lower) cost of the returned path.
fn reconstruct_route<N>(came_from: &HashMap<N, (N, Cost)>, goal: N) -> Route<N>
where
    N: Clone + Eq + Hash,
{
    let mut path = vec![goal];
    let mut costs = Vec::new();
    while let Some((prev, cost)) = path.last().and_then(|node| came_from.get(node)) {
        path.push(prev.clone());
        costs.push(*cost);
    }
    path.reverse();

    // Summed start-first, the same order the g-costs accumulated in
    let cost = costs.iter().rev().fold(0.0, |acc, c| acc + c);
    Route { path, cost }
}

/// Weighted A* with the [`Manhattan`] heuristic.
///
/// Returns [`Outcome::NotFound`] (cost infinity) when `goal` cannot be
/// reached from `start`.
///
/// # Examples
///
/// ```
/// use transit_server::graph::{Graph, PositionTable};
/// use transit_server::planner::{search, Outcome};
///
/// let mut graph = Graph::new();
/// graph.add_undirected_edge("A", "B", 1.0).unwrap();
/// graph.add_undirected_edge("B", "C", 1.0).unwrap();
/// graph.add_undirected_edge("A", "C", 5.0).unwrap();
/// graph.add_node("D");
/// let positions: PositionTable<_> = [
///     ("A", (0.0, 0.0)),
///     ("B", (1.0, 0.0)),
///     ("C", (2.0, 0.0)),
///     ("D", (3.0, 0.0)),
/// ]
/// .into_iter()
/// .collect();
///
/// let outcome = search(&graph, &"A", &"C", &positions, 1.0).unwrap();
/// let route = outcome.route().unwrap();
/// assert_eq!(route.path, vec!["A", "B", "C"]);
/// assert_eq!(route.cost, 2.0);
///
/// assert_eq!(search(&graph, &"A", &"D", &positions, 1.0).unwrap(), Outcome::NotFound);
/// ```
pub fn search<N>(
    graph: &Graph<N>,
    start: &N,
    goal: &N,
    positions: &PositionTable<N>,
    weight_factor: f64,
) -> Result<Outcome<N>, SearchError<N>>
where
    N: Clone + Eq + Hash + Ord + fmt::Debug,
{
    let config = SearchConfig::default().with_weight(weight_factor);
    let planner = Planner::new(&Manhattan, &config);
    planner
        .search(graph, positions, start, goal)
        .map(|result| result.outcome)
}
