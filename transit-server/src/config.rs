//! Server configuration read from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use tracing::info;

use crate::graph::{EdgeMode, GraphError, GtfsConfig, NodeLinkDocument, TransitNetwork, gtfs};
use crate::planner::{HeuristicKind, InvalidWeight, SearchConfig};

pub const GRAPH_VAR: &str = "TRANSIT_GRAPH";
pub const GTFS_DIR_VAR: &str = "TRANSIT_GTFS_DIR";
pub const TRIP_PATTERNS_VAR: &str = "TRANSIT_TRIP_PATTERNS";
pub const EDGE_MODE_VAR: &str = "TRANSIT_EDGE_MODE";
pub const ADDR_VAR: &str = "TRANSIT_ADDR";
pub const WEIGHT_VAR: &str = "TRANSIT_WEIGHT";
pub const HEURISTIC_VAR: &str = "TRANSIT_HEURISTIC";
pub const MAX_EXPANSIONS_VAR: &str = "TRANSIT_MAX_EXPANSIONS";

const DEFAULT_GRAPH: &str = "graph.json";
const DEFAULT_ADDR: &str = "127.0.0.1:3000";

/// Error returned when an environment variable holds an unusable value.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{var}={value:?}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("TRANSIT_WEIGHT: {0}")]
    Weight(#[from] InvalidWeight),
}

/// Everything the server binary needs to start.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    /// Node-link graph file to load, or to write when building from GTFS.
    pub graph_path: PathBuf,

    /// GTFS feed used to build the graph when `graph_path` does not exist.
    pub gtfs_dir: Option<PathBuf>,

    pub gtfs: GtfsConfig,

    pub edge_mode: EdgeMode,

    pub addr: SocketAddr,

    /// Defaults for `/route` requests that don't override them.
    pub search: SearchConfig,
}

impl ServerConfig {
    /// Read the configuration from process environment variables.
    ///
    /// Unset or empty variables take their defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let graph_path = get(GRAPH_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_GRAPH));
        let gtfs_dir = get(GTFS_DIR_VAR).map(PathBuf::from);

        let mut gtfs = GtfsConfig::default();
        if let Some(patterns) = get(TRIP_PATTERNS_VAR) {
            gtfs.trip_patterns = patterns
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from)
                .collect();
        }

        let edge_mode = parse_var(EDGE_MODE_VAR, get(EDGE_MODE_VAR))?.unwrap_or_default();
        let addr = get(ADDR_VAR).unwrap_or_else(|| DEFAULT_ADDR.to_string());
        let addr: SocketAddr = addr.trim().parse().map_err(|e| invalid(ADDR_VAR, &addr, e))?;

        let mut search = SearchConfig::default();
        if let Some(weight) = parse_var::<f64>(WEIGHT_VAR, get(WEIGHT_VAR))? {
            search = search.with_weight(weight);
        }
        if let Some(heuristic) = parse_var::<HeuristicKind>(HEURISTIC_VAR, get(HEURISTIC_VAR))? {
            search = search.with_heuristic(heuristic);
        }
        if let Some(limit) = parse_var::<usize>(MAX_EXPANSIONS_VAR, get(MAX_EXPANSIONS_VAR))? {
            search = search.with_max_expansions(limit);
        }
        search.validate()?;

        Ok(Self {
            graph_path,
            gtfs_dir,
            gtfs,
            edge_mode,
            addr,
            search,
        })
    }
}

impl ServerConfig {
    /// Load the graph file, building it from the GTFS feed first if the
    /// file is missing and a feed is configured.
    pub fn load_network(&self) -> Result<TransitNetwork, GraphError> {
        let document = match &self.gtfs_dir {
            Some(dir) if !self.graph_path.exists() => {
                info!(
                    graph = %self.graph_path.display(),
                    "Graph file missing, building from GTFS"
                );
                let document = gtfs::build_document(dir, &self.gtfs)?;
                document.save(&self.graph_path)?;
                document
            }
            _ => NodeLinkDocument::from_path(&self.graph_path)?,
        };

        let network = document.to_network(self.edge_mode)?;
        info!(
            stops = network.stop_count(),
            edges = network.graph.edge_count(),
            mode = %self.edge_mode,
            "Network ready"
        );
        Ok(network)
    }
}

fn invalid(var: &'static str, value: &str, reason: impl ToString) -> ConfigError {
    ConfigError::Invalid {
        var,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

fn parse_var<T>(var: &'static str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|v| v.trim().parse().map_err(|e| invalid(var, &v, e)))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|var| vars.get(var).cloned())
    }

    #[test]
    fn defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.graph_path, PathBuf::from("graph.json"));
        assert_eq!(config.gtfs_dir, None);
        assert_eq!(config.gtfs, GtfsConfig::default());
        assert_eq!(config.edge_mode, EdgeMode::Undirected);
        assert_eq!(config.addr, "127.0.0.1:3000".parse().unwrap());
        assert_eq!(config.search, SearchConfig::default());
    }

    #[test]
    fn overrides() {
        let config = config_from(&[
            ("TRANSIT_GRAPH", "data/subway.json"),
            ("TRANSIT_GTFS_DIR", "gtfs_subway"),
            ("TRANSIT_TRIP_PATTERNS", "Weekday, L0S1,"),
            ("TRANSIT_EDGE_MODE", "directed"),
            ("TRANSIT_ADDR", "0.0.0.0:8080"),
            ("TRANSIT_WEIGHT", "1.5"),
            ("TRANSIT_HEURISTIC", "travel_time"),
            ("TRANSIT_MAX_EXPANSIONS", "5000"),
        ])
        .unwrap();

        assert_eq!(config.graph_path, PathBuf::from("data/subway.json"));
        assert_eq!(config.gtfs_dir, Some(PathBuf::from("gtfs_subway")));
        assert_eq!(config.gtfs.trip_patterns, vec!["Weekday", "L0S1"]);
        assert_eq!(config.edge_mode, EdgeMode::Directed);
        assert_eq!(config.addr, "0.0.0.0:8080".parse().unwrap());
        assert_eq!(
            config.search,
            SearchConfig::new(1.5, HeuristicKind::TravelTime, Some(5000))
        );
    }

    #[test]
    fn empty_values_use_defaults() {
        let config = config_from(&[("TRANSIT_GRAPH", ""), ("TRANSIT_WEIGHT", "  ")]).unwrap();
        assert_eq!(config.graph_path, PathBuf::from("graph.json"));
        assert_eq!(config.search.weight_factor, 1.0);
    }

    #[test]
    fn invalid_values() {
        let err = config_from(&[("TRANSIT_WEIGHT", "heavy")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TRANSIT_WEIGHT", .. }));

        let err = config_from(&[("TRANSIT_WEIGHT", "-2")]).unwrap_err();
        assert_eq!(err, ConfigError::Weight(InvalidWeight(-2.0)));

        let err = config_from(&[("TRANSIT_HEURISTIC", "euclid")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TRANSIT_HEURISTIC", .. }));

        let err = config_from(&[("TRANSIT_ADDR", "localhost")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: "TRANSIT_ADDR", .. }));

        let err = config_from(&[("TRANSIT_MAX_EXPANSIONS", "-1")]).unwrap_err();
        assert!(err.to_string().starts_with("TRANSIT_MAX_EXPANSIONS=\"-1\": "));
    }

    fn write_feed(dir: &std::path::Path) {
        std::fs::write(
            dir.join("stops.txt"),
            "stop_id,stop_name,stop_lat,stop_lon\n\
             101,North,40.88,-73.89\n\
             101S,North,40.88,-73.89\n\
             103,South,40.87,-73.90\n\
             103N,South,40.87,-73.90\n\
             103S,South,40.87,-73.90\n",
        )
        .unwrap();
        std::fs::write(
            dir.join("stop_times.txt"),
            "trip_id,stop_id,arrival_time,departure_time,stop_sequence\n\
             T_1..S,101S,08:00:00,08:00:00,1\n\
             T_1..S,103S,08:02:00,08:02:00,2\n",
        )
        .unwrap();
    }

    #[test]
    fn load_network_builds_missing_graph_from_gtfs() {
        let dir = tempfile::tempdir().unwrap();
        write_feed(dir.path());
        let graph_path = dir.path().join("out").join("graph.json");

        let config = ServerConfig {
            graph_path: graph_path.clone(),
            gtfs_dir: Some(dir.path().to_path_buf()),
            ..config_from(&[]).unwrap()
        };
        let network = config.load_network().unwrap();
        assert_eq!(network.stop_count(), 2);
        assert!(graph_path.exists());

        // Second load reads the saved file, even with the feed gone
        std::fs::remove_file(dir.path().join("stop_times.txt")).unwrap();
        let reloaded = config.load_network().unwrap();
        assert_eq!(reloaded.graph.edge_count(), network.graph.edge_count());
        assert_eq!(reloaded.graph.edge_count(), 2);
    }

    #[test]
    fn load_network_without_graph_or_feed() {
        let dir = tempfile::tempdir().unwrap();
        let config = ServerConfig {
            graph_path: dir.path().join("absent.json"),
            ..config_from(&[]).unwrap()
        };

        assert!(matches!(
            config.load_network(),
            Err(GraphError::Io { .. })
        ));
    }
}
