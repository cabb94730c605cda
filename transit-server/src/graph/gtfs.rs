//! Build a graph document from a GTFS feed.
//!
//! Reads `stops.txt`, `stop_times.txt` and (optionally) `transfers.txt`:
//!
//! - every stop without a direction suffix becomes a node;
//! - consecutive calls of a trip become a ride edge between the parent
//!   stops, costing the scheduled travel time in seconds;
//! - every transfer between distinct stops becomes a transfer edge costing
//!   its minimum transfer time.
//!
//! When a stop pair is linked more than once, the cheapest edge is kept.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info, trace};

use crate::domain::{DomainError, ServiceTime, StopId};

use super::error::GraphError;
use super::network::Cost;
use super::node_link::{EdgeRecord, NodeLinkDocument, NodeRecord};

const STOPS: &str = "stops.txt";
const STOP_TIMES: &str = "stop_times.txt";
const TRANSFERS: &str = "transfers.txt";

/// Options for GTFS import.
#[derive(Debug, Clone, PartialEq)]
pub struct GtfsConfig {
    /// Only trips whose id contains one of these substrings are used.
    /// Empty accepts every trip.
    pub trip_patterns: Vec<String>,

    /// Trailing characters that mark a platform (child) stop.
    pub direction_suffixes: Vec<char>,
}

impl GtfsConfig {
    /// Create a config accepting only trips matching `patterns`.
    pub fn with_trip_patterns<S: Into<String>>(patterns: impl IntoIterator<Item = S>) -> Self {
        Self {
            trip_patterns: patterns.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Whether a trip takes part in the graph.
    pub fn accepts_trip(&self, trip_id: &str) -> bool {
        self.trip_patterns.is_empty() || self.trip_patterns.iter().any(|p| trip_id.contains(p))
    }

    fn is_platform(&self, stop: &StopId) -> bool {
        stop.parent(&self.direction_suffixes).is_some()
    }

    /// Parent stop of a platform, or the stop itself.
    fn parent_of(&self, stop: &StopId) -> StopId {
        stop.parent(&self.direction_suffixes)
            .unwrap_or_else(|| stop.clone())
    }
}

impl Default for GtfsConfig {
    fn default() -> Self {
        Self {
            trip_patterns: Vec::new(),
            direction_suffixes: vec!['N', 'S'],
        }
    }
}

#[derive(Debug, Deserialize)]
struct StopRow {
    stop_id: StopId,
    #[serde(default)]
    stop_name: String,
    stop_lat: f64,
    stop_lon: f64,
}

#[derive(Debug, Clone, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    arrival_time: Option<String>,
    departure_time: Option<String>,
    stop_id: StopId,
    stop_sequence: u32,
}

#[derive(Debug, Deserialize)]
struct TransferRow {
    from_stop_id: StopId,
    to_stop_id: StopId,
    min_transfer_time: Option<f64>,
}

/// Route id encoded in a trip id such as `"AFA23GEN-1037-Weekday-00_000600_1..S03R"`.
///
/// Takes the last `_`-separated segment and drops everything from the
/// first `.` onwards.
pub fn route_id_of(trip_id: &str) -> &str {
    let tail = trip_id.rsplit('_').next().unwrap_or(trip_id);
    tail.split('.').next().unwrap_or(tail)
}

/// Accumulates edges, keeping the cheapest per stop pair.
#[derive(Debug, Default)]
struct EdgeSet {
    edges: HashMap<(StopId, StopId), EdgeRecord>,
}

impl EdgeSet {
    fn offer(&mut self, edge: EdgeRecord) {
        match self.edges.entry((edge.source.clone(), edge.target.clone())) {
            Entry::Occupied(mut existing) => {
                if edge.weight < existing.get().weight {
                    existing.insert(edge);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(edge);
            }
        }
    }

    fn into_sorted(self) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = self.edges.into_values().collect();
        edges.sort_by(|a, b| (&a.source, &a.target).cmp(&(&b.source, &b.target)));
        edges
    }
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader)
}

fn open(dir: &Path, name: &str) -> Result<File, GraphError> {
    let path = dir.join(name);
    File::open(&path).map_err(|e| GraphError::io(path, e))
}

/// Build a graph document from the GTFS files in `dir`.
///
/// `transfers.txt` is optional; the other two files are required.
pub fn build_document(
    dir: impl AsRef<Path>,
    config: &GtfsConfig,
) -> Result<NodeLinkDocument, GraphError> {
    let dir = dir.as_ref();
    info!(dir = %dir.display(), "Building graph from GTFS feed");

    let stops = open(dir, STOPS)?;
    let stop_times = open(dir, STOP_TIMES)?;
    let transfers = match open(dir, TRANSFERS) {
        Ok(file) => Some(file),
        Err(GraphError::Io { source, .. }) if source.kind() == std::io::ErrorKind::NotFound => {
            debug!("No transfers.txt, skipping transfers");
            None
        }
        Err(e) => return Err(e),
    };

    build_document_from_readers(stops, stop_times, transfers, config)
}

/// Build a graph document from the contents of the GTFS tables.
pub fn build_document_from_readers<R: Read>(
    stops: R,
    stop_times: R,
    transfers: Option<R>,
    config: &GtfsConfig,
) -> Result<NodeLinkDocument, GraphError> {
    let nodes = read_stops(stops, config)?;
    let known: HashSet<&StopId> = nodes.iter().map(|n| &n.id).collect();

    let mut edges = EdgeSet::default();
    let rides = read_stop_times(stop_times, config, &mut |edge| {
        if known.contains(&edge.source) && known.contains(&edge.target) {
            edges.offer(edge);
            true
        } else {
            false
        }
    })?;

    let mut transfer_count = 0;
    if let Some(transfers) = transfers {
        for (row_idx, row) in csv_reader(transfers).deserialize::<TransferRow>().enumerate() {
            let row = row.map_err(|source| GraphError::Csv {
                file: TRANSFERS,
                source,
            })?;
            if row.from_stop_id == row.to_stop_id {
                continue;
            }
            if !known.contains(&row.from_stop_id) || !known.contains(&row.to_stop_id) {
                trace!(row = row_idx + 1, "Transfer between unknown stops, skipping");
                continue;
            }
            edges.offer(EdgeRecord {
                source: row.from_stop_id,
                target: row.to_stop_id,
                weight: row.min_transfer_time.unwrap_or(0.0),
                route_id: None,
                transfer: true,
            });
            transfer_count += 1;
        }
    }

    let edges = edges.into_sorted();
    info!(
        stops = nodes.len(),
        ride_hops = rides.accepted,
        skipped_hops = rides.skipped,
        transfers = transfer_count,
        edges = edges.len(),
        "Built graph document from GTFS"
    );

    Ok(NodeLinkDocument {
        nodes,
        edges,
        ..NodeLinkDocument::default()
    })
}

fn read_stops<R: Read>(reader: R, config: &GtfsConfig) -> Result<Vec<NodeRecord>, GraphError> {
    let mut nodes = Vec::new();
    for row in csv_reader(reader).deserialize::<StopRow>() {
        let row = row.map_err(|source| GraphError::Csv { file: STOPS, source })?;
        if config.is_platform(&row.stop_id) {
            continue;
        }
        if !row.stop_lat.is_finite() || !row.stop_lon.is_finite() {
            return Err(GraphError::InvalidPosition {
                stop: row.stop_id,
                lat: row.stop_lat,
                lon: row.stop_lon,
            });
        }
        nodes.push(NodeRecord {
            id: row.stop_id,
            name: row.stop_name,
            lat: row.stop_lat,
            lon: row.stop_lon,
        });
    }
    Ok(nodes)
}

/// Counts of consecutive-call pairs seen in `stop_times.txt`.
#[derive(Debug, Default)]
struct RideCounts {
    accepted: usize,
    skipped: usize,
}

fn read_stop_times<R: Read>(
    reader: R,
    config: &GtfsConfig,
    offer: &mut dyn FnMut(EdgeRecord) -> bool,
) -> Result<RideCounts, GraphError> {
    let mut counts = RideCounts::default();
    let mut prev: Option<StopTimeRow> = None;

    for (row_idx, row) in csv_reader(reader).deserialize::<StopTimeRow>().enumerate() {
        let curr = row.map_err(|source| GraphError::Csv {
            file: STOP_TIMES,
            source,
        })?;

        let Some(prev_row) = prev.replace(curr.clone()) else {
            continue;
        };

        // Only calls directly following each other on the same trip
        if prev_row.trip_id != curr.trip_id
            || prev_row.stop_sequence.checked_add(1) != Some(curr.stop_sequence)
        {
            continue;
        }
        if !config.accepts_trip(&curr.trip_id) {
            continue;
        }

        let Some(weight) = travel_seconds(&prev_row, &curr, row_idx)? else {
            trace!(row = row_idx + 1, trip = %curr.trip_id, "Untimed call, skipping");
            counts.skipped += 1;
            continue;
        };

        let edge = EdgeRecord {
            source: config.parent_of(&prev_row.stop_id),
            target: config.parent_of(&curr.stop_id),
            weight,
            route_id: Some(route_id_of(&curr.trip_id).to_string()),
            transfer: false,
        };

        if offer(edge) {
            counts.accepted += 1;
        } else {
            trace!(row = row_idx + 1, stop = %curr.stop_id, "Hop to unknown stop, skipping");
            counts.skipped += 1;
        }
    }

    Ok(counts)
}

/// Scheduled seconds from departing `prev` to arriving at `curr`.
///
/// `None` when either time is missing from the feed.
fn travel_seconds(
    prev: &StopTimeRow,
    curr: &StopTimeRow,
    row_idx: usize,
) -> Result<Option<Cost>, GraphError> {
    let (Some(dep), Some(arr)) = (&prev.departure_time, &curr.arrival_time) else {
        return Ok(None);
    };
    let context = || format!("{STOP_TIMES} row {} (trip {})", row_idx + 1, curr.trip_id);

    let dep = ServiceTime::parse(dep).map_err(|e| GraphError::domain(context(), e))?;
    let arr = ServiceTime::parse(arr).map_err(|e| GraphError::domain(context(), e))?;

    let travel = arr.signed_duration_since(dep);
    if travel < chrono::Duration::zero() {
        return Err(GraphError::domain(
            context(),
            DomainError::NegativeTravelTime {
                departure: dep.to_string(),
                arrival: arr.to_string(),
            },
        ));
    }

    Ok(Some(travel.num_seconds() as Cost))
}
