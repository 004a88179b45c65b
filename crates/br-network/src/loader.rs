//! Network loaders: JSON document or a pair of CSV files.
//!
//! Both formats deserialize into the same records and funnel through
//! [`RoadNetworkBuilder`], so validation happens in exactly one place.
//!
//! # JSON format
//!
//! ```json
//! {
//!   "nodes": [{"id": 1, "lon": -3.19, "lat": 55.95}, ...],
//!   "edges": [
//!     {"from": 1, "to": 2, "key": 0, "length_m": 120.5, "speed_kph": 15,
//!      "external_ids": [4001, 4002],
//!      "geometry": [[-3.19, 55.95], [-3.188, 55.951]]}
//!   ]
//! }
//! ```
//!
//! `key` defaults to 0, `speed_kph` to the configured fallback, and
//! `external_ids` may be absent, `null`, a single id, or a list.
//!
//! # CSV format
//!
//! ```csv
//! id,lon,lat
//! 1,-3.19,55.95
//! ```
//!
//! ```csv
//! from,to,key,length_m,speed_kph,external_ids,geometry
//! 1,2,0,120.5,15,4001;4002,"LINESTRING (-3.19 55.95, -3.188 55.951)"
//! 2,1,0,120.5,,4001,
//! ```
//!
//! `external_ids` is empty, one id, `;`-separated ids, or a bracketed list
//! such as `"[4001, 4002]"`.  `geometry` is empty or a WKT `LINESTRING`.

use std::io::Read;
use std::path::Path;

use geo::{Coord, LineString};
use log::info;
use serde::{Deserialize, Serialize};
use wkt::TryFromWkt;

use br_core::GeoPoint;

use crate::network::{EdgeSpec, RoadNetwork, RoadNetworkBuilder};
use crate::{NetworkError, NetworkResult};

// ── Records ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id:  i64,
    pub lon: f64,
    pub lat: f64,
}

/// A segment-id attribute that upstream data sometimes stores as a scalar
/// and sometimes as a list.  Normalised to a list on ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExternalIds {
    #[default]
    None,
    One(i64),
    Many(Vec<i64>),
}

impl ExternalIds {
    pub fn into_vec(self) -> Vec<i64> {
        match self {
            ExternalIds::None => Vec::new(),
            ExternalIds::One(id) => vec![id],
            ExternalIds::Many(ids) => ids,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: i64,
    pub to:   i64,
    #[serde(default)]
    pub key: u32,
    pub length_m: f64,
    #[serde(default)]
    pub speed_kph: Option<f64>,
    #[serde(default)]
    pub external_ids: ExternalIds,
    /// `[lon, lat]` pairs.
    #[serde(default)]
    pub geometry: Option<Vec<[f64; 2]>>,
}

/// A whole network as delivered by the acquisition step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NetworkData {
    pub nodes: Vec<NodeRecord>,
    pub edges: Vec<EdgeRecord>,
}

impl NetworkData {
    /// Validate and build.  Edges without a speed get `fallback_speed_kph`.
    pub fn into_network(self, fallback_speed_kph: f64) -> NetworkResult<RoadNetwork> {
        let mut b = RoadNetworkBuilder::with_capacity(self.nodes.len(), self.edges.len());
        for n in self.nodes {
            b.add_node(n.id, GeoPoint::new(n.lon, n.lat));
        }
        for e in self.edges {
            let mut spec = EdgeSpec::new(e.from, e.to, e.length_m, e.speed_kph.unwrap_or(fallback_speed_kph))
                .key(e.key)
                .segments(e.external_ids.into_vec());
            if let Some(points) = e.geometry {
                spec = spec.geometry(points.into_iter().map(|[x, y]| Coord { x, y }).collect());
            }
            b.add_edge(spec);
        }
        b.build()
    }
}

// ── JSON ──────────────────────────────────────────────────────────────────────

pub fn load_network_json(path: &Path, fallback_speed_kph: f64) -> NetworkResult<RoadNetwork> {
    info!("Loading network from {}", path.display());
    let file = std::fs::File::open(path)?;
    load_network_json_reader(std::io::BufReader::new(file), fallback_speed_kph)
}

/// Like [`load_network_json`] but accepts any `Read` source.
pub fn load_network_json_reader<R: Read>(reader: R, fallback_speed_kph: f64) -> NetworkResult<RoadNetwork> {
    let data: NetworkData =
        serde_json::from_reader(reader).map_err(|e| NetworkError::Parse(e.to_string()))?;
    data.into_network(fallback_speed_kph)
}

// ── CSV ───────────────────────────────────────────────────────────────────────

#[derive(Deserialize)]
struct CsvEdgeRecord {
    from:      i64,
    to:        i64,
    #[serde(default)]
    key:       Option<u32>,
    length_m:  f64,
    #[serde(default)]
    speed_kph: Option<f64>,
    #[serde(default)]
    external_ids: String,
    #[serde(default)]
    geometry:  String,
}

pub fn load_network_csv(nodes: &Path, edges: &Path, fallback_speed_kph: f64) -> NetworkResult<RoadNetwork> {
    info!("Loading network from {} and {}", nodes.display(), edges.display());
    let nodes = std::fs::File::open(nodes)?;
    let edges = std::fs::File::open(edges)?;
    load_network_csv_readers(nodes, edges, fallback_speed_kph)
}

/// Like [`load_network_csv`] but accepts any `Read` sources.
pub fn load_network_csv_readers<N: Read, E: Read>(
    nodes: N,
    edges: E,
    fallback_speed_kph: f64,
) -> NetworkResult<RoadNetwork> {
    let mut b = RoadNetworkBuilder::new();

    let mut node_reader = csv::Reader::from_reader(nodes);
    for result in node_reader.deserialize::<NodeRecord>() {
        let n = result.map_err(|e| NetworkError::Parse(format!("nodes: {e}")))?;
        b.add_node(n.id, GeoPoint::new(n.lon, n.lat));
    }

    let mut edge_reader = csv::Reader::from_reader(edges);
    for result in edge_reader.deserialize::<CsvEdgeRecord>() {
        let row = result.map_err(|e| NetworkError::Parse(format!("edges: {e}")))?;
        let mut spec = EdgeSpec::new(row.from, row.to, row.length_m, row.speed_kph.unwrap_or(fallback_speed_kph))
            .key(row.key.unwrap_or(0))
            .segments(parse_external_ids(&row.external_ids)?);
        if let Some(line) = parse_geometry(&row.geometry)? {
            spec = spec.geometry(line);
        }
        b.add_edge(spec);
    }

    b.build()
}

// ── Helpers ───────────────────────────────────────────────────────────────────

/// Parse `""`, `"7"`, `"7;8"`, or `"[7, 8]"` into a list of ids.
pub fn parse_external_ids(s: &str) -> NetworkResult<Vec<i64>> {
    let inner = s.trim();
    let inner = inner
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(inner);
    inner
        .split([',', ';'])
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i64>()
                .map_err(|_| NetworkError::Parse(format!("invalid external id {part:?} in {s:?}")))
        })
        .collect()
}

fn parse_geometry(s: &str) -> NetworkResult<Option<LineString<f64>>> {
    let s = s.trim();
    if s.is_empty() {
        return Ok(None);
    }
    LineString::<f64>::try_from_wkt_str(s)
        .map(Some)
        .map_err(|e| NetworkError::Parse(format!("invalid geometry {s:?}: {e}")))
}
