//! Road network representation and builder.
//!
//! # Data layout
//!
//! The graph uses **Compressed Sparse Row (CSR)** format for outgoing edges.
//! Given a `NodeId n`, its outgoing edges occupy the `EdgeId` range:
//!
//! ```text
//! node_out_start[n] .. node_out_start[n+1]
//! ```
//!
//! Edge arrays are sorted by `(from, to, key)` and indexed by `EdgeId`, so a
//! node's out-edges are a contiguous scan in a fixed order.  Search results
//! are therefore reproducible for a given input, whatever order the loader
//! supplied edges in.
//!
//! # Mutability
//!
//! Topology, lengths, geometry, and segment ids never change after
//! [`RoadNetworkBuilder::build`].  Speed and travel time change only through
//! [`RoadNetwork::set_speed`], which needs `&mut self`; a network shared
//! behind an `Arc` is therefore frozen.  Per-request weight changes are
//! layered on top by `br-routing` instead.

use geo::{Coord, LineString};
use log::info;
use rustc_hash::FxHashMap;
use serde::Serialize;

use br_core::{EdgeId, EdgeKey, GeoPoint, NodeId, OsmNodeId, SegmentId};

use crate::{NetworkError, NetworkResult};

/// Travel time in seconds for `length_m` at `speed_kph`.
///
/// A speed of zero (or below) makes the edge impassable: `+inf`.
#[inline]
pub fn travel_time_s(length_m: f64, speed_kph: f64) -> f64 {
    if speed_kph > 0.0 {
        length_m / 1000.0 / speed_kph * 3600.0
    } else {
        f64::INFINITY
    }
}

// ── RoadNetwork ───────────────────────────────────────────────────────────────

/// Directed multigraph of road edges in CSR format.
///
/// Do not construct directly; use [`RoadNetworkBuilder`] or one of the
/// loaders in [`crate::loader`].
#[derive(Debug, Clone)]
pub struct RoadNetwork {
    // ── Node data ─────────────────────────────────────────────────────────
    node_osm:    Vec<OsmNodeId>,
    node_pos:    Vec<GeoPoint>,
    node_lookup: FxHashMap<OsmNodeId, NodeId>,

    // ── CSR edge adjacency ────────────────────────────────────────────────
    /// Length = `node_count + 1`.
    node_out_start: Vec<u32>,

    // ── Edge data (indexed by EdgeId) ─────────────────────────────────────
    edge_from:      Vec<NodeId>,
    edge_to:        Vec<NodeId>,
    edge_key:       Vec<u32>,
    edge_length_m:  Vec<f64>,
    edge_speed_kph: Vec<f64>,
    /// Always `travel_time_s(edge_length_m[e], edge_speed_kph[e])`.
    edge_travel_s:  Vec<f64>,
    edge_segments:  Vec<Box<[SegmentId]>>,
    edge_geometry:  Vec<Option<LineString<f64>>>,
    edge_lookup:    FxHashMap<(NodeId, NodeId, u32), EdgeId>,
    /// Cached maximum of the finite entries of `edge_speed_kph`.
    max_speed_kph:  f64,
}

/// Summary counts, logged at load time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NetworkStats {
    pub node_count:     usize,
    pub edge_count:     usize,
    pub avg_out_degree: f64,
}

impl RoadNetwork {
    /// A network with no nodes or edges.
    pub fn empty() -> Self {
        Self {
            node_osm:       Vec::new(),
            node_pos:       Vec::new(),
            node_lookup:    FxHashMap::default(),
            node_out_start: vec![0],
            edge_from:      Vec::new(),
            edge_to:        Vec::new(),
            edge_key:       Vec::new(),
            edge_length_m:  Vec::new(),
            edge_speed_kph: Vec::new(),
            edge_travel_s:  Vec::new(),
            edge_segments:  Vec::new(),
            edge_geometry:  Vec::new(),
            edge_lookup:    FxHashMap::default(),
            max_speed_kph:  0.0,
        }
    }

    // ── Graph dimensions ──────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.node_pos.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edge_to.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_pos.is_empty()
    }

    pub fn stats(&self) -> NetworkStats {
        let avg_out_degree = if self.is_empty() {
            0.0
        } else {
            self.edge_count() as f64 / self.node_count() as f64
        };
        NetworkStats {
            node_count: self.node_count(),
            edge_count: self.edge_count(),
            avg_out_degree,
        }
    }

    // ── Nodes ─────────────────────────────────────────────────────────────

    /// Dense index of the node with external id `osm`.
    pub fn node_index(&self, osm: OsmNodeId) -> Option<NodeId> {
        self.node_lookup.get(&osm).copied()
    }

    /// Like [`node_index`](Self::node_index) but an absent node is an error.
    pub fn node(&self, osm: OsmNodeId) -> NetworkResult<NodeId> {
        self.node_index(osm).ok_or(NetworkError::NodeNotFound(osm))
    }

    #[inline]
    pub fn osm_id(&self, node: NodeId) -> OsmNodeId {
        self.node_osm[node.index()]
    }

    #[inline]
    pub fn node_pos(&self, node: NodeId) -> GeoPoint {
        self.node_pos[node.index()]
    }

    /// Positions of all nodes, indexed by `NodeId`.
    pub fn node_positions(&self) -> &[GeoPoint] {
        &self.node_pos
    }

    // ── Graph traversal ───────────────────────────────────────────────────

    /// Iterator over the `EdgeId`s of all outgoing edges from `node`, in
    /// `(to, key)` order.
    #[inline]
    pub fn out_edges(&self, node: NodeId) -> impl Iterator<Item = EdgeId> + '_ {
        let start = self.node_out_start[node.index()];
        let end   = self.node_out_start[node.index() + 1];
        (start..end).map(EdgeId)
    }

    #[inline]
    pub fn out_degree(&self, node: NodeId) -> usize {
        let start = self.node_out_start[node.index()] as usize;
        let end   = self.node_out_start[node.index() + 1] as usize;
        end - start
    }

    /// `(target, key)` of every outgoing edge of `node`.
    pub fn neighbors_out(&self, node: NodeId) -> impl Iterator<Item = (NodeId, u32)> + '_ {
        self.out_edges(node)
            .map(|e| (self.edge_to[e.index()], self.edge_key[e.index()]))
    }

    // ── Edge lookup ───────────────────────────────────────────────────────

    pub fn find_edge(&self, from: NodeId, to: NodeId, key: u32) -> Option<EdgeId> {
        self.edge_lookup.get(&(from, to, key)).copied()
    }

    /// The edge `(from, to, key)`, or `NotFound`.
    pub fn edge(&self, from: NodeId, to: NodeId, key: u32) -> NetworkResult<EdgeId> {
        self.find_edge(from, to, key).ok_or_else(|| NetworkError::NotFound {
            from: self.osm_or_unknown(from),
            to:   self.osm_or_unknown(to),
            key,
        })
    }

    /// Resolve an external edge address.
    pub fn resolve(&self, key: EdgeKey) -> NetworkResult<EdgeId> {
        let not_found = || NetworkError::NotFound { from: key.from, to: key.to, key: key.key };
        let from = self.node_index(key.from).ok_or_else(not_found)?;
        let to = self.node_index(key.to).ok_or_else(not_found)?;
        self.find_edge(from, to, key.key).ok_or_else(not_found)
    }

    /// External address of `edge`.
    pub fn edge_key_of(&self, edge: EdgeId) -> EdgeKey {
        let e = edge.index();
        EdgeKey {
            from: self.node_osm[self.edge_from[e].index()],
            to:   self.node_osm[self.edge_to[e].index()],
            key:  self.edge_key[e],
        }
    }

    /// The parallel edge `from → to` with the lowest key, if any.
    pub fn lowest_key_edge(&self, from: NodeId, to: NodeId) -> Option<EdgeId> {
        // Out-edges are sorted by (to, key): the first match has the lowest key.
        self.out_edges(from).find(|e| self.edge_to[e.index()] == to)
    }

    // ── Edge attributes ───────────────────────────────────────────────────

    #[inline]
    pub fn edge_from(&self, edge: EdgeId) -> NodeId {
        self.edge_from[edge.index()]
    }

    #[inline]
    pub fn edge_to(&self, edge: EdgeId) -> NodeId {
        self.edge_to[edge.index()]
    }

    #[inline]
    pub fn edge_key(&self, edge: EdgeId) -> u32 {
        self.edge_key[edge.index()]
    }

    #[inline]
    pub fn edge_length_m(&self, edge: EdgeId) -> f64 {
        self.edge_length_m[edge.index()]
    }

    #[inline]
    pub fn edge_speed_kph(&self, edge: EdgeId) -> f64 {
        self.edge_speed_kph[edge.index()]
    }

    /// Base travel time in seconds (`+inf` for a zero-speed edge).
    #[inline]
    pub fn edge_travel_s(&self, edge: EdgeId) -> f64 {
        self.edge_travel_s[edge.index()]
    }

    /// External segment ids carried by `edge`, sorted and deduplicated.
    pub fn edge_segments(&self, edge: EdgeId) -> &[SegmentId] {
        &self.edge_segments[edge.index()]
    }

    /// Stored geometry of `edge`, if the source supplied one.
    pub fn edge_geometry(&self, edge: EdgeId) -> Option<&LineString<f64>> {
        self.edge_geometry[edge.index()].as_ref()
    }

    /// Geometry of `edge`, synthesised as the straight segment between its
    /// endpoints when none was stored.
    pub fn edge_line(&self, edge: EdgeId) -> LineString<f64> {
        match &self.edge_geometry[edge.index()] {
            Some(line) => line.clone(),
            None => {
                let a: Coord<f64> = self.node_pos(self.edge_from(edge)).into();
                let b: Coord<f64> = self.node_pos(self.edge_to(edge)).into();
                LineString::new(vec![a, b])
            }
        }
    }

    /// Fastest finite base speed on any edge, in km/h.  `0.0` when there is
    /// no passable edge.
    pub fn max_speed_kph(&self) -> f64 {
        self.max_speed_kph
    }

    fn refresh_max_speed(&mut self) {
        self.max_speed_kph = self
            .edge_speed_kph
            .iter()
            .copied()
            .filter(|s| s.is_finite())
            .fold(0.0, f64::max);
    }

    // ── Administrative mutation ───────────────────────────────────────────

    /// Set the base speed of `(from, to, key)` and recompute its travel time.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if `speed_kph` is not positive and finite (checked
    /// first, so nothing changes), `NotFound` if the edge does not exist.
    pub fn set_speed(&mut self, from: NodeId, to: NodeId, key: u32, speed_kph: f64) -> NetworkResult<()> {
        if !(speed_kph.is_finite() && speed_kph > 0.0) {
            return Err(NetworkError::InvalidSpeed { speed_kph });
        }
        let e = self.edge(from, to, key)?.index();
        self.edge_speed_kph[e] = speed_kph;
        self.edge_travel_s[e] = travel_time_s(self.edge_length_m[e], speed_kph);
        self.refresh_max_speed();
        Ok(())
    }

    /// Bulk [`set_speed`](Self::set_speed) by external address.
    ///
    /// Every speed is validated and every key resolved before anything is
    /// written, so a failing batch leaves the network untouched.
    pub fn set_speeds<I>(&mut self, speeds: I) -> NetworkResult<()>
    where
        I: IntoIterator<Item = (EdgeKey, f64)>,
    {
        let mut resolved = Vec::new();
        for (key, speed_kph) in speeds {
            if !(speed_kph.is_finite() && speed_kph > 0.0) {
                return Err(NetworkError::InvalidSpeed { speed_kph });
            }
            resolved.push((self.resolve(key)?, speed_kph));
        }
        for (edge, speed_kph) in resolved {
            let e = edge.index();
            self.edge_speed_kph[e] = speed_kph;
            self.edge_travel_s[e] = travel_time_s(self.edge_length_m[e], speed_kph);
        }
        self.refresh_max_speed();
        Ok(())
    }

    /// Re-derive every travel time from the stored length and speed.
    pub fn recompute_travel_times(&mut self) {
        for ((t, &len), &speed) in self
            .edge_travel_s
            .iter_mut()
            .zip(&self.edge_length_m)
            .zip(&self.edge_speed_kph)
        {
            *t = travel_time_s(len, speed);
        }
    }

    fn osm_or_unknown(&self, node: NodeId) -> OsmNodeId {
        self.node_osm.get(node.index()).copied().unwrap_or(OsmNodeId(i64::MIN))
    }
}

// ── EdgeSpec ──────────────────────────────────────────────────────────────────

/// Attributes of one directed edge as handed to the builder.
///
/// Optional inputs have fixed defaults: `key = 0`, no segments, no geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeSpec {
    pub from:      OsmNodeId,
    pub to:        OsmNodeId,
    pub key:       u32,
    pub length_m:  f64,
    pub speed_kph: f64,
    pub segments:  Vec<SegmentId>,
    pub geometry:  Option<LineString<f64>>,
}

impl EdgeSpec {
    pub fn new(from: i64, to: i64, length_m: f64, speed_kph: f64) -> Self {
        Self {
            from: OsmNodeId(from),
            to: OsmNodeId(to),
            key: 0,
            length_m,
            speed_kph,
            segments: Vec::new(),
            geometry: None,
        }
    }

    pub fn key(mut self, key: u32) -> Self {
        self.key = key;
        self
    }

    pub fn segments<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.segments = ids.into_iter().map(SegmentId).collect();
        self
    }

    pub fn geometry(mut self, line: LineString<f64>) -> Self {
        self.geometry = Some(line);
        self
    }
}

// ── RoadNetworkBuilder ────────────────────────────────────────────────────────

/// Construct a [`RoadNetwork`] incrementally, then call [`build`](Self::build).
///
/// Nodes and edges may be added in any order.  All validation happens in
/// `build()`, which either returns a complete network or a
/// [`NetworkError::MalformedNetwork`]; there is no partial result.
///
/// # Example
///
/// ```
/// use br_core::GeoPoint;
/// use br_network::{EdgeSpec, RoadNetworkBuilder};
///
/// let mut b = RoadNetworkBuilder::new();
/// b.add_node(1, GeoPoint::new(-3.19, 55.95));
/// b.add_node(2, GeoPoint::new(-3.18, 55.95));
/// b.add_edge(EdgeSpec::new(1, 2, 650.0, 15.0).segments([42]));
/// let net = b.build().unwrap();
/// assert_eq!(net.node_count(), 2);
/// assert_eq!(net.edge_count(), 1);
/// ```
#[derive(Debug, Default)]
pub struct RoadNetworkBuilder {
    nodes: Vec<(OsmNodeId, GeoPoint)>,
    edges: Vec<EdgeSpec>,
}

impl RoadNetworkBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-allocate for the expected number of nodes and edges.
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(nodes),
            edges: Vec::with_capacity(edges),
        }
    }

    /// Add a node.  Its `NodeId` in the built network is its insertion order.
    pub fn add_node(&mut self, id: i64, pos: GeoPoint) -> NodeId {
        let idx = NodeId(self.nodes.len() as u32);
        self.nodes.push((OsmNodeId(id), pos));
        idx
    }

    /// Add one directed edge.
    pub fn add_edge(&mut self, spec: EdgeSpec) {
        self.edges.push(spec);
    }

    /// Convenience: key-0 edges in **both directions** sharing the same
    /// segment ids.  The reverse edge carries the reversed geometry.
    pub fn add_road(&mut self, spec: EdgeSpec) {
        let reverse = EdgeSpec {
            from:     spec.to,
            to:       spec.from,
            geometry: spec.geometry.as_ref().map(|l| l.coords().rev().copied().collect()),
            segments: spec.segments.clone(),
            ..spec.clone()
        };
        self.edges.push(spec);
        self.edges.push(reverse);
    }

    pub fn node_count(&self) -> usize { self.nodes.len() }
    pub fn edge_count(&self) -> usize { self.edges.len() }

    /// Validate and consume the builder.
    ///
    /// Time complexity: O(E log E) for the edge sort.
    pub fn build(self) -> NetworkResult<RoadNetwork> {
        let node_count = self.nodes.len();
        if u32::try_from(node_count).is_err() || u32::try_from(self.edges.len()).is_err() {
            return Err(NetworkError::MalformedNetwork("network exceeds u32 index space".into()));
        }

        // ── Nodes ─────────────────────────────────────────────────────────
        let mut node_lookup = FxHashMap::with_capacity_and_hasher(node_count, Default::default());
        let mut node_osm = Vec::with_capacity(node_count);
        let mut node_pos = Vec::with_capacity(node_count);
        for (i, (osm, pos)) in self.nodes.into_iter().enumerate() {
            if !pos.is_valid() {
                return Err(NetworkError::MalformedNetwork(format!(
                    "node {osm} has invalid coordinate {pos}"
                )));
            }
            if node_lookup.insert(osm, NodeId(i as u32)).is_some() {
                return Err(NetworkError::MalformedNetwork(format!("duplicate node id {osm}")));
            }
            node_osm.push(osm);
            node_pos.push(pos);
        }

        // ── Edges ─────────────────────────────────────────────────────────
        let mut raw: Vec<(NodeId, NodeId, EdgeSpec)> = Vec::with_capacity(self.edges.len());
        for mut spec in self.edges {
            let resolve = |osm: OsmNodeId| {
                node_lookup.get(&osm).copied().ok_or_else(|| {
                    NetworkError::MalformedNetwork(format!(
                        "edge ({}, {}, {}) references unknown node {osm}",
                        spec.from, spec.to, spec.key
                    ))
                })
            };
            let from = resolve(spec.from)?;
            let to = resolve(spec.to)?;
            validate_edge(&spec)?;
            spec.segments.sort_unstable();
            spec.segments.dedup();
            raw.push((from, to, spec));
        }

        raw.sort_by_key(|(from, to, spec)| (*from, *to, spec.key));

        let edge_count = raw.len();
        let mut edge_lookup = FxHashMap::with_capacity_and_hasher(edge_count, Default::default());
        for (i, (from, to, spec)) in raw.iter().enumerate() {
            if edge_lookup.insert((*from, *to, spec.key), EdgeId(i as u32)).is_some() {
                return Err(NetworkError::MalformedNetwork(format!(
                    "duplicate edge ({}, {}, {})",
                    spec.from, spec.to, spec.key
                )));
            }
        }

        // Build CSR row pointer (node_out_start).
        let mut node_out_start = vec![0u32; node_count + 1];
        for (from, _, _) in &raw {
            node_out_start[from.index() + 1] += 1;
        }
        for i in 1..=node_count {
            node_out_start[i] += node_out_start[i - 1];
        }
        debug_assert_eq!(node_out_start[node_count] as usize, edge_count);

        let mut edge_from      = Vec::with_capacity(edge_count);
        let mut edge_to        = Vec::with_capacity(edge_count);
        let mut edge_key       = Vec::with_capacity(edge_count);
        let mut edge_length_m  = Vec::with_capacity(edge_count);
        let mut edge_speed_kph = Vec::with_capacity(edge_count);
        let mut edge_travel_s  = Vec::with_capacity(edge_count);
        let mut edge_segments  = Vec::with_capacity(edge_count);
        let mut edge_geometry  = Vec::with_capacity(edge_count);
        for (from, to, spec) in raw {
            edge_from.push(from);
            edge_to.push(to);
            edge_key.push(spec.key);
            edge_length_m.push(spec.length_m);
            edge_speed_kph.push(spec.speed_kph);
            edge_travel_s.push(travel_time_s(spec.length_m, spec.speed_kph));
            edge_segments.push(spec.segments.into_boxed_slice());
            edge_geometry.push(spec.geometry);
        }

        let mut network = RoadNetwork {
            node_osm,
            node_pos,
            node_lookup,
            node_out_start,
            edge_from,
            edge_to,
            edge_key,
            edge_length_m,
            edge_speed_kph,
            edge_travel_s,
            edge_segments,
            edge_geometry,
            edge_lookup,
            max_speed_kph: 0.0,
        };
        network.refresh_max_speed();
        let stats = network.stats();
        info!(
            "Built road network with {} nodes and {} edges (avg out-degree {:.2})",
            stats.node_count, stats.edge_count, stats.avg_out_degree
        );
        Ok(network)
    }
}

fn validate_edge(spec: &EdgeSpec) -> NetworkResult<()> {
    let malformed = |what: String| {
        NetworkError::MalformedNetwork(format!("edge ({}, {}, {}): {what}", spec.from, spec.to, spec.key))
    };
    if !(spec.length_m.is_finite() && spec.length_m >= 0.0) {
        return Err(malformed(format!("invalid length {} m", spec.length_m)));
    }
    if !(spec.speed_kph.is_finite() && spec.speed_kph >= 0.0) {
        return Err(malformed(format!("invalid speed {} km/h", spec.speed_kph)));
    }
    if let Some(line) = &spec.geometry {
        if line.0.len() < 2 {
            return Err(malformed("geometry needs at least two points".into()));
        }
        if line.coords().any(|c| !GeoPoint::from(*c).is_valid()) {
            return Err(malformed("geometry has an invalid coordinate".into()));
        }
    }
    Ok(())
}
