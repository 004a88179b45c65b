//! Path → user-facing route.
//!
//! Edge geometries are oriented to run from each edge's `from` node and
//! concatenated into one line without duplicate points at the joins.
//! Distance is measured on that line after projecting it into the UTM zone
//! of its centroid.  Travel time is the sum of the edges' **base** travel
//! times; a boost only steers the search and never shows up here.

use geo::{Coord, LineString};
use serde::Serialize;

use br_core::{EdgeId, EdgeKey, GeoPoint, NodeId, OsmNodeId, UtmZone};
use br_network::{NetworkError, RoadNetwork};

use crate::search::Path;
use crate::{RoutingError, RoutingResult};

/// A finished route.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteResult {
    pub nodes: Vec<OsmNodeId>,
    pub edges: Vec<EdgeKey>,
    /// Connected lon/lat line; empty for a zero-length route.
    #[serde(skip)]
    pub geometry: LineString<f64>,
    pub distance_m: f64,
    pub travel_time_s: f64,
}

impl RouteResult {
    /// A route with no edges (source == target, or an empty path).
    pub fn empty(nodes: Vec<OsmNodeId>) -> Self {
        Self {
            nodes,
            edges: Vec::new(),
            geometry: LineString::new(Vec::new()),
            distance_m: 0.0,
            travel_time_s: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }
}

pub struct RouteAssembler;

impl RouteAssembler {
    /// Assemble the edges the search actually chose.
    ///
    /// # Errors
    ///
    /// `MalformedRequest` if `path` does not describe a connected walk in
    /// `network` (for example, it came from a different network).
    pub fn assemble(network: &RoadNetwork, path: &Path) -> RoutingResult<RouteResult> {
        let nodes = path.nodes();
        let edges = path.edges();
        let connected = edges.len() + 1 == nodes.len()
            && nodes.iter().all(|n| n.index() < network.node_count())
            && edges.iter().enumerate().all(|(i, &e)| {
                e.index() < network.edge_count()
                    && network.edge_from(e) == nodes[i]
                    && network.edge_to(e) == nodes[i + 1]
            });
        if !connected {
            return Err(RoutingError::MalformedRequest(
                "path does not form a connected walk in this network".into(),
            ));
        }
        Ok(build(network, nodes, edges))
    }

    /// Assemble a bare node sequence, taking the lowest-key edge between
    /// each consecutive pair.
    ///
    /// Prefer [`assemble`](Self::assemble): when parallel edges differ in
    /// cost, the lowest-key edge need not be the one the search used.
    ///
    /// # Errors
    ///
    /// `NotFound` if some consecutive pair has no edge, `MalformedRequest`
    /// if a node is outside `network`.
    pub fn assemble_nodes(network: &RoadNetwork, nodes: &[NodeId]) -> RoutingResult<RouteResult> {
        if let Some(bad) = nodes.iter().find(|n| n.index() >= network.node_count()) {
            return Err(RoutingError::MalformedRequest(format!(
                "{bad} is outside a network of {} nodes",
                network.node_count()
            )));
        }
        let edges = nodes
            .windows(2)
            .map(|w| {
                network.lowest_key_edge(w[0], w[1]).ok_or_else(|| {
                    RoutingError::Network(NetworkError::NotFound {
                        from: network.osm_id(w[0]),
                        to:   network.osm_id(w[1]),
                        key:  0,
                    })
                })
            })
            .collect::<RoutingResult<Vec<EdgeId>>>()?;
        Ok(build(network, nodes, &edges))
    }
}

fn build(network: &RoadNetwork, nodes: &[NodeId], edges: &[EdgeId]) -> RouteResult {
    let node_ids: Vec<OsmNodeId> = nodes.iter().map(|&n| network.osm_id(n)).collect();
    if edges.is_empty() {
        return RouteResult::empty(node_ids);
    }

    let mut coords: Vec<Coord<f64>> = Vec::new();
    for &e in edges {
        // Skips the shared join point as well as repeated vertices.
        for c in oriented_line(network, e).0 {
            if coords.last() != Some(&c) {
                coords.push(c);
            }
        }
    }
    let geometry = LineString::new(coords);

    let distance_m = UtmZone::for_points(geometry.coords().map(|&c| GeoPoint::from(c)))
        .map_or(0.0, |zone| zone.line_length_m(&geometry));
    let travel_time_s = edges.iter().map(|&e| network.edge_travel_s(e)).sum();

    RouteResult {
        nodes: node_ids,
        edges: edges.iter().map(|&e| network.edge_key_of(e)).collect(),
        geometry,
        distance_m,
        travel_time_s,
    }
}

/// Geometry of `edge` running from its `from` node.
///
/// Stored geometries may be digitised in either direction; whichever end
/// lies closer to the `from` node is taken as the start.
fn oriented_line(network: &RoadNetwork, edge: EdgeId) -> LineString<f64> {
    let mut line = network.edge_line(edge);
    let start = network.node_pos(network.edge_from(edge));
    if let (Some(&first), Some(&last)) = (line.0.first(), line.0.last()) {
        if start.distance_m(last.into()) < start.distance_m(first.into()) {
            line.0.reverse();
        }
    }
    line
}
