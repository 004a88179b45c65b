//! Nearest-node index for snapping coordinates onto the network.
//!
//! Nodes are stored in an R-tree (via `rstar`) as unit vectors on the
//! sphere.  Chord distance between unit vectors is a strictly increasing
//! function of great-circle distance, so the R-tree's Euclidean
//! nearest-neighbour order is exactly the haversine order, with none of the
//! east-west distortion of a flat lon/lat index.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use br_core::{GeoPoint, NodeId};

use crate::{NetworkError, NetworkResult, RoadNetwork};

// ── R-tree node entry ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct NodeEntry {
    point: [f64; 3],
    id:    NodeId,
}

impl RTreeObject for NodeEntry {
    type Envelope = AABB<[f64; 3]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for NodeEntry {
    /// Squared chord length on the unit sphere.
    fn distance_2(&self, point: &[f64; 3]) -> f64 {
        let dx = self.point[0] - point[0];
        let dy = self.point[1] - point[1];
        let dz = self.point[2] - point[2];
        dx * dx + dy * dy + dz * dz
    }
}

// ── SpatialIndex ──────────────────────────────────────────────────────────────

/// Built once per network and shared read-only by every request.
#[derive(Clone)]
pub struct SpatialIndex {
    tree:      RTree<NodeEntry>,
    positions: Vec<GeoPoint>,
}

impl SpatialIndex {
    /// Bulk-load the index: O(N log N).
    pub fn build(network: &RoadNetwork) -> Self {
        let positions = network.node_positions().to_vec();
        let entries: Vec<NodeEntry> = positions
            .iter()
            .enumerate()
            .map(|(i, &pos)| NodeEntry {
                point: pos.to_unit_vector(),
                id:    NodeId(i as u32),
            })
            .collect();
        Self { tree: RTree::bulk_load(entries), positions }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Up to `k` nodes nearest to `(lon, lat)`, nearest first.  `k` larger
    /// than the node count returns every node.
    ///
    /// # Errors
    ///
    /// `EmptyIndex` if the network has no nodes, `InvalidCoordinate` for a
    /// non-finite or out-of-range query.
    pub fn nearest(&self, lon: f64, lat: f64, k: usize) -> NetworkResult<Vec<NodeId>> {
        if self.is_empty() {
            return Err(NetworkError::EmptyIndex);
        }
        let query = query_vector(GeoPoint::new(lon, lat))?;
        Ok(self
            .tree
            .nearest_neighbor_iter(&query)
            .take(k)
            .map(|e| e.id)
            .collect())
    }

    /// The single nearest node to `pos` and its great-circle distance in
    /// metres.
    pub fn snap(&self, pos: GeoPoint) -> NetworkResult<(NodeId, f64)> {
        let query = query_vector(pos)?;
        let entry = self.tree.nearest_neighbor(&query).ok_or(NetworkError::EmptyIndex)?;
        Ok((entry.id, pos.distance_m(self.positions[entry.id.index()])))
    }
}

fn query_vector(pos: GeoPoint) -> NetworkResult<[f64; 3]> {
    if !pos.is_valid() {
        return Err(NetworkError::InvalidCoordinate(pos));
    }
    Ok(pos.to_unit_vector())
}
