//! Single-pair shortest-path search.
//!
//! # Algorithms
//!
//! [`SearchStrategy::Dijkstra`] is plain label-setting Dijkstra.
//! [`SearchStrategy::AStar`] adds a great-circle lower bound
//! `haversine(node, target) / max_speed`, where `max_speed` comes from the
//! [`EdgeWeights`] in use so the bound stays admissible under a boost.
//!
//! The bound assumes every edge's `length_m` is at least the great-circle
//! distance between its endpoints.  Under that condition both strategies
//! return the same cost for the same query and A* usually settles fewer
//! nodes; a network with shorter stored lengths can make A* return a more
//! expensive path.
//!
//! # Determinism
//!
//! Heap entries are ordered by `(priority, NodeId, cost)` and out-edges are
//! scanned in CSR `(to, key)` order.  A label is only replaced by a strictly
//! smaller one, so among equal-cost paths the first one found wins, and
//! "first" depends only on the graph and the weights.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use br_core::{EdgeId, GeoPoint, NodeId, RouterConfig, SearchStrategy};
use br_network::RoadNetwork;

use crate::weights::EdgeWeights;
use crate::{RoutingError, RoutingResult};

// ── Path ──────────────────────────────────────────────────────────────────────

/// The result of a successful search.
///
/// `edges[i]` is the edge the search relaxed to get from `nodes[i]` to
/// `nodes[i + 1]`, so parallel edges are never ambiguous downstream.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    nodes: Vec<NodeId>,
    edges: Vec<EdgeId>,
    cost:  f64,
}

impl Path {
    /// Zero-length path that starts and ends at `node`.
    pub fn trivial(node: NodeId) -> Self {
        Self { nodes: vec![node], edges: Vec::new(), cost: 0.0 }
    }

    pub fn nodes(&self) -> &[NodeId] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Total search cost in seconds under the weights that produced the path.
    pub fn cost(&self) -> f64 {
        self.cost
    }

    pub fn source(&self) -> NodeId {
        self.nodes[0]
    }

    pub fn target(&self) -> NodeId {
        self.nodes[self.nodes.len() - 1]
    }

    /// `true` if the source and target are the same node.
    pub fn is_trivial(&self) -> bool {
        self.edges.is_empty()
    }
}

// ── PathFinder ────────────────────────────────────────────────────────────────

/// Stateless search driver.  One instance can serve any number of
/// concurrent queries.
#[derive(Debug, Clone, Copy, Default)]
pub struct PathFinder {
    strategy:    SearchStrategy,
    max_settled: Option<usize>,
}

impl PathFinder {
    pub fn new(strategy: SearchStrategy) -> Self {
        Self { strategy, max_settled: None }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self {
            strategy:    config.strategy,
            max_settled: config.max_settled_nodes,
        }
    }

    /// Abort with `SearchLimitExceeded` after settling `limit` nodes.
    pub fn with_max_settled(mut self, limit: Option<usize>) -> Self {
        self.max_settled = limit;
        self
    }

    pub fn strategy(&self) -> SearchStrategy {
        self.strategy
    }

    /// Cheapest path from `source` to `target` under `weights`.
    ///
    /// Returns `Ok(None)` when `target` is unreachable.  `source == target`
    /// returns a single-node path with zero cost.
    ///
    /// # Errors
    ///
    /// `MalformedRequest` if either node is outside `network`,
    /// `SearchLimitExceeded` if the configured bound is hit first.
    pub fn shortest_path<W>(
        &self,
        network: &RoadNetwork,
        weights: &W,
        source: NodeId,
        target: NodeId,
    ) -> RoutingResult<Option<Path>>
    where
        W: EdgeWeights + ?Sized,
    {
        let n = network.node_count();
        for node in [source, target] {
            if node.index() >= n {
                return Err(RoutingError::MalformedRequest(format!(
                    "{node} is outside a network of {n} nodes"
                )));
            }
        }
        if source == target {
            return Ok(Some(Path::trivial(source)));
        }

        let heuristic = Heuristic::new(self.strategy, network, weights, target);
        search(network, weights, &heuristic, source, target, self.max_settled)
    }
}

// ── Search internals ──────────────────────────────────────────────────────────

/// `f64` ordered by `total_cmp` so it can live in a `BinaryHeap`.
#[derive(Copy, Clone, Debug, PartialEq)]
struct Cost(f64);

impl Eq for Cost {}

impl PartialOrd for Cost {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cost {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// Lower bound on the remaining cost from a node to the target.
enum Heuristic {
    Zero,
    GreatCircle {
        target: GeoPoint,
        /// Seconds per metre at the fastest possible speed.
        s_per_m: f64,
    },
}

impl Heuristic {
    fn new<W>(strategy: SearchStrategy, network: &RoadNetwork, weights: &W, target: NodeId) -> Self
    where
        W: EdgeWeights + ?Sized,
    {
        match strategy {
            SearchStrategy::Dijkstra => Heuristic::Zero,
            SearchStrategy::AStar => {
                let max_speed = weights.max_speed_kph();
                if max_speed.is_finite() && max_speed > 0.0 {
                    Heuristic::GreatCircle {
                        target:  network.node_pos(target),
                        s_per_m: 3.6 / max_speed,
                    }
                } else {
                    Heuristic::Zero
                }
            }
        }
    }

    #[inline]
    fn estimate(&self, network: &RoadNetwork, node: NodeId) -> f64 {
        match self {
            Heuristic::Zero => 0.0,
            Heuristic::GreatCircle { target, s_per_m } => {
                network.node_pos(node).distance_m(*target) * s_per_m
            }
        }
    }
}

fn search<W>(
    network: &RoadNetwork,
    weights: &W,
    heuristic: &Heuristic,
    source: NodeId,
    target: NodeId,
    max_settled: Option<usize>,
) -> RoutingResult<Option<Path>>
where
    W: EdgeWeights + ?Sized,
{
    let n = network.node_count();
    // dist[v] = best known cost (s) to reach v.
    let mut dist      = vec![f64::INFINITY; n];
    // prev_edge[v] = EdgeId that reached v; EdgeId::INVALID for unreached nodes.
    let mut prev_edge = vec![EdgeId::INVALID; n];
    let mut settled   = 0usize;

    dist[source.index()] = 0.0;

    // Min-heap on (cost + estimate, node, cost).
    let mut heap: BinaryHeap<Reverse<(Cost, NodeId, Cost)>> = BinaryHeap::new();
    heap.push(Reverse((Cost(heuristic.estimate(network, source)), source, Cost(0.0))));

    while let Some(Reverse((_, node, Cost(cost)))) = heap.pop() {
        // Skip stale heap entries.
        if cost > dist[node.index()] {
            continue;
        }
        if node == target {
            return Ok(Some(reconstruct(network, &prev_edge, source, target, cost)));
        }

        if max_settled.is_some_and(|limit| settled >= limit) {
            return Err(RoutingError::SearchLimitExceeded { settled });
        }
        settled += 1;

        for edge in network.out_edges(node) {
            let w = weights.weight(edge);
            if !w.is_finite() {
                continue;
            }
            debug_assert!(w >= 0.0, "negative weight {w} on {edge}");
            let neighbor = network.edge_to(edge);
            let new_cost = cost + w;
            if new_cost < dist[neighbor.index()] {
                dist[neighbor.index()] = new_cost;
                prev_edge[neighbor.index()] = edge;
                let priority = new_cost + heuristic.estimate(network, neighbor);
                heap.push(Reverse((Cost(priority), neighbor, Cost(new_cost))));
            }
        }
    }

    Ok(None)
}

fn reconstruct(
    network: &RoadNetwork,
    prev_edge: &[EdgeId],
    source: NodeId,
    target: NodeId,
    cost: f64,
) -> Path {
    let mut edges = Vec::new();
    let mut cur = target;
    while cur != source {
        let e = prev_edge[cur.index()];
        debug_assert_ne!(e, EdgeId::INVALID);
        edges.push(e);
        cur = network.edge_from(e);
    }
    edges.reverse();

    let mut nodes = Vec::with_capacity(edges.len() + 1);
    nodes.push(source);
    nodes.extend(edges.iter().map(|&e| network.edge_to(e)));
    Path { nodes, edges, cost }
}
