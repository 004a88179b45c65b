//! Request surface: the shared routing graph and the per-request pipeline.
//!
//! # Lifecycle
//!
//! A [`RoutingGraph`] bundles a network with its segment and spatial
//! indices.  It is built once, wrapped in an `Arc`, and never mutated.  The
//! [`RoutingService`] holds the current graph behind a lock that is only
//! taken long enough to clone the `Arc`:
//!
//! - [`route`](RoutingService::route) snapshots the graph at the start of a
//!   request and works on that snapshot to the end.
//! - [`reload`](RoutingService::reload) swaps in a fully built replacement.
//!   In-flight requests finish on the old graph; later ones see the new one.
//!   Nobody ever observes a mix.
//!
//! # Per-request pipeline
//!
//! snap start/end → build the boost overlay → search → assemble.

use std::sync::Arc;

use log::{debug, info, warn};
use parking_lot::RwLock;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use br_core::{GeoPoint, OsmNodeId, RouterConfig, SegmentId};
use br_network::{NetworkError, RoadNetwork, SegmentIndex, SpatialIndex};

use crate::assemble::{RouteAssembler, RouteResult};
use crate::response::RouteResponse;
use crate::search::PathFinder;
use crate::weights::BoostedWeights;
use crate::{RoutingError, RoutingResult};

// ── RoutingGraph ──────────────────────────────────────────────────────────────

/// Network plus the indices built from it.  Read-only.
pub struct RoutingGraph {
    network:  RoadNetwork,
    segments: SegmentIndex,
    spatial:  SpatialIndex,
}

impl RoutingGraph {
    /// Build both indices over `network`.
    ///
    /// # Errors
    ///
    /// `EmptyIndex` for a network with no nodes: every request would fail
    /// to snap, so the graph is unusable.
    pub fn build(network: RoadNetwork) -> RoutingResult<Self> {
        if network.is_empty() {
            return Err(NetworkError::EmptyIndex.into());
        }
        let segments = SegmentIndex::build(&network);
        let spatial = SpatialIndex::build(&network);
        info!(
            "Routing graph ready: {} nodes, {} edges, {} segment ids",
            network.node_count(),
            network.edge_count(),
            segments.len()
        );
        Ok(Self { network, segments, spatial })
    }

    pub fn network(&self) -> &RoadNetwork {
        &self.network
    }

    pub fn segments(&self) -> &SegmentIndex {
        &self.segments
    }

    pub fn spatial(&self) -> &SpatialIndex {
        &self.spatial
    }
}

// ── Request / outcome ─────────────────────────────────────────────────────────

/// One route query.  Coordinates are `(lon, lat)` in degrees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteRequest {
    pub start: (f64, f64),
    pub end:   (f64, f64),
    /// Falls back to [`RouterConfig::default_boost`].
    #[serde(default)]
    pub boost_multiplier: Option<f64>,
    /// Omitted and empty behave identically.
    #[serde(default)]
    pub preferred_segment_ids: Option<Vec<i64>>,
}

impl RouteRequest {
    pub fn new(start: (f64, f64), end: (f64, f64)) -> Self {
        Self { start, end, boost_multiplier: None, preferred_segment_ids: None }
    }

    pub fn with_boost(mut self, boost: f64) -> Self {
        self.boost_multiplier = Some(boost);
        self
    }

    pub fn with_preferred<I>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = i64>,
    {
        self.preferred_segment_ids = Some(ids.into_iter().collect());
        self
    }

    fn validate(&self) -> RoutingResult<(GeoPoint, GeoPoint)> {
        let check = |name: &str, (lon, lat): (f64, f64)| {
            let p = GeoPoint::new(lon, lat);
            if p.is_valid() {
                Ok(p)
            } else {
                Err(RoutingError::MalformedRequest(format!("{name} coordinate {p} is not a valid lon/lat")))
            }
        };
        Ok((check("start", self.start)?, check("end", self.end)?))
    }
}

/// Result of a well-formed request.
///
/// `NoPath` is an expected outcome (for example, the two points snapped to
/// disconnected components), not an error.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Found(RouteResult),
    NoPath { from: OsmNodeId, to: OsmNodeId },
}

impl RouteOutcome {
    pub fn route(&self) -> Option<&RouteResult> {
        match self {
            RouteOutcome::Found(route) => Some(route),
            RouteOutcome::NoPath { .. } => None,
        }
    }

    pub fn is_no_path(&self) -> bool {
        matches!(self, RouteOutcome::NoPath { .. })
    }

    pub fn to_response(&self) -> RouteResponse {
        self.into()
    }
}

// ── RoutingService ────────────────────────────────────────────────────────────

pub struct RoutingService {
    config: RouterConfig,
    graph:  RwLock<Arc<RoutingGraph>>,
}

impl RoutingService {
    /// # Errors
    ///
    /// `Config` if `config` fails validation.
    pub fn new(config: RouterConfig, graph: RoutingGraph) -> RoutingResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            graph: RwLock::new(Arc::new(graph)),
        })
    }

    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// Snapshot of the current graph.
    pub fn graph(&self) -> Arc<RoutingGraph> {
        Arc::clone(&self.graph.read())
    }

    /// Replace the graph.  Returns the previous one, which stays alive until
    /// the last in-flight request using it finishes.
    pub fn reload(&self, graph: RoutingGraph) -> Arc<RoutingGraph> {
        let graph = Arc::new(graph);
        info!("Reloading routing graph ({} nodes)", graph.network().node_count());
        std::mem::replace(&mut *self.graph.write(), graph)
    }

    /// Route one request against the current graph.
    ///
    /// # Errors
    ///
    /// `MalformedRequest` for invalid coordinates, `InvalidSpeed` for a
    /// non-positive boost, `SearchLimitExceeded` when the configured bound
    /// is hit.
    pub fn route(&self, request: &RouteRequest) -> RoutingResult<RouteOutcome> {
        let graph = self.graph();
        route_on(&graph, &self.config, request)
    }

    /// Route independent requests in parallel.  Each gets its own overlay;
    /// results are in input order.
    pub fn route_many(&self, requests: &[RouteRequest]) -> Vec<RoutingResult<RouteOutcome>> {
        let graph = self.graph();
        requests
            .par_iter()
            .map(|request| route_on(&graph, &self.config, request))
            .collect()
    }
}

/// The per-request pipeline against a fixed graph snapshot.
pub fn route_on(graph: &RoutingGraph, config: &RouterConfig, request: &RouteRequest) -> RoutingResult<RouteOutcome> {
    let (start, end) = request.validate()?;
    let network = graph.network();

    let boost = request.boost_multiplier.unwrap_or(config.default_boost);
    let preferred = request
        .preferred_segment_ids
        .as_deref()
        .unwrap_or_default()
        .iter()
        .map(|&id| SegmentId(id));
    let weights = BoostedWeights::compute(
        network,
        graph.segments(),
        preferred,
        boost,
        config.reference_speed_kph,
    )?;

    let (source, source_m) = graph.spatial().snap(start)?;
    let (target, target_m) = graph.spatial().snap(end)?;
    debug!(
        "Snapped start to {} ({source_m:.0} m), end to {} ({target_m:.0} m)",
        network.osm_id(source),
        network.osm_id(target)
    );

    let finder = PathFinder::from_config(config);
    let Some(path) = finder.shortest_path(network, &weights, source, target)? else {
        let (from, to) = (network.osm_id(source), network.osm_id(target));
        warn!("No route found between nodes {from} and {to}");
        return Ok(RouteOutcome::NoPath { from, to });
    };

    let route = RouteAssembler::assemble(network, &path)?;
    info!(
        "Route of {} edges: {:.0} m, {:.1} s",
        route.edges.len(),
        route.distance_m,
        route.travel_time_s
    );
    Ok(RouteOutcome::Found(route))
}
