//! Edge-weight functions consumed by the search.
//!
//! # Overlay model
//!
//! The shared [`RoadNetwork`] is never written by a request.  A request that
//! prefers some segments builds a [`BoostedWeights`] overlay: a borrowed view
//! of the base network plus the set of boosted `EdgeId`s.  Dropping the
//! overlay is the only cleanup there is, so concurrent requests cannot see
//! each other's boosts and a failed request leaves nothing behind.
//!
//! # Boost formula
//!
//! For a boosted edge the search cost is
//!
//! ```text
//! length_km / (boost * reference_speed_kph) * 3600
//! ```
//!
//! `reference_speed_kph` is process-wide configuration, not the edge's own
//! stored speed, so a boost has the same magnitude on every preferred
//! segment.  Every other edge costs its base travel time.

use log::{debug, warn};
use rustc_hash::FxHashSet;

use br_core::{EdgeId, SegmentId};
use br_network::{RoadNetwork, SegmentIndex, travel_time_s};

use crate::{RoutingError, RoutingResult};

// ── EdgeWeights trait ─────────────────────────────────────────────────────────

/// Non-negative cost, in seconds, of traversing an edge.
///
/// `+inf` marks an edge the search must not relax.
pub trait EdgeWeights {
    fn weight(&self, edge: EdgeId) -> f64;

    /// Upper bound on the speed (km/h) implied by any finite weight.  Used to
    /// keep the A* heuristic admissible; `0.0` when nothing is passable.
    fn max_speed_kph(&self) -> f64;
}

// ── BaseWeights ───────────────────────────────────────────────────────────────

/// The network's own travel times, unmodified.
#[derive(Debug, Clone, Copy)]
pub struct BaseWeights<'a> {
    network: &'a RoadNetwork,
}

impl<'a> BaseWeights<'a> {
    pub fn new(network: &'a RoadNetwork) -> Self {
        Self { network }
    }
}

impl EdgeWeights for BaseWeights<'_> {
    #[inline]
    fn weight(&self, edge: EdgeId) -> f64 {
        self.network.edge_travel_s(edge)
    }

    fn max_speed_kph(&self) -> f64 {
        self.network.max_speed_kph()
    }
}

// ── BoostedWeights ────────────────────────────────────────────────────────────

/// Base travel times with a per-request speed boost on a set of edges.
#[derive(Debug, Clone)]
pub struct BoostedWeights<'a> {
    network:           &'a RoadNetwork,
    boosted:           FxHashSet<EdgeId>,
    boosted_speed_kph: f64,
}

impl<'a> BoostedWeights<'a> {
    /// Resolve `preferred` through `segments` and build the overlay.
    ///
    /// Ids that resolve to no edge are skipped with a warning; they usually
    /// name features that were filtered out of the loaded area.
    ///
    /// # Errors
    ///
    /// `InvalidSpeed` if `boost * reference_speed_kph` is not positive and
    /// finite.
    pub fn compute<I>(
        network: &'a RoadNetwork,
        segments: &SegmentIndex,
        preferred: I,
        boost: f64,
        reference_speed_kph: f64,
    ) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = SegmentId>,
    {
        let boosted_speed_kph = boost * reference_speed_kph;
        if !(boosted_speed_kph.is_finite() && boosted_speed_kph > 0.0) {
            return Err(RoutingError::InvalidSpeed { speed_kph: boosted_speed_kph });
        }

        let (boosted, unresolved) = segments.resolve_all(preferred);
        if !unresolved.is_empty() {
            warn!("{} preferred segment ids matched no edge: {unresolved:?}", unresolved.len());
        }
        debug!(
            "Boosting {} directed edges to {boosted_speed_kph:.1} km/h",
            boosted.len()
        );

        Ok(Self { network, boosted, boosted_speed_kph })
    }

    /// Overlay that boosts exactly `edges`.
    pub fn from_edges<I>(network: &'a RoadNetwork, edges: I, boosted_speed_kph: f64) -> RoutingResult<Self>
    where
        I: IntoIterator<Item = EdgeId>,
    {
        if !(boosted_speed_kph.is_finite() && boosted_speed_kph > 0.0) {
            return Err(RoutingError::InvalidSpeed { speed_kph: boosted_speed_kph });
        }
        Ok(Self {
            network,
            boosted: edges.into_iter().collect(),
            boosted_speed_kph,
        })
    }

    pub fn is_boosted(&self, edge: EdgeId) -> bool {
        self.boosted.contains(&edge)
    }

    pub fn boosted_count(&self) -> usize {
        self.boosted.len()
    }

    pub fn boosted_speed_kph(&self) -> f64 {
        self.boosted_speed_kph
    }
}

impl EdgeWeights for BoostedWeights<'_> {
    #[inline]
    fn weight(&self, edge: EdgeId) -> f64 {
        let base = self.network.edge_travel_s(edge);
        // A closed (zero-speed) edge stays closed under a boost.
        if base.is_finite() && self.boosted.contains(&edge) {
            travel_time_s(self.network.edge_length_m(edge), self.boosted_speed_kph)
        } else {
            base
        }
    }

    fn max_speed_kph(&self) -> f64 {
        if self.boosted.is_empty() {
            self.network.max_speed_kph()
        } else {
            self.network.max_speed_kph().max(self.boosted_speed_kph)
        }
    }
}
