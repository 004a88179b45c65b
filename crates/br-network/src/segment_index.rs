//! External segment id → directed edge index.
//!
//! A user-facing segment (an OSM way) is usually split into several internal
//! edges and is usually traversable both ways.  For every edge `(u, v, key)`
//! tagged with segment `X`, the index registers the edge itself and, when
//! the network really contains `(v, u, key)`, that reverse edge as well.  A
//! reverse address that does not exist (a one-way street) is skipped, never
//! fabricated.

use std::collections::BTreeSet;

use log::{debug, info};
use rustc_hash::{FxHashMap, FxHashSet};

use br_core::{EdgeId, EdgeKey, SegmentId};

use crate::RoadNetwork;

/// Read-only after construction; safe to share between threads.
#[derive(Debug, Clone, Default)]
pub struct SegmentIndex {
    /// Edge lists are sorted and deduplicated.
    by_segment: FxHashMap<SegmentId, Box<[EdgeId]>>,
}

impl SegmentIndex {
    pub fn build(network: &RoadNetwork) -> Self {
        let mut raw: FxHashMap<SegmentId, Vec<EdgeId>> = FxHashMap::default();

        for i in 0..network.edge_count() {
            let edge = EdgeId(i as u32);
            let segments = network.edge_segments(edge);
            if segments.is_empty() {
                continue;
            }
            let reverse = network.find_edge(
                network.edge_to(edge),
                network.edge_from(edge),
                network.edge_key(edge),
            );
            for &seg in segments {
                let entry = raw.entry(seg).or_default();
                entry.push(edge);
                entry.extend(reverse);
            }
        }

        let by_segment: FxHashMap<SegmentId, Box<[EdgeId]>> = raw
            .into_iter()
            .map(|(seg, mut edges)| {
                edges.sort_unstable();
                edges.dedup();
                (seg, edges.into_boxed_slice())
            })
            .collect();

        info!("Indexed {} segment ids", by_segment.len());
        Self { by_segment }
    }

    /// Number of distinct segment ids.
    pub fn len(&self) -> usize {
        self.by_segment.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_segment.is_empty()
    }

    /// Edges for `segment`, in `EdgeId` order.  Unknown ids give an empty
    /// slice.
    pub fn lookup(&self, segment: SegmentId) -> &[EdgeId] {
        self.by_segment.get(&segment).map_or(&[], |edges| edges)
    }

    /// External addresses of the edges for `segment`.
    pub fn lookup_keys(&self, segment: SegmentId, network: &RoadNetwork) -> BTreeSet<EdgeKey> {
        self.lookup(segment)
            .iter()
            .map(|&e| network.edge_key_of(e))
            .collect()
    }

    /// Union of the edges for all `segments`, plus the ids that resolved to
    /// nothing (in input order, deduplicated).
    pub fn resolve_all<I>(&self, segments: I) -> (FxHashSet<EdgeId>, Vec<SegmentId>)
    where
        I: IntoIterator<Item = SegmentId>,
    {
        let mut edges = FxHashSet::default();
        let mut unresolved = Vec::new();
        for seg in segments {
            let found = self.lookup(seg);
            if found.is_empty() {
                if !unresolved.contains(&seg) {
                    unresolved.push(seg);
                }
            } else {
                edges.extend(found.iter().copied());
            }
        }
        debug!("Resolved segments to {} directed edges", edges.len());
        (edges, unresolved)
    }
}
