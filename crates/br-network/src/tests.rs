//! Unit tests for br-network.
//!
//! All tests use hand-built networks so they run without any external data.

#[cfg(test)]
mod helpers {
    use br_core::GeoPoint;
    use geo::line_string;

    use crate::{EdgeSpec, RoadNetwork, RoadNetworkBuilder};

    /// Small Edinburgh-ish network.
    ///
    /// ```text
    ///   1 ──(way 100)── 2 ──(way 200, one-way 2→3)──▶ 3
    ///   │                                             │
    ///   └──────────────(way 300)──────────────────────┘
    /// ```
    ///
    /// Way 100 and 300 are two-way.  Node 1→2 has a second, slower parallel
    /// edge (key 1) with no segment id.
    pub fn sample_network() -> RoadNetwork {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(-3.200, 55.950));
        b.add_node(2, GeoPoint::new(-3.190, 55.950));
        b.add_node(3, GeoPoint::new(-3.180, 55.950));

        b.add_road(
            EdgeSpec::new(1, 2, 625.0, 15.0)
                .segments([100])
                .geometry(line_string![(x: -3.200, y: 55.950), (x: -3.195, y: 55.951), (x: -3.190, y: 55.950)]),
        );
        b.add_edge(EdgeSpec::new(1, 2, 700.0, 10.0).key(1));
        b.add_edge(EdgeSpec::new(2, 3, 625.0, 20.0).segments([200]));
        b.add_road(EdgeSpec::new(1, 3, 1_250.0, 15.0).segments([300, 301]));
        b.build().unwrap()
    }
}

// ── Builder & network structure ───────────────────────────────────────────────

#[cfg(test)]
mod builder {
    use br_core::{GeoPoint, OsmNodeId};

    use crate::{EdgeSpec, NetworkError, RoadNetwork, RoadNetworkBuilder};

    fn two_nodes() -> RoadNetworkBuilder {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(10, GeoPoint::new(0.0, 0.0));
        b.add_node(20, GeoPoint::new(0.001, 0.0));
        b
    }

    #[test]
    fn empty_build() {
        let net = RoadNetworkBuilder::new().build().unwrap();
        assert_eq!(net.node_count(), 0);
        assert_eq!(net.edge_count(), 0);
        assert!(net.is_empty());
        assert_eq!(net.stats().avg_out_degree, 0.0);

        let empty = RoadNetwork::empty();
        assert!(empty.is_empty());
    }

    #[test]
    fn dangling_edge_is_malformed() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, 100.0, 10.0));
        b.add_edge(EdgeSpec::new(10, 99, 100.0, 10.0));
        let err = b.build().unwrap_err();
        assert!(matches!(err, NetworkError::MalformedNetwork(ref m) if m.contains("99")), "{err}");
    }

    #[test]
    fn negative_length_is_malformed() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, -1.0, 10.0));
        assert!(matches!(b.build(), Err(NetworkError::MalformedNetwork(_))));
    }

    #[test]
    fn negative_speed_is_malformed() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, 1.0, -5.0));
        assert!(matches!(b.build(), Err(NetworkError::MalformedNetwork(_))));
    }

    #[test]
    fn duplicate_node_is_malformed() {
        let mut b = two_nodes();
        b.add_node(10, GeoPoint::new(1.0, 1.0));
        assert!(matches!(b.build(), Err(NetworkError::MalformedNetwork(_))));
    }

    #[test]
    fn invalid_coordinate_is_malformed() {
        let mut b = two_nodes();
        b.add_node(30, GeoPoint::new(0.0, 95.0));
        assert!(matches!(b.build(), Err(NetworkError::MalformedNetwork(_))));
    }

    #[test]
    fn duplicate_edge_key_is_malformed() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, 100.0, 10.0));
        b.add_edge(EdgeSpec::new(10, 20, 120.0, 10.0));
        assert!(matches!(b.build(), Err(NetworkError::MalformedNetwork(_))));
    }

    #[test]
    fn single_point_geometry_is_malformed() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, 100.0, 10.0).geometry(geo::LineString::new(vec![
            geo::Coord { x: 0.0, y: 0.0 },
        ])));
        assert!(matches!(b.build(), Err(NetworkError::MalformedNetwork(_))));
    }

    #[test]
    fn parallel_edges_with_distinct_keys() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, 100.0, 10.0).key(1));
        b.add_edge(EdgeSpec::new(10, 20, 100.0, 20.0));
        let net = b.build().unwrap();
        assert_eq!(net.edge_count(), 2);
        let a = net.node(OsmNodeId(10)).unwrap();
        // Out-edges come back in key order whatever the insertion order was.
        let keys: Vec<u32> = net.neighbors_out(a).map(|(_, k)| k).collect();
        assert_eq!(keys, vec![0, 1]);
    }

    #[test]
    fn zero_speed_is_impassable() {
        let mut b = two_nodes();
        b.add_edge(EdgeSpec::new(10, 20, 100.0, 0.0));
        let net = b.build().unwrap();
        let e = net.resolve(br_core::EdgeKey::new(10, 20, 0)).unwrap();
        assert!(net.edge_travel_s(e).is_infinite());
        assert_eq!(net.max_speed_kph(), 0.0);
    }

    #[test]
    fn csr_out_edges() {
        let net = super::helpers::sample_network();
        let n1 = net.node(OsmNodeId(1)).unwrap();
        let n3 = net.node(OsmNodeId(3)).unwrap();
        assert_eq!(net.out_degree(n1), 3); // 1→2 k0, 1→2 k1, 1→3
        assert_eq!(net.out_degree(n3), 1); // 3→1 only: way 200 is one-way
        for e in net.out_edges(n1) {
            assert_eq!(net.edge_from(e), n1);
        }
        let stats = net.stats();
        assert_eq!(stats.node_count, 3);
        assert_eq!(stats.edge_count, 6);
    }
}

// ── Edge lookup and attributes ────────────────────────────────────────────────

#[cfg(test)]
mod edges {
    use br_core::{EdgeKey, GeoPoint, NodeId, OsmNodeId, SegmentId};

    use crate::NetworkError;

    #[test]
    fn edge_lookup_by_index_and_key() {
        let net = super::helpers::sample_network();
        let n1 = net.node(OsmNodeId(1)).unwrap();
        let n2 = net.node(OsmNodeId(2)).unwrap();
        let e = net.edge(n1, n2, 1).unwrap();
        assert_eq!(net.edge_length_m(e), 700.0);
        assert_eq!(net.edge_key_of(e), EdgeKey::new(1, 2, 1));
        assert_eq!(net.resolve(EdgeKey::new(1, 2, 1)).unwrap(), e);
    }

    #[test]
    fn missing_edge_is_not_found() {
        let net = super::helpers::sample_network();
        let n2 = net.node(OsmNodeId(2)).unwrap();
        let n3 = net.node(OsmNodeId(3)).unwrap();
        let err = net.edge(n3, n2, 0).unwrap_err();
        assert!(matches!(
            err,
            NetworkError::NotFound { from: OsmNodeId(3), to: OsmNodeId(2), key: 0 }
        ));
        assert!(matches!(net.resolve(EdgeKey::new(7, 8, 0)), Err(NetworkError::NotFound { .. })));
        assert!(matches!(net.node(OsmNodeId(7)), Err(NetworkError::NodeNotFound(OsmNodeId(7)))));
    }

    #[test]
    fn lowest_key_edge_picks_key_zero() {
        let net = super::helpers::sample_network();
        let n1 = net.node(OsmNodeId(1)).unwrap();
        let n2 = net.node(OsmNodeId(2)).unwrap();
        let e = net.lowest_key_edge(n1, n2).unwrap();
        assert_eq!(net.edge_key(e), 0);
        assert!(net.lowest_key_edge(n2, NodeId(n2.0)).is_none());
    }

    #[test]
    fn segments_are_normalised() {
        let net = super::helpers::sample_network();
        let e = net.resolve(EdgeKey::new(3, 1, 0)).unwrap();
        assert_eq!(net.edge_segments(e), &[SegmentId(300), SegmentId(301)]);
        let parallel = net.resolve(EdgeKey::new(1, 2, 1)).unwrap();
        assert!(net.edge_segments(parallel).is_empty());
    }

    #[test]
    fn missing_geometry_is_synthesised() {
        let net = super::helpers::sample_network();
        let e = net.resolve(EdgeKey::new(2, 3, 0)).unwrap();
        assert!(net.edge_geometry(e).is_none());
        let line = net.edge_line(e);
        let pts: Vec<GeoPoint> = line.coords().map(|&c| c.into()).collect();
        assert_eq!(pts, vec![GeoPoint::new(-3.190, 55.950), GeoPoint::new(-3.180, 55.950)]);
    }

    #[test]
    fn add_road_reverses_geometry() {
        let net = super::helpers::sample_network();
        let fwd = net.edge_line(net.resolve(EdgeKey::new(1, 2, 0)).unwrap());
        let rev = net.edge_line(net.resolve(EdgeKey::new(2, 1, 0)).unwrap());
        let mut expected: Vec<_> = fwd.coords().copied().collect();
        expected.reverse();
        assert_eq!(rev.coords().copied().collect::<Vec<_>>(), expected);
    }
}

// ── Speed mutation ────────────────────────────────────────────────────────────

#[cfg(test)]
mod speeds {
    use approx::assert_relative_eq;
    use br_core::{EdgeId, EdgeKey, OsmNodeId};

    use crate::{NetworkError, travel_time_s};

    fn assert_formula_holds(net: &crate::RoadNetwork) {
        for i in 0..net.edge_count() {
            let e = EdgeId(i as u32);
            let expected = net.edge_length_m(e) / 1000.0 / net.edge_speed_kph(e) * 3600.0;
            assert_relative_eq!(net.edge_travel_s(e), expected, max_relative = 1e-12);
        }
    }

    #[test]
    fn formula_holds_after_build() {
        assert_formula_holds(&super::helpers::sample_network());
        assert_relative_eq!(travel_time_s(100.0, 10.0), 36.0);
        assert!(travel_time_s(100.0, 0.0).is_infinite());
    }

    #[test]
    fn max_speed_follows_speed_changes() {
        let mut net = super::helpers::sample_network();
        assert_eq!(net.max_speed_kph(), 20.0);
        let n2 = net.node(OsmNodeId(2)).unwrap();
        let n3 = net.node(OsmNodeId(3)).unwrap();
        net.set_speed(n2, n3, 0, 40.0).unwrap();
        assert_eq!(net.max_speed_kph(), 40.0);
        net.set_speeds([(EdgeKey::new(2, 3, 0), 5.0)]).unwrap();
        assert_eq!(net.max_speed_kph(), 15.0);
    }

    #[test]
    fn set_speed_recomputes_travel_time() {
        let mut net = super::helpers::sample_network();
        let n1 = net.node(OsmNodeId(1)).unwrap();
        let n2 = net.node(OsmNodeId(2)).unwrap();
        net.set_speed(n1, n2, 0, 30.0).unwrap();
        let e = net.edge(n1, n2, 0).unwrap();
        assert_eq!(net.edge_speed_kph(e), 30.0);
        assert_relative_eq!(net.edge_travel_s(e), 75.0);
        assert_formula_holds(&net);
    }

    #[test]
    fn set_speed_rejects_non_positive() {
        let mut net = super::helpers::sample_network();
        let n1 = net.node(OsmNodeId(1)).unwrap();
        let n2 = net.node(OsmNodeId(2)).unwrap();
        let before = net.edge_travel_s(net.edge(n1, n2, 0).unwrap());
        for bad in [0.0, -3.0, f64::NAN, f64::INFINITY] {
            let err = net.set_speed(n1, n2, 0, bad).unwrap_err();
            assert!(matches!(err, NetworkError::InvalidSpeed { .. }));
        }
        assert_eq!(net.edge_travel_s(net.edge(n1, n2, 0).unwrap()), before);
    }

    #[test]
    fn set_speed_on_missing_edge() {
        let mut net = super::helpers::sample_network();
        let n2 = net.node(OsmNodeId(2)).unwrap();
        let n3 = net.node(OsmNodeId(3)).unwrap();
        assert!(matches!(net.set_speed(n3, n2, 0, 10.0), Err(NetworkError::NotFound { .. })));
    }

    #[test]
    fn set_speeds_is_all_or_nothing() {
        let mut net = super::helpers::sample_network();
        let ok = EdgeKey::new(1, 2, 0);
        let before = net.edge_travel_s(net.resolve(ok).unwrap());
        let err = net
            .set_speeds([(ok, 40.0), (EdgeKey::new(3, 2, 0), 40.0)])
            .unwrap_err();
        assert!(matches!(err, NetworkError::NotFound { .. }));
        assert_eq!(net.edge_travel_s(net.resolve(ok).unwrap()), before);

        net.set_speeds([(ok, 40.0)]).unwrap();
        assert_eq!(net.edge_speed_kph(net.resolve(ok).unwrap()), 40.0);
        assert_formula_holds(&net);
    }

    #[test]
    fn recompute_is_idempotent() {
        let mut net = super::helpers::sample_network();
        let before: Vec<f64> = (0..net.edge_count()).map(|i| net.edge_travel_s(EdgeId(i as u32))).collect();
        net.recompute_travel_times();
        let after: Vec<f64> = (0..net.edge_count()).map(|i| net.edge_travel_s(EdgeId(i as u32))).collect();
        assert_eq!(before, after);
    }
}

// ── Segment index ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod segment_index {
    use std::collections::BTreeSet;

    use br_core::{EdgeKey, GeoPoint, SegmentId};

    use crate::{EdgeSpec, RoadNetworkBuilder, SegmentIndex};

    #[test]
    fn two_way_segment_exposes_both_directions() {
        let net = super::helpers::sample_network();
        let idx = SegmentIndex::build(&net);
        let keys = idx.lookup_keys(SegmentId(100), &net);
        let expected: BTreeSet<EdgeKey> = [EdgeKey::new(1, 2, 0), EdgeKey::new(2, 1, 0)].into();
        assert_eq!(keys, expected);
    }

    #[test]
    fn one_way_segment_does_not_fabricate_reverse() {
        let net = super::helpers::sample_network();
        let idx = SegmentIndex::build(&net);
        let keys = idx.lookup_keys(SegmentId(200), &net);
        assert_eq!(keys, [EdgeKey::new(2, 3, 0)].into());
    }

    #[test]
    fn reverse_registered_even_when_only_forward_is_tagged() {
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(0.0, 0.0));
        b.add_node(2, GeoPoint::new(0.001, 0.0));
        b.add_edge(EdgeSpec::new(1, 2, 100.0, 10.0).segments([7]));
        b.add_edge(EdgeSpec::new(2, 1, 100.0, 10.0));
        let net = b.build().unwrap();
        let idx = SegmentIndex::build(&net);
        assert_eq!(
            idx.lookup_keys(SegmentId(7), &net),
            [EdgeKey::new(1, 2, 0), EdgeKey::new(2, 1, 0)].into()
        );
    }

    #[test]
    fn reverse_lookup_respects_key() {
        // 1→2 key 1 is tagged; the only reverse edge has key 0, so no reverse.
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(0.0, 0.0));
        b.add_node(2, GeoPoint::new(0.001, 0.0));
        b.add_edge(EdgeSpec::new(1, 2, 100.0, 10.0).key(1).segments([7]));
        b.add_edge(EdgeSpec::new(2, 1, 100.0, 10.0));
        let net = b.build().unwrap();
        let idx = SegmentIndex::build(&net);
        assert_eq!(idx.lookup_keys(SegmentId(7), &net), [EdgeKey::new(1, 2, 1)].into());
    }

    #[test]
    fn multi_id_edges_and_unknown_ids() {
        let net = super::helpers::sample_network();
        let idx = SegmentIndex::build(&net);
        assert_eq!(idx.len(), 4);
        assert_eq!(idx.lookup(SegmentId(300)), idx.lookup(SegmentId(301)));
        assert_eq!(idx.lookup(SegmentId(300)).len(), 2);
        assert!(idx.lookup(SegmentId(999)).is_empty());
    }

    #[test]
    fn resolve_all_reports_unresolved() {
        let net = super::helpers::sample_network();
        let idx = SegmentIndex::build(&net);
        let (edges, unresolved) =
            idx.resolve_all([SegmentId(100), SegmentId(999), SegmentId(200), SegmentId(999)]);
        assert_eq!(edges.len(), 3);
        assert_eq!(unresolved, vec![SegmentId(999)]);
    }
}

// ── Spatial snap ──────────────────────────────────────────────────────────────

#[cfg(test)]
mod spatial {
    use br_core::{GeoPoint, OsmNodeId};

    use crate::{NetworkError, RoadNetwork, RoadNetworkBuilder, SpatialIndex};

    #[test]
    fn exact_position_returns_that_node_first() {
        let net = super::helpers::sample_network();
        let idx = SpatialIndex::build(&net);
        for osm in [1, 2, 3] {
            let n = net.node(OsmNodeId(osm)).unwrap();
            let p = net.node_pos(n);
            assert_eq!(idx.nearest(p.lon, p.lat, 1).unwrap(), vec![n]);
        }
    }

    #[test]
    fn nearest_order() {
        let net = super::helpers::sample_network();
        let idx = SpatialIndex::build(&net);
        let got: Vec<OsmNodeId> = idx
            .nearest(-3.199, 55.950, 3)
            .unwrap()
            .into_iter()
            .map(|n| net.osm_id(n))
            .collect();
        assert_eq!(got, vec![OsmNodeId(1), OsmNodeId(2), OsmNodeId(3)]);
    }

    #[test]
    fn k_larger_than_node_count_returns_all() {
        let net = super::helpers::sample_network();
        let idx = SpatialIndex::build(&net);
        assert_eq!(idx.nearest(0.0, 0.0, 50).unwrap().len(), 3);
        assert!(idx.nearest(0.0, 0.0, 0).unwrap().is_empty());
    }

    #[test]
    fn empty_network_is_an_error() {
        let idx = SpatialIndex::build(&RoadNetwork::empty());
        assert!(matches!(idx.nearest(0.0, 0.0, 1), Err(NetworkError::EmptyIndex)));
        assert!(matches!(idx.snap(GeoPoint::new(0.0, 0.0)), Err(NetworkError::EmptyIndex)));
    }

    #[test]
    fn invalid_query_is_an_error() {
        let idx = SpatialIndex::build(&super::helpers::sample_network());
        assert!(matches!(idx.nearest(f64::NAN, 55.0, 3), Err(NetworkError::InvalidCoordinate(_))));
        assert!(matches!(idx.nearest(-3.19, 91.0, 1), Err(NetworkError::InvalidCoordinate(_))));
        assert!(matches!(
            idx.snap(GeoPoint::new(f64::NAN, f64::NAN)),
            Err(NetworkError::InvalidCoordinate(_))
        ));
        assert!(matches!(
            idx.snap(GeoPoint::new(f64::INFINITY, 0.0)),
            Err(NetworkError::InvalidCoordinate(_))
        ));
    }

    #[test]
    fn great_circle_not_planar() {
        // At 56°N a degree of longitude is ~0.56 of a degree of latitude.
        // East is 0.010° away in lon (~620 m), north 0.008° in lat (~890 m):
        // a flat lon/lat index would wrongly pick north.
        let mut b = RoadNetworkBuilder::new();
        b.add_node(1, GeoPoint::new(-3.190, 56.000)); // query origin
        b.add_node(2, GeoPoint::new(-3.180, 56.000)); // east
        b.add_node(3, GeoPoint::new(-3.190, 56.008)); // north
        let net = b.build().unwrap();
        let idx = SpatialIndex::build(&net);
        let got = idx.nearest(-3.190, 56.000, 3).unwrap();
        assert_eq!(net.osm_id(got[1]), OsmNodeId(2));
        assert_eq!(net.osm_id(got[2]), OsmNodeId(3));
    }

    #[test]
    fn snap_reports_distance() {
        let net = super::helpers::sample_network();
        let idx = SpatialIndex::build(&net);
        let (n, d) = idx.snap(GeoPoint::new(-3.190, 55.951)).unwrap();
        assert_eq!(net.osm_id(n), OsmNodeId(2));
        assert!((d - 111.2).abs() < 1.0, "got {d}");
    }
}

// ── Loaders ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod loader {
    use std::io::{Cursor, Write};

    use br_core::{EdgeKey, SegmentId};

    use crate::loader::parse_external_ids;
    use crate::{
        NetworkError, SegmentIndex, load_network_csv, load_network_csv_readers,
        load_network_json_reader,
    };

    const NETWORK_JSON: &str = r#"{
        "nodes": [
            {"id": 1, "lon": -3.20, "lat": 55.95},
            {"id": 2, "lon": -3.19, "lat": 55.95},
            {"id": 3, "lon": -3.18, "lat": 55.95}
        ],
        "edges": [
            {"from": 1, "to": 2, "length_m": 625.0, "speed_kph": 12, "external_ids": 100},
            {"from": 2, "to": 1, "length_m": 625.0, "external_ids": [100, 101]},
            {"from": 2, "to": 3, "key": 2, "length_m": 625.0, "external_ids": null,
             "geometry": [[-3.19, 55.95], [-3.185, 55.951], [-3.18, 55.95]]}
        ]
    }"#;

    #[test]
    fn json_normalises_ids_and_defaults() {
        let net = load_network_json_reader(Cursor::new(NETWORK_JSON), 5.0).unwrap();
        assert_eq!(net.node_count(), 3);
        assert_eq!(net.edge_count(), 3);

        let fwd = net.resolve(EdgeKey::new(1, 2, 0)).unwrap();
        assert_eq!(net.edge_speed_kph(fwd), 12.0);
        assert_eq!(net.edge_segments(fwd), &[SegmentId(100)]);

        let back = net.resolve(EdgeKey::new(2, 1, 0)).unwrap();
        assert_eq!(net.edge_speed_kph(back), 5.0);
        assert_eq!(net.edge_segments(back), &[SegmentId(100), SegmentId(101)]);

        let keyed = net.resolve(EdgeKey::new(2, 3, 2)).unwrap();
        assert!(net.edge_segments(keyed).is_empty());
        assert_eq!(net.edge_geometry(keyed).unwrap().0.len(), 3);

        let idx = SegmentIndex::build(&net);
        assert_eq!(idx.lookup(SegmentId(101)).len(), 2);
    }

    #[test]
    fn json_dangling_reference_fails_load() {
        let json = r#"{"nodes": [{"id": 1, "lon": 0, "lat": 0}],
                       "edges": [{"from": 1, "to": 2, "length_m": 10}]}"#;
        let err = load_network_json_reader(Cursor::new(json), 5.0).unwrap_err();
        assert!(matches!(err, NetworkError::MalformedNetwork(_)));
    }

    #[test]
    fn json_syntax_error_is_parse() {
        let err = load_network_json_reader(Cursor::new("{nodes:"), 5.0).unwrap_err();
        assert!(matches!(err, NetworkError::Parse(_)));
    }

    const NODES_CSV: &str = "\
id,lon,lat
1,-3.20,55.95
2,-3.19,55.95
3,-3.18,55.95
";

    const EDGES_CSV: &str = "\
from,to,key,length_m,speed_kph,external_ids,geometry
1,2,0,625.0,15,100;101,\"LINESTRING (-3.20 55.95, -3.195 55.951, -3.19 55.95)\"
2,1,,625.0,,\"[100, 101]\",
2,3,0,625.0,20,200,
";

    #[test]
    fn csv_parses_ids_and_wkt() {
        let net = load_network_csv_readers(Cursor::new(NODES_CSV), Cursor::new(EDGES_CSV), 5.0).unwrap();
        assert_eq!(net.edge_count(), 3);

        let e = net.resolve(EdgeKey::new(1, 2, 0)).unwrap();
        assert_eq!(net.edge_segments(e), &[SegmentId(100), SegmentId(101)]);
        assert_eq!(net.edge_geometry(e).unwrap().0.len(), 3);

        let back = net.resolve(EdgeKey::new(2, 1, 0)).unwrap();
        assert_eq!(net.edge_speed_kph(back), 5.0);
        assert_eq!(net.edge_segments(back), &[SegmentId(100), SegmentId(101)]);
    }

    #[test]
    fn csv_from_files() {
        let mut nodes = tempfile::NamedTempFile::new().unwrap();
        nodes.write_all(NODES_CSV.as_bytes()).unwrap();
        let mut edges = tempfile::NamedTempFile::new().unwrap();
        edges.write_all(EDGES_CSV.as_bytes()).unwrap();
        let net = load_network_csv(nodes.path(), edges.path(), 5.0).unwrap();
        assert_eq!(net.node_count(), 3);
    }

    #[test]
    fn csv_missing_file_is_io() {
        let err = load_network_csv(
            std::path::Path::new("/nonexistent/nodes.csv"),
            std::path::Path::new("/nonexistent/edges.csv"),
            5.0,
        )
        .unwrap_err();
        assert!(matches!(err, NetworkError::Io(_)));
    }

    #[test]
    fn csv_bad_wkt_is_parse() {
        let edges = "from,to,key,length_m,speed_kph,external_ids,geometry\n1,2,0,1,1,,NOT WKT\n";
        let err = load_network_csv_readers(Cursor::new(NODES_CSV), Cursor::new(edges), 5.0).unwrap_err();
        assert!(matches!(err, NetworkError::Parse(_)));
    }

    #[test]
    fn external_id_forms() {
        assert_eq!(parse_external_ids("").unwrap(), Vec::<i64>::new());
        assert_eq!(parse_external_ids(" 7 ").unwrap(), vec![7]);
        assert_eq!(parse_external_ids("7;8").unwrap(), vec![7, 8]);
        assert_eq!(parse_external_ids("[7, 8]").unwrap(), vec![7, 8]);
        assert_eq!(parse_external_ids("[]").unwrap(), Vec::<i64>::new());
        assert!(matches!(parse_external_ids("7;x"), Err(NetworkError::Parse(_))));
    }
}
