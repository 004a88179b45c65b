//! JSON response body for a route request.
//!
//! ```json
//! {
//!   "geojson": {"type": "FeatureCollection", "features": [ ... ]},
//!   "distance_meters": 1234.5,
//!   "travel_time_seconds": 296.3
//! }
//! ```
//!
//! A found route is one `LineString` feature.  `NoPath` is an empty feature
//! collection, zero totals, and a `warning`.

use geojson::{Feature, FeatureCollection, Geometry, Value as GeoJsonValue};
use serde::Serialize;
use serde_json::{Map, Value as JsonValue};

use crate::assemble::RouteResult;
use crate::service::RouteOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct RouteResponse {
    pub geojson: FeatureCollection,
    pub distance_meters: f64,
    pub travel_time_seconds: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl RouteResponse {
    pub fn to_json_string(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    fn empty(warning: Option<String>) -> Self {
        Self {
            geojson: feature_collection(Vec::new()),
            distance_meters: 0.0,
            travel_time_seconds: 0.0,
            warning,
        }
    }
}

impl From<&RouteResult> for RouteResponse {
    fn from(route: &RouteResult) -> Self {
        if route.geometry.0.is_empty() {
            return Self::empty(None);
        }

        let mut properties = Map::new();
        properties.insert("edge_count".to_string(), JsonValue::from(route.edges.len()));

        let feature = Feature {
            bbox: None,
            geometry: Some(Geometry::new(GeoJsonValue::from(&route.geometry))),
            id: None,
            properties: Some(properties),
            foreign_members: None,
        };
        Self {
            geojson: feature_collection(vec![feature]),
            distance_meters: route.distance_m,
            travel_time_seconds: route.travel_time_s,
            warning: None,
        }
    }
}

impl From<&RouteOutcome> for RouteResponse {
    fn from(outcome: &RouteOutcome) -> Self {
        match outcome {
            RouteOutcome::Found(route) => route.into(),
            RouteOutcome::NoPath { from, to } => {
                Self::empty(Some(format!("no route found between nodes {from} and {to}")))
            }
        }
    }
}

fn feature_collection(features: Vec<Feature>) -> FeatureCollection {
    FeatureCollection {
        features,
        bbox: None,
        foreign_members: None,
    }
}
