//! `br-routing`: preferred-segment routing over a shared road network.
//!
//! # Crate layout
//!
//! | Module       | Contents                                                      |
//! |--------------|---------------------------------------------------------------|
//! | [`weights`]  | `EdgeWeights` trait, `BaseWeights`, per-request `BoostedWeights` |
//! | [`search`]   | `PathFinder` (Dijkstra / A*), `Path`                          |
//! | [`assemble`] | `RouteAssembler`, `RouteResult`                               |
//! | [`service`]  | `RoutingGraph`, `RoutingService`, `RouteRequest`, `RouteOutcome` |
//! | [`response`] | `RouteResponse` (GeoJSON body)                                |
//! | [`error`]    | `RoutingError`, `RoutingResult<T>`                            |
//!
//! # Example
//!
//! ```
//! use br_core::{GeoPoint, RouterConfig};
//! use br_network::{EdgeSpec, RoadNetworkBuilder};
//! use br_routing::{RouteRequest, RoutingGraph, RoutingService};
//!
//! let mut b = RoadNetworkBuilder::new();
//! b.add_node(1, GeoPoint::new(-3.19, 55.95));
//! b.add_node(2, GeoPoint::new(-3.18, 55.95));
//! b.add_road(EdgeSpec::new(1, 2, 625.0, 15.0).segments([42]));
//! let graph = RoutingGraph::build(b.build().unwrap()).unwrap();
//!
//! let service = RoutingService::new(RouterConfig::default(), graph).unwrap();
//! let request = RouteRequest::new((-3.19, 55.95), (-3.18, 55.95)).with_preferred([42]);
//! let outcome = service.route(&request).unwrap();
//! assert_eq!(outcome.route().unwrap().travel_time_s, 150.0);
//! ```

pub mod assemble;
pub mod error;
pub mod response;
pub mod search;
pub mod service;
pub mod weights;


pub use assemble::{RouteAssembler, RouteResult};
pub use error::{RoutingError, RoutingResult};
pub use response::RouteResponse;
pub use search::{Path, PathFinder};
pub use service::{RouteOutcome, RouteRequest, RoutingGraph, RoutingService, route_on};
pub use weights::{BaseWeights, BoostedWeights, EdgeWeights};
