//! `br-core`: foundational types for the `bikeroute` routing engine.
//!
//! # What lives here
//!
//! | Module           | Contents                                             |
//! |------------------|------------------------------------------------------|
//! | [`ids`]          | `NodeId`, `EdgeId`, `OsmNodeId`, `SegmentId`, `EdgeKey` |
//! | [`geo`]          | `GeoPoint`, haversine distance, unit-sphere vectors  |
//! | [`projection`]   | `UtmZone` forward transform and metric line length   |
//! | [`config`]       | `RouterConfig`, `SearchStrategy`                     |
//! | [`error`]        | `CoreError`, `CoreResult`                            |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod projection;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::{RouterConfig, SearchStrategy};
pub use error::{CoreError, CoreResult};
pub use crate::geo::GeoPoint;
pub use ids::{EdgeId, EdgeKey, NodeId, OsmNodeId, SegmentId};
pub use projection::UtmZone;
