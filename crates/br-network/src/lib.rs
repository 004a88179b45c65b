//! `br-network`: road network, segment-id index, and spatial snapping.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                 |
//! |-------------------|----------------------------------------------------------|
//! | [`network`]       | `RoadNetwork` (CSR multigraph), `RoadNetworkBuilder`, `EdgeSpec` |
//! | [`segment_index`] | `SegmentIndex` (segment id → directed edges, both ways)  |
//! | [`spatial`]       | `SpatialIndex` (R-tree nearest node, great-circle order) |
//! | [`loader`]        | JSON and CSV network loaders                             |
//! | [`error`]         | `NetworkError`, `NetworkResult<T>`                       |
//!
//! All three structures are built once and are read-only afterwards; share
//! them between threads behind an `Arc` without further locking.

pub mod error;
pub mod loader;
pub mod network;
pub mod segment_index;
pub mod spatial;

#[cfg(test)]
mod tests;

pub use error::{NetworkError, NetworkResult};
pub use loader::{
    ExternalIds, EdgeRecord, NetworkData, NodeRecord, load_network_csv, load_network_csv_readers,
    load_network_json, load_network_json_reader,
};
pub use network::{EdgeSpec, NetworkStats, RoadNetwork, RoadNetworkBuilder, travel_time_s};
pub use segment_index::SegmentIndex;
pub use spatial::SpatialIndex;
