//! Network-subsystem error type.

use thiserror::Error;

use br_core::{GeoPoint, OsmNodeId};

/// Errors produced by `br-network`.
#[derive(Debug, Error)]
pub enum NetworkError {
    /// Structural problem found while building a network.  Fatal to a load
    /// or reload; no partially built network is ever returned.
    #[error("malformed network: {0}")]
    MalformedNetwork(String),

    #[error("edge ({from}, {to}, {key}) not found")]
    NotFound { from: OsmNodeId, to: OsmNodeId, key: u32 },

    #[error("node {0} not found in network")]
    NodeNotFound(OsmNodeId),

    #[error("invalid speed {speed_kph} km/h: speed must be positive and finite")]
    InvalidSpeed { speed_kph: f64 },

    #[error("spatial query against a network with no nodes")]
    EmptyIndex,

    #[error("invalid query coordinate {0}")]
    InvalidCoordinate(GeoPoint),

    #[error("network parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type NetworkResult<T> = Result<T, NetworkError>;
