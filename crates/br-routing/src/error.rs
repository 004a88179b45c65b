//! Routing-subsystem error type.

use thiserror::Error;

use br_core::CoreError;
use br_network::NetworkError;

/// Errors produced by `br-routing`.
///
/// An unreachable target is not an error; see
/// [`RouteOutcome::NoPath`](crate::RouteOutcome::NoPath).
#[derive(Debug, Error)]
pub enum RoutingError {
    /// The request itself is unusable (bad coordinates, node outside the
    /// network, path from a different network).
    #[error("malformed request: {0}")]
    MalformedRequest(String),

    /// A boost resolved to a non-positive or non-finite effective speed.
    #[error("invalid speed {speed_kph} km/h: speed must be positive and finite")]
    InvalidSpeed { speed_kph: f64 },

    #[error("search aborted after settling {settled} nodes")]
    SearchLimitExceeded { settled: usize },

    #[error("invalid configuration: {0}")]
    Config(#[from] CoreError),

    #[error(transparent)]
    Network(#[from] NetworkError),
}

pub type RoutingResult<T> = Result<T, RoutingError>;
