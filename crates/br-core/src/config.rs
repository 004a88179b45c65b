//! Process-wide routing configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Baseline cycling speed the boost formula is expressed against.
pub const DEFAULT_REFERENCE_SPEED_KPH: f64 = 5.0;

/// Boost multiplier applied when a request does not supply one.
pub const DEFAULT_BOOST: f64 = 2.0;

/// Speed assigned to ingested edges that carry no speed attribute.
pub const DEFAULT_FALLBACK_SPEED_KPH: f64 = 5.0;

/// Shortest-path search algorithm.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchStrategy {
    /// Plain label-setting Dijkstra.
    #[default]
    Dijkstra,
    /// A* with a great-circle / maximum-speed lower bound.
    AStar,
}

/// Routing configuration, typically loaded once at start-up from JSON.
///
/// Every field has a default, so `{}` is a valid configuration file.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Baseline speed (km/h) that boosted edges are scaled from.  Independent
    /// of the per-edge stored speed so a boost has the same magnitude on
    /// every preferred segment.
    pub reference_speed_kph: f64,

    /// Multiplier used when a request omits `boost_multiplier`.
    pub default_boost: f64,

    /// Speed (km/h) for ingested edges that have none.
    pub fallback_speed_kph: f64,

    pub strategy: SearchStrategy,

    /// Abort a search after settling this many nodes.  `None` = unbounded.
    pub max_settled_nodes: Option<usize>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            reference_speed_kph: DEFAULT_REFERENCE_SPEED_KPH,
            default_boost:       DEFAULT_BOOST,
            fallback_speed_kph:  DEFAULT_FALLBACK_SPEED_KPH,
            strategy:            SearchStrategy::Dijkstra,
            max_settled_nodes:   None,
        }
    }
}

impl RouterConfig {
    /// Parse and validate a JSON configuration string.
    pub fn from_json_str(s: &str) -> CoreResult<Self> {
        let config: RouterConfig = serde_json::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a JSON configuration file.
    pub fn from_json_file(path: &Path) -> CoreResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    pub fn validate(&self) -> CoreResult<()> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(CoreError::Config(format!("{name} must be a positive finite number, got {v}")))
            }
        };
        positive("reference_speed_kph", self.reference_speed_kph)?;
        positive("default_boost", self.default_boost)?;
        positive("fallback_speed_kph", self.fallback_speed_kph)?;
        if self.max_settled_nodes == Some(0) {
            return Err(CoreError::Config("max_settled_nodes must be at least 1".into()));
        }
        Ok(())
    }
}
