//! Strongly typed identifier wrappers.
//!
//! Two families live here:
//!
//! - **Dense indices** (`NodeId`, `EdgeId`) address the network's internal
//!   arrays.  They are assigned at build time and are only meaningful for the
//!   `RoadNetwork` that produced them.
//! - **External ids** (`OsmNodeId`, `SegmentId`) come from the upstream data
//!   source and are what callers see in requests and responses.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Generate a dense index wrapper around a `u32`.
macro_rules! dense_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
        $vis struct $name(pub u32);

        impl $name {
            /// Sentinel meaning "no valid index".
            pub const INVALID: $name = $name(u32::MAX);

            /// Cast to `usize` for direct use as a `Vec` index.
            #[inline(always)]
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::INVALID
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl TryFrom<usize> for $name {
            type Error = std::num::TryFromIntError;
            fn try_from(n: usize) -> Result<$name, Self::Error> {
                u32::try_from(n).map($name)
            }
        }
    };
}

/// Generate an external (source-assigned) id wrapper around an `i64`.
macro_rules! external_id {
    ($(#[$attr:meta])* $vis:vis struct $name:ident;) => {
        $(#[$attr])*
        #[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
        #[serde(transparent)]
        $vis struct $name(pub i64);

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            #[inline(always)]
            fn from(v: i64) -> Self {
                $name(v)
            }
        }
    };
}

dense_id! {
    /// Index of a road-network node.
    pub struct NodeId;
}

dense_id! {
    /// Index of a directed road-network edge.
    pub struct EdgeId;
}

external_id! {
    /// Node identity assigned by the data source (an OSM node id).
    pub struct OsmNodeId;
}

external_id! {
    /// User-facing road segment identifier (an OSM way id).  One segment may
    /// cover several internal edges, in either direction.
    pub struct SegmentId;
}

/// External address of a directed edge: `(from, to, key)`.
///
/// `key` disambiguates parallel edges between the same ordered node pair
/// (divided carriageways, service roads alongside a main road, ...).
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Serialize, Deserialize)]
pub struct EdgeKey {
    pub from: OsmNodeId,
    pub to:   OsmNodeId,
    pub key:  u32,
}

impl EdgeKey {
    pub fn new(from: i64, to: i64, key: u32) -> Self {
        Self { from: OsmNodeId(from), to: OsmNodeId(to), key }
    }

    /// The same key with endpoints swapped.  Says nothing about whether such
    /// an edge exists.
    #[inline]
    pub fn reversed(self) -> Self {
        Self { from: self.to, to: self.from, key: self.key }
    }
}

impl fmt::Display for EdgeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.from, self.to, self.key)
    }
}
