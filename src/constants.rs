//! # Constants and type definitions for skymatch
//!
//! This module centralizes the **unit conversions**, **numerical tolerances** and **common
//! type aliases** used by the trees and the search engine.
//!
//! ## Overview
//!
//! - Unit conversions (hours ↔ degrees ↔ radians)
//! - Gaussian gravitational constant used for the orbit mean motion
//! - Tolerances shared by tree construction and pruning
//! - Unit type aliases and the [`ObjectNumber`] identifier carried by plates and orbits

use serde::{Deserialize, Serialize};

// -------------------------------------------------------------------------------------------------
// Unit conversions
// -------------------------------------------------------------------------------------------------

/// 2π, useful for trigonometric conversions
pub const DPI: f64 = 2. * std::f64::consts::PI;

/// Degrees → radians
pub const RADEG: f64 = std::f64::consts::PI / 180.0;

/// Hours of right ascension → radians
pub const RADH: f64 = DPI / 24.0;

/// Degrees of arc covered by one hour of right ascension
pub const DEG_PER_HOUR: f64 = 15.0;

/// Full turn of right ascension, in hours
pub const HOURS_PER_TURN: f64 = 24.0;

/// Gaussian gravitational constant k (rad/day for a semi-major axis in AU)
pub const GAUSS_GRAV: f64 = 0.01720209895;

// -------------------------------------------------------------------------------------------------
// Numerical tolerances
// -------------------------------------------------------------------------------------------------

/// Below this combined weighted spread a node is not worth splitting.
pub const SPREAD_EPS: f64 = 1e-10;

/// Slack added to every pruning test so rounding can never drop a boundary match.
pub const PRUNE_EPS: f64 = 1e-9;

/// Orbit thresholds at or below this value disable their dimension.
pub const IGNORE_THRESHOLD: f64 = 1e-10;

/// Norm under which a cross product is treated as degenerate (coincident or antipodal vectors).
pub const ARC_EPS: f64 = 1e-12;

/// Longest path piece (degrees) bounded in one go by a trajectory closest-approach estimate.
pub const MAX_PIECE_ARC: f64 = 2.0;

/// Cap on the pieces one trajectory segment is cut into.
pub const MAX_PIECE_SPLITS: usize = 16;

// -------------------------------------------------------------------------------------------------
// Type aliases
// -------------------------------------------------------------------------------------------------

/// Angle in degrees
pub type Degree = f64;
/// Angle in radians
pub type Radian = f64;
/// Right ascension in hours
pub type Hour = f64;
/// Modified Julian Date (days)
pub type MJD = f64;

// -------------------------------------------------------------------------------------------------
// Identifiers
// -------------------------------------------------------------------------------------------------

/// Identifier of a plate or of an orbit.
///
/// This can be:
/// - A numeric identifier (e.g. a plate exposure number or an asteroid number)
/// - A string designation (e.g. `"K25D50B"` or a survey field name)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectNumber {
    /// Integer-based identifier
    Int(u32),
    /// String-based designation
    String(String),
}

impl std::fmt::Display for ObjectNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ObjectNumber::Int(n) => write!(f, "{n}"),
            ObjectNumber::String(s) => write!(f, "{s}"),
        }
    }
}

impl From<u32> for ObjectNumber {
    fn from(n: u32) -> Self {
        ObjectNumber::Int(n)
    }
}

impl From<String> for ObjectNumber {
    fn from(s: String) -> Self {
        ObjectNumber::String(s)
    }
}

impl From<&str> for ObjectNumber {
    fn from(s: &str) -> Self {
        match s.parse::<u32>() {
            Ok(n) => ObjectNumber::Int(n),
            Err(_) => ObjectNumber::String(s.to_string()),
        }
    }
}
