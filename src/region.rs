//! # Plates (sky regions)
//!
//! A [`Region`] is a circular field of view valid at a single instant: a photographic
//! plate, a CCD exposure footprint, or any other "where did we look, and when" record.
//! Regions are plain immutable records owned by the caller; trees only borrow them.
use serde::{Deserialize, Serialize};

use crate::{
    constants::{Degree, Hour, ObjectNumber, MJD},
    geometry::SkyPosition,
};

/// A sky disc observed at one epoch.
///
/// Units
/// -----
/// * `time`: MJD.
/// * `center.ra`: hours, `center.dec`: degrees.
/// * `radius`: degrees (angular radius of the field).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: ObjectNumber,
    pub time: MJD,
    pub center: SkyPosition,
    pub radius: Degree,
}

impl Region {
    /// Create a region; the right ascension is wrapped into `[0, 24)`.
    pub fn new(id: impl Into<ObjectNumber>, time: MJD, ra: Hour, dec: Degree, radius: Degree) -> Self {
        Region {
            id: id.into(),
            time,
            center: SkyPosition::new(ra, dec),
            radius,
        }
    }

    /// Whether the record can be indexed: finite values, `|dec| ≤ 90` and `radius ≥ 0`.
    pub fn is_valid(&self) -> bool {
        self.time.is_finite()
            && self.center.is_valid()
            && self.radius.is_finite()
            && self.radius >= 0.0
    }

    /// Whether `position` lies within `threshold` degrees of the region's disc.
    pub fn contains(&self, position: &SkyPosition, threshold: Degree) -> bool {
        self.center.angular_distance(position) <= self.radius + threshold
    }
}
