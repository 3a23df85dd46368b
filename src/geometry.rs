//! # Spherical geometry primitives
//!
//! All sky comparisons in this crate go through the helpers of this module:
//!
//! * [`SkyPosition`] – a right ascension (hours) / declination (degrees) pair and its
//!   unit-sphere Cartesian vector.
//! * [`angle_between`] – great-circle separation between two (not necessarily unit) vectors.
//! * [`periodic_distance`] / [`angle_distance`] – circular differences for longitude-like
//!   quantities (angles modulo 2π, perihelion times modulo a period).
//! * [`ra_offset`] – signed right-ascension offset across the 24h seam.
//! * [`closest_approach_on_arc`] – minimum angular distance between a point and a
//!   great-circle arc, computed in unit-sphere Cartesian coordinates.
//! * [`SkyPosition::from_unfolded`] – folds a declination that ran past a pole back into range.
//!
//! Units
//! -----------------
//! * Right ascension in **hours** `[0, 24)`, declination and separations in **degrees**.
//! * Orbital angles in **radians**.
//!
//! Separations are evaluated as `atan2(|u×v|, u·v)`, which stays accurate for both tiny and
//! near-antipodal separations, and never by subtracting coordinates.
use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::constants::{Degree, Hour, ARC_EPS, DPI, HOURS_PER_TURN, RADEG, RADH};

/// A position on the celestial sphere.
///
/// Fields
/// -----------------
/// * `ra` – right ascension in hours, `[0, 24)`.
/// * `dec` – declination in degrees, `[-90, 90]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkyPosition {
    pub ra: Hour,
    pub dec: Degree,
}

impl SkyPosition {
    /// Build a sky position, wrapping the right ascension into `[0, 24)`.
    pub fn new(ra: Hour, dec: Degree) -> Self {
        SkyPosition {
            ra: ra.rem_euclid(HOURS_PER_TURN),
            dec,
        }
    }

    /// Unit vector of this position in the equatorial Cartesian frame.
    pub fn to_unit_vector(&self) -> Vector3<f64> {
        radec_to_vector(self.ra, self.dec)
    }

    /// Build a sky position from coordinates whose declination may have run past a pole.
    ///
    /// A declination of `90° + x` is the point `90° − x` on the opposite meridian, so the
    /// declination is folded back into `[-90°, 90°]` and the right ascension turned by 12h.
    pub fn from_unfolded(ra: Hour, dec: Degree) -> Self {
        let dec = (dec + 180.0).rem_euclid(360.0) - 180.0;
        if dec > 90.0 {
            SkyPosition::new(ra + HOURS_PER_TURN / 2.0, 180.0 - dec)
        } else if dec < -90.0 {
            SkyPosition::new(ra + HOURS_PER_TURN / 2.0, -180.0 - dec)
        } else {
            SkyPosition::new(ra, dec)
        }
    }

    /// Convert a Cartesian direction back to a sky position.
    ///
    /// The vector does not need to be normalized. A zero vector maps to `(0h, 0°)`, and a
    /// vector along the pole axis gets a right ascension of `0h`.
    pub fn from_unit_vector(v: &Vector3<f64>) -> Self {
        let norm = v.norm();
        if norm == 0.0 {
            return SkyPosition { ra: 0.0, dec: 0.0 };
        }

        let delta = (v.z / norm).clamp(-1.0, 1.0).asin();
        let rho = v.x.hypot(v.y);
        if rho == 0.0 {
            return SkyPosition {
                ra: 0.0,
                dec: delta / RADEG,
            };
        }

        let alpha = v.y.atan2(v.x);
        let alpha = if alpha < 0.0 { alpha + DPI } else { alpha };
        SkyPosition {
            ra: (alpha / RADH).rem_euclid(HOURS_PER_TURN),
            dec: delta / RADEG,
        }
    }

    /// Great-circle distance to another sky position, in degrees.
    pub fn angular_distance(&self, other: &SkyPosition) -> Degree {
        angle_between(&self.to_unit_vector(), &other.to_unit_vector())
    }

    /// Whether the coordinates are finite and the declination is within `[-90, 90]`.
    pub fn is_valid(&self) -> bool {
        self.ra.is_finite() && self.dec.is_finite() && self.dec.abs() <= 90.0
    }
}

/// Angle between two vectors, in degrees.
///
/// Neither vector needs to be normalized; a zero vector yields `0°`.
#[inline]
pub fn angle_between(u: &Vector3<f64>, v: &Vector3<f64>) -> Degree {
    u.cross(v).norm().atan2(u.dot(v)) / RADEG
}

/// Circular distance between two values of a quantity that wraps every `period`.
///
/// Return
/// ----------
/// * The distance folded into `[0, period / 2]`.
#[inline]
pub fn periodic_distance(a: f64, b: f64, period: f64) -> f64 {
    let d = (a - b).rem_euclid(period);
    if d > period / 2.0 {
        period - d
    } else {
        d
    }
}

/// Circular distance between two angles in radians, folded into `[0, π]`.
#[inline]
pub fn angle_distance(a: f64, b: f64) -> f64 {
    periodic_distance(a, b, DPI)
}

/// Signed right-ascension offset `ra − reference`, wrapped into `[-12h, 12h)`.
#[inline]
pub fn ra_offset(ra: Hour, reference: Hour) -> Hour {
    (ra - reference + HOURS_PER_TURN / 2.0).rem_euclid(HOURS_PER_TURN) - HOURS_PER_TURN / 2.0
}

/// Minimum angular distance between the direction `c` and the minor great-circle arc joining
/// the directions `p0` and `p1`.
///
/// The point is projected onto the plane of the arc's great circle; when the projection falls
/// between the arc endpoints the distance is the angle between `c` and that plane, otherwise
/// the nearer endpoint wins.
///
/// Arguments
/// -----------------
/// * `c` – query direction (any non-zero length).
/// * `p0`, `p1` – arc endpoints (any non-zero length).
///
/// Return
/// ----------
/// * The closest-approach distance in degrees.
///
/// Degenerate arcs
/// ----------
/// * Coincident endpoints (`|p0 × p1| ≈ 0`, `p0·p1 > 0`) reduce to a point distance.
/// * Antipodal endpoints do not define a unique arc; the function returns `0°` so that
///   callers never prune on them.
pub fn closest_approach_on_arc(c: &Vector3<f64>, p0: &Vector3<f64>, p1: &Vector3<f64>) -> Degree {
    let endpoint = angle_between(c, p0).min(angle_between(c, p1));

    let n = p0.cross(p1);
    let n_norm = n.norm();
    if n_norm <= ARC_EPS * p0.norm() * p1.norm() {
        return if p0.dot(p1) > 0.0 { endpoint } else { 0.0 };
    }
    let n_hat = n / n_norm;

    let off_plane = c.dot(&n_hat);
    let projected = c - n_hat * off_plane;
    let inside = p0.cross(&projected).dot(&n_hat) >= 0.0 && projected.cross(p1).dot(&n_hat) >= 0.0;
    if inside {
        let to_plane = off_plane.abs().atan2(projected.norm()) / RADEG;
        to_plane.min(endpoint)
    } else {
        endpoint
    }
}

/// Unit vector of the coordinates `(ra, dec)`.
///
/// The declination may lie outside `[-90°, 90°]`, as happens when a coordinate-linear path is
/// extrapolated over a pole; the formula then keeps following the same meridian plane.
#[inline]
pub(crate) fn radec_to_vector(ra: Hour, dec: Degree) -> Vector3<f64> {
    let alpha = ra * RADH;
    let delta = dec * RADEG;
    let cos_delta = delta.cos();
    Vector3::new(
        cos_delta * alpha.cos(),
        cos_delta * alpha.sin(),
        delta.sin(),
    )
}

/// Largest `|cos(dec)|` over the declination interval `[lo, hi]` (degrees, any range).
pub(crate) fn max_abs_cos(lo: Degree, hi: Degree) -> f64 {
    if hi - lo >= 180.0 || (lo / 180.0).ceil() * 180.0 <= hi {
        return 1.0;
    }
    (lo * RADEG).cos().abs().max((hi * RADEG).cos().abs())
}

/// Largest angular distance (degrees) from the minor arc `AB` of any point `P` with
/// `d(A, P) + d(P, B) <= length`, where `chord = d(A, B)`.
///
/// Such points fill a spherical ellipse with foci `A` and `B`; the farthest one sits above
/// the arc midpoint, where `cos(h) = cos(length/2) / cos(chord/2)`. The identity
/// `sin²h = sin((length − chord)/2) · sin((length + chord)/2) / cos²(chord/2)` is used to
/// keep the result accurate for nearly straight paths.
///
/// Return
/// ----------
/// * The bound `h`, or `None` when `length` reaches 90° and the ellipse argument does not
///   apply.
pub(crate) fn arc_deviation_bound(length: Degree, chord: Degree) -> Option<Degree> {
    if length >= 90.0 {
        return None;
    }
    let excess = ((length - chord).max(0.0) / 2.0 * RADEG).sin();
    let sum = ((length + chord) / 2.0 * RADEG).sin();
    let half_chord = (chord / 2.0 * RADEG).cos();
    let sin_h = ((excess * sum).max(0.0).sqrt() / half_chord).min(1.0);
    Some(sin_h.asin() / RADEG)
}
