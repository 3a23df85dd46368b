//! # Orbits and their search dimensions
//!
//! An [`Orbit`] is a perihelion-based (cometary) element set `(q, e, i, ω, Ω, t0)` together
//! with its epoch, equinox and the mean motion derived from `(q, e)`.
//!
//! Search dimensions
//! -----------------
//! The orbital tree and the orbit match test work on six dimensions, always in the order of
//! [`OrbitElement::ALL`]:
//!
//! | index | element | kind |
//! |---|---|---|
//! | 0 | perihelion distance `q` (AU) | linear |
//! | 1 | eccentricity `e` | linear |
//! | 2 | argument of perihelion `ω` (rad) | angle, wraps at 2π |
//! | 3 | longitude of ascending node `Ω` (rad) | angle, wraps at 2π |
//! | 4 | inclination `i` (rad) | angle, wraps at 2π |
//! | 5 | perihelion time `t0` (MJD) | periodic modulo the orbital period |
//!
//! Thresholds per dimension are carried by [`OrbitThresholds`]; an entry `≤ 1e-10`
//! (including any negative value) disables its dimension.
use std::{fmt, ops::Index};

use serde::{Deserialize, Serialize};

use crate::constants::{ObjectNumber, Radian, DPI, GAUSS_GRAV, IGNORE_THRESHOLD, MJD};

/// Number of orbital search dimensions.
pub const ORBIT_DIMS: usize = 6;

/// One orbital search dimension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrbitElement {
    PerihelionDistance,
    Eccentricity,
    PeriapsisArgument,
    AscendingNode,
    Inclination,
    PerihelionTime,
}

impl OrbitElement {
    /// All dimensions, in vector order.
    pub const ALL: [OrbitElement; ORBIT_DIMS] = [
        OrbitElement::PerihelionDistance,
        OrbitElement::Eccentricity,
        OrbitElement::PeriapsisArgument,
        OrbitElement::AscendingNode,
        OrbitElement::Inclination,
        OrbitElement::PerihelionTime,
    ];

    /// Position of the dimension in element vectors.
    pub fn index(self) -> usize {
        match self {
            OrbitElement::PerihelionDistance => 0,
            OrbitElement::Eccentricity => 1,
            OrbitElement::PeriapsisArgument => 2,
            OrbitElement::AscendingNode => 3,
            OrbitElement::Inclination => 4,
            OrbitElement::PerihelionTime => 5,
        }
    }

    /// Angle-like dimensions wrap at 2π when compared.
    pub fn is_angle(self) -> bool {
        matches!(
            self,
            OrbitElement::PeriapsisArgument
                | OrbitElement::AscendingNode
                | OrbitElement::Inclination
        )
    }
}

/// Cometary orbit record.
///
/// Units
/// -----
/// * `perihelion_distance`: AU.
/// * `inclination`, `periapsis_argument`, `ascending_node_longitude`: radians.
/// * `perihelion_time`, `epoch`: MJD.
/// * `equinox`: Julian year of the reference equinox (e.g. `2000.0`).
/// * `mean_motion`: radians per day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Orbit {
    pub id: ObjectNumber,
    pub perihelion_distance: f64,
    pub eccentricity: f64,
    pub inclination: Radian,
    pub periapsis_argument: Radian,
    pub ascending_node_longitude: Radian,
    pub perihelion_time: MJD,
    pub epoch: MJD,
    pub equinox: f64,
    pub mean_motion: f64,
}

impl Orbit {
    /// Create an orbit referred to the J2000 equinox; the mean motion is derived from `(q, e)`.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<ObjectNumber>,
        perihelion_distance: f64,
        eccentricity: f64,
        inclination: Radian,
        periapsis_argument: Radian,
        ascending_node_longitude: Radian,
        perihelion_time: MJD,
        epoch: MJD,
    ) -> Self {
        Orbit {
            id: id.into(),
            perihelion_distance,
            eccentricity,
            inclination,
            periapsis_argument,
            ascending_node_longitude,
            perihelion_time,
            epoch,
            equinox: 2000.0,
            mean_motion: Orbit::compute_mean_motion(perihelion_distance, eccentricity),
        }
    }

    /// Replace the reference equinox.
    pub fn with_equinox(mut self, equinox: f64) -> Self {
        self.equinox = equinox;
        self
    }

    /// Mean motion `k / a^{3/2}` (rad/day) with `a = q / |1 − e|`, or `a = q` for a parabola.
    pub fn compute_mean_motion(perihelion_distance: f64, eccentricity: f64) -> f64 {
        let one_minus_e = (1.0 - eccentricity).abs();
        let a = if one_minus_e < 1e-12 {
            perihelion_distance
        } else {
            perihelion_distance / one_minus_e
        };
        GAUSS_GRAV / a.powf(1.5)
    }

    /// Semi-major axis (AU) of an elliptic orbit.
    pub fn semi_major_axis(&self) -> Option<f64> {
        (self.eccentricity < 1.0).then(|| self.perihelion_distance / (1.0 - self.eccentricity))
    }

    /// Orbital period in days, `None` for parabolic and hyperbolic orbits.
    pub fn period(&self) -> Option<f64> {
        (self.eccentricity < 1.0 && self.mean_motion > 0.0).then(|| DPI / self.mean_motion)
    }

    /// Mean anomaly at `t` (rad, `[0, 2π)`), only defined for elliptic orbits.
    pub fn mean_anomaly_at(&self, t: MJD) -> Option<Radian> {
        self.period()
            .map(|_| (self.mean_motion * (t - self.perihelion_time)).rem_euclid(DPI))
    }

    /// Value of one search dimension.
    pub fn element(&self, dim: OrbitElement) -> f64 {
        match dim {
            OrbitElement::PerihelionDistance => self.perihelion_distance,
            OrbitElement::Eccentricity => self.eccentricity,
            OrbitElement::PeriapsisArgument => self.periapsis_argument,
            OrbitElement::AscendingNode => self.ascending_node_longitude,
            OrbitElement::Inclination => self.inclination,
            OrbitElement::PerihelionTime => self.perihelion_time,
        }
    }

    /// All search dimensions, in [`OrbitElement::ALL`] order.
    pub fn elements(&self) -> [f64; ORBIT_DIMS] {
        OrbitElement::ALL.map(|dim| self.element(dim))
    }

    /// Whether the record can be indexed: finite elements, `q > 0` and `e ≥ 0`.
    pub fn is_valid(&self) -> bool {
        self.elements().iter().all(|x| x.is_finite())
            && self.perihelion_distance > 0.0
            && self.eccentricity >= 0.0
            && self.mean_motion.is_finite()
    }
}

impl fmt::Display for Orbit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rad_to_deg = 180.0 / std::f64::consts::PI;
        writeln!(
            f,
            "Orbit {} @ epoch (MJD): {:.6}, equinox J{:.1}",
            self.id, self.epoch, self.equinox
        )?;
        writeln!(f, "------------------------------------------------")?;
        writeln!(
            f,
            "  q   (perihelion distance)     = {:.6} AU",
            self.perihelion_distance
        )?;
        writeln!(
            f,
            "  e   (eccentricity)            = {:.6}",
            self.eccentricity
        )?;
        writeln!(
            f,
            "  i   (inclination)             = {:.6} rad ({:.6}°)",
            self.inclination,
            self.inclination * rad_to_deg
        )?;
        writeln!(
            f,
            "  Ω   (longitude of node)       = {:.6} rad ({:.6}°)",
            self.ascending_node_longitude,
            self.ascending_node_longitude * rad_to_deg
        )?;
        writeln!(
            f,
            "  ω   (argument of perihelion)  = {:.6} rad ({:.6}°)",
            self.periapsis_argument,
            self.periapsis_argument * rad_to_deg
        )?;
        write!(
            f,
            "  t0  (perihelion time)         = {:.6} MJD",
            self.perihelion_time
        )
    }
}

/// Per-dimension match thresholds for orbit searches.
///
/// Units follow [`Orbit`]: AU for `q`, radians for the angles, days for `t0`. The default
/// value disables every dimension.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct OrbitThresholds(pub [f64; ORBIT_DIMS]);

impl OrbitThresholds {
    pub fn new(values: [f64; ORBIT_DIMS]) -> Self {
        OrbitThresholds(values)
    }

    /// Set the threshold of one dimension.
    pub fn with(mut self, dim: OrbitElement, value: f64) -> Self {
        self.0[dim.index()] = value;
        self
    }

    /// Whether the dimension takes part in matching.
    #[inline]
    pub fn is_active(&self, dim: OrbitElement) -> bool {
        self.0[dim.index()] > IGNORE_THRESHOLD
    }
}

impl Index<OrbitElement> for OrbitThresholds {
    type Output = f64;

    fn index(&self, dim: OrbitElement) -> &f64 {
        &self.0[dim.index()]
    }
}
