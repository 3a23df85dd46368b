//! # Exhaustive matching
//!
//! The match predicates shared by every search, and the quadratic baselines built on them.
//! Tree searches call the same predicates at their leaves, so a tree search and its exhaustive
//! counterpart can only differ through pruning.
//!
//! Predicates
//! -----------------
//! * **trajectory × plate** – the trajectory predicted at the plate epoch lies within
//!   `radius + threshold` degrees of the plate center.
//! * **orbit × orbit** – every active threshold of [`OrbitThresholds`] holds:
//!   `q`, `e` by absolute difference, `ω`, `Ω`, `i` by circular difference in `[0, π]`, and
//!   the perihelion time by [`perihelion_times_match`].
use nalgebra::Vector3;

use crate::{
    constants::Degree,
    geometry::{angle_between, angle_distance},
    orbit::{Orbit, OrbitElement, OrbitThresholds},
    region::Region,
    search::MatchLists,
    trajectory::Trajectory,
};

/// Whether `trajectory` passes within `threshold` degrees of `region`'s disc at the plate epoch.
pub fn trajectory_matches_region(trajectory: &Trajectory, region: &Region, threshold: Degree) -> bool {
    trajectory_hits(trajectory, region, &region.center.to_unit_vector(), threshold)
}

/// [`trajectory_matches_region`] with the plate's unit vector already computed.
#[inline]
pub(crate) fn trajectory_hits(
    trajectory: &Trajectory,
    region: &Region,
    region_vector: &Vector3<f64>,
    threshold: Degree,
) -> bool {
    angle_between(&trajectory.predict_vector(region.time), region_vector) <= region.radius + threshold
}

/// Periodic perihelion-time test.
///
/// With `P` the mean period of the two orbits, the difference `|Δt0|` is split into whole
/// periods `n` and a remainder `r`, the remainder being folded towards the nearer whole period.
/// The orbits match when `r ≤ threshold · (n + 1)`: the tolerance grows with the number of
/// revolutions separating the two perihelion passages.
///
/// When either orbit is not elliptic there is no period and `|Δt0| ≤ threshold` is used.
pub fn perihelion_times_match(a: &Orbit, b: &Orbit, threshold: f64) -> bool {
    let dt = (a.perihelion_time - b.perihelion_time).abs();
    let (Some(pa), Some(pb)) = (a.period(), b.period()) else {
        return dt <= threshold;
    };
    let period = (pa + pb) / 2.0;

    let mut n = (dt / period).floor();
    let mut r = dt - n * period;
    if r > period / 2.0 {
        r = period - r;
        n += 1.0;
    }
    r <= threshold * (n + 1.0)
}

/// Whether two orbits match on every active dimension of `thresholds`.
pub fn orbits_match(a: &Orbit, b: &Orbit, thresholds: &OrbitThresholds) -> bool {
    OrbitElement::ALL
        .iter()
        .filter(|&&dim| thresholds.is_active(dim))
        .all(|&dim| {
            let threshold = thresholds[dim];
            match dim {
                OrbitElement::PerihelionTime => perihelion_times_match(a, b, threshold),
                _ if dim.is_angle() => angle_distance(a.element(dim), b.element(dim)) <= threshold,
                _ => (a.element(dim) - b.element(dim)).abs() <= threshold,
            }
        })
}

/// Every plate matched by `trajectory`, by brute force.
pub fn exhaustive_regions_for_trajectory(
    regions: &[Region],
    trajectory: &Trajectory,
    threshold: Degree,
) -> Vec<usize> {
    regions
        .iter()
        .enumerate()
        .filter(|(_, region)| trajectory_matches_region(trajectory, region, threshold))
        .map(|(i, _)| i)
        .collect()
}

/// Every trajectory passing near `region`, by brute force.
pub fn exhaustive_trajectories_for_region(
    trajectories: &[Trajectory],
    region: &Region,
    threshold: Degree,
) -> Vec<usize> {
    let region_vector = region.center.to_unit_vector();
    trajectories
        .iter()
        .enumerate()
        .filter(|(_, traj)| trajectory_hits(traj, region, &region_vector, threshold))
        .map(|(i, _)| i)
        .collect()
}

/// All trajectory × plate matches, one list per trajectory.
pub fn exhaustive_trajectory_region_pairs(
    trajectories: &[Trajectory],
    regions: &[Region],
    threshold: Degree,
) -> MatchLists {
    let region_vectors: Vec<Vector3<f64>> =
        regions.iter().map(|r| r.center.to_unit_vector()).collect();
    trajectories
        .iter()
        .map(|traj| {
            regions
                .iter()
                .zip(&region_vectors)
                .enumerate()
                .filter(|(_, (region, v))| trajectory_hits(traj, region, v, threshold))
                .map(|(i, _)| i)
                .collect()
        })
        .collect()
}

/// Every orbit of `orbits` matching `query`, by brute force.
pub fn exhaustive_orbits(orbits: &[Orbit], query: &Orbit, thresholds: &OrbitThresholds) -> Vec<usize> {
    orbits
        .iter()
        .enumerate()
        .filter(|(_, orbit)| orbits_match(query, orbit, thresholds))
        .map(|(i, _)| i)
        .collect()
}

/// Matches of every query orbit, one list per query.
pub fn exhaustive_orbit_pairs(
    queries: &[Orbit],
    orbits: &[Orbit],
    thresholds: &OrbitThresholds,
) -> MatchLists {
    queries
        .iter()
        .map(|query| exhaustive_orbits(orbits, query, thresholds))
        .collect()
}
