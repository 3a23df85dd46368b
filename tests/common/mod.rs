#![allow(dead_code)]

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skymatch::{Orbit, Region, Trajectory, TrajectoryTreeParams};

pub const KNOT_TIMES: [f64; 4] = [60000.0, 60002.0, 60005.0, 60010.0];

pub fn seeded(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Declination drawn uniformly on the sphere, in degrees.
fn random_dec(rng: &mut StdRng) -> f64 {
    rng.random_range(-1.0f64..1.0).asin().to_degrees()
}

/// Plates spread over the whole sky and over `[t_lo, t_hi]`; one in ten has a zero radius.
pub fn random_regions(rng: &mut StdRng, n: usize, t_lo: f64, t_hi: f64) -> Vec<Region> {
    (0..n)
        .map(|k| {
            let radius = if rng.random_bool(0.1) {
                0.0
            } else {
                rng.random_range(0.1..2.0)
            };
            Region::new(
                k as u32,
                rng.random_range(t_lo..=t_hi),
                rng.random_range(0.0..24.0),
                random_dec(rng),
                radius,
            )
        })
        .collect()
}

/// Trajectories sharing `knot_times`, each drifting at a constant random rate from a random
/// start (up to 0.05 h/day in RA, 0.5 deg/day in DEC), with declination kept off the poles.
pub fn random_trajectories(rng: &mut StdRng, n: usize, knot_times: &[f64]) -> Vec<Trajectory> {
    (0..n)
        .map(|_| {
            let (ra0, dec0) = (rng.random_range(0.0..24.0), random_dec(rng));
            let (dra, ddec) = (rng.random_range(-0.05..0.05), rng.random_range(-0.5..0.5));
            let t0 = knot_times[0];
            Trajectory::from_knots(knot_times.iter().map(|&t| {
                let dt = t - t0;
                (t, ra0 + dra * dt, (dec0 + ddec * dt).clamp(-89.0, 89.0))
            }))
            .expect("drifting trajectory is well formed")
        })
        .collect()
}

/// Trajectory tree settings covering both split policies and a window narrower than the grid.
pub fn params_variants() -> Vec<TrajectoryTreeParams> {
    vec![
        TrajectoryTreeParams::default(),
        TrajectoryTreeParams::builder().leaf_size(1).build().unwrap(),
        TrajectoryTreeParams::builder()
            .leaf_size(3)
            .split_all(true)
            .build()
            .unwrap(),
        TrajectoryTreeParams::builder()
            .leaf_size(2)
            .time_window(60001.0, 60004.0)
            .build()
            .unwrap(),
    ]
}

/// Plates centred near the predicted positions of random trajectories at random epochs within
/// the knot span, so that searches find a realistic number of matches.
pub fn regions_along(
    rng: &mut StdRng,
    trajectories: &[Trajectory],
    n: usize,
    jitter: f64,
) -> Vec<Region> {
    let (t_lo, t_hi) = (KNOT_TIMES[0], KNOT_TIMES[KNOT_TIMES.len() - 1]);
    regions_along_between(rng, trajectories, n, jitter, t_lo, t_hi)
}

/// [`regions_along`] with plate epochs drawn from `[t_lo, t_hi]`, which may reach past the
/// knots.
pub fn regions_along_between(
    rng: &mut StdRng,
    trajectories: &[Trajectory],
    n: usize,
    jitter: f64,
    t_lo: f64,
    t_hi: f64,
) -> Vec<Region> {
    (0..n)
        .map(|k| {
            let traj = &trajectories[rng.random_range(0..trajectories.len())];
            let t = rng.random_range(t_lo..=t_hi);
            let p = traj.predict(t);
            let dec = (p.dec + rng.random_range(-jitter..=jitter)).clamp(-90.0, 90.0);
            let ra = p.ra + rng.random_range(-jitter..=jitter) / 15.0;
            Region::new(k as u32, t, ra, dec, rng.random_range(0.0..1.0))
        })
        .collect()
}

/// Elliptic orbits in a main-belt-like box, perihelion times over about four years.
pub fn random_orbits(rng: &mut StdRng, n: usize) -> Vec<Orbit> {
    let tau = std::f64::consts::TAU;
    (0..n)
        .map(|k| {
            Orbit::new(
                k as u32,
                rng.random_range(1.5..3.5),
                rng.random_range(0.0..0.4),
                rng.random_range(0.0..0.5),
                rng.random_range(0.0..tau),
                rng.random_range(0.0..tau),
                rng.random_range(58500.0..60000.0),
                60000.0,
            )
        })
        .collect()
}

/// Number of drivers matching each target.
pub fn per_target_counts(lists: &[Vec<usize>], n_targets: usize) -> Vec<usize> {
    let mut counts = vec![0; n_targets];
    for list in lists {
        for &j in list {
            counts[j] += 1;
        }
    }
    counts
}
