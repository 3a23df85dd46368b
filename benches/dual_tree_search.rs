use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use skymatch::{
    dual_tree_search, search::exhaustive::exhaustive_trajectory_region_pairs, Region, RegionTree,
    RegionTreeParams, Trajectory, TrajectoryTree, TrajectoryTreeParams,
};

const KNOTS: [f64; 4] = [60000.0, 60002.0, 60005.0, 60010.0];

/// Uniform declination on the sphere, in degrees.
#[inline]
fn rand_dec(rng: &mut StdRng) -> f64 {
    rng.random_range(-1.0f64..1.0).asin().to_degrees()
}

fn make_trajectories(rng: &mut StdRng, n: usize) -> Vec<Trajectory> {
    (0..n)
        .map(|_| {
            let (ra0, dec0) = (rng.random_range(0.0..24.0), rand_dec(rng));
            let (dra, ddec) = (rng.random_range(-0.05..0.05), rng.random_range(-0.5..0.5));
            Trajectory::from_knots(KNOTS.iter().map(|&t| {
                let dt = t - KNOTS[0];
                (t, ra0 + dra * dt, (dec0 + ddec * dt).clamp(-89.0, 89.0))
            }))
            .unwrap()
        })
        .collect()
}

/// Half of the plates sit on trajectories, the other half anywhere.
fn make_regions(rng: &mut StdRng, trajectories: &[Trajectory], n: usize) -> Vec<Region> {
    (0..n)
        .map(|k| {
            let t = rng.random_range(KNOTS[0]..KNOTS[3]);
            let (ra, dec) = if k % 2 == 0 {
                let p = trajectories[rng.random_range(0..trajectories.len())].predict(t);
                (p.ra, p.dec)
            } else {
                (rng.random_range(0.0..24.0), rand_dec(rng))
            };
            Region::new(k as u32, t, ra, dec, rng.random_range(0.1..1.0))
        })
        .collect()
}

/// Dual-tree search against the brute-force baseline on the same inputs.
fn bench_dual_vs_exhaustive(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let trajectories = make_trajectories(&mut rng, 2_000);
    let regions = make_regions(&mut rng, &trajectories, 2_000);
    let ttree = TrajectoryTree::build(&trajectories, &TrajectoryTreeParams::default()).unwrap();
    let rtree = RegionTree::build(&regions, &RegionTreeParams::default()).unwrap();

    let mut group = c.benchmark_group("trajectory_x_region/2000x2000");
    group.sample_size(10);
    group.bench_function("dual_tree", |b| {
        b.iter(|| black_box(dual_tree_search(&ttree, &rtree, black_box(0.5))))
    });
    group.bench_function("exhaustive", |b| {
        b.iter(|| {
            black_box(exhaustive_trajectory_region_pairs(
                &trajectories,
                &regions,
                black_box(0.5),
            ))
        })
    });
    group.finish();
}

/// Cheap widest-knot splits against full-window splits, build plus search.
fn bench_split_policies(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0xC0FFEE);
    let trajectories = make_trajectories(&mut rng, 5_000);
    let regions = make_regions(&mut rng, &trajectories, 1_000);
    let rtree = RegionTree::build(&regions, &RegionTreeParams::default()).unwrap();

    let mut group = c.benchmark_group("trajectory_tree/split_policy");
    group.sample_size(10);
    for split_all in [false, true] {
        let params = TrajectoryTreeParams::builder()
            .split_all(split_all)
            .build()
            .unwrap();
        group.bench_function(format!("split_all={split_all}"), |b| {
            b.iter(|| {
                let ttree = TrajectoryTree::build(&trajectories, &params).unwrap();
                black_box(dual_tree_search(&ttree, &rtree, 0.5))
            })
        });
    }
    group.finish();
}

criterion_group!(
    name = benches;
    config = Criterion::default();
    targets = bench_dual_vs_exhaustive, bench_split_policies
);
criterion_main!(benches);
