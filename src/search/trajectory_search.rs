//! Single-tree searches over a [`TrajectoryTree`].
use nalgebra::Vector3;

use crate::{
    constants::{Degree, MJD, PRUNE_EPS},
    geometry::{angle_between, SkyPosition},
    region::Region,
    search::{exhaustive::trajectory_hits, SearchStats},
    trajectory_tree::{TrajectoryBounds, TrajectoryTree},
    tree_node::{NodeChildren, TreeNode},
};

impl TrajectoryTree<'_> {
    /// Trajectories passing within `threshold` degrees of `region`'s disc at the plate epoch.
    /// Same result as
    /// [`exhaustive_trajectories_for_region`](crate::search::exhaustive::exhaustive_trajectories_for_region).
    ///
    /// A node is pruned when the representative's prediction at the plate epoch, moved
    /// towards the plate by the node inflation at that epoch, is still farther than
    /// `region.radius + threshold`.
    pub fn search_region(&self, region: &Region, threshold: Degree) -> Vec<usize> {
        self.search_region_with_stats(region, threshold, &mut SearchStats::default())
    }

    /// [`TrajectoryTree::search_region`], counting the work into `stats`.
    pub fn search_region_with_stats(
        &self,
        region: &Region,
        threshold: Degree,
        stats: &mut SearchStats,
    ) -> Vec<usize> {
        let region_vector = region.center.to_unit_vector();
        let mut found = Vec::new();
        self.region_descent(self.root(), region, &region_vector, threshold, stats, &mut found);
        found.sort_unstable();
        found
    }

    fn region_descent(
        &self,
        node: &TreeNode<TrajectoryBounds>,
        region: &Region,
        region_vector: &Vector3<f64>,
        threshold: Degree,
        stats: &mut SearchStats,
        found: &mut Vec<usize>,
    ) {
        stats.node_visits += 1;
        let bound = node
            .summary()
            .lower_bound_distance(region_vector, region.time, region.time);
        if bound - region.radius > threshold + PRUNE_EPS {
            stats.pruned += 1;
            return;
        }

        match node.children() {
            NodeChildren::Leaf(indices) => {
                stats.distance_evals += indices.len();
                found.extend(indices.iter().copied().filter(|&i| {
                    trajectory_hits(&self.trajectories()[i], region, region_vector, threshold)
                }));
            }
            NodeChildren::Split(left, right) => {
                for child in [left, right] {
                    self.region_descent(child, region, region_vector, threshold, stats, found);
                }
            }
        }
    }

    /// Trajectories whose prediction at `time` lies within `radius` degrees of `position`.
    pub fn trajectories_near(&self, position: &SkyPosition, time: MJD, radius: Degree) -> Vec<usize> {
        let p = position.to_unit_vector();
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            if node.summary().lower_bound_distance(&p, time, time) > radius + PRUNE_EPS {
                continue;
            }
            match node.children() {
                NodeChildren::Leaf(indices) => {
                    found.extend(indices.iter().copied().filter(|&i| {
                        angle_between(&self.trajectories()[i].predict_vector(time), &p) <= radius
                    }));
                }
                NodeChildren::Split(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }
        found.sort_unstable();
        found
    }
}

#[cfg(test)]
mod trajectory_search_test {
    use super::*;
    use crate::{
        search::exhaustive::exhaustive_trajectories_for_region, trajectory::Trajectory,
        trajectory_tree::TrajectoryTreeParams,
    };

    fn sweep(n: usize) -> Vec<Trajectory> {
        (0..n)
            .map(|j| {
                let ra0 = (j as f64 * 0.61) % 24.0;
                let dec0 = -60.0 + (j as f64 * 7.3) % 120.0;
                Trajectory::from_knots([
                    (50.0, ra0, dec0),
                    (52.0, ra0 + 0.2, dec0 + 1.5),
                    (55.0, ra0 + 0.4, dec0 + 2.0),
                ])
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_matches_exhaustive() {
        let trajectories = sweep(120);
        let params = TrajectoryTreeParams::builder().leaf_size(3).build().unwrap();
        let tree = TrajectoryTree::build(&trajectories, &params).unwrap();
        for (k, time) in [49.0, 51.0, 53.5, 57.0].into_iter().enumerate() {
            let region = Region::new(k as u32, time, 3.0 * k as f64, -20.0 + 10.0 * k as f64, 3.0);
            for threshold in [0.0, 2.0, 8.0] {
                let mut stats = SearchStats::default();
                let found = tree.search_region_with_stats(&region, threshold, &mut stats);
                assert_eq!(
                    found,
                    exhaustive_trajectories_for_region(&trajectories, &region, threshold)
                );
                assert!(stats.pruned > 0);
            }
        }
    }

    #[test]
    fn test_trajectories_near() {
        let trajectories = sweep(30);
        let tree = TrajectoryTree::build(&trajectories, &TrajectoryTreeParams::default()).unwrap();
        let target = trajectories[7].predict(52.0);
        let found = tree.trajectories_near(&target, 52.0, 0.01);
        assert!(found.contains(&7));
        for &i in &found {
            assert!(trajectories[i].predict(52.0).angular_distance(&target) <= 0.01 + 1e-12);
        }
    }
}
