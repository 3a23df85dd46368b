//! Single-tree searches over a [`RegionTree`].
use crate::{
    constants::{Degree, MJD, PRUNE_EPS},
    geometry::{angle_between, SkyPosition},
    region_tree::{RegionBounds, RegionTree},
    search::{exhaustive::trajectory_hits, SearchStats},
    trajectory::Trajectory,
    tree_node::{NodeChildren, TreeNode},
};

impl RegionTree<'_> {
    /// Plates whose disc the trajectory passes within `threshold` degrees of, at each plate's
    /// epoch. Same result as
    /// [`exhaustive_regions_for_trajectory`](crate::search::exhaustive::exhaustive_regions_for_trajectory).
    ///
    /// A node is pruned when a lower bound on the trajectory's closest approach to the node
    /// center during the node's time span exceeds `radius + threshold`.
    pub fn search_trajectory(&self, trajectory: &Trajectory, threshold: Degree) -> Vec<usize> {
        self.search_trajectory_with_stats(trajectory, threshold, &mut SearchStats::default())
    }

    /// [`RegionTree::search_trajectory`], counting the work into `stats`.
    pub fn search_trajectory_with_stats(
        &self,
        trajectory: &Trajectory,
        threshold: Degree,
        stats: &mut SearchStats,
    ) -> Vec<usize> {
        let mut found = Vec::new();
        self.trajectory_descent(self.root(), trajectory, threshold, stats, &mut found);
        found.sort_unstable();
        found
    }

    fn trajectory_descent(
        &self,
        node: &TreeNode<RegionBounds>,
        trajectory: &Trajectory,
        threshold: Degree,
        stats: &mut SearchStats,
        found: &mut Vec<usize>,
    ) {
        stats.node_visits += 1;
        let b = node.summary();
        let closest = trajectory.closest_approach(b.center_vector(), b.t_lo, b.t_hi);
        if closest - b.radius > threshold + PRUNE_EPS {
            stats.pruned += 1;
            return;
        }

        match node.children() {
            NodeChildren::Leaf(indices) => {
                stats.distance_evals += indices.len();
                found.extend(indices.iter().copied().filter(|&i| {
                    trajectory_hits(trajectory, &self.regions()[i], self.vector(i), threshold)
                }));
            }
            NodeChildren::Split(left, right) => {
                self.trajectory_descent(left, trajectory, threshold, stats, found);
                self.trajectory_descent(right, trajectory, threshold, stats, found);
            }
        }
    }

    /// Plates observed during `[t_lo, t_hi]` whose disc comes within `radius` degrees of
    /// `position`.
    pub fn regions_near(
        &self,
        position: &SkyPosition,
        t_lo: MJD,
        t_hi: MJD,
        radius: Degree,
    ) -> Vec<usize> {
        let p = position.to_unit_vector();
        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            let b = node.summary();
            if b.t_hi < t_lo || b.t_lo > t_hi {
                continue;
            }
            if angle_between(b.center_vector(), &p) - b.radius > radius + PRUNE_EPS {
                continue;
            }
            match node.children() {
                NodeChildren::Leaf(indices) => {
                    found.extend(indices.iter().copied().filter(|&i| {
                        let region = &self.regions()[i];
                        (t_lo..=t_hi).contains(&region.time)
                            && angle_between(self.vector(i), &p) <= region.radius + radius
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
