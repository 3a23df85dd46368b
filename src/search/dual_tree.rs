//! # Dual-tree search
//!
//! Descends a [`TrajectoryTree`] and a [`RegionTree`] together. A node pair is discarded when
//! no member trajectory can come within `threshold` of any plate under the region node during
//! the region node's time span:
//!
//! ```text
//! lower_bound(representative path over [t_lo, t_hi], region center) − region radius > threshold
//! ```
//!
//! Otherwise the descent splits the larger of the two nodes (region radius scaled by 1.5
//! against the trajectory radius) and falls back to pairwise tests at leaf × leaf.
use tracing::debug;

use crate::{
    constants::{Degree, PRUNE_EPS},
    region_tree::{RegionBounds, RegionTree},
    search::{exhaustive::trajectory_hits, MatchLists, SearchStats},
    trajectory_tree::{TrajectoryBounds, TrajectoryTree},
    tree_node::TreeNode,
};

/// Weight of the region radius when choosing which tree to descend.
const REGION_DESCENT_BIAS: f64 = 1.5;

/// All trajectory × plate matches within `threshold` degrees.
///
/// Return
/// ----------
/// * One sorted list of region indices per trajectory, index-aligned with
///   `trajectory_tree.trajectories()`. Same result as
///   [`exhaustive_trajectory_region_pairs`](crate::search::exhaustive::exhaustive_trajectory_region_pairs);
///   use [`invert_matches`](crate::search::invert_matches) for per-plate lists.
pub fn dual_tree_search(
    trajectory_tree: &TrajectoryTree<'_>,
    region_tree: &RegionTree<'_>,
    threshold: Degree,
) -> MatchLists {
    dual_tree_search_with_stats(
        trajectory_tree,
        region_tree,
        threshold,
        &mut SearchStats::default(),
    )
}

/// [`dual_tree_search`], counting node pairs, pruned pairs and item tests into `stats`.
pub fn dual_tree_search_with_stats(
    trajectory_tree: &TrajectoryTree<'_>,
    region_tree: &RegionTree<'_>,
    threshold: Degree,
    stats: &mut SearchStats,
) -> MatchLists {
    let mut search = DualSearch {
        trajectory_tree,
        region_tree,
        threshold,
        stats,
        matches: vec![Vec::new(); trajectory_tree.len()],
    };
    search.descend(trajectory_tree.root(), region_tree.root());

    let DualSearch {
        mut matches, stats, ..
    } = search;
    for list in &mut matches {
        list.sort_unstable();
    }
    debug!(
        trajectories = trajectory_tree.len(),
        regions = region_tree.len(),
        node_pairs = stats.node_pairs,
        pruned = stats.pruned,
        distance_evals = stats.distance_evals,
        "dual-tree search done"
    );
    matches
}

struct DualSearch<'s, 't, 'r> {
    trajectory_tree: &'s TrajectoryTree<'t>,
    region_tree: &'s RegionTree<'r>,
    threshold: Degree,
    stats: &'s mut SearchStats,
    matches: MatchLists,
}

impl DualSearch<'_, '_, '_> {
    fn descend(&mut self, t_node: &TreeNode<TrajectoryBounds>, r_node: &TreeNode<RegionBounds>) {
        self.stats.node_pairs += 1;
        let tb = t_node.summary();
        let rb = r_node.summary();
        let bound = tb.lower_bound_distance(rb.center_vector(), rb.t_lo, rb.t_hi);
        if bound - rb.radius > self.threshold + PRUNE_EPS {
            self.stats.pruned += 1;
            return;
        }

        match (t_node.split_children(), r_node.split_children()) {
            (None, None) => self.leaf_pairs(t_node, r_node),
            (Some((t_left, t_right)), None) => {
                self.descend(t_left, r_node);
                self.descend(t_right, r_node);
            }
            (None, Some((r_left, r_right))) => {
                self.descend(t_node, r_left);
                self.descend(t_node, r_right);
            }
            (Some((t_left, t_right)), Some((r_left, r_right))) => {
                if rb.radius * REGION_DESCENT_BIAS > tb.radius {
                    self.descend(t_node, r_left);
                    self.descend(t_node, r_right);
                } else {
                    self.descend(t_left, r_node);
                    self.descend(t_right, r_node);
                }
            }
        }
    }

    fn leaf_pairs(&mut self, t_node: &TreeNode<TrajectoryBounds>, r_node: &TreeNode<RegionBounds>) {
        let (Some(t_indices), Some(r_indices)) = (t_node.leaf_indices(), r_node.leaf_indices())
        else {
            return;
        };
        let trajectories = self.trajectory_tree.trajectories();
        let regions = self.region_tree.regions();
        self.stats.distance_evals += t_indices.len() * r_indices.len();
        for &ti in t_indices {
            let trajectory = &trajectories[ti];
            self.matches[ti].extend(r_indices.iter().copied().filter(|&ri| {
                trajectory_hits(
                    trajectory,
                    &regions[ri],
                    self.region_tree.vector(ri),
                    self.threshold,
                )
            }));
        }
    }
}
