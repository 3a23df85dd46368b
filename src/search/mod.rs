//! # Proximity searches
//!
//! Exhaustive baselines and tree-pruned searches over the three trees.
//!
//! | search | entry point | output |
//! |---|---|---|
//! | plates near one trajectory | [`RegionTree::search_trajectory`](crate::region_tree::RegionTree::search_trajectory) | region indices |
//! | trajectories near one plate | [`TrajectoryTree::search_region`](crate::trajectory_tree::TrajectoryTree::search_region) | trajectory indices |
//! | all trajectory × plate pairs | [`dual_tree_search`] | [`MatchLists`] indexed by trajectory |
//! | orbits near one orbit | [`OrbitTree::range_search`](crate::orbit_tree::OrbitTree::range_search) | orbit indices |
//! | plates near a point | [`RegionTree::regions_near`](crate::region_tree::RegionTree::regions_near) | region indices |
//! | trajectories near a point | [`TrajectoryTree::trajectories_near`](crate::trajectory_tree::TrajectoryTree::trajectories_near) | trajectory indices |
//!
//! Every tree search returns exactly the matches of its exhaustive counterpart in
//! [`exhaustive`], sorted by index. Pruning only skips subtrees whose bounding ball proves that
//! no member can match, with a [`PRUNE_EPS`](crate::constants::PRUNE_EPS) slack against
//! rounding.
//!
//! Each search has a `*_with_stats` variant filling a [`SearchStats`] counter.
use serde::{Deserialize, Serialize};

pub mod dual_tree;
pub mod exhaustive;
pub mod orbit_search;
pub mod region_search;
pub mod trajectory_search;

pub use dual_tree::{dual_tree_search, dual_tree_search_with_stats};

/// One sorted index list per item of the driving collection.
pub type MatchLists = Vec<Vec<usize>>;

/// Work counters of a search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchStats {
    /// Nodes examined by a single-tree search.
    pub node_visits: usize,
    /// Node pairs examined by a dual-tree search.
    pub node_pairs: usize,
    /// Nodes or node pairs discarded by the bound test.
    pub pruned: usize,
    /// Item-level match tests.
    pub distance_evals: usize,
}

/// Transpose match lists: `lists[i]` holds target indices for driver `i`; the result holds,
/// for every target `j < n_targets`, the sorted drivers matching it.
///
/// Target indices `≥ n_targets` are ignored.
pub fn invert_matches(lists: &[Vec<usize>], n_targets: usize) -> MatchLists {
    let mut inverted = vec![Vec::new(); n_targets];
    for (driver, targets) in lists.iter().enumerate() {
        for &j in targets {
            if let Some(slot) = inverted.get_mut(j) {
                slot.push(driver);
            }
        }
    }
    inverted
}
