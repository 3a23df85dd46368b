//! # Orbital range search
//!
//! Descends an [`OrbitTree`] and discards a node as soon as one active dimension proves that
//! none of its orbits can match the query:
//!
//! ```text
//! dist(node midpoint, query value) − node half-spread > threshold
//! ```
//!
//! where `dist` is the circular distance in `[0, π]` for `ω`, `Ω` and `i`. The perihelion time
//! never prunes a node: its test is periodic in each pair's own period, so a match can lie
//! whole periods away from the node's `[lo, hi]` interval. It is applied at the leaves.
use crate::{
    constants::PRUNE_EPS,
    geometry::angle_distance,
    orbit::{Orbit, OrbitElement, OrbitThresholds},
    orbit_tree::{OrbitBounds, OrbitTree},
    search::{exhaustive::orbits_match, MatchLists, SearchStats},
    tree_node::NodeChildren,
};

impl OrbitTree<'_> {
    /// Orbits matching `query` on every active dimension of `thresholds`.
    /// Same result as [`exhaustive_orbits`](crate::search::exhaustive::exhaustive_orbits).
    pub fn range_search(&self, query: &Orbit, thresholds: &OrbitThresholds) -> Vec<usize> {
        self.range_search_with_stats(query, thresholds, &mut SearchStats::default())
    }

    /// [`OrbitTree::range_search`], counting the work into `stats`.
    pub fn range_search_with_stats(
        &self,
        query: &Orbit,
        thresholds: &OrbitThresholds,
        stats: &mut SearchStats,
    ) -> Vec<usize> {
        let pruning_dims: Vec<OrbitElement> = OrbitElement::ALL
            .into_iter()
            .filter(|&dim| dim != OrbitElement::PerihelionTime && thresholds.is_active(dim))
            .collect();

        let mut found = Vec::new();
        let mut stack = vec![self.root()];
        while let Some(node) = stack.pop() {
            stats.node_visits += 1;
            if excluded(node.summary(), query, thresholds, &pruning_dims) {
                stats.pruned += 1;
                continue;
            }
            match node.children() {
                NodeChildren::Leaf(indices) => {
                    stats.distance_evals += indices.len();
                    found.extend(
                        indices
                            .iter()
                            .copied()
                            .filter(|&i| orbits_match(query, &self.orbits()[i], thresholds)),
                    );
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

    /// [`OrbitTree::range_search`] for every orbit of `queries`, one list per query.
    pub fn range_search_many(&self, queries: &[Orbit], thresholds: &OrbitThresholds) -> MatchLists {
        queries
            .iter()
            .map(|query| self.range_search(query, thresholds))
            .collect()
    }
}

fn excluded(
    bounds: &OrbitBounds,
    query: &Orbit,
    thresholds: &OrbitThresholds,
    dims: &[OrbitElement],
) -> bool {
    dims.iter().any(|&dim| {
        let mid = bounds.midpoint(dim);
        let value = query.element(dim);
        let dist = if dim.is_angle() {
            angle_distance(mid, value)
        } else {
            (mid - value).abs()
        };
        dist - bounds.half_spread(dim) > thresholds[dim] + PRUNE_EPS
    })
}
