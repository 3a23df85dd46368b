//! # Orbital-element tree
//!
//! A weighted KD-tree over the six search dimensions of [`Orbit`]. Each node stores the
//! per-dimension `[lo, hi]` box of its orbits. Splits pick the dimension with the largest
//! normalized weighted half-spread and cut at the raw midpoint; angle-like dimensions are not
//! wrapped while building, only while pruning (see [`crate::search::orbit_search`]).
use itertools::Itertools;
use tracing::debug;

use crate::{
    constants::SPREAD_EPS,
    orbit::{Orbit, OrbitElement, ORBIT_DIMS},
    skymatch_errors::SkyMatchError,
    tree_node::{TreeNode, TreeStats},
};

pub mod params;

pub use params::{OrbitTreeParams, OrbitTreeParamsBuilder};

/// Per-dimension bounding box of an orbit-tree node.
#[derive(Debug, Clone, PartialEq)]
pub struct OrbitBounds {
    pub lo: [f64; ORBIT_DIMS],
    pub hi: [f64; ORBIT_DIMS],
}

impl OrbitBounds {
    fn of<'o>(orbits: impl Iterator<Item = &'o Orbit>) -> Self {
        let mut bounds = OrbitBounds {
            lo: [f64::INFINITY; ORBIT_DIMS],
            hi: [f64::NEG_INFINITY; ORBIT_DIMS],
        };
        for orbit in orbits {
            for (d, x) in orbit.elements().into_iter().enumerate() {
                bounds.lo[d] = bounds.lo[d].min(x);
                bounds.hi[d] = bounds.hi[d].max(x);
            }
        }
        bounds
    }

    #[inline]
    pub fn midpoint(&self, dim: OrbitElement) -> f64 {
        (self.lo[dim.index()] + self.hi[dim.index()]) / 2.0
    }

    #[inline]
    pub fn half_spread(&self, dim: OrbitElement) -> f64 {
        (self.hi[dim.index()] - self.lo[dim.index()]) / 2.0
    }
}

/// A static tree over a borrowed slice of orbits.
#[derive(Debug, Clone)]
pub struct OrbitTree<'a> {
    orbits: &'a [Orbit],
    root: TreeNode<OrbitBounds>,
    params: OrbitTreeParams,
    split_weights: [f64; ORBIT_DIMS],
}

impl<'a> OrbitTree<'a> {
    /// Build an orbital tree over `orbits`.
    ///
    /// Return
    /// ----------
    /// * The tree, or an error when `orbits` is empty ([`SkyMatchError::EmptyCollection`]), an
    ///   orbit is malformed ([`SkyMatchError::InvalidOrbit`]) or the parameters are invalid.
    pub fn build(orbits: &'a [Orbit], params: &OrbitTreeParams) -> Result<Self, SkyMatchError> {
        params.validate()?;
        if orbits.is_empty() {
            return Err(SkyMatchError::EmptyCollection("orbit"));
        }
        if let Some(i) = orbits.iter().position(|o| !o.is_valid()) {
            return Err(SkyMatchError::InvalidOrbit(i));
        }

        let global = OrbitBounds::of(orbits.iter());
        let split_weights = OrbitElement::ALL.map(|dim| {
            let spread = global.hi[dim.index()] - global.lo[dim.index()];
            if spread > 0.0 {
                params.weights[dim.index()] / spread
            } else {
                0.0
            }
        });

        let root = Construction {
            orbits,
            leaf_size: params.leaf_size,
            split_weights: &split_weights,
        }
        .node((0..orbits.len()).collect());

        let tree = OrbitTree {
            orbits,
            root,
            params: params.clone(),
            split_weights,
        };
        let stats = tree.stats();
        debug!(
            orbits = orbits.len(),
            nodes = stats.nodes,
            depth = stats.depth,
            "built orbit tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &TreeNode<OrbitBounds> {
        &self.root
    }

    pub fn orbits(&self) -> &'a [Orbit] {
        self.orbits
    }

    pub fn params(&self) -> &OrbitTreeParams {
        &self.params
    }

    /// Weights divided by the global spread of each dimension.
    pub fn split_weights(&self) -> &[f64; ORBIT_DIMS] {
        &self.split_weights
    }

    pub fn len(&self) -> usize {
        self.orbits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orbits.is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        self.root.stats()
    }
}

struct Construction<'c> {
    orbits: &'c [Orbit],
    leaf_size: usize,
    split_weights: &'c [f64; ORBIT_DIMS],
}

impl Construction<'_> {
    fn node(&self, indices: Vec<usize>) -> TreeNode<OrbitBounds> {
        let bounds = OrbitBounds::of(indices.iter().map(|&i| &self.orbits[i]));
        if indices.len() <= self.leaf_size {
            return TreeNode::leaf(indices, bounds);
        }

        let spreads = OrbitElement::ALL.map(|dim| self.split_weights[dim.index()] * bounds.half_spread(dim));
        if spreads.iter().sum::<f64>() < SPREAD_EPS {
            return TreeNode::leaf(indices, bounds);
        }
        let Some(dim) = spreads
            .iter()
            .position_max_by(|a, b| a.total_cmp(b))
            .map(|d| OrbitElement::ALL[d])
        else {
            return TreeNode::leaf(indices, bounds);
        };

        let mid = bounds.midpoint(dim);
        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.orbits[i].element(dim) < mid);
        if left.is_empty() || right.is_empty() {
            return TreeNode::leaf(indices, bounds);
        }

        TreeNode::split(self.node(left), self.node(right), bounds)
    }
}

#[cfg(test)]
mod orbit_tree_test {
    use super::*;
    use crate::tree_node::NodeChildren;

    fn belt(n: usize) -> Vec<Orbit> {
        (0..n)
            .map(|k| {
                let x = k as f64;
                Orbit::new(
                    k as u32,
                    1.8 + (x * 0.37).sin().abs(),
                    0.05 + 0.3 * (x * 0.11).cos().abs(),
                    0.4 * (x * 0.23).sin().abs(),
                    (x * 0.71).rem_euclid(std::f64::consts::TAU),
                    (x * 1.93).rem_euclid(std::f64::consts::TAU),
                    59000.0 + (x * 13.7) % 1500.0,
                    60000.0,
                )
            })
            .collect()
    }

    #[test]
    fn test_build_invariants() {
        let orbits = belt(300);
        let params = OrbitTreeParams::builder().leaf_size(4).build().unwrap();
        let tree = OrbitTree::build(&orbits, &params).unwrap();
        assert_eq!(tree.root().count(), 300);
        assert!(tree.stats().max_leaf_size <= 4);

        tree.root().for_each_node(&mut |node| {
            let b = node.summary();
            for i in node.indices() {
                for (d, x) in orbits[i].elements().into_iter().enumerate() {
                    assert!(b.lo[d] <= x && x <= b.hi[d]);
                }
            }
            if let NodeChildren::Split(left, right) = node.children() {
                let mut all = left.indices();
                all.extend(right.indices());
                all.sort_unstable();
                let mut parent = node.indices();
                parent.sort_unstable();
                assert_eq!(all, parent);
            }
        });
    }

    #[test]
    fn test_zero_weight_dimension_never_splits() {
        // orbits differ only in perihelion time, which has weight 0 by default
        let orbits: Vec<Orbit> = (0..50)
            .map(|k| Orbit::new(k as u32, 2.0, 0.1, 0.2, 0.3, 0.4, 59000.0 + k as f64, 60000.0))
            .collect();
        let params = OrbitTreeParams::builder().leaf_size(1).build().unwrap();
        let tree = OrbitTree::build(&orbits, &params).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.split_weights()[0], 0.0);
    }

    #[test]
    fn test_rejects_invalid_orbit() {
        let mut orbits = belt(3);
        orbits[2].perihelion_distance = -1.0;
        assert_eq!(
            OrbitTree::build(&orbits, &OrbitTreeParams::default()).unwrap_err(),
            SkyMatchError::InvalidOrbit(2)
        );
        assert_eq!(
            OrbitTree::build(&[], &OrbitTreeParams::default()).unwrap_err(),
            SkyMatchError::EmptyCollection("orbit")
        );
    }
}
