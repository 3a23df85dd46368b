//! # Region tree
//!
//! A static KD-style tree over a collection of [`Region`]s (plates). Each node splits its
//! plates on one of three axes (time, right ascension or declination), choosing the axis with
//! the largest weighted half-spread, and stores a bounding ball valid for pruning against a
//! point **or** another disc.
//!
//! Node summary
//! -----------------
//! * `[t_lo, t_hi]` – time span of the plates in the subtree.
//! * `center` – midpoint of the shortest RA arc covering every plate (the arc opposite the
//!   largest gap between sorted right ascensions) and DEC midpoint.
//! * `radius` – `max(dist(center, plate center) + plate radius)` over the subtree, so that
//!   every point of every plate disc lies within `radius` of `center`.
//!
//! Construction
//! -----------------
//! A node becomes a leaf when it holds at most `leaf_size` plates, when its summed weighted
//! spread is below `1e-10`, or when a midpoint split would leave one side empty. Otherwise
//! plates strictly below the split axis midpoint go left, the others right.
//!
//! Searches over the tree live in [`crate::search`]:
//! [`RegionTree::search_trajectory`] and [`RegionTree::regions_near`].
//!
//! See also
//! ------------
//! * [`RegionTreeParams`] – axis weights and leaf size.
//! * [`crate::trajectory_tree::TrajectoryTree`] – the other side of the dual-tree search.
use itertools::Itertools;
use nalgebra::Vector3;
use tracing::debug;

use crate::{
    constants::{Degree, Hour, DEG_PER_HOUR, HOURS_PER_TURN, MJD, RADEG, SPREAD_EPS},
    geometry::{angle_between, SkyPosition},
    region::Region,
    skymatch_errors::SkyMatchError,
    tree_node::{TreeNode, TreeStats},
};

pub mod params;

pub use params::{RegionTreeParams, RegionTreeParamsBuilder};

/// Axis a region-tree node is split on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitAxis {
    Time,
    RightAscension,
    Declination,
}

impl SplitAxis {
    const ALL: [SplitAxis; 3] = [
        SplitAxis::Time,
        SplitAxis::RightAscension,
        SplitAxis::Declination,
    ];
}

/// Bounding ball and axis bounds of a region-tree node.
#[derive(Debug, Clone)]
pub struct RegionBounds {
    pub t_lo: MJD,
    pub t_hi: MJD,
    pub center: SkyPosition,
    pub radius: Degree,
    pub ra_half_spread: Hour,
    pub dec_lo: Degree,
    pub dec_hi: Degree,
    center_vector: Vector3<f64>,
    /// Start of the covering RA arc; plates sit at forward offsets `[0, 2·ra_half_spread]`.
    ra_start: Hour,
}

impl RegionBounds {
    /// Unit vector of the node center.
    pub fn center_vector(&self) -> &Vector3<f64> {
        &self.center_vector
    }

    /// Weighted half-spread of each axis, in [`SplitAxis::ALL`] order.
    fn weighted_spreads(&self, params: &RegionTreeParams) -> [f64; 3] {
        [
            params.time_weight * (self.t_hi - self.t_lo) / 2.0,
            params.ra_weight * self.ra_half_spread * DEG_PER_HOUR * (self.center.dec * RADEG).cos(),
            params.dec_weight * (self.dec_hi - self.dec_lo) / 2.0,
        ]
    }
}

/// A static tree over a borrowed slice of plates.
#[derive(Debug, Clone)]
pub struct RegionTree<'a> {
    regions: &'a [Region],
    vectors: Vec<Vector3<f64>>,
    root: TreeNode<RegionBounds>,
    params: RegionTreeParams,
}

impl<'a> RegionTree<'a> {
    /// Build a region tree over `regions`.
    ///
    /// Arguments
    /// -----------------
    /// * `regions` – the plates to index; the slice must outlive the tree.
    /// * `params` – axis weights and leaf size.
    ///
    /// Return
    /// ----------
    /// * The tree, or an error when `regions` is empty
    ///   ([`SkyMatchError::EmptyCollection`]), a plate is malformed
    ///   ([`SkyMatchError::InvalidRegion`]) or the parameters are invalid.
    pub fn build(regions: &'a [Region], params: &RegionTreeParams) -> Result<Self, SkyMatchError> {
        params.validate()?;
        if regions.is_empty() {
            return Err(SkyMatchError::EmptyCollection("region"));
        }
        if let Some(i) = regions.iter().position(|r| !r.is_valid()) {
            return Err(SkyMatchError::InvalidRegion(i));
        }

        let vectors: Vec<Vector3<f64>> = regions
            .iter()
            .map(|r| r.center.to_unit_vector())
            .collect();
        let root = Construction {
            regions,
            vectors: &vectors,
            params,
        }
        .node((0..regions.len()).collect());

        let tree = RegionTree {
            regions,
            vectors,
            root,
            params: params.clone(),
        };
        let stats = tree.stats();
        debug!(
            regions = regions.len(),
            nodes = stats.nodes,
            depth = stats.depth,
            "built region tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &TreeNode<RegionBounds> {
        &self.root
    }

    pub fn regions(&self) -> &'a [Region] {
        self.regions
    }

    pub fn params(&self) -> &RegionTreeParams {
        &self.params
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        self.root.stats()
    }

    /// Cached unit vector of plate `i`'s center.
    #[inline]
    pub(crate) fn vector(&self, i: usize) -> &Vector3<f64> {
        debug_assert!(i < self.vectors.len(), "region index out of range");
        &self.vectors[i]
    }
}

/// Borrowed inputs of a recursive build.
struct Construction<'c> {
    regions: &'c [Region],
    vectors: &'c [Vector3<f64>],
    params: &'c RegionTreeParams,
}

impl Construction<'_> {
    fn node(&self, indices: Vec<usize>) -> TreeNode<RegionBounds> {
        let bounds = self.bounds(&indices);
        if indices.len() <= self.params.leaf_size {
            return TreeNode::leaf(indices, bounds);
        }

        let spreads = bounds.weighted_spreads(self.params);
        if spreads.iter().sum::<f64>() < SPREAD_EPS {
            return TreeNode::leaf(indices, bounds);
        }
        let axis = spreads
            .iter()
            .position_max_by(|a, b| a.total_cmp(b))
            .map_or(SplitAxis::Time, |k| SplitAxis::ALL[k]);

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .copied()
            .partition(|&i| self.goes_left(i, axis, &bounds));
        if left.is_empty() || right.is_empty() {
            return TreeNode::leaf(indices, bounds);
        }

        TreeNode::split(self.node(left), self.node(right), bounds)
    }

    fn goes_left(&self, i: usize, axis: SplitAxis, bounds: &RegionBounds) -> bool {
        let region = &self.regions[i];
        match axis {
            SplitAxis::Time => region.time < (bounds.t_lo + bounds.t_hi) / 2.0,
            SplitAxis::RightAscension => {
                ra_forward_offset(region.center.ra, bounds.ra_start) < bounds.ra_half_spread
            }
            SplitAxis::Declination => region.center.dec < (bounds.dec_lo + bounds.dec_hi) / 2.0,
        }
    }

    fn bounds(&self, indices: &[usize]) -> RegionBounds {
        let (t_lo, t_hi) = min_max(indices.iter().map(|&i| self.regions[i].time));
        let (ra_start, ra_span) =
            covering_ra_arc(indices.iter().map(|&i| self.regions[i].center.ra).collect());
        let (dec_lo, dec_hi) = min_max(indices.iter().map(|&i| self.regions[i].center.dec));

        let ra_half_spread = ra_span / 2.0;
        let center = SkyPosition::new(ra_start + ra_half_spread, (dec_lo + dec_hi) / 2.0);
        let center_vector = center.to_unit_vector();
        let radius = indices
            .iter()
            .map(|&i| angle_between(&center_vector, &self.vectors[i]) + self.regions[i].radius)
            .fold(0.0, f64::max);

        RegionBounds {
            t_lo,
            t_hi,
            center,
            radius,
            ra_half_spread,
            dec_lo,
            dec_hi,
            center_vector,
            ra_start,
        }
    }
}

/// Shortest arc of right ascension containing every value, as `(start, span)` in hours.
///
/// The arc is the complement of the largest gap between circularly sorted values, so its
/// midpoint is the circular midpoint of the set wherever the 24h seam falls.
fn covering_ra_arc(mut ras: Vec<Hour>) -> (Hour, Hour) {
    ras.sort_unstable_by(f64::total_cmp);
    let (first, last) = (ras[0], ras[ras.len() - 1]);
    let (gap, start) = ras
        .iter()
        .tuple_windows()
        .map(|(a, b)| (b - a, *b))
        .fold((first + HOURS_PER_TURN - last, first), |best, cur| {
            if cur.0 > best.0 {
                cur
            } else {
                best
            }
        });
    (start, HOURS_PER_TURN - gap)
}

/// Offset of `ra` from `start` measured eastward, in `[0h, 24h)`.
#[inline]
fn ra_forward_offset(ra: Hour, start: Hour) -> Hour {
    (ra - start).rem_euclid(HOURS_PER_TURN)
}

fn min_max(values: impl Iterator<Item = f64>) -> (f64, f64) {
    values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), x| {
        (lo.min(x), hi.max(x))
    })
}

#[cfg(test)]
mod region_tree_test {
    use super::*;
    use crate::tree_node::NodeChildren;
    use approx::assert_abs_diff_eq;

    fn grid_regions() -> Vec<Region> {
        let mut regions = Vec::new();
        for k in 0..40u32 {
            let ra = (k % 8) as f64 * 3.0;
            let dec = -60.0 + (k / 8) as f64 * 30.0;
            regions.push(Region::new(k, 60000.0 + k as f64, ra, dec, 0.5 + 0.1 * (k % 3) as f64));
        }
        regions
    }

    fn check_invariants(tree: &RegionTree<'_>) {
        tree.root().for_each_node(&mut |node| {
            let b = node.summary();
            for i in node.indices() {
                let region = &tree.regions()[i];
                let d = b.center.angular_distance(&region.center) + region.radius;
                assert!(d <= b.radius + 1e-9, "plate {i} escapes its node ball");
                assert!(region.time >= b.t_lo && region.time <= b.t_hi);
            }
            if let NodeChildren::Split(left, right) = node.children() {
                let mut all = left.indices();
                all.extend(right.indices());
                all.sort_unstable();
                let mut parent = node.indices();
                parent.sort_unstable();
                assert_eq!(all, parent);
                assert_eq!(left.count() + right.count(), node.count());
            }
        });
    }

    #[test]
    fn test_build_invariants() {
        let regions = grid_regions();
        let params = RegionTreeParams::builder().leaf_size(3).build().unwrap();
        let tree = RegionTree::build(&regions, &params).unwrap();
        assert_eq!(tree.root().count(), regions.len());
        assert!(tree.stats().max_leaf_size <= 3);
        check_invariants(&tree);
    }

    #[test]
    fn test_seam_center() {
        let regions = vec![
            Region::new(1, 0.0, 23.8, 0.0, 0.1),
            Region::new(2, 0.0, 0.2, 0.0, 0.1),
        ];
        let tree = RegionTree::build(&regions, &RegionTreeParams::default()).unwrap();
        let b = tree.root().summary();
        assert_abs_diff_eq!(b.ra_half_spread, 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(b.radius, 3.1, epsilon = 1e-9);
        assert!(b.center.ra < 1e-9 || b.center.ra > 24.0 - 1e-9);
    }

    #[test]
    fn test_wide_ra_spread_uses_largest_gap() {
        // measured from the first plate, the offsets would be 0h, 11h and -11h
        let regions = vec![
            Region::new(1, 0.0, 0.0, 0.0, 0.1),
            Region::new(2, 0.0, 11.0, 0.0, 0.1),
            Region::new(3, 0.0, 13.0, 0.0, 0.1),
        ];
        let params = RegionTreeParams::builder().leaf_size(1).build().unwrap();
        let tree = RegionTree::build(&regions, &params).unwrap();
        let b = tree.root().summary();
        assert_abs_diff_eq!(b.ra_half_spread, 6.5, epsilon = 1e-12);
        assert_abs_diff_eq!(b.center.ra, 6.5, epsilon = 1e-12);
        check_invariants(&tree);
    }

    #[test]
    fn test_covering_ra_arc() {
        assert_eq!(covering_ra_arc(vec![5.0]), (5.0, 0.0));
        let (start, span) = covering_ra_arc(vec![0.5, 23.0, 1.5]);
        assert_abs_diff_eq!(start, 23.0);
        assert_abs_diff_eq!(span, 2.5, epsilon = 1e-12);
        let (start, span) = covering_ra_arc(vec![2.0, 4.0, 3.0]);
        assert_abs_diff_eq!(start, 2.0);
        assert_abs_diff_eq!(span, 2.0, epsilon = 1e-12);
    }

    #[test]
    fn test_identical_plates_form_a_leaf() {
        let regions: Vec<Region> = (0..10u32)
            .map(|k| Region::new(k, 100.0, 5.0, 5.0, 1.0))
            .collect();
        let params = RegionTreeParams::builder().leaf_size(1).build().unwrap();
        let tree = RegionTree::build(&regions, &params).unwrap();
        assert!(tree.root().is_leaf());
        assert_eq!(tree.root().count(), 10);
    }

    #[test]
    fn test_zero_weights_single_leaf() {
        let regions = grid_regions();
        let params = RegionTreeParams::builder()
            .time_weight(0.0)
            .ra_weight(0.0)
            .dec_weight(0.0)
            .leaf_size(1)
            .build()
            .unwrap();
        let tree = RegionTree::build(&regions, &params).unwrap();
        assert_eq!(tree.stats().nodes, 1);
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        assert_eq!(
            RegionTree::build(&[], &RegionTreeParams::default()).unwrap_err(),
            SkyMatchError::EmptyCollection("region")
        );
        let regions = vec![
            Region::new(1, 0.0, 1.0, 0.0, 1.0),
            Region::new(2, 0.0, 1.0, 0.0, -1.0),
        ];
        assert_eq!(
            RegionTree::build(&regions, &RegionTreeParams::default()).unwrap_err(),
            SkyMatchError::InvalidRegion(1)
        );
        let bad = RegionTreeParams {
            leaf_size: 0,
            ..RegionTreeParams::default()
        };
        assert!(RegionTree::build(&regions[..1], &bad).is_err());
    }
}
