//! # Trajectory tree
//!
//! A static tree over trajectories sharing one knot time grid. Every node is summarized by a
//! *representative* trajectory and per-knot radii around it:
//!
//! * a node with a single member uses that member as its representative;
//! * a larger node synthesizes one, knot by knot, as the mean of the members' coordinates,
//!   with right ascensions taken as offsets from the first member's so the mean never
//!   averages across the 24h seam.
//!
//! Splitting picks two far-apart members as anchors and sends every member to the nearer one.
//! Distances are measured at the node's *widest knot* (cheap default) or over the whole time
//! window when [`TrajectoryTreeParams::split_all`] is set.
//!
//! Pruning bound
//! -----------------
//! Members and representative move linearly in (RA, DEC) on the same grid, so on segment `k`
//! the coordinate offset of a member from the representative is itself linear in the
//! fraction `s`: `|Δdec(s)| ≤ |1−s|·δ_k + |s|·δ_{k+1}`, and likewise for `Δra` with the
//! largest offsets at both ends of the segment. The coordinate-straight path between the two
//! positions is then no longer than `√(Δdec² + (15·Δra·cos_max)²)`, `cos_max` being the
//! largest `|cos dec|` either position can have. See [`TrajectoryBounds::inflation_at`].
use std::ops::RangeInclusive;

use nalgebra::Vector3;
use smallvec::SmallVec;
use tracing::debug;

use crate::{
    constants::{Degree, DEG_PER_HOUR, MJD, SPREAD_EPS},
    geometry::{angle_between, max_abs_cos, ra_offset, SkyPosition},
    skymatch_errors::SkyMatchError,
    trajectory::{Piece, Trajectory},
    tree_node::{TreeNode, TreeStats},
};

pub mod params;

pub use params::{TrajectoryTreeParams, TrajectoryTreeParamsBuilder};

/// Per-knot table; the inline capacity covers the usual handful of knots without allocating.
pub type KnotTable = SmallVec<[f64; 8]>;

/// Bounding summary of a trajectory-tree node.
#[derive(Debug, Clone)]
pub struct TrajectoryBounds {
    representative: Trajectory,
    /// Largest angular distance (degrees) from the representative to a member, per knot.
    pub knot_radii: KnotTable,
    /// Largest `|dec_member − dec_rep|` per knot, degrees.
    dec_radii: KnotTable,
    /// Largest RA offset (hours) at the start and at the end of each segment.
    ra_start: KnotTable,
    ra_end: KnotTable,
    /// Largest knot radius over the tree's time window.
    pub radius: Degree,
    /// Window knot where `knot_radii` is largest.
    pub widest_knot: usize,
}

impl TrajectoryBounds {
    pub fn representative(&self) -> &Trajectory {
        &self.representative
    }

    /// Largest possible angular offset (degrees) between the representative's prediction at
    /// `t` and any member's prediction at `t`, capped at `180°`.
    pub fn inflation_at(&self, t: MJD) -> Degree {
        let (segment, s) = self.representative.segment(t);
        self.piece_inflation(&Piece {
            segment,
            s0: s,
            s1: s,
        })
    }

    /// Lower bound on the angular distance between `center` and any member's predicted path
    /// during `[t_lo, t_hi]`, in degrees (may be negative).
    ///
    /// Over each piece of the window, the representative's closest-approach bound minus the
    /// largest inflation on that piece.
    pub fn lower_bound_distance(&self, center: &Vector3<f64>, t_lo: MJD, t_hi: MJD) -> Degree {
        let rep = &self.representative;
        rep.pieces(t_lo, t_hi)
            .iter()
            .map(|piece| rep.piece_closest_approach(center, piece) - self.piece_inflation(piece))
            .fold(f64::INFINITY, f64::min)
    }

    /// Inflation valid on the whole of `piece`.
    fn piece_inflation(&self, piece: &Piece) -> Degree {
        let k = piece.segment;
        let next = (k + 1).min(self.dec_radii.len() - 1);
        let spread = |start: f64, end: f64, s: f64| (1.0 - s).abs() * start + s.abs() * end;
        let dec = spread(self.dec_radii[k], self.dec_radii[next], piece.s0)
            .max(spread(self.dec_radii[k], self.dec_radii[next], piece.s1));
        let ra = spread(self.ra_start[k], self.ra_end[k], piece.s0)
            .max(spread(self.ra_start[k], self.ra_end[k], piece.s1));
        if dec == 0.0 && ra == 0.0 {
            return 0.0;
        }

        let (_, d0) = self.representative.coordinates(k, piece.s0);
        let (_, d1) = self.representative.coordinates(k, piece.s1);
        let cos_max = max_abs_cos(d0.min(d1) - dec, d0.max(d1) + dec);
        dec.hypot(DEG_PER_HOUR * ra * cos_max).min(180.0)
    }
}

/// A static tree over a borrowed slice of knot-aligned trajectories.
#[derive(Debug, Clone)]
pub struct TrajectoryTree<'a> {
    trajectories: &'a [Trajectory],
    root: TreeNode<TrajectoryBounds>,
    params: TrajectoryTreeParams,
    window_knots: RangeInclusive<usize>,
}

impl<'a> TrajectoryTree<'a> {
    /// Build a trajectory tree over `trajectories`.
    ///
    /// Arguments
    /// -----------------
    /// * `trajectories` – the paths to index; all must share the same knot times.
    /// * `params` – time window, leaf size and split policy.
    ///
    /// Return
    /// ----------
    /// * The tree, or an error when the slice is empty ([`SkyMatchError::EmptyCollection`]),
    ///   a trajectory has a different knot grid than the first one
    ///   ([`SkyMatchError::MisalignedKnots`]) or the parameters are invalid.
    pub fn build(
        trajectories: &'a [Trajectory],
        params: &TrajectoryTreeParams,
    ) -> Result<Self, SkyMatchError> {
        params.validate()?;
        let first = trajectories
            .first()
            .ok_or(SkyMatchError::EmptyCollection("trajectory"))?;
        if let Some((index, other)) = trajectories
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, t)| !t.same_knot_times(first))
        {
            return Err(SkyMatchError::MisalignedKnots {
                index,
                expected: first.len(),
                found: other.len(),
            });
        }

        let (ts, te) = params
            .time_window
            .unwrap_or((first.first_time(), first.last_time()));
        let window_knots = window_knot_range(first.times(), ts, te);
        let root = Construction {
            trajectories,
            params,
            window_knots: window_knots.clone(),
        }
        .node((0..trajectories.len()).collect());

        let tree = TrajectoryTree {
            trajectories,
            root,
            params: params.clone(),
            window_knots,
        };
        let stats = tree.stats();
        debug!(
            trajectories = trajectories.len(),
            knots = first.len(),
            nodes = stats.nodes,
            depth = stats.depth,
            "built trajectory tree"
        );
        Ok(tree)
    }

    pub fn root(&self) -> &TreeNode<TrajectoryBounds> {
        &self.root
    }

    pub fn trajectories(&self) -> &'a [Trajectory] {
        self.trajectories
    }

    pub fn params(&self) -> &TrajectoryTreeParams {
        &self.params
    }

    /// Knot indices covering the time window.
    pub fn window_knots(&self) -> RangeInclusive<usize> {
        self.window_knots.clone()
    }

    pub fn len(&self) -> usize {
        self.trajectories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trajectories.is_empty()
    }

    pub fn stats(&self) -> TreeStats {
        self.root.stats()
    }
}

/// Knots from the last one at or before `ts` through the first one at or after `te`,
/// clamped to the grid.
fn window_knot_range(times: &[MJD], ts: MJD, te: MJD) -> RangeInclusive<usize> {
    let last = times.len() - 1;
    let lo = times.partition_point(|&x| x <= ts).saturating_sub(1).min(last);
    let hi = times.partition_point(|&x| x < te).min(last).max(lo);
    lo..=hi
}

struct Construction<'c> {
    trajectories: &'c [Trajectory],
    params: &'c TrajectoryTreeParams,
    window_knots: RangeInclusive<usize>,
}

impl Construction<'_> {
    fn node(&self, indices: Vec<usize>) -> TreeNode<TrajectoryBounds> {
        let bounds = self.bounds(&indices);
        if indices.len() <= self.params.leaf_size || bounds.radius < SPREAD_EPS {
            return TreeNode::leaf(indices, bounds);
        }

        let (first, second) = self.split_anchors(&indices, &bounds);
        let (left, right): (Vec<usize>, Vec<usize>) = indices.iter().copied().partition(|&i| {
            let member = &self.trajectories[i];
            self.distance(&self.trajectories[first], member, bounds.widest_knot)
                <= self.distance(&self.trajectories[second], member, bounds.widest_knot)
        });
        if left.is_empty() || right.is_empty() {
            return TreeNode::leaf(indices, bounds);
        }

        TreeNode::split(self.node(left), self.node(right), bounds)
    }

    /// Member farthest from the representative, then the member farthest from that one.
    fn split_anchors(&self, indices: &[usize], bounds: &TrajectoryBounds) -> (usize, usize) {
        let farthest_from = |origin: &Trajectory| {
            indices
                .iter()
                .map(|&i| (i, self.distance(origin, &self.trajectories[i], bounds.widest_knot)))
                .max_by(|a, b| a.1.total_cmp(&b.1))
                .map_or(indices[0], |(i, _)| i)
        };
        let first = farthest_from(&bounds.representative);
        let second = farthest_from(&self.trajectories[first]);
        (first, second)
    }

    /// Split metric: distance at the widest knot, or the largest distance over the window.
    fn distance(&self, a: &Trajectory, b: &Trajectory, widest_knot: usize) -> Degree {
        if self.params.split_all {
            self.window_knots
                .clone()
                .map(|k| angle_between(a.vector(k), b.vector(k)))
                .fold(0.0, f64::max)
        } else {
            angle_between(a.vector(widest_knot), b.vector(widest_knot))
        }
    }

    fn representative(&self, indices: &[usize]) -> Trajectory {
        let first = &self.trajectories[indices[0]];
        if indices.len() == 1 {
            return first.clone();
        }
        let count = indices.len() as f64;
        let positions = first
            .positions()
            .iter()
            .enumerate()
            .map(|(k, anchor)| {
                let (ra_sum, dec_sum) = indices
                    .iter()
                    .map(|&i| &self.trajectories[i].positions()[k])
                    .fold((0.0, 0.0), |(ra, dec), p| {
                        (ra + ra_offset(p.ra, anchor.ra), dec + p.dec)
                    });
                SkyPosition::new(anchor.ra + ra_sum / count, dec_sum / count)
            })
            .collect();
        Trajectory::from_positions(first.times().to_vec(), positions)
    }

    fn bounds(&self, indices: &[usize]) -> TrajectoryBounds {
        let representative = self.representative(indices);
        let n_knots = representative.len();
        let n_segments = representative.segments();

        let mut knot_radii = KnotTable::from_elem(0.0, n_knots);
        let mut dec_radii = KnotTable::from_elem(0.0, n_knots);
        let mut ra_start = KnotTable::from_elem(0.0, n_segments);
        let mut ra_end = KnotTable::from_elem(0.0, n_segments);
        let rep_knots = representative.positions();
        for &i in indices {
            let member = &self.trajectories[i];
            let knots = member.positions();
            for k in 0..n_knots {
                let d = angle_between(representative.vector(k), member.vector(k));
                knot_radii[k] = knot_radii[k].max(d);
                dec_radii[k] = dec_radii[k].max((knots[k].dec - rep_knots[k].dec).abs());
            }
            // the RA offset drifts linearly over a segment, possibly past ±12h
            for k in 0..n_segments {
                let offset = ra_offset(knots[k].ra, rep_knots[k].ra);
                let drift = member.ra_step(k) - representative.ra_step(k);
                ra_start[k] = ra_start[k].max(offset.abs());
                ra_end[k] = ra_end[k].max((offset + drift).abs());
            }
        }

        let (widest_knot, radius) = self
            .window_knots
            .clone()
            .map(|k| (k, knot_radii[k]))
            .fold((*self.window_knots.start(), f64::NEG_INFINITY), |best, cur| {
                if cur.1 > best.1 {
                    cur
                } else {
                    best
                }
            });

        TrajectoryBounds {
            representative,
            knot_radii,
            dec_radii,
            ra_start,
            ra_end,
            radius,
            widest_knot,
        }
    }
}
