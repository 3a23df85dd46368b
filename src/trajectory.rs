//! # Piecewise-linear trajectories
//!
//! A [`Trajectory`] is the predicted path of a moving object: an ordered list of knots
//! `(time, position)` with strictly increasing times.
//!
//! Prediction
//! -----------------
//! Right ascension and declination move at a constant rate between the two bracketing knots:
//!
//! `ra(t) = ra_k + s·Δra_k`, `dec(t) = dec_k + s·(dec_{k+1} − dec_k)`,
//! with `s = (t − t_k) / (t_{k+1} − t_k)`.
//!
//! `Δra_k` is the RA step wrapped into `[-12h, 12h)`, so a path crossing the 24h seam keeps
//! going the short way round. Before the first knot and after the last one the boundary
//! segment's rate is kept (`s < 0` or `s > 1`). A declination extrapolated past a pole comes
//! out on the opposite meridian, see [`SkyPosition::from_unfolded`].
//!
//! A trajectory with a single knot predicts a constant position.
//!
//! Closest approach
//! -----------------
//! Between knots the path is not a great circle, so [`Trajectory::closest_approach`] returns a
//! lower bound. The window is cut into pieces no longer than [`MAX_PIECE_ARC`]. On each piece
//! the path length `ℓ` is bounded from the coordinate rates, and the larger of two estimates
//! is kept:
//!
//! * `(d(c, A) + d(c, B) − ℓ) / 2`, the triangle inequality through the piece ends `A`, `B`;
//! * the closest approach to the great-circle arc `AB`, minus how far a path of length `ℓ`
//!   can stray from that arc.
use itertools::Itertools;
use nalgebra::Vector3;
use smallvec::SmallVec;

use crate::{
    constants::{Degree, Hour, DEG_PER_HOUR, MAX_PIECE_ARC, MAX_PIECE_SPLITS, MJD},
    geometry::{
        angle_between, arc_deviation_bound, closest_approach_on_arc, max_abs_cos, ra_offset,
        radec_to_vector, SkyPosition,
    },
    skymatch_errors::SkyMatchError,
};

/// Time breakpoints of a window: the window ends plus every knot strictly inside it.
pub(crate) type Breakpoints = SmallVec<[MJD; 8]>;

/// The stretch `s ∈ [s0, s1]` of one segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Piece {
    pub(crate) segment: usize,
    pub(crate) s0: f64,
    pub(crate) s1: f64,
}

pub(crate) type Pieces = SmallVec<[Piece; 8]>;

/// A time-ordered piecewise-linear sky path.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<MJD>,
    positions: Vec<SkyPosition>,
    vectors: Vec<Vector3<f64>>,
    /// RA step (hours) of each segment; a single zero step for a one-knot trajectory.
    ra_steps: Vec<Hour>,
}

impl Trajectory {
    /// Build a trajectory from knot times and positions.
    ///
    /// Arguments
    /// -----------------
    /// * `times` – knot epochs (MJD), strictly increasing.
    /// * `positions` – knot sky positions, one per time.
    ///
    /// Return
    /// ----------
    /// * The trajectory, or [`SkyMatchError::InvalidTrajectory`] when the knot list is empty,
    ///   the two vectors differ in length, a time is not finite, times do not strictly
    ///   increase, or a position is invalid.
    pub fn new(times: Vec<MJD>, positions: Vec<SkyPosition>) -> Result<Self, SkyMatchError> {
        if times.is_empty() {
            return Err(SkyMatchError::InvalidTrajectory(
                "a trajectory needs at least one knot".into(),
            ));
        }
        if times.len() != positions.len() {
            return Err(SkyMatchError::InvalidTrajectory(format!(
                "{} knot times for {} positions",
                times.len(),
                positions.len()
            )));
        }
        if times.iter().any(|t| !t.is_finite()) {
            return Err(SkyMatchError::InvalidTrajectory(
                "knot times must be finite".into(),
            ));
        }
        if !times.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(SkyMatchError::InvalidTrajectory(
                "knot times must be strictly increasing".into(),
            ));
        }
        if let Some(k) = positions.iter().position(|p| !p.is_valid()) {
            return Err(SkyMatchError::InvalidTrajectory(format!(
                "invalid sky position at knot {k}"
            )));
        }

        let positions = positions
            .into_iter()
            .map(|p| SkyPosition::new(p.ra, p.dec))
            .collect();
        Ok(Trajectory::from_positions(times, positions))
    }

    /// Build a trajectory from `(time, ra [h], dec [deg])` triples.
    pub fn from_knots<I>(knots: I) -> Result<Self, SkyMatchError>
    where
        I: IntoIterator<Item = (MJD, f64, f64)>,
    {
        let (times, positions): (Vec<MJD>, Vec<SkyPosition>) = knots
            .into_iter()
            .map(|(t, ra, dec)| (t, SkyPosition::new(ra, dec)))
            .unzip();
        Trajectory::new(times, positions)
    }

    /// Build a trajectory from already checked knots; used for synthesized representatives.
    pub(crate) fn from_positions(times: Vec<MJD>, positions: Vec<SkyPosition>) -> Self {
        debug_assert_eq!(times.len(), positions.len(), "one position per knot time");
        let vectors = positions.iter().map(SkyPosition::to_unit_vector).collect();
        let ra_steps = if positions.len() == 1 {
            vec![0.0]
        } else {
            positions
                .iter()
                .tuple_windows()
                .map(|(a, b)| ra_offset(b.ra, a.ra))
                .collect()
        };
        Trajectory {
            times,
            positions,
            vectors,
            ra_steps,
        }
    }

    /// Number of knots.
    pub fn len(&self) -> usize {
        self.times.len()
    }

    /// Always `false`: a trajectory holds at least one knot.
    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[MJD] {
        &self.times
    }

    pub fn positions(&self) -> &[SkyPosition] {
        &self.positions
    }

    pub fn first_time(&self) -> MJD {
        self.times[0]
    }

    pub fn last_time(&self) -> MJD {
        self.times[self.times.len() - 1]
    }

    /// Unit vector of knot `k`.
    #[inline]
    pub(crate) fn vector(&self, k: usize) -> &Vector3<f64> {
        debug_assert!(k < self.vectors.len(), "knot index out of range");
        &self.vectors[k]
    }

    /// Whether both trajectories share exactly the same knot times.
    pub fn same_knot_times(&self, other: &Trajectory) -> bool {
        self.times == other.times
    }

    /// Number of segments; a one-knot trajectory has a single motionless one.
    pub(crate) fn segments(&self) -> usize {
        self.ra_steps.len()
    }

    /// RA change (hours) over segment `k`.
    #[inline]
    pub(crate) fn ra_step(&self, k: usize) -> Hour {
        self.ra_steps[k]
    }

    /// Declination change (degrees) over segment `k`.
    #[inline]
    pub(crate) fn dec_step(&self, k: usize) -> Degree {
        if self.positions.len() == 1 {
            0.0
        } else {
            self.positions[k + 1].dec - self.positions[k].dec
        }
    }

    /// Fraction of `t` along segment `k`; `0` for a one-knot trajectory.
    #[inline]
    fn fraction(&self, k: usize, t: MJD) -> f64 {
        if self.times.len() == 1 {
            return 0.0;
        }
        (t - self.times[k]) / (self.times[k + 1] - self.times[k])
    }

    /// Segment used to predict at `t`.
    ///
    /// Return
    /// ----------
    /// * `(k, s)` where `k` is the index of the segment's first knot and `s` the fraction
    ///   along `[times[k], times[k+1]]`; `s < 0` or `s > 1` when extrapolating. A one-knot
    ///   trajectory always yields `(0, 0.0)`.
    pub(crate) fn segment(&self, t: MJD) -> (usize, f64) {
        let k = self
            .times
            .partition_point(|&x| x <= t)
            .saturating_sub(1)
            .min(self.segments() - 1);
        (k, self.fraction(k, t))
    }

    /// Coordinates at fraction `s` of segment `k`, before any folding over the poles.
    #[inline]
    pub(crate) fn coordinates(&self, k: usize, s: f64) -> (Hour, Degree) {
        let start = &self.positions[k];
        (
            start.ra + s * self.ra_step(k),
            start.dec + s * self.dec_step(k),
        )
    }

    /// Unit vector of the predicted position at `t`.
    pub(crate) fn predict_vector(&self, t: MJD) -> Vector3<f64> {
        let (k, s) = self.segment(t);
        let (ra, dec) = self.coordinates(k, s);
        radec_to_vector(ra, dec)
    }

    /// Predicted sky position at `t`.
    pub fn predict(&self, t: MJD) -> SkyPosition {
        let (k, s) = self.segment(t);
        let (ra, dec) = self.coordinates(k, s);
        SkyPosition::from_unfolded(ra, dec)
    }

    /// Breakpoints of `[t_lo, t_hi]`: both ends and the knot times strictly inside.
    pub(crate) fn breakpoints(&self, t_lo: MJD, t_hi: MJD) -> Breakpoints {
        let mut points = Breakpoints::new();
        points.push(t_lo);
        let first_inside = self.times.partition_point(|&x| x <= t_lo);
        points.extend(
            self.times[first_inside..]
                .iter()
                .copied()
                .take_while(|&x| x < t_hi),
        );
        points.push(t_hi);
        points
    }

    /// Cut `[t_lo, t_hi]` into pieces that each stay on one segment and, where the cap on
    /// the count allows, run no longer than [`MAX_PIECE_ARC`].
    pub(crate) fn pieces(&self, t_lo: MJD, t_hi: MJD) -> Pieces {
        let mut pieces = Pieces::new();
        for (a, b) in self.breakpoints(t_lo, t_hi).into_iter().tuple_windows() {
            let (segment, _) = self.segment((a + b) / 2.0);
            let (s0, s1) = (self.fraction(segment, a), self.fraction(segment, b));
            let length = self.path_length(&Piece { segment, s0, s1 });
            let splits = ((length / MAX_PIECE_ARC).ceil() as usize).clamp(1, MAX_PIECE_SPLITS);
            let step = (s1 - s0) / splits as f64;
            pieces.extend((0..splits).map(|j| Piece {
                segment,
                s0: s0 + step * j as f64,
                s1: if j + 1 == splits {
                    s1
                } else {
                    s0 + step * (j + 1) as f64
                },
            }));
        }
        pieces
    }

    /// Upper bound on the angular length (degrees) of the path over `piece`.
    ///
    /// The path element is `√(ddec² + (15·dra·cos dec)²)`; `|cos dec|` is bounded by its
    /// largest value over the piece's declination range.
    pub(crate) fn path_length(&self, piece: &Piece) -> Degree {
        let k = piece.segment;
        let (_, d0) = self.coordinates(k, piece.s0);
        let (_, d1) = self.coordinates(k, piece.s1);
        let cos_max = max_abs_cos(d0.min(d1), d0.max(d1));
        let rate = self
            .dec_step(k)
            .hypot(DEG_PER_HOUR * self.ra_step(k) * cos_max);
        (piece.s1 - piece.s0).abs() * rate
    }

    /// Lower bound on the distance from `center` to the path over `piece`.
    pub(crate) fn piece_closest_approach(&self, center: &Vector3<f64>, piece: &Piece) -> Degree {
        let (ra0, dec0) = self.coordinates(piece.segment, piece.s0);
        let (ra1, dec1) = self.coordinates(piece.segment, piece.s1);
        let (a, b) = (radec_to_vector(ra0, dec0), radec_to_vector(ra1, dec1));
        let length = self.path_length(piece);

        let through_ends = (angle_between(center, &a) + angle_between(center, &b) - length) / 2.0;
        match arc_deviation_bound(length, angle_between(&a, &b)) {
            Some(stray) => through_ends.max(closest_approach_on_arc(center, &a, &b) - stray),
            None => through_ends,
        }
    }

    /// Lower bound on the angular distance between `center` and the predicted path during
    /// `[t_lo, t_hi]`, in degrees.
    ///
    /// For a window reduced to one instant the value is the exact distance of the prediction.
    pub fn closest_approach(&self, center: &Vector3<f64>, t_lo: MJD, t_hi: MJD) -> Degree {
        self.pieces(t_lo, t_hi)
            .iter()
            .map(|piece| self.piece_closest_approach(center, piece))
            .fold(f64::INFINITY, f64::min)
    }
}

#[cfg(test)]
mod trajectory_test {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn equator_track() -> Trajectory {
        Trajectory::from_knots([(0.0, 23.0, 0.0), (10.0, 1.0, 0.0), (20.0, 3.0, 0.0)]).unwrap()
    }

    /// Smallest sampled distance between `center` and the prediction over `[t_lo, t_hi]`.
    fn sampled_distance(traj: &Trajectory, center: &Vector3<f64>, t_lo: MJD, t_hi: MJD) -> f64 {
        (0..=4000)
            .map(|j| t_lo + (t_hi - t_lo) * j as f64 / 4000.0)
            .map(|t| angle_between(&traj.predict_vector(t), center))
            .fold(f64::INFINITY, f64::min)
    }

    #[test]
    fn test_reject_malformed() {
        assert!(matches!(
            Trajectory::new(vec![], vec![]),
            Err(SkyMatchError::InvalidTrajectory(_))
        ));
        assert!(matches!(
            Trajectory::from_knots([(1.0, 0.0, 0.0), (1.0, 1.0, 0.0)]),
            Err(SkyMatchError::InvalidTrajectory(_))
        ));
        assert!(matches!(
            Trajectory::from_knots([(0.0, 0.0, 91.0)]),
            Err(SkyMatchError::InvalidTrajectory(_))
        ));
        assert!(matches!(
            Trajectory::new(vec![0.0, 1.0], vec![SkyPosition::new(0.0, 0.0)]),
            Err(SkyMatchError::InvalidTrajectory(_))
        ));
    }

    #[test]
    fn test_predict_at_knots_and_across_seam() {
        let traj = equator_track();
        let p = traj.predict(10.0);
        assert_abs_diff_eq!(p.ra, 1.0, epsilon = 1e-9);
        assert_abs_diff_eq!(p.dec, 0.0, epsilon = 1e-9);

        // halfway between 23h and 1h is the 0h seam, not 12h
        let mid = traj.predict(5.0);
        assert_abs_diff_eq!(
            SkyPosition::new(0.0, 0.0).angular_distance(&mid),
            0.0,
            epsilon = 1e-9
        );
        assert_abs_diff_eq!(traj.predict(2.5).ra, 23.5, epsilon = 1e-12);
    }

    #[test]
    fn test_interpolation_is_linear_in_coordinates() {
        let traj = Trajectory::from_knots([(0.0, 0.0, 0.0), (1.0, 6.0, 0.0)]).unwrap();
        assert_abs_diff_eq!(traj.predict(0.25).ra, 1.5, epsilon = 1e-12);

        let traj = Trajectory::from_knots([(0.0, 2.0, 10.0), (4.0, 4.0, 30.0)]).unwrap();
        let p = traj.predict(1.0);
        assert_abs_diff_eq!(p.ra, 2.5, epsilon = 1e-12);
        assert_abs_diff_eq!(p.dec, 15.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extrapolation_keeps_boundary_rate() {
        let traj = equator_track();
        assert_abs_diff_eq!(traj.predict(-10.0).ra, 21.0, epsilon = 1e-12);
        assert_abs_diff_eq!(traj.predict(30.0).ra, 5.0, epsilon = 1e-12);

        let slow = Trajectory::from_knots([(0.0, 0.0, 0.0), (1.0, 1.0, 0.0)]).unwrap();
        let far = slow.predict(10.0);
        assert_abs_diff_eq!(far.ra, 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(far.dec, 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_extrapolation_over_the_pole() {
        let traj = Trajectory::from_knots([(0.0, 2.0, 80.0), (1.0, 2.0, 85.0)]).unwrap();
        let p = traj.predict(3.0);
        assert_abs_diff_eq!(p.ra, 14.0, epsilon = 1e-12);
        assert_abs_diff_eq!(p.dec, 85.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_knot_is_constant() {
        let traj = Trajectory::from_knots([(5.0, 12.0, 0.0)]).unwrap();
        assert_eq!(traj.segment(100.0), (0, 0.0));
        let p = traj.predict(-50.0);
        assert_abs_diff_eq!(p.ra, 12.0, epsilon = 1e-12);
    }

    #[test]
    fn test_breakpoints() {
        let traj = equator_track();
        assert_eq!(traj.breakpoints(5.0, 15.0).as_slice(), &[5.0, 10.0, 15.0]);
        assert_eq!(traj.breakpoints(10.0, 20.0).as_slice(), &[10.0, 20.0]);
        assert_eq!(
            traj.breakpoints(-1.0, 25.0).as_slice(),
            &[-1.0, 0.0, 10.0, 20.0, 25.0]
        );
        assert_eq!(traj.breakpoints(7.0, 7.0).as_slice(), &[7.0, 7.0]);
    }

    #[test]
    fn test_pieces_cover_the_window() {
        // 15° per day along the equator
        let traj = Trajectory::from_knots([(0.0, 0.0, 0.0), (1.0, 1.0, 0.0)]).unwrap();
        let pieces = traj.pieces(0.0, 1.0);
        assert_eq!(pieces.len(), 8);
        assert_eq!(pieces[0].s0, 0.0);
        assert_eq!(pieces[7].s1, 1.0);
        for (a, b) in pieces.iter().tuple_windows() {
            assert_eq!(a.s1, b.s0);
        }
        assert!(pieces.iter().all(|p| traj.path_length(p) <= MAX_PIECE_ARC + 1e-9));

        let traj = equator_track();
        let segments: Vec<usize> = traj.pieces(-1.0, 12.0).iter().map(|p| p.segment).collect();
        assert_eq!(segments.first(), Some(&0));
        assert_eq!(segments.last(), Some(&1));
    }

    #[test]
    fn test_closest_approach_window() {
        let traj = equator_track();
        let c = SkyPosition::new(0.0, 2.0).to_unit_vector();
        let bound = traj.closest_approach(&c, 0.0, 20.0);
        assert!(bound <= 2.0 + 1e-12);
        assert_abs_diff_eq!(bound, 2.0, epsilon = 1e-6);
        // restricted to [10, 20] the path runs from 1h to 3h: nearest point is 1h
        let expected = SkyPosition::new(1.0, 0.0).angular_distance(&SkyPosition::new(0.0, 2.0));
        assert_abs_diff_eq!(
            traj.closest_approach(&c, 10.0, 20.0),
            expected,
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_closest_approach_at_one_instant_is_exact() {
        let traj = Trajectory::from_knots([(0.0, 1.0, 40.0), (2.0, 3.0, 50.0)]).unwrap();
        let c = SkyPosition::new(2.5, 41.0).to_unit_vector();
        for t in [-1.0, 0.0, 0.7, 2.0, 3.5] {
            assert_abs_diff_eq!(
                traj.closest_approach(&c, t, t),
                angle_between(&traj.predict_vector(t), &c),
                epsilon = 1e-12
            );
        }
    }

    #[test]
    fn test_closest_approach_bounds_curved_path() {
        // constant declination 60°: a small circle, not a great-circle arc
        let traj = Trajectory::from_knots([(0.0, 1.0, 60.0), (1.0, 4.0, 60.0)]).unwrap();
        let centers = [
            SkyPosition::new(2.5, 60.0),
            SkyPosition::new(2.5, 64.0),
            SkyPosition::new(2.5, 57.0),
            SkyPosition::new(6.0, 50.0),
            SkyPosition::new(14.0, 20.0),
        ];
        for center in centers {
            let c = center.to_unit_vector();
            for (t_lo, t_hi) in [(0.0, 1.0), (0.2, 0.6), (-0.5, 1.5)] {
                let bound = traj.closest_approach(&c, t_lo, t_hi);
                let sampled = sampled_distance(&traj, &c, t_lo, t_hi);
                assert!(bound <= sampled + 1e-9, "{center:?}: {bound} > {sampled}");
                assert!(bound >= sampled - 0.1, "{center:?}: {bound} too loose");
            }
        }
    }
}
