use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{constants::MJD, skymatch_errors::SkyMatchError};

/// Configuration of [`TrajectoryTree`](crate::trajectory_tree::TrajectoryTree) construction.
///
/// Fields
/// -----------------
/// * `time_window` – usable time span `(ts, te)` in MJD. Node radii and the widest knot are
///   computed over the knots inside this span (plus the knots bracketing its ends). `None`
///   uses the full knot span of the trajectories.
/// * `leaf_size` – nodes holding at most this many trajectories become leaves.
/// * `split_all` – choose split anchors with the full-window distance (quadratic in the node
///   size) instead of the distance at the widest knot only.
///
/// Defaults
/// -----------------
/// * `time_window`: `None`
/// * `leaf_size`: 8
/// * `split_all`: `false`
///
/// The widest-knot mode is usually enough: the knot where members disagree the most is also
/// where a split reduces the radius the most. `split_all` pays off on trajectories that cross
/// each other inside the window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryTreeParams {
    pub time_window: Option<(MJD, MJD)>,
    pub leaf_size: usize,
    pub split_all: bool,
}

impl TrajectoryTreeParams {
    /// Construct a new [`TrajectoryTreeParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`TrajectoryTreeParamsBuilder`] initialized with the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use skymatch::trajectory_tree::TrajectoryTreeParams;
    ///
    /// let params = TrajectoryTreeParams::builder()
    ///     .time_window(60000.0, 60010.0)
    ///     .split_all(true)
    ///     .build()
    ///     .unwrap();
    /// assert!(params.split_all);
    /// ```
    pub fn builder() -> TrajectoryTreeParamsBuilder {
        TrajectoryTreeParamsBuilder::new()
    }

    /// Check the parameters.
    ///
    /// Validation rules
    /// -----------------
    /// * `leaf_size ≥ 1`;
    /// * a time window must have finite ends with `ts ≤ te`.
    pub fn validate(&self) -> Result<(), SkyMatchError> {
        if self.leaf_size == 0 {
            return Err(SkyMatchError::InvalidParameter(
                "leaf_size must be >= 1".into(),
            ));
        }
        if let Some((ts, te)) = self.time_window {
            if !(ts.is_finite() && te.is_finite() && ts <= te) {
                return Err(SkyMatchError::InvalidParameter(
                    "time_window requires finite ts <= te".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for TrajectoryTreeParams {
    fn default() -> Self {
        TrajectoryTreeParams {
            time_window: None,
            leaf_size: 8,
            split_all: false,
        }
    }
}

/// Builder for [`TrajectoryTreeParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct TrajectoryTreeParamsBuilder {
    params: TrajectoryTreeParams,
}

impl TrajectoryTreeParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: TrajectoryTreeParams::default(),
        }
    }

    pub fn time_window(mut self, ts: MJD, te: MJD) -> Self {
        self.params.time_window = Some((ts, te));
        self
    }
    pub fn full_window(mut self) -> Self {
        self.params.time_window = None;
        self
    }
    pub fn leaf_size(mut self, v: usize) -> Self {
        self.params.leaf_size = v;
        self
    }
    pub fn split_all(mut self, v: bool) -> Self {
        self.params.split_all = v;
        self
    }

    /// Finalize the builder, see [`TrajectoryTreeParams::validate`].
    pub fn build(self) -> Result<TrajectoryTreeParams, SkyMatchError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for TrajectoryTreeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let window = match self.time_window {
            Some((ts, te)) => format!("[{ts:.5}, {te:.5}]"),
            None => "full".to_string(),
        };
        if f.alternate() {
            writeln!(f, "Trajectory tree parameters")?;
            writeln!(f, "--------------------------")?;
            writeln!(f, "  time_window = {window}")?;
            writeln!(f, "  leaf_size   = {}", self.leaf_size)?;
            write!(f, "  split_all   = {}", self.split_all)
        } else {
            write!(
                f,
                "TrajectoryTreeParams(window={window}, leaf_size={}, split_all={})",
                self.leaf_size, self.split_all
            )
        }
    }
}
