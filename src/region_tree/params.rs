use std::fmt;

use serde::{Deserialize, Serialize};

use crate::skymatch_errors::SkyMatchError;

/// Configuration of [`RegionTree`](crate::region_tree::RegionTree) construction.
///
/// Fields
/// -----------------
/// * `time_weight` – preference for splitting on time (per day of half-spread).
/// * `ra_weight` – preference for splitting on right ascension (per degree of
///   `cos(dec)`-scaled half-spread).
/// * `dec_weight` – preference for splitting on declination (per degree of half-spread).
/// * `leaf_size` – nodes holding at most this many plates become leaves.
///
/// Defaults
/// -----------------
/// * weights: `1.0`, `1.0`, `1.0`
/// * `leaf_size`: 16
///
/// A weight of `0.0` removes its axis from the split choice. With every weight at zero the
/// tree degenerates into a single leaf, which is valid but never prunes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionTreeParams {
    pub time_weight: f64,
    pub ra_weight: f64,
    pub dec_weight: f64,
    pub leaf_size: usize,
}

impl RegionTreeParams {
    /// Construct a new [`RegionTreeParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a [`RegionTreeParamsBuilder`] initialized with the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use skymatch::region_tree::RegionTreeParams;
    ///
    /// let params = RegionTreeParams::builder()
    ///     .time_weight(0.5)
    ///     .leaf_size(8)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.leaf_size, 8);
    /// ```
    pub fn builder() -> RegionTreeParamsBuilder {
        RegionTreeParamsBuilder::new()
    }

    /// Check the parameters.
    ///
    /// Validation rules
    /// -----------------
    /// * every weight is finite and `≥ 0` (NaN is rejected);
    /// * `leaf_size ≥ 1`.
    pub fn validate(&self) -> Result<(), SkyMatchError> {
        for (name, w) in [
            ("time_weight", self.time_weight),
            ("ra_weight", self.ra_weight),
            ("dec_weight", self.dec_weight),
        ] {
            if !(w.is_finite() && w >= 0.0) {
                return Err(SkyMatchError::InvalidParameter(format!(
                    "{name} must be finite and non-negative"
                )));
            }
        }
        if self.leaf_size == 0 {
            return Err(SkyMatchError::InvalidParameter(
                "leaf_size must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for RegionTreeParams {
    fn default() -> Self {
        RegionTreeParams {
            time_weight: 1.0,
            ra_weight: 1.0,
            dec_weight: 1.0,
            leaf_size: 16,
        }
    }
}

/// Builder for [`RegionTreeParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct RegionTreeParamsBuilder {
    params: RegionTreeParams,
}

impl RegionTreeParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: RegionTreeParams::default(),
        }
    }

    pub fn time_weight(mut self, v: f64) -> Self {
        self.params.time_weight = v;
        self
    }
    pub fn ra_weight(mut self, v: f64) -> Self {
        self.params.ra_weight = v;
        self
    }
    pub fn dec_weight(mut self, v: f64) -> Self {
        self.params.dec_weight = v;
        self
    }
    pub fn leaf_size(mut self, v: usize) -> Self {
        self.params.leaf_size = v;
        self
    }

    /// Finalize the builder, see [`RegionTreeParams::validate`].
    pub fn build(self) -> Result<RegionTreeParams, SkyMatchError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for RegionTreeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Region tree parameters")?;
            writeln!(f, "----------------------")?;
            writeln!(f, "  time_weight = {:.3}   (per day)", self.time_weight)?;
            writeln!(f, "  ra_weight   = {:.3}   (per degree)", self.ra_weight)?;
            writeln!(f, "  dec_weight  = {:.3}   (per degree)", self.dec_weight)?;
            write!(f, "  leaf_size   = {}", self.leaf_size)
        } else {
            write!(
                f,
                "RegionTreeParams(w_t={:.3}, w_ra={:.3}, w_dec={:.3}, leaf_size={})",
                self.time_weight, self.ra_weight, self.dec_weight, self.leaf_size
            )
        }
    }
}
