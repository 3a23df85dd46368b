use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{
    orbit::{OrbitElement, ORBIT_DIMS},
    skymatch_errors::SkyMatchError,
};

/// Configuration of [`OrbitTree`](crate::orbit_tree::OrbitTree) construction.
///
/// Fields
/// -----------------
/// * `weights` – importance of each search dimension when choosing a split, in
///   [`OrbitElement::ALL`] order. Weights are divided by the global spread of their dimension
///   before use, so they are unit-free.
/// * `leaf_size` – nodes holding at most this many orbits become leaves.
///
/// Defaults
/// -----------------
/// * `weights`: `[1, 1, 1, 1, 1, 0]`. The perihelion time is left out: its matches are
///   periodic, so it is handled by the leaf test rather than by the tree shape.
/// * `leaf_size`: 16
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitTreeParams {
    pub weights: [f64; ORBIT_DIMS],
    pub leaf_size: usize,
}

impl OrbitTreeParams {
    /// Construct a new [`OrbitTreeParams`] with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an [`OrbitTreeParamsBuilder`] initialized with the defaults.
    ///
    /// # Example
    ///
    /// ```rust
    /// use skymatch::{orbit::OrbitElement, orbit_tree::OrbitTreeParams};
    ///
    /// let params = OrbitTreeParams::builder()
    ///     .weight(OrbitElement::Eccentricity, 2.0)
    ///     .build()
    ///     .unwrap();
    /// assert_eq!(params.weights[1], 2.0);
    /// ```
    pub fn builder() -> OrbitTreeParamsBuilder {
        OrbitTreeParamsBuilder::new()
    }

    /// Check the parameters: every weight finite and `≥ 0`, `leaf_size ≥ 1`.
    pub fn validate(&self) -> Result<(), SkyMatchError> {
        if let Some(dim) = OrbitElement::ALL
            .iter()
            .find(|dim| !(self.weights[dim.index()].is_finite() && self.weights[dim.index()] >= 0.0))
        {
            return Err(SkyMatchError::InvalidParameter(format!(
                "weight of {dim:?} must be finite and non-negative"
            )));
        }
        if self.leaf_size == 0 {
            return Err(SkyMatchError::InvalidParameter(
                "leaf_size must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for OrbitTreeParams {
    fn default() -> Self {
        OrbitTreeParams {
            weights: [1.0, 1.0, 1.0, 1.0, 1.0, 0.0],
            leaf_size: 16,
        }
    }
}

/// Builder for [`OrbitTreeParams`], with validation.
#[derive(Debug, Clone, Default)]
pub struct OrbitTreeParamsBuilder {
    params: OrbitTreeParams,
}

impl OrbitTreeParamsBuilder {
    pub fn new() -> Self {
        Self {
            params: OrbitTreeParams::default(),
        }
    }

    pub fn weights(mut self, v: [f64; ORBIT_DIMS]) -> Self {
        self.params.weights = v;
        self
    }
    pub fn weight(mut self, dim: OrbitElement, v: f64) -> Self {
        self.params.weights[dim.index()] = v;
        self
    }
    pub fn leaf_size(mut self, v: usize) -> Self {
        self.params.leaf_size = v;
        self
    }

    /// Finalize the builder, see [`OrbitTreeParams::validate`].
    pub fn build(self) -> Result<OrbitTreeParams, SkyMatchError> {
        self.params.validate()?;
        Ok(self.params)
    }
}

impl fmt::Display for OrbitTreeParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let w = &self.weights;
        if f.alternate() {
            writeln!(f, "Orbit tree parameters")?;
            writeln!(f, "---------------------")?;
            for dim in OrbitElement::ALL {
                writeln!(f, "  {:<20} weight = {:.3}", format!("{dim:?}"), w[dim.index()])?;
            }
            write!(f, "  leaf_size = {}", self.leaf_size)
        } else {
            write!(
                f,
                "OrbitTreeParams(w=[{:.3}, {:.3}, {:.3}, {:.3}, {:.3}, {:.3}], leaf_size={})",
                w[0], w[1], w[2], w[3], w[4], w[5], self.leaf_size
            )
        }
    }
}

#[cfg(test)]
mod orbit_tree_params_test {
    use super::*;

    #[test]
    fn test_default_excludes_perihelion_time() {
        let params = OrbitTreeParams::default();
        assert_eq!(params.weights[OrbitElement::PerihelionTime.index()], 0.0);
        assert_eq!(
            params.to_string(),
            "OrbitTreeParams(w=[1.000, 1.000, 1.000, 1.000, 1.000, 0.000], leaf_size=16)"
        );
    }

    #[test]
    fn test_rejects_negative_weight() {
        assert_eq!(
            OrbitTreeParams::builder()
                .weight(OrbitElement::Inclination, -0.5)
                .build(),
            Err(SkyMatchError::InvalidParameter(
                "weight of Inclination must be finite and non-negative".into()
            ))
        );
        assert!(OrbitTreeParams::builder().leaf_size(0).build().is_err());
    }
}
