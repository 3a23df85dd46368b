use thiserror::Error;

#[derive(Error, Debug)]
pub enum SkyMatchError {
    #[error("Cannot build a {0} tree over an empty collection")]
    EmptyCollection(&'static str),

    #[error("Invalid trajectory: {0}")]
    InvalidTrajectory(String),

    #[error(
        "Trajectory {index} does not share the knot times of trajectory 0 (expected {expected} knots, found {found})"
    )]
    MisalignedKnots {
        index: usize,
        expected: usize,
        found: usize,
    },

    #[error("Invalid region at index {0} (non-finite value, |dec| > 90 or negative radius)")]
    InvalidRegion(usize),

    #[error("Invalid orbit at index {0} (non-finite element, q <= 0 or e < 0)")]
    InvalidOrbit(usize),

    #[error("Invalid tree parameter: {0}")]
    InvalidParameter(String),
}

impl PartialEq for SkyMatchError {
    fn eq(&self, other: &Self) -> bool {
        use SkyMatchError::*;
        match (self, other) {
            (EmptyCollection(a), EmptyCollection(b)) => a == b,
            (InvalidTrajectory(a), InvalidTrajectory(b)) => a == b,
            (
                MisalignedKnots {
                    index: a,
                    expected: ea,
                    found: fa,
                },
                MisalignedKnots {
                    index: b,
                    expected: eb,
                    found: fb,
                },
            ) => a == b && ea == eb && fa == fb,
            (InvalidRegion(a), InvalidRegion(b)) => a == b,
            (InvalidOrbit(a), InvalidOrbit(b)) => a == b,
            (InvalidParameter(a), InvalidParameter(b)) => a == b,
            _ => false,
        }
    }
}
