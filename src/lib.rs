//! # skymatch
//!
//! Bounding-ball trees and pruned proximity searches over three kinds of astronomical items:
//!
//! * [`Region`] – a sky disc observed at one epoch (a plate), indexed by [`RegionTree`];
//! * [`Trajectory`] – a piecewise-linear predicted path, indexed by [`TrajectoryTree`];
//! * [`Orbit`] – a cometary element set, indexed by [`OrbitTree`].
//!
//! Every tree search returns exactly what the brute-force search of
//! [`search::exhaustive`] returns, only faster.
//!
//! ```rust
//! use skymatch::{Region, RegionTree, RegionTreeParams, Trajectory};
//!
//! let regions = vec![Region::new(1, 60000.0, 12.0, 0.0, 1.0)];
//! let tree = RegionTree::build(&regions, &RegionTreeParams::default()).unwrap();
//! let path = Trajectory::from_knots([(60000.0, 12.0, 0.0)]).unwrap();
//! assert_eq!(tree.search_trajectory(&path, 0.0), vec![0]);
//! ```
pub mod constants;
pub mod geometry;
pub mod orbit;
pub mod orbit_tree;
pub mod region;
pub mod region_tree;
pub mod search;
pub mod skymatch_errors;
pub mod trajectory;
pub mod trajectory_tree;
pub mod tree_node;

pub use constants::ObjectNumber;
pub use geometry::SkyPosition;
pub use orbit::{Orbit, OrbitElement, OrbitThresholds};
pub use orbit_tree::{OrbitTree, OrbitTreeParams};
pub use region::Region;
pub use region_tree::{RegionTree, RegionTreeParams};
pub use search::{dual_tree_search, invert_matches, MatchLists, SearchStats};
pub use skymatch_errors::SkyMatchError;
pub use trajectory::Trajectory;
pub use trajectory_tree::{TrajectoryTree, TrajectoryTreeParams};
pub use tree_node::TreeStats;
