//! Box selection and 3D packing for parcel shipments.
//!
//! Items are expanded into single units, placed with an extreme point
//! heuristic and assigned to the smallest suitable box of a catalog, or
//! spread over several boxes when one is not enough.

pub mod api;
pub mod catalog;
pub mod config;
pub mod extreme_points;
pub mod geometry;
pub mod grouping;
pub mod model;
pub mod optimizer;
pub mod scoring;
pub mod types;
