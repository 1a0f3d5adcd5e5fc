//! Geometric predicates and projections used by the feasibility filter.

pub mod clip;
pub mod intersection;

pub use clip::clip_to_unit_disk;
pub use intersection::{lift_to_embedding, SegmentOverlapOracle, SelfIntersectionOracle};
