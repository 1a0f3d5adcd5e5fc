//! Constrained line search for quasiconformal surface mapping optimization.
//!
//! This crate implements the inner step-length search of a quasiconformal
//! surface-mapping optimizer. Given a candidate solution (a packed Beltrami
//! coefficient parameter vector and a complex planar mapping of a
//! triangulated surface) and a descent direction, it backtracks a step length
//! until the candidate is geometrically admissible and satisfies a
//! configurable sufficient-decrease condition.
//!
//! # Key Concepts
//!
//! - **Coefficient field**: per-vertex complex Beltrami coefficient; must
//!   stay strictly inside the unit disk for a valid conformal structure.
//! - **Mapping**: per-vertex complex planar position; boundary vertices stay
//!   on or inside the unit disk, fixed points are pinned exactly.
//! - **Feasibility filter**: coefficient bound, mapping bound, and optional
//!   self-intersection test of the 3D lift, checked before the energy.
//! - **Termination policy**: none / monotone decrease / Armijo sufficient
//!   decrease, with a shared iteration and step-bound failure budget.
//!
//! # Modules
//!
//! - [`core`]: scalars, errors, mesh connectivity, the coefficient packing
//!   transform, and the energy functional interface
//! - [`geometry`]: unit-disk clipping and self-intersection testing
//! - [`optimization`]: the backtracking line search and its workspace

pub mod core;
pub mod geometry;
pub mod optimization;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export commonly used items at the crate root
pub use crate::core::error::{LineSearchError, MappingError, Result, SearchResult};

/// Prelude module for convenient imports.
///
/// # Example
/// ```
/// use qcmap_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::core::coefficient::{pack, unpack, unpack_into};
    pub use crate::core::energy::{CountingEnergy, EnergyFlags, EnergyFunction};
    pub use crate::core::error::{LineSearchError, MappingError, Result, SearchResult};
    pub use crate::core::mesh::SurfaceMesh;
    pub use crate::core::types::{CplxVector, DMatrix, DVector, Embedding, Scalar};
    pub use crate::geometry::clip::clip_to_unit_disk;
    pub use crate::geometry::intersection::{
        lift_to_embedding, SegmentOverlapOracle, SelfIntersectionOracle,
    };
    pub use crate::optimization::line_search::{
        coefficient_within_open_disk, mapping_within_closed_disk, BacktrackingLineSearch,
        LineSearchParams, LineSearchSummary, SearchDirection, SearchState, TerminationRule,
        TrialOutcome, STEP_DECREASE_FACTOR, STEP_INCREASE_FACTOR,
    };
    pub use crate::optimization::workspace::LineSearchWorkspace;
}
