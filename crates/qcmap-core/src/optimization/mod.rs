//! The constrained line search and its supporting buffers.

pub mod line_search;
pub mod workspace;

pub use line_search::{
    coefficient_within_open_disk, mapping_within_closed_disk, BacktrackingLineSearch,
    LineSearchParams, LineSearchSummary, SearchDirection, SearchState, TerminationRule,
    TrialOutcome, STEP_DECREASE_FACTOR, STEP_INCREASE_FACTOR,
};
pub use workspace::LineSearchWorkspace;
