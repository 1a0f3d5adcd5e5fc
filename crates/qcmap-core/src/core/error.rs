//! Error types for mapping and line search operations.
//!
//! This module defines the core error types used throughout the library:
//! [`MappingError`] for mesh, coefficient, and energy evaluation failures,
//! and [`LineSearchError`] for the fatal outcomes of the backtracking line
//! search itself.

use thiserror::Error;

/// Errors that can occur while manipulating meshes, coefficient fields, or
/// evaluating the energy functional.
#[derive(Debug, Clone, Error)]
pub enum MappingError {
    /// Dimension mismatch between vectors or between a vector and the mesh.
    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Expected dimensions
        expected: String,
        /// Actual dimensions
        actual: String,
    },

    /// The mesh connectivity is malformed.
    ///
    /// This error occurs when face or boundary indices refer to vertices
    /// outside the mesh, or when a face is degenerate.
    #[error("Invalid mesh: {reason}")]
    InvalidMesh {
        /// Description of why the mesh is invalid
        reason: String,
    },

    /// Numerical instability detected.
    #[error("Numerical instability detected: {reason}")]
    NumericalError {
        /// Description of the numerical issue
        reason: String,
    },
}

impl MappingError {
    /// Create a DimensionMismatch error.
    pub fn dimension_mismatch<S1, S2>(expected: S1, actual: S2) -> Self
    where
        S1: std::fmt::Display,
        S2: std::fmt::Display,
    {
        Self::DimensionMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }

    /// Create an InvalidMesh error with a custom reason.
    pub fn invalid_mesh<S: Into<String>>(reason: S) -> Self {
        Self::InvalidMesh {
            reason: reason.into(),
        }
    }

    /// Create a NumericalError with a custom reason.
    pub fn numerical_error<S: Into<String>>(reason: S) -> Self {
        Self::NumericalError {
            reason: reason.into(),
        }
    }
}

/// Fatal outcomes of the backtracking line search.
///
/// Geometric infeasibility and NaN/infinite trial energies are *not* errors;
/// they shrink the step and retry. Only precondition violations and budget
/// exhaustion surface to the caller.
#[derive(Debug, Clone, Error)]
pub enum LineSearchError {
    /// The initial step length handed to the search was negative.
    #[error("Initial step length must be non-negative, got {step}")]
    NegativeStep {
        /// The offending step length
        step: f64,
    },

    /// The supplied direction does not decrease the energy.
    #[error("Search direction is not a descent direction (directional derivative {derivative})")]
    NotDescentDirection {
        /// Projection of the gradient onto the search direction
        derivative: f64,
    },

    /// The retry budget was exhausted without an accepted step.
    #[error("Line search reached the maximum number of iterations ({max_line_search})")]
    MaxIterationsExceeded {
        /// Configured iteration cap
        max_line_search: usize,
        /// Step length at the point of failure
        last_step: f64,
    },

    /// The step length shrank below the configured minimum.
    #[error("Line search step {step} became smaller than the minimum allowed value {min_step}")]
    StepUnderflow {
        /// Step length at the point of failure
        step: f64,
        /// Configured lower bound
        min_step: f64,
    },

    /// The step length exceeded the configured maximum.
    #[error("Line search step {step} became larger than the maximum allowed value {max_step}")]
    StepOverflow {
        /// Step length at the point of failure
        step: f64,
        /// Configured upper bound
        max_step: f64,
    },

    /// The line search parameters are out of range.
    #[error("Invalid line search configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the configuration error
        reason: String,
    },

    /// Propagated mapping error from a collaborator.
    #[error("Mapping operation failed: {0}")]
    Mapping(#[from] MappingError),
}

impl LineSearchError {
    /// Create a NegativeStep error.
    pub fn negative_step(step: f64) -> Self {
        Self::NegativeStep { step }
    }

    /// Create a NotDescentDirection error.
    pub fn not_descent_direction(derivative: f64) -> Self {
        Self::NotDescentDirection { derivative }
    }

    /// Create a MaxIterationsExceeded error.
    pub fn max_iterations_exceeded(max_line_search: usize, last_step: f64) -> Self {
        Self::MaxIterationsExceeded {
            max_line_search,
            last_step,
        }
    }

    /// Create a StepUnderflow error.
    pub fn step_underflow(step: f64, min_step: f64) -> Self {
        Self::StepUnderflow { step, min_step }
    }

    /// Create a StepOverflow error.
    pub fn step_overflow(step: f64, max_step: f64) -> Self {
        Self::StepOverflow { step, max_step }
    }

    /// Create an InvalidConfiguration error.
    pub fn invalid_configuration<S: Into<String>>(reason: S) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }
}

/// Result type alias for operations that can produce MappingError.
pub type Result<T> = std::result::Result<T, MappingError>;

/// Result type alias for line search operations.
pub type SearchResult<T> = std::result::Result<T, LineSearchError>;
