//! Type definitions and aliases for quasiconformal mapping optimization.
//!
//! This module provides the scalar abstraction over f32/f64, the vector and
//! matrix aliases used throughout the library, and the numerical constants
//! that bound the line search.

use nalgebra::{Complex, Dyn, OMatrix, OVector, RealField, Scalar as NalgebraScalar, U3};
use num_traits::{Float, FromPrimitive};
use std::fmt::{Debug, Display};

/// Trait for scalar types used in optimization (f32 or f64).
///
/// This trait combines the numeric traits required by the mapping and
/// line-search code: nalgebra's field structure for vector arithmetic and
/// num-traits' `Float` for NaN/infinity classification and elementary
/// functions.
pub trait Scalar:
    NalgebraScalar
    + RealField
    + Float
    + FromPrimitive
    + Display
    + Debug
    + Default
    + Copy
    + Send
    + Sync
    + 'static
{
    /// Machine epsilon for this scalar type.
    const EPSILON: Self;

    /// Default Armijo sufficient-decrease fraction.
    const DEFAULT_FTOL: Self;

    /// Default lower bound on the line search step length.
    const MIN_STEP: Self;

    /// Default upper bound on the line search step length.
    const MAX_STEP: Self;

    /// Convert from f64 (for constants).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails. Use `try_from_f64` for a non-panicking
    /// version.
    fn from_f64(v: f64) -> Self {
        <Self as FromPrimitive>::from_f64(v).expect("Failed to convert from f64")
    }

    /// Try to convert from f64.
    ///
    /// Returns None if the conversion fails.
    fn try_from_f64(v: f64) -> Option<Self> {
        <Self as FromPrimitive>::from_f64(v)
    }

    /// Convert to f64 (for error reporting/display).
    ///
    /// # Panics
    ///
    /// Panics if the conversion fails.
    fn to_f64(self) -> f64 {
        num_traits::cast(self).expect("Failed to convert to f64")
    }
}

impl Scalar for f32 {
    const EPSILON: Self = f32::EPSILON;
    const DEFAULT_FTOL: Self = 1e-4;
    const MIN_STEP: Self = 1e-10;
    const MAX_STEP: Self = 1e10;
}

impl Scalar for f64 {
    const EPSILON: Self = f64::EPSILON;
    const DEFAULT_FTOL: Self = 1e-4;
    const MIN_STEP: Self = 1e-20;
    const MAX_STEP: Self = 1e20;
}

/// Type alias for a dynamically-sized real vector.
pub type DVector<T> = OVector<T, Dyn>;

/// Type alias for a dynamically-sized real matrix.
pub type DMatrix<T> = OMatrix<T, Dyn, Dyn>;

/// Type alias for a per-vertex complex field (coefficient field or planar
/// mapping), indexed by vertex.
pub type CplxVector<T> = OVector<Complex<T>, Dyn>;

/// Type alias for a 3D embedding of the planar mapping: one row per vertex,
/// columns are (x, y, z).
pub type Embedding<T> = OMatrix<T, Dyn, U3>;
