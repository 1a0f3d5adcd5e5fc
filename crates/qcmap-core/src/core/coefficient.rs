//! Packing transform between the real parameter vector and the complex
//! coefficient field.
//!
//! The outer optimizer works on a real unknown vector of length `2V`: the
//! first `V` entries hold the real parts of the per-vertex coefficient, the
//! last `V` entries the imaginary parts. The line search reconstructs the
//! complex field from every trial parameter vector through [`unpack_into`].

use nalgebra::Complex;

use crate::core::error::{MappingError, Result};
use crate::core::types::{CplxVector, DVector, Scalar};

/// Reconstructs the complex coefficient field from a packed real vector,
/// writing into a preallocated buffer.
///
/// # Errors
///
/// Returns [`MappingError::DimensionMismatch`] if `x` has odd length or
/// `coefficient` does not hold exactly `x.len() / 2` entries.
pub fn unpack_into<T: Scalar>(x: &DVector<T>, coefficient: &mut CplxVector<T>) -> Result<()> {
    if x.len() % 2 != 0 {
        return Err(MappingError::dimension_mismatch(
            "even parameter length",
            x.len(),
        ));
    }
    let n = x.len() / 2;
    if coefficient.len() != n {
        return Err(MappingError::dimension_mismatch(n, coefficient.len()));
    }
    for v in 0..n {
        coefficient[v] = Complex::new(x[v], x[n + v]);
    }
    Ok(())
}

/// Reconstructs the complex coefficient field from a packed real vector.
///
/// Allocating variant of [`unpack_into`].
pub fn unpack<T: Scalar>(x: &DVector<T>) -> Result<CplxVector<T>> {
    let mut coefficient = CplxVector::zeros(x.len() / 2);
    unpack_into(x, &mut coefficient)?;
    Ok(coefficient)
}

/// Packs a complex coefficient field into the stacked real representation.
pub fn pack<T: Scalar>(coefficient: &CplxVector<T>) -> DVector<T> {
    let n = coefficient.len();
    DVector::from_fn(2 * n, |i, _| {
        if i < n {
            coefficient[i].re
        } else {
            coefficient[i - n].im
        }
    })
}
