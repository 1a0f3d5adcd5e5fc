//! Energy functional interface for the mapping optimizer.
//!
//! The line search treats the energy as a black box: a pure, deterministic
//! function of the coefficient field and the mapping that also produces two
//! per-vertex auxiliaries, a 3D embedding of the mapped surface and a scalar
//! growth factor field. Evaluators that interpolate against reference data
//! own their interpolant; the search never sees it.
//!
//! # Example
//!
//! ```rust,ignore
//! let fx = energy.evaluate(&mu, &w, EnergyFlags::default(), &mut map3d, &mut gamma)?;
//! ```

use crate::core::error::Result;
use crate::core::types::{CplxVector, DVector, Embedding, Scalar};
use std::fmt::Debug;

/// Selects which terms of the energy functional are computed.
///
/// Disabling a term skips its (potentially expensive) evaluation; the
/// corresponding contribution is treated as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyFlags {
    /// Compute the growth-mismatch term.
    pub growth: bool,
    /// Compute the coefficient-regularization term.
    pub coefficient: bool,
}

impl Default for EnergyFlags {
    fn default() -> Self {
        Self {
            growth: true,
            coefficient: true,
        }
    }
}

impl EnergyFlags {
    /// Both terms enabled.
    pub fn all() -> Self {
        Self::default()
    }

    /// Only the growth-mismatch term.
    pub fn growth_only() -> Self {
        Self {
            growth: true,
            coefficient: false,
        }
    }

    /// Only the coefficient-regularization term.
    pub fn coefficient_only() -> Self {
        Self {
            growth: false,
            coefficient: true,
        }
    }
}

/// The energy functional consumed by the line search.
///
/// # Contract
///
/// `evaluate` must be pure and deterministic given its inputs. It writes the
/// 3D embedding of the mapped surface into `embedding` (one row per vertex)
/// and the auxiliary growth factor field into `gamma`, overwriting any prior
/// contents; both buffers are sized by the caller. The returned scalar is the
/// total energy of the enabled terms.
pub trait EnergyFunction<T: Scalar>: Debug {
    /// Evaluates the energy at the given candidate state.
    fn evaluate(
        &self,
        coefficient: &CplxVector<T>,
        mapping: &CplxVector<T>,
        flags: EnergyFlags,
        embedding: &mut Embedding<T>,
        gamma: &mut DVector<T>,
    ) -> Result<T>;
}

/// Wrapper that counts energy evaluations.
///
/// Useful for verifying how many trials a line search spent.
#[derive(Debug)]
pub struct CountingEnergy<E> {
    /// The underlying energy functional
    pub inner: E,
    /// Number of evaluations performed
    pub eval_count: std::cell::RefCell<usize>,
}

impl<E> CountingEnergy<E> {
    /// Creates a new counting wrapper around an energy functional.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            eval_count: std::cell::RefCell::new(0),
        }
    }

    /// Resets the counter to zero.
    pub fn reset_count(&self) {
        *self.eval_count.borrow_mut() = 0;
    }

    /// Returns the current evaluation count.
    pub fn count(&self) -> usize {
        *self.eval_count.borrow()
    }
}

impl<T, E> EnergyFunction<T> for CountingEnergy<E>
where
    T: Scalar,
    E: EnergyFunction<T>,
{
    fn evaluate(
        &self,
        coefficient: &CplxVector<T>,
        mapping: &CplxVector<T>,
        flags: EnergyFlags,
        embedding: &mut Embedding<T>,
        gamma: &mut DVector<T>,
    ) -> Result<T> {
        *self.eval_count.borrow_mut() += 1;
        self.inner
            .evaluate(coefficient, mapping, flags, embedding, gamma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::DiskSpringEnergy;
    use nalgebra::Complex;

    #[test]
    fn test_energy_flags() {
        let flags = EnergyFlags::default();
        assert!(flags.growth && flags.coefficient);
        assert!(!EnergyFlags::growth_only().coefficient);
        assert!(!EnergyFlags::coefficient_only().growth);
    }

    #[test]
    fn test_counting_energy() {
        let energy = CountingEnergy::new(DiskSpringEnergy::default());
        let mu = CplxVector::<f64>::zeros(3);
        let w = CplxVector::from_element(3, Complex::new(0.1, 0.0));
        let mut embedding = Embedding::zeros(3);
        let mut gamma = DVector::zeros(3);

        assert_eq!(energy.count(), 0);
        energy
            .evaluate(&mu, &w, EnergyFlags::all(), &mut embedding, &mut gamma)
            .unwrap();
        energy
            .evaluate(&mu, &w, EnergyFlags::all(), &mut embedding, &mut gamma)
            .unwrap();
        assert_eq!(energy.count(), 2);

        energy.reset_count();
        assert_eq!(energy.count(), 0);
    }
}
