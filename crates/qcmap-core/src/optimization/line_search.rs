//! Constrained backtracking line search for quasiconformal mapping descent.
//!
//! Given the current coefficient parameter vector and planar mapping together
//! with a descent direction, the search finds a step length `α` such that the
//! candidate
//!
//! ```text
//! x(α) = x₀ + α·drt        (parameter space)
//! w(α) = w₀ + α·dw         (mapping space, boundary clipped, fixed points pinned)
//! ```
//!
//! is geometrically admissible and satisfies the configured sufficient
//! decrease condition, halving `α` whenever either test fails.
//!
//! # Admissibility
//!
//! A candidate is admissible iff all of the following hold, checked in order
//! of increasing cost:
//!
//! 1. every coefficient magnitude is strictly below 1 (the conformal
//!    structure stays non-degenerate),
//! 2. every mapping magnitude is at most 1,
//! 3. when enabled, the 3D lift of the mapping does not self-intersect.
//!
//! Admissibility is checked *before* the energy evaluation so that no
//! interpolation work is spent on geometrically nonsensical candidates.
//!
//! # Termination policies
//!
//! - [`TerminationRule::None`]: accept the first admissible candidate with a
//!   finite energy.
//! - [`TerminationRule::Decrease`]: additionally require `f(α) ≤ f(0)`.
//! - [`TerminationRule::Armijo`]: additionally require the sufficient
//!   decrease `f(α) ≤ f(0) + α·ftol·⟨grad, drt⟩`.
//!
//! # Failure budget
//!
//! Every rejection passes through the shared exhaustion checks (iteration
//! cap, then step underflow, then step overflow) before the step is halved;
//! any hit aborts the whole search with the corresponding
//! [`LineSearchError`]. After a fatal error the caller's state buffers hold
//! the last rejected trial, not the pre-call state.
//!
//! # Example
//!
//! ```rust,ignore
//! let search = BacktrackingLineSearch::new();
//! let result = search.search(
//!     &energy, &mesh, &oracle, &fixed, &direction, &grad,
//!     EnergyFlags::all(), &mut state, &mut workspace, &params,
//! )?;
//! println!("accepted step {} after {} trials", result.step_size, result.trials);
//! ```

use nalgebra::Complex;
use num_traits::Float;

use crate::core::coefficient;
use crate::core::energy::{EnergyFlags, EnergyFunction};
use crate::core::error::{LineSearchError, MappingError, SearchResult};
use crate::core::mesh::SurfaceMesh;
use crate::core::types::{CplxVector, DVector, Scalar};
use crate::geometry::clip::clip_to_unit_disk;
use crate::geometry::intersection::{lift_to_embedding, SelfIntersectionOracle};
use crate::optimization::workspace::LineSearchWorkspace;

/// Factor applied to the step length after every rejected trial.
pub const STEP_DECREASE_FACTOR: f64 = 0.5;

/// Step growth factor for warm-starting the next outer iteration.
///
/// Never applied inside the search itself; callers that enlarge the accepted
/// step between outer iterations use this constant.
pub const STEP_INCREASE_FACTOR: f64 = 2.1;

/// Sufficient-decrease test applied to an admissible candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TerminationRule {
    /// Accept any admissible candidate with finite energy.
    None,
    /// Accept any candidate that does not increase the energy.
    Decrease,
    /// Accept candidates satisfying the Armijo sufficient-decrease condition.
    Armijo,
}

impl Default for TerminationRule {
    fn default() -> Self {
        Self::Armijo
    }
}

/// Verdict of a termination rule on one admissible trial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrialOutcome {
    /// Terminate the search with this candidate.
    Accept,
    /// Halve the step and try again.
    Shrink,
}

impl TerminationRule {
    /// Judges an admissible candidate with energy `fx` against the initial
    /// energy `fx_init`.
    ///
    /// `test_decr` is the premultiplied Armijo slope `ftol·⟨grad, drt⟩`
    /// (negative for a descent direction). A NaN or infinite `fx` is always
    /// rejected, whatever the rule.
    pub fn evaluate<T: Scalar>(self, fx: T, fx_init: T, step: T, test_decr: T) -> TrialOutcome {
        if !Float::is_finite(fx) {
            return TrialOutcome::Shrink;
        }
        if self == Self::None {
            return TrialOutcome::Accept;
        }
        if fx > fx_init {
            return TrialOutcome::Shrink;
        }
        if self == Self::Decrease {
            return TrialOutcome::Accept;
        }
        if fx > fx_init + step * test_decr {
            return TrialOutcome::Shrink;
        }
        TrialOutcome::Accept
    }
}

/// Parameters of the backtracking line search.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LineSearchParams<T: Scalar> {
    /// Armijo sufficient-decrease fraction, in (0, 1).
    pub ftol: T,

    /// Maximum number of step-shrink retries before giving up.
    ///
    /// A value of 0 allows exactly one trial: the first rejection is fatal.
    pub max_line_search: usize,

    /// Lower bound on the step length.
    pub min_step: T,

    /// Upper bound on the step length.
    pub max_step: T,

    /// Whether to run the self-intersection oracle on every trial.
    pub check_self_intersections: bool,

    /// Which sufficient-decrease condition terminates the search.
    pub termination: TerminationRule,
}

impl<T: Scalar> Default for LineSearchParams<T> {
    fn default() -> Self {
        Self {
            ftol: T::DEFAULT_FTOL,
            max_line_search: 20,
            min_step: T::MIN_STEP,
            max_step: T::MAX_STEP,
            check_self_intersections: true,
            termination: TerminationRule::default(),
        }
    }
}

impl<T: Scalar> LineSearchParams<T> {
    /// Creates parameters with the default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the Armijo sufficient-decrease fraction.
    pub fn with_ftol(mut self, ftol: T) -> Self {
        self.ftol = ftol;
        self
    }

    /// Sets the retry cap.
    pub fn with_max_line_search(mut self, max_line_search: usize) -> Self {
        self.max_line_search = max_line_search;
        self
    }

    /// Sets the step-length bounds.
    pub fn with_step_bounds(mut self, min_step: T, max_step: T) -> Self {
        self.min_step = min_step;
        self.max_step = max_step;
        self
    }

    /// Enables or disables the self-intersection check.
    pub fn with_self_intersection_checks(mut self, enabled: bool) -> Self {
        self.check_self_intersections = enabled;
        self
    }

    /// Sets the termination rule.
    pub fn with_termination(mut self, termination: TerminationRule) -> Self {
        self.termination = termination;
        self
    }

    /// Validates the parameters against their mathematical requirements.
    ///
    /// # Errors
    ///
    /// Returns [`LineSearchError::InvalidConfiguration`] if `ftol` lies
    /// outside (0, 1), `min_step` is negative, or the step bounds are not
    /// properly ordered.
    pub fn validate(&self) -> SearchResult<()> {
        if self.ftol <= T::zero() || self.ftol >= T::one() {
            return Err(LineSearchError::invalid_configuration(
                "ftol must lie in (0, 1)",
            ));
        }
        if self.min_step < T::zero() {
            return Err(LineSearchError::invalid_configuration(
                "min_step must be non-negative",
            ));
        }
        if self.max_step <= self.min_step {
            return Err(LineSearchError::invalid_configuration(
                "max_step must be greater than min_step",
            ));
        }
        Ok(())
    }
}

/// A descent direction in both spaces: the real parameter update and the
/// complex mapping update it induces.
///
/// Both vectors are supplied by the outer optimizer and treated as immutable
/// during the search.
#[derive(Debug, Clone)]
pub struct SearchDirection<T: Scalar> {
    /// Update direction for the packed parameter vector.
    pub parameter: DVector<T>,
    /// Induced update direction for the planar mapping.
    pub mapping: CplxVector<T>,
}

impl<T: Scalar> SearchDirection<T> {
    /// Bundles the parameter-space and mapping-space directions.
    pub fn new(parameter: DVector<T>, mapping: CplxVector<T>) -> Self {
        Self { parameter, mapping }
    }
}

/// The caller-owned mutable state the search advances in place.
///
/// On success the fields hold the accepted candidate; the final step length
/// doubles as the warm start for the next outer iteration. After a fatal
/// error the fields may hold an unaccepted trial.
#[derive(Debug, Clone)]
pub struct SearchState<T: Scalar> {
    /// Packed coefficient parameter vector.
    pub x: DVector<T>,
    /// Planar mapping.
    pub mapping: CplxVector<T>,
    /// Energy at (`x`, `mapping`).
    pub energy: T,
    /// Current step length.
    pub step: T,
}

impl<T: Scalar> SearchState<T> {
    /// Bundles the mutable search state.
    pub fn new(x: DVector<T>, mapping: CplxVector<T>, energy: T, step: T) -> Self {
        Self {
            x,
            mapping,
            energy,
            step,
        }
    }
}

/// Summary of an accepted line search.
#[derive(Debug, Clone, Copy)]
pub struct LineSearchSummary<T: Scalar> {
    /// The accepted step length.
    pub step_size: T,
    /// The energy at the accepted candidate.
    pub energy: T,
    /// Number of trials constructed, including the accepted one.
    pub trials: usize,
}

/// True if every coefficient magnitude is strictly below 1.
pub fn coefficient_within_open_disk<T: Scalar>(coefficient: &CplxVector<T>) -> bool {
    coefficient.iter().all(|m| m.norm() < T::one())
}

/// True if every mapping magnitude is at most 1.
pub fn mapping_within_closed_disk<T: Scalar>(mapping: &CplxVector<T>) -> bool {
    mapping.iter().all(|z| z.norm() <= T::one())
}

/// Backtracking line search with geometric feasibility filtering.
///
/// See the [module documentation](self) for the algorithm.
#[derive(Debug, Clone, Copy, Default)]
pub struct BacktrackingLineSearch;

impl BacktrackingLineSearch {
    /// Creates a new backtracking line search.
    pub fn new() -> Self {
        Self
    }

    /// Runs the search, mutating `state` in place.
    ///
    /// `fixed` lists the vertices whose mapping values are pinned; they are
    /// restored to their pre-call values after clipping on every trial, so
    /// they hold exactly their original positions whatever the direction
    /// does. `grad` is the energy gradient at the starting point, used only
    /// for the directional derivative.
    ///
    /// # Errors
    ///
    /// - [`LineSearchError::NegativeStep`] / [`NotDescentDirection`](LineSearchError::NotDescentDirection):
    ///   precondition violations, raised before any trial.
    /// - [`LineSearchError::MaxIterationsExceeded`] /
    ///   [`StepUnderflow`](LineSearchError::StepUnderflow) /
    ///   [`StepOverflow`](LineSearchError::StepOverflow): retry budget
    ///   exhausted.
    /// - [`LineSearchError::Mapping`]: dimension mismatch between the inputs,
    ///   or a failure inside the energy evaluator.
    #[allow(clippy::too_many_arguments)]
    pub fn search<T, E, O>(
        &self,
        energy: &E,
        mesh: &SurfaceMesh,
        oracle: &O,
        fixed: &[usize],
        direction: &SearchDirection<T>,
        grad: &DVector<T>,
        flags: EnergyFlags,
        state: &mut SearchState<T>,
        workspace: &mut LineSearchWorkspace<T>,
        params: &LineSearchParams<T>,
    ) -> SearchResult<LineSearchSummary<T>>
    where
        T: Scalar,
        E: EnergyFunction<T>,
        O: SelfIntersectionOracle<T>,
    {
        params.validate()?;
        validate_dimensions(mesh, fixed, direction, grad, state)?;

        if state.step < T::zero() {
            return Err(LineSearchError::negative_step(state.step.to_f64()));
        }

        // Projection of the gradient onto the search direction.
        let dg_init = grad.dot(&direction.parameter);
        if dg_init >= T::zero() {
            return Err(LineSearchError::not_descent_direction(dg_init.to_f64()));
        }

        // Snapshot of the state the search started from; every trial is
        // recombined from these, never from an accumulated update.
        let xp = state.x.clone();
        let wp = state.mapping.clone();
        let fx_init = state.energy;
        let test_decr = params.ftol * dg_init;

        let dec = <T as Scalar>::from_f64(STEP_DECREASE_FACTOR);
        workspace.resize(mesh.num_vertices());

        let mut trials = 0;
        for iter in 0..=params.max_line_search {
            trials += 1;

            // Trial constructor: additive update in both spaces, then clip
            // the boundary, then re-pin fixed points (pinning must win over
            // clipping).
            state.x = &xp + &direction.parameter * state.step;
            coefficient::unpack_into(&state.x, &mut workspace.coefficient)?;
            state.mapping = &wp + &direction.mapping * Complex::from(state.step);
            clip_to_unit_disk(mesh.boundary_vertices(), &mut state.mapping);
            for &v in fixed {
                state.mapping[v] = wp[v];
            }

            // Feasibility filter, cheapest check first; the oracle call is
            // last and optional.
            let mut admissible = coefficient_within_open_disk(&workspace.coefficient)
                && mapping_within_closed_disk(&state.mapping);
            if admissible && params.check_self_intersections {
                lift_to_embedding(&state.mapping, &mut workspace.embedding);
                admissible = !oracle.has_self_intersections(&workspace.embedding, mesh.faces());
            }

            if !admissible {
                shrink_or_fail(iter, state.step, params)?;
                state.step *= dec;
                continue;
            }

            state.energy = energy.evaluate(
                &workspace.coefficient,
                &state.mapping,
                flags,
                &mut workspace.embedding,
                &mut workspace.gamma,
            )?;

            match params
                .termination
                .evaluate(state.energy, fx_init, state.step, test_decr)
            {
                TrialOutcome::Accept => {
                    return Ok(LineSearchSummary {
                        step_size: state.step,
                        energy: state.energy,
                        trials,
                    });
                }
                TrialOutcome::Shrink => {
                    shrink_or_fail(iter, state.step, params)?;
                    state.step *= dec;
                }
            }
        }

        Err(LineSearchError::max_iterations_exceeded(
            params.max_line_search,
            state.step.to_f64(),
        ))
    }
}

/// Shared exhaustion checks applied before every step shrink, in order:
/// iteration cap, step underflow, step overflow.
fn shrink_or_fail<T: Scalar>(
    iter: usize,
    step: T,
    params: &LineSearchParams<T>,
) -> SearchResult<()> {
    if iter >= params.max_line_search {
        return Err(LineSearchError::max_iterations_exceeded(
            params.max_line_search,
            step.to_f64(),
        ));
    }
    if step < params.min_step {
        return Err(LineSearchError::step_underflow(
            step.to_f64(),
            params.min_step.to_f64(),
        ));
    }
    if step > params.max_step {
        return Err(LineSearchError::step_overflow(
            step.to_f64(),
            params.max_step.to_f64(),
        ));
    }
    Ok(())
}

fn validate_dimensions<T: Scalar>(
    mesh: &SurfaceMesh,
    fixed: &[usize],
    direction: &SearchDirection<T>,
    grad: &DVector<T>,
    state: &SearchState<T>,
) -> Result<(), MappingError> {
    let nv = mesh.num_vertices();
    if state.mapping.len() != nv {
        return Err(MappingError::dimension_mismatch(nv, state.mapping.len()));
    }
    if state.x.len() != 2 * nv {
        return Err(MappingError::dimension_mismatch(2 * nv, state.x.len()));
    }
    if direction.parameter.len() != state.x.len() {
        return Err(MappingError::dimension_mismatch(
            state.x.len(),
            direction.parameter.len(),
        ));
    }
    if direction.mapping.len() != nv {
        return Err(MappingError::dimension_mismatch(
            nv,
            direction.mapping.len(),
        ));
    }
    if grad.len() != state.x.len() {
        return Err(MappingError::dimension_mismatch(state.x.len(), grad.len()));
    }
    for &v in fixed {
        if v >= nv {
            return Err(MappingError::invalid_mesh(format!(
                "fixed vertex {v} is out of range for {nv} vertices"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{
        fan_setup, random_direction, DiskSpringEnergy, ScriptedEnergy, ScriptedOracle,
    };
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_termination_rule_table() {
        let fx_init = 10.0;
        let test_decr = -2.0; // ftol * dg_init, negative for descent

        // NaN and infinity shrink under every rule.
        for rule in [
            TerminationRule::None,
            TerminationRule::Decrease,
            TerminationRule::Armijo,
        ] {
            assert_eq!(
                rule.evaluate(f64::NAN, fx_init, 1.0, test_decr),
                TrialOutcome::Shrink
            );
            assert_eq!(
                rule.evaluate(f64::INFINITY, fx_init, 1.0, test_decr),
                TrialOutcome::Shrink
            );
        }

        // None accepts even an energy increase.
        assert_eq!(
            TerminationRule::None.evaluate(11.0, fx_init, 1.0, test_decr),
            TrialOutcome::Accept
        );

        // An increase shrinks under Decrease and Armijo.
        assert_eq!(
            TerminationRule::Decrease.evaluate(11.0, fx_init, 1.0, test_decr),
            TrialOutcome::Shrink
        );
        assert_eq!(
            TerminationRule::Armijo.evaluate(11.0, fx_init, 1.0, test_decr),
            TrialOutcome::Shrink
        );

        // A bare decrease satisfies Decrease but not necessarily Armijo:
        // with step 1 the Armijo threshold is 10 - 2 = 8.
        assert_eq!(
            TerminationRule::Decrease.evaluate(9.0, fx_init, 1.0, test_decr),
            TrialOutcome::Accept
        );
        assert_eq!(
            TerminationRule::Armijo.evaluate(9.0, fx_init, 1.0, test_decr),
            TrialOutcome::Shrink
        );
        assert_eq!(
            TerminationRule::Armijo.evaluate(7.5, fx_init, 1.0, test_decr),
            TrialOutcome::Accept
        );
    }

    #[test]
    fn test_disk_predicates() {
        let inside = CplxVector::from_vec(vec![Complex::new(0.5, 0.0), Complex::new(0.0, -0.99)]);
        assert!(coefficient_within_open_disk(&inside));
        assert!(mapping_within_closed_disk(&inside));

        let on_circle = CplxVector::from_vec(vec![Complex::new(1.0, 0.0)]);
        assert!(!coefficient_within_open_disk(&on_circle));
        assert!(mapping_within_closed_disk(&on_circle));

        let outside = CplxVector::from_vec(vec![Complex::new(1.0, 0.5)]);
        assert!(!mapping_within_closed_disk(&outside));
    }

    #[test]
    fn test_params_validation() {
        assert!(LineSearchParams::<f64>::default().validate().is_ok());

        let err = LineSearchParams::<f64>::default()
            .with_ftol(1.5)
            .validate()
            .unwrap_err();
        assert!(matches!(err, LineSearchError::InvalidConfiguration { .. }));

        let err = LineSearchParams::<f64>::default()
            .with_step_bounds(1.0, 0.5)
            .validate()
            .unwrap_err();
        assert!(err.to_string().contains("max_step"));
    }

    #[test]
    fn test_shrink_or_fail_check_order() {
        let params = LineSearchParams::<f64>::default()
            .with_max_line_search(5)
            .with_step_bounds(1e-3, 1e3);

        // Iteration cap dominates even when the step is also out of bounds.
        assert!(matches!(
            shrink_or_fail(5, 1e-6, &params),
            Err(LineSearchError::MaxIterationsExceeded { .. })
        ));
        // Underflow is reported before overflow is even considered.
        assert!(matches!(
            shrink_or_fail(0, 1e-6, &params),
            Err(LineSearchError::StepUnderflow { .. })
        ));
        assert!(matches!(
            shrink_or_fail(0, 1e6, &params),
            Err(LineSearchError::StepOverflow { .. })
        ));
        assert!(shrink_or_fail(0, 1.0, &params).is_ok());
    }

    proptest! {
        /// The accepted step after k rejected trials is exactly the initial
        /// step halved k times.
        #[test]
        fn prop_step_halves_per_rejection(rejections in 0usize..6, step0 in 0.25f64..4.0) {
            let (mesh, mut state, direction, grad) = fan_setup(8);
            state.step = step0;

            // Reject the first `rejections` trials with NaN energies, then
            // return a strictly smaller energy.
            let mut script = vec![f64::NAN; rejections];
            script.push(state.energy - 1.0);
            let energy = ScriptedEnergy::new(script);

            let params = LineSearchParams::default()
                .with_termination(TerminationRule::Decrease)
                .with_self_intersection_checks(false);
            let mut workspace = LineSearchWorkspace::with_size(mesh.num_vertices());

            let summary = BacktrackingLineSearch::new()
                .search(
                    &energy, &mesh, &ScriptedOracle::never(), &[], &direction, &grad,
                    EnergyFlags::all(), &mut state, &mut workspace, &params,
                )
                .unwrap();

            let expected = step0 * 0.5f64.powi(rejections as i32);
            prop_assert!((summary.step_size - expected).abs() <= 1e-12 * expected);
            prop_assert_eq!(summary.trials, rejections + 1);
            prop_assert_eq!(state.step, summary.step_size);
        }
    }

    #[test]
    fn test_random_directions_keep_fixed_points_pinned() {
        for seed in 0..4u64 {
            let (mesh, mut state, _, _) = fan_setup(8);
            let (direction, grad) = random_direction(mesh.num_vertices(), 0.3, seed);
            let pinned = state.mapping[2];

            let params = LineSearchParams::default()
                .with_termination(TerminationRule::None)
                .with_self_intersection_checks(false);
            let mut workspace = LineSearchWorkspace::with_size(mesh.num_vertices());

            BacktrackingLineSearch::new()
                .search(
                    &DiskSpringEnergy::default(),
                    &mesh,
                    &ScriptedOracle::never(),
                    &[2],
                    &direction,
                    &grad,
                    EnergyFlags::all(),
                    &mut state,
                    &mut workspace,
                    &params,
                )
                .unwrap();

            assert_eq!(state.mapping[2], pinned);
        }
    }

    #[test]
    fn test_accepted_step_reported_in_state() {
        let (mesh, mut state, direction, grad) = fan_setup(6);
        let params = LineSearchParams::default().with_self_intersection_checks(false);
        let mut workspace = LineSearchWorkspace::with_size(mesh.num_vertices());

        let summary = BacktrackingLineSearch::new()
            .search(
                &DiskSpringEnergy::default(),
                &mesh,
                &ScriptedOracle::never(),
                &[],
                &direction,
                &grad,
                EnergyFlags::all(),
                &mut state,
                &mut workspace,
                &params,
            )
            .unwrap();

        assert_relative_eq!(state.step, summary.step_size);
        assert_relative_eq!(state.energy, summary.energy);
    }
}
